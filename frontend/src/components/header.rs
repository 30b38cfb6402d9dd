use yew::prelude::*;

/// Renders the application header
pub fn render_header() -> Html {
    html! {
        <header class="app-header">
            <h1>{"👁️ Website Klasifikasi Mata Katarak Berbasis CNN"}</h1>
            <p class="subtitle">
                {"Selamat datang di "}<strong>{"Website Prediksi Katarak"}</strong>{". "}
                {"Website ini dirancang untuk membantu mengunggah gambar mata dan mengklasifikasikannya apakah "}
                <strong>{"Normal"}</strong>{" atau "}<strong>{"Katarak"}</strong>
                {" menggunakan model "}<strong>{"Convolutional Neural Network (CNN)"}</strong>{"."}
            </p>
        </header>
    }
}
