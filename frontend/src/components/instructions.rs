use yew::prelude::*;

const STEPS: [&str; 3] = [
    "Klik tombol Pilih Gambar untuk mengunggah citra mata.",
    "Setelah gambar diunggah, sistem akan memproses menggunakan model CNN.",
    "Hasil prediksi berupa status Normal atau Katarak akan ditampilkan bersama skor kepercayaan.",
];

pub fn render_instructions() -> Html {
    html! {
        <section class="instructions">
            <h2>{"📖 Cara Menggunakan:"}</h2>
            <ol>
                { for STEPS.iter().map(|step| html! { <li>{ *step }</li> }) }
            </ol>
        </section>
    }
}
