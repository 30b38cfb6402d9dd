use super::super::Model;
use shared::Label;
use yew::prelude::*;

const DISCLAIMER: &str =
    "⚠️ Catatan: Hasil ini hanya sebagai screening awal, bukan pengganti diagnosa dokter mata.";

pub fn render_results(model: &Model) -> Html {
    let Some(result) = &model.result else {
        return html! {};
    };

    let verdict = &result.verdict;
    let is_cataract = verdict.label == Label::Cataract;
    let heading = if is_cataract {
        "🔴 Katarak terdeteksi"
    } else {
        "🟢 Mata Normal"
    };
    let analyzed_filename = model
        .upload
        .as_ref()
        .map_or_else(|| "Gambar".to_string(), |upload| upload.file.name());

    html! {
        <div class={classes!("results-container", if is_cataract { "cataract-detected" } else { "normal" })}>
            <h2>{"📊 Hasil Prediksi:"}</h2>
            <div class="result-header">
                <h3 title={format!("Hasil analisis untuk: {}", analyzed_filename)}>
                    { heading }
                    <span class="analyzed-filename-display">{format!(" ({})", analyzed_filename)}</span>
                </h3>
                <div class="confidence-meter">
                    <div class="meter-label">{"Skor Kepercayaan:"}</div>
                    <div class="meter">
                        <div class="meter-fill" style={format!("width: {}%", verdict.confidence.value())}></div>
                    </div>
                    <div class="meter-value"><strong>{ verdict.confidence.to_string() }</strong></div>
                </div>
                <p class="result-label">{ format!("Label: {}", verdict.label.display_name()) }</p>
            </div>
            <p class="disclaimer">{ DISCLAIMER }</p>
        </div>
    }
}
