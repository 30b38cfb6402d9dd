use super::super::Model;
use yew::prelude::*;

pub fn render_preview_area(model: &Model) -> Html {
    let Some(upload) = &model.upload else {
        return html! {};
    };

    html! {
        <div id="preview-container">
            <img
                id="actual-image-preview"
                src={upload.preview_url.to_string()}
                alt={upload.file.name()}
            />
            <p class="preview-caption">{"🖼️ Gambar yang diunggah"}</p>
            {
                if model.loading {
                    html! {
                        <div class="loading-preview">
                            <i class="fa-solid fa-spinner fa-spin fa-2x"></i>
                            <p style="margin-left: 10px;">{"🔍 Sedang menganalisis..."}</p>
                        </div>
                    }
                } else {
                    html! {}
                }
            }
        </div>
    }
}
