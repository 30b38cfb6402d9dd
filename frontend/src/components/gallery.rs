use super::super::Model;
use shared::{GalleryCategory, GalleryImage, THUMBNAIL_SIZE};
use yew::prelude::*;

pub fn render_gallery(model: &Model) -> Html {
    let Some(gallery) = &model.gallery else {
        return html! {
            <section class="gallery">
                <p class="gallery-loading">{"Memuat contoh gambar..."}</p>
            </section>
        };
    };

    html! {
        <section class="gallery">
            <h2>{"🖼️ Contoh Gambar Mata"}</h2>
            <p>{"Berikut contoh citra mata "}<strong>{"Normal"}</strong>{" dan "}<strong>{"Katarak"}</strong>{":"}</p>
            <div class="gallery-columns">
                { render_column("🟢", GalleryCategory::Normal, &gallery.normal) }
                { render_column("🔴", GalleryCategory::Katarak, &gallery.cataract) }
            </div>
        </section>
    }
}

fn render_column(marker: &str, category: GalleryCategory, images: &[GalleryImage]) -> Html {
    let caption = category.label().display_name();
    html! {
        <div class={classes!("gallery-column", category.to_string())}>
            <h3>{ format!("{} {}", marker, caption) }</h3>
            {
                for images.iter().map(|image| html! {
                    <figure class="gallery-item" key={image.file_name.clone()}>
                        <img
                            src={image.url.clone()}
                            alt={image.file_name.clone()}
                            width={THUMBNAIL_SIZE.to_string()}
                            height={THUMBNAIL_SIZE.to_string()}
                        />
                        <figcaption>{ caption }</figcaption>
                    </figure>
                })
            }
        </div>
    }
}
