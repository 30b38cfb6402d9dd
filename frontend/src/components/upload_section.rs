use super::super::Model;
use super::super::Msg;
use super::utils::{debounce, extract_image_file};
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, HtmlInputElement};
use yew::prelude::*;

pub fn render_upload_section(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link();

    let handle_change = link.callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let selected = match input.files() {
            Some(files) => extract_image_file(&files),
            None => Err("Tidak ada file yang dipilih.".to_string()),
        };

        input.set_value("");

        match selected {
            Ok(file) => Msg::FileSelected(file),
            Err(message) => Msg::SetError(Some(message)),
        }
    });

    let handle_drag_over = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(true)
    });

    let handle_drag_leave = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(false)
    });

    let handle_drop = link.callback(Msg::HandleDrop);
    let trigger_file_input = Callback::from(|_| {
        let input = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id("file-input"));
        if let Some(input) = input {
            if let Ok(html_input) = input.dyn_into::<web_sys::HtmlElement>() {
                html_input.click();
            }
        }
    });

    html! {
        <section class="upload-section">
            <h2>{"🔬 Uji Coba Klasifikasi:"}</h2>
            <input
                type="file"
                id="file-input"
                accept="image/jpeg,image/png,.jpg,.jpeg,.png"
                style="display: none;"
                onchange={handle_change}
                disabled={model.loading}
            />

            <div
                id="drop-zone"
                class={classes!("upload-area", model.is_dragging.then_some("drag-over"))}
                ondragover={handle_drag_over}
                ondragleave={handle_drag_leave}
                ondrop={handle_drop}
                onclick={debounce(300, {
                    let trigger_file_input = trigger_file_input.clone();
                    move || trigger_file_input.emit(())
                })}
            >
                <div class="upload-placeholder">
                    <i class="fa-solid fa-cloud-arrow-up"></i>
                    <p>{"📂 Unggah gambar mata (JPG/PNG)"}</p>
                    <p class="file-types">{"Klik untuk memilih gambar atau tarik & lepas di sini"}</p>
                </div>
            </div>
        </section>
    }
}
