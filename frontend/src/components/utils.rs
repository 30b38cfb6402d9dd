use super::super::Model;
use gloo_file::File as GlooFile;
use gloo_timers::callback::Timeout;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::FileList;
use yew::prelude::*;

pub const ACCEPTED_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

// Debounce function to limit button events
pub fn debounce<F>(duration: i32, callback: F) -> Callback<MouseEvent>
where
    F: Fn() + Clone + 'static,
{
    let timeout = Rc::new(RefCell::new(None::<Timeout>));
    let timeout_clone = Rc::clone(&timeout);

    Callback::from(move |_| {
        let mut timeout_ref = timeout_clone.borrow_mut();

        if let Some(old_timeout) = timeout_ref.take() {
            old_timeout.cancel();
        }

        let inner_callback = callback.clone();
        let new_timeout = Timeout::new(duration as u32, move || {
            inner_callback();
        });

        *timeout_ref = Some(new_timeout);
    })
}

pub fn is_accepted_type(mime_type: &str) -> bool {
    ACCEPTED_TYPES.contains(&mime_type)
}

/// First JPG/PNG file in the list, or the name of the first rejected file.
pub fn extract_image_file(file_list: &FileList) -> Result<GlooFile, String> {
    let first = file_list.item(0).ok_or_else(|| "Tidak ada file yang dipilih.".to_string())?;
    if is_accepted_type(&first.type_()) {
        Ok(GlooFile::from(first))
    } else {
        Err(format!(
            "File {} tidak didukung. Unggah gambar JPG atau PNG.",
            first.name()
        ))
    }
}

pub fn render_error_message(model: &Model) -> Html {
    if let Some(error_msg) = &model.error {
        html! {
            <div class="error-message">
                <i class="fa-solid fa-circle-exclamation"></i>
                <p>{ error_msg }</p>
            </div>
        }
    } else {
        html! {}
    }
}
