use super::super::Msg;
use super::super::{Model, Upload};
use super::utils::extract_image_file;
use crate::api;
use gloo_file::{File as GlooFile, ObjectUrl};
use shared::PredictionResponse;
use wasm_bindgen_futures::spawn_local;
use web_sys::DragEvent;
use yew::prelude::*;

/// A new upload replaces the previous one and is analyzed right away.
pub fn handle_file_selected(model: &mut Model, ctx: &Context<Model>, file: GlooFile) -> bool {
    model.generation += 1;
    model.error = None;
    model.result = None;
    model.loading = true;
    model.upload = Some(Upload {
        preview_url: ObjectUrl::from(file.clone()),
        file: file.clone(),
    });

    send_prediction_request(ctx, model.generation, file);
    true
}

pub fn handle_prediction(model: &mut Model, generation: u64, response: PredictionResponse) -> bool {
    if generation != model.generation {
        log::debug!("Ignoring stale prediction {}", response.request_id);
        return false;
    }
    model.result = Some(response);
    model.loading = false;
    true
}

pub fn handle_drop(model: &mut Model, ctx: &Context<Model>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    if model.loading {
        return true;
    }

    if let Some(file_list) = event.data_transfer().and_then(|dt| dt.files()) {
        match extract_image_file(&file_list) {
            Ok(file) => ctx.link().send_message(Msg::FileSelected(file)),
            Err(message) => {
                log::warn!("{}", message);
                ctx.link().send_message(Msg::SetError(Some(message)));
            }
        }
    }

    true
}

fn send_prediction_request(ctx: &Context<Model>, generation: u64, file: GlooFile) {
    let link = ctx.link().clone();
    spawn_local(async move {
        match api::predict(&file).await {
            Ok(response) => link.send_message(Msg::PredictionReceived(generation, response)),
            Err(e) => {
                gloo_console::error!(format!("Prediction failed: {}", e));
                link.send_message(Msg::SetError(Some(e)));
            }
        }
    });
}
