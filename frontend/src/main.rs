mod api;
mod components;

use components::{gallery, handlers, header, instructions, preview_area, results, upload_section, utils};
use gloo_file::{File as GlooFile, ObjectUrl};
use shared::{GalleryResponse, PredictionResponse};
use wasm_bindgen_futures::spawn_local;
use web_sys::DragEvent;
use yew::prelude::*;

// Models
struct Upload {
    file: GlooFile,
    preview_url: ObjectUrl,
}

// Yew msg components
enum Msg {
    // Gallery
    GalleryLoaded(GalleryResponse),

    // Upload and analysis
    FileSelected(GlooFile),
    PredictionReceived(u64, PredictionResponse),

    // UI states
    SetError(Option<String>),
    SetDragging(bool),

    // Input events
    HandleDrop(DragEvent),
}

// Main component
struct Model {
    gallery: Option<GalleryResponse>,
    upload: Option<Upload>,
    result: Option<PredictionResponse>,
    // Incremented per upload so a late response for a replaced image is ignored.
    generation: u64,
    loading: bool,
    error: Option<String>,
    is_dragging: bool,
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let link = ctx.link().clone();
        spawn_local(async move {
            match api::fetch_gallery().await {
                Ok(gallery) => link.send_message(Msg::GalleryLoaded(gallery)),
                Err(e) => {
                    log::warn!("Failed to load gallery: {}", e);
                    link.send_message(Msg::GalleryLoaded(GalleryResponse::default()))
                }
            }
        });

        Self {
            gallery: None,
            upload: None,
            result: None,
            generation: 0,
            loading: false,
            error: None,
            is_dragging: false,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::GalleryLoaded(gallery) => {
                self.gallery = Some(gallery);
                true
            }

            Msg::FileSelected(file) => handlers::handle_file_selected(self, ctx, file),
            Msg::PredictionReceived(generation, response) => {
                handlers::handle_prediction(self, generation, response)
            }

            Msg::SetError(error) => {
                self.error = error;
                self.loading = false;
                true
            }
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }

            Msg::HandleDrop(event) => handlers::handle_drop(self, ctx, event),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { header::render_header() }

                <main class="main-content">
                    { gallery::render_gallery(self) }
                    <hr />
                    { instructions::render_instructions() }
                    <hr />
                    { upload_section::render_upload_section(self, ctx) }
                    { utils::render_error_message(self) }
                    { preview_area::render_preview_area(self) }
                    { results::render_results(self) }
                </main>

                <footer class="app-footer">
                    <p>{"Klasifikasi Katarak CNN | Fullstack Rust WASM"}</p>
                </footer>
            </div>
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<Model>::new().render();
}
