use gloo_file::File as GlooFile;
use gloo_net::http::{Request, Response};
use shared::{ErrorResponse, GalleryResponse, PredictionResponse};

pub async fn fetch_gallery() -> Result<GalleryResponse, String> {
    let response = Request::get("/api/gallery")
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    if !response.ok() {
        return Err(error_message(response).await);
    }
    response
        .json::<GalleryResponse>()
        .await
        .map_err(|e| format!("Failed to parse gallery: {}", e))
}

pub async fn predict(file: &GlooFile) -> Result<PredictionResponse, String> {
    let form_data =
        web_sys::FormData::new().map_err(|e| format!("Failed to build form: {:?}", e))?;
    form_data
        .append_with_blob_and_filename("image", file.as_ref(), &file.name())
        .map_err(|e| format!("Failed to attach file: {:?}", e))?;

    let response = Request::post("/api/predict")
        .body(form_data)
        .map_err(|e| format!("Failed to build request: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    if !response.ok() {
        return Err(error_message(response).await);
    }
    response
        .json::<PredictionResponse>()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}

async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(error) => error.error,
        Err(_) => format!("Server error: {} - {}", status, body),
    }
}
