use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::{HttpResponse, http::header, web};
use chrono::Utc;
use futures::TryStreamExt;
use image::ImageFormat;
use log::{info, warn};
use shared::{GalleryCategory, HealthResponse, PredictionResponse, Verdict};
use std::path::PathBuf;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ApiError;
use crate::gallery::{Gallery, GalleryError};
use crate::inference::{Classifier, PreprocessError, preprocess};

const ACCEPTED_MEDIA_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// Largest accepted upload, in bytes.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimit(pub usize);

struct Upload {
    content_type: Option<String>,
    data: Vec<u8>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: PathBuf) {
    cfg.service(web::resource("/api/predict").route(web::post().to(handle_predict)))
        .service(web::resource("/api/gallery").route(web::get().to(list_gallery)))
        .service(
            web::resource("/api/gallery/{category}/{file_name}")
                .route(web::get().to(gallery_thumbnail)),
        )
        .service(web::resource("/api/health").route(web::get().to(health)));

    if frontend_dir.is_dir() {
        cfg.service(Files::new("/", frontend_dir).index_file("index.html"));
    } else {
        warn!(
            "Frontend directory {} not found, serving the API only",
            frontend_dir.display()
        );
    }
}

async fn handle_predict(
    classifier: web::Data<Classifier>,
    limit: web::Data<UploadLimit>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4();

    let result = predict(classifier, limit.0, payload).await;
    match &result {
        Ok(verdict) => info!(
            "Request {}: {} ({}, score {:.4})",
            request_id, verdict.label, verdict.confidence, verdict.score
        ),
        Err(e) => warn!("Request {} failed: {}", request_id, e),
    }

    Ok(HttpResponse::Ok().json(PredictionResponse {
        request_id: request_id.to_string(),
        verdict: result?,
        analyzed_at: Utc::now().to_rfc3339(),
    }))
}

async fn predict(
    classifier: web::Data<Classifier>,
    limit: usize,
    payload: Multipart,
) -> Result<Verdict, ApiError> {
    let mut uploads = read_uploads(payload, limit).await?;
    if uploads.len() != 1 {
        return Err(ApiError::FileCount(uploads.len()));
    }
    let Some(upload) = uploads.pop() else {
        return Err(ApiError::FileCount(0));
    };
    let format = upload_format(upload.content_type.as_deref(), &upload.data)?;

    let classifier = classifier.into_inner();
    web::block(move || -> Result<Verdict, ApiError> {
        let tensor = preprocess::preprocess_bytes(&upload.data, format)?;
        Ok(classifier.classify(&tensor)?)
    })
    .await
    .map_err(|e| ApiError::Blocking(e.to_string()))?
}

async fn read_uploads(mut payload: Multipart, limit: usize) -> Result<Vec<Upload>, ApiError> {
    let mut uploads = Vec::new();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| ApiError::Multipart(e.to_string()))?
    {
        let is_file = field
            .content_disposition()
            .is_some_and(|cd| cd.get_filename().is_some());
        let content_type = field.content_type().map(|m| m.essence_str().to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| ApiError::Multipart(e.to_string()))?
        {
            if data.len() + chunk.len() > limit {
                return Err(ApiError::PayloadTooLarge(limit));
            }
            data.extend_from_slice(&chunk);
        }

        // Plain form fields carry no filename and are not uploads.
        if is_file && !data.is_empty() {
            uploads.push(Upload { content_type, data });
        }
    }

    Ok(uploads)
}

/// Resolves the format to decode with. The bytes must be JPEG or PNG and agree
/// with the declared type; an absent or generic type relies on the bytes alone.
fn upload_format(declared: Option<&str>, data: &[u8]) -> Result<ImageFormat, ApiError> {
    let declared = match declared {
        None | Some("application/octet-stream") => None,
        Some(media_type) if ACCEPTED_MEDIA_TYPES.contains(&media_type) => {
            ImageFormat::from_mime_type(media_type)
        }
        Some(other) => return Err(ApiError::UnsupportedMediaType(other.to_string())),
    };
    let sniffed = preprocess::sniff_format(data).map_err(|e| match e {
        PreprocessError::UnsupportedFormat(name) => ApiError::UnsupportedMediaType(name),
        other => ApiError::Preprocess(other),
    })?;

    match (declared, sniffed) {
        (Some(declared), Some(sniffed)) if declared != sniffed => {
            Err(ApiError::UnsupportedMediaType(format!(
                "{} labelled as {}",
                sniffed.to_mime_type(),
                declared.to_mime_type()
            )))
        }
        (_, Some(sniffed)) => Ok(sniffed),
        // Unrecognised bytes under a JPEG/PNG label surface as a decode error.
        (Some(declared), None) => Ok(declared),
        (None, None) => Err(ApiError::UnsupportedMediaType("unknown".into())),
    }
}

async fn list_gallery(gallery: web::Data<Gallery>) -> HttpResponse {
    HttpResponse::Ok().json(gallery.listing())
}

async fn gallery_thumbnail(
    gallery: web::Data<Gallery>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError> {
    let (category, file_name) = path.into_inner();
    let category = GalleryCategory::from_str(&category)
        .map_err(|_| GalleryError::NotFound(format!("{}/{}", category, file_name)))?;

    let gallery = gallery.into_inner();
    let bytes = web::block(move || gallery.thumbnail(category, &file_name))
        .await
        .map_err(|e| ApiError::Blocking(e.to_string()))??;

    Ok(HttpResponse::Ok()
        .content_type("image/png")
        .insert_header(header::CacheControl(vec![header::CacheDirective::MaxAge(3600)]))
        .body(bytes))
}

async fn health(classifier: web::Data<Classifier>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        model: classifier.identifier().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::testing::{FixedScore, encode, png_bytes};
    use actix_web::{App, http::StatusCode, test};
    use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};
    use shared::{ErrorResponse, GalleryResponse, Label};
    use std::sync::Arc;

    const BOUNDARY: &str = "----eyeboundary";

    fn multipart(parts: &[(&str, &[u8])], fields: &[(&str, &str)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        for (content_type, data) in parts {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"eye\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(parts: &[(&str, &[u8])]) -> test::TestRequest {
        form_request(parts, &[])
    }

    fn form_request(parts: &[(&str, &[u8])], fields: &[(&str, &str)]) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/predict")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(multipart(parts, fields))
    }

    macro_rules! app {
        ($score:expr, $gallery_dir:expr, $limit:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(Classifier::new(Arc::new(FixedScore::new($score)))))
                    .app_data(web::Data::new(Gallery::new($gallery_dir)))
                    .app_data(web::Data::new(UploadLimit($limit)))
                    .configure(|cfg| configure_routes(cfg, PathBuf::from("/nonexistent/dist"))),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn png_upload_returns_cataract_verdict() {
        let app = app!(0.12, "/nonexistent/gallery", 1 << 20);
        let image = png_bytes(64, 48, [120, 80, 60]);

        let resp = test::call_service(&app, upload_request(&[("image/png", image.as_slice())]).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: PredictionResponse = test::read_body_json(resp).await;
        assert_eq!(body.verdict.label, Label::Cataract);
        assert_eq!(body.verdict.confidence.to_string(), "88.00%");
        assert!(Uuid::parse_str(&body.request_id).is_ok());
    }

    #[actix_web::test]
    async fn octet_stream_upload_is_sniffed() {
        let app = app!(0.97, "/nonexistent/gallery", 1 << 20);
        let image = png_bytes(10, 10, [1, 2, 3]);

        let resp =
            test::call_service(&app, upload_request(&[("application/octet-stream", image.as_slice())]).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: PredictionResponse = test::read_body_json(resp).await;
        assert_eq!(body.verdict.label, Label::Normal);
        assert_eq!(body.verdict.confidence.to_string(), "97.00%");
    }

    #[actix_web::test]
    async fn non_image_upload_is_rejected() {
        let app = app!(0.5, "/nonexistent/gallery", 1 << 20);

        let resp = test::call_service(&app, upload_request(&[("text/plain", &b"hello"[..])]).to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.kind, "unsupported_media_type");
    }

    #[actix_web::test]
    async fn other_image_formats_under_an_accepted_label_are_rejected() {
        let app = app!(0.97, "/nonexistent/gallery", 1 << 20);
        let gif = encode(
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([9, 9, 9, 255]))),
            ImageFormat::Gif,
        );

        let resp = test::call_service(&app, upload_request(&[("image/png", gif.as_slice())]).to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.kind, "unsupported_media_type");

        let resp =
            test::call_service(&app, upload_request(&[("application/octet-stream", gif.as_slice())]).to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[actix_web::test]
    async fn declared_type_must_match_the_bytes() {
        let app = app!(0.97, "/nonexistent/gallery", 1 << 20);
        let jpeg = encode(
            DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([9, 9, 9]))),
            ImageFormat::Jpeg,
        );

        let resp = test::call_service(&app, upload_request(&[("image/png", jpeg.as_slice())]).to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let resp = test::call_service(&app, upload_request(&[("image/jpeg", jpeg.as_slice())]).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn text_fields_do_not_count_as_files() {
        let app = app!(0.12, "/nonexistent/gallery", 1 << 20);
        let image = png_bytes(16, 16, [40, 40, 40]);

        let resp = test::call_service(
            &app,
            form_request(&[("image/png", image.as_slice())], &[("note", "left eye")]).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = test::call_service(&app, form_request(&[], &[("note", "no image")]).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.kind, "file_count");
    }

    #[actix_web::test]
    async fn undecodable_image_is_a_client_error() {
        let app = app!(0.5, "/nonexistent/gallery", 1 << 20);

        let resp = test::call_service(&app, upload_request(&[("image/jpeg", &b"not a jpeg"[..])]).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.kind, "decode");
    }

    #[actix_web::test]
    async fn exactly_one_file_is_required() {
        let app = app!(0.5, "/nonexistent/gallery", 1 << 20);
        let image = png_bytes(8, 8, [0, 0, 0]);

        let resp = test::call_service(
            &app,
            upload_request(&[("image/png", image.as_slice()), ("image/png", image.as_slice())]).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.kind, "file_count");

        let resp = test::call_service(&app, upload_request(&[]).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn oversized_upload_is_rejected() {
        let app = app!(0.5, "/nonexistent/gallery", 16);
        let image = png_bytes(32, 32, [0, 0, 0]);

        let resp = test::call_service(&app, upload_request(&[("image/png", image.as_slice())]).to_request()).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[actix_web::test]
    async fn invalid_model_score_is_a_server_error() {
        let app = app!(1.5, "/nonexistent/gallery", 1 << 20);
        let image = png_bytes(8, 8, [0, 0, 0]);

        let resp = test::call_service(&app, upload_request(&[("image/png", image.as_slice())]).to_request()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.kind, "model");
    }

    #[actix_web::test]
    async fn gallery_listing_and_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("normal")).unwrap();
        std::fs::write(dir.path().join("normal/eye.png"), png_bytes(90, 60, [5, 5, 5])).unwrap();
        let app = app!(0.5, dir.path(), 1 << 20);

        let req = test::TestRequest::get().uri("/api/gallery").to_request();
        let listing: GalleryResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listing.normal.len(), 1);
        assert!(listing.cataract.is_empty());

        let req = test::TestRequest::get().uri(&listing.normal[0].url).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/png"
        );

        let req = test::TestRequest::get()
            .uri("/api/gallery/glaucoma/eye.png")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn health_reports_model_identifier() {
        let app = app!(0.5, "/nonexistent/gallery", 1 << 20);

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: HealthResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.status, "ok");
        assert_eq!(body.model, "fixed-score");
    }
}
