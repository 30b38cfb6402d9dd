use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use shared::ErrorResponse;

use crate::gallery::GalleryError;
use crate::inference::{ClassifyError, PreprocessError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    #[error(transparent)]
    Gallery(#[from] GalleryError),
    #[error("Unsupported media type {0}, upload a JPG or PNG image")]
    UnsupportedMediaType(String),
    #[error("Upload exceeds the limit of {0} bytes")]
    PayloadTooLarge(usize),
    #[error("Expected exactly one image file, received {0}")]
    FileCount(usize),
    #[error("Malformed upload: {0}")]
    Multipart(String),
    #[error("Background worker failed: {0}")]
    Blocking(String),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Preprocess(PreprocessError::Decode(_)) => "decode",
            ApiError::Preprocess(PreprocessError::UnsupportedChannels(_)) => "unsupported_channels",
            ApiError::Preprocess(PreprocessError::UnsupportedFormat(_)) => "unsupported_format",
            ApiError::Preprocess(PreprocessError::Shape(_)) => "internal",
            ApiError::Classify(ClassifyError::ShapeMismatch { .. }) => "shape_mismatch",
            ApiError::Classify(ClassifyError::Model(_)) => "model",
            ApiError::Gallery(GalleryError::InvalidName(_)) => "invalid_name",
            ApiError::Gallery(GalleryError::NotFound(_)) => "not_found",
            ApiError::Gallery(GalleryError::Decode(_)) => "gallery_decode",
            ApiError::UnsupportedMediaType(_) => "unsupported_media_type",
            ApiError::PayloadTooLarge(_) => "payload_too_large",
            ApiError::FileCount(_) => "file_count",
            ApiError::Multipart(_) => "multipart",
            ApiError::Blocking(_) => "internal",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Preprocess(PreprocessError::Shape(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Preprocess(_) => StatusCode::BAD_REQUEST,
            ApiError::Classify(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Gallery(GalleryError::InvalidName(_)) => StatusCode::BAD_REQUEST,
            ApiError::Gallery(GalleryError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Gallery(GalleryError::Decode(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::FileCount(_) | ApiError::Multipart(_) => StatusCode::BAD_REQUEST,
            ApiError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            kind: self.kind().to_string(),
        })
    }
}
