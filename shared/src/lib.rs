use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

/// Edge length, in pixels, of the example images shown on the page.
pub const THUMBNAIL_SIZE: u32 = 250;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
pub enum Label {
    Normal,
    Cataract,
}

impl Label {
    /// Name shown to the user on the page.
    pub fn display_name(&self) -> &'static str {
        match self {
            Label::Normal => "Normal",
            Label::Cataract => "Katarak",
        }
    }
}

/// Confidence percentage in `[50.0, 100.0]`, rendered with two decimals.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Display)]
#[serde(transparent)]
#[display(fmt = "{:.2}%", _0)]
pub struct Confidence(pub f32);

impl Confidence {
    pub fn value(&self) -> f32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: Label,
    pub confidence: Confidence,
    /// Raw model output the verdict was derived from.
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub request_id: String,
    pub verdict: Verdict,
    pub analyzed_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, strum_macros::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GalleryCategory {
    Normal,
    Katarak,
}

impl GalleryCategory {
    pub fn label(&self) -> Label {
        match self {
            GalleryCategory::Normal => Label::Normal,
            GalleryCategory::Katarak => Label::Cataract,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub file_name: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GalleryResponse {
    pub normal: Vec<GalleryImage>,
    pub cataract: Vec<GalleryImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}
