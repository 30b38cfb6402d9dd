pub mod artifact;
pub mod classifier;
pub mod preprocess;
pub mod provider;

pub use artifact::{ArtifactStore, HttpSource};
pub use classifier::{ClassifyError, Classifier};
pub use preprocess::PreprocessError;
pub use provider::TorchModel;

#[cfg(test)]
pub(crate) mod testing {
    use super::artifact::{ArtifactError, ArtifactSource};
    use super::preprocess::{INPUT_SHAPE, InputTensor};
    use super::provider::{ModelError, ModelProvider};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use ndarray::Array4;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    /// Provider that always answers with the same score.
    pub struct FixedScore {
        score: f32,
        calls: AtomicUsize,
    }

    impl FixedScore {
        pub fn new(score: f32) -> Self {
            Self {
                score,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ModelProvider for FixedScore {
        fn predict(&self, _input: &InputTensor) -> Result<f32, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.score)
        }

        fn identifier(&self) -> &str {
            "fixed-score"
        }
    }

    /// Source that serves a fixed payload and counts fetches.
    pub struct CountingSource {
        payload: Option<Vec<u8>>,
        calls: AtomicUsize,
    }

    impl CountingSource {
        pub fn new(payload: Vec<u8>) -> Self {
            Self {
                payload: Some(payload),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing() -> Self {
            Self {
                payload: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ArtifactSource for CountingSource {
        async fn fetch(&self, url: &Url) -> Result<Vec<u8>, ArtifactError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.payload
                .clone()
                .ok_or_else(|| ArtifactError::Download(format!("connection refused: {}", url)))
        }
    }

    pub fn blank_input() -> InputTensor {
        InputTensor::from_array(Array4::zeros(INPUT_SHAPE))
    }

    pub fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    pub fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, Rgb(color));
        encode(DynamicImage::ImageRgb8(image), ImageFormat::Png)
    }
}
