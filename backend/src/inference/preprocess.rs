use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbImage};
use ndarray::{Array3, Array4, Axis};

pub const INPUT_SIZE: u32 = 299;
pub const INPUT_CHANNELS: usize = 3;
pub const INPUT_SHAPE: [usize; 4] = [1, INPUT_SIZE as usize, INPUT_SIZE as usize, INPUT_CHANNELS];

const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Unsupported channel count {0}, expected 3")]
    UnsupportedChannels(u8),
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to build input tensor: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Model input in NHWC layout, normalized to roughly `[-1, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor(Array4<f32>);

impl InputTensor {
    #[cfg(test)]
    pub fn from_array(array: Array4<f32>) -> Self {
        Self(array)
    }

    pub fn shape(&self) -> &[usize] {
        self.0.shape()
    }

    #[cfg(test)]
    pub fn as_array(&self) -> &Array4<f32> {
        &self.0
    }

    /// Contiguous row-major view of the values, if the layout allows it.
    pub fn as_slice(&self) -> Option<&[f32]> {
        self.0.as_slice()
    }
}

/// Identifies the container format from the leading bytes.
///
/// JPEG and PNG are accepted. Any other recognised image format is an error;
/// `Ok(None)` means the bytes carry no known image signature at all.
pub fn sniff_format(bytes: &[u8]) -> Result<Option<ImageFormat>, PreprocessError> {
    match image::guess_format(bytes) {
        Ok(format @ (ImageFormat::Jpeg | ImageFormat::Png)) => Ok(Some(format)),
        Ok(other) => Err(PreprocessError::UnsupportedFormat(format!("{:?}", other))),
        Err(_) => Ok(None),
    }
}

/// Decodes strictly as `format`; bytes of any other format fail with `Decode`.
pub fn decode(bytes: &[u8], format: ImageFormat) -> Result<DynamicImage, PreprocessError> {
    Ok(image::load_from_memory_with_format(bytes, format)?)
}

/// Grey, grey+alpha, RGB and RGBA at any bit depth become 8-bit RGB; alpha is dropped.
pub fn to_rgb(image: DynamicImage) -> Result<RgbImage, PreprocessError> {
    check_channels(image.color().channel_count())?;
    Ok(image.into_rgb8())
}

// `ColorType` is non-exhaustive; layouts added by future `image` releases are refused here.
fn check_channels(channels: u8) -> Result<(), PreprocessError> {
    match channels {
        1..=4 => Ok(()),
        other => Err(PreprocessError::UnsupportedChannels(other)),
    }
}

pub fn preprocess(image: DynamicImage) -> Result<InputTensor, PreprocessError> {
    let rgb = to_rgb(image)?;

    let resized = imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, RESIZE_FILTER);

    let side = INPUT_SIZE as usize;
    let pixels: Vec<f32> = resized.into_raw().into_iter().map(f32::from).collect();
    let array = Array3::from_shape_vec((side, side, INPUT_CHANNELS), pixels)?;

    let mut batch = array.insert_axis(Axis(0));
    batch.mapv_inplace(normalize);

    Ok(InputTensor(batch))
}

pub fn preprocess_bytes(bytes: &[u8], format: ImageFormat) -> Result<InputTensor, PreprocessError> {
    preprocess(decode(bytes, format)?)
}

// InceptionV3 scaling: [0, 255] -> [-1, 1]
fn normalize(value: f32) -> f32 {
    value / 127.5 - 1.0
}
