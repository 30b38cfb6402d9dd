use std::path::Path;
use std::sync::{Arc, Mutex};
use tch::{CModule, Device, Kind, Tensor};

use super::artifact::ArtifactError;
use super::preprocess::InputTensor;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Torch error: {0}")]
    Torch(#[from] tch::TchError),
    #[error("Model produced an invalid score: {0}")]
    InvalidScore(f32),
    #[error("Model produced no output")]
    EmptyOutput,
    #[error("Input tensor is not contiguous")]
    NonContiguousInput,
    #[error("Model lock poisoned")]
    Poisoned,
}

/// A loaded network that maps one input tensor to a single score.
pub trait ModelProvider: Send + Sync {
    fn predict(&self, input: &InputTensor) -> Result<f32, ModelError>;

    fn identifier(&self) -> &str;
}

#[derive(Clone)]
pub struct TorchModel {
    model: Arc<Mutex<CModule>>,
    device: Device,
    identifier: String,
}

impl TorchModel {
    pub fn load(path: &Path, identifier: impl Into<String>) -> Result<Self, ArtifactError> {
        let device = Device::cuda_if_available();
        let corrupt = |e: tch::TchError| ArtifactError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let mut module = CModule::load_on_device(path, device).map_err(corrupt)?;
        module.f_set_eval().map_err(corrupt)?;

        log::info!("Loaded model from {} on {:?}", path.display(), device);
        Ok(Self {
            model: Arc::new(Mutex::new(module)),
            device,
            identifier: identifier.into(),
        })
    }
}

impl ModelProvider for TorchModel {
    fn predict(&self, input: &InputTensor) -> Result<f32, ModelError> {
        let data = input.as_slice().ok_or(ModelError::NonContiguousInput)?;
        let shape: Vec<i64> = input.shape().iter().map(|&d| d as i64).collect();
        let tensor = Tensor::from_slice(data)
            .f_view(shape.as_slice())?
            .to_device(self.device);

        let module = self.model.lock().map_err(|_| ModelError::Poisoned)?;
        let output = tch::no_grad(|| module.forward_ts(&[tensor]))?;

        let output: Vec<f32> = output
            .to_kind(Kind::Float)
            .to_device(Device::Cpu)
            .f_view([-1])?
            .try_into()?;
        output.first().copied().ok_or(ModelError::EmptyOutput)
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}
