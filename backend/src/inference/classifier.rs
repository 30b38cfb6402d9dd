use shared::{Confidence, Label, Verdict};
use std::sync::Arc;

use super::preprocess::{INPUT_SHAPE, InputTensor};
use super::provider::{ModelError, ModelProvider};

/// Scores below this are cataract; the boundary itself counts as normal.
pub const DECISION_THRESHOLD: f32 = 0.5;

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("Input tensor has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        expected: [usize; 4],
        actual: Vec<usize>,
    },
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Confidence is the distance from the opposite class: `score` for normal, `1 - score` for cataract.
pub fn verdict_from_score(score: f32) -> Verdict {
    if score < DECISION_THRESHOLD {
        Verdict {
            label: Label::Cataract,
            confidence: Confidence((1.0 - score) * 100.0),
            score,
        }
    } else {
        Verdict {
            label: Label::Normal,
            confidence: Confidence(score * 100.0),
            score,
        }
    }
}

#[derive(Clone)]
pub struct Classifier {
    provider: Arc<dyn ModelProvider>,
}

impl Classifier {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self { provider }
    }

    pub fn identifier(&self) -> &str {
        self.provider.identifier()
    }

    pub fn classify(&self, input: &InputTensor) -> Result<Verdict, ClassifyError> {
        if input.shape() != INPUT_SHAPE.as_slice() {
            return Err(ClassifyError::ShapeMismatch {
                expected: INPUT_SHAPE,
                actual: input.shape().to_vec(),
            });
        }

        let score = self.provider.predict(input)?;
        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            return Err(ModelError::InvalidScore(score).into());
        }

        let verdict = verdict_from_score(score);
        log::debug!(
            "Score {} classified as {} ({})",
            score,
            verdict.label,
            verdict.confidence
        );
        Ok(verdict)
    }
}
