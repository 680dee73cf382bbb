use ndarray::Array4;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PredictorError {
    #[error("inference runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("failed to load model '{path}': {reason}")]
    Load { path: String, reason: String },

    #[error("inference failed: {0}")]
    Inference(String),
}

/// A loaded image classifier.
///
/// Input is a batch of one normalized RGB image laid out as
/// `(1, height, width, 3)` with values in `[0, 1]`. Output is one score per
/// class.
pub trait Predictor: Send + Sync {
    fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, PredictorError>;
}

impl<F> Predictor for F
where
    F: Fn(&Array4<f32>) -> Result<Vec<f32>, PredictorError> + Send + Sync,
{
    fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, PredictorError> {
        self(input)
    }
}
