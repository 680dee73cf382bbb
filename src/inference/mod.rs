pub mod onnx;
pub mod pipeline;
pub mod predictor;
pub mod preprocess;
pub mod registry;
pub mod upload;

pub use pipeline::{InferencePipeline, Label, PredictionResult, interpret_scores};
pub use predictor::{Predictor, PredictorError};
pub use registry::{InputSize, ModelEntry, ModelRegistry};
pub use upload::{UploadedFile, sanitize_filename};
