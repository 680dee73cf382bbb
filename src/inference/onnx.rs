//! ONNX Runtime backed predictors.
//!
//! With the `onnx` feature enabled, `OnnxPredictor` loads a model file into an
//! ONNX Runtime session. Without it, loading always reports the runtime as
//! unavailable so the registry starts empty.

use std::path::Path;

use super::predictor::{Predictor, PredictorError};

#[cfg(feature = "onnx")]
mod inner {
    use std::path::Path;
    use std::sync::Mutex;

    use ndarray::Array4;
    use ort::{session::Session, value::Tensor};

    use crate::inference::predictor::{Predictor, PredictorError};

    pub struct OnnxPredictor {
        session: Mutex<Session>,
        input_name: String,
    }

    impl OnnxPredictor {
        pub fn load(path: &Path) -> Result<Self, PredictorError> {
            let load_error = |reason: String| PredictorError::Load {
                path: path.display().to_string(),
                reason,
            };

            let session = Session::builder()
                .map_err(|e| PredictorError::RuntimeUnavailable(e.to_string()))?
                .commit_from_file(path)
                .map_err(|e| load_error(e.to_string()))?;

            let input_name = session
                .inputs()
                .first()
                .map(|i| i.name().to_string())
                .unwrap_or_else(|| "input".to_string());

            Ok(OnnxPredictor {
                session: Mutex::new(session),
                input_name,
            })
        }
    }

    impl Predictor for OnnxPredictor {
        fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, PredictorError> {
            let shape: Vec<i64> = input.shape().iter().map(|&d| d as i64).collect();
            let data: Vec<f32> = input.iter().copied().collect();

            let tensor = Tensor::from_array((shape, data))
                .map_err(|e| PredictorError::Inference(format!("tensor creation error: {}", e)))?;

            let mut session = self
                .session
                .lock()
                .map_err(|e| PredictorError::Inference(format!("session lock error: {}", e)))?;

            let outputs = session
                .run(ort::inputs![self.input_name.as_str() => tensor])
                .map_err(|e| PredictorError::Inference(e.to_string()))?;

            let (_, scores) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| PredictorError::Inference(format!("output extract error: {}", e)))?;

            Ok(scores.to_vec())
        }
    }
}

#[cfg(not(feature = "onnx"))]
mod inner {
    use std::path::Path;

    use ndarray::Array4;

    use crate::inference::predictor::{Predictor, PredictorError};

    /// Placeholder used when the crate is built without ONNX Runtime.
    pub struct OnnxPredictor {
        _private: (),
    }

    impl OnnxPredictor {
        pub fn load(_path: &Path) -> Result<Self, PredictorError> {
            Err(PredictorError::RuntimeUnavailable(
                "built without the 'onnx' feature, rebuild with: cargo build --features onnx"
                    .to_string(),
            ))
        }
    }

    impl Predictor for OnnxPredictor {
        fn predict(&self, _input: &Array4<f32>) -> Result<Vec<f32>, PredictorError> {
            Err(PredictorError::RuntimeUnavailable(
                "built without the 'onnx' feature".to_string(),
            ))
        }
    }
}

pub use inner::OnnxPredictor;

/// Loader handed to the model registry at startup.
pub fn load_predictor(path: &Path) -> Result<Box<dyn Predictor>, PredictorError> {
    Ok(Box::new(OnnxPredictor::load(path)?))
}

#[cfg(all(test, not(feature = "onnx")))]
mod tests {
    use super::*;

    #[test]
    fn loading_without_runtime_reports_unavailable() {
        let err = load_predictor(Path::new("Models/CNN_model.onnx")).err().unwrap();
        assert!(matches!(err, PredictorError::RuntimeUnavailable(_)));
    }
}
