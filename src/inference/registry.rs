use std::collections::HashMap;
use std::path::Path;

use crate::config::ModelSpec;

use super::predictor::{Predictor, PredictorError};

/// Width and height, in pixels, that a model's input images are resized to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSize {
    pub width: u32,
    pub height: u32,
}

impl InputSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

pub struct ModelEntry {
    pub name: String,
    pub input_size: InputSize,
    predictor: Box<dyn Predictor>,
}

impl ModelEntry {
    pub fn new(name: impl Into<String>, input_size: InputSize, predictor: Box<dyn Predictor>) -> Self {
        Self {
            name: name.into(),
            input_size,
            predictor,
        }
    }

    pub fn predictor(&self) -> &dyn Predictor {
        self.predictor.as_ref()
    }
}

impl std::fmt::Debug for ModelEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelEntry")
            .field("name", &self.name)
            .field("input_size", &self.input_size)
            .finish_non_exhaustive()
    }
}

/// Model name to loaded predictor, built once at startup and read-only after.
///
/// When the inference runtime could not be brought up the registry is empty
/// and `is_available` is false, so callers can tell "no runtime" apart from
/// "unknown model".
#[derive(Debug)]
pub struct ModelRegistry {
    entries: HashMap<String, ModelEntry>,
    unavailable_reason: Option<String>,
}

impl ModelRegistry {
    /// Load every configured model with `loader`. Loading is all-or-nothing:
    /// any failure leaves the registry empty and unavailable.
    pub fn load<L>(specs: &[ModelSpec], models_dir: &Path, loader: L) -> Self
    where
        L: Fn(&Path) -> Result<Box<dyn Predictor>, PredictorError>,
    {
        let mut entries = HashMap::with_capacity(specs.len());

        for spec in specs {
            let path = models_dir.join(&spec.file);
            match loader(&path) {
                Ok(predictor) => {
                    let entry = ModelEntry::new(
                        spec.name.clone(),
                        InputSize::new(spec.width, spec.height),
                        predictor,
                    );
                    entries.insert(spec.name.clone(), entry);
                }
                Err(PredictorError::RuntimeUnavailable(reason)) => {
                    tracing::warn!(
                        "Inference runtime is not available ({}). Predictions are disabled.",
                        reason
                    );
                    return Self::unavailable(reason);
                }
                Err(e) => {
                    tracing::warn!("Failed to load models at startup: {}", e);
                    return Self::unavailable(e.to_string());
                }
            }
        }

        let mut names: Vec<&str> = entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        tracing::info!("Models loaded: {:?}", names);

        Self {
            entries,
            unavailable_reason: None,
        }
    }

    /// An empty registry flagged as having no inference runtime.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            entries: HashMap::new(),
            unavailable_reason: Some(reason.into()),
        }
    }

    /// Build a registry directly from entries, bypassing file loading.
    pub fn from_entries(entries: impl IntoIterator<Item = ModelEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.name.clone(), entry))
                .collect(),
            unavailable_reason: None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ModelEntry> {
        self.entries.get(name)
    }

    pub fn is_available(&self) -> bool {
        self.unavailable_reason.is_none()
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        self.unavailable_reason.as_deref()
    }

    /// Registered model names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array4;

    fn specs() -> Vec<ModelSpec> {
        vec![
            ModelSpec {
                name: "MobileNet".into(),
                file: "CNN_model.onnx".into(),
                width: 150,
                height: 150,
            },
            ModelSpec {
                name: "VGG16".into(),
                file: "VGG16_model.onnx".into(),
                width: 125,
                height: 125,
            },
        ]
    }

    fn constant(_: &Array4<f32>) -> Result<Vec<f32>, PredictorError> {
        Ok(vec![0.5, 0.5])
    }

    #[test]
    fn loads_every_configured_model_with_its_geometry() {
        let registry = ModelRegistry::load(&specs(), Path::new("/models"), |_| {
            Ok(Box::new(constant) as Box<dyn Predictor>)
        });

        assert!(registry.is_available());
        assert_eq!(registry.names(), vec!["MobileNet", "VGG16"]);
        assert_eq!(registry.get("VGG16").unwrap().input_size, InputSize::new(125, 125));
        assert_eq!(registry.get("MobileNet").unwrap().input_size, InputSize::new(150, 150));
        assert!(registry.get("ResNet").is_none());
    }

    #[test]
    fn loader_receives_paths_inside_models_dir() {
        let seen = std::sync::Mutex::new(Vec::new());
        ModelRegistry::load(&specs(), Path::new("/models"), |path| {
            seen.lock().unwrap().push(path.to_path_buf());
            Ok(Box::new(constant) as Box<dyn Predictor>)
        });

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen[0], Path::new("/models/CNN_model.onnx"));
        assert_eq!(seen[1], Path::new("/models/VGG16_model.onnx"));
    }

    #[test]
    fn missing_runtime_leaves_registry_empty() {
        let registry = ModelRegistry::load(&specs(), Path::new("/models"), |_| {
            Err(PredictorError::RuntimeUnavailable("not installed".into()))
        });

        assert!(!registry.is_available());
        assert!(registry.is_empty());
        assert_eq!(registry.unavailable_reason(), Some("not installed"));
    }

    #[test]
    fn one_bad_model_file_empties_the_whole_registry() {
        let registry = ModelRegistry::load(&specs(), Path::new("/models"), |path| {
            if path.ends_with("VGG16_model.onnx") {
                Err(PredictorError::Load {
                    path: path.display().to_string(),
                    reason: "corrupt".into(),
                })
            } else {
                Ok(Box::new(constant) as Box<dyn Predictor>)
            }
        });

        assert!(!registry.is_available());
        assert!(registry.get("MobileNet").is_none());
    }
}
