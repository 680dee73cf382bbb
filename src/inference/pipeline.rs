use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::auth::UserIdentity;
use crate::error::ClassifyError;

use super::preprocess::{decode_image, to_input_tensor};
use super::registry::ModelRegistry;
use super::upload::{UploadedFile, sanitize_filename};

/// Class names produced by the two-output malaria cell models. Index 1 is
/// "Uninfected"; every other index reads as "Parasitized".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Label {
    Parasitized,
    Uninfected,
}

impl Label {
    pub fn from_index(index: usize) -> Self {
        if index == 1 {
            Label::Uninfected
        } else {
            Label::Parasitized
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Parasitized => "Parasitized",
            Label::Uninfected => "Uninfected",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    #[serde(rename = "result")]
    pub label: Label,
    /// Percentage in `[0, 100]`, rounded to two decimals.
    pub confidence: f64,
    /// Path of the stored upload relative to the base directory, `/`-separated.
    pub image_url: String,
}

/// Turn a raw score vector into a label and a percentage confidence.
///
/// Ties go to the first maximal index.
pub fn interpret_scores(scores: &[f32]) -> Result<(Label, f64), ClassifyError> {
    let (index, max) = scores
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, score)| match best {
            Some((_, top)) if score <= top => best,
            _ => Some((i, score)),
        })
        .ok_or_else(|| ClassifyError::Processing("model returned no scores".to_string()))?;

    let confidence = (f64::from(max) * 100.0 * 100.0).round() / 100.0;
    Ok((Label::from_index(index), confidence))
}

/// Validates an upload, stores it, runs the selected model and shapes the
/// outcome. All work is blocking and meant to run off the async executor.
pub struct InferencePipeline {
    registry: Arc<ModelRegistry>,
    upload_dir: PathBuf,
    public_prefix: String,
}

impl InferencePipeline {
    pub fn new(registry: Arc<ModelRegistry>, upload_dir: PathBuf, public_prefix: impl Into<String>) -> Self {
        Self {
            registry,
            upload_dir,
            public_prefix: public_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn classify(
        &self,
        user: &UserIdentity,
        upload: Option<UploadedFile>,
        model_name: Option<&str>,
    ) -> Result<PredictionResult, ClassifyError> {
        let upload = match upload {
            Some(upload) if !upload.filename.is_empty() => upload,
            _ => return Err(ClassifyError::MissingFile),
        };

        if !self.registry.is_available() {
            return Err(ClassifyError::InferenceUnavailable);
        }

        let entry = model_name
            .and_then(|name| self.registry.get(name))
            .ok_or(ClassifyError::InvalidModel)?;

        let filename = sanitize_filename(&upload.filename);
        if filename.is_empty() {
            return Err(ClassifyError::Processing(format!(
                "'{}' is not a usable filename",
                upload.filename
            )));
        }

        // Same filename overwrites the previous upload.
        let path = self.upload_dir.join(&filename);
        std::fs::write(&path, &upload.bytes)?;

        let image = decode_image(&path)?;
        let input = to_input_tensor(&image, entry.input_size);

        let scores = entry
            .predictor()
            .predict(&input)
            .map_err(|e| ClassifyError::Processing(e.to_string()))?;

        let (label, confidence) = interpret_scores(&scores)?;

        tracing::info!(
            "User {} classified {} with {}: {} ({:.2}%)",
            user.user_id,
            filename,
            entry.name,
            label,
            confidence
        );

        Ok(PredictionResult {
            label,
            confidence,
            image_url: format!("{}/{}", self.public_prefix, filename),
        })
    }
}
