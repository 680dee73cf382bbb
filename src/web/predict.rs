use axum::{
    Extension,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::SignedCookieJar;

use crate::auth::{UserIdentity, flash};
use crate::error::ClassifyError;
use crate::inference::UploadedFile;
use crate::state::AppState;

use super::pages;
use super::respond::{self, ResponseMode};

pub async fn predict_page(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    jar: SignedCookieJar,
) -> impl IntoResponse {
    let (jar, flashes) = flash::take(jar);
    let models = state.pipeline.registry().names();
    (jar, Html(pages::predict(&user, &models, &flashes, None)))
}

pub async fn predict(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    jar: SignedCookieJar,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let mode = ResponseMode::from_headers(&headers);

    let outcome = match multipart {
        // Anything that is not a multipart form carries no file.
        Err(_) => Err(ClassifyError::MissingFile),
        Ok(multipart) => match read_form(multipart).await {
            Err(e) => Err(e),
            Ok((upload, model)) => {
                let pipeline = state.pipeline.clone();
                let caller = user.clone();
                tokio::task::spawn_blocking(move || {
                    pipeline.classify(&caller, upload, model.as_deref())
                })
                .await
                .unwrap_or_else(|e| Err(ClassifyError::Processing(e.to_string())))
            }
        },
    };

    if let Err(e) = &outcome {
        tracing::warn!("Prediction failed for user {}: {}", user.user_id, e);
    }

    let models = state.pipeline.registry().names();
    respond::prediction(mode, jar, &user, &models, outcome)
}

/// Pull the `file` and `model` fields out of a predict form. Other fields are
/// ignored.
async fn read_form(
    mut multipart: Multipart,
) -> Result<(Option<UploadedFile>, Option<String>), ClassifyError> {
    let mut upload = None;
    let mut model = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ClassifyError::Processing(e.to_string()))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ClassifyError::Processing(e.to_string()))?;
                upload = Some(UploadedFile::new(filename, bytes));
            }
            Some("model") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ClassifyError::Processing(e.to_string()))?;
                model = Some(value);
            }
            _ => {}
        }
    }

    Ok((upload, model))
}
