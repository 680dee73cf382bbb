use axum::{
    Json,
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::SignedCookieJar;
use serde_json::json;

use crate::auth::{Flash, UserIdentity, flash};
use crate::error::ClassifyError;
use crate::inference::PredictionResult;

use super::pages;

/// How the caller wants the outcome of a predict request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Json,
    Page,
}

impl ResponseMode {
    /// Programmatic clients announce themselves with `X-Requested-With`, a JSON
    /// body, or an `Accept` header that leads with JSON.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header_str = |name: header::HeaderName| headers.get(name).and_then(|v| v.to_str().ok());

        let ajax = header_str(header::HeaderName::from_static("x-requested-with"))
            .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"));

        let json_body = header_str(header::CONTENT_TYPE).is_some_and(is_json_media_type);

        let json_accept = header_str(header::ACCEPT)
            .and_then(|v| v.split(',').next())
            .is_some_and(is_json_media_type);

        if ajax || json_body || json_accept {
            ResponseMode::Json
        } else {
            ResponseMode::Page
        }
    }
}

fn is_json_media_type(value: &str) -> bool {
    let essence = value.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Shape a classification outcome for the caller.
///
/// JSON callers get `{result, confidence, image_url}` with 200 or `{error}`
/// with 400. Browsers always get a 200 page; failures show up as notices.
pub fn prediction(
    mode: ResponseMode,
    jar: SignedCookieJar,
    user: &UserIdentity,
    models: &[String],
    outcome: Result<PredictionResult, ClassifyError>,
) -> Response {
    match mode {
        ResponseMode::Json => match outcome {
            Ok(result) => (StatusCode::OK, Json(result)).into_response(),
            Err(err) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response(),
        },
        ResponseMode::Page => {
            let (jar, mut flashes) = flash::take(jar);
            let result = match outcome {
                Ok(result) => Some(result),
                Err(err) => {
                    flashes.push(Flash::danger(err.to_string()));
                    None
                }
            };
            let html = pages::predict(user, models, &flashes, result.as_ref());
            (StatusCode::OK, jar, Html(html)).into_response()
        }
    }
}
