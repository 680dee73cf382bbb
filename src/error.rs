use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failures of the session and credential flows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Please log in to access this page.")]
    Unauthenticated,

    #[error("Please fill out all fields.")]
    MissingFields,

    #[error("Email already registered. Please log in.")]
    DuplicateEmail,

    #[error("Invalid credentials. Please try again.")]
    InvalidCredentials,
}

/// Every way a classification request can fail. The display text is the
/// message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("Please select an image file.")]
    MissingFile,

    #[error("Please select a valid model.")]
    InvalidModel,

    #[error("Predictions are unavailable: no inference runtime is loaded.")]
    InferenceUnavailable,

    #[error("Error processing file: {0}")]
    Decode(String),

    #[error("Error processing file: {0}")]
    Processing(String),
}

impl From<std::io::Error> for ClassifyError {
    fn from(err: std::io::Error) -> Self {
        ClassifyError::Processing(err.to_string())
    }
}

/// Infrastructure failures that are not part of any user-facing flow.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    Password(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("{}", self);
        let body = Json(json!({ "error": "Internal server error" }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_messages_are_user_facing() {
        assert_eq!(ClassifyError::MissingFile.to_string(), "Please select an image file.");
        assert_eq!(ClassifyError::InvalidModel.to_string(), "Please select a valid model.");
        assert_eq!(
            ClassifyError::Decode("unsupported format".into()).to_string(),
            "Error processing file: unsupported format"
        );
    }

    #[test]
    fn io_errors_become_processing_errors() {
        let err: ClassifyError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, ClassifyError::Processing(ref msg) if msg == "gone"));
    }

    #[test]
    fn app_error_hides_database_details() {
        let response = AppError::Database(sqlx::Error::RowNotFound).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
