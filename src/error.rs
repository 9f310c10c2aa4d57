use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Payload(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, code, message) = match self {
            Error::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg),
            Error::Payload(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                err.to_string(),
            ),
            Error::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            Error::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "method_not_allowed",
                "Method not allowed".to_string(),
            ),
            // Store failures surface generically, message passed through verbatim.
            Error::Database(err) => (StatusCode::BAD_REQUEST, "bad_request", err.to_string()),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "bad_request", err.to_string()),
            Error::Anyhow(err) => (StatusCode::BAD_REQUEST, "bad_request", err.to_string()),
            Error::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "bad_request", msg),
        };

        let body = Json(json!({ "error": { "code": code, "message": message } }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}
