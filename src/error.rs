use std::collections::BTreeMap;
use std::fmt::Display;

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

pub type AppResult<T> = Result<T, AppError>;

/// Field name → messages, rendered as the body of a 400 response.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Message for a write-only reference to a record that does not exist.
pub fn pk_does_not_exist(pk: impl Display) -> String {
    format!("Invalid pk \"{}\" - object does not exist.", pk)
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0:?}")]
    Validation(FieldErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    UnsupportedMediaType(String),

    #[error("{0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => AppError::UnsupportedMediaType(
                "Unsupported media type in request. Expected application/json.".to_string(),
            ),
            other => AppError::BadRequest(format!("JSON parse error - {}", other.body_text())),
        }
    }
}

/// A path id that does not parse can never match a record.
impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::NotFound(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            AppError::Validation(errors) => {
                debug!(fields = ?errors.fields().collect::<Vec<_>>(), "Validation failed");
                json!(errors)
            }
            AppError::BadRequest(detail) | AppError::UnsupportedMediaType(detail) => {
                debug!(%detail, "Rejected request");
                json!({ "detail": detail })
            }
            AppError::NotFound(message) => {
                debug!(%message, "Not found");
                json!({ "detail": "Not found." })
            }
            AppError::Database(err) => {
                error!(error = %err, "Database error");
                json!({ "detail": "A server error occurred." })
            }
            AppError::Internal(err) => {
                error!(error = %err, "Internal error");
                json!({ "detail": "A server error occurred." })
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn status_code_mapping() {
        assert_eq!(
            AppError::Validation(FieldErrors::single("name", "x")).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::UnsupportedMediaType("x".into()).status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn field_errors_accumulate_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("price", "first");
        errors.add("price", "second");
        errors.add("name", "third");
        assert_eq!(errors.get("price").unwrap(), ["first", "second"]);
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["name", "price"]);
    }

    #[tokio::test]
    async fn validation_body_maps_fields_to_messages() {
        let mut errors = FieldErrors::new();
        errors.add("category_id", pk_does_not_exist(999));
        let (status, body) = body_of(AppError::Validation(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "category_id": ["Invalid pk \"999\" - object does not exist."] })
        );
    }

    #[tokio::test]
    async fn not_found_hides_internal_message() {
        let (status, body) = body_of(AppError::NotFound("Product 7 not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "detail": "Not found." }));
    }

    #[tokio::test]
    async fn server_errors_use_generic_detail() {
        let (status, body) = body_of(AppError::Database(sqlx::Error::PoolTimedOut)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "detail": "A server error occurred." }));
    }
}
