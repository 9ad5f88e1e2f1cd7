use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Duplicate {field}: {message}")]
    DuplicateField { field: &'static str, message: String },
    #[error("Invalid {field}: {message}")]
    InvalidField { field: &'static str, message: String },
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

impl AppError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        AppError::InvalidField { field, message: message.into() }
    }

    pub fn forbidden() -> Self {
        AppError::Forbidden("You do not have permission to perform this action.".into())
    }
}

/// Client-facing message for constraint violations reported by either backend.
fn constraint_message(code: &str) -> Option<&'static str> {
    match code {
        // SQLite unique / primary key, PostgreSQL unique_violation
        "2067" | "1555" | "23505" => Some("Resource already exists (duplicate entry)"),
        // SQLite foreign key (insert side) and RESTRICT on delete, PostgreSQL foreign_key_violation
        "787" | "1811" | "23503" => Some("resource is still referenced"),
        _ => None,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                if let Some(message) = e.as_database_error()
                    .and_then(|db_err| constraint_message(&db_err.code().unwrap_or_default()))
                {
                    return (StatusCode::CONFLICT, Json(json!({ "error": message }))).into_response();
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "invalid credentials".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::DuplicateField { field, message } => {
                return (
                    StatusCode::CONFLICT,
                    Json(json!({ "error": message, "field": field }))
                ).into_response();
            }
            AppError::InvalidField { field, message } => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": message, "field": field }))
                ).into_response();
            }
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn field_errors_name_the_field() {
        let response = AppError::invalid("billing_period", "Billing period must be in YYYY-MM format").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_of(response).await;
        assert_eq!(body["field"], "billing_period");
        assert_eq!(body["error"], "Billing period must be in YYYY-MM format");
    }

    #[tokio::test]
    async fn unauthorized_is_uniform() {
        let response = AppError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_of(response).await["error"], "invalid credentials");
    }

    #[tokio::test]
    async fn duplicate_field_is_conflict() {
        let response = AppError::DuplicateField {
            field: "email",
            message: "A user with this email already exists.".into(),
        }.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(body_of(response).await["field"], "email");
    }

    #[test]
    fn restrict_and_foreign_key_codes_map_to_referenced() {
        for code in ["787", "1811", "23503"] {
            assert_eq!(constraint_message(code), Some("resource is still referenced"), "{code}");
        }
        assert_eq!(constraint_message("2067"), Some("Resource already exists (duplicate entry)"));
        assert_eq!(constraint_message("5"), None);
    }
}
