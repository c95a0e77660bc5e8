use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    DatabaseError(sqlx::Error),
    MigrationError(sqlx::migrate::MigrateError),
    ConfigError(String),
    InternalError(String),
    NotFound(String),
    BadRequest(String),
    ConcurrencyConflict(i32),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(e) => write!(f, "Database error: {}", e),
            AppError::MigrationError(e) => write!(f, "Migration error: {}", e),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::ConcurrencyConflict(id) => {
                write!(f, "Concurrent update conflict for product {}", id)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(err)
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::MigrationError(err)
    }
}

impl From<std::env::VarError> for AppError {
    fn from(err: std::env::VarError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::DatabaseError(_)
            | AppError::MigrationError(_)
            | AppError::ConfigError(_)
            | AppError::InternalError(_)
            | AppError::ConcurrencyConflict(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match self {
            AppError::DatabaseError(ref e) => {
                tracing::error!("Database error: {:?}", e);
                "Internal server error"
            }
            AppError::MigrationError(ref e) => {
                tracing::error!("Migration error: {:?}", e);
                "Internal server error"
            }
            AppError::ConfigError(ref msg) => {
                tracing::error!("Configuration error: {}", msg);
                "Server configuration error"
            }
            AppError::InternalError(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                msg.as_str()
            }
            AppError::ConcurrencyConflict(id) => {
                tracing::error!(product_id = id, "Concurrent update conflict");
                "Concurrent update conflict"
            }
            AppError::NotFound(ref msg) => msg.as_str(),
            AppError::BadRequest(ref msg) => msg.as_str(),
        };

        let body = Json(json!({
            "message": error_message,
        }));

        (status, body).into_response()
    }
}
