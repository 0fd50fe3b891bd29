//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used by the HTTP layer.
//! Lower layers (tokens, stores, the repository) carry their own error
//! enums; `From` implementations fold them into `AppError` so handlers can
//! use the `?` operator and still produce the right status code.
//!
//! `AppError` implements `actix_web::error::ResponseError`, rendering every
//! variant as a JSON body of the form `{"error": "..."}`.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use log::error;
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::auth::token::TokenError;
use crate::repository::RepositoryError;
use crate::store::StoreError;

/// Represents all possible errors that can reach an HTTP response.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing, invalid or expired credentials (HTTP 401).
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// Malformed request input (HTTP 400).
    #[error("Bad Request: {0}")]
    BadRequest(String),
    /// The resource does not exist, or is not visible to the caller (HTTP 404).
    #[error("Not Found: {0}")]
    NotFound(String),
    /// An unexpected server-side error (HTTP 500).
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
    /// The backing store failed or did not answer in time (HTTP 500).
    /// The detail is logged but never returned to the client.
    #[error("Store Unavailable: {0}")]
    StoreUnavailable(String),
    /// Input failed `validator` rules (HTTP 400).
    #[error("Validation Error: {0}")]
    ValidationError(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::StoreUnavailable(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::StoreUnavailable(detail) => {
                error!("store unavailable: {}", detail);
                "Store unavailable".to_string()
            }
            AppError::InternalServerError(detail) => {
                error!("internal error: {}", detail);
                "Internal server error".to_string()
            }
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::ValidationError(msg) => msg.clone(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
///
/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Every token failure is an authentication failure from the client's view.
impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        match error {
            TokenError::Signing(msg) => AppError::InternalServerError(msg),
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        AppError::StoreUnavailable(error.to_string())
    }
}

/// Maps repository outcomes onto HTTP semantics.
///
/// `NotFound` only arises from the login lookup, so it becomes a 401 that is
/// indistinguishable from a wrong password.
impl From<RepositoryError> for AppError {
    fn from(error: RepositoryError) -> AppError {
        match error {
            RepositoryError::NotFoundOrForbidden | RepositoryError::NothingDeleted => {
                AppError::NotFound("Task not found".into())
            }
            RepositoryError::NotFound => AppError::Unauthorized("Invalid credentials".into()),
            RepositoryError::EmailTaken => AppError::BadRequest("Email already registered".into()),
            RepositoryError::Store(e) => e.into(),
        }
    }
}
