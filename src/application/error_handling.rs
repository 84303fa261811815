// src/application/error_handling.rs
//
// Error responses for the presentation layer
//
// ARCHITECTURE:
// - Maps AppError → UI category plus message
// - Infrastructure details stay in the log, never in the response

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Standard error response for UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_type: ErrorType,
    pub message: String,
    pub details: Option<String>,
}

/// Error categories for UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// No session for a per-user operation
    Unauthenticated,

    NotFound,

    /// Signed in, but the target belongs to someone else
    Forbidden,

    /// Invalid input or domain invariant violation
    Validation,

    /// Remote store unreachable or rejected the request
    Backend,

    /// Local persistence failure
    Database,

    Internal,
}

impl ErrorResponse {
    fn new(error_type: ErrorType, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            error_type,
            message: message.into(),
            details,
        }
    }

    pub fn from_app_error(error: &AppError) -> Self {
        match error {
            AppError::Unauthenticated => Self::new(
                ErrorType::Unauthenticated,
                "Sign in to manage your lists",
                None,
            ),

            AppError::NotFound => Self::new(ErrorType::NotFound, "Resource not found", None),

            AppError::Forbidden(list_id) => {
                log::warn!("Rejected access to list {}", list_id);
                Self::new(ErrorType::Forbidden, "You can only change your own lists", None)
            }

            AppError::Domain(domain_error) => Self::new(
                ErrorType::Validation,
                "Validation failed",
                Some(domain_error.to_string()),
            ),

            AppError::Backend(message) => {
                log::error!("Backend error: {}", message);
                Self::new(
                    ErrorType::Backend,
                    "Could not reach the catalog",
                    Some(message.clone()),
                )
            }

            AppError::Database(db_error) => {
                log::error!("Database error: {:?}", db_error);
                Self::new(
                    ErrorType::Database,
                    "Database operation failed",
                    Some("Check logs for details".to_string()),
                )
            }

            AppError::Pool(pool_error) => {
                log::error!("Connection pool error: {}", pool_error);
                Self::new(ErrorType::Database, "Database connection failed", None)
            }

            AppError::Serialization(serde_error) => {
                log::error!("Serialization error: {:?}", serde_error);
                Self::new(ErrorType::Internal, "Data serialization failed", None)
            }

            AppError::Io(io_error) => {
                log::error!("IO error: {:?}", io_error);
                Self::new(
                    ErrorType::Internal,
                    "File system operation failed",
                    Some(io_error.to_string()),
                )
            }

            AppError::Other(message) => {
                log::error!("Other error: {}", message);
                Self::new(ErrorType::Internal, message.clone(), None)
            }
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorType::Validation, message, None)
    }

    /// JSON form handed across the command boundary
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "Internal error".to_string())
    }
}

/// Helper trait to convert Results to serialized ErrorResponse strings
pub trait ToErrorResponse<T> {
    fn to_error_response(self) -> Result<T, String>;
}

impl<T> ToErrorResponse<T> for Result<T, AppError> {
    fn to_error_response(self) -> Result<T, String> {
        self.map_err(|e| ErrorResponse::from_app_error(&e).to_json())
    }
}

/// Wraps an `AppResult` expression into a command result
#[macro_export]
macro_rules! handle_command {
    ($expr:expr) => {
        match $expr {
            Ok(value) => Ok(value),
            Err(e) => Err($crate::application::error_handling::ErrorResponse::from_app_error(&e)
                .to_json()),
        }
    };
}
