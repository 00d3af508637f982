//! # AppError
//!
//! Centralized error handling for GameMe.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all gm-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Validation failure caught before any remote call
    #[error("{0}")]
    ValidationError(String),

    /// The hosted store rejected or failed a request
    #[error("store error: {0}")]
    Store(#[source] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::ValidationError(message.into())
    }
}

/// A specialized Result type for GameMe logic.
pub type Result<T> = std::result::Result<T, AppError>;
