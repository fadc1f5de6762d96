//! Base error type for configuration and time conversion.
//!
//! Downstream crates keep their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `sq-core`.
pub type CoreResult<T> = Result<T, CoreError>;
