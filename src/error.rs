//! Application-wide error types for the binary.
//!
//! Library operations carry their own error enums ([`FetchError`],
//! [`IntakeError`], [`VerificationError`]); this wraps them for `main`.

use thiserror::Error;

use crate::config::FetchError;
use crate::intake::IntakeError;
use crate::verification::VerificationError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("usage: {0}")]
    Usage(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
