//! Cloud cleanup error types

use thiserror::Error;

/// Errors raised by the cleanup core
///
/// Only [`CloudError::RoleAssumption`] and configuration errors end a run.
/// Listing and deletion failures are folded into the per-type report instead.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Invalid account id: {0}")]
    InvalidAccountId(String),

    #[error("Role assumption failed: {0}")]
    RoleAssumption(String),

    #[error("Listing failed: {0}")]
    ListingFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, CloudError>;
