//! AWS provider error types

use aws_sdk_sts::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use std::error::Error as StdError;
use std::fmt::Debug;
use sweepflow_cloud::{CloudError, DeletionOutcome};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("Failed to assume {role_arn}: {reason}")]
    RoleAssumption { role_arn: String, reason: String },

    #[error("STS returned no credentials for {0}")]
    MissingCredentials(String),

    #[error("Failed to build request: {0}")]
    Build(#[from] aws_sdk_s3::error::BuildError),

    #[error("AWS API error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, AwsError>;

impl From<AwsError> for CloudError {
    fn from(err: AwsError) -> Self {
        match err {
            AwsError::RoleAssumption { .. } | AwsError::MissingCredentials(_) => {
                CloudError::RoleAssumption(err.to_string())
            }
            AwsError::Build(_) | AwsError::Api(_) => CloudError::ApiError(err.to_string()),
        }
    }
}

/// Render an SDK error as `Code: message` when the service answered,
/// otherwise with its full source chain
pub fn describe<E, R>(err: &SdkError<E, R>) -> String
where
    E: ProvideErrorMetadata + StdError + 'static,
    R: Debug,
{
    match err.as_service_error() {
        Some(service) => match (service.code(), service.message()) {
            (Some(code), Some(message)) => format!("{}: {}", code, message),
            (Some(code), None) => code.to_string(),
            _ => DisplayErrorContext(err).to_string(),
        },
        None => DisplayErrorContext(err).to_string(),
    }
}

/// Error codes meaning the target of a delete call no longer exists
pub const NOT_FOUND_CODES: [&str; 5] = [
    "NoSuchBucket",
    "NoSuchHostedZone",
    "InvalidVolume.NotFound",
    "InvalidSnapshot.NotFound",
    "InvalidInstanceID.NotFound",
];

pub fn is_not_found(code: Option<&str>) -> bool {
    code.is_some_and(|code| NOT_FOUND_CODES.contains(&code))
}

/// Classify the result of a delete call
///
/// A target that is already gone is not a failure; everything else that went
/// wrong keeps its `Code: message` rendering.
pub fn deletion_outcome<T, E, R>(result: std::result::Result<T, SdkError<E, R>>) -> DeletionOutcome
where
    E: ProvideErrorMetadata + StdError + 'static,
    R: Debug,
{
    match result {
        Ok(_) => DeletionOutcome::Deleted,
        Err(err) => {
            let code = err.as_service_error().and_then(|service| service.code());
            if is_not_found(code) {
                DeletionOutcome::AlreadyGone
            } else {
                DeletionOutcome::Failed(describe(&err))
            }
        }
    }
}

/// Shorthand for listing calls, whose errors end one family's pass
pub(crate) fn listing_failed<E, R>(what: &str, err: &SdkError<E, R>) -> CloudError
where
    E: ProvideErrorMetadata + StdError + 'static,
    R: Debug,
{
    CloudError::ListingFailed(format!("{}: {}", what, describe(err)))
}
