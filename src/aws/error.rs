//! AWS error classification
//!
//! Classifies AWS SDK errors by their `.code()` so the fetcher can decide
//! whether a failure is the tolerated launch-template-deleted race or a
//! real error that must abort the sync.

use aws_sdk_ec2::error::{ProvideErrorMetadata, SdkError};
use thiserror::Error;

/// AWS error categories relevant to the sync pipeline
#[derive(Debug, Error)]
pub enum AwsError {
    /// Resource was not found (tolerated during version fetch)
    #[error("Resource not found: {message}")]
    NotFound { message: String },

    /// Generic AWS SDK error with code and message
    #[error("AWS error: {message}")]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }
}

/// AWS error codes EC2 reports when a launch template has been deleted
/// between listing it and fetching its versions.
const NOT_FOUND_CODES: &[&str] = &[
    "InvalidLaunchTemplateId.NotFound",
    "InvalidLaunchTemplateName.NotFoundException",
];

/// Classify an AWS error from its code and message.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound { message },
        _ => AwsError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Classify an SDK operation error via its error metadata.
pub fn classify_sdk_error<E, R>(err: &SdkError<E, R>) -> AwsError
where
    SdkError<E, R>: ProvideErrorMetadata,
{
    classify_aws_error(err.code(), err.message())
}
