//! AWS account identity

use anyhow::{Context, Result};
use tracing::info;

/// Strongly-typed AWS account ID (12-digit string)
///
/// Every node written to the graph is scoped by the owning account, so the
/// newtype keeps account IDs from being mixed up with other strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::Deref)]
pub struct AccountId(String);

impl AccountId {
    /// Create an AccountId for testing purposes
    pub fn new(s: impl Into<String>) -> Self {
        AccountId(s.into())
    }
}

/// Fetch the current AWS account ID from credentials via STS GetCallerIdentity
///
/// Requires no special permissions; it succeeds whenever credentials are
/// valid, which also makes it a credential check at startup.
pub async fn get_current_account_id(config: &aws_config::SdkConfig) -> Result<AccountId> {
    let sts = aws_sdk_sts::Client::new(config);
    let identity = sts
        .get_caller_identity()
        .send()
        .await
        .context("Failed to get AWS caller identity - check credentials")?;

    let account = identity
        .account()
        .context("No account ID returned from STS GetCallerIdentity")?;

    info!(account_id = %account, "AWS account validated");

    Ok(AccountId(account.to_string()))
}
