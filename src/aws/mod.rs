//! AWS client modules
//!
//! This module wraps the AWS SDK clients the sync pipeline needs:
//! - EC2: launch template and launch template version listing
//! - STS: account ID lookup

pub mod account;
pub mod context;
pub mod error;
pub mod launch_templates;

pub use account::{get_current_account_id, AccountId};
pub use context::AwsContext;
pub use error::{classify_aws_error, classify_sdk_error, AwsError};
pub use launch_templates::Ec2Client;

use anyhow::{Context, Result};

/// Discover all regions enabled for the current account via `DescribeRegions`.
///
/// Used when no explicit region list is configured.
pub async fn discover_regions(ctx: &AwsContext) -> Result<Vec<String>> {
    let client = ctx.ec2_client();
    let response = client
        .describe_regions()
        .send()
        .await
        .context("Failed to describe regions")?;

    let mut regions: Vec<String> = response
        .regions
        .unwrap_or_default()
        .into_iter()
        .filter_map(|r| r.region_name)
        .collect();
    regions.sort();

    Ok(regions)
}
