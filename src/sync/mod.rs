//! Launch template sync orchestration
//!
//! One pass per run: every configured region is fetched, transformed, and
//! loaded in sequence, then a single cleanup pass reaps records the run did
//! not re-observe. An unrecoverable error in one region aborts the run
//! before cleanup; records loaded up to that point keep the current tag and
//! are reaped by the next completed run.

pub mod records;
pub mod transform;

use crate::aws::{AccountId, AwsContext, Ec2Client};
use crate::graph::{to_node_records, GraphStore, ReapParams, SyncScope};
use anyhow::Result;
use records::{LAUNCH_TEMPLATE, LAUNCH_TEMPLATE_VERSION};
use tracing::{debug, info};

/// Sync launch templates and their versions for every region, then reap
/// stale records once across all regions.
pub async fn sync_launch_templates(
    graph: &dyn GraphStore,
    regions: &[String],
    account_id: &AccountId,
    update_tag: i64,
    aws_profile: Option<&str>,
) -> Result<()> {
    for region in regions {
        info!(
            region = %region,
            account = %account_id,
            "Syncing launch templates"
        );
        let ctx = AwsContext::with_profile(region, aws_profile).await;
        let ec2 = Ec2Client::from_context(&ctx);
        sync_region(graph, &ec2, account_id, update_tag).await?;
    }

    cleanup(graph, account_id, update_tag).await
}

/// Fetch, transform, and load one region's templates and versions.
pub async fn sync_region(
    graph: &dyn GraphStore,
    ec2: &Ec2Client,
    account_id: &AccountId,
    update_tag: i64,
) -> Result<()> {
    let templates = ec2.describe_launch_templates().await?;
    let versions = ec2.describe_launch_template_versions(&templates).await?;

    let scope = SyncScope {
        region: ec2.region().to_string(),
        account_id: account_id.to_string(),
        update_tag,
    };

    let template_records = transform::transform_launch_templates(templates, &versions)?;
    graph
        .upsert_nodes(
            &LAUNCH_TEMPLATE,
            &to_node_records(&LAUNCH_TEMPLATE, &template_records)?,
            &scope,
        )
        .await?;

    let version_records = transform::transform_launch_template_versions(versions)?;
    graph
        .upsert_nodes(
            &LAUNCH_TEMPLATE_VERSION,
            &to_node_records(&LAUNCH_TEMPLATE_VERSION, &version_records)?,
            &scope,
        )
        .await?;

    debug!(
        region = %scope.region,
        templates = template_records.len(),
        versions = version_records.len(),
        "Loaded launch template records"
    );

    Ok(())
}

/// Reap launch template and version nodes whose update tag is not the
/// current run's. Runs once per entity type, only after every region has
/// been loaded.
pub async fn cleanup(
    graph: &dyn GraphStore,
    account_id: &AccountId,
    update_tag: i64,
) -> Result<()> {
    info!(account = %account_id, "Running launch template cleanup");

    let params = ReapParams {
        account_id: account_id.to_string(),
        update_tag,
    };
    let templates = graph.reap_stale(&LAUNCH_TEMPLATE, &params).await?;
    let versions = graph.reap_stale(&LAUNCH_TEMPLATE_VERSION, &params).await?;

    debug!(templates, versions, "Reaped stale launch template records");

    Ok(())
}
