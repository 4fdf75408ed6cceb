//! Live AWS integration tests
//!
//! These tests hit real AWS APIs and are ignored by default. Run them
//! explicitly with `cargo test -- --ignored` against an account with
//! valid credentials.

use fleetmap::aws::{discover_regions, get_current_account_id, AwsContext, Ec2Client};

const TEST_REGION: &str = "us-east-1";

#[tokio::test]
#[ignore = "requires AWS credentials"]
async fn account_id_resolves() {
    let ctx = AwsContext::new(TEST_REGION).await;
    let account = get_current_account_id(ctx.sdk_config()).await.unwrap();
    assert_eq!(account.len(), 12);
}

#[tokio::test]
#[ignore = "requires AWS credentials"]
async fn region_discovery_includes_the_bootstrap_region() {
    let ctx = AwsContext::new(TEST_REGION).await;
    let regions = discover_regions(&ctx).await.unwrap();
    assert!(regions.iter().any(|r| r == TEST_REGION));
}

#[tokio::test]
#[ignore = "requires AWS credentials"]
async fn launch_templates_list_without_error() {
    let ctx = AwsContext::new(TEST_REGION).await;
    let ec2 = Ec2Client::from_context(&ctx);

    let templates = ec2.describe_launch_templates().await.unwrap();
    let versions = ec2
        .describe_launch_template_versions(&templates)
        .await
        .unwrap();

    // Every version belongs to a listed template.
    for version in &versions {
        let id = version.launch_template_id().unwrap();
        assert!(templates
            .iter()
            .any(|t| t.launch_template_id() == Some(id)));
    }
}

#[tokio::test]
#[ignore = "requires AWS credentials"]
async fn deleted_template_yields_zero_versions() {
    let ctx = AwsContext::new(TEST_REGION).await;
    let ec2 = Ec2Client::from_context(&ctx);

    // A well-formed id that does not exist: EC2 reports
    // InvalidLaunchTemplateId.NotFound, which the fetcher tolerates.
    let versions = ec2
        .versions_for_template("lt-00000000000000000")
        .await
        .unwrap();

    assert!(versions.is_empty());
}
