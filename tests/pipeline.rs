//! End-to-end pipeline tests against an in-memory graph store
//!
//! Exercises transform -> load -> reap across two simulated runs, the way
//! the orchestrator drives them, without touching the EC2 API.

use aws_sdk_ec2::primitives::DateTime;
use aws_sdk_ec2::types::{LaunchTemplate, LaunchTemplateVersion, ResponseLaunchTemplateData};
use fleetmap::aws::AccountId;
use fleetmap::graph::{to_node_records, GraphStore, SqliteGraph, SyncScope};
use fleetmap::sync::cleanup;
use fleetmap::sync::records::{LAUNCH_TEMPLATE, LAUNCH_TEMPLATE_VERSION};
use fleetmap::sync::transform::{transform_launch_template_versions, transform_launch_templates};

const ACCOUNT: &str = "111122223333";
const REGION: &str = "us-east-1";

fn template(id: &str) -> LaunchTemplate {
    LaunchTemplate::builder()
        .launch_template_id(id)
        .launch_template_name(format!("{id}-name"))
        .create_time(DateTime::from_secs(1_700_000_000))
        .default_version_number(1)
        .latest_version_number(1)
        .build()
}

fn version(template_id: &str, number: i64, image_id: &str) -> LaunchTemplateVersion {
    LaunchTemplateVersion::builder()
        .launch_template_id(template_id)
        .version_number(number)
        .create_time(DateTime::from_secs(1_700_000_000))
        .launch_template_data(
            ResponseLaunchTemplateData::builder()
                .image_id(image_id)
                .build(),
        )
        .build()
}

fn scope(tag: i64) -> SyncScope {
    SyncScope {
        region: REGION.to_string(),
        account_id: ACCOUNT.to_string(),
        update_tag: tag,
    }
}

/// Transform and load one region's worth of raw API data, as sync_region does.
async fn load_run(
    graph: &SqliteGraph,
    templates: Vec<LaunchTemplate>,
    versions: Vec<LaunchTemplateVersion>,
    tag: i64,
) {
    let scope = scope(tag);

    let template_records = transform_launch_templates(templates, &versions).unwrap();
    graph
        .upsert_nodes(
            &LAUNCH_TEMPLATE,
            &to_node_records(&LAUNCH_TEMPLATE, &template_records).unwrap(),
            &scope,
        )
        .await
        .unwrap();

    let version_records = transform_launch_template_versions(versions).unwrap();
    graph
        .upsert_nodes(
            &LAUNCH_TEMPLATE_VERSION,
            &to_node_records(&LAUNCH_TEMPLATE_VERSION, &version_records).unwrap(),
            &scope,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn orphan_templates_never_reach_the_graph() {
    let graph = SqliteGraph::open_in_memory().await.unwrap();

    // lt-2 was deleted mid-scan: it produced no versions.
    let templates = vec![template("lt-1"), template("lt-2")];
    let versions = vec![version("lt-1", 1, "ami-1")];
    load_run(&graph, templates, versions, 1).await;

    assert_eq!(
        graph.node_ids("LaunchTemplate", ACCOUNT).await.unwrap(),
        vec!["lt-1"]
    );
}

#[tokio::test]
async fn loaded_nodes_carry_scope_and_relationships() {
    let graph = SqliteGraph::open_in_memory().await.unwrap();

    let templates = vec![template("lt-1")];
    let versions = vec![version("lt-1", 1, "ami-1"), version("lt-1", 2, "ami-2")];
    load_run(&graph, templates, versions, 7).await;

    assert_eq!(
        graph
            .node_update_tag("LaunchTemplate", "lt-1", ACCOUNT)
            .await
            .unwrap(),
        Some(7)
    );
    assert_eq!(
        graph
            .node_ids("LaunchTemplateVersion", ACCOUNT)
            .await
            .unwrap(),
        vec!["lt-1-1", "lt-1-2"]
    );
    assert_eq!(
        graph.edges("VERSION", ACCOUNT).await.unwrap(),
        vec![
            ("lt-1".to_string(), "lt-1-1".to_string()),
            ("lt-1".to_string(), "lt-1-2".to_string()),
        ]
    );
}

#[tokio::test]
async fn reloading_a_run_is_idempotent() {
    let graph = SqliteGraph::open_in_memory().await.unwrap();

    let versions = vec![version("lt-1", 1, "ami-1")];
    load_run(&graph, vec![template("lt-1")], versions.clone(), 1).await;
    load_run(&graph, vec![template("lt-1")], versions, 1).await;

    assert_eq!(
        graph.node_ids("LaunchTemplate", ACCOUNT).await.unwrap(),
        vec!["lt-1"]
    );
    assert_eq!(
        graph
            .node_ids("LaunchTemplateVersion", ACCOUNT)
            .await
            .unwrap(),
        vec!["lt-1-1"]
    );
    assert_eq!(graph.edges("VERSION", ACCOUNT).await.unwrap().len(), 1);
}

#[tokio::test]
async fn cleanup_reaps_disappeared_templates_and_keeps_reobserved_ones() {
    let graph = SqliteGraph::open_in_memory().await.unwrap();
    let account = AccountId::new(ACCOUNT);

    // First run sees lt-1 and lt-2.
    load_run(
        &graph,
        vec![template("lt-1"), template("lt-2")],
        vec![version("lt-1", 1, "ami-1"), version("lt-2", 1, "ami-2")],
        1,
    )
    .await;
    cleanup(&graph, &account, 1).await.unwrap();

    // Second run: lt-2 is gone from the source.
    load_run(
        &graph,
        vec![template("lt-1")],
        vec![version("lt-1", 1, "ami-1")],
        2,
    )
    .await;
    cleanup(&graph, &account, 2).await.unwrap();

    assert_eq!(
        graph.node_ids("LaunchTemplate", ACCOUNT).await.unwrap(),
        vec!["lt-1"]
    );
    assert_eq!(
        graph
            .node_ids("LaunchTemplateVersion", ACCOUNT)
            .await
            .unwrap(),
        vec!["lt-1-1"]
    );
    assert_eq!(
        graph.edges("VERSION", ACCOUNT).await.unwrap(),
        vec![("lt-1".to_string(), "lt-1-1".to_string())]
    );
    assert_eq!(
        graph
            .node_update_tag("LaunchTemplate", "lt-1", ACCOUNT)
            .await
            .unwrap(),
        Some(2)
    );
}

#[tokio::test]
async fn updated_attributes_win_on_reload() {
    let graph = SqliteGraph::open_in_memory().await.unwrap();

    load_run(
        &graph,
        vec![template("lt-1")],
        vec![version("lt-1", 1, "ami-old")],
        1,
    )
    .await;
    load_run(
        &graph,
        vec![template("lt-1")],
        vec![version("lt-1", 1, "ami-new")],
        2,
    )
    .await;

    let properties = graph
        .node_properties("LaunchTemplateVersion", "lt-1-1", ACCOUNT)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(properties["ImageId"], "ami-new");
}
