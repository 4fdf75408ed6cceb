//! Graph-ready launch template records
//!
//! Flat shapes of the nodes the pipeline loads, plus the static schema
//! descriptors naming each node's label, identity field, and declared
//! relationships. Property names follow the EC2 API's PascalCase so graph
//! consumers see the same names the source API uses.

use crate::graph::{NodeSchema, RelSpec};
use serde::Serialize;

/// Node schema for launch templates.
pub static LAUNCH_TEMPLATE: NodeSchema = NodeSchema {
    label: "LaunchTemplate",
    id_field: "Id",
    rels: &[],
};

/// Node schema for launch template versions, owned by their template.
pub static LAUNCH_TEMPLATE_VERSION: NodeSchema = NodeSchema {
    label: "LaunchTemplateVersion",
    id_field: "Id",
    rels: &[RelSpec {
        rel_type: "VERSION",
        from_label: "LaunchTemplate",
        join_field: "LaunchTemplateId",
    }],
};

/// One launch template, keyed by its `LaunchTemplateId`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LaunchTemplateRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_template_name: Option<String>,
    /// Creation time as a string of truncated epoch seconds
    pub create_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_version_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_version_number: Option<i64>,
}

/// One launch template version, keyed by `{LaunchTemplateId}-{VersionNumber}`.
///
/// The optional fields are flattened out of the version's nested launch
/// template data; fields the source omitted stay absent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LaunchTemplateVersionRecord {
    pub id: String,
    pub launch_template_id: String,
    pub version_number: i64,
    /// Creation time as a string of truncated epoch seconds
    pub create_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kernel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ebs_optimized: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iam_instance_profile_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iam_instance_profile_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitoring_enabled: Option<bool>,
    #[serde(rename = "RamdiskId", skip_serializing_if = "Option::is_none")]
    pub ramdisk_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_api_termination: Option<bool>,
    #[serde(
        rename = "InstanceInitiatedShutDownBehavior",
        skip_serializing_if = "Option::is_none"
    )]
    pub instance_initiated_shutdown_behavior: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_group_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_groups: Option<Vec<String>>,
}
