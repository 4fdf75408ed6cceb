//! Pure transforms from EC2 API shapes to graph records
//!
//! No I/O happens here. Templates whose versions all vanished mid-scan are
//! dropped (their counterpart versions were never fetched), and version
//! attributes are flattened out of the nested launch template data.

use super::records::{LaunchTemplateRecord, LaunchTemplateVersionRecord};
use anyhow::{Context, Result};
use aws_sdk_ec2::primitives::DateTime;
use aws_sdk_ec2::types::{LaunchTemplate, LaunchTemplateVersion};
use std::collections::HashSet;

/// Creation timestamps are stored as strings of truncated epoch seconds.
fn epoch_seconds_string(time: &DateTime) -> String {
    time.secs().to_string()
}

/// Map templates to graph records, dropping any template with no surviving
/// version.
///
/// A template deleted between the template list call and its version fetch
/// yields zero versions; persisting it would break the invariant that every
/// template node has at least one version node. Output order follows input
/// order, minus the drops.
pub fn transform_launch_templates(
    templates: Vec<LaunchTemplate>,
    versions: &[LaunchTemplateVersion],
) -> Result<Vec<LaunchTemplateRecord>> {
    let valid_ids: HashSet<&str> = versions
        .iter()
        .filter_map(|v| v.launch_template_id())
        .collect();

    let mut records = Vec::new();
    for template in templates {
        // A template whose id never produced a version is an orphan.
        let id = match template.launch_template_id() {
            Some(id) if valid_ids.contains(id) => id.to_string(),
            _ => continue,
        };
        let create_time = template
            .create_time()
            .map(epoch_seconds_string)
            .with_context(|| format!("Launch template {id} has no creation time"))?;

        records.push(LaunchTemplateRecord {
            id,
            launch_template_name: template.launch_template_name,
            create_time,
            default_version_number: template.default_version_number,
            latest_version_number: template.latest_version_number,
        });
    }
    Ok(records)
}

/// Map versions to graph records, synthesizing the composite id and
/// flattening the nested launch template data.
///
/// A version without launch template data violates the EC2 API contract and
/// fails the transform; it is not defensively defaulted.
pub fn transform_launch_template_versions(
    versions: Vec<LaunchTemplateVersion>,
) -> Result<Vec<LaunchTemplateVersionRecord>> {
    versions
        .into_iter()
        .map(|version| {
            let launch_template_id = version
                .launch_template_id
                .context("Launch template version without a template id")?;
            let version_number = version.version_number.with_context(|| {
                format!("Version of launch template {launch_template_id} has no version number")
            })?;
            let id = format!("{launch_template_id}-{version_number}");

            let create_time = version
                .create_time
                .with_context(|| format!("Launch template version {id} has no creation time"))?;
            let data = version
                .launch_template_data
                .with_context(|| format!("Launch template version {id} has no template data"))?;

            Ok(LaunchTemplateVersionRecord {
                id,
                launch_template_id,
                version_number,
                create_time: epoch_seconds_string(&create_time),
                kernel_id: data.kernel_id,
                ebs_optimized: data.ebs_optimized,
                iam_instance_profile_arn: data
                    .iam_instance_profile
                    .as_ref()
                    .and_then(|p| p.arn.clone()),
                iam_instance_profile_name: data
                    .iam_instance_profile
                    .as_ref()
                    .and_then(|p| p.name.clone()),
                image_id: data.image_id,
                instance_type: data.instance_type.map(|t| t.as_str().to_string()),
                key_name: data.key_name,
                monitoring_enabled: data.monitoring.and_then(|m| m.enabled),
                ramdisk_id: data.ram_disk_id,
                disable_api_termination: data.disable_api_termination,
                instance_initiated_shutdown_behavior: data
                    .instance_initiated_shutdown_behavior
                    .map(|b| b.as_str().to_string()),
                security_group_ids: data.security_group_ids,
                security_groups: data.security_groups,
            })
        })
        .collect()
}
