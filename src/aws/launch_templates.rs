//! EC2 launch template and launch template version listing

use crate::aws::context::AwsContext;
use crate::aws::error::classify_sdk_error;
use anyhow::{Context, Result};
use aws_sdk_ec2::types::{LaunchTemplate, LaunchTemplateVersion};
use aws_sdk_ec2::Client;
use tracing::{debug, warn};

/// EC2 client scoped to one region, wrapping the launch template read APIs
pub struct Ec2Client {
    client: Client,
    region: String,
}

impl Ec2Client {
    /// Create a new EC2 client (loads AWS config from environment)
    pub async fn new(region: &str) -> Self {
        let ctx = AwsContext::new(region).await;
        Self::from_context(&ctx)
    }

    /// Create an EC2 client from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.ec2_client(),
            region: ctx.region().to_string(),
        }
    }

    /// The region this client reads from.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Drain all pages of `DescribeLaunchTemplates` for this region.
    pub async fn describe_launch_templates(&self) -> Result<Vec<LaunchTemplate>> {
        let mut templates = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let mut request = self.client.describe_launch_templates();
            if let Some(t) = token.as_deref() {
                request = request.next_token(t);
            }
            let response = request
                .send()
                .await
                .context("Failed to describe launch templates")?;

            templates.extend(response.launch_templates.unwrap_or_default());

            token = response.next_token;
            if token.is_none() {
                break;
            }
        }

        debug!(count = templates.len(), region = %self.region, "Listed launch templates");
        Ok(templates)
    }

    /// Fetch the versions of every template in `templates`, concatenated in
    /// per-template order.
    ///
    /// Each template's versions are fetched with one paginated API call;
    /// the per-template not-found tolerance of
    /// [`versions_for_template`](Self::versions_for_template) applies.
    pub async fn describe_launch_template_versions(
        &self,
        templates: &[LaunchTemplate],
    ) -> Result<Vec<LaunchTemplateVersion>> {
        let mut versions = Vec::new();

        for template in templates {
            let template_id = template
                .launch_template_id()
                .context("Launch template without an id in DescribeLaunchTemplates response")?;
            versions.extend(self.versions_for_template(template_id).await?);
        }

        Ok(versions)
    }

    /// Drain all pages of `DescribeLaunchTemplateVersions` for one template.
    ///
    /// A template can be deleted between the list call and this call; EC2
    /// then reports the id as not found. That race is tolerated: the
    /// template yields zero versions and the sync continues. Any other
    /// error aborts the region's sync.
    pub async fn versions_for_template(
        &self,
        template_id: &str,
    ) -> Result<Vec<LaunchTemplateVersion>> {
        let mut versions = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .describe_launch_template_versions()
                .launch_template_id(template_id);
            if let Some(t) = token.as_deref() {
                request = request.next_token(t);
            }

            match request.send().await {
                Ok(response) => {
                    versions.extend(response.launch_template_versions.unwrap_or_default());
                    token = response.next_token;
                    if token.is_none() {
                        break;
                    }
                }
                Err(err) if classify_sdk_error(&err).is_not_found() => {
                    warn!(
                        template_id = %template_id,
                        region = %self.region,
                        "Launch template no longer exists, skipping its versions"
                    );
                    return Ok(Vec::new());
                }
                Err(err) => {
                    return Err(err).with_context(|| {
                        format!("Failed to describe versions for launch template {template_id}")
                    });
                }
            }
        }

        Ok(versions)
    }
}
