//! Configuration types for a sync run

use std::path::PathBuf;

/// Configuration for one launch template sync run
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Regions to sync. When empty, regions are discovered via
    /// `DescribeRegions` at startup.
    pub regions: Vec<String>,
    /// AWS profile name (overrides default credential resolution)
    pub aws_profile: Option<String>,
    /// Graph database path. When `None`, the platform data directory is used.
    pub graph_db: Option<PathBuf>,
    /// Update tag stamped on every record written this run. When `None`,
    /// the current epoch seconds are used.
    pub update_tag: Option<i64>,
}
