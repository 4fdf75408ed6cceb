//! fleetmap: sync EC2 launch template inventory into an asset graph

use anyhow::Result;
use clap::{Parser, Subcommand};
use fleetmap::aws::{discover_regions, get_current_account_id, AwsContext};
use fleetmap::config::SyncConfig;
use fleetmap::graph::SqliteGraph;
use fleetmap::sync;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "fleetmap")]
#[command(about = "EC2 launch template inventory for asset graphs")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sync launch templates from EC2 into the graph, then reap stale records
    Sync {
        /// Comma-separated regions to sync (default: discover via DescribeRegions)
        #[arg(long)]
        regions: Option<String>,

        /// AWS profile to use (overrides AWS_PROFILE env var)
        #[arg(long)]
        aws_profile: Option<String>,

        /// Graph database path (default: platform data directory)
        #[arg(long)]
        graph_db: Option<PathBuf>,

        /// Update tag for this run (default: current epoch seconds)
        #[arg(long)]
        update_tag: Option<i64>,
    },

    /// Reap records whose update tag differs from TAG, without syncing
    ///
    /// Recovers from an aborted run: records written before the abort keep
    /// their tag and are never reaped by that run, so a later completed
    /// sync's tag can be replayed here.
    Cleanup {
        /// Update tag that marks records as current
        #[arg(long)]
        update_tag: i64,

        /// AWS profile to use (overrides AWS_PROFILE env var)
        #[arg(long)]
        aws_profile: Option<String>,

        /// Graph database path (default: platform data directory)
        #[arg(long)]
        graph_db: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    if std::env::var("RUST_BACKTRACE").is_err() {
        let _ = writeln!(
            stderr,
            "\n\x1b[2mSet RUST_BACKTRACE=1 for a detailed backtrace\x1b[0m"
        );
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::Sync {
            regions,
            aws_profile,
            graph_db,
            update_tag,
        } => {
            let config = SyncConfig {
                regions: parse_regions(regions.as_deref()),
                aws_profile,
                graph_db,
                update_tag,
            };
            handle_sync(config).await?;
        }

        Command::Cleanup {
            update_tag,
            aws_profile,
            graph_db,
        } => {
            handle_cleanup(update_tag, aws_profile.as_deref(), graph_db).await?;
        }
    }

    Ok(())
}

/// Parse a comma-separated region list
fn parse_regions(regions: Option<&str>) -> Vec<String> {
    regions
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Region used to bootstrap account lookup and region discovery
const BOOTSTRAP_REGION: &str = "us-east-1";

/// Handle the sync command
async fn handle_sync(config: SyncConfig) -> Result<()> {
    let bootstrap_region = config
        .regions
        .first()
        .map(String::as_str)
        .unwrap_or(BOOTSTRAP_REGION);
    let ctx = AwsContext::with_profile(bootstrap_region, config.aws_profile.as_deref()).await;

    let account_id = get_current_account_id(ctx.sdk_config()).await?;

    let regions = if config.regions.is_empty() {
        let discovered = discover_regions(&ctx).await?;
        info!(count = discovered.len(), "Discovered regions");
        discovered
    } else {
        config.regions.clone()
    };

    let update_tag = config
        .update_tag
        .unwrap_or_else(|| chrono::Utc::now().timestamp());

    let graph = open_graph(config.graph_db).await?;

    info!(
        regions = regions.len(),
        account = %account_id,
        update_tag,
        "Starting launch template sync"
    );

    sync::sync_launch_templates(
        &graph,
        &regions,
        &account_id,
        update_tag,
        config.aws_profile.as_deref(),
    )
    .await
}

/// Handle the cleanup command
async fn handle_cleanup(
    update_tag: i64,
    aws_profile: Option<&str>,
    graph_db: Option<PathBuf>,
) -> Result<()> {
    let ctx = AwsContext::with_profile(BOOTSTRAP_REGION, aws_profile).await;
    let account_id = get_current_account_id(ctx.sdk_config()).await?;

    let graph = open_graph(graph_db).await?;

    sync::cleanup(&graph, &account_id, update_tag).await
}

/// Open the graph store at the given or default path
async fn open_graph(path: Option<PathBuf>) -> Result<SqliteGraph> {
    let path = match path {
        Some(path) => path,
        None => SqliteGraph::default_path()?,
    };
    info!(path = %path.display(), "Opening graph database");
    SqliteGraph::open(&path).await
}
