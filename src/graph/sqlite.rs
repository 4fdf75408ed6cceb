//! SQLite-backed graph store
//!
//! Nodes are rows keyed by `(label, id, account_id)` with a JSON property
//! bag; edges are rows derived from each schema's relationship
//! descriptors. Upserts are `INSERT .. ON CONFLICT DO UPDATE`, so loading
//! the same records twice leaves exactly one row per identity.

use super::{GraphStore, NodeRecord, NodeSchema, ReapParams, SyncScope};
use anyhow::{Context, Result};
use async_trait::async_trait;
use directories::ProjectDirs;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Graph store backed by a SQLite database file.
pub struct SqliteGraph {
    pool: SqlitePool,
}

impl SqliteGraph {
    /// Default database path under the platform data directory.
    pub fn default_path() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("", "", "fleetmap").context("Failed to get project directories")?;

        let data_dir = proj_dirs.data_local_dir();
        fs::create_dir_all(data_dir).context("Failed to create data directory")?;

        Ok(data_dir.join("graph.db"))
    }

    /// Open the graph database at `path`, creating it if needed.
    pub async fn open(path: &Path) -> Result<Self> {
        let db_url = format!("sqlite://{}?mode=rwc", path.display());
        let options = SqliteConnectOptions::from_str(&db_url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to open graph database")?;

        setup_schema(&pool).await?;

        Ok(Self { pool })
    }

    /// Open an in-memory database, used by tests.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

        // A single connection: each new in-memory connection would be a
        // fresh, empty database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .context("Failed to open in-memory graph database")?;

        setup_schema(&pool).await?;

        Ok(Self { pool })
    }

    /// Ids of all nodes with `label` in `account_id`, sorted.
    pub async fn node_ids(&self, label: &str, account_id: &str) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT id FROM nodes WHERE label = ?1 AND account_id = ?2 ORDER BY id",
        )
        .bind(label)
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|r| r.get("id")).collect())
    }

    /// Property bag of one node, or `None` if it does not exist.
    pub async fn node_properties(
        &self,
        label: &str,
        id: &str,
        account_id: &str,
    ) -> Result<Option<serde_json::Map<String, Value>>> {
        let row = sqlx::query(
            "SELECT properties FROM nodes WHERE label = ?1 AND id = ?2 AND account_id = ?3",
        )
        .bind(label)
        .bind(id)
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let raw: String = row.get("properties");
                let value: Value = serde_json::from_str(&raw)
                    .context("Corrupt property JSON in graph database")?;
                match value {
                    Value::Object(map) => Ok(Some(map)),
                    _ => anyhow::bail!("Node properties are not a JSON object"),
                }
            }
            None => Ok(None),
        }
    }

    /// Update tag of one node, or `None` if it does not exist.
    pub async fn node_update_tag(
        &self,
        label: &str,
        id: &str,
        account_id: &str,
    ) -> Result<Option<i64>> {
        let tag = sqlx::query_scalar(
            "SELECT lastupdated FROM nodes WHERE label = ?1 AND id = ?2 AND account_id = ?3",
        )
        .bind(label)
        .bind(id)
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tag)
    }

    /// All `(src_id, dst_id)` pairs of one relationship type in `account_id`.
    pub async fn edges(&self, rel_type: &str, account_id: &str) -> Result<Vec<(String, String)>> {
        let rows = sqlx::query(
            "SELECT src_id, dst_id FROM edges \
             WHERE rel_type = ?1 AND account_id = ?2 ORDER BY src_id, dst_id",
        )
        .bind(rel_type)
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| (r.get("src_id"), r.get("dst_id")))
            .collect())
    }
}

/// Set up the node and edge tables.
async fn setup_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS nodes (
            label TEXT NOT NULL,
            id TEXT NOT NULL,
            account_id TEXT NOT NULL,
            region TEXT NOT NULL,
            lastupdated INTEGER NOT NULL,
            properties TEXT NOT NULL,
            UNIQUE(label, id, account_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS edges (
            rel_type TEXT NOT NULL,
            src_label TEXT NOT NULL,
            src_id TEXT NOT NULL,
            dst_label TEXT NOT NULL,
            dst_id TEXT NOT NULL,
            account_id TEXT NOT NULL,
            region TEXT NOT NULL,
            lastupdated INTEGER NOT NULL,
            UNIQUE(rel_type, src_label, src_id, dst_label, dst_id, account_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_nodes_label ON nodes(label, account_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_edges_labels ON edges(src_label, dst_label)")
        .execute(pool)
        .await?;

    Ok(())
}

#[async_trait]
impl GraphStore for SqliteGraph {
    async fn upsert_nodes(
        &self,
        schema: &NodeSchema,
        nodes: &[NodeRecord],
        scope: &SyncScope,
    ) -> Result<()> {
        for node in nodes {
            let properties = serde_json::to_string(&node.properties)?;
            sqlx::query(
                r#"
                INSERT INTO nodes (label, id, account_id, region, lastupdated, properties)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(label, id, account_id) DO UPDATE SET
                    region = excluded.region,
                    lastupdated = excluded.lastupdated,
                    properties = excluded.properties
                "#,
            )
            .bind(schema.label)
            .bind(&node.id)
            .bind(&scope.account_id)
            .bind(&scope.region)
            .bind(scope.update_tag)
            .bind(&properties)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to upsert {} node {}", schema.label, node.id))?;

            for rel in schema.rels {
                let Some(Value::String(src_id)) = node.properties.get(rel.join_field) else {
                    continue;
                };
                sqlx::query(
                    r#"
                    INSERT INTO edges
                        (rel_type, src_label, src_id, dst_label, dst_id, account_id, region, lastupdated)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                    ON CONFLICT(rel_type, src_label, src_id, dst_label, dst_id, account_id)
                    DO UPDATE SET
                        region = excluded.region,
                        lastupdated = excluded.lastupdated
                    "#,
                )
                .bind(rel.rel_type)
                .bind(rel.from_label)
                .bind(src_id)
                .bind(schema.label)
                .bind(&node.id)
                .bind(&scope.account_id)
                .bind(&scope.region)
                .bind(scope.update_tag)
                .execute(&self.pool)
                .await
                .with_context(|| {
                    format!("Failed to upsert {} edge for node {}", rel.rel_type, node.id)
                })?;
            }
        }

        Ok(())
    }

    async fn reap_stale(&self, schema: &NodeSchema, params: &ReapParams) -> Result<u64> {
        sqlx::query(
            "DELETE FROM edges WHERE account_id = ?1 AND lastupdated <> ?2 \
             AND (src_label = ?3 OR dst_label = ?3)",
        )
        .bind(&params.account_id)
        .bind(params.update_tag)
        .bind(schema.label)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to reap stale {} edges", schema.label))?;

        let deleted = sqlx::query(
            "DELETE FROM nodes WHERE label = ?1 AND account_id = ?2 AND lastupdated <> ?3",
        )
        .bind(schema.label)
        .bind(&params.account_id)
        .bind(params.update_tag)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to reap stale {} nodes", schema.label))?;

        Ok(deleted.rows_affected())
    }
}
