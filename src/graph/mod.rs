//! Graph store boundary
//!
//! The sync pipeline writes typed nodes into a property graph and later
//! reaps the ones that were not re-observed. Both operations go through
//! [`GraphStore`], parameterized by a static [`NodeSchema`] per entity type
//! rather than a reflective schema system.

pub mod sqlite;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

pub use sqlite::SqliteGraph;

/// A relationship the schema declares for its nodes.
///
/// The edge runs from the node of `from_label` whose id is stored in the
/// `join_field` property of this schema's node, to this schema's node.
#[derive(Debug)]
pub struct RelSpec {
    /// Relationship type, e.g. `VERSION`
    pub rel_type: &'static str,
    /// Label of the source node
    pub from_label: &'static str,
    /// Property on this schema's nodes naming the source node's id
    pub join_field: &'static str,
}

/// Static descriptor of one node type: label, identity field, and the
/// relationships to materialize on load.
#[derive(Debug)]
pub struct NodeSchema {
    pub label: &'static str,
    pub id_field: &'static str,
    pub rels: &'static [RelSpec],
}

/// Region, account, and update tag stamped on everything one run loads.
#[derive(Debug, Clone)]
pub struct SyncScope {
    pub region: String,
    pub account_id: String,
    pub update_tag: i64,
}

/// Scoping for a reap pass: which account to reap, and the tag that marks
/// records as current.
#[derive(Debug, Clone)]
pub struct ReapParams {
    pub account_id: String,
    pub update_tag: i64,
}

/// One graph-ready node: identity plus a flat property bag.
#[derive(Debug, Clone)]
pub struct NodeRecord {
    pub id: String,
    pub properties: serde_json::Map<String, Value>,
}

/// Property graph store consumed by the sync pipeline.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Create-or-update one node per record, keyed by `(label, id, account)`.
    ///
    /// Sets region, account, and update tag on every node and on the
    /// relationships the schema declares. Idempotent: re-running with
    /// identical records produces no duplicates.
    async fn upsert_nodes(
        &self,
        schema: &NodeSchema,
        nodes: &[NodeRecord],
        scope: &SyncScope,
    ) -> Result<()>;

    /// Delete all nodes of the schema's label (and their declared
    /// relationships) whose update tag differs from `params.update_tag`,
    /// scoped to `params.account_id`. Returns the number of nodes removed.
    async fn reap_stale(&self, schema: &NodeSchema, params: &ReapParams) -> Result<u64>;
}

/// Serialize records into [`NodeRecord`]s, pulling each node id out of the
/// schema's identity field.
pub fn to_node_records<T: Serialize>(schema: &NodeSchema, items: &[T]) -> Result<Vec<NodeRecord>> {
    items
        .iter()
        .map(|item| {
            let value = serde_json::to_value(item)?;
            let Value::Object(properties) = value else {
                bail!("{} record did not serialize to an object", schema.label);
            };
            let id = properties
                .get(schema.id_field)
                .and_then(Value::as_str)
                .with_context(|| {
                    format!(
                        "{} record missing identity field {}",
                        schema.label, schema.id_field
                    )
                })?
                .to_string();
            Ok(NodeRecord { id, properties })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    static WIDGET: NodeSchema = NodeSchema {
        label: "Widget",
        id_field: "Id",
        rels: &[],
    };

    #[derive(Serialize)]
    #[serde(rename_all = "PascalCase")]
    struct Widget {
        id: String,
        size: i64,
    }

    #[test]
    fn records_carry_identity_and_properties() {
        let widgets = vec![Widget {
            id: "w-1".to_string(),
            size: 3,
        }];
        let records = to_node_records(&WIDGET, &widgets).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "w-1");
        assert_eq!(records[0].properties["Size"], 3);
    }

    #[test]
    fn missing_identity_field_is_an_error() {
        #[derive(Serialize)]
        struct Anonymous {
            size: i64,
        }

        let err = to_node_records(&WIDGET, &[Anonymous { size: 1 }]).unwrap_err();
        assert!(err.to_string().contains("identity field"));
    }
}
