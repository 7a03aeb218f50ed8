//! Committed-DDL application.

use uuid::Uuid;

use crate::metadata::{ColumnStore, FkEdgeStore, MetadataStore};

use super::build::{build_from_ddl, build_from_metadata};
use super::errors::SchemaError;
use super::merge::merge;
use super::model::flatten;

/// Fold committed DDL into the persisted logical schema.
///
/// DDL → delta schema; persisted columns/edges → base schema; merge;
/// flatten; then rewrite both row sets for the project.
pub async fn apply_ddl_to_metadata(
    store: &dyn MetadataStore,
    project_id: Uuid,
    ddl: &str,
) -> Result<(), SchemaError> {
    let delta = build_from_ddl(project_id, ddl)?;

    let columns = store.columns_fetch(project_id).await?;
    let edges = store.fk_edges_fetch(project_id).await?;
    let base = build_from_metadata(project_id, &columns, &edges);

    let merged = merge(&base, &delta);
    let (new_columns, new_edges) = flatten(&merged);

    store.columns_replace(project_id, &new_columns).await?;
    store.fk_edges_replace(project_id, &new_edges).await?;

    Ok(())
}
