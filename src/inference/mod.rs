//! Shard-key inference.
//!
//! A deterministic four-phase pipeline over the logical schema: hard
//! elimination of unusable columns, incoming-FK fanout statistics,
//! additive ranking with human-readable reasons, and per-table selection
//! with a lexicographic tie-break. Running it twice on the same schema
//! always yields the same decisions.

mod elimination;
mod fanout;
mod ranking;
mod types;

pub use elimination::extract_candidates;
pub use fanout::compute_fanout;
pub use ranking::rank_table_candidates;
pub use types::{
    CandidateSet, ColumnRef, FanoutStats, InferenceResult, RankedCandidate, ShardKeyDecision,
};

use uuid::Uuid;

use crate::metadata::{
    ColumnStore, FkEdgeStore, MetadataResult, MetadataStore, ShardKeyRecord, ShardKeyStore,
};
use crate::schema::{build_from_metadata, LogicalSchema};

/// Run the whole pipeline on a schema. Pure.
pub fn build_shard_key_plan(schema: &LogicalSchema) -> InferenceResult {
    let mut result = InferenceResult {
        project_id: schema.project_id,
        decisions: Vec::new(),
    };

    let candidates = extract_candidates(schema);
    let fanout = compute_fanout(schema, &candidates);

    for (table_name, local) in &candidates {
        let ranked = rank_table_candidates(table_name, local, &fanout, schema);
        if let Some(best) = ranked.into_iter().next() {
            result.decisions.push(ShardKeyDecision {
                table: table_name.clone(),
                column: best.column,
                score: best.score,
                reasons: best.reasons,
            });
        }
    }

    result
}

/// Rebuild the schema from metadata, infer, and materialize the
/// decisions, preserving manual overrides.
pub async fn apply_inference(
    store: &dyn MetadataStore,
    project_id: Uuid,
) -> MetadataResult<InferenceResult> {
    let columns = store.columns_fetch(project_id).await?;
    let edges = store.fk_edges_fetch(project_id).await?;
    let schema = build_from_metadata(project_id, &columns, &edges);

    let result = build_shard_key_plan(&schema);

    let records: Vec<ShardKeyRecord> = result
        .decisions
        .iter()
        .map(|decision| ShardKeyRecord {
            table_name: decision.table.clone(),
            shard_key_column: decision.column.column.clone(),
            is_manual: false,
        })
        .collect();

    store.shard_keys_replace(project_id, &records).await?;
    Ok(result)
}
