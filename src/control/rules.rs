//! Policy predicates over fetched state. Pure, so the gauntlets in front
//! of state-changing operations stay table-testable.

use crate::metadata::{Project, ProjectSchema, ProjectStatus, Shard, ShardStatus};

/// No project in the list is active.
pub fn all_projects_inactive(projects: &[Project]) -> bool {
    projects
        .iter()
        .all(|project| project.status != ProjectStatus::Active)
}

/// Every shard is active; false for an empty shard set.
pub fn all_shards_active(shards: &[Shard]) -> bool {
    !shards.is_empty()
        && shards
            .iter()
            .all(|shard| shard.status == ShardStatus::Active)
}

/// Any shard is inactive.
pub fn any_shard_inactive(shards: &[Shard]) -> bool {
    shards
        .iter()
        .any(|shard| shard.status == ShardStatus::Inactive)
}

/// Some schema of the project is pending or applying.
pub fn schema_in_flight(history: &[ProjectSchema]) -> bool {
    history.iter().any(|schema| schema.state.is_in_flight())
}

/// A schema beyond draft exists, which arms the destructive-DDL guard.
pub fn has_committed_schema(history: &[ProjectSchema]) -> bool {
    history
        .iter()
        .any(|schema| schema.state != crate::metadata::SchemaState::Draft)
}
