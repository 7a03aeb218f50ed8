//! Capability projection.
//!
//! Derives which schema operations a host may offer from the project
//! status, the latest schema state, and shard health. Purely a view;
//! nothing here is authoritative — every operation re-checks its own
//! preconditions.

use serde::Serialize;

use crate::metadata::{ProjectSchema, ProjectStatus, SchemaState};

/// What the host may offer for a project right now.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaCapabilities {
    pub can_create_draft: bool,
    pub can_edit_draft: bool,
    pub can_commit: bool,
    pub can_execute: bool,
    pub can_retry: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Project capabilities from current state. Pure.
pub fn project_capabilities(
    project_status: ProjectStatus,
    latest_schema: Option<&ProjectSchema>,
    all_shards_active: bool,
) -> SchemaCapabilities {
    let mut caps = SchemaCapabilities::default();

    if project_status == ProjectStatus::Active {
        caps.reason = Some("project is active".to_string());
        return caps;
    }

    let Some(schema) = latest_schema else {
        caps.can_create_draft = true;
        return caps;
    };

    match schema.state {
        SchemaState::Draft => {
            caps.can_edit_draft = true;
            caps.can_commit = true;
        }
        SchemaState::Pending => {
            if all_shards_active {
                caps.can_execute = true;
            } else {
                caps.reason = Some("all shards must be active to execute".to_string());
            }
        }
        SchemaState::Applying => {
            caps.reason = Some("schema rollout is in progress".to_string());
        }
        SchemaState::Failed => {
            caps.can_retry = true;
        }
        SchemaState::Applied => {
            caps.can_create_draft = true;
        }
    }

    caps
}
