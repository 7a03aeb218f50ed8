//! Control plane.
//!
//! The façade that orchestrates project, shard, connection, and schema
//! lifecycles, routes queries, projects capabilities for hosts, and runs
//! the shard health monitor.

mod capabilities;
mod errors;
mod monitor;
mod plane;
mod projects;
mod query;
mod rules;
mod schemas;
mod shards;

pub use capabilities::{project_capabilities, SchemaCapabilities};
pub use errors::{ControlError, ControlResult};
pub use monitor::spawn_monitor;
pub use plane::ControlPlane;
pub use rules::{
    all_projects_inactive, all_shards_active, any_shard_inactive, has_committed_schema,
    schema_in_flight,
};
