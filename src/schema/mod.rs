//! Logical schema engine.
//!
//! The in-memory schema IR with its three pure transforms (build, merge,
//! flatten), the destructive-DDL guard, and the rollout state machine
//! that drives a committed schema across every shard of a project.

mod build;
mod errors;
mod guard;
mod merge;
mod model;
mod rollout;
mod service;

pub use build::{build_from_ddl, build_from_metadata};
pub use errors::SchemaError;
pub use guard::is_destructive_ddl;
pub use merge::merge;
pub use model::{flatten, Column, Fk, FkKey, LogicalSchema, Table};
pub use rollout::{execute_project_schema, retry_failed_schema, DdlExecutor};
pub use service::apply_ddl_to_metadata;
