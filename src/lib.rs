//! shardrail - a SQL sharding control plane and query router
//!
//! Manages a set of PostgreSQL shards holding one horizontally
//! partitioned logical database: shard-placement metadata, shard-key
//! inference from committed DDL, schema rollout with per-shard status
//! tracking, and transparent routing of plain SQL to the shards it
//! belongs on.

pub mod config;
pub mod control;
pub mod executor;
pub mod http_server;
pub mod inference;
pub mod metadata;
pub mod observability;
pub mod registry;
pub mod router;
pub mod schema;
pub mod sql;
