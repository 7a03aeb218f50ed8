//! Routing plan construction.

use uuid::Uuid;

use crate::sql::Statement;

use super::config::RouterConfig;
use super::errors::{RoutingError, RoutingErrorKind};
use super::extractor::extract_shard_predicate;
use super::hasher::hash_value;
use super::ring::Ring;

/// How a plan touches the shard set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingMode {
    /// Exactly one shard.
    Single,
    /// More than one shard, within the fanout cap.
    Multi,
    /// Every shard. Never produced while `allow_broadcast` is off.
    Broadcast,
    /// Not executable; `reject_error` says why.
    Rejected,
}

/// One target shard of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardTarget {
    pub shard_id: Uuid,
}

/// The routing decision for one statement.
#[derive(Debug, Clone)]
pub struct RoutingPlan {
    pub mode: RoutingMode,
    pub targets: Vec<ShardTarget>,
    pub reason: String,
    pub reject_error: Option<RoutingError>,
}

impl RoutingPlan {
    fn rejected(error: RoutingError) -> Self {
        Self {
            mode: RoutingMode::Rejected,
            targets: Vec::new(),
            reason: error.message.clone(),
            reject_error: Some(error),
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.mode == RoutingMode::Rejected
    }
}

/// Builds routing plans from parsed statements against a frozen ring.
pub struct Planner {
    cfg: RouterConfig,
    ring: Ring,
}

impl Planner {
    pub fn new(cfg: RouterConfig, ring: Ring) -> Self {
        Self { cfg, ring }
    }

    /// Build the plan for a single statement.
    pub fn plan(&self, statement: &Statement, table: &str, shard_key: &str) -> RoutingPlan {
        let predicate = match extract_shard_predicate(statement, table, shard_key) {
            Ok(predicate) => predicate,
            Err(error) => return RoutingPlan::rejected(error),
        };

        let hashes: Vec<u64> = predicate.values.iter().map(hash_value).collect();
        let shards = self.ring.locate_shards(&hashes);

        if shards.is_empty() {
            return RoutingPlan::rejected(RoutingError::new(
                RoutingErrorKind::Invalid,
                "no shards resolved",
            ));
        }

        if shards.len() > 1 && shards.len() > self.cfg.max_shard_fanout {
            return RoutingPlan::rejected(RoutingError::new(
                RoutingErrorKind::FanoutExceeded,
                "query touches too many shards",
            ));
        }

        let targets: Vec<ShardTarget> = shards
            .into_iter()
            .map(|shard_id| ShardTarget { shard_id })
            .collect();

        let mode = if targets.len() > 1 {
            RoutingMode::Multi
        } else {
            RoutingMode::Single
        };

        RoutingPlan {
            mode,
            targets,
            reason: "shard key resolved successfully".to_string(),
            reject_error: None,
        }
    }
}
