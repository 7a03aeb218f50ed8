//! Shard executor.
//!
//! Fans a routing plan out across the registry's handles. Per-shard
//! failures land in that shard's result entry and never short-circuit
//! the others; a rejected plan short-circuits before any shard is
//! contacted.

mod backend;
mod result;

pub use backend::{BackendError, ShardOutcome, SqlBackend};
pub use result::ShardResult;

use std::sync::Arc;

use uuid::Uuid;

use crate::registry::{BackendHandle, ConnectionRegistry};
use crate::router::{RoutingError, RoutingErrorKind, RoutingPlan};

/// Executes routed SQL on shard backends.
pub struct Executor<H> {
    registry: Arc<ConnectionRegistry<H>>,
}

impl<H: BackendHandle + SqlBackend> Executor<H> {
    pub fn new(registry: Arc<ConnectionRegistry<H>>) -> Self {
        Self { registry }
    }

    /// Execute one statement against every target of the plan, in plan
    /// order.
    pub async fn execute(
        &self,
        project_id: Uuid,
        sql_text: &str,
        plan: &RoutingPlan,
    ) -> Result<Vec<ShardResult>, RoutingError> {
        if plan.is_rejected() {
            return Err(plan.reject_error.clone().unwrap_or_else(|| {
                RoutingError::new(RoutingErrorKind::Invalid, plan.reason.clone())
            }));
        }

        let mut results = Vec::with_capacity(plan.targets.len());

        for target in &plan.targets {
            let shard_id = target.shard_id;

            let handle = match self.registry.get(project_id, shard_id).await {
                Ok(handle) => handle,
                Err(err) => {
                    results.push(ShardResult::error(shard_id, err.to_string()));
                    continue;
                }
            };

            let result = match handle.run(sql_text).await {
                Ok(ShardOutcome::Rows { columns, rows }) => {
                    ShardResult::rows(shard_id, columns, rows)
                }
                Ok(ShardOutcome::Affected(count)) => ShardResult::affected(shard_id, count),
                Err(err) => ShardResult::error(shard_id, err.to_string()),
            };
            results.push(result);
        }

        Ok(results)
    }
}
