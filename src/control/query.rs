//! The query path: route, then fan out.

use uuid::Uuid;

use crate::executor::ShardResult;

use super::errors::{ControlError, ControlResult};
use super::plane::ControlPlane;

impl ControlPlane {
    /// Execute one SQL statement against the shards it routes to.
    ///
    /// Stateless with respect to other queries; the plan is built against
    /// a shard list frozen for this decision.
    pub async fn execute_sql(
        &self,
        project_id: Uuid,
        sql_text: &str,
    ) -> ControlResult<Vec<ShardResult>> {
        let plan = match self.router.route_sql(project_id, sql_text).await {
            Ok(plan) => plan,
            Err(err) => {
                self.events.error(
                    "query routing failed",
                    "control - execute_sql",
                    &[
                        ("project_id", &project_id.to_string()),
                        ("error", &err.to_string()),
                    ],
                );
                return Err(ControlError::Router(err));
            }
        };

        match self.executor.execute(project_id, sql_text, &plan).await {
            Ok(results) => Ok(results),
            Err(err) => {
                self.events.error(
                    "query execution rejected",
                    "control - execute_sql",
                    &[
                        ("project_id", &project_id.to_string()),
                        ("error", &err.to_string()),
                    ],
                );
                Err(ControlError::Routing(err))
            }
        }
    }
}
