//! Shard health monitor.
//!
//! A single ticker probes every shard of the active project. An
//! unhealthy shard is deactivated through the normal deactivation path,
//! so the project cascade and status events apply unchanged.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::metadata::{ProjectStore, ShardStore};
use crate::observability::Logger;

use super::plane::ControlPlane;

/// Spawn the monitor loop. Cancelling the token stops it after the
/// in-flight sweep.
pub fn spawn_monitor(
    plane: Arc<ControlPlane>,
    interval: Duration,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    Logger::info("shard monitor stopped", &[]);
                    return;
                }
                _ = ticker.tick() => {
                    plane.check_all_shards().await;
                }
            }
        }
    })
}

impl ControlPlane {
    /// One monitor sweep over the active project's shards.
    pub async fn check_all_shards(&self) {
        let project_id = match self.store.project_fetch_active().await {
            Ok(Some(project_id)) => project_id,
            Ok(None) => return,
            Err(err) => {
                Logger::error(
                    "failed to fetch active project",
                    &[("error", &err.to_string())],
                );
                return;
            }
        };

        let shards = match self.store.shard_list(project_id).await {
            Ok(shards) => shards,
            Err(err) => {
                Logger::error("failed to list shards", &[("error", &err.to_string())]);
                return;
            }
        };

        for shard in shards {
            if self.manager.check_health(project_id, shard.id).await.is_ok() {
                continue;
            }

            Logger::warn(
                "shard became unhealthy",
                &[
                    ("project_id", &project_id.to_string()),
                    ("shard_id", &shard.id.to_string()),
                ],
            );

            if let Err(err) = self.deactivate_shard(shard.id).await {
                Logger::error(
                    "failed to deactivate unhealthy shard",
                    &[
                        ("shard_id", &shard.id.to_string()),
                        ("error", &err.to_string()),
                    ],
                );
            }
        }
    }
}
