//! Routing service entry point.
//!
//! Parses one statement, resolves its table's shard key and the active
//! shard ring from metadata, and delegates to the planner. The shard
//! list is read once per decision, so the ring stays frozen for the
//! duration of the plan.

use std::sync::Arc;

use uuid::Uuid;

use crate::metadata::{MetadataStore, ShardKeyStore, ShardStatus, ShardStore};
use crate::sql::{self, Statement};

use super::config::RouterConfig;
use super::errors::{RouterError, RoutingError, RoutingErrorKind};
use super::planner::{Planner, RoutingPlan};
use super::ring::Ring;

pub struct RouterService {
    store: Arc<dyn MetadataStore>,
    cfg: RouterConfig,
}

impl RouterService {
    pub fn new(store: Arc<dyn MetadataStore>, cfg: RouterConfig) -> Self {
        Self { store, cfg }
    }

    /// Route one SQL statement for a project.
    ///
    /// Statement-shape problems (parse failure, joins, multiple
    /// statements) and transport failures surface as `Err`; shard-key
    /// problems come back as an `Ok` plan in `Rejected` mode.
    pub async fn route_sql(
        &self,
        project_id: Uuid,
        sql_text: &str,
    ) -> Result<RoutingPlan, RouterError> {
        let mut statements = sql::parse(sql_text)?;
        if statements.len() != 1 {
            return Err(RouterError::MultipleStatements);
        }
        let statement = statements.remove(0);

        let table = resolve_statement_table(&statement)?;

        let shard_keys = self.store.shard_keys_fetch(project_id).await?;
        let Some(shard_key) = shard_keys
            .iter()
            .find(|key| key.table_name == table)
            .map(|key| key.shard_key_column.clone())
        else {
            return Ok(RoutingPlan {
                mode: super::planner::RoutingMode::Rejected,
                targets: Vec::new(),
                reason: format!("no shard key defined for table {table}"),
                reject_error: Some(RoutingError::new(
                    RoutingErrorKind::NoShardKey,
                    "shard key not found",
                )),
            });
        };

        let shards = self.store.shard_list(project_id).await?;
        let active: Vec<Uuid> = shards
            .iter()
            .filter(|shard| shard.status == ShardStatus::Active)
            .map(|shard| shard.id)
            .collect();
        if active.is_empty() {
            return Err(RouterError::NoActiveShards);
        }

        let planner = Planner::new(self.cfg, Ring::new(active));
        Ok(planner.plan(&statement, &table, &shard_key))
    }
}

/// Pull the single target table out of a routable statement.
fn resolve_statement_table(statement: &Statement) -> Result<String, RouterError> {
    match statement {
        Statement::Select(select) => {
            if select.relation_count != 1 || select.has_joins {
                return Err(RouterError::JoinsNotSupported);
            }
            select
                .table
                .clone()
                .ok_or(RouterError::UnsupportedStatement)
        }
        Statement::Insert(insert) => Ok(insert.table.clone()),
        Statement::Update(update) => Ok(update.table.clone()),
        Statement::Delete(delete) => Ok(delete.table.clone()),
        _ => Err(RouterError::UnsupportedStatement),
    }
}
