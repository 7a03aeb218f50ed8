//! Schema rollout state machine.
//!
//! Drives a committed schema through every shard of a project:
//! draft → pending → applying → applied | failed, with failed → pending
//! reachable only through retry. One execution record tracks each
//! (schema, shard) pair; the schema reaches `applied` exactly when every
//! record does.

use async_trait::async_trait;
use uuid::Uuid;

use crate::metadata::{
    ExecutionState, ProjectSchemaStore, SchemaExecutionStore, SchemaState, ShardStatus, ShardStore,
};

use super::errors::SchemaError;

/// Seam through which rollout runs DDL on one shard's backend.
#[async_trait]
pub trait DdlExecutor: Send + Sync {
    async fn execute_ddl(
        &self,
        project_id: Uuid,
        shard_id: Uuid,
        ddl: &str,
    ) -> Result<(), SchemaError>;
}

/// Apply the latest pending schema of `project_id` across its shards.
///
/// Execution records for every shard are created in `pending` before any
/// DDL runs, so the status table always shows the full shard set for the
/// attempt. Shards execute in `shard_index` order; the first inactive
/// shard or backend error fails both the record and the schema and stops
/// the rollout.
pub async fn execute_project_schema(
    project_id: Uuid,
    schemas: &dyn ProjectSchemaStore,
    shards: &dyn ShardStore,
    executions: &dyn SchemaExecutionStore,
    ddl_executor: &dyn DdlExecutor,
) -> Result<(), SchemaError> {
    let schema = schemas.schema_get_pending(project_id).await?;
    schemas.schema_set_applying(schema.id).await?;

    let shard_list = shards.shard_list(project_id).await?;

    for shard in &shard_list {
        executions.execution_create(schema.id, shard.id).await?;
    }

    for shard in &shard_list {
        if shard.status != ShardStatus::Active {
            let message = "shard inactive";
            executions
                .execution_update_state(schema.id, shard.id, ExecutionState::Failed, Some(message))
                .await?;
            schemas
                .schema_update_state(schema.id, SchemaState::Failed, Some(message))
                .await?;
            return Err(SchemaError::ShardInactive { shard_id: shard.id });
        }

        if let Err(err) = ddl_executor
            .execute_ddl(project_id, shard.id, &schema.ddl_sql)
            .await
        {
            let message = err.to_string();
            executions
                .execution_update_state(
                    schema.id,
                    shard.id,
                    ExecutionState::Failed,
                    Some(&message),
                )
                .await?;
            schemas
                .schema_update_state(schema.id, SchemaState::Failed, Some(&message))
                .await?;
            return Err(err);
        }

        executions
            .execution_update_state(schema.id, shard.id, ExecutionState::Applied, None)
            .await?;
    }

    schemas
        .schema_update_state(schema.id, SchemaState::Applied, None)
        .await?;
    Ok(())
}

/// Reset every failed execution record of the latest schema back to
/// `pending` and re-pend the schema. A subsequent
/// [`execute_project_schema`] drives the rollout again.
pub async fn retry_failed_schema(
    project_id: Uuid,
    schemas: &dyn ProjectSchemaStore,
    executions: &dyn SchemaExecutionStore,
) -> Result<(), SchemaError> {
    let schema = schemas
        .schema_get_latest(project_id)
        .await?
        .ok_or(SchemaError::NotFailed)?;

    if schema.state != SchemaState::Failed {
        return Err(SchemaError::NotFailed);
    }

    for record in executions.execution_fetch_failed(schema.id).await? {
        executions.execution_reset(schema.id, record.shard_id).await?;
    }

    schemas
        .schema_update_state(schema.id, SchemaState::Pending, None)
        .await?;
    Ok(())
}
