//! Schema lifecycle operations.

use uuid::Uuid;

use crate::inference;
use crate::metadata::{
    ProjectSchema, ProjectSchemaStore, ProjectStatus, ProjectStore, SchemaExecution,
    SchemaExecutionStore, SchemaState, ShardKey, ShardKeyRecord, ShardKeyStore, ShardStore,
};
use crate::schema::{
    apply_ddl_to_metadata, execute_project_schema, is_destructive_ddl, retry_failed_schema,
};

use super::capabilities::{project_capabilities, SchemaCapabilities};
use super::errors::{ControlError, ControlResult};
use super::plane::ControlPlane;
use super::rules;

impl ControlPlane {
    pub async fn create_schema_draft(
        &self,
        project_id: Uuid,
        ddl_sql: &str,
    ) -> ControlResult<ProjectSchema> {
        let draft = self.store.schema_create_draft(project_id, ddl_sql).await?;
        self.events.info(
            "schema draft created",
            "control - create_schema_draft",
            &[
                ("project_id", &project_id.to_string()),
                ("schema_id", &draft.id.to_string()),
            ],
        );
        Ok(draft)
    }

    /// Commit a draft: policy gauntlet, fold the DDL into the flattened
    /// logical schema, re-infer shard keys, then mark the draft pending.
    pub async fn commit_schema_draft(
        &self,
        project_id: Uuid,
        schema_id: Uuid,
    ) -> ControlResult<()> {
        if self.store.project_fetch_status(project_id).await? != ProjectStatus::Inactive {
            return self.refuse_commit(project_id, ControlError::ProjectActive).await;
        }

        if self.store.schema_get_state(schema_id).await? != SchemaState::Draft {
            return self.refuse_commit(project_id, ControlError::SchemaNotDraft).await;
        }

        let history = self.store.schema_history(project_id).await?;
        if rules::schema_in_flight(&history) {
            return self.refuse_commit(project_id, ControlError::SchemaInFlight).await;
        }

        let draft = self.store.schema_fetch(schema_id).await?;

        if rules::has_committed_schema(&history) && is_destructive_ddl(&draft.ddl_sql) {
            return self.refuse_commit(project_id, ControlError::DestructiveDdl).await;
        }

        self.events.info(
            "applying committed schema to metadata",
            "control - commit_schema_draft",
            &[
                ("project_id", &project_id.to_string()),
                ("schema_id", &schema_id.to_string()),
            ],
        );

        apply_ddl_to_metadata(self.store.as_ref(), project_id, &draft.ddl_sql).await?;
        inference::apply_inference(self.store.as_ref(), project_id).await?;

        self.store.schema_commit_draft(schema_id).await?;

        self.events.info(
            "schema draft committed",
            "control - commit_schema_draft",
            &[
                ("project_id", &project_id.to_string()),
                ("schema_id", &schema_id.to_string()),
            ],
        );
        Ok(())
    }

    async fn refuse_commit(
        &self,
        project_id: Uuid,
        err: ControlError,
    ) -> ControlResult<()> {
        self.events.error(
            "schema draft commit refused",
            "control - commit_schema_draft",
            &[
                ("project_id", &project_id.to_string()),
                ("error", &err.to_string()),
            ],
        );
        Err(err)
    }

    pub async fn current_schema(&self, project_id: Uuid) -> ControlResult<Option<ProjectSchema>> {
        Ok(self.store.schema_get_latest(project_id).await?)
    }

    pub async fn schema_history(&self, project_id: Uuid) -> ControlResult<Vec<ProjectSchema>> {
        Ok(self.store.schema_history(project_id).await?)
    }

    pub async fn delete_schema_draft(&self, schema_id: Uuid) -> ControlResult<()> {
        self.store.schema_delete_draft(schema_id).await?;
        self.events.info(
            "schema draft deleted",
            "control - delete_schema_draft",
            &[("schema_id", &schema_id.to_string())],
        );
        Ok(())
    }

    pub async fn schema_state(&self, schema_id: Uuid) -> ControlResult<SchemaState> {
        Ok(self.store.schema_get_state(schema_id).await?)
    }

    pub async fn schema_execution_status(
        &self,
        schema_id: Uuid,
    ) -> ControlResult<Vec<SchemaExecution>> {
        Ok(self.store.execution_fetch_all(schema_id).await?)
    }

    pub async fn failed_shard_executions(
        &self,
        schema_id: Uuid,
    ) -> ControlResult<Vec<SchemaExecution>> {
        Ok(self.store.execution_fetch_failed(schema_id).await?)
    }

    /// Roll the pending schema out across all shards of the project.
    pub async fn execute_project_schema(&self, project_id: Uuid) -> ControlResult<()> {
        let caps = self.schema_capabilities(project_id).await?;
        if !caps.can_execute {
            self.events.error(
                "schema execution refused",
                "control - execute_project_schema",
                &[("project_id", &project_id.to_string())],
            );
            return Err(ControlError::ExecutionNotAllowed);
        }

        let result = execute_project_schema(
            project_id,
            self.store.as_ref(),
            self.store.as_ref(),
            self.store.as_ref(),
            self,
        )
        .await;

        match &result {
            Ok(()) => self.events.info(
                "project schema executed",
                "control - execute_project_schema",
                &[("project_id", &project_id.to_string())],
            ),
            Err(err) => self.events.error(
                "project schema execution failed",
                "control - execute_project_schema",
                &[
                    ("project_id", &project_id.to_string()),
                    ("error", &err.to_string()),
                ],
            ),
        }

        result.map_err(ControlError::from)
    }

    /// Reset failed execution records and re-pend the latest schema.
    pub async fn retry_schema_execution(&self, project_id: Uuid) -> ControlResult<()> {
        retry_failed_schema(project_id, self.store.as_ref(), self.store.as_ref()).await?;
        self.events.info(
            "failed schema reset for retry",
            "control - retry_schema_execution",
            &[("project_id", &project_id.to_string())],
        );
        Ok(())
    }

    /// Re-run shard-key inference, preserving manual overrides.
    pub async fn recompute_shard_keys(&self, project_id: Uuid) -> ControlResult<()> {
        match inference::apply_inference(self.store.as_ref(), project_id).await {
            Ok(_) => {
                self.events.info(
                    "shard key inference completed",
                    "control - recompute_shard_keys",
                    &[("project_id", &project_id.to_string())],
                );
                Ok(())
            }
            Err(err) => {
                self.events.error(
                    "shard key inference failed",
                    "control - recompute_shard_keys",
                    &[
                        ("project_id", &project_id.to_string()),
                        ("error", &err.to_string()),
                    ],
                );
                Err(err.into())
            }
        }
    }

    pub async fn fetch_shard_keys(&self, project_id: Uuid) -> ControlResult<Vec<ShardKey>> {
        Ok(self.store.shard_keys_fetch(project_id).await?)
    }

    pub async fn replace_shard_keys(
        &self,
        project_id: Uuid,
        records: &[ShardKeyRecord],
    ) -> ControlResult<()> {
        self.store.shard_keys_replace(project_id, records).await?;
        self.events.info(
            "shard keys replaced",
            "control - replace_shard_keys",
            &[("project_id", &project_id.to_string())],
        );
        Ok(())
    }

    /// Derived view of which schema operations are currently possible.
    pub async fn schema_capabilities(
        &self,
        project_id: Uuid,
    ) -> ControlResult<SchemaCapabilities> {
        let status = self.store.project_fetch_status(project_id).await?;
        let latest = self.store.schema_get_latest(project_id).await?;
        let shards = self.store.shard_list(project_id).await?;

        Ok(project_capabilities(
            status,
            latest.as_ref(),
            rules::all_shards_active(&shards),
        ))
    }
}
