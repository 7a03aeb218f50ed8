//! Shared test harness: an in-memory metadata store with the same row
//! semantics as the PostgreSQL implementation, plus a scriptable DDL
//! executor for rollout scenarios.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use shardrail::metadata::{
    ColumnRecord, ColumnStore, ExecutionState, FkEdgeRecord, FkEdgeStore, MetadataError,
    MetadataResult, Project, ProjectSchema, ProjectSchemaStore, ProjectStatus, ProjectStore,
    SchemaExecution, SchemaExecutionStore, SchemaState, Shard, ShardConnection,
    ShardConnectionParams, ShardConnectionStore, ShardKey, ShardKeyRecord, ShardKeyStore,
    ShardStatus, ShardStore,
};
use shardrail::schema::{DdlExecutor, SchemaError};

#[derive(Default)]
struct Inner {
    projects: Vec<Project>,
    shards: Vec<Shard>,
    connections: Vec<ShardConnection>,
    schemas: Vec<ProjectSchema>,
    executions: Vec<SchemaExecution>,
    columns: Vec<ColumnRecord>,
    edges: Vec<FkEdgeRecord>,
    shard_keys: Vec<ShardKey>,
}

/// In-memory `MetadataStore` double.
#[derive(Default)]
pub struct MemoryMetadata {
    inner: Mutex<Inner>,
}

impl MemoryMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a project directly with the given status.
    pub fn seed_project(&self, status: ProjectStatus) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.lock().unwrap().projects.push(Project {
            id,
            name: format!("project-{id}"),
            description: String::new(),
            status,
            shard_count: 0,
            created_at: Utc::now(),
        });
        id
    }

    /// Insert a shard directly with the given status.
    pub fn seed_shard(&self, project_id: Uuid, status: ShardStatus) -> Uuid {
        let mut inner = self.inner.lock().unwrap();
        let shard_index = inner
            .shards
            .iter()
            .filter(|shard| shard.project_id == project_id)
            .map(|shard| shard.shard_index)
            .max()
            .map(|index| index + 1)
            .unwrap_or(0);
        let id = Uuid::new_v4();
        inner.shards.push(Shard {
            id,
            project_id,
            shard_index,
            status,
            created_at: Utc::now(),
        });
        id
    }

    /// Insert a shard-key row directly.
    pub fn seed_shard_key(
        &self,
        project_id: Uuid,
        table: &str,
        column: &str,
        is_manual: bool,
    ) {
        self.inner.lock().unwrap().shard_keys.push(ShardKey {
            project_id,
            table_name: table.to_string(),
            shard_key_column: column.to_string(),
            is_manual_override: is_manual,
            updated_at: Utc::now(),
        });
    }

    /// Flip a project's status directly.
    pub fn seed_project_status(&self, project_id: Uuid, status: ProjectStatus) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(project) = inner
            .projects
            .iter_mut()
            .find(|project| project.id == project_id)
        {
            project.status = status;
        }
    }

    pub fn set_shard_status(&self, shard_id: Uuid, status: ShardStatus) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(shard) = inner.shards.iter_mut().find(|shard| shard.id == shard_id) {
            shard.status = status;
        }
    }
}

#[async_trait]
impl ProjectStore for MemoryMetadata {
    async fn project_add(&self, name: &str, description: &str) -> MetadataResult<Project> {
        let project = Project {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            status: ProjectStatus::Inactive,
            shard_count: 0,
            created_at: Utc::now(),
        };
        self.inner.lock().unwrap().projects.push(project.clone());
        Ok(project)
    }

    async fn project_list(&self) -> MetadataResult<Vec<Project>> {
        let inner = self.inner.lock().unwrap();
        let mut projects = inner.projects.clone();
        for project in &mut projects {
            project.shard_count = inner
                .shards
                .iter()
                .filter(|shard| shard.project_id == project.id)
                .count() as i64;
        }
        Ok(projects)
    }

    async fn project_fetch(&self, id: Uuid) -> MetadataResult<Project> {
        self.inner
            .lock()
            .unwrap()
            .projects
            .iter()
            .find(|project| project.id == id)
            .cloned()
            .ok_or(MetadataError::NotFound)
    }

    async fn project_remove(&self, id: Uuid) -> MetadataResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.projects.len();
        inner.projects.retain(|project| project.id != id);
        if inner.projects.len() == before {
            return Err(MetadataError::NotFound);
        }
        Ok(())
    }

    async fn project_activate(&self, id: Uuid) -> MetadataResult<()> {
        self.set_project_status(id, ProjectStatus::Active)
    }

    async fn project_deactivate(&self, id: Uuid) -> MetadataResult<()> {
        self.set_project_status(id, ProjectStatus::Inactive)
    }

    async fn project_fetch_status(&self, id: Uuid) -> MetadataResult<ProjectStatus> {
        Ok(self.project_fetch(id).await?.status)
    }

    async fn project_fetch_active(&self) -> MetadataResult<Option<Uuid>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .projects
            .iter()
            .find(|project| project.status == ProjectStatus::Active)
            .map(|project| project.id))
    }
}

impl MemoryMetadata {
    fn set_project_status(&self, id: Uuid, status: ProjectStatus) -> MetadataResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let project = inner
            .projects
            .iter_mut()
            .find(|project| project.id == id)
            .ok_or(MetadataError::NotFound)?;
        project.status = status;
        Ok(())
    }
}

#[async_trait]
impl ShardStore for MemoryMetadata {
    async fn shard_add(&self, project_id: Uuid) -> MetadataResult<Shard> {
        let id = self.seed_shard(project_id, ShardStatus::Inactive);
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .shards
            .iter()
            .find(|shard| shard.id == id)
            .cloned()
            .unwrap())
    }

    async fn shard_list(&self, project_id: Uuid) -> MetadataResult<Vec<Shard>> {
        let inner = self.inner.lock().unwrap();
        let mut shards: Vec<Shard> = inner
            .shards
            .iter()
            .filter(|shard| shard.project_id == project_id)
            .cloned()
            .collect();
        shards.sort_by_key(|shard| shard.shard_index);
        Ok(shards)
    }

    async fn shard_activate(&self, shard_id: Uuid) -> MetadataResult<()> {
        self.set_shard_status_checked(shard_id, ShardStatus::Active)
    }

    async fn shard_deactivate(&self, shard_id: Uuid) -> MetadataResult<()> {
        self.set_shard_status_checked(shard_id, ShardStatus::Inactive)
    }

    async fn shard_delete(&self, shard_id: Uuid) -> MetadataResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let shard = inner
            .shards
            .iter()
            .find(|shard| shard.id == shard_id)
            .ok_or(MetadataError::NotFound)?;
        if shard.status == ShardStatus::Active {
            return Err(MetadataError::ShardActive);
        }
        inner.shards.retain(|shard| shard.id != shard_id);
        Ok(())
    }

    async fn shard_delete_all(&self, project_id: Uuid) -> MetadataResult<()> {
        self.inner
            .lock()
            .unwrap()
            .shards
            .retain(|shard| shard.project_id != project_id);
        Ok(())
    }

    async fn shard_fetch_status(&self, shard_id: Uuid) -> MetadataResult<ShardStatus> {
        self.inner
            .lock()
            .unwrap()
            .shards
            .iter()
            .find(|shard| shard.id == shard_id)
            .map(|shard| shard.status)
            .ok_or(MetadataError::NotFound)
    }

    async fn shard_fetch_project_id(&self, shard_id: Uuid) -> MetadataResult<Uuid> {
        self.inner
            .lock()
            .unwrap()
            .shards
            .iter()
            .find(|shard| shard.id == shard_id)
            .map(|shard| shard.project_id)
            .ok_or(MetadataError::NotFound)
    }
}

impl MemoryMetadata {
    fn set_shard_status_checked(
        &self,
        shard_id: Uuid,
        status: ShardStatus,
    ) -> MetadataResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let shard = inner
            .shards
            .iter_mut()
            .find(|shard| shard.id == shard_id)
            .ok_or(MetadataError::NotFound)?;
        shard.status = status;
        Ok(())
    }
}

#[async_trait]
impl ShardConnectionStore for MemoryMetadata {
    async fn connection_create(&self, params: &ShardConnectionParams) -> MetadataResult<()> {
        self.inner.lock().unwrap().connections.push(ShardConnection {
            shard_id: params.shard_id,
            host: params.host.clone(),
            port: params.port,
            database_name: params.database_name.clone(),
            username: params.username.clone(),
            password: params.password.clone(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        Ok(())
    }

    async fn connection_update(&self, params: &ShardConnectionParams) -> MetadataResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let connection = inner
            .connections
            .iter_mut()
            .find(|connection| connection.shard_id == params.shard_id)
            .ok_or(MetadataError::NotFound)?;
        connection.host = params.host.clone();
        connection.port = params.port;
        connection.database_name = params.database_name.clone();
        connection.username = params.username.clone();
        connection.password = params.password.clone();
        connection.updated_at = Utc::now();
        Ok(())
    }

    async fn connection_remove(&self, shard_id: Uuid) -> MetadataResult<()> {
        self.inner
            .lock()
            .unwrap()
            .connections
            .retain(|connection| connection.shard_id != shard_id);
        Ok(())
    }

    async fn connection_fetch(&self, shard_id: Uuid) -> MetadataResult<ShardConnection> {
        self.inner
            .lock()
            .unwrap()
            .connections
            .iter()
            .find(|connection| connection.shard_id == shard_id)
            .cloned()
            .ok_or(MetadataError::NotFound)
    }
}

#[async_trait]
impl ProjectSchemaStore for MemoryMetadata {
    async fn schema_create_draft(
        &self,
        project_id: Uuid,
        ddl_sql: &str,
    ) -> MetadataResult<ProjectSchema> {
        let mut inner = self.inner.lock().unwrap();
        let version = inner
            .schemas
            .iter()
            .filter(|schema| schema.project_id == project_id)
            .map(|schema| schema.version)
            .max()
            .unwrap_or(0)
            + 1;
        let schema = ProjectSchema {
            id: Uuid::new_v4(),
            project_id,
            version,
            state: SchemaState::Draft,
            ddl_sql: ddl_sql.to_string(),
            error_message: None,
            created_at: Utc::now(),
            committed_at: None,
            applied_at: None,
        };
        inner.schemas.push(schema.clone());
        Ok(schema)
    }

    async fn schema_commit_draft(&self, schema_id: Uuid) -> MetadataResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let schema = inner
            .schemas
            .iter_mut()
            .find(|schema| schema.id == schema_id)
            .ok_or(MetadataError::NotFound)?;
        schema.state = SchemaState::Pending;
        schema.committed_at = Some(Utc::now());
        Ok(())
    }

    async fn schema_set_applying(&self, schema_id: Uuid) -> MetadataResult<()> {
        self.schema_update_state(schema_id, SchemaState::Applying, None)
            .await
    }

    async fn schema_update_state(
        &self,
        schema_id: Uuid,
        state: SchemaState,
        error: Option<&str>,
    ) -> MetadataResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let schema = inner
            .schemas
            .iter_mut()
            .find(|schema| schema.id == schema_id)
            .ok_or(MetadataError::NotFound)?;
        schema.state = state;
        schema.error_message = error.map(str::to_string);
        if state == SchemaState::Applied {
            schema.applied_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn schema_get_latest(&self, project_id: Uuid) -> MetadataResult<Option<ProjectSchema>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .schemas
            .iter()
            .filter(|schema| schema.project_id == project_id)
            .max_by_key(|schema| schema.version)
            .cloned())
    }

    async fn schema_fetch(&self, schema_id: Uuid) -> MetadataResult<ProjectSchema> {
        self.inner
            .lock()
            .unwrap()
            .schemas
            .iter()
            .find(|schema| schema.id == schema_id)
            .cloned()
            .ok_or(MetadataError::NotFound)
    }

    async fn schema_get_state(&self, schema_id: Uuid) -> MetadataResult<SchemaState> {
        Ok(self.schema_fetch(schema_id).await?.state)
    }

    async fn schema_delete_draft(&self, schema_id: Uuid) -> MetadataResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.schemas.len();
        inner
            .schemas
            .retain(|schema| !(schema.id == schema_id && schema.state == SchemaState::Draft));
        if inner.schemas.len() == before {
            return Err(MetadataError::NotFound);
        }
        Ok(())
    }

    async fn schema_get_pending(&self, project_id: Uuid) -> MetadataResult<ProjectSchema> {
        self.inner
            .lock()
            .unwrap()
            .schemas
            .iter()
            .filter(|schema| {
                schema.project_id == project_id && schema.state == SchemaState::Pending
            })
            .max_by_key(|schema| schema.version)
            .cloned()
            .ok_or(MetadataError::NotFound)
    }

    async fn schema_history(&self, project_id: Uuid) -> MetadataResult<Vec<ProjectSchema>> {
        let mut history: Vec<ProjectSchema> = self
            .inner
            .lock()
            .unwrap()
            .schemas
            .iter()
            .filter(|schema| schema.project_id == project_id)
            .cloned()
            .collect();
        history.sort_by_key(|schema| schema.version);
        Ok(history)
    }

    async fn schema_latest_applied(
        &self,
        project_id: Uuid,
    ) -> MetadataResult<Option<ProjectSchema>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .schemas
            .iter()
            .filter(|schema| {
                schema.project_id == project_id && schema.state == SchemaState::Applied
            })
            .max_by_key(|schema| schema.version)
            .cloned())
    }
}

#[async_trait]
impl SchemaExecutionStore for MemoryMetadata {
    async fn execution_create(&self, schema_id: Uuid, shard_id: Uuid) -> MetadataResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let exists = inner
            .executions
            .iter()
            .any(|record| record.schema_id == schema_id && record.shard_id == shard_id);
        if !exists {
            inner.executions.push(SchemaExecution {
                id: Uuid::new_v4(),
                schema_id,
                shard_id,
                state: ExecutionState::Pending,
                error_message: None,
                executed_at: None,
            });
        }
        Ok(())
    }

    async fn execution_update_state(
        &self,
        schema_id: Uuid,
        shard_id: Uuid,
        state: ExecutionState,
        error: Option<&str>,
    ) -> MetadataResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .executions
            .iter_mut()
            .find(|record| record.schema_id == schema_id && record.shard_id == shard_id)
            .ok_or(MetadataError::NotFound)?;
        record.state = state;
        record.error_message = error.map(str::to_string);
        record.executed_at = Some(Utc::now());
        Ok(())
    }

    async fn execution_reset(&self, schema_id: Uuid, shard_id: Uuid) -> MetadataResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .executions
            .iter_mut()
            .find(|record| record.schema_id == schema_id && record.shard_id == shard_id)
            .ok_or(MetadataError::NotFound)?;
        record.state = ExecutionState::Pending;
        record.error_message = None;
        record.executed_at = None;
        Ok(())
    }

    async fn execution_fetch_all(&self, schema_id: Uuid) -> MetadataResult<Vec<SchemaExecution>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .executions
            .iter()
            .filter(|record| record.schema_id == schema_id)
            .cloned()
            .collect())
    }

    async fn execution_fetch_failed(
        &self,
        schema_id: Uuid,
    ) -> MetadataResult<Vec<SchemaExecution>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .executions
            .iter()
            .filter(|record| {
                record.schema_id == schema_id && record.state == ExecutionState::Failed
            })
            .cloned()
            .collect())
    }

    async fn execution_all_applied(&self, schema_id: Uuid) -> MetadataResult<bool> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .executions
            .iter()
            .filter(|record| record.schema_id == schema_id)
            .all(|record| record.state == ExecutionState::Applied))
    }
}

#[async_trait]
impl ColumnStore for MemoryMetadata {
    async fn columns_fetch(&self, project_id: Uuid) -> MetadataResult<Vec<ColumnRecord>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .columns
            .iter()
            .filter(|record| record.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn columns_replace(
        &self,
        project_id: Uuid,
        records: &[ColumnRecord],
    ) -> MetadataResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.columns.retain(|record| record.project_id != project_id);
        inner.columns.extend_from_slice(records);
        Ok(())
    }
}

#[async_trait]
impl FkEdgeStore for MemoryMetadata {
    async fn fk_edges_fetch(&self, project_id: Uuid) -> MetadataResult<Vec<FkEdgeRecord>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .edges
            .iter()
            .filter(|record| record.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn fk_edges_replace(
        &self,
        project_id: Uuid,
        records: &[FkEdgeRecord],
    ) -> MetadataResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.edges.retain(|record| record.project_id != project_id);
        inner.edges.extend_from_slice(records);
        Ok(())
    }
}

#[async_trait]
impl ShardKeyStore for MemoryMetadata {
    async fn shard_keys_fetch(&self, project_id: Uuid) -> MetadataResult<Vec<ShardKey>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .shard_keys
            .iter()
            .filter(|key| key.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn shard_keys_replace(
        &self,
        project_id: Uuid,
        records: &[ShardKeyRecord],
    ) -> MetadataResult<()> {
        {
            let mut inner = self.inner.lock().unwrap();
            inner
                .shard_keys
                .retain(|key| key.project_id != project_id || key.is_manual_override);
        }
        for record in records {
            self.shard_key_upsert(project_id, record).await?;
        }
        Ok(())
    }

    async fn shard_key_upsert(
        &self,
        project_id: Uuid,
        record: &ShardKeyRecord,
    ) -> MetadataResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(existing) = inner
            .shard_keys
            .iter_mut()
            .find(|key| key.project_id == project_id && key.table_name == record.table_name)
        {
            // A manual override wins over any upsert.
            if !existing.is_manual_override {
                existing.shard_key_column = record.shard_key_column.clone();
                existing.is_manual_override = record.is_manual;
                existing.updated_at = Utc::now();
            }
        } else {
            inner.shard_keys.push(ShardKey {
                project_id,
                table_name: record.table_name.clone(),
                shard_key_column: record.shard_key_column.clone(),
                is_manual_override: record.is_manual,
                updated_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn shard_key_delete(&self, project_id: Uuid, table_name: &str) -> MetadataResult<()> {
        self.inner
            .lock()
            .unwrap()
            .shard_keys
            .retain(|key| !(key.project_id == project_id && key.table_name == table_name));
        Ok(())
    }
}

/// DDL executor double: records calls and fails for scripted shards.
#[derive(Default)]
pub struct ScriptedDdl {
    fail_shards: Mutex<HashSet<Uuid>>,
    calls: Mutex<Vec<Uuid>>,
}

impl ScriptedDdl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, shard_id: Uuid) {
        self.fail_shards.lock().unwrap().insert(shard_id);
    }

    pub fn clear_failures(&self) {
        self.fail_shards.lock().unwrap().clear();
    }

    pub fn calls(&self) -> Vec<Uuid> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DdlExecutor for ScriptedDdl {
    async fn execute_ddl(
        &self,
        _project_id: Uuid,
        shard_id: Uuid,
        _ddl: &str,
    ) -> Result<(), SchemaError> {
        self.calls.lock().unwrap().push(shard_id);
        if self.fail_shards.lock().unwrap().contains(&shard_id) {
            return Err(SchemaError::ShardDdl {
                shard_id,
                message: "syntax error at or near \"WIDGET\"".to_string(),
            });
        }
        Ok(())
    }
}
