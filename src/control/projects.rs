//! Project lifecycle operations.

use uuid::Uuid;

use crate::metadata::{Project, ProjectStatus, ProjectStore, ShardStore};

use super::errors::{ControlError, ControlResult};
use super::plane::ControlPlane;
use super::rules;

impl ControlPlane {
    pub async fn create_project(
        &self,
        name: &str,
        description: &str,
    ) -> ControlResult<Project> {
        match self.store.project_add(name, description).await {
            Ok(project) => {
                self.events.info(
                    "project created",
                    "control - create_project",
                    &[
                        ("project_id", &project.id.to_string()),
                        ("project_name", name),
                    ],
                );
                Ok(project)
            }
            Err(err) => {
                self.events.error(
                    "project creation failed",
                    "control - create_project",
                    &[("project_name", name), ("error", &err.to_string())],
                );
                Err(err.into())
            }
        }
    }

    pub async fn list_projects(&self) -> ControlResult<Vec<Project>> {
        Ok(self.store.project_list().await?)
    }

    pub async fn fetch_project(&self, project_id: Uuid) -> ControlResult<Project> {
        Ok(self.store.project_fetch(project_id).await?)
    }

    pub async fn delete_project(&self, project_id: Uuid) -> ControlResult<()> {
        match self.store.project_remove(project_id).await {
            Ok(()) => {
                self.events.info(
                    "project deleted",
                    "control - delete_project",
                    &[("project_id", &project_id.to_string())],
                );
                Ok(())
            }
            Err(err) => {
                self.events.error(
                    "project deletion failed",
                    "control - delete_project",
                    &[
                        ("project_id", &project_id.to_string()),
                        ("error", &err.to_string()),
                    ],
                );
                Err(err.into())
            }
        }
    }

    /// Activate a project. Requires every other project inactive and at
    /// least one shard, all active; reopens connections afterwards.
    pub async fn activate_project(&self, project_id: Uuid) -> ControlResult<()> {
        let projects = self.store.project_list().await?;
        if !rules::all_projects_inactive(&projects) {
            self.events.error(
                "project activation refused",
                "control - activate_project",
                &[
                    ("project_id", &project_id.to_string()),
                    ("error", "another project is already active"),
                ],
            );
            return Err(ControlError::AnotherProjectActive);
        }

        let shards = self.store.shard_list(project_id).await?;
        if !rules::all_shards_active(&shards) {
            self.events.error(
                "project activation refused",
                "control - activate_project",
                &[
                    ("project_id", &project_id.to_string()),
                    ("error", "all shards must be active"),
                ],
            );
            return Err(ControlError::ShardsNotActive);
        }

        self.store.project_activate(project_id).await?;
        self.retry_shard_connections().await?;

        self.events
            .project_status_changed(project_id, ProjectStatus::Active.as_str());
        self.events.info(
            "project activated",
            "control - activate_project",
            &[("project_id", &project_id.to_string())],
        );
        Ok(())
    }

    pub async fn deactivate_project(&self, project_id: Uuid) -> ControlResult<()> {
        self.store.project_deactivate(project_id).await?;

        self.events
            .project_status_changed(project_id, ProjectStatus::Inactive.as_str());
        self.events.info(
            "project deactivated",
            "control - deactivate_project",
            &[("project_id", &project_id.to_string())],
        );
        Ok(())
    }

    pub async fn fetch_project_status(&self, project_id: Uuid) -> ControlResult<ProjectStatus> {
        Ok(self.store.project_fetch_status(project_id).await?)
    }
}
