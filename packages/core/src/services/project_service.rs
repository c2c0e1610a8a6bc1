//! ProjectService - project lifecycle
//!
//! Projects are the owning scope for node trees. This service covers their
//! creation, listing, renaming, and deletion, and is the place where
//! ownership mismatches become `Unauthorized` rather than `NotFound`:
//! project ids arrive from a caller's own project list, so hiding them
//! gains nothing, and the distinction matters for mutations.
//!
//! Deleting a project cascades to every node in it.

use crate::db::{DomainEvent, NodeStore, ProjectStore};
use crate::models::{Project, ProjectPatch};
use crate::services::error::NodeServiceError;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Broadcast channel capacity for domain events
const DOMAIN_EVENT_CHANNEL_CAPACITY: usize = 128;

/// Project lifecycle orchestrator
#[derive(Clone)]
pub struct ProjectService {
    /// Persistence port for projects
    projects: Arc<dyn ProjectStore>,

    /// Persistence port for nodes (cascade deletes)
    nodes: Arc<dyn NodeStore>,

    /// Broadcast channel for domain events
    event_tx: broadcast::Sender<DomainEvent>,
}

impl ProjectService {
    /// Create a new ProjectService
    pub fn new(projects: Arc<dyn ProjectStore>, nodes: Arc<dyn NodeStore>) -> Self {
        let (event_tx, _) = broadcast::channel(DOMAIN_EVENT_CHANNEL_CAPACITY);

        Self {
            projects,
            nodes,
            event_tx,
        }
    }

    /// Subscribe to project domain events
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<DomainEvent> {
        self.event_tx.subscribe()
    }

    fn emit_event(&self, event: DomainEvent) {
        let _ = self.event_tx.send(event);
    }

    fn validate_name(raw: &str) -> Result<String, NodeServiceError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NodeServiceError::invalid_name("name is empty after trimming"));
        }
        Ok(trimmed.to_string())
    }

    /// Load a project and verify the caller owns it.
    ///
    /// The lookup itself is unscoped so an ownership mismatch can surface
    /// as `Unauthorized` instead of `NotFound`.
    async fn load_owned(&self, id: &str, owner_id: &str) -> Result<Project, NodeServiceError> {
        let project = self
            .projects
            .get_project(id)
            .await?
            .ok_or_else(|| NodeServiceError::not_found(id))?;

        if project.owner_id != owner_id {
            return Err(NodeServiceError::unauthorized(format!("project {}", id)));
        }

        Ok(project)
    }

    /// Create a project.
    ///
    /// # Errors
    ///
    /// - `InvalidName` if the name is empty after trimming
    pub async fn create_project(
        &self,
        owner_id: &str,
        name: &str,
    ) -> Result<Project, NodeServiceError> {
        let name = Self::validate_name(name)?;

        let project = self
            .projects
            .insert_project(Project::new(owner_id.to_string(), name))
            .await?;
        tracing::info!("Created project '{}' ({})", project.name, project.id);
        self.emit_event(DomainEvent::ProjectCreated(project.clone()));

        Ok(project)
    }

    /// Get a project the caller owns.
    ///
    /// Reads hide other owners' projects as `NotFound`.
    pub async fn get_project(
        &self,
        id: &str,
        owner_id: &str,
    ) -> Result<Project, NodeServiceError> {
        match self.load_owned(id, owner_id).await {
            Err(NodeServiceError::Unauthorized { .. }) => {
                Err(NodeServiceError::not_found(id))
            }
            other => other,
        }
    }

    /// List the caller's projects, ordered by name
    pub async fn list_projects(&self, owner_id: &str) -> Result<Vec<Project>, NodeServiceError> {
        Ok(self.projects.list_projects(owner_id).await?)
    }

    /// Rename a project.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the project is absent
    /// - `Unauthorized` if the caller does not own it
    /// - `InvalidName` if the name is empty after trimming
    pub async fn rename_project(
        &self,
        id: &str,
        owner_id: &str,
        new_name: &str,
    ) -> Result<Project, NodeServiceError> {
        self.load_owned(id, owner_id).await?;
        let name = Self::validate_name(new_name)?;

        let updated = self
            .projects
            .replace_project(id, ProjectPatch { name: Some(name) })
            .await?;
        tracing::info!("Renamed project {} to '{}'", id, updated.name);

        Ok(updated)
    }

    /// Delete a project and every node in it.
    ///
    /// Nodes go first so a failure partway leaves the project row intact
    /// and the operation retryable.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the project is absent
    /// - `Unauthorized` if the caller does not own it
    pub async fn delete_project(&self, id: &str, owner_id: &str) -> Result<(), NodeServiceError> {
        self.load_owned(id, owner_id).await?;

        self.nodes.remove_by_project(id, owner_id).await?;
        self.projects.remove_project(id).await?;

        tracing::info!("Deleted project {}", id);
        self.emit_event(DomainEvent::ProjectDeleted { id: id.to_string() });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::NodeKind;
    use crate::services::{CreateNodeParams, NodeService};

    fn create_test_service() -> (ProjectService, NodeService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let projects = ProjectService::new(store.clone(), store.clone());
        let nodes = NodeService::new(store.clone());
        (projects, nodes, store)
    }

    #[tokio::test]
    async fn test_create_and_list_projects() {
        let (projects, _, _) = create_test_service();

        projects.create_project("owner-1", "Novel").await.unwrap();
        projects.create_project("owner-1", "Essays").await.unwrap();
        projects.create_project("owner-2", "Other").await.unwrap();

        let listed = projects.list_projects("owner-1").await.unwrap();
        let names: Vec<&str> = listed.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Essays", "Novel"]);
    }

    #[tokio::test]
    async fn test_get_hides_foreign_projects() {
        let (projects, _, _) = create_test_service();
        let project = projects.create_project("owner-1", "Novel").await.unwrap();

        let err = projects.get_project(&project.id, "owner-2").await.unwrap_err();
        assert!(matches!(err, NodeServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_rename_requires_ownership() {
        let (projects, _, _) = create_test_service();
        let project = projects.create_project("owner-1", "Novel").await.unwrap();

        let err = projects
            .rename_project(&project.id, "owner-2", "Stolen")
            .await
            .unwrap_err();
        assert!(matches!(err, NodeServiceError::Unauthorized { .. }));

        let renamed = projects
            .rename_project(&project.id, "owner-1", "  Second Novel  ")
            .await
            .unwrap();
        assert_eq!(renamed.name, "Second Novel");
    }

    #[tokio::test]
    async fn test_delete_cascades_to_nodes() {
        let (projects, nodes, _) = create_test_service();
        let project = projects.create_project("owner-1", "Novel").await.unwrap();

        let folder = nodes
            .create(CreateNodeParams {
                owner_id: "owner-1".to_string(),
                project_id: project.id.clone(),
                parent_id: None,
                kind: NodeKind::Folder,
                name: "Drafts".to_string(),
                content: None,
            })
            .await
            .unwrap();
        nodes
            .create(CreateNodeParams {
                owner_id: "owner-1".to_string(),
                project_id: project.id.clone(),
                parent_id: Some(folder.id.clone()),
                kind: NodeKind::File,
                name: "ch1.txt".to_string(),
                content: Some("It was a dark night".to_string()),
            })
            .await
            .unwrap();

        projects.delete_project(&project.id, "owner-1").await.unwrap();

        let err = projects.get_project(&project.id, "owner-1").await.unwrap_err();
        assert!(matches!(err, NodeServiceError::NotFound { .. }));
        let err = nodes.get(&folder.id, "owner-1").await.unwrap_err();
        assert!(matches!(err, NodeServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_blank_project_name_rejected() {
        let (projects, _, _) = create_test_service();
        let err = projects.create_project("owner-1", "   ").await.unwrap_err();
        assert!(matches!(err, NodeServiceError::InvalidName(_)));
    }
}
