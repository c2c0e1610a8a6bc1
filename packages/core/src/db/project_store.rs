//! ProjectStore Trait - Persistence Port for Projects
//!
//! Small companion port to [`crate::db::NodeStore`] for the project entity.
//! `get_project` is deliberately unscoped: the service layer needs the true
//! owner to distinguish `Unauthorized` (mutating someone else's project)
//! from `NotFound`.

use crate::db::StoreError;
use crate::models::{Project, ProjectPatch};
use async_trait::async_trait;

/// Abstraction layer for project persistence operations
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Get a project by id, regardless of owner.
    ///
    /// Ownership checks belong to the service layer, which decides whether
    /// a mismatch surfaces as `Unauthorized` or `NotFound`.
    async fn get_project(&self, id: &str) -> Result<Option<Project>, StoreError>;

    /// List all projects owned by an account, ordered by name
    async fn list_projects(&self, owner_id: &str) -> Result<Vec<Project>, StoreError>;

    /// Insert a new project.
    ///
    /// # Errors
    ///
    /// - `Conflict` on id collision
    async fn insert_project(&self, project: Project) -> Result<Project, StoreError>;

    /// Apply a sparse patch to an existing project and return the updated
    /// row. Refreshes `updated_at`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the project is absent
    async fn replace_project(
        &self,
        id: &str,
        patch: ProjectPatch,
    ) -> Result<Project, StoreError>;

    /// Remove a project row. Node cleanup is the service layer's job
    /// (via `NodeStore::remove_by_project`).
    ///
    /// # Errors
    ///
    /// - `NotFound` if the project is absent
    async fn remove_project(&self, id: &str) -> Result<(), StoreError>;
}
