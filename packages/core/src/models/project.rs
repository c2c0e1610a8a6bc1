//! Project Data Structures
//!
//! A `Project` is the owning scope for a node tree. Every node belongs to
//! exactly one project, and all sibling/ordering comparisons are scoped to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A writing project owned by a single account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique identifier (UUID)
    pub id: String,

    /// Owning account
    pub owner_id: String,

    /// Display name
    pub name: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new Project with auto-generated UUID
    pub fn new(owner_id: String, name: String) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            name,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Sparse update for a project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    /// Update display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project() {
        let project = Project::new("owner-1".to_string(), "First Novel".to_string());
        assert!(!project.id.is_empty());
        assert_eq!(project.owner_id, "owner-1");
        assert_eq!(project.created_at, project.updated_at);
    }
}
