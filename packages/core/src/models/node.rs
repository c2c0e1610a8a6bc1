//! Node Data Structures
//!
//! This module defines the core `Node` struct and related types for
//! Quillspace's hierarchical content tree.
//!
//! # Architecture
//!
//! - **Universal Node**: one struct serves both the file-system layer
//!   (folders/files) and the manuscript hierarchy (manuscript/chapter/scene)
//! - **Owner + project scoping**: every node belongs to an account and a
//!   project; sibling comparisons are scoped to (`project_id`, `parent_id`)
//! - **Integer ranks**: `position` establishes a total order among siblings;
//!   pinned nodes always sort ahead of unpinned ones
//!
//! # Examples
//!
//! ```rust
//! use quillspace_core::models::{Node, NodeKind};
//!
//! // A root-level folder
//! let folder = Node::new(
//!     "owner-1".to_string(),
//!     "project-1".to_string(),
//!     None,
//!     NodeKind::Folder,
//!     "Drafts".to_string(),
//! );
//!
//! // A file inside that folder
//! let file = Node::new(
//!     "owner-1".to_string(),
//!     "project-1".to_string(),
//!     Some(folder.id.clone()),
//!     NodeKind::File,
//!     "Chapter 1.txt".to_string(),
//! );
//! assert!(folder.kind.is_container());
//! assert!(!file.kind.is_container());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Default version value for serde deserialization (version 1)
fn default_version() -> i64 {
    1
}

/// Validation errors for Node operations
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid node kind: {0}")]
    InvalidKind(String),

    #[error("Invalid node ID format: {0}")]
    InvalidId(String),

    #[error("Invalid parent reference: {0}")]
    InvalidParent(String),
}

/// Discriminates container nodes from leaf nodes.
///
/// Folders (manuscripts, chapters) may have children; files (scenes, notes)
/// are terminal and may hold a text payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Container kind - may have children, never holds content
    Folder,
    /// Leaf kind - terminal, may hold content
    File,
}

impl NodeKind {
    /// Whether this kind may have children
    pub fn is_container(&self) -> bool {
        matches!(self, NodeKind::Folder)
    }

    /// Storage representation ("folder" / "file")
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Folder => "folder",
            NodeKind::File => "file",
        }
    }

    /// Parse the storage representation back into a kind
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "folder" => Ok(NodeKind::Folder),
            "file" => Ok(NodeKind::File),
            other => Err(ValidationError::InvalidKind(other.to_string())),
        }
    }
}

/// Universal tree node for all hierarchical content in Quillspace.
///
/// # Fields
///
/// - `id`: Unique identifier (UUID), stable for the node's lifetime
/// - `owner_id`: Owning account; all operations are scoped to it
/// - `project_id`: Owning project; sibling/ordering comparisons are scoped
///   to (`project_id`, `parent_id`)
/// - `parent_id`: Optional parent reference; `None` denotes a root-level node
/// - `kind`: Folder (container) or File (leaf)
/// - `name`: Non-empty after trimming, unique among siblings
/// - `content`: Text payload, present only on leaf kinds
/// - `position`: Integer rank among siblings (need not be contiguous)
/// - `pinned`: Pinned nodes sort before unpinned ones, ties broken by rank
/// - `version`: Optimistic concurrency token, bumped by the store on replace
/// - `created_at` / `updated_at`: Timestamps; `updated_at` refreshed on
///   every mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier (UUID)
    pub id: String,

    /// Owning account
    pub owner_id: String,

    /// Owning project
    pub project_id: String,

    /// Parent node ID (None = root-level)
    pub parent_id: Option<String>,

    /// Folder or File
    pub kind: NodeKind,

    /// Display name, unique among siblings
    pub name: String,

    /// Text payload (leaf kinds only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Integer rank among siblings
    pub position: i64,

    /// Pinned nodes sort ahead of unpinned siblings
    pub pinned: bool,

    /// Optimistic concurrency control version (incremented on each update)
    #[serde(default = "default_version")]
    pub version: i64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Node {
    /// Create a new Node with auto-generated UUID.
    ///
    /// The initial `position` is 0; the service layer assigns the real rank
    /// before persisting.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use quillspace_core::models::{Node, NodeKind};
    /// let node = Node::new(
    ///     "owner-1".to_string(),
    ///     "project-1".to_string(),
    ///     None,
    ///     NodeKind::File,
    ///     "Notes.txt".to_string(),
    /// );
    /// assert_eq!(node.version, 1);
    /// assert!(node.content.is_none());
    /// ```
    pub fn new(
        owner_id: String,
        project_id: String,
        parent_id: Option<String>,
        kind: NodeKind,
        name: String,
    ) -> Self {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        Self {
            id,
            owner_id,
            project_id,
            parent_id,
            kind,
            name,
            content: None,
            position: 0,
            pinned: false,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new Node with an explicit id.
    ///
    /// Used by tests and by callers that pre-allocate identifiers.
    pub fn new_with_id(
        id: String,
        owner_id: String,
        project_id: String,
        parent_id: Option<String>,
        kind: NodeKind,
        name: String,
    ) -> Self {
        let now = Utc::now();

        Self {
            id,
            owner_id,
            project_id,
            parent_id,
            kind,
            name,
            content: None,
            position: 0,
            pinned: false,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate structural requirements that do not need store access
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::InvalidId(self.id.clone()));
        }
        if self.owner_id.trim().is_empty() {
            return Err(ValidationError::MissingField("owner_id".to_string()));
        }
        if self.project_id.trim().is_empty() {
            return Err(ValidationError::MissingField("project_id".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name".to_string()));
        }
        if let Some(parent_id) = &self.parent_id {
            if parent_id == &self.id {
                return Err(ValidationError::InvalidParent(
                    "node cannot be its own parent".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Deserializer helper for the double-Option pattern.
///
/// Maps three input formats to the double-Option pattern:
/// - Missing field → None (don't update)
/// - null → Some(None) (set to NULL)
/// - "value" → Some(Some("value")) (set to value)
fn deserialize_optional_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    // Missing field is handled by #[serde(default)] on the struct field
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

/// Partial node update structure for the store's `replace` operation.
///
/// All fields are optional to support sparse updates; only provided fields
/// change. Nullable fields use the double-Option pattern:
/// - `None`: don't change the field
/// - `Some(None)`: set the field to NULL
/// - `Some(Some(v))`: set the field to `v`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePatch {
    /// Update display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Update parent reference (double-Option, `Some(None)` = move to root)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub parent_id: Option<Option<String>>,

    /// Update sibling rank
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,

    /// Update pin state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,

    /// Update text payload (double-Option, `Some(None)` clears it)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub content: Option<Option<String>>,

    /// Optimistic concurrency check: if set, the store rejects the replace
    /// with a version conflict unless the stored version matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_version: Option<i64>,
}

impl NodePatch {
    /// Patch that only renames
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Patch that only repositions
    pub fn reposition(position: i64) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_defaults() {
        let node = Node::new(
            "owner-1".to_string(),
            "project-1".to_string(),
            None,
            NodeKind::Folder,
            "Drafts".to_string(),
        );

        assert!(!node.id.is_empty());
        assert_eq!(node.version, 1);
        assert_eq!(node.position, 0);
        assert!(!node.pinned);
        assert!(node.content.is_none());
        assert_eq!(node.created_at, node.updated_at);
        assert!(node.validate().is_ok());
    }

    #[test]
    fn test_kind_round_trip() {
        assert_eq!(NodeKind::parse("folder").unwrap(), NodeKind::Folder);
        assert_eq!(NodeKind::parse("file").unwrap(), NodeKind::File);
        assert!(NodeKind::parse("chapter").is_err());
        assert_eq!(NodeKind::Folder.as_str(), "folder");
        assert!(NodeKind::Folder.is_container());
        assert!(!NodeKind::File.is_container());
    }

    #[test]
    fn test_validate_rejects_self_parent() {
        let mut node = Node::new(
            "owner-1".to_string(),
            "project-1".to_string(),
            None,
            NodeKind::Folder,
            "Drafts".to_string(),
        );
        node.parent_id = Some(node.id.clone());
        assert!(node.validate().is_err());
    }

    #[test]
    fn test_serde_camel_case() {
        let node = Node::new(
            "owner-1".to_string(),
            "project-1".to_string(),
            None,
            NodeKind::File,
            "Notes.txt".to_string(),
        );

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["ownerId"], "owner-1");
        assert_eq!(json["projectId"], "project-1");
        assert_eq!(json["kind"], "file");
        assert!(json.get("content").is_none());

        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_patch_double_option() {
        // null clears the parent, missing field leaves it alone
        let patch: NodePatch = serde_json::from_str(r#"{"parentId": null}"#).unwrap();
        assert_eq!(patch.parent_id, Some(None));

        let patch: NodePatch = serde_json::from_str(r#"{"name": "Renamed"}"#).unwrap();
        assert!(patch.parent_id.is_none());
        assert_eq!(patch.name.as_deref(), Some("Renamed"));
    }
}
