//! NodeStore Trait - Persistence Port for Nodes
//!
//! This module defines the `NodeStore` trait that abstracts node persistence.
//! The trait enables multiple backend implementations (Turso/libsql, plain
//! in-memory map) without changing business logic in `NodeService`.
//!
//! # Architecture
//!
//! - **Abstraction point**: between NodeService (business logic) and the
//!   backend implementation
//! - **Multiple backends**: `TursoStore` (relational) and `MemoryStore`
//!   (in-memory map), both exercised by tests
//! - **Owner scoping**: every read and write is scoped to `owner_id`;
//!   rows owned by someone else are reported as not found, never as a
//!   distinct authorization failure, to avoid leaking existence
//!
//! # Design Decisions
//!
//! 1. **Async-first**: all methods are async to support both embedded and
//!    network backends
//! 2. **Typed errors**: operations return `StoreError` so the orchestrator
//!    can distinguish `NotFound` / `Conflict` / `VersionConflict` from
//!    opaque storage failures
//! 3. **Ownership semantics**: `insert` takes the node by value to avoid
//!    unnecessary cloning
//!
//! # Examples
//!
//! ```rust,no_run
//! use quillspace_core::db::{MemoryStore, NodeStore};
//! use quillspace_core::models::{Node, NodeKind};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store: Arc<dyn NodeStore> = Arc::new(MemoryStore::new());
//!
//!     let node = Node::new(
//!         "owner-1".to_string(),
//!         "project-1".to_string(),
//!         None,
//!         NodeKind::Folder,
//!         "Drafts".to_string(),
//!     );
//!     let created = store.insert(node).await?;
//!     println!("Created node: {}", created.id);
//!     Ok(())
//! }
//! ```

use crate::db::StoreError;
use crate::models::{Node, NodePatch};
use async_trait::async_trait;

/// Abstraction layer for node persistence operations.
///
/// Implementations must be `Send + Sync` to allow usage in async contexts
/// where futures may be moved between threads.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Get a node by id, scoped to the owning account.
    ///
    /// Returns `Ok(None)` if the node does not exist or belongs to a
    /// different owner (not an error).
    async fn get(&self, id: &str, owner_id: &str) -> Result<Option<Node>, StoreError>;

    /// List the children of a parent (or the root-level nodes when
    /// `parent_id` is `None`), scoped to owner and project.
    ///
    /// Ordered by (`pinned` desc, `position` asc, `created_at` asc) - the
    /// display order contract shared by all backends.
    async fn list_children(
        &self,
        parent_id: Option<&str>,
        owner_id: &str,
        project_id: &str,
    ) -> Result<Vec<Node>, StoreError>;

    /// Insert a new node.
    ///
    /// # Errors
    ///
    /// - `Conflict` on id collision (should not happen with generated ids)
    /// - `Conflict` if the advisory sibling-name uniqueness constraint is
    ///   violated (the backstop for concurrent name resolution races)
    async fn insert(&self, node: Node) -> Result<Node, StoreError>;

    /// Apply a sparse patch to an existing node and return the updated row.
    ///
    /// The store refreshes `updated_at` and increments `version` on every
    /// successful replace. If `patch.expected_version` is set and does not
    /// match the stored version, fails with `VersionConflict`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the node is absent or not owned by the caller
    /// - `VersionConflict` on an optimistic concurrency mismatch
    /// - `Conflict` if the patch violates sibling-name uniqueness
    async fn replace(
        &self,
        id: &str,
        owner_id: &str,
        patch: NodePatch,
    ) -> Result<Node, StoreError>;

    /// Remove a single node.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the node is absent or not owned by the caller
    async fn remove(&self, id: &str, owner_id: &str) -> Result<(), StoreError>;

    /// Best-effort batch removal, used by cascading delete.
    ///
    /// Ids that do not resolve are skipped silently.
    async fn remove_many(&self, ids: &[String], owner_id: &str) -> Result<(), StoreError>;

    /// Remove every node belonging to a project, used by project deletion.
    async fn remove_by_project(&self, project_id: &str, owner_id: &str)
        -> Result<(), StoreError>;

    /// Substring search over node names and leaf content, scoped to owner
    /// and project.
    ///
    /// Name matching is case-insensitive; content matching is case-sensitive
    /// and only applies to leaf kinds. Results are ordered by name.
    async fn search(
        &self,
        text: &str,
        owner_id: &str,
        project_id: &str,
    ) -> Result<Vec<Node>, StoreError>;
}
