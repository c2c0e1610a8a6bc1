//! NodeService - CRUD Orchestrator
//!
//! The only component a presentation layer invokes directly. Composes the
//! name-conflict resolver, hierarchy validator, and ordering engine into
//! create / rename / move / pin / content / delete / search operations over
//! the persistence port.
//!
//! # Operation shape
//!
//! Every operation is fail-fast: the first validation or store failure is
//! returned as a typed [`NodeServiceError`] value and no further steps run.
//! Side effects are confined to the store; nothing retries automatically -
//! callers decide whether to retry a reported failure.
//!
//! # Concurrency
//!
//! Operations read sibling state, compute, and write without locks.
//! Correctness under concurrent callers is not guaranteed by design; the
//! store's advisory sibling-name constraint and the optimistic `version`
//! token are the only backstops, both surfacing as `Conflict`.
//!
//! # Examples
//!
//! ```rust
//! use quillspace_core::db::MemoryStore;
//! use quillspace_core::models::NodeKind;
//! use quillspace_core::services::{CreateNodeParams, NodeService};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = NodeService::new(Arc::new(MemoryStore::new()));
//!
//!     let folder = service
//!         .create(CreateNodeParams {
//!             owner_id: "owner-1".to_string(),
//!             project_id: "project-1".to_string(),
//!             parent_id: None,
//!             kind: NodeKind::Folder,
//!             name: "Drafts".to_string(),
//!             content: None,
//!         })
//!         .await?;
//!     println!("Created folder: {}", folder.id);
//!     Ok(())
//! }
//! ```

use crate::db::{DomainEvent, NodeStore};
use crate::models::{Node, NodeKind, NodePatch};
use crate::services::error::NodeServiceError;
use crate::services::hierarchy;
use crate::services::naming::resolve_collision;
use crate::services::ordering::{append_rank, splice_ranks};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Broadcast channel capacity for domain events
const DOMAIN_EVENT_CHANNEL_CAPACITY: usize = 128;

/// Tunable limits for the service layer
#[derive(Debug, Clone)]
pub struct NodeServiceConfig {
    /// Maximum name length (characters, after trimming)
    pub max_name_len: usize,

    /// Maximum number of search results returned
    pub search_limit: usize,
}

impl Default for NodeServiceConfig {
    fn default() -> Self {
        Self {
            max_name_len: 255,
            search_limit: 100,
        }
    }
}

/// Parameters for node creation (avoids too-many-arguments lint)
#[derive(Debug, Clone)]
pub struct CreateNodeParams {
    /// Owning account
    pub owner_id: String,

    /// Owning project
    pub project_id: String,

    /// Parent folder, or None for a root-level node
    pub parent_id: Option<String>,

    /// Folder or File
    pub kind: NodeKind,

    /// Desired name; trimmed, validated, and deduplicated before persisting
    pub name: String,

    /// Initial text payload (leaf kinds only)
    pub content: Option<String>,
}

/// CRUD orchestrator over the node persistence port
#[derive(Clone)]
pub struct NodeService {
    /// Persistence port for all node operations
    store: Arc<dyn NodeStore>,

    /// Service limits
    config: NodeServiceConfig,

    /// Broadcast channel for domain events
    event_tx: broadcast::Sender<DomainEvent>,
}

impl NodeService {
    /// Create a new NodeService with default limits
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self::with_config(store, NodeServiceConfig::default())
    }

    /// Create a new NodeService with explicit limits
    pub fn with_config(store: Arc<dyn NodeStore>, config: NodeServiceConfig) -> Self {
        let (event_tx, _) = broadcast::channel(DOMAIN_EVENT_CHANNEL_CAPACITY);

        Self {
            store,
            config,
            event_tx,
        }
    }

    /// Get access to the underlying store
    pub fn store(&self) -> &Arc<dyn NodeStore> {
        &self.store
    }

    /// Subscribe to domain events.
    ///
    /// Returns a broadcast receiver that receives an event after every
    /// successful mutation (created, updated, moved, deleted).
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<DomainEvent> {
        self.event_tx.subscribe()
    }

    /// Emit a domain event to all subscribers.
    ///
    /// Ignores errors if no subscribers (expected in some tests).
    fn emit_event(&self, event: DomainEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Trim and validate a display name
    fn validate_name(&self, raw: &str) -> Result<String, NodeServiceError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NodeServiceError::invalid_name("name is empty after trimming"));
        }
        if trimmed.chars().count() > self.config.max_name_len {
            return Err(NodeServiceError::invalid_name(format!(
                "name exceeds maximum length of {} characters",
                self.config.max_name_len
            )));
        }
        Ok(trimmed.to_string())
    }

    /// Load a node or fail with `NotFound`.
    ///
    /// Ownership failures are reported identically to missing ids.
    async fn load(&self, id: &str, owner_id: &str) -> Result<Node, NodeServiceError> {
        self.store
            .get(id, owner_id)
            .await?
            .ok_or_else(|| NodeServiceError::not_found(id))
    }

    /// Sibling names in a group, excluding the node being renamed/moved
    fn taken_names(siblings: &[Node], exclude_id: Option<&str>) -> HashSet<String> {
        siblings
            .iter()
            .filter(|s| Some(s.id.as_str()) != exclude_id)
            .map(|s| s.name.clone())
            .collect()
    }

    /// Create a node.
    ///
    /// Validates the trimmed name, validates the parent (existence,
    /// ownership, project, container kind), resolves name collisions with
    /// `(n)` suffixing, appends the node to the sibling order, and persists.
    ///
    /// # Errors
    ///
    /// - `InvalidName` if the name is empty after trimming or too long
    /// - `InvalidUpdate` if content is supplied for a folder
    /// - `ParentNotFound` if the parent fails validation
    /// - `Conflict` / `Storage` from the store
    pub async fn create(&self, params: CreateNodeParams) -> Result<Node, NodeServiceError> {
        let name = self.validate_name(&params.name)?;

        if params.kind.is_container() && params.content.is_some() {
            return Err(NodeServiceError::invalid_update(
                "folders do not hold content",
            ));
        }

        if let Some(parent_id) = params.parent_id.as_deref() {
            hierarchy::validate_parent(
                self.store.as_ref(),
                parent_id,
                &params.owner_id,
                &params.project_id,
            )
            .await?;
        }

        let siblings = self
            .store
            .list_children(
                params.parent_id.as_deref(),
                &params.owner_id,
                &params.project_id,
            )
            .await?;

        let resolved = resolve_collision(&name, &Self::taken_names(&siblings, None));

        let mut node = Node::new(
            params.owner_id,
            params.project_id,
            params.parent_id,
            params.kind,
            resolved,
        );
        node.position = append_rank(&siblings);
        node.content = params.content;

        let created = self.store.insert(node).await?;
        tracing::info!(
            "Created {} '{}' ({})",
            created.kind.as_str(),
            created.name,
            created.id
        );
        self.emit_event(DomainEvent::NodeCreated(created.clone()));

        Ok(created)
    }

    /// Rename a node.
    ///
    /// The new name is resolved against the current siblings excluding the
    /// node itself, so renaming to the current name is an idempotent success
    /// that leaves rank and parent untouched.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the node is absent or not owned by the caller
    /// - `InvalidName` if the name is empty after trimming or too long
    pub async fn rename(
        &self,
        id: &str,
        owner_id: &str,
        new_name: &str,
    ) -> Result<Node, NodeServiceError> {
        let node = self.load(id, owner_id).await?;
        let name = self.validate_name(new_name)?;

        let siblings = self
            .store
            .list_children(node.parent_id.as_deref(), owner_id, &node.project_id)
            .await?;
        let resolved = resolve_collision(&name, &Self::taken_names(&siblings, Some(id)));

        let updated = self
            .store
            .replace(id, owner_id, NodePatch::rename(resolved))
            .await?;
        tracing::info!("Renamed node {} to '{}'", id, updated.name);
        self.emit_event(DomainEvent::NodeUpdated(updated.clone()));

        Ok(updated)
    }

    /// Move a node to a new parent and/or position.
    ///
    /// `new_parent_id = None` moves the node to the root level. With an
    /// explicit `index`, the node is spliced into the target sibling order
    /// at that index (clamped to the group size) and changed ranks are
    /// re-persisted; without one, the node is appended. The node's name is
    /// re-resolved against the new sibling set.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the node is absent or not owned by the caller
    /// - `ParentNotFound` if the target parent fails validation
    /// - `SelfMove` / `DescendantMove` if the move would create a cycle
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use quillspace_core::services::NodeService;
    /// # async fn example(service: &NodeService) -> Result<(), Box<dyn std::error::Error>> {
    /// // Move to the top of another folder
    /// service.move_node("node-123", "owner-1", Some("folder-456"), Some(0)).await?;
    ///
    /// // Move to the end of the root level
    /// service.move_node("node-123", "owner-1", None, None).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn move_node(
        &self,
        id: &str,
        owner_id: &str,
        new_parent_id: Option<&str>,
        index: Option<usize>,
    ) -> Result<Node, NodeServiceError> {
        let node = self.load(id, owner_id).await?;

        if let Some(parent_id) = new_parent_id {
            hierarchy::validate_parent(
                self.store.as_ref(),
                parent_id,
                owner_id,
                &node.project_id,
            )
            .await?;
            hierarchy::ensure_no_cycle(self.store.as_ref(), id, parent_id, owner_id).await?;
        }

        let siblings = self
            .store
            .list_children(new_parent_id, owner_id, &node.project_id)
            .await?;
        let resolved = resolve_collision(&node.name, &Self::taken_names(&siblings, Some(id)));

        let position = match index {
            Some(index) => {
                let rewrites = splice_ranks(&siblings, id, index);
                let own_rank = rewrites
                    .iter()
                    .find(|(rid, _)| rid == id)
                    .map(|(_, rank)| *rank)
                    .unwrap_or(node.position);

                // Reindex displaced siblings first; the node itself is
                // patched below together with its new parent.
                for (sibling_id, rank) in &rewrites {
                    if sibling_id != id {
                        self.store
                            .replace(sibling_id, owner_id, NodePatch::reposition(*rank))
                            .await?;
                    }
                }
                own_rank
            }
            None => append_rank(siblings.iter().filter(|s| s.id != id)),
        };

        let patch = NodePatch {
            name: (resolved != node.name).then_some(resolved),
            parent_id: Some(new_parent_id.map(String::from)),
            position: Some(position),
            ..Default::default()
        };
        let updated = self.store.replace(id, owner_id, patch).await?;

        tracing::info!(
            "Moved node {} under {:?} at rank {}",
            id,
            new_parent_id,
            position
        );
        self.emit_event(DomainEvent::NodeMoved {
            id: id.to_string(),
            new_parent_id: new_parent_id.map(String::from),
        });

        Ok(updated)
    }

    /// Reposition a node within its current parent.
    ///
    /// Covers manuscript/chapter reordering as well as file-tree
    /// drag-and-drop; implemented as a move onto the current parent.
    pub async fn reorder(
        &self,
        id: &str,
        owner_id: &str,
        index: usize,
    ) -> Result<Node, NodeServiceError> {
        let node = self.load(id, owner_id).await?;
        let parent_id = node.parent_id.clone();
        self.move_node(id, owner_id, parent_id.as_deref(), Some(index))
            .await
    }

    /// Flip a node's pin state.
    ///
    /// Pinning affects sort only, not hierarchy; the node keeps its integer
    /// rank and re-enters its partition at that rank.
    pub async fn toggle_pin(&self, id: &str, owner_id: &str) -> Result<Node, NodeServiceError> {
        let node = self.load(id, owner_id).await?;

        let patch = NodePatch {
            pinned: Some(!node.pinned),
            ..Default::default()
        };
        let updated = self.store.replace(id, owner_id, patch).await?;
        self.emit_event(DomainEvent::NodeUpdated(updated.clone()));

        Ok(updated)
    }

    /// Replace a leaf node's text payload.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the node is absent or not owned by the caller
    /// - `InvalidUpdate` if the node is a folder
    pub async fn set_content(
        &self,
        id: &str,
        owner_id: &str,
        content: impl Into<String>,
    ) -> Result<Node, NodeServiceError> {
        let node = self.load(id, owner_id).await?;
        if node.kind.is_container() {
            return Err(NodeServiceError::invalid_update(
                "folders do not hold content",
            ));
        }

        let patch = NodePatch {
            content: Some(Some(content.into())),
            ..Default::default()
        };
        let updated = self.store.replace(id, owner_id, patch).await?;
        self.emit_event(DomainEvent::NodeUpdated(updated.clone()));

        Ok(updated)
    }

    /// Delete a node; for folders, the whole subtree goes with it.
    ///
    /// Descendant ids are collected first with an iterative walk, then
    /// removed children-before-parent so a partial failure never leaves a
    /// dangling parentless subtree visible.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the node is absent or not owned by the caller
    pub async fn delete(&self, id: &str, owner_id: &str) -> Result<(), NodeServiceError> {
        let node = self.load(id, owner_id).await?;

        let mut descendants: Vec<String> = Vec::new();
        if node.kind.is_container() {
            let mut stack = vec![node.id.clone()];
            while let Some(current) = stack.pop() {
                let children = self
                    .store
                    .list_children(Some(&current), owner_id, &node.project_id)
                    .await?;
                for child in children {
                    descendants.push(child.id.clone());
                    if child.kind.is_container() {
                        stack.push(child.id);
                    }
                }
            }
        }

        // Collection order is parent-before-child along every path;
        // reversing it removes leaves first.
        descendants.reverse();
        self.store.remove_many(&descendants, owner_id).await?;
        self.store.remove(id, owner_id).await?;

        let mut ids = descendants;
        ids.push(node.id);
        tracing::info!("Deleted node {} ({} nodes total)", id, ids.len());
        self.emit_event(DomainEvent::NodeDeleted { ids });

        Ok(())
    }

    /// Get a node by id.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the node is absent or not owned by the caller
    pub async fn get(&self, id: &str, owner_id: &str) -> Result<Node, NodeServiceError> {
        self.load(id, owner_id).await
    }

    /// List the children of a parent (or the root level), in display order:
    /// pinned first, then by rank.
    pub async fn list_children(
        &self,
        owner_id: &str,
        project_id: &str,
        parent_id: Option<&str>,
    ) -> Result<Vec<Node>, NodeServiceError> {
        let children = self
            .store
            .list_children(parent_id, owner_id, project_id)
            .await?;
        tracing::debug!(
            "Listed {} children under {:?} in project {}",
            children.len(),
            parent_id,
            project_id
        );
        Ok(children)
    }

    /// Substring search over names (case-insensitive) and leaf content
    /// (case-sensitive) within a project.
    ///
    /// # Errors
    ///
    /// - `InvalidQuery` if the query is empty after trimming
    pub async fn search(
        &self,
        owner_id: &str,
        project_id: &str,
        query: &str,
    ) -> Result<Vec<Node>, NodeServiceError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(NodeServiceError::invalid_query(
                "query is empty after trimming",
            ));
        }

        let mut hits = self.store.search(trimmed, owner_id, project_id).await?;
        hits.truncate(self.config.search_limit);
        tracing::debug!("Search '{}' matched {} nodes", trimmed, hits.len());
        Ok(hits)
    }
}
