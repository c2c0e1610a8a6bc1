//! Domain Events
//!
//! This module defines the domain events emitted by the service layer when
//! data changes. Events follow the observer pattern, allowing a presentation
//! layer to subscribe to changes without coupling to the persistence layer.
//!
//! # Architecture
//!
//! Events are emitted using tokio's broadcast channel, allowing multiple
//! subscribers to receive notifications asynchronously. Emission happens
//! only after the corresponding store write succeeds.

use crate::models::{Node, Project};

/// Domain events emitted by the service layer
///
/// These represent domain-level changes, not store operations.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// A new node was created
    NodeCreated(Node),

    /// An existing node was updated (rename, pin toggle, content write)
    NodeUpdated(Node),

    /// A node was reparented or reordered
    NodeMoved {
        id: String,
        new_parent_id: Option<String>,
    },

    /// A node (and, for folders, its whole subtree) was deleted
    NodeDeleted { ids: Vec<String> },

    /// A new project was created
    ProjectCreated(Project),

    /// A project and all of its nodes were deleted
    ProjectDeleted { id: String },
}

impl DomainEvent {
    /// Get a string representation of the event type
    ///
    /// Useful for debugging, logging, and consumers that route on event
    /// kind without matching the payload.
    pub fn event_type(&self) -> &str {
        match self {
            DomainEvent::NodeCreated(_) => "node:created",
            DomainEvent::NodeUpdated(_) => "node:updated",
            DomainEvent::NodeMoved { .. } => "node:moved",
            DomainEvent::NodeDeleted { .. } => "node:deleted",
            DomainEvent::ProjectCreated(_) => "project:created",
            DomainEvent::ProjectDeleted { .. } => "project:deleted",
        }
    }
}
