//! Service layer for content-tree operations
//!
//! The orchestrators ([`NodeService`], [`ProjectService`]) are the public
//! surface; [`naming`], [`ordering`], and [`hierarchy`] hold the pure and
//! near-pure rules they compose.

pub mod error;
pub mod hierarchy;
pub mod naming;
pub mod node_service;
pub mod ordering;
pub mod project_service;

#[cfg(test)]
mod node_service_scope_test;

pub use error::NodeServiceError;
pub use hierarchy::{ensure_no_cycle, validate_parent};
pub use naming::resolve_collision;
pub use node_service::{CreateNodeParams, NodeService, NodeServiceConfig};
pub use ordering::{append_rank, splice_ranks};
pub use project_service::ProjectService;
