//! Data Models
//!
//! This module contains the core data structures used throughout Quillspace:
//!
//! - `Node` - Universal tree node for both the file-system layer and the
//!   manuscript/chapter/scene hierarchy
//! - `Project` - Owning scope for a node tree
//!
//! Domain types are deliberately decoupled from storage row shapes; the
//! persistence port maps between the two.

mod node;
mod project;

pub use node::{Node, NodeKind, NodePatch, ValidationError};
pub use project::{Project, ProjectPatch};
