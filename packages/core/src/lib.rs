//! Quillspace Core Business Logic Layer
//!
//! This crate provides the hierarchical content-tree core for the Quillspace
//! writing-project manager: projects containing trees of folders and files
//! (equivalently manuscript/chapter/scene hierarchies) with sibling ordering,
//! pinning, name-conflict resolution, cycle-safe moves, cascading delete,
//! and search.
//!
//! # Architecture
//!
//! - **Domain model first**: `Node`/`Project` are explicit domain entities;
//!   storage row shapes never leak past the persistence port
//! - **Persistence port**: the `NodeStore`/`ProjectStore` traits abstract the
//!   backend; libsql/Turso and an in-memory map are both provided
//! - **Typed results**: every operation returns a success payload or a typed
//!   error value, never a panic for ordinary domain failures
//!
//! # Modules
//!
//! - [`models`] - Data structures (Node, Project, patches)
//! - [`services`] - Business services (NodeService, ProjectService)
//! - [`db`] - Persistence port and backends (TursoStore, MemoryStore)

pub mod db;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use db::*;
pub use models::*;
pub use services::*;
