//! Persistence Layer
//!
//! This module defines the persistence port (the `NodeStore` and
//! `ProjectStore` traits) and its two backends:
//!
//! - `TursoStore` - libsql/Turso embedded relational backend
//! - `MemoryStore` - plain in-memory map backend
//!
//! Business logic never talks to a backend directly; the service layer holds
//! `Arc<dyn NodeStore>` / `Arc<dyn ProjectStore>` handles, so backends are
//! interchangeable without touching the orchestrator.

mod error;
pub mod events;
mod memory_store;
mod node_store;
mod project_store;
mod turso_store;

pub use error::StoreError;
pub use events::DomainEvent;
pub use memory_store::MemoryStore;
pub use node_store::NodeStore;
pub use project_store::ProjectStore;
pub use turso_store::TursoStore;
