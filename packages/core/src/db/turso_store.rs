//! TursoStore - libsql/Turso Persistence Backend
//!
//! Relational implementation of [`NodeStore`] and [`ProjectStore`] on top of
//! libsql (Turso embedded SQLite).
//!
//! # Architecture
//!
//! - **Path-agnostic**: accepts any valid PathBuf, creates parent
//!   directories on demand
//! - **WAL mode**: Write-Ahead Logging for better concurrency
//! - **Foreign keys**: enabled for referential integrity
//! - **Advisory uniqueness**: a unique expression index on
//!   (owner, project, parent, name) is the backstop for concurrent
//!   name-resolution races; violations surface as `StoreError::Conflict`
//!
//! # Connection pattern
//!
//! Always connect through [`TursoStore::connect`] in async contexts: it sets
//! a 5-second busy timeout so concurrent operations wait and retry instead
//! of failing immediately with `SQLITE_BUSY`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use quillspace_core::db::{NodeStore, TursoStore};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(TursoStore::new(PathBuf::from("./data/quillspace.db")).await?);
//!     let node = store.get("node-123", "owner-1").await?;
//!     Ok(())
//! }
//! ```

use crate::db::{NodeStore, ProjectStore, StoreError};
use crate::models::{Node, NodeKind, NodePatch, Project, ProjectPatch};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use libsql::{Builder, Database, Row};
use std::path::PathBuf;
use std::sync::Arc;

/// Shared SELECT column list; `row_to_node` depends on this order.
const NODE_COLUMNS: &str = "id, owner_id, project_id, parent_id, kind, name, content, \
     position, pinned, version, created_at, updated_at";

/// libsql/Turso backend for nodes and projects
#[derive(Debug, Clone)]
pub struct TursoStore {
    /// libsql database handle (wrapped in Arc for sharing)
    db: Arc<Database>,

    /// Path to the database file
    db_path: PathBuf,
}

impl TursoStore {
    /// Open (or create) a database file and initialize the schema.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if:
    /// - the parent directory cannot be created
    /// - the database connection fails
    /// - schema initialization fails
    pub async fn new(db_path: PathBuf) -> Result<Self, StoreError> {
        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(StoreError::DirectoryCreationFailed)?;
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| StoreError::connection_failed(db_path.clone(), e))?;

        let store = Self {
            db: Arc::new(db),
            db_path,
        };

        store.initialize_schema().await?;

        Ok(store)
    }

    /// Open an in-memory database, mainly for tests
    pub async fn new_in_memory() -> Result<Self, StoreError> {
        Self::new(PathBuf::from(":memory:")).await
    }

    /// Path this store was opened with
    pub fn db_path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Create a connection with the busy timeout applied.
    ///
    /// The synchronous `connect()` call only creates the handle; actual
    /// SQLite operations happen later, and the busy timeout makes them wait
    /// instead of failing under concurrent access.
    async fn connect(&self) -> Result<libsql::Connection, StoreError> {
        let conn = self.db.connect().map_err(StoreError::LibsqlError)?;
        self.execute_pragma(&conn, "PRAGMA busy_timeout = 5000")
            .await?;
        Ok(conn)
    }

    /// Execute a PRAGMA statement.
    ///
    /// PRAGMA statements return rows, so we must use query() instead of
    /// execute().
    async fn execute_pragma(
        &self,
        conn: &libsql::Connection,
        pragma: &str,
    ) -> Result<(), StoreError> {
        let mut stmt = conn.prepare(pragma).await.map_err(|e| {
            StoreError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        let _ = stmt.query(()).await.map_err(|e| {
            StoreError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    /// Initialize schema and SQLite configuration.
    ///
    /// Uses CREATE TABLE IF NOT EXISTS throughout, so initialization is
    /// idempotent and safe to call on every open.
    async fn initialize_schema(&self) -> Result<(), StoreError> {
        let conn = self.connect().await?;

        self.execute_pragma(&conn, "PRAGMA journal_mode = WAL")
            .await?;
        self.execute_pragma(&conn, "PRAGMA foreign_keys = ON")
            .await?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS nodes (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                project_id TEXT NOT NULL,
                parent_id TEXT,
                kind TEXT NOT NULL,
                name TEXT NOT NULL,
                content TEXT,
                position INTEGER NOT NULL DEFAULT 0,
                pinned BOOLEAN NOT NULL DEFAULT FALSE,
                version INTEGER NOT NULL DEFAULT 1,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                -- Parent deletion cascades to children (tree structure)
                FOREIGN KEY (parent_id) REFERENCES nodes(id) ON DELETE CASCADE
            )",
            (),
        )
        .await
        .map_err(|e| StoreError::sql_execution(format!("Failed to create nodes table: {}", e)))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS projects (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                name TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            (),
        )
        .await
        .map_err(|e| {
            StoreError::sql_execution(format!("Failed to create projects table: {}", e))
        })?;

        self.create_indexes(&conn).await?;

        Ok(())
    }

    /// Create indexes for the nodes and projects tables
    async fn create_indexes(&self, conn: &libsql::Connection) -> Result<(), StoreError> {
        // Sibling listings (most common query)
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_nodes_parent
             ON nodes(owner_id, project_id, parent_id)",
            (),
        )
        .await
        .map_err(|e| {
            StoreError::sql_execution(format!("Failed to create index 'idx_nodes_parent': {}", e))
        })?;

        // Name search
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_nodes_name ON nodes(name)",
            (),
        )
        .await
        .map_err(|e| {
            StoreError::sql_execution(format!("Failed to create index 'idx_nodes_name': {}", e))
        })?;

        // Advisory sibling-name uniqueness. COALESCE folds the NULL parent of
        // root-level nodes into a comparable key, otherwise SQLite treats
        // every NULL as distinct and the constraint never fires at the root.
        conn.execute(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_nodes_sibling_name
             ON nodes(owner_id, project_id, COALESCE(parent_id, ''), name)",
            (),
        )
        .await
        .map_err(|e| {
            StoreError::sql_execution(format!(
                "Failed to create index 'idx_nodes_sibling_name': {}",
                e
            ))
        })?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_projects_owner ON projects(owner_id)",
            (),
        )
        .await
        .map_err(|e| {
            StoreError::sql_execution(format!(
                "Failed to create index 'idx_projects_owner': {}",
                e
            ))
        })?;

        Ok(())
    }

    /// Parse timestamp from database - handles both SQLite and RFC3339
    /// formats.
    ///
    /// SQLite CURRENT_TIMESTAMP returns: "YYYY-MM-DD HH:MM:SS"
    /// Rows written by this store use RFC3339: "YYYY-MM-DDTHH:MM:SS.fffZ"
    fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }

        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Ok(naive.and_utc());
        }

        Err(anyhow::anyhow!(
            "Unable to parse timestamp '{}' as RFC3339 or SQLite format",
            s
        ))
    }

    /// Convert a libsql Row to a Node.
    ///
    /// Expects the `NODE_COLUMNS` column order.
    fn row_to_node(row: &Row) -> Result<Node> {
        let id: String = row.get(0).context("Failed to get id")?;
        let owner_id: String = row.get(1).context("Failed to get owner_id")?;
        let project_id: String = row.get(2).context("Failed to get project_id")?;
        let parent_id: Option<String> = row.get(3).context("Failed to get parent_id")?;
        let kind_str: String = row.get(4).context("Failed to get kind")?;
        let name: String = row.get(5).context("Failed to get name")?;
        let content: Option<String> = row.get(6).context("Failed to get content")?;
        let position: i64 = row.get(7).context("Failed to get position")?;
        let pinned: i64 = row.get(8).context("Failed to get pinned")?;
        let version: i64 = row.get(9).context("Failed to get version")?;
        let created_at_str: String = row.get(10).context("Failed to get created_at")?;
        let updated_at_str: String = row.get(11).context("Failed to get updated_at")?;

        let kind = NodeKind::parse(&kind_str).context("Failed to parse kind")?;
        let created_at =
            Self::parse_timestamp(&created_at_str).context("Failed to parse created_at")?;
        let updated_at =
            Self::parse_timestamp(&updated_at_str).context("Failed to parse updated_at")?;

        Ok(Node {
            id,
            owner_id,
            project_id,
            parent_id,
            kind,
            name,
            content,
            position,
            pinned: pinned != 0,
            version,
            created_at,
            updated_at,
        })
    }

    /// Convert a libsql Row to a Project (columns: id, owner_id, name,
    /// created_at, updated_at)
    fn row_to_project(row: &Row) -> Result<Project> {
        let id: String = row.get(0).context("Failed to get id")?;
        let owner_id: String = row.get(1).context("Failed to get owner_id")?;
        let name: String = row.get(2).context("Failed to get name")?;
        let created_at_str: String = row.get(3).context("Failed to get created_at")?;
        let updated_at_str: String = row.get(4).context("Failed to get updated_at")?;

        Ok(Project {
            id,
            owner_id,
            name,
            created_at: Self::parse_timestamp(&created_at_str)
                .context("Failed to parse created_at")?,
            updated_at: Self::parse_timestamp(&updated_at_str)
                .context("Failed to parse updated_at")?,
        })
    }

    /// Map a libsql error to Conflict when it is a uniqueness violation
    fn map_write_error(e: libsql::Error, context: &str) -> StoreError {
        let msg = e.to_string();
        if msg.contains("UNIQUE constraint failed") {
            StoreError::conflict(format!("{}: {}", context, msg))
        } else {
            StoreError::sql_execution(format!("{}: {}", context, msg))
        }
    }

    /// Escape LIKE wildcards in a search needle (ESCAPE '\' in the query)
    fn escape_like(needle: &str) -> String {
        needle
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_")
    }

    async fn fetch_node(
        &self,
        conn: &libsql::Connection,
        id: &str,
        owner_id: &str,
    ) -> Result<Option<Node>, StoreError> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM nodes WHERE id = ? AND owner_id = ?",
                NODE_COLUMNS
            ))
            .await
            .map_err(|e| {
                StoreError::sql_execution(format!("Failed to prepare get query: {}", e))
            })?;

        let mut rows = stmt
            .query([id, owner_id])
            .await
            .map_err(|e| StoreError::sql_execution(format!("Failed to execute get query: {}", e)))?;

        match rows
            .next()
            .await
            .map_err(|e| StoreError::sql_execution(e.to_string()))?
        {
            Some(row) => Ok(Some(Self::row_to_node(&row).map_err(|e| {
                StoreError::sql_execution(format!("Failed to convert row: {:#}", e))
            })?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl NodeStore for TursoStore {
    async fn get(&self, id: &str, owner_id: &str) -> Result<Option<Node>, StoreError> {
        let conn = self.connect().await?;
        self.fetch_node(&conn, id, owner_id).await
    }

    async fn list_children(
        &self,
        parent_id: Option<&str>,
        owner_id: &str,
        project_id: &str,
    ) -> Result<Vec<Node>, StoreError> {
        let conn = self.connect().await?;

        let (sql, params) = match parent_id {
            Some(parent) => (
                format!(
                    "SELECT {} FROM nodes
                     WHERE owner_id = ? AND project_id = ? AND parent_id = ?
                     ORDER BY pinned DESC, position ASC, created_at ASC",
                    NODE_COLUMNS
                ),
                Vec::from(libsql::params![owner_id, project_id, parent]),
            ),
            None => (
                format!(
                    "SELECT {} FROM nodes
                     WHERE owner_id = ? AND project_id = ? AND parent_id IS NULL
                     ORDER BY pinned DESC, position ASC, created_at ASC",
                    NODE_COLUMNS
                ),
                Vec::from(libsql::params![owner_id, project_id]),
            ),
        };

        let mut stmt = conn.prepare(&sql).await.map_err(|e| {
            StoreError::sql_execution(format!("Failed to prepare list_children query: {}", e))
        })?;

        let mut rows = stmt.query(params).await.map_err(|e| {
            StoreError::sql_execution(format!("Failed to execute list_children query: {}", e))
        })?;

        let mut nodes = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::sql_execution(e.to_string()))?
        {
            nodes.push(Self::row_to_node(&row).map_err(|e| {
                StoreError::sql_execution(format!("Failed to convert row: {:#}", e))
            })?);
        }

        Ok(nodes)
    }

    async fn insert(&self, node: Node) -> Result<Node, StoreError> {
        let conn = self.connect().await?;

        conn.execute(
            "INSERT INTO nodes (id, owner_id, project_id, parent_id, kind, name, content,
                                position, pinned, version, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            libsql::params![
                node.id.as_str(),
                node.owner_id.as_str(),
                node.project_id.as_str(),
                node.parent_id.as_deref(),
                node.kind.as_str(),
                node.name.as_str(),
                node.content.as_deref(),
                node.position,
                node.pinned as i64,
                node.version,
                node.created_at.to_rfc3339(),
                node.updated_at.to_rfc3339(),
            ],
        )
        .await
        .map_err(|e| Self::map_write_error(e, "Failed to insert node"))?;

        self.fetch_node(&conn, &node.id, &node.owner_id)
            .await?
            .ok_or_else(|| StoreError::sql_execution("Node not found after insert"))
    }

    async fn replace(
        &self,
        id: &str,
        owner_id: &str,
        patch: NodePatch,
    ) -> Result<Node, StoreError> {
        let conn = self.connect().await?;

        let current = self
            .fetch_node(&conn, id, owner_id)
            .await?
            .ok_or_else(|| StoreError::not_found(id))?;

        if let Some(expected) = patch.expected_version {
            if current.version != expected {
                return Err(StoreError::version_conflict(id, expected, current.version));
            }
        }

        let name = patch.name.unwrap_or(current.name);
        let parent_id = match patch.parent_id {
            None => current.parent_id,
            Some(new_parent) => new_parent,
        };
        let position = patch.position.unwrap_or(current.position);
        let pinned = patch.pinned.unwrap_or(current.pinned);
        let content = match patch.content {
            None => current.content,
            Some(new_content) => new_content,
        };
        let updated_at = Utc::now();

        // The version guard makes this a compare-and-swap: a concurrent
        // writer that got in first changes the version and this update
        // matches zero rows.
        let affected = conn
            .execute(
                "UPDATE nodes
                 SET name = ?, parent_id = ?, position = ?, pinned = ?, content = ?,
                     version = ?, updated_at = ?
                 WHERE id = ? AND owner_id = ? AND version = ?",
                libsql::params![
                    name.as_str(),
                    parent_id.as_deref(),
                    position,
                    pinned as i64,
                    content.as_deref(),
                    current.version + 1,
                    updated_at.to_rfc3339(),
                    id,
                    owner_id,
                    current.version,
                ],
            )
            .await
            .map_err(|e| Self::map_write_error(e, "Failed to update node"))?;

        if affected == 0 {
            return match self.fetch_node(&conn, id, owner_id).await? {
                Some(racer) => Err(StoreError::version_conflict(
                    id,
                    current.version,
                    racer.version,
                )),
                None => Err(StoreError::not_found(id)),
            };
        }

        self.fetch_node(&conn, id, owner_id)
            .await?
            .ok_or_else(|| StoreError::sql_execution("Node not found after update"))
    }

    async fn remove(&self, id: &str, owner_id: &str) -> Result<(), StoreError> {
        let conn = self.connect().await?;

        let affected = conn
            .execute(
                "DELETE FROM nodes WHERE id = ? AND owner_id = ?",
                [id, owner_id],
            )
            .await
            .map_err(|e| StoreError::sql_execution(format!("Failed to delete node: {}", e)))?;

        if affected == 0 {
            return Err(StoreError::not_found(id));
        }
        Ok(())
    }

    async fn remove_many(&self, ids: &[String], owner_id: &str) -> Result<(), StoreError> {
        let conn = self.connect().await?;

        for id in ids {
            conn.execute(
                "DELETE FROM nodes WHERE id = ? AND owner_id = ?",
                [id.as_str(), owner_id],
            )
            .await
            .map_err(|e| StoreError::sql_execution(format!("Failed to delete node: {}", e)))?;
        }
        Ok(())
    }

    async fn remove_by_project(
        &self,
        project_id: &str,
        owner_id: &str,
    ) -> Result<(), StoreError> {
        let conn = self.connect().await?;

        conn.execute(
            "DELETE FROM nodes WHERE project_id = ? AND owner_id = ?",
            [project_id, owner_id],
        )
        .await
        .map_err(|e| {
            StoreError::sql_execution(format!("Failed to delete project nodes: {}", e))
        })?;
        Ok(())
    }

    async fn search(
        &self,
        text: &str,
        owner_id: &str,
        project_id: &str,
    ) -> Result<Vec<Node>, StoreError> {
        let conn = self.connect().await?;

        // Name: case-insensitive LIKE. Leaf content: case-sensitive instr.
        let name_pattern = format!("%{}%", Self::escape_like(&text.to_lowercase()));

        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM nodes
                 WHERE owner_id = ? AND project_id = ?
                   AND (lower(name) LIKE ? ESCAPE '\\'
                        OR (kind = 'file' AND content IS NOT NULL AND instr(content, ?) > 0))
                 ORDER BY name ASC",
                NODE_COLUMNS
            ))
            .await
            .map_err(|e| {
                StoreError::sql_execution(format!("Failed to prepare search query: {}", e))
            })?;

        let mut rows = stmt
            .query(libsql::params![
                owner_id,
                project_id,
                name_pattern.as_str(),
                text
            ])
            .await
            .map_err(|e| {
                StoreError::sql_execution(format!("Failed to execute search query: {}", e))
            })?;

        let mut nodes = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::sql_execution(e.to_string()))?
        {
            nodes.push(Self::row_to_node(&row).map_err(|e| {
                StoreError::sql_execution(format!("Failed to convert row: {:#}", e))
            })?);
        }

        Ok(nodes)
    }
}

#[async_trait]
impl ProjectStore for TursoStore {
    async fn get_project(&self, id: &str) -> Result<Option<Project>, StoreError> {
        let conn = self.connect().await?;

        let mut stmt = conn
            .prepare(
                "SELECT id, owner_id, name, created_at, updated_at
                 FROM projects WHERE id = ?",
            )
            .await
            .map_err(|e| {
                StoreError::sql_execution(format!("Failed to prepare get_project query: {}", e))
            })?;

        let mut rows = stmt.query([id]).await.map_err(|e| {
            StoreError::sql_execution(format!("Failed to execute get_project query: {}", e))
        })?;

        match rows
            .next()
            .await
            .map_err(|e| StoreError::sql_execution(e.to_string()))?
        {
            Some(row) => Ok(Some(Self::row_to_project(&row).map_err(|e| {
                StoreError::sql_execution(format!("Failed to convert row: {:#}", e))
            })?)),
            None => Ok(None),
        }
    }

    async fn list_projects(&self, owner_id: &str) -> Result<Vec<Project>, StoreError> {
        let conn = self.connect().await?;

        let mut stmt = conn
            .prepare(
                "SELECT id, owner_id, name, created_at, updated_at
                 FROM projects WHERE owner_id = ? ORDER BY name ASC",
            )
            .await
            .map_err(|e| {
                StoreError::sql_execution(format!("Failed to prepare list_projects query: {}", e))
            })?;

        let mut rows = stmt.query([owner_id]).await.map_err(|e| {
            StoreError::sql_execution(format!("Failed to execute list_projects query: {}", e))
        })?;

        let mut projects = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::sql_execution(e.to_string()))?
        {
            projects.push(Self::row_to_project(&row).map_err(|e| {
                StoreError::sql_execution(format!("Failed to convert row: {:#}", e))
            })?);
        }

        Ok(projects)
    }

    async fn insert_project(&self, project: Project) -> Result<Project, StoreError> {
        let conn = self.connect().await?;

        conn.execute(
            "INSERT INTO projects (id, owner_id, name, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
            libsql::params![
                project.id.as_str(),
                project.owner_id.as_str(),
                project.name.as_str(),
                project.created_at.to_rfc3339(),
                project.updated_at.to_rfc3339(),
            ],
        )
        .await
        .map_err(|e| Self::map_write_error(e, "Failed to insert project"))?;

        Ok(project)
    }

    async fn replace_project(
        &self,
        id: &str,
        patch: ProjectPatch,
    ) -> Result<Project, StoreError> {
        let conn = self.connect().await?;

        let current = self
            .get_project(id)
            .await?
            .ok_or_else(|| StoreError::not_found(id))?;

        let name = patch.name.unwrap_or(current.name);
        let updated_at = Utc::now();

        conn.execute(
            "UPDATE projects SET name = ?, updated_at = ? WHERE id = ?",
            libsql::params![name.as_str(), updated_at.to_rfc3339(), id],
        )
        .await
        .map_err(|e| Self::map_write_error(e, "Failed to update project"))?;

        self.get_project(id)
            .await?
            .ok_or_else(|| StoreError::sql_execution("Project not found after update"))
    }

    async fn remove_project(&self, id: &str) -> Result<(), StoreError> {
        let conn = self.connect().await?;

        let affected = conn
            .execute("DELETE FROM projects WHERE id = ?", [id])
            .await
            .map_err(|e| {
                StoreError::sql_execution(format!("Failed to delete project: {}", e))
            })?;

        if affected == 0 {
            return Err(StoreError::not_found(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_store() -> (TursoStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let store = TursoStore::new(db_path).await.unwrap();
        (store, temp_dir)
    }

    fn node(name: &str, parent: Option<&str>) -> Node {
        Node::new(
            "owner-1".to_string(),
            "project-1".to_string(),
            parent.map(|p| p.to_string()),
            NodeKind::File,
            name.to_string(),
        )
    }

    #[tokio::test]
    async fn test_insert_round_trip() {
        let (store, _temp) = create_test_store().await;

        let mut original = node("Chapter 1.txt", None);
        original.content = Some("It was a dark and stormy night.".to_string());
        let created = store.insert(original.clone()).await.unwrap();

        assert_eq!(created.id, original.id);
        assert_eq!(created.name, "Chapter 1.txt");
        assert_eq!(created.kind, NodeKind::File);
        assert_eq!(created.content, original.content);
        assert_eq!(created.version, 1);

        let fetched = store.get(&created.id, "owner-1").await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_sibling_name_unique_index() {
        let (store, _temp) = create_test_store().await;

        store.insert(node("Report.txt", None)).await.unwrap();
        let err = store.insert(node("Report.txt", None)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_list_children_ordering() {
        let (store, _temp) = create_test_store().await;

        let mut a = node("a", None);
        a.position = 1;
        let mut b = node("b", None);
        b.position = 0;
        let mut c = node("c", None);
        c.position = 2;
        c.pinned = true;

        store.insert(a).await.unwrap();
        store.insert(b).await.unwrap();
        store.insert(c).await.unwrap();

        let children = store
            .list_children(None, "owner-1", "project-1")
            .await
            .unwrap();
        let names: Vec<&str> = children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_replace_version_guard() {
        let (store, _temp) = create_test_store().await;
        let created = store.insert(node("Draft", None)).await.unwrap();

        let updated = store
            .replace(&created.id, "owner-1", NodePatch::rename("Draft 2"))
            .await
            .unwrap();
        assert_eq!(updated.version, 2);
        assert!(updated.updated_at > created.updated_at);

        let stale = NodePatch {
            name: Some("Draft 3".to_string()),
            expected_version: Some(1),
            ..Default::default()
        };
        let err = store.replace(&created.id, "owner-1", stale).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { .. }));
    }

    #[tokio::test]
    async fn test_search_name_and_content() {
        let (store, _temp) = create_test_store().await;

        let mut leaf = node("Chapter One", None);
        leaf.content = Some("The Winter came early".to_string());
        store.insert(leaf).await.unwrap();

        assert_eq!(
            store
                .search("chapter", "owner-1", "project-1")
                .await
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            store
                .search("Winter", "owner-1", "project-1")
                .await
                .unwrap()
                .len(),
            1
        );
        // Content matching stays case-sensitive
        assert_eq!(
            store
                .search("winter came", "owner-1", "project-1")
                .await
                .unwrap()
                .len(),
            0
        );
        // LIKE wildcards in the query are literals, not patterns
        assert_eq!(
            store
                .search("%", "owner-1", "project-1")
                .await
                .unwrap()
                .len(),
            0
        );
    }

    #[tokio::test]
    async fn test_projects_crud() {
        let (store, _temp) = create_test_store().await;

        let project = Project::new("owner-1".to_string(), "First Novel".to_string());
        let created = store.insert_project(project.clone()).await.unwrap();
        assert_eq!(created.id, project.id);

        let renamed = store
            .replace_project(
                &project.id,
                ProjectPatch {
                    name: Some("Second Novel".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Second Novel");

        store.remove_project(&project.id).await.unwrap();
        assert!(store.get_project(&project.id).await.unwrap().is_none());
        assert!(matches!(
            store.remove_project(&project.id).await.unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }
}
