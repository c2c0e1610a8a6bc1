//! MemoryStore - In-Memory Persistence Backend
//!
//! Plain map-backed implementation of [`NodeStore`] and [`ProjectStore`].
//! Used directly by orchestrator tests and as the documented second backend
//! alongside `TursoStore`; the ordering and constraint contracts mirror the
//! relational backend exactly:
//!
//! - children listed by (`pinned` desc, `position` asc, `created_at` asc)
//! - advisory sibling-name uniqueness surfaced as `Conflict`
//! - optimistic version check on `replace`
//!
//! Locking is a single `std::sync::RwLock` around the maps; no guard is
//! ever held across an await point.

use crate::db::{NodeStore, ProjectStore, StoreError};
use crate::models::{Node, NodePatch, Project, ProjectPatch};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
struct MemoryInner {
    nodes: HashMap<String, Node>,
    projects: HashMap<String, Project>,
}

/// In-memory map backend for nodes and projects
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, MemoryInner>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::sql_execution("memory store lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, MemoryInner>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::sql_execution("memory store lock poisoned"))
    }

    /// Display-order comparison shared with the relational backend
    fn sort_children(nodes: &mut [Node]) {
        nodes.sort_by(|a, b| {
            b.pinned
                .cmp(&a.pinned)
                .then(a.position.cmp(&b.position))
                .then(a.created_at.cmp(&b.created_at))
        });
    }

    /// Advisory sibling-name uniqueness check, excluding `exclude_id`
    fn sibling_name_taken(
        inner: &MemoryInner,
        candidate: &Node,
        exclude_id: Option<&str>,
    ) -> bool {
        inner.nodes.values().any(|n| {
            Some(n.id.as_str()) != exclude_id
                && n.owner_id == candidate.owner_id
                && n.project_id == candidate.project_id
                && n.parent_id == candidate.parent_id
                && n.name == candidate.name
        })
    }
}

#[async_trait]
impl NodeStore for MemoryStore {
    async fn get(&self, id: &str, owner_id: &str) -> Result<Option<Node>, StoreError> {
        let inner = self.read()?;
        Ok(inner
            .nodes
            .get(id)
            .filter(|n| n.owner_id == owner_id)
            .cloned())
    }

    async fn list_children(
        &self,
        parent_id: Option<&str>,
        owner_id: &str,
        project_id: &str,
    ) -> Result<Vec<Node>, StoreError> {
        let inner = self.read()?;
        let mut children: Vec<Node> = inner
            .nodes
            .values()
            .filter(|n| {
                n.owner_id == owner_id
                    && n.project_id == project_id
                    && n.parent_id.as_deref() == parent_id
            })
            .cloned()
            .collect();
        Self::sort_children(&mut children);
        Ok(children)
    }

    async fn insert(&self, node: Node) -> Result<Node, StoreError> {
        let mut inner = self.write()?;
        if inner.nodes.contains_key(&node.id) {
            return Err(StoreError::conflict(format!(
                "node id already exists: {}",
                node.id
            )));
        }
        if Self::sibling_name_taken(&inner, &node, None) {
            return Err(StoreError::conflict(format!(
                "sibling name already taken: {}",
                node.name
            )));
        }
        inner.nodes.insert(node.id.clone(), node.clone());
        Ok(node)
    }

    async fn replace(
        &self,
        id: &str,
        owner_id: &str,
        patch: NodePatch,
    ) -> Result<Node, StoreError> {
        let mut inner = self.write()?;

        let current = inner
            .nodes
            .get(id)
            .filter(|n| n.owner_id == owner_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id))?;

        if let Some(expected) = patch.expected_version {
            if current.version != expected {
                return Err(StoreError::version_conflict(id, expected, current.version));
            }
        }

        let mut updated = current.clone();
        if let Some(name) = patch.name {
            updated.name = name;
        }
        if let Some(parent_id) = patch.parent_id {
            updated.parent_id = parent_id;
        }
        if let Some(position) = patch.position {
            updated.position = position;
        }
        if let Some(pinned) = patch.pinned {
            updated.pinned = pinned;
        }
        if let Some(content) = patch.content {
            updated.content = content;
        }
        updated.version = current.version + 1;
        updated.updated_at = Utc::now();

        if Self::sibling_name_taken(&inner, &updated, Some(id)) {
            return Err(StoreError::conflict(format!(
                "sibling name already taken: {}",
                updated.name
            )));
        }

        inner.nodes.insert(id.to_string(), updated.clone());
        Ok(updated)
    }

    async fn remove(&self, id: &str, owner_id: &str) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        let owned = inner
            .nodes
            .get(id)
            .map(|n| n.owner_id == owner_id)
            .unwrap_or(false);
        if !owned {
            return Err(StoreError::not_found(id));
        }
        inner.nodes.remove(id);
        Ok(())
    }

    async fn remove_many(&self, ids: &[String], owner_id: &str) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        for id in ids {
            let owned = inner
                .nodes
                .get(id)
                .map(|n| n.owner_id == owner_id)
                .unwrap_or(false);
            if owned {
                inner.nodes.remove(id);
            }
        }
        Ok(())
    }

    async fn remove_by_project(
        &self,
        project_id: &str,
        owner_id: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        inner
            .nodes
            .retain(|_, n| !(n.project_id == project_id && n.owner_id == owner_id));
        Ok(())
    }

    async fn search(
        &self,
        text: &str,
        owner_id: &str,
        project_id: &str,
    ) -> Result<Vec<Node>, StoreError> {
        let needle_lower = text.to_lowercase();
        let inner = self.read()?;
        let mut hits: Vec<Node> = inner
            .nodes
            .values()
            .filter(|n| n.owner_id == owner_id && n.project_id == project_id)
            .filter(|n| {
                // Name: case-insensitive. Leaf content: case-sensitive.
                n.name.to_lowercase().contains(&needle_lower)
                    || n.content
                        .as_deref()
                        .map(|c| c.contains(text))
                        .unwrap_or(false)
            })
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(hits)
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn get_project(&self, id: &str) -> Result<Option<Project>, StoreError> {
        let inner = self.read()?;
        Ok(inner.projects.get(id).cloned())
    }

    async fn list_projects(&self, owner_id: &str) -> Result<Vec<Project>, StoreError> {
        let inner = self.read()?;
        let mut projects: Vec<Project> = inner
            .projects
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }

    async fn insert_project(&self, project: Project) -> Result<Project, StoreError> {
        let mut inner = self.write()?;
        if inner.projects.contains_key(&project.id) {
            return Err(StoreError::conflict(format!(
                "project id already exists: {}",
                project.id
            )));
        }
        inner.projects.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    async fn replace_project(
        &self,
        id: &str,
        patch: ProjectPatch,
    ) -> Result<Project, StoreError> {
        let mut inner = self.write()?;
        let current = inner
            .projects
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id))?;

        let mut updated = current;
        if let Some(name) = patch.name {
            updated.name = name;
        }
        updated.updated_at = Utc::now();

        inner.projects.insert(id.to_string(), updated.clone());
        Ok(updated)
    }

    async fn remove_project(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        if inner.projects.remove(id).is_none() {
            return Err(StoreError::not_found(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NodeKind;

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
    async fn test_insert_and_get_scoped_by_owner() {
        let store = MemoryStore::new();
        let n = store.insert(node("Notes.txt", None)).await.unwrap();

        assert!(store.get(&n.id, "owner-1").await.unwrap().is_some());
        assert!(store.get(&n.id, "owner-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_children_pinned_first() {
        let store = MemoryStore::new();
        let mut a = node("a", None);
        a.position = 0;
        let mut b = node("b", None);
        b.position = 1;
        let mut c = node("c", None);
        c.position = 2;
        c.pinned = true;

        store.insert(a).await.unwrap();
        store.insert(b).await.unwrap();
        store.insert(c).await.unwrap();

        let children = store.list_children(None, "owner-1", "project-1").await.unwrap();
        let names: Vec<&str> = children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_sibling_name_conflict() {
        let store = MemoryStore::new();
        store.insert(node("Report.txt", None)).await.unwrap();

        let err = store.insert(node("Report.txt", None)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));

        // Same name under a different parent is fine
        let folder = store.insert(node("folder", None)).await.unwrap();
        store
            .insert(node("Report.txt", Some(&folder.id)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_replace_bumps_version_and_checks_occ() {
        let store = MemoryStore::new();
        let n = store.insert(node("Draft", None)).await.unwrap();

        let updated = store
            .replace(&n.id, "owner-1", NodePatch::rename("Draft 2"))
            .await
            .unwrap();
        assert_eq!(updated.version, 2);
        assert_eq!(updated.name, "Draft 2");
        assert!(updated.updated_at > n.updated_at);

        let patch = NodePatch {
            name: Some("Draft 3".to_string()),
            expected_version: Some(1),
            ..Default::default()
        };
        let err = store.replace(&n.id, "owner-1", patch).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { .. }));
    }

    #[tokio::test]
    async fn test_remove_many_is_best_effort() {
        let store = MemoryStore::new();
        let n = store.insert(node("Notes.txt", None)).await.unwrap();

        store
            .remove_many(
                &[n.id.clone(), "missing-id".to_string()],
                "owner-1",
            )
            .await
            .unwrap();
        assert!(store.get(&n.id, "owner-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_case_rules() {
        let store = MemoryStore::new();
        let mut leaf = node("Chapter One", None);
        leaf.content = Some("The Winter came early".to_string());
        store.insert(leaf).await.unwrap();

        // Name match is case-insensitive
        assert_eq!(
            store.search("chapter", "owner-1", "project-1").await.unwrap().len(),
            1
        );
        // Content match is case-sensitive
        assert_eq!(
            store.search("Winter", "owner-1", "project-1").await.unwrap().len(),
            1
        );
        assert_eq!(
            store.search("winter", "owner-1", "project-1").await.unwrap().len(),
            0
        );
    }
}
