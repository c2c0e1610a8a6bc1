//! Hierarchy Validator
//!
//! Enforces tree invariants before a structural mutation commits:
//!
//! - a parent must exist, be owned by the caller, belong to the same
//!   project, and be of container kind (leaf kinds cannot have children)
//! - a node cannot be moved into itself or into any of its own descendants
//!
//! The root is a virtual container; `parent_id = None` always validates.
//!
//! Cycle detection is an explicit iterative walk from the proposed parent up
//! through its ancestors, bounded by a visited set so a corrupted store
//! cannot loop it forever. No recursion, so pathological deep trees cannot
//! blow the stack.

use crate::db::NodeStore;
use crate::models::Node;
use crate::services::NodeServiceError;
use std::collections::HashSet;

/// Validate a proposed parent and return it.
///
/// # Errors
///
/// Returns `ParentNotFound` if the parent is absent, not owned by the
/// caller, belongs to a different project, or is a leaf kind.
pub async fn validate_parent(
    store: &dyn NodeStore,
    parent_id: &str,
    owner_id: &str,
    project_id: &str,
) -> Result<Node, NodeServiceError> {
    let parent = store
        .get(parent_id, owner_id)
        .await?
        .ok_or_else(|| NodeServiceError::parent_not_found(parent_id))?;

    if parent.project_id != project_id || !parent.kind.is_container() {
        return Err(NodeServiceError::parent_not_found(parent_id));
    }

    Ok(parent)
}

/// Check that moving `node_id` under `new_parent_id` creates no cycle.
///
/// Walks from `new_parent_id` up through `parent_id` references; if the walk
/// reaches `node_id`, the target is a descendant of the node being moved.
///
/// # Errors
///
/// - `SelfMove` if `new_parent_id == node_id`
/// - `DescendantMove` if `new_parent_id` is a descendant of `node_id`
/// - `Storage` if the stored hierarchy already contains a cycle
pub async fn ensure_no_cycle(
    store: &dyn NodeStore,
    node_id: &str,
    new_parent_id: &str,
    owner_id: &str,
) -> Result<(), NodeServiceError> {
    if new_parent_id == node_id {
        return Err(NodeServiceError::self_move(node_id));
    }

    let mut visited: HashSet<String> = HashSet::new();
    let mut current = new_parent_id.to_string();

    loop {
        if current == node_id {
            return Err(NodeServiceError::descendant_move(node_id, new_parent_id));
        }
        if !visited.insert(current.clone()) {
            return Err(NodeServiceError::storage(format!(
                "cycle detected in stored hierarchy at node {}",
                current
            )));
        }

        // A dangling parent reference terminates the walk; the parent itself
        // was validated separately.
        match store.get(&current, owner_id).await? {
            Some(node) => match node.parent_id {
                Some(parent_id) => current = parent_id,
                None => return Ok(()),
            },
            None => return Ok(()),
        }
    }
}
