//! Ordering Engine
//!
//! Assigns and updates integer ranks so that sibling iteration order is
//! deterministic and respects explicit repositioning requests.
//!
//! - Insert without an explicit position appends: rank = max + 1
//! - Insert/move with a target index is a stable array splice by index,
//!   re-persisted as dense integer ranks (only changed ranks are written)
//! - Reordering is scoped to one (`project_id`, `parent_id`) group at a
//!   time; it never reorders across parents
//!
//! Pinned siblings always sort ahead of unpinned ones regardless of rank;
//! that partition is the store's ordering contract, ranks only disambiguate
//! within it.

use crate::models::Node;
use std::collections::HashMap;

/// Rank for appending to a sibling group: one past the current maximum.
///
/// Ranks need not be contiguous, so this works on gap-tolerant groups.
pub fn append_rank<'a>(siblings: impl IntoIterator<Item = &'a Node>) -> i64 {
    siblings
        .into_iter()
        .map(|n| n.position)
        .max()
        .map_or(0, |max| max + 1)
}

/// Compute the rank rewrites for placing `node_id` at `index` within a
/// sibling group.
///
/// `siblings` is the group's current display order (it may or may not
/// already contain `node_id`; for a cross-parent move it will not). The
/// node is removed from its old slot, the target index is clamped to the
/// group size, and the spliced sequence is re-ranked densely from 0.
///
/// Returns (id, rank) pairs for every node whose rank actually changes;
/// `node_id` is always included so the caller can patch it even when its
/// numeric rank happens to be unchanged by a reparent.
pub fn splice_ranks(siblings: &[Node], node_id: &str, index: usize) -> Vec<(String, i64)> {
    let old_ranks: HashMap<&str, i64> = siblings
        .iter()
        .map(|n| (n.id.as_str(), n.position))
        .collect();

    let mut ids: Vec<&str> = siblings
        .iter()
        .map(|n| n.id.as_str())
        .filter(|id| *id != node_id)
        .collect();

    let index = index.min(ids.len());
    ids.insert(index, node_id);

    ids.iter()
        .enumerate()
        .filter(|(rank, id)| **id == node_id || old_ranks.get(*id) != Some(&(*rank as i64)))
        .map(|(rank, id)| (id.to_string(), rank as i64))
        .collect()
}
