//! Name-Conflict Resolver
//!
//! Given a desired name and the current sibling name set (excluding the node
//! being renamed), produce a name guaranteed unique among those siblings.
//!
//! If the desired name does not collide it is returned unchanged. Otherwise
//! suffixes `(1)`, `(2)`, ... are tried before the extension until one is
//! free: `"Report.txt"` becomes `"Report (1).txt"`. The loop terminates
//! because the sibling set is finite.
//!
//! Comparison is exact and case-sensitive; no Unicode normalization is
//! applied.

use std::collections::HashSet;

/// Split a file name into (stem, extension-including-dot).
///
/// A leading dot is part of the stem, so `".gitignore"` has no extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Resolve `desired` against the taken sibling names.
///
/// # Examples
///
/// ```rust
/// use quillspace_core::services::resolve_collision;
/// use std::collections::HashSet;
///
/// let taken: HashSet<String> = ["Report.txt".to_string()].into_iter().collect();
/// assert_eq!(resolve_collision("Report.txt", &taken), "Report (1).txt");
/// assert_eq!(resolve_collision("Notes.txt", &taken), "Notes.txt");
/// ```
pub fn resolve_collision(desired: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(desired) {
        return desired.to_string();
    }

    let (stem, ext) = split_extension(desired);
    for n in 1.. {
        let candidate = format!("{} ({}){}", stem, n, ext);
        if !taken.contains(&candidate) {
            return candidate;
        }
    }
    unreachable!("sibling set is finite")
}
