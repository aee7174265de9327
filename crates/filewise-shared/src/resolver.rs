//! Fuzzy filename resolution against a snapshot.
//!
//! Exact (case-insensitive) matches always beat substring matches, so a
//! fragment like `report.txt` never lands on `final_report.txt` when
//! `report.txt` itself exists.

use crate::entry::{DirectoryEntry, Snapshot};

/// Find the entry a user most likely meant by `fragment`
///
/// Pass 1 looks for a case-insensitive exact name; pass 2 takes the first
/// entry, in snapshot order, whose name contains the fragment.
pub fn resolve<'a>(fragment: &str, snapshot: &'a Snapshot) -> Option<&'a DirectoryEntry> {
    resolve_in(fragment, snapshot.entries())
}

/// Same as [`resolve`] over a bare entry slice
pub fn resolve_in<'a>(fragment: &str, entries: &'a [DirectoryEntry]) -> Option<&'a DirectoryEntry> {
    let wanted = fragment.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }

    if let Some(exact) = entries.iter().find(|e| e.name.to_lowercase() == wanted) {
        return Some(exact);
    }

    entries
        .iter()
        .find(|e| e.name.to_lowercase().contains(&wanted))
}
