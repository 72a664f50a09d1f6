//! Inventory of installed entries for one source at one point in time.

use crate::adapter::SourceAdapter;
use crate::error::Result;
use crate::types::{Entry, Source};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Deduplicated collection of entries for one source.
///
/// Membership order is irrelevant; planning uses ascending identifier order
/// for determinism. Duplicate identifiers keep the first-seen entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    /// Source all entries belong to
    pub source: Source,
    /// When this inventory was captured
    pub captured_at: DateTime<Utc>,
    entries: Vec<Entry>,
}

impl Inventory {
    /// Create an empty inventory captured now.
    pub fn new(source: Source) -> Self {
        Self {
            source,
            captured_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    /// Build an inventory from raw entries, deduplicating by identifier and
    /// keeping the first occurrence.
    pub fn from_entries(source: Source, entries: impl IntoIterator<Item = Entry>) -> Self {
        let mut inventory = Self::new(source);
        for entry in entries {
            inventory.insert(entry);
        }
        inventory
    }

    /// Insert an entry unless its identifier is already present.
    /// Returns whether the entry was added.
    pub fn insert(&mut self, entry: Entry) -> bool {
        if self.contains(&entry.identifier) {
            log::debug!(
                "dropping duplicate {} entry '{}'",
                self.source,
                entry.identifier
            );
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Check whether an identifier is present.
    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.iter().any(|e| e.identifier == identifier)
    }

    /// Look up an entry by identifier.
    pub fn get(&self, identifier: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.identifier == identifier)
    }

    /// Iterate entries in capture order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Set of identifiers.
    pub fn identifiers(&self) -> BTreeSet<&str> {
        self.entries.iter().map(|e| e.identifier.as_str()).collect()
    }

    /// Entries sorted by ascending identifier.
    pub fn sorted_entries(&self) -> Vec<&Entry> {
        let mut sorted: Vec<&Entry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        sorted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compare entry sets, ignoring capture time and order.
    pub fn same_entries(&self, other: &Self) -> bool {
        self.source == other.source
            && self.len() == other.len()
            && self.sorted_entries() == other.sorted_entries()
    }
}

/// Capture a fresh inventory through the adapter.
///
/// Deterministic given a deterministic adapter: enumeration output is
/// deduplicated by identifier, keeping the first-seen entry.
pub fn capture(adapter: &dyn SourceAdapter) -> Result<Inventory> {
    let entries = adapter.enumerate()?;
    let inventory = Inventory::from_entries(adapter.source(), entries);
    log::info!(
        "captured {} {} entries",
        inventory.len(),
        inventory.source
    );
    Ok(inventory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_seen() {
        let inventory = Inventory::from_entries(
            Source::Snap,
            vec![
                Entry::new(Source::Snap, "firefox").with_attr("channel", "stable"),
                Entry::new(Source::Snap, "firefox").with_attr("channel", "beta"),
                Entry::new(Source::Snap, "vlc"),
            ],
        );

        assert_eq!(inventory.len(), 2);
        assert_eq!(inventory.get("firefox").unwrap().attr("channel"), Some("stable"));
    }

    #[test]
    fn test_identifiers_and_sorted_entries() {
        let inventory = Inventory::from_entries(
            Source::Apt,
            vec![
                Entry::new(Source::Apt, "zsh"),
                Entry::new(Source::Apt, "bash"),
                Entry::new(Source::Apt, "git"),
            ],
        );

        let ids: Vec<&str> = inventory.identifiers().into_iter().collect();
        assert_eq!(ids, vec!["bash", "git", "zsh"]);

        let sorted: Vec<&str> = inventory
            .sorted_entries()
            .iter()
            .map(|e| e.identifier.as_str())
            .collect();
        assert_eq!(sorted, vec!["bash", "git", "zsh"]);
    }

    #[test]
    fn test_same_entries_ignores_order_and_time() {
        let a = Inventory::from_entries(
            Source::Apt,
            vec![Entry::new(Source::Apt, "a"), Entry::new(Source::Apt, "b")],
        );
        let b = Inventory::from_entries(
            Source::Apt,
            vec![Entry::new(Source::Apt, "b"), Entry::new(Source::Apt, "a")],
        );
        assert!(a.same_entries(&b));

        let c = Inventory::from_entries(Source::Apt, vec![Entry::new(Source::Apt, "a")]);
        assert!(!a.same_entries(&c));
    }
}
