//! Reconciler - computes the actions needed to bring a live machine up to a
//! saved inventory.

use crate::adapter::SourceAdapter;
use crate::error::{Error, Result};
use crate::inventory::Inventory;
use crate::types::{Action, Entry, RepoRequirement};
use std::collections::BTreeSet;

/// Compute the ordered action list for one source.
///
/// Entries present in both inventories produce no action. Each missing
/// entry's repository requirements are resolved through the adapter and
/// deduplicated across the whole batch, so a requirement shared by several
/// entries registers exactly once. Missing entries are processed in
/// ascending identifier order, which makes the output deterministic.
pub fn reconcile(
    saved: &Inventory,
    live: &Inventory,
    adapter: &dyn SourceAdapter,
) -> Result<Vec<Action>> {
    validate(saved)?;
    validate(live)?;

    let live_ids = live.identifiers();
    let missing: Vec<&Entry> = saved
        .sorted_entries()
        .into_iter()
        .filter(|e| !live_ids.contains(e.identifier.as_str()))
        .collect();

    log::debug!(
        "{}: {} saved, {} live, {} missing",
        saved.source,
        saved.len(),
        live.len(),
        missing.len()
    );

    let mut actions = Vec::with_capacity(missing.len());

    if adapter.supports_repository_setup() {
        let mut seen: BTreeSet<RepoRequirement> = BTreeSet::new();
        for entry in &missing {
            for requirement in adapter.repository_requirements_for(entry) {
                if seen.insert(requirement.clone()) {
                    actions.push(Action::RegisterRepository(requirement));
                }
            }
        }
    }

    actions.extend(missing.into_iter().cloned().map(Action::InstallEntry));
    Ok(actions)
}

/// Reject inventories containing malformed entries.
fn validate(inventory: &Inventory) -> Result<()> {
    for entry in inventory.iter() {
        if entry.identifier.trim().is_empty() {
            return Err(Error::Reconciliation {
                message: format!("{} inventory contains an entry without an identifier", inventory.source),
            });
        }
        if entry.source != inventory.source {
            return Err(Error::Reconciliation {
                message: format!(
                    "{} inventory contains a {} entry '{}'",
                    inventory.source, entry.source, entry.identifier
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Outcome, Source};

    /// Adapter stub with APT-style repository setup.
    struct AptStub;

    impl SourceAdapter for AptStub {
        fn source(&self) -> Source {
            Source::Apt
        }

        fn is_available(&self) -> bool {
            true
        }

        fn enumerate(&self) -> Result<Vec<Entry>> {
            Ok(Vec::new())
        }

        fn install(&self, _entry: &Entry) -> Result<Outcome> {
            Ok(Outcome::Installed)
        }

        fn supports_repository_setup(&self) -> bool {
            true
        }

        fn repository_requirements_for(&self, entry: &Entry) -> Vec<RepoRequirement> {
            entry.provenance.clone().into_iter().collect()
        }
    }

    fn apt_inventory(entries: Vec<Entry>) -> Inventory {
        Inventory::from_entries(Source::Apt, entries)
    }

    #[test]
    fn test_missing_entry_with_ppa() {
        // vlc is already installed; gimp needs its PPA registered first.
        let ppa = RepoRequirement::ppa("ppa:otto-kesselgulasch/gimp");
        let saved = apt_inventory(vec![
            Entry::new(Source::Apt, "vlc"),
            Entry::new(Source::Apt, "gimp").with_provenance(ppa.clone()),
        ]);
        let live = apt_inventory(vec![Entry::new(Source::Apt, "vlc")]);

        let actions = reconcile(&saved, &live, &AptStub).unwrap();
        assert_eq!(
            actions,
            vec![
                Action::RegisterRepository(ppa),
                Action::InstallEntry(saved.get("gimp").unwrap().clone()),
            ]
        );
    }

    #[test]
    fn test_no_action_for_present_entries() {
        let saved = apt_inventory(vec![
            Entry::new(Source::Apt, "git"),
            Entry::new(Source::Apt, "vim"),
        ]);
        let live = saved.clone();

        let actions = reconcile(&saved, &live, &AptStub).unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn test_requirement_dedup_across_entries() {
        let ppa = RepoRequirement::ppa("ppa:team/tools");
        let saved = apt_inventory(vec![
            Entry::new(Source::Apt, "tool-a").with_provenance(ppa.clone()),
            Entry::new(Source::Apt, "tool-b").with_provenance(ppa.clone()),
            Entry::new(Source::Apt, "tool-c").with_provenance(ppa.clone()),
        ]);
        let live = apt_inventory(vec![]);

        let actions = reconcile(&saved, &live, &AptStub).unwrap();
        let registers = actions.iter().filter(|a| a.is_register()).count();
        assert_eq!(registers, 1);
        assert_eq!(actions.len(), 4);
    }

    #[test]
    fn test_deterministic_identifier_order() {
        let saved = apt_inventory(vec![
            Entry::new(Source::Apt, "zsh"),
            Entry::new(Source::Apt, "bash"),
            Entry::new(Source::Apt, "mc"),
        ]);
        let live = apt_inventory(vec![]);

        let first = reconcile(&saved, &live, &AptStub).unwrap();
        let second = reconcile(&saved, &live, &AptStub).unwrap();
        assert_eq!(first, second);

        let ids: Vec<String> = first.iter().map(Action::label).collect();
        assert_eq!(ids, vec!["install bash", "install mc", "install zsh"]);
    }

    #[test]
    fn test_idempotent_after_apply() {
        // Simulate applying the planned installs, then re-reconcile.
        let saved = apt_inventory(vec![
            Entry::new(Source::Apt, "git"),
            Entry::new(Source::Apt, "vim"),
        ]);
        let mut live = apt_inventory(vec![Entry::new(Source::Apt, "git")]);

        let actions = reconcile(&saved, &live, &AptStub).unwrap();
        for action in &actions {
            if let Action::InstallEntry(entry) = action {
                live.insert(entry.clone());
            }
        }

        let rerun = reconcile(&saved, &live, &AptStub).unwrap();
        assert!(rerun.is_empty());
    }

    #[test]
    fn test_malformed_entry_rejected() {
        let saved = apt_inventory(vec![Entry::new(Source::Apt, "  ")]);
        let live = apt_inventory(vec![]);

        let err = reconcile(&saved, &live, &AptStub).unwrap_err();
        assert!(matches!(err, Error::Reconciliation { .. }));
    }

    #[test]
    fn test_wrong_source_entry_rejected() {
        let mut saved = apt_inventory(vec![]);
        // Bypass from_entries to build the malformed case.
        saved.insert(Entry::new(Source::Snap, "firefox"));

        let live = apt_inventory(vec![]);
        let err = reconcile(&saved, &live, &AptStub).unwrap_err();
        assert!(matches!(err, Error::Reconciliation { .. }));
    }
}
