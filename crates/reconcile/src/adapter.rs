//! Source adapter trait.
//!
//! One adapter per package ecosystem. The engine only sees this capability
//! set; everything backend-specific (spawning `apt-get`, parsing `snap list`
//! output) lives behind it.

use crate::error::Result;
use crate::types::{Action, Entry, Outcome, RepoRequirement, Source};

/// Capability interface for one package ecosystem.
///
/// `enumerate` is read-only. `install` and `register_repository` mutate
/// system package state and may block on external I/O or credential
/// prompts; the engine imposes no timeout.
pub trait SourceAdapter: Send + Sync {
    /// Which ecosystem this adapter serves.
    fn source(&self) -> Source;

    /// Whether the underlying package manager is present on this machine.
    fn is_available(&self) -> bool;

    /// List currently installed entries.
    ///
    /// Fails with [`Error::Enumeration`] when the underlying manager is
    /// unavailable or the query fails.
    ///
    /// [`Error::Enumeration`]: crate::error::Error::Enumeration
    fn enumerate(&self) -> Result<Vec<Entry>>;

    /// Install one entry.
    ///
    /// An `Err` carries the underlying manager's diagnostic; the replay
    /// driver converts it into [`Outcome::Failed`] rather than propagating.
    fn install(&self, entry: &Entry) -> Result<Outcome>;

    /// Whether this source has third-party repository setup steps.
    /// Only APT does.
    fn supports_repository_setup(&self) -> bool {
        false
    }

    /// Repository requirements that must be registered before `entry` can
    /// install. Empty for sources without third-party provenance.
    fn repository_requirements_for(&self, _entry: &Entry) -> Vec<RepoRequirement> {
        Vec::new()
    }

    /// Register a third-party repository.
    fn register_repository(&self, _requirement: &RepoRequirement) -> Result<Outcome> {
        Ok(Outcome::skipped(format!(
            "{} does not use repository setup",
            self.source()
        )))
    }
}

/// A boxed adapter for type-erased storage.
pub type BoxedAdapter = Box<dyn SourceAdapter>;

/// Callback receiving per-action progress during replay.
pub trait ReplayObserver {
    /// Called before an action executes.
    fn on_action_start(&mut self, action: &Action);

    /// Called with the action's outcome.
    fn on_action_complete(&mut self, action: &Action, outcome: &Outcome);
}

/// No-op observer.
pub struct NoObserver;

impl ReplayObserver for NoObserver {
    fn on_action_start(&mut self, _action: &Action) {}
    fn on_action_complete(&mut self, _action: &Action, _outcome: &Outcome) {}
}
