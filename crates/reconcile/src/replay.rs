//! Replay driver - executes a sequenced action list through an adapter.

use crate::adapter::{ReplayObserver, SourceAdapter};
use crate::types::{Action, Outcome, ReplaySummary};

/// Execute actions in order, recording one outcome per action.
///
/// Adapter errors are converted into [`Outcome::Failed`] and never abort
/// the remaining actions: failures are independent per action. Each action
/// is terminal in one step; there are no retries.
pub fn replay(
    adapter: &dyn SourceAdapter,
    actions: &[Action],
    observer: &mut dyn ReplayObserver,
) -> ReplaySummary {
    let mut summary = ReplaySummary::default();

    for action in actions {
        observer.on_action_start(action);

        let outcome = match action {
            Action::RegisterRepository(requirement) => adapter.register_repository(requirement),
            Action::InstallEntry(entry) => adapter.install(entry),
        }
        .unwrap_or_else(|e| Outcome::failed(e.to_string()));

        if let Outcome::Failed { reason } = &outcome {
            log::warn!("{} failed: {}", action.label(), reason);
        }

        observer.on_action_complete(action, &outcome);
        summary.record(&action.label(), &outcome);
    }

    summary
}
