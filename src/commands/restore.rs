use anyhow::Result;
use dialoguer::Confirm;
use pkgkit::InventoryStore;
use reconcile::{Action, Outcome, ReplayMode, ReplayObserver, ReplaySummary, Source, replay};
use std::fs;
use std::path::Path;

use crate::Context;
use crate::cli::{self, RestoreArgs};
use crate::commands::plan::is_tool_missing;
use crate::commands::script::write_executable;
use crate::engine::{self, SourcePlan};
use crate::ui;

pub fn run(ctx: &Context, store: &InventoryStore, args: &RestoreArgs) -> Result<()> {
    let sources = cli::selected_sources(&args.source);
    ui::header("Restoring from snapshots");

    let mut plans: Vec<SourcePlan> = Vec::new();
    for source in sources {
        if !store.exists(source) {
            if !ctx.quiet {
                ui::dim(&format!("{source}: no snapshot"));
            }
            continue;
        }
        match engine::plan_source(store, source) {
            Ok(plan) if plan.actions.is_empty() => {
                ui::success(&format!("{source}: up to date"));
            }
            Ok(plan) => plans.push(plan),
            Err(e) if is_tool_missing(&e) => ui::warn(&format!("{source}: {e:#}")),
            Err(e) => return Err(e),
        }
    }

    if plans.is_empty() {
        return Ok(());
    }

    let total: usize = plans.iter().map(|p| p.actions.len()).sum();
    println!();
    for plan in &plans {
        ui::kv(&plan.source.to_string(), &format!("{} action(s)", plan.actions.len()));
    }

    if !args.yes
        && !Confirm::new()
            .with_prompt(format!("Run {total} action(s)?"))
            .default(false)
            .interact()?
    {
        ui::info("aborted");
        return Ok(());
    }

    let script_dir = resolve_script_dir(args.script_dir.as_deref(), store);
    let mut summary = ReplaySummary::default();
    for plan in plans {
        match replay_mode(plan.source, args.apt_unattended) {
            ReplayMode::ManualReview => {
                // APT registration edits sources.list and trust anchors;
                // render a script for review instead of executing.
                let script = pkgkit::render_script(
                    plan.source,
                    &plan.actions,
                    plan.handle.codename.as_deref(),
                );
                fs::create_dir_all(script_dir)?;
                let path = script_dir.join(format!("{}.sh", plan.source));
                write_executable(&path, &script)?;
                ui::warn(&format!(
                    "{}: wrote {} for manual review (pass --apt-unattended to execute directly)",
                    plan.source,
                    path.display()
                ));
            }
            ReplayMode::Automatic => {
                ui::section(&plan.source.to_string());
                let mut observer = ConsoleObserver {
                    current: 0,
                    total: plan.actions.len(),
                };
                summary.merge(replay(plan.handle.adapter.as_ref(), &plan.actions, &mut observer));
            }
        }
    }

    report(&summary)
}

/// Manual-review scripts land next to the snapshots unless overridden.
fn resolve_script_dir<'a>(override_dir: Option<&'a Path>, store: &'a InventoryStore) -> &'a Path {
    override_dir.unwrap_or_else(|| store.dir())
}

const fn replay_mode(source: Source, apt_unattended: bool) -> ReplayMode {
    if matches!(source, Source::Apt) && !apt_unattended {
        ReplayMode::ManualReview
    } else {
        ReplayMode::Automatic
    }
}

fn report(summary: &ReplaySummary) -> Result<()> {
    if summary.total() == 0 {
        return Ok(());
    }

    println!();
    ui::kv("installed", &summary.installed.to_string());
    ui::kv("skipped", &summary.skipped.to_string());
    ui::kv("failed", &summary.failed.to_string());

    if summary.is_success() {
        ui::success("restore complete");
        return Ok(());
    }
    for (label, reason) in &summary.failures {
        ui::error(&format!("{label}: {reason}"));
    }
    anyhow::bail!("{} action(s) failed", summary.failed)
}

struct ConsoleObserver {
    current: usize,
    total: usize,
}

impl ReplayObserver for ConsoleObserver {
    fn on_action_start(&mut self, action: &Action) {
        self.current += 1;
        ui::step(self.current, self.total, &action.label());
    }

    fn on_action_complete(&mut self, action: &Action, outcome: &Outcome) {
        match outcome {
            Outcome::Installed => {}
            Outcome::Skipped { reason } => ui::dim(&format!("{}: {reason}", action.label())),
            Outcome::Failed { reason } => ui::error(&format!("{}: {reason}", action.label())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apt_defaults_to_manual_review() {
        assert_eq!(replay_mode(Source::Apt, false), ReplayMode::ManualReview);
        assert_eq!(replay_mode(Source::Apt, true), ReplayMode::Automatic);
    }

    #[test]
    fn test_other_sources_are_automatic() {
        assert_eq!(replay_mode(Source::Snap, false), ReplayMode::Automatic);
        assert_eq!(replay_mode(Source::Flatpak, false), ReplayMode::Automatic);
        assert_eq!(replay_mode(Source::IdeInstaller, false), ReplayMode::Automatic);
    }

    #[test]
    fn test_script_dir_defaults_to_snapshot_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = InventoryStore::new(dir.path());
        assert_eq!(resolve_script_dir(None, &store), dir.path());
    }

    #[test]
    fn test_script_dir_override() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = InventoryStore::new(dir.path());
        let custom = dir.path().join("review-scripts");
        assert_eq!(resolve_script_dir(Some(&custom), &store), custom.as_path());
    }
}
