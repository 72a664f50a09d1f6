use anyhow::Result;
use colored::Colorize;
use pkgkit::InventoryStore;
use reconcile::{Action, Source};
use serde::Serialize;

use crate::Context;
use crate::cli::{self, PlanArgs};
use crate::engine;
use crate::ui;

#[derive(Serialize)]
struct PlanReport {
    source: Source,
    actions: Vec<Action>,
}

pub fn run(ctx: &Context, store: &InventoryStore, args: &PlanArgs) -> Result<()> {
    let sources = cli::selected_sources(&args.source);

    if args.json {
        return run_json(store, &sources);
    }

    ui::header("Restore plan");
    let mut pending = 0;

    for source in sources {
        if !store.exists(source) {
            if !ctx.quiet {
                ui::dim(&format!("{source}: no snapshot"));
            }
            continue;
        }

        let plan = match engine::plan_source(store, source) {
            Ok(plan) => plan,
            Err(e) if is_tool_missing(&e) => {
                ui::warn(&format!("{source}: {e:#}"));
                continue;
            }
            Err(e) => return Err(e),
        };

        ui::section(&source.to_string());
        if plan.actions.is_empty() {
            ui::success(&format!("up to date ({} saved entries)", plan.saved_len));
            continue;
        }

        for action in &plan.actions {
            println!("  {} {}", "+".green(), action.label());
            if ctx.verbose > 0
                && let Action::InstallEntry(entry) = action
            {
                for (key, value) in &entry.attributes {
                    println!("      {}", format!("{key}: {value}").dimmed());
                }
            }
        }
        pending += plan.actions.len();
    }

    println!();
    ui::info(&format!("{pending} action(s) pending"));
    Ok(())
}

fn run_json(store: &InventoryStore, sources: &[Source]) -> Result<()> {
    let mut reports = Vec::new();
    for &source in sources {
        if !store.exists(source) {
            continue;
        }
        let plan = engine::plan_source(store, source)?;
        reports.push(PlanReport {
            source,
            actions: plan.actions,
        });
    }
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

pub(crate) fn is_tool_missing(e: &anyhow::Error) -> bool {
    matches!(
        e.downcast_ref::<pkgkit::Error>(),
        Some(pkgkit::Error::ToolNotFound { .. } | pkgkit::Error::UnsupportedDistro { .. })
    )
}
