use anyhow::Result;
use pkgkit::InventoryStore;
use rayon::prelude::*;
use reconcile::Source;
use std::path::PathBuf;

use crate::Context;
use crate::cli::{self, CaptureArgs};
use crate::engine;
use crate::ui;

enum CaptureResult {
    Saved { count: usize, path: PathBuf },
    Skipped { reason: String },
}

pub fn run(ctx: &Context, store: &InventoryStore, args: &CaptureArgs) -> Result<()> {
    let sources = cli::selected_sources(&args.source);
    ui::header("Capturing installed software");

    // Sources are independent; enumerate them in parallel and report in
    // the selection order.
    let results: Vec<(Source, Result<CaptureResult>)> = sources
        .par_iter()
        .map(|&source| (source, capture_one(store, source)))
        .collect();

    let mut failures = 0;
    for (source, result) in results {
        match result {
            Ok(CaptureResult::Saved { count, path }) => {
                ui::success(&format!("{source}: {count} entries -> {}", path.display()));
            }
            Ok(CaptureResult::Skipped { reason }) => {
                if !ctx.quiet {
                    ui::dim(&format!("{source}: {reason}"));
                }
            }
            Err(e) => {
                failures += 1;
                ui::error(&format!("{source}: {e:#}"));
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} source(s) failed to capture");
    }
    Ok(())
}

fn capture_one(store: &InventoryStore, source: Source) -> Result<CaptureResult> {
    let handle = match engine::build_adapter(source) {
        Ok(handle) => handle,
        Err(
            e @ (pkgkit::Error::ToolNotFound { .. } | pkgkit::Error::UnsupportedDistro { .. }),
        ) => {
            return Ok(CaptureResult::Skipped {
                reason: e.to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let (inventory, path) = engine::capture_source(store, &handle)?;
    Ok(CaptureResult::Saved {
        count: inventory.len(),
        path,
    })
}
