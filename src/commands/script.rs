use anyhow::Result;
use pkgkit::{InventoryStore, render_script};
use std::fs;
use std::path::Path;

use crate::Context;
use crate::cli::{self, ScriptArgs};
use crate::commands::plan::is_tool_missing;
use crate::engine;
use crate::ui;

pub fn run(ctx: &Context, store: &InventoryStore, args: &ScriptArgs) -> Result<()> {
    let sources = cli::selected_sources(&args.source);
    ui::header("Rendering install scripts");

    let mut written = 0;
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

        if plan.actions.is_empty() {
            ui::success(&format!("{source}: up to date, no script needed"));
            continue;
        }

        let script = render_script(source, &plan.actions, plan.handle.codename.as_deref());
        fs::create_dir_all(&args.output)?;
        let path = args.output.join(format!("{source}.sh"));
        write_executable(&path, &script)?;
        ui::success(&format!(
            "{source}: {} action(s) -> {}",
            plan.actions.len(),
            path.display()
        ));
        written += 1;
    }

    if written == 0 && !ctx.quiet {
        println!();
        ui::info("nothing to script");
    }
    Ok(())
}

/// Write a script and mark it executable.
pub fn write_executable(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    }
    Ok(())
}
