use anyhow::Result;
use colored::Colorize;
use pkgkit::InventoryStore;
use reconcile::Source;

use crate::Context;
use crate::engine;
use crate::ui;

pub fn run(_ctx: &Context, store: &InventoryStore) -> Result<()> {
    ui::header("pkgport health check");

    ui::section("Package Managers");
    let mut available = 0;
    for source in Source::ALL {
        match engine::build_adapter(source) {
            Ok(_) => {
                println!("  {} {}", "✓".green(), source);
                available += 1;
            }
            Err(e) => {
                println!("  {} {} - {}", "○".dimmed(), source, e.to_string().dimmed());
            }
        }
    }

    ui::section("Snapshots");
    ui::kv("directory", &store.dir().display().to_string());
    for source in Source::ALL {
        if !store.exists(source) {
            println!("  {} {} - {}", "○".dimmed(), source, "no snapshot".dimmed());
            continue;
        }
        match store.load(source) {
            Ok(inventory) => {
                let age_days = chrono::Utc::now()
                    .signed_duration_since(inventory.captured_at)
                    .num_days();
                println!(
                    "  {} {} - {} entries, captured {}",
                    "✓".green(),
                    source,
                    inventory.len(),
                    if age_days == 0 {
                        "today".to_string()
                    } else {
                        format!("{age_days} day(s) ago")
                    }
                );
            }
            Err(e) => {
                println!("  {} {} - unreadable: {e}", "⚠".yellow(), source);
            }
        }
    }

    println!();
    if available == 0 {
        ui::warn("no package managers available on this machine");
    } else {
        ui::success(&format!(
            "{available} of {} package managers available",
            Source::ALL.len()
        ));
    }
    Ok(())
}
