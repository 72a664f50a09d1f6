//! Ubuntu Make backend for IDE and developer tool installs.
//!
//! `umake --list-available` prints categories at column zero and their
//! tools indented beneath, with an `[installed]` marker on tools already
//! present. Installs replay as `umake <category> <tool>`.

use super::{find_tool, run_checked};
use crate::error::{Error, Result};
use reconcile::{Entry, Outcome, Source, SourceAdapter};
use regex::Regex;

/// Adapter for Ubuntu Make installed developer tools.
pub struct UmakeAdapter {
    umake: String,
}

impl UmakeAdapter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            umake: find_tool("umake", &["/usr/bin/umake", "/snap/bin/umake"])?,
        })
    }

    fn enumerate_inner(&self) -> Result<Vec<Entry>> {
        let output = run_checked(&self.umake, &["--list-available"])?;
        let entries = parse_available(&output)?;
        log::info!("umake: {} installed tools", entries.len());
        Ok(entries)
    }
}

impl SourceAdapter for UmakeAdapter {
    fn source(&self) -> Source {
        Source::IdeInstaller
    }

    fn is_available(&self) -> bool {
        true
    }

    fn enumerate(&self) -> reconcile::Result<Vec<Entry>> {
        self.enumerate_inner()
            .map_err(|e| e.into_enumeration(Source::IdeInstaller))
    }

    fn install(&self, entry: &Entry) -> reconcile::Result<Outcome> {
        let Some(category) = entry.attr("category") else {
            return Err(reconcile::Error::Install {
                identifier: entry.identifier.clone(),
                message: "entry has no category attribute".to_string(),
            });
        };

        run_checked(&self.umake, &[category, &entry.identifier])
            .map(|_| Outcome::Installed)
            .map_err(|e| e.into_install(&entry.identifier))
    }
}

/// Parse `umake --list-available` output, keeping installed tools only.
///
/// The marker varies across umake versions between `[installed]`,
/// `[partially installed]` and `[fully installed]`; all three count.
pub(crate) fn parse_available(output: &str) -> Result<Vec<Entry>> {
    let installed = Regex::new(r"\[(?:partially |fully )?installed\]").map_err(|e| Error::Parse {
        message: format!("installed marker pattern: {e}"),
    })?;

    let mut entries = Vec::new();
    let mut category: Option<String> = None;

    for line in output.lines() {
        if line.is_empty() {
            continue;
        }

        if !line.starts_with(['\t', ' ']) {
            category = line.split(':').next().map(|c| c.trim().to_string());
            continue;
        }

        if !installed.is_match(line) {
            continue;
        }
        let Some(name) = line.trim().split(':').next() else {
            continue;
        };
        let Some(category) = &category else {
            return Err(Error::Parse {
                message: format!("tool line before any category: {}", line.trim()),
            });
        };

        entries.push(
            Entry::new(Source::IdeInstaller, name.trim()).with_attr("category", category),
        );
    }

    Ok(entries)
}
