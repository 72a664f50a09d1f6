//! Snap backend.
//!
//! Enumerates via `snap list` and installs with `snap install`, carrying
//! the tracked channel and classic confinement through the inventory so a
//! replayed install lands on the same channel.

use super::{find_tool, run_checked};
use crate::error::Result;
use reconcile::{Entry, Outcome, Source, SourceAdapter};

/// Adapter for snapd packages.
pub struct SnapAdapter {
    snap: String,
}

impl SnapAdapter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            snap: find_tool("snap", &["/usr/bin/snap", "/snap/bin/snap"])?,
        })
    }

    fn enumerate_inner(&self) -> Result<Vec<Entry>> {
        let output = run_checked(&self.snap, &["list"])?;
        let entries = parse_list(&output);
        log::info!("snap: {} installed snaps", entries.len());
        Ok(entries)
    }
}

impl SourceAdapter for SnapAdapter {
    fn source(&self) -> Source {
        Source::Snap
    }

    fn is_available(&self) -> bool {
        true
    }

    fn enumerate(&self) -> reconcile::Result<Vec<Entry>> {
        self.enumerate_inner()
            .map_err(|e| e.into_enumeration(Source::Snap))
    }

    fn install(&self, entry: &Entry) -> reconcile::Result<Outcome> {
        let mut args = vec!["install".to_string(), entry.identifier.clone()];
        if let Some(channel) = entry.attr("channel") {
            args.push(format!("--channel={channel}"));
        }
        if entry.attr("classic") == Some("true") {
            args.push("--classic".to_string());
        }

        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run_checked(&self.snap, &args)
            .map(|_| Outcome::Installed)
            .map_err(|e| e.into_install(&entry.identifier))
    }
}

/// Parse `snap list` output.
///
/// Columns are Name, Version, Rev, Tracking, Publisher, Notes. The header
/// row is skipped; the channel comes from Tracking and classic confinement
/// from the Notes column.
pub(crate) fn parse_list(output: &str) -> Vec<Entry> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let [name, version, revision, tracking, _publisher, rest @ ..] = fields.as_slice()
            else {
                return None;
            };

            let mut entry = Entry::new(Source::Snap, *name)
                .with_attr("version", *version)
                .with_attr("revision", *revision)
                .with_attr("channel", *tracking);
            if rest.iter().any(|notes| notes.split(',').any(|n| n == "classic")) {
                entry = entry.with_attr("classic", "true");
            }
            Some(entry)
        })
        .collect()
}
