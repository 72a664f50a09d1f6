//! Flatpak backend.
//!
//! Apps and runtimes are enumerated separately with fixed column lists so
//! the output is stable tab-separated text regardless of the flatpak
//! version's default table layout. The configured remotes are captured
//! alongside and carried as an `origin-url` attribute on each entry, so a
//! fresh target machine can re-add the remote before installing from it.

use super::{find_tool, run_checked};
use crate::error::Result;
use reconcile::{Entry, Outcome, Source, SourceAdapter};
use std::collections::BTreeMap;

const COLUMNS: &str = "--columns=application,arch,branch,origin";

/// Adapter for Flatpak applications and runtimes.
pub struct FlatpakAdapter {
    flatpak: String,
}

impl FlatpakAdapter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            flatpak: find_tool("flatpak", &["/usr/bin/flatpak"])?,
        })
    }

    fn enumerate_inner(&self) -> Result<Vec<Entry>> {
        let remotes = run_checked(&self.flatpak, &["remotes", "--columns=name,url"])?;
        let remote_urls = parse_remotes(&remotes);

        let apps = run_checked(&self.flatpak, &["list", "--app", COLUMNS])?;
        let runtimes = run_checked(&self.flatpak, &["list", "--runtime", COLUMNS])?;

        let mut entries = parse_list(&apps, "app");
        entries.extend(parse_list(&runtimes, "runtime"));
        attach_remote_urls(&mut entries, &remote_urls);
        log::info!("flatpak: {} installed refs", entries.len());
        Ok(entries)
    }
}

impl SourceAdapter for FlatpakAdapter {
    fn source(&self) -> Source {
        Source::Flatpak
    }

    fn is_available(&self) -> bool {
        true
    }

    fn enumerate(&self) -> reconcile::Result<Vec<Entry>> {
        self.enumerate_inner()
            .map_err(|e| e.into_enumeration(Source::Flatpak))
    }

    fn install(&self, entry: &Entry) -> reconcile::Result<Outcome> {
        // A fresh machine has no remotes configured; re-add the entry's
        // remote before installing from it.
        if let (Some(origin), Some(url)) = (entry.attr("origin"), entry.attr("origin-url")) {
            run_checked(&self.flatpak, &["remote-add", "--if-not-exists", origin, url])
                .map_err(|e| e.into_install(&entry.identifier))?;
        }

        let target = match entry.attr("branch") {
            Some(branch) => format!("{}//{branch}", entry.identifier),
            None => entry.identifier.clone(),
        };

        let mut args = vec!["install", "-y"];
        if let Some(origin) = entry.attr("origin") {
            args.push(origin);
        }
        args.push(&target);

        run_checked(&self.flatpak, &args)
            .map(|_| Outcome::Installed)
            .map_err(|e| e.into_install(&entry.identifier))
    }
}

/// Parse one `flatpak list --columns=application,arch,branch,origin` run.
pub(crate) fn parse_list(output: &str, kind: &str) -> Vec<Entry> {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
            let [application, arch, branch, origin] = fields.as_slice() else {
                return None;
            };
            if application.is_empty() {
                return None;
            }

            Some(
                Entry::new(Source::Flatpak, *application)
                    .with_attr("kind", kind)
                    .with_attr("arch", *arch)
                    .with_attr("branch", *branch)
                    .with_attr("origin", *origin),
            )
        })
        .collect()
}

/// Parse `flatpak remotes --columns=name,url` into a name to URL map.
pub(crate) fn parse_remotes(output: &str) -> BTreeMap<String, String> {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
            let [name, url] = fields.as_slice() else {
                return None;
            };
            if name.is_empty() {
                return None;
            }
            Some(((*name).to_string(), (*url).to_string()))
        })
        .collect()
}

/// Record each entry's remote URL so the install side can re-add it.
pub(crate) fn attach_remote_urls(entries: &mut [Entry], remotes: &BTreeMap<String, String>) {
    for entry in entries {
        let url = entry.attr("origin").and_then(|o| remotes.get(o)).cloned();
        if let Some(url) = url {
            entry.attributes.insert("origin-url".to_string(), url);
        }
    }
}
