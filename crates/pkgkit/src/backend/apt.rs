//! APT backend.
//!
//! Enumerates manually installed packages via `apt-mark showmanual`,
//! resolves each package's download origin with `apt-cache policy`, and
//! classifies third-party origins into repository requirements. Installs
//! go through `apt-get install -y`; repository registration uses
//! `add-apt-repository` plus an optional key import.

use super::{find_tool, run_checked};
use crate::classifier::{AptOrigin, ProvenanceClassifier, ProviderTable};
use crate::error::{Error, Result};
use reconcile::{Entry, Outcome, RepoRequirement, Source, SourceAdapter};

/// Keyserver used for provider key imports.
const KEYSERVER: &str = "keyserver.ubuntu.com";

/// Packages per `apt-cache policy` invocation. Keeps the command line well
/// under ARG_MAX even for large inventories.
const POLICY_CHUNK: usize = 100;

/// Identity of the running distribution, from `lsb_release`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistroInfo {
    /// Distributor ID, e.g. `Ubuntu`
    pub id: String,
    /// Release codename, e.g. `jammy`
    pub codename: String,
}

impl DistroInfo {
    /// Detect the running distribution.
    ///
    /// APT provenance replay assumes a Debian-family release; anything
    /// else is rejected up front rather than failing mid-replay.
    pub fn detect() -> Result<Self> {
        let id = run_checked("lsb_release", &["-is"])?.trim().to_string();
        let codename = run_checked("lsb_release", &["-cs"])?.trim().to_string();

        let family = id.to_lowercase();
        if !matches!(family.as_str(), "ubuntu" | "debian" | "linuxmint" | "neon" | "pop") {
            return Err(Error::UnsupportedDistro { id });
        }

        Ok(Self { id, codename })
    }
}

/// Adapter for Debian/Ubuntu APT packages.
pub struct AptAdapter {
    apt_get: String,
    apt_mark: String,
    apt_cache: String,
    add_apt_repository: Option<String>,
    apt_key: Option<String>,
    distro: DistroInfo,
    classifier: Box<dyn ProvenanceClassifier>,
}

impl AptAdapter {
    /// Resolve tool paths and detect the distribution.
    pub fn new() -> Result<Self> {
        Ok(Self {
            apt_get: find_tool("apt-get", &["/usr/bin/apt-get"])?,
            apt_mark: find_tool("apt-mark", &["/usr/bin/apt-mark"])?,
            apt_cache: find_tool("apt-cache", &["/usr/bin/apt-cache"])?,
            add_apt_repository: find_tool("add-apt-repository", &["/usr/bin/add-apt-repository"])
                .ok(),
            apt_key: find_tool("apt-key", &["/usr/bin/apt-key"]).ok(),
            distro: DistroInfo::detect()?,
            classifier: Box::new(ProviderTable::default()),
        })
    }

    /// Replace the provenance classifier.
    pub fn with_classifier(mut self, classifier: Box<dyn ProvenanceClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Detected distribution identity.
    pub fn distro(&self) -> &DistroInfo {
        &self.distro
    }

    fn enumerate_inner(&self) -> Result<Vec<Entry>> {
        let manual = run_checked(&self.apt_mark, &["showmanual"])?;
        let names = parse_manual(&manual);
        log::info!("apt: {} manually installed packages", names.len());

        let mut entries = Vec::with_capacity(names.len());
        for chunk in names.chunks(POLICY_CHUNK) {
            let mut args = vec!["policy"];
            args.extend(chunk.iter().map(String::as_str));
            let policy = run_checked(&self.apt_cache, &args)?;

            for record in parse_policy(&policy) {
                let mut entry = Entry::new(Source::Apt, &record.name);
                if let Some(version) = &record.version {
                    entry = entry.with_attr("version", version);
                }
                match &record.origin {
                    Some(origin) => {
                        entry = entry.with_attr("origin", &origin.url);
                        if let Some(req) = self.classifier.classify(&record.name, origin) {
                            entry = entry.with_provenance(req);
                        }
                    }
                    None => entry = entry.with_attr("origin", "local"),
                }
                entries.push(entry);
            }
        }

        Ok(entries)
    }

    fn register_inner(&self, requirement: &RepoRequirement) -> Result<Outcome> {
        let Some(add_apt_repository) = &self.add_apt_repository else {
            return Err(Error::ToolNotFound {
                tool: "add-apt-repository".to_string(),
            });
        };

        if let Some(key_id) = &requirement.key_id {
            match &self.apt_key {
                Some(apt_key) => {
                    run_checked(
                        apt_key,
                        &["adv", "--keyserver", KEYSERVER, "--recv-keys", key_id],
                    )?;
                }
                // apt-key is gone on recent releases; add-apt-repository
                // still handles PPA keys itself, other providers may need
                // a manual import.
                None => log::warn!("apt-key unavailable, skipping key import for {key_id}"),
            }
        }

        let repo = requirement
            .source_line
            .as_deref()
            .unwrap_or(&requirement.id);
        run_checked(add_apt_repository, &["-y", repo])?;
        run_checked(&self.apt_get, &["update"])?;

        Ok(Outcome::Installed)
    }
}

impl SourceAdapter for AptAdapter {
    fn source(&self) -> Source {
        Source::Apt
    }

    fn is_available(&self) -> bool {
        true
    }

    fn enumerate(&self) -> reconcile::Result<Vec<Entry>> {
        self.enumerate_inner()
            .map_err(|e| e.into_enumeration(Source::Apt))
    }

    fn install(&self, entry: &Entry) -> reconcile::Result<Outcome> {
        run_checked(&self.apt_get, &["install", "-y", &entry.identifier])
            .map(|_| Outcome::Installed)
            .map_err(|e| e.into_install(&entry.identifier))
    }

    fn supports_repository_setup(&self) -> bool {
        true
    }

    fn repository_requirements_for(&self, entry: &Entry) -> Vec<RepoRequirement> {
        entry.provenance.iter().cloned().collect()
    }

    fn register_repository(&self, requirement: &RepoRequirement) -> reconcile::Result<Outcome> {
        self.register_inner(requirement)
            .map_err(|e| e.into_install(&requirement.id))
    }
}

/// One package's block from `apt-cache policy` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PolicyRecord {
    pub name: String,
    pub version: Option<String>,
    pub origin: Option<AptOrigin>,
}

/// Parse `apt-mark showmanual` output into package names.
pub(crate) fn parse_manual(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Parse `apt-cache policy` output for one or more packages.
///
/// Each block starts with an unindented `name:` line. The installed
/// version's origin is the first archive line under the `***` marker in
/// the version table; packages whose only origin is the local dpkg status
/// database get no origin.
pub(crate) fn parse_policy(output: &str) -> Vec<PolicyRecord> {
    let mut records = Vec::new();
    let mut current: Option<PolicyRecord> = None;
    let mut in_installed_version = false;

    for line in output.lines() {
        if !line.starts_with(' ') && line.ends_with(':') {
            if let Some(record) = current.take() {
                records.push(record);
            }
            current = Some(PolicyRecord {
                name: line.trim_end_matches(':').to_string(),
                version: None,
                origin: None,
            });
            in_installed_version = false;
            continue;
        }

        let Some(record) = current.as_mut() else {
            continue;
        };
        let trimmed = line.trim();

        if let Some(version) = trimmed.strip_prefix("Installed:") {
            let version = version.trim();
            if version != "(none)" {
                record.version = Some(version.to_string());
            }
        } else if trimmed.starts_with("***") {
            in_installed_version = true;
        } else if in_installed_version {
            // "500 http://host/path jammy/main amd64 Packages"
            let fields: Vec<&str> = trimmed.split_whitespace().collect();
            match fields.as_slice() {
                [_priority, url, suite, ..]
                    if url.starts_with("http") || url.starts_with("ftp") =>
                {
                    record.origin = Some(AptOrigin::new(*url, *suite));
                    in_installed_version = false;
                }
                [_priority, path] if path.starts_with('/') => {
                    // local dpkg status entry, keep scanning
                }
                _ => in_installed_version = false,
            }
        }
    }

    if let Some(record) = current {
        records.push(record);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manual() {
        let output = "vlc\ngimp\n\ncurl\n";
        assert_eq!(parse_manual(output), vec!["vlc", "gimp", "curl"]);
    }

    #[test]
    fn test_parse_policy_archive_origin() {
        let output = "\
vlc:
  Installed: 3.0.16-1build7
  Candidate: 3.0.16-1build7
  Version table:
 *** 3.0.16-1build7 500
        500 http://ppa.launchpad.net/videolan/stable/ubuntu jammy/main amd64 Packages
        100 /var/lib/dpkg/status
     3.0.16-1 500
        500 http://archive.ubuntu.com/ubuntu jammy/universe amd64 Packages
";
        let records = parse_policy(output);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "vlc");
        assert_eq!(records[0].version.as_deref(), Some("3.0.16-1build7"));
        assert_eq!(
            records[0].origin,
            Some(AptOrigin::new(
                "http://ppa.launchpad.net/videolan/stable/ubuntu",
                "jammy/main"
            ))
        );
    }

    #[test]
    fn test_parse_policy_local_only_package() {
        let output = "\
mytool:
  Installed: 1.0
  Candidate: 1.0
  Version table:
 *** 1.0 100
        100 /var/lib/dpkg/status
";
        let records = parse_policy(output);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].origin, None);
    }

    #[test]
    fn test_parse_policy_status_line_before_archive() {
        // dpkg status can precede the archive line under the *** marker
        let output = "\
gimp:
  Installed: 2.10.30-1
  Candidate: 2.10.30-1
  Version table:
 *** 2.10.30-1 500
        100 /var/lib/dpkg/status
        500 https://ppa.launchpadcontent.net/gimp/edge/ubuntu jammy/main amd64 Packages
";
        let records = parse_policy(output);
        assert_eq!(
            records[0].origin,
            Some(AptOrigin::new(
                "https://ppa.launchpadcontent.net/gimp/edge/ubuntu",
                "jammy/main"
            ))
        );
    }

    #[test]
    fn test_parse_policy_multiple_packages() {
        let output = "\
vlc:
  Installed: 3.0.16
  Candidate: 3.0.16
  Version table:
 *** 3.0.16 500
        500 http://archive.ubuntu.com/ubuntu jammy/universe amd64 Packages
curl:
  Installed: 7.81.0
  Candidate: 7.81.0
  Version table:
 *** 7.81.0 500
        500 http://archive.ubuntu.com/ubuntu jammy/main amd64 Packages
";
        let records = parse_policy(output);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "vlc");
        assert_eq!(records[1].name, "curl");
    }

    #[test]
    fn test_parse_policy_not_installed() {
        let output = "\
ghost:
  Installed: (none)
  Candidate: 1.2
  Version table:
     1.2 500
        500 http://archive.ubuntu.com/ubuntu jammy/main amd64 Packages
";
        let records = parse_policy(output);
        assert_eq!(records[0].version, None);
        assert_eq!(records[0].origin, None);
    }
}
