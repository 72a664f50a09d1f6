//! Core types for inventory reconciliation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Package ecosystem an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    /// Debian/Ubuntu APT packages
    Apt,
    /// Snap packages (snapd)
    Snap,
    /// Flatpak applications and runtimes
    Flatpak,
    /// IDE installer records (Ubuntu Make)
    IdeInstaller,
}

impl Source {
    /// All sources, in pipeline order.
    pub const ALL: [Self; 4] = [Self::Apt, Self::Snap, Self::Flatpak, Self::IdeInstaller];

    /// Stable name used for inventory file stems and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Apt => "apt",
            Source::Snap => "snap",
            Source::Flatpak => "flatpak",
            Source::IdeInstaller => "ide-installer",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Third-party repository provider recognized for APT provenance.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum RepoProvider {
    LaunchpadPpa,
    OpenSuseBuildService,
    VirtualBox,
    GoogleChrome,
    UbuntuZilla,
    YandexDisk,
}

impl std::fmt::Display for RepoProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RepoProvider::LaunchpadPpa => "Launchpad PPA",
            RepoProvider::OpenSuseBuildService => "openSUSE Build Service",
            RepoProvider::VirtualBox => "Oracle VirtualBox",
            RepoProvider::GoogleChrome => "Google Chrome",
            RepoProvider::UbuntuZilla => "UbuntuZilla",
            RepoProvider::YandexDisk => "Yandex Disk",
        };
        write!(f, "{name}")
    }
}

/// A third-party repository that must be registered before dependent
/// entries can install.
///
/// Equality and ordering are over all fields, so requirements shared by
/// several entries collapse to one registration action.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RepoRequirement {
    /// Which known provider this repository belongs to
    pub provider: RepoProvider,
    /// Stable identifier, e.g. `ppa:user/name` or a normalized repo URL
    pub id: String,
    /// sources.list line to register, when `id` is not itself a shortcut
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_line: Option<String>,
    /// GPG key fingerprint to import before the repository is trusted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
}

impl RepoRequirement {
    /// A Launchpad PPA requirement from its `ppa:user/name` shortcut.
    pub fn ppa(shortcut: impl Into<String>) -> Self {
        Self {
            provider: RepoProvider::LaunchpadPpa,
            id: shortcut.into(),
            source_line: None,
            key_id: None,
        }
    }

    /// A requirement registered through an explicit sources.list line.
    pub fn source_line(
        provider: RepoProvider,
        id: impl Into<String>,
        line: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            id: id.into(),
            source_line: Some(line.into()),
            key_id: None,
        }
    }

    /// Attach a GPG key fingerprint.
    pub fn with_key(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }
}

impl std::fmt::Display for RepoRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.provider)
    }
}

/// One installable unit from a given source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Ecosystem this entry belongs to
    pub source: Source,
    /// Name unique within the source (package, snap, app-id, umake target)
    pub identifier: String,
    /// Source-specific metadata (channel, branch, origin, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    /// Third-party repository this entry came from (APT only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<RepoRequirement>,
}

impl Entry {
    /// Create a new entry with the given source and identifier.
    pub fn new(source: Source, identifier: impl Into<String>) -> Self {
        Self {
            source,
            identifier: identifier.into(),
            attributes: BTreeMap::new(),
            provenance: None,
        }
    }

    /// Add an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Set the provenance requirement.
    pub fn with_provenance(mut self, requirement: RepoRequirement) -> Self {
        self.provenance = Some(requirement);
        self
    }

    /// Get an attribute value.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// A unit of reconciliation work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Register a third-party repository before dependent installs
    RegisterRepository(RepoRequirement),
    /// Install one missing entry
    InstallEntry(Entry),
}

impl Action {
    /// Source this action executes against. Repository registration only
    /// exists for APT.
    pub fn source(&self) -> Source {
        match self {
            Action::RegisterRepository(_) => Source::Apt,
            Action::InstallEntry(entry) => entry.source,
        }
    }

    /// Stable label used in reports and logs.
    pub fn label(&self) -> String {
        match self {
            Action::RegisterRepository(req) => format!("register {}", req.id),
            Action::InstallEntry(entry) => format!("install {}", entry.identifier),
        }
    }

    /// Whether this is a repository registration.
    pub fn is_register(&self) -> bool {
        matches!(self, Action::RegisterRepository(_))
    }
}

/// Result of executing one action. Failures are independent per action and
/// never abort the remaining actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Already satisfied, nothing executed
    Skipped { reason: String },
    /// Action executed successfully
    Installed,
    /// Action failed with the underlying manager's diagnostic
    Failed { reason: String },
}

impl Outcome {
    /// Convenience constructor for a skip.
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for a failure.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Check if the outcome represents success (no failure).
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

/// How planned actions are consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayMode {
    /// Execute each action through the source adapter
    Automatic,
    /// Render a reviewable script instead of executing anything
    ManualReview,
}

/// Summary of replaying one source's action list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplaySummary {
    pub installed: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Action label and reason for each failure
    pub failures: Vec<(String, String)>,
}

impl ReplaySummary {
    /// Record one action's outcome.
    pub fn record(&mut self, label: &str, outcome: &Outcome) {
        match outcome {
            Outcome::Installed => self.installed += 1,
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::Failed { reason } => {
                self.failed += 1;
                self.failures.push((label.to_string(), reason.clone()));
            }
        }
    }

    /// Total number of actions processed.
    pub fn total(&self) -> usize {
        self.installed + self.skipped + self.failed
    }

    /// Check if replay was fully successful (no failures).
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Merge another summary into this one.
    pub fn merge(&mut self, other: ReplaySummary) {
        self.installed += other.installed;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.failures.extend(other.failures);
    }
}
