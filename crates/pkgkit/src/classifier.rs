//! Provenance classifier for APT download origins.
//!
//! The original heuristic matched package origins against a fixed set of
//! third-party providers by URL substrings. That rule set lives here as a
//! data table behind a trait, so the provider list can grow without
//! touching the APT adapter.

use regex::Regex;
use reconcile::{RepoProvider, RepoRequirement};

/// Where an installed APT package was downloaded from, as reported by
/// `apt-cache policy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AptOrigin {
    /// Repository base URL
    pub url: String,
    /// Suite/component token, e.g. `jammy/main` or `./` for flat repos
    pub suite: String,
}

impl AptOrigin {
    pub fn new(url: impl Into<String>, suite: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            suite: suite.into(),
        }
    }

    /// Render the sources.list line that registers this origin.
    pub fn source_line(&self) -> String {
        // "jammy/main" becomes the "jammy main" suite+component pair;
        // flat repos keep their "./" suite.
        let suite = self.suite.replace('/', " ");
        format!("deb {} {}", self.url, suite.trim())
    }
}

/// Maps a package's download origin to the third-party repository that must
/// be registered before the package can install.
pub trait ProvenanceClassifier: Send + Sync {
    /// Classify one origin; `None` means official or local origin.
    fn classify(&self, package: &str, origin: &AptOrigin) -> Option<RepoRequirement>;
}

struct ProviderRule {
    provider: RepoProvider,
    pattern: Regex,
    /// Well-known signing key to import, where the provider has one
    key_id: Option<&'static str>,
}

/// Default classifier covering the known third-party providers.
pub struct ProviderTable {
    ppa: Regex,
    rules: Vec<ProviderRule>,
}

impl Default for ProviderTable {
    fn default() -> Self {
        let rule = |provider, pattern: &str, key_id| ProviderRule {
            provider,
            pattern: Regex::new(pattern).expect("static provider pattern"),
            key_id,
        };

        Self {
            ppa: Regex::new(r"ppa\.launchpad(?:content)?\.net/([^/]+)/([^/]+)")
                .expect("static ppa pattern"),
            rules: vec![
                rule(
                    RepoProvider::OpenSuseBuildService,
                    r"download\.opensuse\.org/repositories/",
                    None,
                ),
                rule(
                    RepoProvider::VirtualBox,
                    r"virtualbox\.org",
                    Some("A2F683C52980AECF"),
                ),
                rule(
                    RepoProvider::GoogleChrome,
                    r"dl\.google\.com/linux",
                    Some("EB4C1BFD4F042F6DDDCCEC917721F63BD38B4796"),
                ),
                rule(RepoProvider::UbuntuZilla, r"ubuntuzilla", Some("C1289A29")),
                rule(RepoProvider::YandexDisk, r"repo\.yandex\.", None),
            ],
        }
    }
}

impl ProvenanceClassifier for ProviderTable {
    fn classify(&self, package: &str, origin: &AptOrigin) -> Option<RepoRequirement> {
        if let Some(captures) = self.ppa.captures(&origin.url) {
            let shortcut = format!("ppa:{}/{}", &captures[1], &captures[2]);
            log::debug!("{package}: origin {} is {shortcut}", origin.url);
            return Some(RepoRequirement::ppa(shortcut));
        }

        for rule in &self.rules {
            if rule.pattern.is_match(&origin.url) {
                log::debug!("{package}: origin {} is {}", origin.url, rule.provider);
                let mut requirement = RepoRequirement::source_line(
                    rule.provider,
                    origin.url.trim_end_matches('/'),
                    origin.source_line(),
                );
                if let Some(key) = rule.key_id {
                    requirement = requirement.with_key(key);
                }
                return Some(requirement);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(url: &str, suite: &str) -> Option<RepoRequirement> {
        ProviderTable::default().classify("pkg", &AptOrigin::new(url, suite))
    }

    #[test]
    fn test_ppa_shortcut_extraction() {
        let req = classify(
            "http://ppa.launchpad.net/otto-kesselgulasch/gimp/ubuntu",
            "jammy/main",
        )
        .unwrap();
        assert_eq!(req.provider, RepoProvider::LaunchpadPpa);
        assert_eq!(req.id, "ppa:otto-kesselgulasch/gimp");
        assert!(req.source_line.is_none());
    }

    #[test]
    fn test_ppa_launchpadcontent_host() {
        let req = classify(
            "https://ppa.launchpadcontent.net/mozillateam/ppa/ubuntu",
            "jammy/main",
        )
        .unwrap();
        assert_eq!(req.id, "ppa:mozillateam/ppa");
    }

    #[test]
    fn test_google_chrome_origin() {
        let req = classify("https://dl.google.com/linux/chrome/deb", "stable/main").unwrap();
        assert_eq!(req.provider, RepoProvider::GoogleChrome);
        assert_eq!(
            req.source_line.as_deref(),
            Some("deb https://dl.google.com/linux/chrome/deb stable main")
        );
        assert!(req.key_id.is_some());
    }

    #[test]
    fn test_obs_flat_repo() {
        let req = classify(
            "https://download.opensuse.org/repositories/home:/someone/xUbuntu_22.04",
            "./",
        )
        .unwrap();
        assert_eq!(req.provider, RepoProvider::OpenSuseBuildService);
        assert_eq!(
            req.source_line.as_deref(),
            Some("deb https://download.opensuse.org/repositories/home:/someone/xUbuntu_22.04 ./")
        );
        assert!(req.key_id.is_none());
    }

    #[test]
    fn test_virtualbox_and_yandex() {
        let vbox = classify("https://download.virtualbox.org/virtualbox/debian", "jammy/contrib")
            .unwrap();
        assert_eq!(vbox.provider, RepoProvider::VirtualBox);

        let yandex = classify("http://repo.yandex.ru/yandex-disk/deb", "stable/main").unwrap();
        assert_eq!(yandex.provider, RepoProvider::YandexDisk);
    }

    #[test]
    fn test_official_origin_is_unclassified() {
        assert!(classify("http://archive.ubuntu.com/ubuntu", "jammy/main").is_none());
        assert!(classify("http://deb.debian.org/debian", "bookworm/main").is_none());
    }

    #[test]
    fn test_shared_origin_classifies_identically() {
        let a = classify("http://ppa.launchpad.net/team/tools/ubuntu", "jammy/main").unwrap();
        let b = classify("http://ppa.launchpad.net/team/tools/ubuntu", "jammy/main").unwrap();
        assert_eq!(a, b);
    }
}
