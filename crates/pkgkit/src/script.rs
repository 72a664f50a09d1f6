//! Manual-review script rendering.
//!
//! Instead of executing planned actions, render them as a bash script the
//! operator reads and runs themselves. Every action becomes its own line
//! so unwanted installs can be deleted before running. Rendering is pure
//! text, nothing here touches the system.

use reconcile::{Action, Entry, RepoRequirement, Source};
use std::collections::BTreeSet;

const KEYSERVER: &str = "keyserver.ubuntu.com";

/// Render one source's planned actions as a reviewable bash script.
///
/// For APT, `codename` adds a release guard at the top so a script
/// captured on one release refuses to run on another, and a single
/// `apt-get update` separates repository registrations from installs.
pub fn render_script(source: Source, actions: &[Action], codename: Option<&str>) -> String {
    let mut lines = vec![
        "#!/bin/bash".to_string(),
        format!("# Planned {source} actions. Review before running;"),
        "# delete any line you do not want executed.".to_string(),
        String::new(),
    ];

    if let Some(codename) = codename {
        lines.push(format!(
            "if ! lsb_release -cs | grep -q '{codename}'; then"
        ));
        lines.push(format!(
            "    echo \"this script was captured on '{codename}'\" >&2"
        ));
        lines.push("    exit 1".to_string());
        lines.push("fi".to_string());
        lines.push(String::new());
    }

    let (registers, installs): (Vec<&Action>, Vec<&Action>) =
        actions.iter().partition(|a| a.is_register());

    for action in &registers {
        if let Action::RegisterRepository(req) = action {
            lines.extend(render_register(req));
        }
    }
    if !registers.is_empty() {
        lines.push("sudo apt-get update".to_string());
        lines.push(String::new());
    }

    let remotes = remote_add_lines(&installs);
    if !remotes.is_empty() {
        lines.extend(remotes);
        lines.push(String::new());
    }

    for action in &installs {
        if let Action::InstallEntry(entry) = action {
            lines.push(render_install(entry));
        }
    }

    let mut script = lines.join("\n");
    script.push('\n');
    script
}

/// One `flatpak remote-add` line per distinct remote the installs pull
/// from, so the script works on a machine with no remotes configured.
fn remote_add_lines(installs: &[&Action]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut lines = Vec::new();
    for action in installs {
        if let Action::InstallEntry(entry) = action
            && let (Some(origin), Some(url)) = (entry.attr("origin"), entry.attr("origin-url"))
            && seen.insert(origin.to_string())
        {
            lines.push(format!("flatpak remote-add --if-not-exists {origin} {url}"));
        }
    }
    lines
}

fn render_register(req: &RepoRequirement) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(key_id) = &req.key_id {
        lines.push(format!(
            "sudo apt-key adv --keyserver {KEYSERVER} --recv-keys {key_id}"
        ));
    }
    let repo = req.source_line.as_deref().unwrap_or(&req.id);
    lines.push(format!("sudo add-apt-repository -y '{repo}'"));
    lines
}

fn render_install(entry: &Entry) -> String {
    match entry.source {
        Source::Apt => format!("sudo apt-get install -y {}", entry.identifier),
        Source::Snap => {
            let mut line = format!("sudo snap install {}", entry.identifier);
            if let Some(channel) = entry.attr("channel") {
                line.push_str(&format!(" --channel={channel}"));
            }
            if entry.attr("classic") == Some("true") {
                line.push_str(" --classic");
            }
            line
        }
        Source::Flatpak => {
            let origin = entry.attr("origin").unwrap_or("flathub");
            match entry.attr("branch") {
                Some(branch) => {
                    format!("flatpak install -y {origin} {}//{branch}", entry.identifier)
                }
                None => format!("flatpak install -y {origin} {}", entry.identifier),
            }
        }
        Source::IdeInstaller => match entry.attr("category") {
            Some(category) => format!("umake {category} {}", entry.identifier),
            None => format!("umake {}", entry.identifier),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::RepoProvider;

    #[test]
    fn test_apt_script_with_guard_and_update() {
        let actions = vec![
            Action::RegisterRepository(RepoRequirement::ppa("ppa:videolan/stable")),
            Action::InstallEntry(Entry::new(Source::Apt, "vlc")),
            Action::InstallEntry(Entry::new(Source::Apt, "curl")),
        ];

        let script = render_script(Source::Apt, &actions, Some("jammy"));
        assert!(script.starts_with("#!/bin/bash\n"));
        assert!(script.contains("if ! lsb_release -cs | grep -q 'jammy'; then"));
        assert!(script.contains("sudo add-apt-repository -y 'ppa:videolan/stable'"));
        assert!(script.contains("sudo apt-get install -y vlc\n"));
        assert!(script.contains("sudo apt-get install -y curl\n"));

        // one update between registrations and installs
        assert_eq!(script.matches("sudo apt-get update").count(), 1);
        let update = script.find("sudo apt-get update").unwrap();
        assert!(script.find("add-apt-repository").unwrap() < update);
        assert!(update < script.find("install -y vlc").unwrap());
    }

    #[test]
    fn test_register_with_key_import() {
        let req = RepoRequirement::source_line(
            RepoProvider::VirtualBox,
            "https://download.virtualbox.org/virtualbox/debian",
            "deb https://download.virtualbox.org/virtualbox/debian jammy contrib",
        )
        .with_key("A2F683C52980AECF");

        let lines = render_register(&req);
        assert_eq!(
            lines,
            vec![
                "sudo apt-key adv --keyserver keyserver.ubuntu.com --recv-keys A2F683C52980AECF"
                    .to_string(),
                "sudo add-apt-repository -y 'deb https://download.virtualbox.org/virtualbox/debian jammy contrib'"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_snap_install_line() {
        let classic = Entry::new(Source::Snap, "code")
            .with_attr("channel", "latest/stable")
            .with_attr("classic", "true");
        assert_eq!(
            render_install(&classic),
            "sudo snap install code --channel=latest/stable --classic"
        );

        let plain = Entry::new(Source::Snap, "firefox");
        assert_eq!(render_install(&plain), "sudo snap install firefox");
    }

    #[test]
    fn test_flatpak_and_umake_install_lines() {
        let app = Entry::new(Source::Flatpak, "org.gimp.GIMP")
            .with_attr("origin", "flathub")
            .with_attr("branch", "stable");
        assert_eq!(
            render_install(&app),
            "flatpak install -y flathub org.gimp.GIMP//stable"
        );

        let tool = Entry::new(Source::IdeInstaller, "idea").with_attr("category", "ide");
        assert_eq!(render_install(&tool), "umake ide idea");
    }

    #[test]
    fn test_flatpak_script_adds_missing_remotes() {
        let flathub = |id: &str| {
            Action::InstallEntry(
                Entry::new(Source::Flatpak, id)
                    .with_attr("origin", "flathub")
                    .with_attr("origin-url", "https://dl.flathub.org/repo/")
                    .with_attr("branch", "stable"),
            )
        };
        let actions = vec![flathub("org.gimp.GIMP"), flathub("com.spotify.Client")];

        let script = render_script(Source::Flatpak, &actions, None);
        // one remote-add per distinct remote, before any install
        assert_eq!(
            script
                .matches("flatpak remote-add --if-not-exists flathub https://dl.flathub.org/repo/")
                .count(),
            1
        );
        let remote = script.find("remote-add").unwrap();
        assert!(remote < script.find("flatpak install -y flathub org.gimp.GIMP//stable").unwrap());
    }

    #[test]
    fn test_no_guard_or_update_without_registers() {
        let actions = vec![Action::InstallEntry(Entry::new(Source::Snap, "firefox"))];
        let script = render_script(Source::Snap, &actions, None);
        assert!(!script.contains("lsb_release"));
        assert!(!script.contains("apt-get update"));
        assert!(script.contains("sudo snap install firefox\n"));
    }
}
