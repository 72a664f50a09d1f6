use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use reconcile::Source;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pkgport")]
#[command(version)]
#[command(about = "Save and restore installed software lists across machines", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Directory holding inventory snapshots
    #[arg(long, global = true, env = "PKGPORT_DIR", value_name = "DIR")]
    pub dir: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Snapshot installed software on this machine
    Capture(CaptureArgs),

    /// Show what a restore would install, without changing anything
    Plan(PlanArgs),

    /// Install everything in the snapshots that is missing here
    Restore(RestoreArgs),

    /// Write reviewable install scripts instead of executing anything
    Script(ScriptArgs),

    /// Check package manager availability and snapshot health
    Doctor,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct CaptureArgs {
    /// Only capture these sources (default: all available)
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pub source: Vec<SourceArg>,
}

#[derive(Parser)]
pub struct PlanArgs {
    /// Only plan these sources (default: all with a snapshot)
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pub source: Vec<SourceArg>,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct RestoreArgs {
    /// Only restore these sources (default: all with a snapshot)
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pub source: Vec<SourceArg>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Register APT repositories and install without manual review
    #[arg(long)]
    pub apt_unattended: bool,

    /// Directory for manual-review scripts (default: the snapshot directory)
    #[arg(long, value_name = "DIR")]
    pub script_dir: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ScriptArgs {
    /// Only script these sources (default: all with a snapshot)
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pub source: Vec<SourceArg>,

    /// Directory to write the scripts into
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SourceArg {
    Apt,
    Snap,
    Flatpak,
    Ide,
}

impl From<SourceArg> for Source {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Apt => Self::Apt,
            SourceArg::Snap => Self::Snap,
            SourceArg::Flatpak => Self::Flatpak,
            SourceArg::Ide => Self::IdeInstaller,
        }
    }
}

/// Resolve a source selection, defaulting to all sources.
pub fn selected_sources(args: &[SourceArg]) -> Vec<Source> {
    if args.is_empty() {
        Source::ALL.to_vec()
    } else {
        let mut sources: Vec<Source> = args.iter().map(|&a| a.into()).collect();
        sources.dedup();
        sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_sources_default_is_all() {
        assert_eq!(selected_sources(&[]), Source::ALL.to_vec());
    }

    #[test]
    fn test_selected_sources_explicit() {
        let sources = selected_sources(&[SourceArg::Snap, SourceArg::Ide]);
        assert_eq!(sources, vec![Source::Snap, Source::IdeInstaller]);
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
