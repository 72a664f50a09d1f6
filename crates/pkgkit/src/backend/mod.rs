//! Source adapter backends.
//!
//! One adapter per package ecosystem, each shelling out to the ecosystem's
//! own tools. Tool paths are resolved at construction so adapters carry no
//! global state.

mod apt;
mod flatpak;
mod snap;
mod umake;

pub use apt::{AptAdapter, DistroInfo};
pub use flatpak::FlatpakAdapter;
pub use snap::SnapAdapter;
pub use umake::UmakeAdapter;

use crate::error::{Error, Result};
use std::process::{Command, Output};

/// Run a command and return its output.
pub(crate) fn run(cmd: &str, args: &[&str]) -> Result<Output> {
    log::debug!("running {} {}", cmd, args.join(" "));
    Command::new(cmd)
        .args(args)
        .output()
        .map_err(|e| Error::CommandFailed {
            message: format!("failed to execute {cmd}: {e}"),
            stderr: String::new(),
        })
}

/// Run a command and return stdout, failing on a non-zero exit status.
pub(crate) fn run_checked(cmd: &str, args: &[&str]) -> Result<String> {
    let output = run(cmd, args)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::CommandFailed {
            message: format!("{cmd} {}", args.join(" ")),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Find a tool by checking candidate paths, then PATH via `which`.
pub(crate) fn find_tool(name: &str, candidates: &[&str]) -> Result<String> {
    for path in candidates {
        if std::path::Path::new(path).exists() {
            return Ok((*path).to_string());
        }
    }

    let output = Command::new("which")
        .arg(name)
        .output()
        .map_err(|_| Error::ToolNotFound {
            tool: name.to_string(),
        })?;

    if output.status.success() {
        let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !path.is_empty() {
            return Ok(path);
        }
    }

    Err(Error::ToolNotFound {
        tool: name.to_string(),
    })
}
