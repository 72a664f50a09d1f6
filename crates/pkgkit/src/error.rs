//! Error types for backend and storage operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from package source backends and inventory storage.
#[derive(Debug, Error)]
pub enum Error {
    /// Required command-line tool is not installed or not in PATH
    #[error("'{tool}' not found. Install it to enable this source")]
    ToolNotFound {
        /// Name of the missing tool
        tool: String,
    },

    /// Command execution failed
    #[error("command failed: {message}")]
    CommandFailed {
        /// Description of what command failed
        message: String,
        /// Standard error output from the failed command
        stderr: String,
    },

    /// Unexpected output from a package manager query
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Running distribution is not in the Debian/Ubuntu family
    #[error(
        "unsupported distribution '{id}'. Only Debian-family distributions \
         (Debian, Ubuntu, Linux Mint, KDE neon, Pop!_OS) are supported"
    )]
    UnsupportedDistro { id: String },

    /// Saved inventory has no file for this source yet
    #[error("no saved inventory at {0}. Run 'capture' first")]
    InventoryNotFound(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Convert into the engine's enumeration error for one source.
    pub fn into_enumeration(self, source: reconcile::Source) -> reconcile::Error {
        reconcile::Error::Enumeration {
            origin: source,
            message: self.to_string(),
        }
    }

    /// Convert into the engine's install error for one entry.
    pub fn into_install(self, identifier: &str) -> reconcile::Error {
        reconcile::Error::Install {
            identifier: identifier.to_string(),
            message: self.to_string(),
        }
    }
}

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_distro_names_the_accepted_family() {
        let err = Error::UnsupportedDistro {
            id: "Fedora".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("'Fedora'"));
        for distro in ["Debian", "Ubuntu", "Linux Mint", "KDE neon", "Pop!_OS"] {
            assert!(message.contains(distro), "message should mention {distro}");
        }
    }
}
