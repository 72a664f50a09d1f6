//! Error taxonomy for the reconciliation engine.
//!
//! Per-action install failures are recovered into [`Outcome::Failed`] by the
//! replay driver and reported in the final summary; the variants here are the
//! structural errors that abort a single source's pipeline.
//!
//! [`Outcome::Failed`]: crate::types::Outcome

use crate::types::Source;
use thiserror::Error;

/// Errors from the reconciliation engine.
#[derive(Debug, Error)]
pub enum Error {
    /// The adapter could not list installed items; aborts this source's
    /// capture.
    #[error("failed to enumerate {origin} packages: {message}")]
    Enumeration {
        /// Source whose enumeration failed
        origin: Source,
        /// Diagnostic from the underlying package manager
        message: String,
    },

    /// One install action failed. Carries the underlying manager's
    /// diagnostic; the replay driver converts this into a failed outcome.
    #[error("install failed for {identifier}: {message}")]
    Install {
        /// Identifier of the entry that failed to install
        identifier: String,
        /// Diagnostic from the underlying package manager
        message: String,
    },

    /// A saved or live inventory contains a malformed entry; aborts
    /// planning for this source.
    #[error("malformed inventory: {message}")]
    Reconciliation { message: String },

    /// Dependency cycle while ordering actions. Defensive: the action graph
    /// is acyclic by construction (requirements never depend on installs).
    #[error("dependency cycle while ordering actions: {message}")]
    Sequencing { message: String },
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
