//! # reconcile
//!
//! Inventory reconciliation and replay engine.
//!
//! Captures a normalized, deduplicated list of installed items per package
//! source, diffs it against a target machine's live state, and orders the
//! resulting install actions so source-specific preconditions hold
//! (third-party repository registration before dependent installs).
//!
//! ## Pipeline
//!
//! ```text
//! SourceAdapter -> Inventory (capture)
//! saved + live Inventory -> reconcile -> Vec<Action>
//! Vec<Action> -> sequence -> ordered Vec<Action>
//! ordered Vec<Action> -> replay -> ReplaySummary
//! ```
//!
//! Everything backend-specific lives behind the [`SourceAdapter`] trait;
//! this crate never spawns processes or touches the filesystem.

pub mod adapter;
pub mod error;
pub mod inventory;
pub mod reconciler;
pub mod replay;
pub mod sequencer;
pub mod types;

// Re-export main types at crate root
pub use adapter::{BoxedAdapter, NoObserver, ReplayObserver, SourceAdapter};
pub use error::{Error, Result};
pub use inventory::{Inventory, capture};
pub use reconciler::reconcile;
pub use replay::replay;
pub use sequencer::{parallel_stages, sequence};
pub use types::{
    Action, Entry, Outcome, RepoProvider, RepoRequirement, ReplayMode, ReplaySummary, Source,
};
