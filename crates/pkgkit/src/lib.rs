//! # pkgkit
//!
//! Package source backends for pkgport. Each backend implements the
//! engine's [`SourceAdapter`] trait for one ecosystem (APT, Snap, Flatpak,
//! Ubuntu Make), plus inventory persistence and manual-review script
//! rendering.
//!
//! [`SourceAdapter`]: reconcile::SourceAdapter

pub mod backend;
pub mod classifier;
pub mod error;
pub mod script;
pub mod store;

// Re-export main types at crate root
pub use backend::{AptAdapter, DistroInfo, FlatpakAdapter, SnapAdapter, UmakeAdapter};
pub use classifier::{AptOrigin, ProvenanceClassifier, ProviderTable};
pub use error::{Error, Result};
pub use script::render_script;
pub use store::InventoryStore;
