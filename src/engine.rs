//! Wires the backends, the snapshot store and the reconciliation engine
//! together for the commands.

use anyhow::{Context as _, Result};
use pkgkit::{AptAdapter, FlatpakAdapter, InventoryStore, SnapAdapter, UmakeAdapter};
use reconcile::{Action, BoxedAdapter, Inventory, Source, capture, reconcile, sequence};
use std::path::PathBuf;

/// A constructed backend plus the metadata commands need alongside it.
pub struct AdapterHandle {
    pub adapter: BoxedAdapter,
    /// Release codename for script guards, APT only
    pub codename: Option<String>,
}

/// Build the backend for one source.
///
/// Fails with [`pkgkit::Error::ToolNotFound`] when the ecosystem's tool is
/// not installed; callers decide whether that is a skip or an error.
pub fn build_adapter(source: Source) -> pkgkit::Result<AdapterHandle> {
    match source {
        Source::Apt => {
            let adapter = AptAdapter::new()?;
            let codename = Some(adapter.distro().codename.clone());
            Ok(AdapterHandle {
                adapter: Box::new(adapter),
                codename,
            })
        }
        Source::Snap => Ok(AdapterHandle {
            adapter: Box::new(SnapAdapter::new()?),
            codename: None,
        }),
        Source::Flatpak => Ok(AdapterHandle {
            adapter: Box::new(FlatpakAdapter::new()?),
            codename: None,
        }),
        Source::IdeInstaller => Ok(AdapterHandle {
            adapter: Box::new(UmakeAdapter::new()?),
            codename: None,
        }),
    }
}

/// Capture one source's live state and write its snapshot file.
pub fn capture_source(
    store: &InventoryStore,
    handle: &AdapterHandle,
) -> Result<(Inventory, PathBuf)> {
    let inventory = capture(handle.adapter.as_ref())?;
    let path = store
        .save(&inventory)
        .with_context(|| format!("saving {} snapshot", inventory.source))?;
    Ok((inventory, path))
}

/// Everything needed to restore or script one source.
pub struct SourcePlan {
    pub source: Source,
    pub handle: AdapterHandle,
    pub actions: Vec<Action>,
    /// Entry count in the saved snapshot, for reporting
    pub saved_len: usize,
}

/// Plan one source: load its snapshot, capture live state, diff and order.
pub fn plan_source(store: &InventoryStore, source: Source) -> Result<SourcePlan> {
    let saved = store
        .load(source)
        .with_context(|| format!("loading {source} snapshot"))?;
    let handle = build_adapter(source)?;

    let live = capture(handle.adapter.as_ref())?;
    let actions = reconcile(&saved, &live, handle.adapter.as_ref())?;
    let actions = sequence(actions)?;

    Ok(SourcePlan {
        source,
        handle,
        actions,
        saved_len: saved.len(),
    })
}
