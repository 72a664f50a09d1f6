//! Action sequencer - orders actions so repository registrations precede
//! the installs that depend on them.
//!
//! The dependency graph has one edge from each `RegisterRepository` to every
//! `InstallEntry` naming it in provenance. Different sources never share
//! edges, so their actions are independent pipelines. The graph is acyclic
//! by construction; cycle detection is defensive only.

use crate::error::{Error, Result};
use crate::types::{Action, Source};
use std::collections::BTreeMap;

/// Topologically sort actions with a deterministic tie-break.
///
/// Among actions with no pending dependency, registrations come first,
/// then installs in ascending identifier order, grouped by source.
pub fn sequence(actions: Vec<Action>) -> Result<Vec<Action>> {
    let deps = dependency_edges(&actions);

    let mut in_degree: Vec<usize> = vec![0; actions.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); actions.len()];
    for &(register, install) in &deps {
        in_degree[install] += 1;
        dependents[register].push(install);
    }

    let mut ready: Vec<usize> = (0..actions.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut ordered = Vec::with_capacity(actions.len());

    while !ready.is_empty() {
        ready.sort_by(|&a, &b| order_key(&actions[a]).cmp(&order_key(&actions[b])));
        let next = ready.remove(0);
        ordered.push(next);

        for &dependent in &dependents[next] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push(dependent);
            }
        }
    }

    if ordered.len() != actions.len() {
        let stuck: Vec<String> = (0..actions.len())
            .filter(|&i| in_degree[i] > 0)
            .map(|i| actions[i].label())
            .collect();
        return Err(Error::Sequencing {
            message: format!("unresolvable actions: {}", stuck.join(", ")),
        });
    }

    let mut actions: Vec<Option<Action>> = actions.into_iter().map(Some).collect();
    Ok(ordered
        .into_iter()
        .map(|i| actions[i].take().expect("each index sequenced once"))
        .collect())
}

/// Group sequenced actions into dependency levels.
///
/// Actions within one level have no interdependency and may execute
/// concurrently; levels execute in order. Level 0 holds registrations and
/// installs without provenance, level 1 the installs gated on a
/// registration in the batch.
pub fn parallel_stages(actions: &[Action]) -> Vec<Vec<Action>> {
    let owned: Vec<Action> = actions.to_vec();
    let deps = dependency_edges(&owned);

    let mut level: Vec<usize> = vec![0; owned.len()];
    for &(register, install) in &deps {
        level[install] = level[install].max(level[register] + 1);
    }

    let mut stages: BTreeMap<usize, Vec<Action>> = BTreeMap::new();
    for (i, action) in owned.into_iter().enumerate() {
        stages.entry(level[i]).or_default().push(action);
    }
    stages.into_values().collect()
}

/// Edges (register index, install index) for installs whose provenance
/// names a registration in the batch.
fn dependency_edges(actions: &[Action]) -> Vec<(usize, usize)> {
    let mut edges = Vec::new();
    for (i, action) in actions.iter().enumerate() {
        let Action::RegisterRepository(requirement) = action else {
            continue;
        };
        for (j, candidate) in actions.iter().enumerate() {
            if let Action::InstallEntry(entry) = candidate
                && entry.provenance.as_ref() == Some(requirement)
            {
                edges.push((i, j));
            }
        }
    }
    edges
}

/// Deterministic ordering key: source, then registrations before installs,
/// then the action's own identifier.
fn order_key(action: &Action) -> (Source, u8, String) {
    match action {
        Action::RegisterRepository(req) => (action.source(), 0, req.id.clone()),
        Action::InstallEntry(entry) => (action.source(), 1, entry.identifier.clone()),
    }
}
