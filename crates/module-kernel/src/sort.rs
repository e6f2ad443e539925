//! # Topological Sorter
//!
//! Kahn's algorithm over a [`DependencyGraph`]:
//!
//! 1. Every vertex with no dependencies starts out ready.
//! 2. Take the ready vertex with the lowest registration index, append it to
//!    the order and release each of its dependents by one.
//! 3. A dependent becomes ready once nothing it waits for is left.
//! 4. Vertices that are never released sit on a cycle.
//!
//! Ready vertices are kept in a [`BTreeSet`], so ties always break by
//! registration order and the same registry always sorts the same way.

use crate::error::KernelError;
use crate::graph::{DependencyGraph, VertexId};
use std::collections::BTreeSet;
use tracing::{debug, error};

/// Remaining unreleased dependencies per vertex.
struct Pending {
    in_degree: Vec<usize>,
}

impl Pending {
    fn new(graph: &DependencyGraph) -> Self {
        Self {
            in_degree: graph
                .vertices()
                .map(|v| graph.dependencies_of(v).len())
                .collect(),
        }
    }

    /// `true` while some dependency of `vertex` has not been ordered yet.
    fn has_pending_dependencies(&self, vertex: VertexId) -> bool {
        self.in_degree[vertex.index()] > 0
    }

    fn release(&mut self, vertex: VertexId) {
        let slot = &mut self.in_degree[vertex.index()];
        *slot = slot.saturating_sub(1);
    }
}

/// Orders every vertex so that each dependency precedes its dependents.
///
/// # Errors
///
/// [`KernelError::CyclicDependency`] naming every vertex that could not be
/// ordered, in registration order. No partial order is returned.
pub fn topological_order(graph: &DependencyGraph) -> Result<Vec<VertexId>, KernelError> {
    let mut pending = Pending::new(graph);
    let mut ready: BTreeSet<VertexId> = graph
        .vertices()
        .filter(|v| !pending.has_pending_dependencies(*v))
        .collect();
    let mut order = Vec::with_capacity(graph.len());

    while let Some(vertex) = ready.pop_first() {
        order.push(vertex);
        for &dependent in graph.dependents(vertex) {
            pending.release(dependent);
            if !pending.has_pending_dependencies(dependent) {
                ready.insert(dependent);
            }
        }
    }

    if order.len() < graph.len() {
        let modules: Vec<String> = graph
            .vertices()
            .filter(|v| pending.has_pending_dependencies(*v))
            .map(|v| graph.name(v).to_string())
            .collect();
        error!(?modules, "Detected cyclic dependency between modules");
        return Err(KernelError::CyclicDependency { modules });
    }

    debug!(
        order = ?order.iter().map(|v| graph.name(*v)).collect::<Vec<_>>(),
        "Computed module order"
    );
    Ok(order)
}

/// Convenience wrapper returning module names instead of vertex ids.
pub fn sorted_names(graph: &DependencyGraph) -> Result<Vec<String>, KernelError> {
    Ok(topological_order(graph)?
        .into_iter()
        .map(|v| graph.name(v).to_string())
        .collect())
}
