//! Importance arrays produced by the adjoint solve

// rmx modules
use rmx_mesh::MeshGraph;
use rmx_utils::ValueExt;

use serde::{Deserialize, Serialize};

/// Per-cell, per-group importance functions for weight-window biasing
///
/// Three arrays are maintained:
///
/// - **source importance** - weighting for particles born in a cell,
/// - **current importance** - the cell-average boundary importance used
///   for in-flight biasing, and
/// - **partial adjoint solution** - the accumulated per-boundary adjoint
///   currents the averages were extracted from, kept so the spurious
///   importance filter can zero individual entries.
///
/// Values are non-negative, with zero meaning "no bias applied here". The
/// map persists across solver invocations of the same problem: a freshly
/// computed zero never overwrites a previously positive entry, which
/// protects iterative weight-window generation from transient
/// zero-division artefacts in a single under-converged run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportanceMap {
    pub(crate) ng: usize,
    pub(crate) source: Vec<f64>,
    pub(crate) current: Vec<f64>,
    pub(crate) partial: Vec<Vec<f64>>,
}

impl ImportanceMap {
    /// Zeroed map sized for a graph and group count
    pub(crate) fn new(graph: &MeshGraph, ng: usize) -> Self {
        Self {
            ng,
            source: vec![0.0; graph.len() * ng],
            current: vec![0.0; graph.len() * ng],
            partial: graph.cells().map(|cell| vec![0.0; cell.nmax() * ng]).collect(),
        }
    }

    /// Number of energy groups
    pub const fn ng(&self) -> usize {
        self.ng
    }

    /// Number of cells covered
    pub fn len(&self) -> usize {
        self.partial.len()
    }

    /// True for a map over no cells
    pub fn is_empty(&self) -> bool {
        self.partial.is_empty()
    }

    /// Source importance per group for a cell
    pub fn source(&self, cell: usize) -> &[f64] {
        &self.source[cell * self.ng..(cell + 1) * self.ng]
    }

    /// Current (cell-average) importance per group for a cell
    pub fn current(&self, cell: usize) -> &[f64] {
        &self.current[cell * self.ng..(cell + 1) * self.ng]
    }

    /// Partial adjoint solution per boundary slot and group for a cell
    pub fn partial(&self, cell: usize) -> &[f64] {
        &self.partial[cell]
    }

    /// Store a source importance, keeping a previous positive value over
    /// a freshly computed zero
    pub(crate) fn update_source(&mut self, cell: usize, group: usize, value: f64) {
        Self::update(&mut self.source[cell * self.ng + group], value);
    }

    /// Store a current importance, keeping a previous positive value over
    /// a freshly computed zero
    pub(crate) fn update_current(&mut self, cell: usize, group: usize, value: f64) {
        Self::update(&mut self.current[cell * self.ng + group], value);
    }

    fn update(slot: &mut f64, value: f64) {
        if value == 0.0 && *slot > 0.0 {
            return;
        }
        *slot = value;
    }
}

impl std::fmt::Display for ImportanceMap {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let max_source = self.source.iter().cloned().fold(0.0, f64::max);
        let max_current = self.current.iter().cloned().fold(0.0, f64::max);
        write!(
            f,
            "importance map: {} cells, {} groups, max source {}, max current {}",
            self.len(),
            self.ng,
            max_source.sci(3, 2),
            max_current.sci(3, 2)
        )
    }
}
