//! Module for cell-related data and implementations

use serde::{Deserialize, Serialize};

/// Stable handle to a cell in a [MeshGraph](crate::MeshGraph) arena
///
/// Neighbour relations are stored as handles rather than references so the
/// graph stays a plain owned structure with O(1) dereference and no
/// self-referential lifetimes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct CellId(pub usize);

impl CellId {
    /// The underlying arena index
    pub const fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for CellId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single adjacency relation with its reciprocal slot bookkeeping
///
/// If cell A holds this relation to cell B at position `i` of its own
/// neighbour list, then:
///
/// - `forward_idx` is the position of A within B's neighbour list, and
/// - B's relation back to A carries `adjoint_idx = i`.
///
/// The forward sweep uses `forward_idx` to address the slot of a donor's
/// outward-current buffer pointing back at the receiving cell; the adjoint
/// sweep addresses the mirrored slot through `adjoint_idx`. Both are
/// resolved once at construction so no sweep ever searches a neighbour
/// list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbour {
    /// Handle of the adjacent cell
    pub cell: CellId,
    /// Slot at which the owning cell appears in the neighbour's own list
    pub forward_idx: usize,
    /// Reciprocal slot used by the adjoint sweep
    pub adjoint_idx: usize,
}

/// An atomic spatial region of the discretised geometry
///
/// Cells own only their topology: identity, relative volume, and the
/// ordered neighbour list. All numeric state (currents, solutions,
/// importances) lives with the solver so that the graph itself is
/// immutable and freely shared across sweep threads.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshCell {
    pub(crate) id: CellId,
    pub(crate) relative_volume: f64,
    pub(crate) neighbours: Vec<Neighbour>,
}

impl MeshCell {
    /// Stable identity of this cell
    pub const fn id(&self) -> CellId {
        self.id
    }

    /// Fraction of the total mesh volume occupied by this cell
    pub const fn relative_volume(&self) -> f64 {
        self.relative_volume
    }

    /// The ordered neighbour relations
    pub fn neighbours(&self) -> &[Neighbour] {
        &self.neighbours
    }

    /// Number of neighbour relations, `nmax` in solver terms
    pub fn nmax(&self) -> usize {
        self.neighbours.len()
    }
}
