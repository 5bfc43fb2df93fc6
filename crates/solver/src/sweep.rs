//! Gather kernels shared by the relaxation sweeps
//!
//! Both passes are written gather-side: every cell pulls from its
//! neighbours' previous-iteration buffers instead of pushing into shared
//! ones. Two cells sharing a neighbour therefore never contend for a
//! write, and the per-iteration sweep parallelises over cells with no
//! synchronisation beyond the join.

// rmx modules
use rmx_mesh::{MeshCell, MeshGraph};

use nalgebra::DVector;

/// Pull the previous iteration's donor buffers into `buffer`
///
/// For the receiving cell's slot `s`, the donor is the neighbour at that
/// slot and the donor-side slot pointing back here is the precomputed
/// `forward_idx`. No search happens at sweep time.
pub(crate) fn gather(
    cell: &MeshCell,
    ng: usize,
    donors: &[DVector<f64>],
    buffer: &mut DVector<f64>,
) {
    for (slot, relation) in cell.neighbours().iter().enumerate() {
        let donor = &donors[relation.cell.index()];
        let base = relation.forward_idx * ng;
        for group in 0..ng {
            buffer[slot * ng + group] = donor[base + group];
        }
    }
}

/// Mirror-image gather for the adjoint sweep
///
/// The adjoint scatter writes through `adjoint_idx`; gathered, the donor
/// slot collapses to the same `forward_idx` by reciprocity of the
/// adjacency. The reciprocal bookkeeping is asserted here in debug
/// builds so a corrupted graph fails loudly rather than mixing currents
/// between unrelated cells.
pub(crate) fn gather_adjoint(
    graph: &MeshGraph,
    cell: &MeshCell,
    ng: usize,
    donors: &[DVector<f64>],
    buffer: &mut DVector<f64>,
) {
    for (slot, relation) in cell.neighbours().iter().enumerate() {
        debug_assert_eq!(
            graph[relation.cell].neighbours()[relation.forward_idx].adjoint_idx,
            slot,
            "reciprocal adjoint slot mismatch at cell {}",
            cell.id()
        );

        let donor = &donors[relation.cell.index()];
        let base = relation.forward_idx * ng;
        for group in 0..ng {
            buffer[slot * ng + group] = donor[base + group];
        }
    }
}
