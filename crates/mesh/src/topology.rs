//! Topology oracle contract and the structured-grid implementation

// crate modules
use crate::cell::CellId;
use crate::geometry::Geometry;
use crate::layout::MeshLayout;

/// Lattice offset probed during graph construction, in (i,j,k) steps
pub type Offset = [i32; 3];

/// Oracle mapping a spatial offset from a cell to an adjacent cell
///
/// Graph construction is decoupled from the geometry bookkeeping of the
/// host transport code through this trait: given a cell and a lattice
/// offset, the oracle either names the adjacent cell or reports that the
/// offset leaves the mesh.
///
/// A [StructuredTopology] implementation over a [MeshLayout] is provided
/// for regular lattices; a tracking engine with its own lattice index can
/// implement the trait directly.
pub trait Topology {
    /// The cell reached by `offset` from `cell`, if any
    fn neighbour_of(&self, cell: CellId, offset: Offset) -> Option<CellId>;
}

/// Reference [Topology] for structured lattices described by a [MeshLayout]
///
/// Offsets are applied to the (i,j,k) lattice indices of the cell. The
/// angular axis of cylindrical meshes wraps periodically when the bins
/// cover the full circle; every other axis terminates at the mesh
/// boundary.
///
/// ```rust
/// # use rmx_mesh::{CellId, MeshLayout, StructuredTopology, Topology};
/// let layout = MeshLayout::rectangular(
///     vec![0.0, 1.0, 2.0],
///     vec![0.0, 1.0],
///     vec![0.0, 1.0],
/// ).unwrap();
/// let topology = StructuredTopology::new(&layout);
///
/// assert_eq!(topology.neighbour_of(CellId(0), [1, 0, 0]), Some(CellId(1)));
/// assert_eq!(topology.neighbour_of(CellId(0), [-1, 0, 0]), None);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct StructuredTopology<'a> {
    layout: &'a MeshLayout,
}

impl<'a> StructuredTopology<'a> {
    /// Bind the topology to a layout
    pub const fn new(layout: &'a MeshLayout) -> Self {
        Self { layout }
    }

    /// True when the angular axis spans the full circle
    fn full_revolution(&self) -> bool {
        let kmesh = &self.layout.kmesh;
        *kmesh.first().unwrap() == 0.0 && *kmesh.last().unwrap() == 1.0
    }

    fn apply(&self, index: usize, step: i32, bins: usize, periodic: bool) -> Option<usize> {
        let shifted = index as i64 + step as i64;
        if (0..bins as i64).contains(&shifted) {
            Some(shifted as usize)
        } else if periodic {
            Some(shifted.rem_euclid(bins as i64) as usize)
        } else {
            None
        }
    }
}

impl Topology for StructuredTopology<'_> {
    fn neighbour_of(&self, cell: CellId, offset: Offset) -> Option<CellId> {
        if cell.index() >= self.layout.n_cells() {
            return None;
        }

        let (i, j, k) = self.layout.ijk_from_cell(cell.index());
        let angular_wrap =
            self.layout.geometry == Geometry::Cylindrical && self.full_revolution();

        let i = self.apply(i, offset[0], self.layout.iints(), false)?;
        let j = self.apply(j, offset[1], self.layout.jints(), false)?;
        let k = self.apply(k, offset[2], self.layout.kints(), angular_wrap)?;

        Some(CellId(self.layout.cell_from_ijk(i, j, k)))
    }
}
