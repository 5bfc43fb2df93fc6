//! Module for the neighbour-coupled mesh graph

// crate modules
use crate::cell::{CellId, MeshCell, Neighbour};
use crate::error::{Error, Result};
use crate::geometry::Geometry;
use crate::layout::MeshLayout;
use crate::topology::{Offset, Topology};

// standard library
use log::debug;

/// Upper bound on the neighbour count of any cell
///
/// A cell coupled to more than the full 3x3x3 stencil indicates a broken
/// topology oracle rather than a legitimate geometry.
pub const MAX_NEIGHBOURS: usize = 26;

/// The neighbour-coupled mesh over the simulation geometry
///
/// [MeshGraph] owns every [MeshCell] in a flat arena addressed by
/// [CellId]. Each cell carries a bounded neighbour list (1 to 26
/// relations) whose reciprocal slot indices are resolved once during
/// construction, letting relaxation sweeps address a neighbour's current
/// buffers with a precomputed slot instead of a search.
///
/// Topology is immutable after construction. The solver treats the graph
/// as shared read-only state across its sweep threads and keeps all
/// mutable current/solution buffers on its own side.
///
/// Graphs are usually built from a [MeshLayout] and a [Topology] oracle:
///
/// ```rust
/// # use rmx_mesh::{MeshGraph, MeshLayout, StructuredTopology};
/// let layout = MeshLayout::rectangular(
///     vec![0.0, 1.0, 2.0, 3.0],
///     vec![0.0, 1.0],
///     vec![0.0, 1.0],
/// ).unwrap();
/// let graph = MeshGraph::build(&layout, &StructuredTopology::new(&layout)).unwrap();
///
/// assert_eq!(graph.len(), 3);
/// // the middle cell of the chain touches both ends
/// assert_eq!(graph[rmx_mesh::CellId(1)].nmax(), 2);
/// ```
///
/// An explicit adjacency may be supplied instead for unstructured cases:
///
/// ```rust
/// # use rmx_mesh::{CellId, MeshGraph};
/// let graph = MeshGraph::from_adjacency(
///     vec![vec![1], vec![0, 2], vec![1]],
///     vec![0.25, 0.5, 0.25],
/// ).unwrap();
///
/// let relation = &graph[CellId(0)].neighbours()[0];
/// assert_eq!(relation.cell, CellId(1));
/// // cell 0 sits at slot 0 of cell 1's own list
/// assert_eq!(relation.forward_idx, 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGraph {
    cells: Vec<MeshCell>,
}

impl MeshGraph {
    /// Build the graph for a layout by probing a topology oracle
    ///
    /// For every cell the geometry-dependent offset stencil is probed
    /// against the oracle and the hits collected into the neighbour list:
    ///
    /// - orthogonal/rectangular meshes probe the 6 face-adjacent offsets,
    /// - cylindrical meshes probe radial, axial, and angular offsets, with
    ///   the angular probes skipped entirely for a single angular bin
    ///   (no unique predecessor or successor exists), and
    /// - hexagonal lattices probe the 6 in-plane offsets of the
    ///   parallelogram convention plus the axial pair when layered.
    ///
    /// Probes that resolve to the probing cell itself or to an already
    /// recorded neighbour are discarded, which covers the two-bin angular
    /// wraparound reaching the same cell from both sides.
    pub fn build(layout: &MeshLayout, topology: &impl Topology) -> Result<Self> {
        let n_cells = layout.n_cells();
        let stencil = probe_stencil(layout);

        let mut adjacency: Vec<Vec<usize>> = Vec::with_capacity(n_cells);
        for cell in 0..n_cells {
            let mut relations: Vec<usize> = Vec::with_capacity(stencil.len());
            for offset in &stencil {
                let Some(found) = topology.neighbour_of(CellId(cell), *offset) else {
                    continue;
                };
                if found.index() != cell && !relations.contains(&found.index()) {
                    relations.push(found.index());
                }
            }
            adjacency.push(relations);
        }

        debug!("probed {} cells with {} offsets", n_cells, stencil.len());
        Self::from_adjacency(adjacency, layout.relative_volumes())
    }

    /// Build the graph from explicit adjacency lists and relative volumes
    ///
    /// This is the underlying constructor used by [MeshGraph::build] and
    /// enforces the structural invariants:
    ///
    /// - every referenced cell exists,
    /// - every cell has between 1 and [MAX_NEIGHBOURS] neighbours (a
    ///   single-cell probe mesh is the one exception and may have none),
    /// - no cell appears twice in the same neighbour list,
    /// - every relation has a reciprocal in the neighbour's own list.
    ///
    /// A missing reciprocal means the adjacency is not a valid undirected
    /// graph and is rejected outright, since a relaxation sweep run over
    /// it would write into unrelated cells.
    pub fn from_adjacency(adjacency: Vec<Vec<usize>>, volumes: Vec<f64>) -> Result<Self> {
        let n_cells = adjacency.len();
        if volumes.len() != n_cells {
            return Err(Error::VolumeLengthMismatch {
                expected: n_cells,
                found: volumes.len(),
            });
        }

        let mut cells: Vec<MeshCell> = Vec::with_capacity(n_cells);
        for (cell, (relations, relative_volume)) in
            adjacency.into_iter().zip(volumes).enumerate()
        {
            if relations.is_empty() && n_cells > 1 {
                return Err(Error::NoNeighbours(cell));
            }
            if relations.len() > MAX_NEIGHBOURS {
                return Err(Error::TooManyNeighbours {
                    cell,
                    found: relations.len(),
                    maximum: MAX_NEIGHBOURS,
                });
            }
            if let Some(out) = relations.iter().find(|target| **target >= n_cells) {
                return Err(Error::CellOutOfBounds {
                    cell: *out,
                    n_cells,
                });
            }
            // a repeated target would leave the second slot's reciprocal
            // unresolved, since the neighbour only points back once
            if let Some(repeat) = relations
                .iter()
                .enumerate()
                .find_map(|(slot, target)| relations[..slot].contains(target).then_some(*target))
            {
                return Err(Error::DuplicateRelation {
                    cell,
                    neighbour: repeat,
                });
            }

            let neighbours = relations
                .into_iter()
                .map(|target| Neighbour {
                    cell: CellId(target),
                    forward_idx: usize::MAX,
                    adjoint_idx: usize::MAX,
                })
                .collect();

            cells.push(MeshCell {
                id: CellId(cell),
                relative_volume,
                neighbours,
            });
        }

        let mut graph = Self { cells };
        graph.resolve_reciprocals()?;
        Ok(graph)
    }

    /// Resolve the bidirectional slot indices for every relation
    ///
    /// For each (cell, neighbour) pair, find the entry in the neighbour's
    /// own list that refers back to the cell. That position becomes the
    /// relation's `forward_idx`, and the reciprocal entry records this
    /// relation's slot as its `adjoint_idx`.
    fn resolve_reciprocals(&mut self) -> Result<()> {
        for cell in 0..self.cells.len() {
            for slot in 0..self.cells[cell].neighbours.len() {
                let target = self.cells[cell].neighbours[slot].cell.index();
                let reciprocal = self.cells[target]
                    .neighbours
                    .iter()
                    .position(|relation| relation.cell.index() == cell)
                    .ok_or(Error::ReciprocalNotFound {
                        cell,
                        neighbour: target,
                    })?;

                self.cells[cell].neighbours[slot].forward_idx = reciprocal;
                self.cells[target].neighbours[reciprocal].adjoint_idx = slot;
            }
        }
        Ok(())
    }

    /// Number of cells in the graph
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True for a graph with no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Borrow a cell by handle
    pub fn cell(&self, id: CellId) -> &MeshCell {
        &self.cells[id.index()]
    }

    /// Iterate over all cells in arena order
    pub fn cells(&self) -> impl Iterator<Item = &MeshCell> {
        self.cells.iter()
    }

    /// The largest neighbour count over all cells
    pub fn max_neighbours(&self) -> usize {
        self.cells
            .iter()
            .map(MeshCell::nmax)
            .max()
            .unwrap_or_default()
    }
}

impl std::ops::Index<CellId> for MeshGraph {
    type Output = MeshCell;

    fn index(&self, id: CellId) -> &Self::Output {
        &self.cells[id.index()]
    }
}

impl std::fmt::Display for MeshGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let relations: usize = self.cells.iter().map(MeshCell::nmax).sum();
        write!(
            f,
            "mesh graph: {} cells, {} relations, widest cell {} neighbours",
            self.len(),
            relations,
            self.max_neighbours()
        )
    }
}

/// Geometry-dependent probe offsets for [MeshGraph::build]
fn probe_stencil(layout: &MeshLayout) -> Vec<Offset> {
    match layout.geometry {
        Geometry::Rectangular | Geometry::Orthogonal => vec![
            [-1, 0, 0],
            [1, 0, 0],
            [0, -1, 0],
            [0, 1, 0],
            [0, 0, -1],
            [0, 0, 1],
        ],
        Geometry::Cylindrical => {
            let mut stencil = vec![[-1, 0, 0], [1, 0, 0], [0, -1, 0], [0, 1, 0]];
            // a single angular bin has no unique predecessor or successor
            if layout.kints() > 1 {
                stencil.push([0, 0, -1]);
                stencil.push([0, 0, 1]);
            }
            stencil
        }
        Geometry::HexagonalX | Geometry::HexagonalY => {
            let mut stencil = vec![
                [-1, 0, 0],
                [1, 0, 0],
                [0, -1, 0],
                [0, 1, 0],
                [1, -1, 0],
                [-1, 1, 0],
            ];
            if layout.kints() > 1 {
                stencil.push([0, 0, -1]);
                stencil.push([0, 0, 1]);
            }
            stencil
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::StructuredTopology;

    fn chain(n: usize) -> MeshGraph {
        let adjacency = (0..n)
            .map(|cell| {
                let mut relations = Vec::new();
                if cell > 0 {
                    relations.push(cell - 1);
                }
                if cell + 1 < n {
                    relations.push(cell + 1);
                }
                relations
            })
            .collect();
        MeshGraph::from_adjacency(adjacency, vec![1.0 / n as f64; n]).unwrap()
    }

    #[test]
    fn chain_reciprocity() {
        let graph = chain(5);
        for cell in graph.cells() {
            for (slot, relation) in cell.neighbours().iter().enumerate() {
                let mirror = graph[relation.cell].neighbours()[relation.forward_idx];
                assert_eq!(mirror.cell, cell.id());
                assert_eq!(mirror.adjoint_idx, slot);
            }
        }
    }

    #[test]
    fn isolated_cell_rejected() {
        let result = MeshGraph::from_adjacency(vec![vec![1], vec![0], vec![]], vec![0.3; 3]);
        assert!(matches!(result, Err(Error::NoNeighbours(2))));
    }

    #[test]
    fn single_cell_probe_allowed() {
        let graph = MeshGraph::from_adjacency(vec![vec![]], vec![1.0]).unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph[CellId(0)].nmax(), 0);
    }

    #[test]
    fn overcoupled_cell_rejected() {
        // star of 28 cells, centre coupled to all 27 others
        let n = 28;
        let mut adjacency = vec![(1..n).collect::<Vec<usize>>()];
        adjacency.extend((1..n).map(|_| vec![0]));

        let result = MeshGraph::from_adjacency(adjacency, vec![1.0 / n as f64; n]);
        assert!(matches!(
            result,
            Err(Error::TooManyNeighbours {
                cell: 0,
                found: 27,
                ..
            })
        ));
    }

    #[test]
    fn duplicate_relation_rejected() {
        // a repeated target must not slip through with both slots resolving
        // to the same reciprocal
        let result = MeshGraph::from_adjacency(vec![vec![1, 1], vec![0, 0]], vec![0.5, 0.5]);
        assert!(matches!(
            result,
            Err(Error::DuplicateRelation {
                cell: 0,
                neighbour: 1
            })
        ));
    }

    #[test]
    fn asymmetric_adjacency_rejected() {
        // cell 1 never points back at cell 0
        let result = MeshGraph::from_adjacency(vec![vec![1], vec![2], vec![1]], vec![0.3; 3]);
        assert!(matches!(
            result,
            Err(Error::ReciprocalNotFound {
                cell: 0,
                neighbour: 1
            })
        ));
    }

    #[test]
    fn cylindrical_two_angular_bins_deduplicated() {
        // both angular probes wrap to the same cell; only one relation kept
        let layout =
            MeshLayout::cylindrical(vec![0.0, 1.0], vec![0.0, 1.0], vec![0.0, 0.5, 1.0]).unwrap();
        let graph = MeshGraph::build(&layout, &StructuredTopology::new(&layout)).unwrap();

        assert_eq!(graph.len(), 2);
        assert_eq!(graph[CellId(0)].nmax(), 1);
        assert_eq!(graph[CellId(1)].nmax(), 1);
    }

    #[test]
    fn hexagonal_interior_has_six_neighbours() {
        let layout = MeshLayout::hexagonal(Geometry::HexagonalX, 3, 3, 1).unwrap();
        let graph = MeshGraph::build(&layout, &StructuredTopology::new(&layout)).unwrap();

        // centre of the 3x3 parallelogram
        let centre = CellId(layout.cell_from_ijk(1, 1, 0));
        assert_eq!(graph[centre].nmax(), 6);
    }
}
