//! Spurious-importance suppression for global variance reduction

// rmx modules
use rmx_mesh::MeshGraph;

// crate modules
use crate::importance::ImportanceMap;

// standard library
use log::debug;

/// A neighbour this many orders of magnitude below its donor is noise
///
/// Boundary cells can receive a negligible real contribution yet end up
/// with a tiny positive importance; once fed into weight-window biasing
/// the donor/neighbour ratio becomes an unbounded splitting factor. Six
/// orders of magnitude is far beyond any physical attenuation between
/// adjacent cells.
pub(crate) const SPIKE_RATIO: f64 = 1.0e-6;

/// Zero out neighbour importances dwarfed by an adjacent donor
///
/// For every cell and group with a positive current importance, any
/// neighbour whose current importance in the same group is positive but
/// below `donor * SPIKE_RATIO` has its source importance, current
/// importance, and partial adjoint solution entries zeroed for that
/// group. Comparisons read a snapshot of the pre-filter importances so
/// the result does not depend on cell ordering.
///
/// Returns the number of (cell, group) entries zeroed.
pub(crate) fn suppress_spikes(graph: &MeshGraph, importance: &mut ImportanceMap) -> usize {
    let ng = importance.ng();
    let snapshot = importance.current.clone();
    let mut zeroed = 0;

    for cell in graph.cells() {
        let index = cell.id().index();
        for group in 0..ng {
            let donor = snapshot[index * ng + group];
            if donor <= 0.0 {
                continue;
            }

            for relation in cell.neighbours() {
                let neighbour = relation.cell.index();
                let other = snapshot[neighbour * ng + group];
                if other <= 0.0 || other >= donor * SPIKE_RATIO {
                    continue;
                }

                importance.current[neighbour * ng + group] = 0.0;
                importance.source[neighbour * ng + group] = 0.0;
                let partial = &mut importance.partial[neighbour];
                for slot in 0..graph[relation.cell].nmax() {
                    partial[slot * ng + group] = 0.0;
                }
                zeroed += 1;
            }
        }
    }

    if zeroed > 0 {
        debug!("spurious importance filter zeroed {zeroed} entries");
    }
    zeroed
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmx_mesh::MeshGraph;

    fn chain_graph() -> MeshGraph {
        MeshGraph::from_adjacency(
            vec![vec![1], vec![0, 2], vec![1]],
            vec![1.0 / 3.0; 3],
        )
        .unwrap()
    }

    #[test]
    fn spike_below_ratio_is_zeroed() {
        let graph = chain_graph();
        let mut map = ImportanceMap::new(&graph, 1);
        map.current = vec![1.0, 5.0e-7, 0.5];
        map.source = vec![0.1, 0.2, 0.3];
        map.partial[1] = vec![1.0e-8, 2.0e-8];

        let zeroed = suppress_spikes(&graph, &mut map);

        assert_eq!(zeroed, 1);
        assert_eq!(map.current(1)[0], 0.0);
        assert_eq!(map.source(1)[0], 0.0);
        assert_eq!(map.partial(1), &[0.0, 0.0]);

        // the donor and the healthy neighbour are untouched
        assert_eq!(map.current(0)[0], 1.0);
        assert_eq!(map.current(2)[0], 0.5);
        assert_eq!(map.source(0)[0], 0.1);
    }

    #[test]
    fn neighbour_above_ratio_is_untouched() {
        let graph = chain_graph();
        let mut map = ImportanceMap::new(&graph, 1);
        map.current = vec![1.0, 1.0e-5, 0.5];
        map.source = vec![0.1, 0.2, 0.3];

        let zeroed = suppress_spikes(&graph, &mut map);

        assert_eq!(zeroed, 0);
        assert_eq!(map.current(1)[0], 1.0e-5);
        assert_eq!(map.source(1)[0], 0.2);
    }

    #[test]
    fn filter_is_per_group() {
        let graph = chain_graph();
        let mut map = ImportanceMap::new(&graph, 2);
        // group 0 spikes, group 1 is healthy
        map.current = vec![1.0, 1.0, 5.0e-7, 0.9, 0.5, 0.8];
        map.source = vec![0.1; 6];
        map.partial[1] = vec![1.0e-8, 0.4, 2.0e-8, 0.6];

        suppress_spikes(&graph, &mut map);

        assert_eq!(map.current(1), &[0.0, 0.9]);
        assert_eq!(map.partial(1), &[0.0, 0.4, 0.0, 0.6]);
    }
}
