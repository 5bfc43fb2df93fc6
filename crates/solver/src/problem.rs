//! Problem assembly and the public solve entry points

// rmx modules
use rmx_mesh::MeshGraph;

// crate modules
use crate::adjoint;
use crate::coefficients::CoefficientStore;
use crate::config::SolverConfig;
use crate::detector::Detector;
use crate::error::{Error, Result};
use crate::forward;
use crate::importance::ImportanceMap;
use crate::summary::{AdjointSummary, ForwardSummary};

/// A fully assembled response-matrix problem over a mesh
///
/// Construction validates the configuration, coefficient shapes, and
/// detector definitions against the mesh, so a problem that exists can be
/// solved. The importance map persists across solves of the same problem
/// and is refined by every adjoint run.
///
/// See the [crate documentation](crate) for a worked example.
#[derive(Debug)]
pub struct ResponseMatrixProblem {
    pub(crate) graph: MeshGraph,
    pub(crate) coefficients: CoefficientStore,
    pub(crate) detectors: Vec<Detector>,
    pub(crate) config: SolverConfig,
    pub(crate) importance: ImportanceMap,
}

impl ResponseMatrixProblem {
    /// Assemble and validate a problem
    ///
    /// # Errors
    ///
    /// Any inconsistency between the mesh, the coefficient shapes, the
    /// detector definitions, and the configuration is a construction
    /// error. See [Error] for the full list.
    pub fn new(
        graph: MeshGraph,
        coefficients: CoefficientStore,
        detectors: Vec<Detector>,
        config: SolverConfig,
    ) -> Result<Self> {
        if config.ng == 0 {
            return Err(Error::ZeroGroups);
        }
        if config.conv_limit <= 0.0 {
            return Err(Error::InvalidConvergenceLimit(config.conv_limit));
        }

        coefficients.validate(&graph, config.ng)?;
        for detector in &detectors {
            detector.validate(&graph, config.ng)?;
        }

        let importance = ImportanceMap::new(&graph, config.ng);
        Ok(Self {
            graph,
            coefficients,
            detectors,
            config,
            importance,
        })
    }

    /// The mesh connectivity this problem is defined over
    pub fn graph(&self) -> &MeshGraph {
        &self.graph
    }

    /// The solver configuration
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// The detectors, including any forward check values computed so far
    pub fn detectors(&self) -> &[Detector] {
        &self.detectors
    }

    /// The importance map accumulated by adjoint solves
    pub fn importance(&self) -> &ImportanceMap {
        &self.importance
    }

    /// Validate the response matrices by forward propagation
    ///
    /// Propagates the external `source` field (flattened `cell * ng +
    /// group` rates) through the forward transfer coefficients and checks
    /// the reproduced detector responses against the tallied ones. The
    /// returned summary carries the per-detector check differences;
    /// mismatches warn but never fail.
    pub fn solve_forward(&mut self, source: &[f64]) -> Result<ForwardSummary> {
        forward::solve(self, source)
    }

    /// Solve the adjoint problem and refine the importance map
    ///
    /// Detector responses seed the adjoint currents; supplying the
    /// forward `source` field lets the seeding subtract each detector's
    /// direct source-to-response contribution. Runs the
    /// spurious-importance filter afterwards when the configuration
    /// calls for it.
    ///
    /// # Errors
    ///
    /// [Error::ZeroCurrentBalance] when the detectors seed no current at
    /// all, and [Error::SourceLengthMismatch] for a misshapen source
    /// field.
    pub fn solve_adjoint(&mut self, source: Option<&[f64]>) -> Result<AdjointSummary> {
        adjoint::solve(self, source)
    }
}

impl std::fmt::Display for ResponseMatrixProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} problem: {} cells, {} groups, {} detectors, {} particle",
            self.config.mode,
            self.graph.len(),
            self.config.ng,
            self.detectors.len(),
            self.config.particle
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coefficients::CellCoefficients;
    use nalgebra::{DMatrix, DVector};
    use rmx_mesh::CellId;

    fn two_cell_graph() -> MeshGraph {
        MeshGraph::from_adjacency(vec![vec![1], vec![0]], vec![0.5, 0.5]).unwrap()
    }

    fn zero_store(graph: &MeshGraph, ng: usize) -> CoefficientStore {
        CoefficientStore::new(
            graph
                .cells()
                .map(|cell| CellCoefficients::zeros(cell.nmax(), ng))
                .collect(),
        )
    }

    #[test]
    fn valid_problem_constructs() {
        let graph = two_cell_graph();
        let store = zero_store(&graph, 2);
        let config = SolverConfig {
            ng: 2,
            ..Default::default()
        };

        let problem = ResponseMatrixProblem::new(graph, store, vec![], config).unwrap();
        assert_eq!(problem.graph().len(), 2);
        assert_eq!(problem.importance().len(), 2);
    }

    #[test]
    fn zero_groups_rejected() {
        let graph = two_cell_graph();
        let store = zero_store(&graph, 1);
        let config = SolverConfig {
            ng: 0,
            ..Default::default()
        };

        let result = ResponseMatrixProblem::new(graph, store, vec![], config);
        assert!(matches!(result, Err(Error::ZeroGroups)));
    }

    #[test]
    fn non_positive_convergence_limit_rejected() {
        let graph = two_cell_graph();
        let store = zero_store(&graph, 1);
        let config = SolverConfig {
            conv_limit: 0.0,
            ..Default::default()
        };

        let result = ResponseMatrixProblem::new(graph, store, vec![], config);
        assert!(matches!(result, Err(Error::InvalidConvergenceLimit(_))));
    }

    #[test]
    fn misshapen_forward_matrix_rejected() {
        let graph = two_cell_graph();
        let mut cells: Vec<CellCoefficients> = graph
            .cells()
            .map(|cell| CellCoefficients::zeros(cell.nmax(), 1))
            .collect();
        cells[1].forward = DMatrix::zeros(3, 3);

        let result = ResponseMatrixProblem::new(
            graph,
            CoefficientStore::new(cells),
            vec![],
            SolverConfig::default(),
        );
        assert!(matches!(
            result,
            Err(Error::ShapeMismatch { cell: 1, .. })
        ));
    }

    #[test]
    fn detector_out_of_bounds_rejected() {
        let graph = two_cell_graph();
        let store = zero_store(&graph, 1);
        let detector = Detector::new("stray", 1.0, DVector::from_element(1, 1.0))
            .with_response(crate::detector::DetectorResponse {
                cell: CellId(7),
                forward: DVector::zeros(1),
                adjoint: DVector::zeros(1),
                direct_source: DVector::zeros(1),
            });

        let result = ResponseMatrixProblem::new(
            graph,
            store,
            vec![detector],
            SolverConfig::default(),
        );
        assert!(matches!(result, Err(Error::DetectorCellOutOfBounds { .. })));
    }
}
