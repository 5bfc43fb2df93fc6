//! Forward/adjoint relaxation and importance extraction
//!
#![doc = include_str!("../readme.md")]
//!
//! ## Quickstart
//!
//! A two-cell chain with a unit source in the first cell and a detector
//! tallying everything that reaches the second:
//!
//! ```rust
//! use nalgebra::{DMatrix, DVector};
//! use rmx_mesh::{CellId, MeshGraph};
//! use rmx_solver::{
//!     CellCoefficients, CoefficientStore, Detector, DetectorResponse,
//!     ResponseMatrixProblem, SolverConfig,
//! };
//!
//! let graph = MeshGraph::from_adjacency(vec![vec![1], vec![0]], vec![0.5, 0.5])?;
//!
//! // cell 0 couples its source straight onto the shared boundary, cell 1
//! // absorbs whatever arrives and tallies it as net inward current
//! let mut cells = vec![
//!     CellCoefficients::zeros(1, 1),
//!     CellCoefficients::zeros(1, 1),
//! ];
//! cells[0].source = DMatrix::from_element(1, 1, 1.0);
//! cells[1].boundary_current = DVector::from_element(1, 1.0);
//!
//! let detector = Detector::new("tally", 1.0, DVector::from_element(1, 1.0))
//!     .with_response(DetectorResponse {
//!         cell: CellId(1),
//!         forward: DVector::from_element(1, 1.0),
//!         adjoint: DVector::from_element(1, 1.0),
//!         direct_source: DVector::zeros(1),
//!     });
//!
//! let mut problem = ResponseMatrixProblem::new(
//!     graph,
//!     CoefficientStore::new(cells),
//!     vec![detector],
//!     SolverConfig::default(),
//! )?;
//!
//! // forward pass reproduces the tallied response exactly
//! let forward = problem.solve_forward(&[1.0, 0.0])?;
//! assert!(forward.converged);
//! assert_eq!(forward.max_check_difference, 0.0);
//!
//! // adjoint pass turns the detector response into importances
//! let adjoint = problem.solve_adjoint(None)?;
//! assert!(adjoint.converged);
//! assert_eq!(problem.importance().source(0)[0], 1.0);
//! assert_eq!(problem.importance().current(1)[0], 1.0);
//! # Ok::<(), rmx_solver::Error>(())
//! ```

// Split into subfiles for development, but anything important is re-exported
mod adjoint;
mod coefficients;
mod config;
mod detector;
mod error;
mod filter;
mod forward;
mod importance;
mod problem;
mod summary;
mod sweep;

// inline the important types for a nice public API
#[doc(inline)]
pub use coefficients::{CellCoefficients, CoefficientStore};

#[doc(inline)]
pub use config::{SolverConfig, SolverMode};

#[doc(inline)]
pub use detector::{Detector, DetectorResponse};

#[doc(inline)]
pub use importance::ImportanceMap;

#[doc(inline)]
pub use problem::ResponseMatrixProblem;

#[doc(inline)]
pub use summary::{AdjointSummary, DetectorCheck, ForwardSummary};

#[doc(inline)]
pub use error::{Error, Result};
