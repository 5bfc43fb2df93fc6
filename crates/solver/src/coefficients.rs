//! Tallied per-cell coefficient matrices

// rmx modules
use rmx_mesh::MeshGraph;

// crate modules
use crate::error::{Error, Result};

use nalgebra::{DMatrix, DVector};

/// Dense transfer and coupling coefficients for a single cell
///
/// All matrices are indexed by boundary slot and energy group flattened as
/// `slot * ng + group`, with `m = nmax * ng` rows:
///
/// | Field              | Shape    | Maps                               |
/// | ------------------ | -------- | ---------------------------------- |
/// | `forward`          | `m x m`  | inward currents to outward         |
/// | `adjoint`          | `m x m`  | outward currents to inward         |
/// | `source`           | `m x ng` | source rates to outward currents   |
/// | `boundary_current` | `m`      | tallied net inward current         |
///
/// Coefficients are non-negative probability-like factors produced by the
/// tally engine; nothing here checks their physics, only their shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct CellCoefficients {
    /// Forward transfer matrix
    pub forward: DMatrix<f64>,
    /// Adjoint transfer matrix
    pub adjoint: DMatrix<f64>,
    /// Source-coupling matrix
    pub source: DMatrix<f64>,
    /// Tallied net inward current per boundary slot and group
    pub boundary_current: DVector<f64>,
}

impl CellCoefficients {
    /// All-zero coefficients for a cell with `nmax` neighbours
    ///
    /// Useful as a starting point for purely absorbing cells and for
    /// assembling synthetic problems in tests.
    pub fn zeros(nmax: usize, ng: usize) -> Self {
        let m = nmax * ng;
        Self {
            forward: DMatrix::zeros(m, m),
            adjoint: DMatrix::zeros(m, m),
            source: DMatrix::zeros(m, ng),
            boundary_current: DVector::zeros(m),
        }
    }
}

/// Read-only store of [CellCoefficients] for every cell of a mesh
///
/// The store is validated against the graph when a problem is assembled:
/// a missing cell or a matrix of the wrong shape is a configuration error
/// caught before any iteration runs.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientStore {
    cells: Vec<CellCoefficients>,
}

impl CoefficientStore {
    /// Collect per-cell coefficients in cell index order
    pub fn new(cells: Vec<CellCoefficients>) -> Self {
        Self { cells }
    }

    /// Borrow the coefficients for a cell by arena index
    pub fn cell(&self, index: usize) -> &CellCoefficients {
        &self.cells[index]
    }

    /// Number of cells covered by the store
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when the store covers no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Check every coefficient shape against the graph and group count
    pub(crate) fn validate(&self, graph: &MeshGraph, ng: usize) -> Result<()> {
        if self.cells.len() != graph.len() {
            return Err(Error::CoefficientCountMismatch {
                expected: graph.len(),
                found: self.cells.len(),
            });
        }

        for cell in graph.cells() {
            let m = cell.nmax() * ng;
            let index = cell.id().index();
            let coefficients = &self.cells[index];

            check_shape("forward transfer", index, &coefficients.forward, m, m)?;
            check_shape("adjoint transfer", index, &coefficients.adjoint, m, m)?;
            check_shape("source coupling", index, &coefficients.source, m, ng)?;
            if coefficients.boundary_current.len() != m {
                return Err(Error::ShapeMismatch {
                    name: "boundary current",
                    cell: index,
                    expected_rows: m,
                    expected_cols: 1,
                    found_rows: coefficients.boundary_current.len(),
                    found_cols: 1,
                });
            }
        }

        Ok(())
    }
}

fn check_shape(
    name: &'static str,
    cell: usize,
    matrix: &DMatrix<f64>,
    rows: usize,
    cols: usize,
) -> Result<()> {
    if matrix.nrows() != rows || matrix.ncols() != cols {
        return Err(Error::ShapeMismatch {
            name,
            cell,
            expected_rows: rows,
            expected_cols: cols,
            found_rows: matrix.nrows(),
            found_cols: matrix.ncols(),
        });
    }
    Ok(())
}
