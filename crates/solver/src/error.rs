//! Result and Error types for rmx-solver

/// Type alias for Result<T, solver::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `rmx-solver` crate
///
/// Configuration problems are raised at construction, before any
/// iteration runs. [Error::ZeroCurrentBalance] is the one numeric
/// degeneracy raised from inside a solve; it means the problem carries no
/// current to propagate and the convergence fraction is undefined.
/// Convergence failure is deliberately *not* an error and is reported
/// through the solver summaries instead.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("mesh construction failed")]
    Mesh(#[from] rmx_mesh::Error),

    #[error("energy group count must be non-zero")]
    ZeroGroups,

    #[error("convergence limit must be positive, found {0}")]
    InvalidConvergenceLimit(f64),

    #[error("coefficients provided for {found} cells but the mesh has {expected}")]
    CoefficientCountMismatch { expected: usize, found: usize },

    #[error(
        "{name} matrix for cell {cell} has wrong shape \
         (expected {expected_rows}x{expected_cols}, found {found_rows}x{found_cols})"
    )]
    ShapeMismatch {
        name: &'static str,
        cell: usize,
        expected_rows: usize,
        expected_cols: usize,
        found_rows: usize,
        found_cols: usize,
    },

    #[error("detector \"{name}\" has negative weight {weight}")]
    NegativeDetectorWeight { name: String, weight: f64 },

    #[error("detector \"{name}\" references cell {cell} outside the mesh of {n_cells} cells")]
    DetectorCellOutOfBounds {
        name: String,
        cell: usize,
        n_cells: usize,
    },

    #[error(
        "detector \"{name}\" {vector} vector for cell {cell} has wrong length \
         (expected {expected}, found {found})"
    )]
    ResponseLengthMismatch {
        name: String,
        vector: &'static str,
        cell: usize,
        expected: usize,
        found: usize,
    },

    #[error("detector \"{name}\" tallied response has {found} groups, expected {expected}")]
    TalliedLengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("source field has {found} entries, expected {expected}")]
    SourceLengthMismatch { expected: usize, found: usize },

    #[error("current balance is zero, nothing to propagate")]
    ZeroCurrentBalance,
}
