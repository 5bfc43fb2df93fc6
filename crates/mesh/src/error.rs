//! Result and Error types for rmx-mesh

/// Type alias for Result<T, mesh::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `rmx-mesh` crate
///
/// All variants are configuration errors in the sense of the solver: they
/// are raised during construction, before any relaxation sweep can run.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("cell {0} has no neighbours")]
    NoNeighbours(usize),

    #[error("cell {cell} has {found} neighbours (maximum {maximum})")]
    TooManyNeighbours {
        cell: usize,
        found: usize,
        maximum: usize,
    },

    #[error("no reciprocal relation from cell {neighbour} back to cell {cell}")]
    ReciprocalNotFound { cell: usize, neighbour: usize },

    #[error("cell {cell} lists cell {neighbour} as a neighbour more than once")]
    DuplicateRelation { cell: usize, neighbour: usize },

    #[error("adjacency refers to cell {cell} but the mesh has {n_cells} cells")]
    CellOutOfBounds { cell: usize, n_cells: usize },

    #[error("expected {expected} relative volumes, found {found}")]
    VolumeLengthMismatch { expected: usize, found: usize },

    #[error("malformed mesh extents: {0}")]
    MalformedExtents(String),

    #[error("failed to infer particle from \"{0}\"")]
    FailedToInferParticle(String),
}
