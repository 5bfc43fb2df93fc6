//! Detector definitions and response coefficients

// rmx modules
use rmx_mesh::{CellId, MeshGraph};

// crate modules
use crate::error::{Error, Result};

use nalgebra::DVector;

/// Response coefficients instrumenting a single cell for a detector
///
/// The `forward` and `adjoint` vectors are indexed by boundary slot and
/// group (`slot * ng + group`) and fold boundary currents into detector
/// response; `direct_source` couples the cell's source rates straight to
/// the response without any transport.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorResponse {
    /// Instrumented cell
    pub cell: CellId,
    /// Forward response coefficients per boundary slot and group
    pub forward: DVector<f64>,
    /// Adjoint response coefficients per boundary slot and group
    pub adjoint: DVector<f64>,
    /// Direct source-to-response coefficients per group
    pub direct_source: DVector<f64>,
}

/// A detector with its weighting and externally tallied response
///
/// Detectors are owned by the problem and referenced from the cells they
/// instrument, so one detector may cover any number of cells. The
/// `forward_check` field is an output: the last check value computed by a
/// forward validation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Detector {
    /// Detector name for reports
    pub name: String,
    /// Weighting factor used to combine multiple detectors
    pub weight: f64,
    /// Externally tallied total response per group
    pub tallied: DVector<f64>,
    /// Instrumented cells and their response coefficients
    pub responses: Vec<DetectorResponse>,
    /// Last forward check value computed for this detector
    pub forward_check: f64,
}

impl Detector {
    /// New detector with no instrumented cells yet
    pub fn new(name: impl Into<String>, weight: f64, tallied: DVector<f64>) -> Self {
        Self {
            name: name.into(),
            weight,
            tallied,
            responses: Vec::new(),
            forward_check: 0.0,
        }
    }

    /// Builder-style addition of an instrumented cell
    pub fn with_response(mut self, response: DetectorResponse) -> Self {
        self.responses.push(response);
        self
    }

    /// Tallied response summed over all groups
    pub fn tallied_total(&self) -> f64 {
        self.tallied.sum()
    }

    /// Check weighting and response shapes against the mesh
    pub(crate) fn validate(&self, graph: &MeshGraph, ng: usize) -> Result<()> {
        if self.weight < 0.0 {
            return Err(Error::NegativeDetectorWeight {
                name: self.name.clone(),
                weight: self.weight,
            });
        }

        if self.tallied.len() != ng {
            return Err(Error::TalliedLengthMismatch {
                name: self.name.clone(),
                expected: ng,
                found: self.tallied.len(),
            });
        }

        for response in &self.responses {
            if response.cell.index() >= graph.len() {
                return Err(Error::DetectorCellOutOfBounds {
                    name: self.name.clone(),
                    cell: response.cell.index(),
                    n_cells: graph.len(),
                });
            }

            let m = graph[response.cell].nmax() * ng;
            let lengths = [
                ("forward response", response.forward.len(), m),
                ("adjoint response", response.adjoint.len(), m),
                ("direct source", response.direct_source.len(), ng),
            ];
            for (vector, found, expected) in lengths {
                if found != expected {
                    return Err(Error::ResponseLengthMismatch {
                        name: self.name.clone(),
                        vector,
                        cell: response.cell.index(),
                        expected,
                        found,
                    });
                }
            }
        }

        Ok(())
    }
}
