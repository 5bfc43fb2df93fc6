//! Diagnostic summaries returned alongside solver results

// rmx modules
use rmx_utils::ValueExt;

use serde::{Deserialize, Serialize};

/// Forward check result for a single detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorCheck {
    /// Detector name
    pub name: String,
    /// Externally tallied total response
    pub tallied: f64,
    /// Response reproduced by the relaxation
    pub computed: f64,
    /// Relative difference between the two
    pub relative_difference: f64,
}

/// Diagnostics from a forward validation run
///
/// A forward run exists purely to confirm that the relaxation reproduces
/// the Monte-Carlo-tallied detector responses, so everything here is a
/// diagnostic. Neither a missed convergence limit nor a large check
/// difference blocks use of adjoint-derived importances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardSummary {
    /// Iterations performed
    pub iterations: usize,
    /// Whether the live current fraction dropped below the limit
    pub converged: bool,
    /// Final live current fraction
    pub residual: f64,
    /// Live current fraction after every iteration
    pub history: Vec<f64>,
    /// Per-detector check values
    pub checks: Vec<DetectorCheck>,
    /// Largest relative check difference over all detectors
    pub max_check_difference: f64,
}

/// Diagnostics from an adjoint importance run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjointSummary {
    /// Iterations performed
    pub iterations: usize,
    /// Whether the live current fraction dropped below the limit
    pub converged: bool,
    /// Final live current fraction
    pub residual: f64,
    /// Live current fraction after every iteration
    pub history: Vec<f64>,
    /// Importance entries zeroed by the spurious-importance filter
    pub filtered: usize,
}

impl std::fmt::Display for ForwardSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "forward: {} iterations, residual {}, {}, max check difference {}",
            self.iterations,
            self.residual.sci(3, 2),
            converged_tag(self.converged),
            self.max_check_difference.pct(1)
        )
    }
}

impl std::fmt::Display for AdjointSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "adjoint: {} iterations, residual {}, {}, {} entries filtered",
            self.iterations,
            self.residual.sci(3, 2),
            converged_tag(self.converged),
            self.filtered
        )
    }
}

fn converged_tag(converged: bool) -> &'static str {
    if converged {
        "converged"
    } else {
        "not converged"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_summary_reports_check_difference_as_percentage() {
        let summary = ForwardSummary {
            iterations: 12,
            converged: true,
            residual: 5.0e-8,
            history: vec![],
            checks: vec![],
            max_check_difference: 0.05,
        };
        assert_eq!(
            summary.to_string(),
            "forward: 12 iterations, residual 5.000e-08, converged, max check difference 5.0%"
        );
    }
}
