//! Solver modes and convergence configuration

// rmx modules
use rmx_mesh::Particle;

use serde::{Deserialize, Serialize};

/// What a [ResponseMatrixProblem](crate::ResponseMatrixProblem) solve is for
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum SolverMode {
    /// Forward validation run reproducing tallied detector responses
    Forward,
    /// Adjoint run turning detector responses into importances
    Adjoint,
    /// Adjoint run from track-length responses with spike filtering
    GlobalVr,
    /// Adjoint run feeding iterative weight-window generation
    WeightWindow,
}

impl SolverMode {
    /// Whether the spurious-importance filter runs by default
    ///
    /// Only the global variance reduction mode filters unless explicitly
    /// overridden through [SolverConfig::filter_spikes].
    pub const fn filters_by_default(&self) -> bool {
        matches!(self, SolverMode::GlobalVr)
    }
}

impl std::fmt::Display for SolverMode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            SolverMode::Forward => "forward validation",
            SolverMode::Adjoint => "adjoint importance",
            SolverMode::GlobalVr => "global variance reduction",
            SolverMode::WeightWindow => "weight window generation",
        };
        write!(f, "{name}")
    }
}

/// Energy structure, particle, and convergence parameters for one problem
///
/// ```rust
/// # use rmx_solver::{SolverConfig, SolverMode};
/// # use rmx_mesh::Particle;
/// let config = SolverConfig {
///     ng: 4,
///     particle: Particle::Neutron,
///     mode: SolverMode::Adjoint,
///     ..Default::default()
/// };
///
/// assert_eq!(config.max_iter, 1000);
/// assert!(!config.apply_filter());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Number of energy groups shared by every cell and matrix
    pub ng: usize,
    /// Transported particle type
    pub particle: Particle,
    /// Solver mode for this problem
    pub mode: SolverMode,
    /// Iteration cap for a single relaxation
    pub max_iter: usize,
    /// Converged once the live current fraction drops below this
    pub conv_limit: f64,
    /// Override for the spurious-importance filter
    ///
    /// `None` defers to the mode default, which only filters for
    /// [SolverMode::GlobalVr]. Set `Some(true)` to also filter weight
    /// window generation runs, or `Some(false)` to suppress filtering
    /// entirely.
    pub filter_spikes: Option<bool>,
}

impl SolverConfig {
    /// Configuration with default convergence parameters
    pub fn new(ng: usize, particle: Particle, mode: SolverMode) -> Self {
        Self {
            ng,
            particle,
            mode,
            ..Default::default()
        }
    }

    /// Resolve whether this solve runs the spurious-importance filter
    pub fn apply_filter(&self) -> bool {
        self.filter_spikes
            .unwrap_or_else(|| self.mode.filters_by_default())
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            ng: 1,
            particle: Particle::Unknown,
            mode: SolverMode::Adjoint,
            max_iter: 1000,
            conv_limit: 1.0e-7,
            filter_spikes: None,
        }
    }
}
