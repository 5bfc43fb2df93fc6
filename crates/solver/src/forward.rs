//! Forward validation pass
//!
//! Propagates a known external source through the tallied transfer
//! coefficients and checks that the relaxation reproduces the tallied
//! detector responses. This pass never produces importances; it exists to
//! confirm the response matrices are trustworthy before the adjoint run
//! is believed.

// rmx modules
use rmx_mesh::{CellId, MeshGraph};
use rmx_utils::ValueExt;

// crate modules
use crate::coefficients::CoefficientStore;
use crate::error::{Error, Result};
use crate::problem::ResponseMatrixProblem;
use crate::summary::{DetectorCheck, ForwardSummary};
use crate::sweep;

// standard library
use log::{debug, info, warn};

use nalgebra::DVector;
use rayon::prelude::*;

/// Convergence is never tested before this many iterations
///
/// Current injected at a source cell needs a few sweeps to spread through
/// the mesh; testing earlier risks a spurious exit while most of the mesh
/// is still dark.
pub(crate) const MIN_ITERATIONS: usize = 10;

/// Soft threshold on the forward check difference before a warning
const CHECK_TOLERANCE: f64 = 0.05;

pub(crate) fn solve(
    problem: &mut ResponseMatrixProblem,
    source: &[f64],
) -> Result<ForwardSummary> {
    let ng = problem.config.ng;
    let n_cells = problem.graph.len();
    if source.len() != n_cells * ng {
        return Err(Error::SourceLengthMismatch {
            expected: n_cells * ng,
            found: source.len(),
        });
    }

    info!(
        "forward validation over {} cells, {} groups",
        n_cells, ng
    );

    // the source coupling turns external rates into initial outward
    // currents; their total is the balance every later sweep is
    // normalised against
    let mut outward: Vec<DVector<f64>> = problem
        .graph
        .cells()
        .map(|cell| {
            let index = cell.id().index();
            let rates = DVector::from_column_slice(&source[index * ng..(index + 1) * ng]);
            &problem.coefficients.cell(index).source * rates
        })
        .collect();
    let mut scratch: Vec<DVector<f64>> = outward
        .iter()
        .map(|buffer| DVector::zeros(buffer.len()))
        .collect();
    let mut solution = scratch.clone();

    let balance: f64 = outward.iter().map(|buffer| buffer.sum()).sum();

    let mut iterations = 0;
    let mut residual = 0.0;
    let mut history = Vec::new();
    let mut converged = true;

    // a problem with no propagating current (direct source to response
    // only) completes trivially; anything else must iterate
    if balance > 0.0 {
        converged = false;
        for iteration in 1..=problem.config.max_iter {
            let live = sweep(
                &problem.graph,
                &problem.coefficients,
                ng,
                &outward,
                &mut scratch,
                &mut solution,
            );
            std::mem::swap(&mut outward, &mut scratch);

            iterations = iteration;
            residual = live / balance;
            history.push(residual);
            debug!("iteration {iteration}: residual {}", residual.sci(3, 2));

            if iteration >= MIN_ITERATIONS && residual < problem.config.conv_limit {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(
                "forward run not converged after {} iterations (residual {})",
                iterations,
                residual.sci(3, 2)
            );
        }
    }

    let (checks, max_check_difference) = detector_checks(problem, source, &solution);
    if max_check_difference > CHECK_TOLERANCE {
        warn!(
            "forward check difference {} above {}",
            max_check_difference.pct(1),
            CHECK_TOLERANCE.pct(1)
        );
    }

    Ok(ForwardSummary {
        iterations,
        converged,
        residual,
        history,
        checks,
        max_check_difference,
    })
}

/// One parallel gather/transform sweep, returning the live current
///
/// Every cell pulls the previous outward currents from its neighbours,
/// folds them into the accumulated forward solution, and applies its
/// forward transfer matrix to produce the next outward currents.
fn sweep(
    graph: &MeshGraph,
    store: &CoefficientStore,
    ng: usize,
    previous: &[DVector<f64>],
    next: &mut [DVector<f64>],
    solution: &mut [DVector<f64>],
) -> f64 {
    next.par_iter_mut()
        .zip(solution.par_iter_mut())
        .enumerate()
        .map(|(index, (outward, accumulated))| {
            let cell = &graph[CellId(index)];
            let mut inward = DVector::zeros(cell.nmax() * ng);
            sweep::gather(cell, ng, previous, &mut inward);

            *accumulated += &inward;
            outward.gemv(1.0, &store.cell(index).forward, &inward, 0.0);
            outward.sum()
        })
        .sum()
}

/// Reproduce every detector response from the accumulated solution
///
/// The check value is the direct source-to-response contribution plus the
/// inner product of the accumulated inward currents with the detector's
/// forward response coefficients. Compared against the externally tallied
/// response this is a pure diagnostic; a mismatch is reported, never
/// fatal.
fn detector_checks(
    problem: &mut ResponseMatrixProblem,
    source: &[f64],
    solution: &[DVector<f64>],
) -> (Vec<DetectorCheck>, f64) {
    let ng = problem.config.ng;
    let mut checks = Vec::with_capacity(problem.detectors.len());
    let mut max_difference: f64 = 0.0;

    for detector in problem.detectors.iter_mut() {
        let mut computed = 0.0;
        for response in &detector.responses {
            let index = response.cell.index();
            let rates = &source[index * ng..(index + 1) * ng];

            computed += response
                .direct_source
                .iter()
                .zip(rates)
                .map(|(coefficient, rate)| coefficient * rate)
                .sum::<f64>();
            computed += response.forward.dot(&solution[index]);
        }
        detector.forward_check = computed;

        let tallied = detector.tallied_total();
        let relative_difference = if tallied == 0.0 {
            if computed == 0.0 {
                0.0
            } else {
                f64::INFINITY
            }
        } else {
            ((computed - tallied) / tallied).abs()
        };
        max_difference = max_difference.max(relative_difference);

        checks.push(DetectorCheck {
            name: detector.name.clone(),
            tallied,
            computed,
            relative_difference,
        });
    }

    (checks, max_difference)
}
