//! Adjoint importance pass
//!
//! The practical run: detector responses seed the mesh, the transposed
//! problem is relaxed to convergence, and the accumulated adjoint
//! currents are normalised into per-cell importances.

// rmx modules
use rmx_mesh::{CellId, MeshGraph};
use rmx_utils::ValueExt;

// crate modules
use crate::coefficients::CoefficientStore;
use crate::error::{Error, Result};
use crate::filter;
use crate::forward::MIN_ITERATIONS;
use crate::problem::ResponseMatrixProblem;
use crate::summary::AdjointSummary;
use crate::sweep;

// standard library
use log::{debug, info, warn};

use itertools::izip;
use nalgebra::DVector;
use rayon::prelude::*;

pub(crate) fn solve(
    problem: &mut ResponseMatrixProblem,
    source: Option<&[f64]>,
) -> Result<AdjointSummary> {
    let ng = problem.config.ng;
    let n_cells = problem.graph.len();
    if let Some(rates) = source {
        if rates.len() != n_cells * ng {
            return Err(Error::SourceLengthMismatch {
                expected: n_cells * ng,
                found: rates.len(),
            });
        }
    }

    info!(
        "adjoint ({}) over {} cells, {} groups, {} detectors",
        problem.config.mode,
        n_cells,
        ng,
        problem.detectors.len()
    );

    let (mut inward, balance, total_response) = seed_from_detectors(problem, source);
    if balance == 0.0 {
        return Err(Error::ZeroCurrentBalance);
    }

    // the seed currents are already part of the accumulated solution
    let mut accumulated_in = inward.clone();
    let mut accumulated_out: Vec<DVector<f64>> = inward
        .iter()
        .map(|buffer| DVector::zeros(buffer.len()))
        .collect();
    let mut scratch = accumulated_out.clone();

    let mut iterations = 0;
    let mut residual = 0.0;
    let mut history = Vec::new();
    let mut converged = false;

    for iteration in 1..=problem.config.max_iter {
        let live = sweep(
            &problem.graph,
            &problem.coefficients,
            ng,
            &inward,
            &mut scratch,
            &mut accumulated_in,
            &mut accumulated_out,
        );
        std::mem::swap(&mut inward, &mut scratch);

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
            "adjoint run not converged after {} iterations (residual {}), \
             importances are best-effort",
            iterations,
            residual.sci(3, 2)
        );
    }

    extract_importances(
        problem,
        &accumulated_in,
        &accumulated_out,
        total_response / balance,
    );

    let filtered = if problem.config.apply_filter() {
        filter::suppress_spikes(&problem.graph, &mut problem.importance)
    } else {
        0
    };

    Ok(AdjointSummary {
        iterations,
        converged,
        residual,
        history,
        filtered,
    })
}

/// Seed the inward-current buffers from the detector responses
///
/// Each detector contributes, at every instrumented boundary slot and
/// group with a positive adjoint response coefficient, a current of
/// `(tallied - direct) * weight / coefficient`. The direct term removes
/// the source-to-response contribution that never transported, and is
/// only available when the caller supplies the source field. The summed
/// contributions form the balance used to normalise convergence.
fn seed_from_detectors(
    problem: &ResponseMatrixProblem,
    source: Option<&[f64]>,
) -> (Vec<DVector<f64>>, f64, f64) {
    let ng = problem.config.ng;
    let mut inward: Vec<DVector<f64>> = problem
        .graph
        .cells()
        .map(|cell| DVector::zeros(cell.nmax() * ng))
        .collect();

    let mut balance = 0.0;
    let mut total_response = 0.0;

    for detector in &problem.detectors {
        total_response += detector.weight * detector.tallied_total();

        for response in &detector.responses {
            let index = response.cell.index();
            for (slot_group, coefficient) in response.adjoint.iter().enumerate() {
                if *coefficient <= 0.0 {
                    continue;
                }
                let group = slot_group % ng;
                let direct = source
                    .map(|rates| response.direct_source[group] * rates[index * ng + group])
                    .unwrap_or(0.0);
                let contribution =
                    (detector.tallied[group] - direct) * detector.weight / coefficient;
                if contribution <= 0.0 {
                    continue;
                }

                inward[index][slot_group] += contribution;
                balance += contribution;
            }
        }
    }

    (inward, balance, total_response)
}

/// One parallel mirror sweep, returning the live current
///
/// Roles are swapped relative to the forward pass: each cell gathers the
/// previous inward currents scattered towards it, accumulates them as
/// outward adjoint solution, and folds them through its adjoint transfer
/// matrix into fresh inward currents. A cell that gathered nothing this
/// sweep is empty and skips the transform, though it stays eligible to
/// receive currents on later sweeps.
#[allow(clippy::too_many_arguments)]
fn sweep(
    graph: &MeshGraph,
    store: &CoefficientStore,
    ng: usize,
    previous: &[DVector<f64>],
    next: &mut [DVector<f64>],
    accumulated_in: &mut [DVector<f64>],
    accumulated_out: &mut [DVector<f64>],
) -> f64 {
    next.par_iter_mut()
        .zip(accumulated_in.par_iter_mut())
        .zip(accumulated_out.par_iter_mut())
        .enumerate()
        .map(|(index, ((inward, acc_in), acc_out))| {
            let cell = &graph[CellId(index)];
            let mut outward = DVector::zeros(cell.nmax() * ng);
            sweep::gather_adjoint(graph, cell, ng, previous, &mut outward);

            if outward.iter().all(|current| *current == 0.0) {
                inward.fill(0.0);
                return 0.0;
            }

            *acc_out += &outward;
            inward.gemv(1.0, &store.cell(index).adjoint, &outward, 0.0);
            *acc_in += &*inward;
            inward.sum()
        })
        .sum()
}

/// Normalise the accumulated adjoint currents into importances
///
/// Boundary importances divide the accumulated inward adjoint solution by
/// the externally tallied net inward current at the same boundary, scaled
/// by `total_response / balance`. The current (cell-average) importance
/// is their current-weighted average per group. The source importance
/// combines the direct-response contribution with the outward adjoint
/// solution folded back through the source coupling.
///
/// Freshly computed zeros never overwrite previously positive values;
/// see [ImportanceMap](crate::ImportanceMap).
fn extract_importances(
    problem: &mut ResponseMatrixProblem,
    accumulated_in: &[DVector<f64>],
    accumulated_out: &[DVector<f64>],
    scale: f64,
) {
    let ng = problem.config.ng;
    let graph = &problem.graph;
    let store = &problem.coefficients;
    let detectors = &problem.detectors;
    let importance = &mut problem.importance;

    for cell in graph.cells() {
        let index = cell.id().index();
        let coefficients = store.cell(index);

        // fold the outward solution back through the source coupling
        let folded = coefficients.source.tr_mul(&accumulated_out[index]);

        for group in 0..ng {
            let mut weighted = 0.0;
            let mut net_current = 0.0;
            for (tallied, accumulated) in izip!(
                coefficients.boundary_current.iter().skip(group).step_by(ng),
                accumulated_in[index].iter().skip(group).step_by(ng),
            ) {
                if *tallied > 0.0 {
                    weighted += accumulated * scale;
                    net_current += tallied;
                }
            }
            let current = if net_current > 0.0 {
                (weighted / net_current).max(0.0)
            } else {
                0.0
            };

            let direct: f64 = detectors
                .iter()
                .flat_map(|detector| {
                    detector
                        .responses
                        .iter()
                        .filter(|response| response.cell.index() == index)
                        .map(move |response| detector.weight * response.direct_source[group])
                })
                .sum();
            let source_importance = ((direct + folded[group]) * scale).max(0.0);

            importance.update_current(index, group, current);
            importance.update_source(index, group, source_importance);
        }

        importance.partial[index].copy_from_slice(accumulated_in[index].as_slice());
    }
}
