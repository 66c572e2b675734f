//! Per-node derivative estimation.
//!
//! Every estimator works on one strictly increasing run. [`estimate`] splits a
//! node array at repeated abscissas and runs the chosen estimator on each run
//! independently.

mod akima;
mod bessel;
mod cubic;
mod pchip;
mod quintic;

pub use akima::akima;
pub use bessel::bessel;
pub use cubic::cubic;
pub use pchip::pchip;
pub use quintic::{quintic, second_derivative_3p};

use crate::config::{CubicBoundary, QuinticCurvature, QuinticSubType};

/// Slope strategy chosen by the spline kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Estimator {
    Akima,
    Bessel,
    Pchip,
    Cubic {
        start: CubicBoundary,
        end: CubicBoundary,
    },
    Quintic {
        slopes: QuinticSubType,
        curvature: QuinticCurvature,
        start: CubicBoundary,
        end: CubicBoundary,
    },
}

/// Fills `yp` (and `ypp` for quintic) run by run and returns the number of runs.
///
/// The cubic end conditions act on the global first and last node only; run
/// seams use not-a-knot.
pub fn estimate(estimator: Estimator, x: &[f64], y: &[f64], yp: &mut [f64], ypp: &mut [f64]) -> usize {
    let n = x.len();
    let mut runs = 0;
    let mut start = 0;
    while start < n {
        let mut stop = start + 1;
        while stop < n && x[stop - 1] < x[stop] {
            stop += 1;
        }
        let run = start..stop;
        let first = start == 0;
        let last = stop == n;

        if run.len() == 1 {
            yp[start] = 0.0;
            if let Some(v) = ypp.get_mut(start) {
                *v = 0.0;
            }
        } else {
            let (xs, ys, yps) = (&x[run.clone()], &y[run.clone()], &mut yp[run.clone()]);
            match estimator {
                Estimator::Akima => akima(xs, ys, yps),
                Estimator::Bessel => bessel(xs, ys, yps),
                Estimator::Pchip => pchip(xs, ys, yps),
                Estimator::Cubic { start: bc0, end: bcn } => {
                    let (bc0, bcn) = run_boundaries(first, last, bc0, bcn);
                    let z = cubic(xs, ys, yps, bc0, bcn);
                    if ypp.len() == n {
                        ypp[run.clone()].copy_from_slice(&z);
                    }
                }
                Estimator::Quintic { slopes, curvature, start: bc0, end: bcn } => {
                    let (bc0, bcn) = run_boundaries(first, last, bc0, bcn);
                    quintic(xs, ys, yps, &mut ypp[run.clone()], slopes, curvature, bc0, bcn);
                }
            }
        }
        runs += 1;
        start = stop;
    }
    runs
}

fn run_boundaries(
    first: bool,
    last: bool,
    start: CubicBoundary,
    end: CubicBoundary,
) -> (CubicBoundary, CubicBoundary) {
    (
        if first { start } else { CubicBoundary::NotAKnot },
        if last { end } else { CubicBoundary::NotAKnot },
    )
}

#[inline]
pub(crate) fn secant(x: &[f64], y: &[f64], i: usize) -> f64 {
    (y[i + 1] - y[i]) / (x[i + 1] - x[i])
}

/// Sign agreement of two numbers: 1 when both share a sign, -1 when they
/// differ, 0 when either vanishes.
#[inline]
pub(crate) fn sign_test(a: f64, b: f64) -> i32 {
    if a == 0.0 || b == 0.0 {
        0
    } else if (a > 0.0) == (b > 0.0) {
        1
    } else {
        -1
    }
}

/// Thomas algorithm. Overwrites `diag` and leaves the solution in `rhs`.
///
/// `lower[0]` and `upper[n - 1]` are ignored. The system must be diagonally
/// dominant, no pivoting takes place.
pub(crate) fn solve_tridiagonal(lower: &[f64], diag: &mut [f64], upper: &[f64], rhs: &mut [f64]) {
    let n = diag.len();
    if n == 0 {
        return;
    }
    for i in 1..n {
        let w = lower[i] / diag[i - 1];
        diag[i] -= w * upper[i - 1];
        rhs[i] -= w * rhs[i - 1];
    }
    rhs[n - 1] /= diag[n - 1];
    for i in (0..n - 1).rev() {
        rhs[i] = (rhs[i] - upper[i] * rhs[i + 1]) / diag[i];
    }
}
