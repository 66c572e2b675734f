use super::{secant, solve_tridiagonal};
use crate::config::CubicBoundary;

/// C2 cubic spline through one strictly increasing run.
///
/// Solves for the second derivatives `Z`, writes the first derivatives into
/// `yp` and returns `Z`.
///
/// Not-a-knot needs four nodes. On three nodes it degrades to parabolic
/// runout. Two nodes always give the straight line.
pub fn cubic(x: &[f64], y: &[f64], yp: &mut [f64], start: CubicBoundary, end: CubicBoundary) -> Vec<f64> {
    let n = x.len();
    if n == 2 {
        let slope = secant(x, y, 0);
        yp[0] = slope;
        yp[1] = slope;
        return vec![0.0; 2];
    }

    let start = degrade(start, n);
    let end = degrade(end, n);

    let mut lower = vec![0.0; n];
    let mut diag = vec![2.0; n];
    let mut upper = vec![0.0; n];
    let mut z = vec![0.0; n];

    for i in 1..n - 1 {
        let hl = x[i] - x[i - 1];
        let hr = x[i + 1] - x[i];
        let hh = hl + hr;
        lower[i] = hl / hh;
        upper[i] = hr / hh;
        z[i] = 6.0 * (secant(x, y, i) - secant(x, y, i - 1)) / hh;
    }

    // third derivative continuity ratios, used by not-a-knot
    let r0 = (x[1] - x[0]) / (x[2] - x[1]);
    let rn = (x[n - 1] - x[n - 2]) / (x[n - 2] - x[n - 3]);

    match start {
        CubicBoundary::Natural => {
            diag[0] = 1.0;
            z[0] = 0.0;
        }
        CubicBoundary::ParabolicRunout => {
            diag[0] = 1.0;
            upper[0] = -1.0;
            z[0] = 0.0;
        }
        CubicBoundary::NotAKnot => {
            // Z0 = (1 + r) Z1 - r Z2, folded into row 1
            diag[0] = 1.0;
            z[0] = 0.0;
            diag[1] += lower[1] * (1.0 + r0);
            upper[1] -= lower[1] * r0;
            lower[1] = 0.0;
        }
        CubicBoundary::Extrapolate => {
            diag[0] = 1.0;
            z[0] = end_curvature(&x[..n.min(4)], &y[..n.min(4)], 0);
        }
    }

    match end {
        CubicBoundary::Natural => {
            diag[n - 1] = 1.0;
            z[n - 1] = 0.0;
        }
        CubicBoundary::ParabolicRunout => {
            diag[n - 1] = 1.0;
            lower[n - 1] = -1.0;
            z[n - 1] = 0.0;
        }
        CubicBoundary::NotAKnot => {
            // Z[n-1] = (1 + r) Z[n-2] - r Z[n-3], folded into row n-2
            diag[n - 1] = 1.0;
            z[n - 1] = 0.0;
            diag[n - 2] += upper[n - 2] * (1.0 + rn);
            lower[n - 2] -= upper[n - 2] * rn;
            upper[n - 2] = 0.0;
        }
        CubicBoundary::Extrapolate => {
            let k = n.min(4);
            diag[n - 1] = 1.0;
            z[n - 1] = end_curvature(&x[n - k..], &y[n - k..], k - 1);
        }
    }

    solve_tridiagonal(&lower, &mut diag, &upper, &mut z);

    if start == CubicBoundary::NotAKnot {
        z[0] = (1.0 + r0) * z[1] - r0 * z[2];
    }
    if end == CubicBoundary::NotAKnot {
        z[n - 1] = (1.0 + rn) * z[n - 2] - rn * z[n - 3];
    }

    for i in 0..n - 1 {
        let dx = x[i + 1] - x[i];
        yp[i] = secant(x, y, i) - (2.0 * z[i] + z[i + 1]) * dx / 6.0;
    }
    let dx = x[n - 1] - x[n - 2];
    yp[n - 1] = yp[n - 2] + dx * (z[n - 2] + z[n - 1]) / 2.0;

    z
}

fn degrade(boundary: CubicBoundary, n: usize) -> CubicBoundary {
    if boundary == CubicBoundary::NotAKnot && n < 4 {
        log::warn!("not-a-knot needs 4 points, run has {}: using parabolic runout", n);
        return CubicBoundary::ParabolicRunout;
    }
    boundary
}

/// Second derivative at `x[at]` of the polynomial interpolating all of `x`, `y`
/// (at most four points, Newton form).
fn end_curvature(x: &[f64], y: &[f64], at: usize) -> f64 {
    let k = x.len();
    let mut c = y.to_vec();
    for level in 1..k {
        for i in (level..k).rev() {
            c[i] = (c[i] - c[i - 1]) / (x[i] - x[i - level]);
        }
    }
    let t = x[at];
    let mut curvature = 2.0 * c[2];
    if k > 3 {
        curvature += 2.0 * c[3] * ((t - x[0]) + (t - x[1]) + (t - x[2]));
    }
    curvature
}
