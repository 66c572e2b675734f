use super::{akima, bessel, cubic, pchip, secant, solve_tridiagonal};
use crate::config::{CubicBoundary, QuinticCurvature, QuinticSubType};

/// First and second derivatives for a quintic Hermite spline on one run.
///
/// `Yp` comes from the chosen sub type. `Ypp` either solves the system that
/// makes the third derivative continuous, or is a local three point estimate.
/// Both modes pin the two end values to the second derivative of the cubic
/// Hermite segment implied by `Yp`.
#[allow(clippy::too_many_arguments)]
pub fn quintic(
    x: &[f64],
    y: &[f64],
    yp: &mut [f64],
    ypp: &mut [f64],
    slopes: QuinticSubType,
    curvature: QuinticCurvature,
    start: CubicBoundary,
    end: CubicBoundary,
) {
    let n = x.len();
    match slopes {
        QuinticSubType::Cubic => {
            cubic(x, y, yp, start, end);
        }
        QuinticSubType::Pchip => pchip(x, y, yp),
        QuinticSubType::Akima => akima(x, y, yp),
        QuinticSubType::Bessel => bessel(x, y, yp),
    }

    let h0 = x[1] - x[0];
    ypp[0] = (6.0 * secant(x, y, 0) - 4.0 * yp[0] - 2.0 * yp[1]) / h0;
    let hn = x[n - 1] - x[n - 2];
    ypp[n - 1] = (4.0 * yp[n - 1] + 2.0 * yp[n - 2] - 6.0 * secant(x, y, n - 2)) / hn;
    if n == 2 {
        return;
    }

    match curvature {
        QuinticCurvature::ThirdDerivativeContinuous => continuous_third(x, y, yp, ypp),
        QuinticCurvature::Local => local_curvature(x, y, yp, ypp),
    }
}

/// Three point curvature at each interior node, limited by the estimates at
/// the same node from the neighbouring triples: zero when one of them has the
/// opposite sign, otherwise the one of smallest magnitude.
fn local_curvature(x: &[f64], y: &[f64], yp: &[f64], ypp: &mut [f64]) {
    let n = x.len();
    for i in 1..n - 1 {
        let hl = x[i] - x[i - 1];
        let hr = x[i + 1] - x[i];
        let sl = secant(x, y, i - 1);
        let sr = secant(x, y, i);
        let mut dd = second_derivative_3p(sl, hl, sr, hr, yp[i - 1], yp[i], yp[i + 1]);
        if i > 1 {
            let hll = x[i - 1] - x[i - 2];
            let sll = secant(x, y, i - 2);
            dd = limit(dd, second_derivative_3p_last(sll, hll, sl, hl, yp[i - 2], yp[i - 1], yp[i]));
        }
        if i < n - 2 {
            let hrr = x[i + 2] - x[i + 1];
            let srr = secant(x, y, i + 1);
            dd = limit(dd, second_derivative_3p_first(sr, hr, srr, hrr, yp[i], yp[i + 1], yp[i + 2]));
        }
        ypp[i] = dd;
    }
}

fn continuous_third(x: &[f64], y: &[f64], yp: &[f64], ypp: &mut [f64]) {
    let n = x.len();
    let mut lower = vec![0.0; n];
    let mut diag = vec![1.0; n];
    let mut upper = vec![0.0; n];
    let mut rhs = vec![0.0; n];
    rhs[0] = ypp[0];
    rhs[n - 1] = ypp[n - 1];

    for i in 1..n - 1 {
        let hl = x[i] - x[i - 1];
        let hr = x[i + 1] - x[i];
        lower[i] = -3.0 / hl;
        diag[i] = 9.0 / hl + 9.0 / hr;
        upper[i] = -3.0 / hr;
        rhs[i] = 60.0 * (y[i + 1] - y[i]) / (hr * hr * hr) - 60.0 * (y[i] - y[i - 1]) / (hl * hl * hl)
            + (36.0 * yp[i] + 24.0 * yp[i - 1]) / (hl * hl)
            - (36.0 * yp[i] + 24.0 * yp[i + 1]) / (hr * hr);
    }

    solve_tridiagonal(&lower, &mut diag, &upper, &mut rhs);
    ypp.copy_from_slice(&rhs);
}

/// Estimate of the second derivative at the middle of three nodes, given the
/// two secants, the two widths and the three first derivatives.
///
/// Exact for quartic data.
pub fn second_derivative_3p(sl: f64, hl: f64, sr: f64, hr: f64, dp_l: f64, dp_0: f64, dp_r: f64) -> f64 {
    let hl2 = hl * hl;
    let hr2 = hr * hr;
    let top = hl2 * hl2 * (6.0 * sr - 4.0 * dp_0 - 2.0 * dp_r)
        + hr2 * hr2 * (4.0 * dp_0 + 2.0 * dp_l - 6.0 * sl)
        + hl * hr * (hl2 * (10.0 * sr - 8.0 * dp_0 - 2.0 * dp_r) - hr2 * (10.0 * sl - 8.0 * dp_0 - 2.0 * dp_l));
    let hs = hl + hr;
    top / (hs * hs * hs * hl * hr)
}

/// Same data as [`second_derivative_3p`], second derivative at the first of
/// the three nodes.
fn second_derivative_3p_first(sl: f64, hl: f64, sr: f64, hr: f64, dp_l: f64, dp_0: f64, dp_r: f64) -> f64 {
    let hl2 = hl * hl;
    let hr2 = hr * hr;
    let top = hl2 * hl2 * (4.0 * sr - 2.0 * (dp_0 + dp_r))
        + hr2 * hr2 * (6.0 * sl - 2.0 * dp_0 - 4.0 * dp_l)
        + hl2 * hr2 * (20.0 * sl - 12.0 * dp_0 - 8.0 * dp_l)
        + hl * hr * hr2 * (20.0 * sl - 8.0 * dp_0 - 12.0 * dp_l)
        + hl * hr * hl2 * (10.0 * sr - 8.0 * dp_0 - 2.0 * dp_r);
    let hs = hl + hr;
    top / (hr2 * hl * hs * hs)
}

/// Same data as [`second_derivative_3p`], second derivative at the last of
/// the three nodes.
fn second_derivative_3p_last(sl: f64, hl: f64, sr: f64, hr: f64, dp_l: f64, dp_0: f64, dp_r: f64) -> f64 {
    let hl2 = hl * hl;
    let hr2 = hr * hr;
    let top = hl2 * hl2 * (2.0 * dp_0 + 4.0 * dp_r - 6.0 * sr)
        + hr2 * hr2 * (2.0 * (dp_0 + dp_l) - 4.0 * sl)
        - hl * hr * hl2 * (20.0 * sr - 8.0 * dp_0 - 12.0 * dp_r)
        - hl2 * hr2 * (20.0 * sr - 12.0 * dp_0 - 8.0 * dp_r)
        - hl * hr * hr2 * (10.0 * sl - 8.0 * dp_0 - 2.0 * dp_l);
    let hs = hl + hr;
    top / (hr * hl2 * hs * hs)
}

fn limit(dd: f64, neighbour: f64) -> f64 {
    if dd * neighbour < 0.0 {
        0.0
    } else if neighbour.abs() < dd.abs() {
        neighbour
    } else {
        dd
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;
    use crate::hermite;

    #[test]
    fn three_point_curvature_of_cubic() {
        let f = |v: f64| v * v * v;
        let d = |v: f64| 3.0 * v * v;
        let (a, b, c) = (0.5, 1.2, 2.0);
        let (hl, hr) = (b - a, c - b);
        let sl = (f(b) - f(a)) / hl;
        let sr = (f(c) - f(b)) / hr;
        let dd = second_derivative_3p(sl, hl, sr, hr, d(a), d(b), d(c));
        assert_approx_eq!(dd, 6.0 * b, 1e-10);
    }

    #[test]
    fn cubic_data_is_reproduced() {
        let x = [0.0, 0.5, 1.3, 2.0, 2.2, 3.5];
        let y: Vec<f64> = x.iter().map(|v| v * v * v - 2.0 * v).collect();
        let mut yp = [0.0; 6];
        let mut ypp = [0.0; 6];
        quintic(
            &x,
            &y,
            &mut yp,
            &mut ypp,
            QuinticSubType::Cubic,
            QuinticCurvature::ThirdDerivativeContinuous,
            CubicBoundary::Extrapolate,
            CubicBoundary::Extrapolate,
        );
        for i in 0..6 {
            assert_approx_eq!(yp[i], 3.0 * x[i] * x[i] - 2.0, 1e-9);
            assert_approx_eq!(ypp[i], 6.0 * x[i], 1e-8);
        }
    }

    #[test]
    fn third_derivative_is_continuous() {
        let x = [0.0, 1.0, 1.5, 3.0, 4.0];
        let y = [0.0, 2.0, -1.0, 0.5, 3.0];
        let mut yp = [0.0; 5];
        let mut ypp = [0.0; 5];
        quintic(
            &x,
            &y,
            &mut yp,
            &mut ypp,
            QuinticSubType::Akima,
            QuinticCurvature::ThirdDerivativeContinuous,
            CubicBoundary::Extrapolate,
            CubicBoundary::Extrapolate,
        );
        for i in 1..4 {
            let hl = x[i] - x[i - 1];
            let hr = x[i + 1] - x[i];
            let left = hermite::dot(
                &hermite::quintic_ddd(hl, hl),
                &[y[i - 1], y[i], yp[i - 1], yp[i], ypp[i - 1], ypp[i]],
            );
            let right = hermite::dot(
                &hermite::quintic_ddd(0.0, hr),
                &[y[i], y[i + 1], yp[i], yp[i + 1], ypp[i], ypp[i + 1]],
            );
            assert_approx_eq!(left, right, 1e-9);
        }
    }

    #[test]
    fn one_sided_curvatures_of_quartic() {
        let f = |v: f64| v.powi(4) - 2.0 * v.powi(3) + v;
        let d = |v: f64| 4.0 * v.powi(3) - 6.0 * v * v + 1.0;
        let dd = |v: f64| 12.0 * v * v - 12.0 * v;
        let (a, b, c) = (0.5, 1.2, 2.0);
        let (hl, hr) = (b - a, c - b);
        let sl = (f(b) - f(a)) / hl;
        let sr = (f(c) - f(b)) / hr;
        assert_approx_eq!(second_derivative_3p_first(sl, hl, sr, hr, d(a), d(b), d(c)), dd(a), 1e-10);
        assert_approx_eq!(second_derivative_3p(sl, hl, sr, hr, d(a), d(b), d(c)), dd(b), 1e-10);
        assert_approx_eq!(second_derivative_3p_last(sl, hl, sr, hr, d(a), d(b), d(c)), dd(c), 1e-10);
    }

    #[test]
    fn limiter_keeps_the_smallest_agreeing_estimate() {
        assert_eq!(limit(2.0, 0.5), 0.5);
        assert_eq!(limit(-0.5, -2.0), -0.5);
        assert_eq!(limit(2.0, -0.1), 0.0);
        assert_eq!(limit(-0.3, 4.0), 0.0);
        assert_eq!(limit(0.0, 1.0), 0.0);
    }

    #[test]
    fn local_mode_is_exact_on_convex_quartics() {
        let x: [f64; 6] = [0.5, 0.9, 1.6, 2.0, 2.7, 3.1];
        let y: Vec<f64> = x.iter().map(|v| v.powi(4) + v * v).collect();
        let yp: Vec<f64> = x.iter().map(|v| 4.0 * v.powi(3) + 2.0 * v).collect();
        let mut ypp = [0.0; 6];
        local_curvature(&x, &y, &yp, &mut ypp);
        for i in 1..5 {
            assert_approx_eq!(ypp[i], 12.0 * x[i] * x[i] + 2.0, 1e-8);
        }
    }

    #[test]
    fn local_mode_flattens_disagreeing_neighbours() {
        // the centre estimate at node 2 bends down, the triple to its right bends up
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [0.0, 1.0, 1.5, 1.4, 3.0];
        let yp = [1.0, 0.8, 0.2, 0.0, 2.0];
        let mut ypp = [0.0; 5];
        local_curvature(&x, &y, &yp, &mut ypp);
        let centre = second_derivative_3p(0.5, 1.0, -0.1, 1.0, 0.8, 0.2, 0.0);
        let right = second_derivative_3p_first(-0.1, 1.0, 1.6, 1.0, 0.2, 0.0, 2.0);
        assert!(centre < 0.0 && right > 0.0);
        assert_eq!(ypp[2], 0.0);
    }

    #[test]
    fn local_mode_keeps_end_curvatures() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 1.0, 0.0, 1.0];
        let mut yp = [0.0; 4];
        let mut ypp = [0.0; 4];
        quintic(
            &x,
            &y,
            &mut yp,
            &mut ypp,
            QuinticSubType::Pchip,
            QuinticCurvature::Local,
            CubicBoundary::Extrapolate,
            CubicBoundary::Extrapolate,
        );
        assert_approx_eq!(ypp[0], (6.0 - 4.0 * yp[0] - 2.0 * yp[1]) / 1.0, 1e-12);
        assert_approx_eq!(ypp[3], (4.0 * yp[3] + 2.0 * yp[2] - 6.0) / 1.0, 1e-12);
        assert!(ypp[1] <= 0.0);
        assert!(ypp[2] >= 0.0);
    }
}
