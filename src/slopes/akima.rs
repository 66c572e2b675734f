use super::secant;

/// Akima slope of one node from the four surrounding secants.
///
/// Each neighbouring secant is weighted by the slope jump on the opposite side.
/// Where both jumps are below `epsilon` the two secants are simply averaged.
fn akima_one(epsilon: f64, d_m2: f64, d_m1: f64, d: f64, d_p1: f64) -> f64 {
    let mut wl = (d_p1 - d).abs();
    let mut wr = (d_m1 - d_m2).abs();
    let mut den = wl + wr;
    if den <= epsilon {
        wl = 0.5;
        wr = 0.5;
        den = 1.0;
    }
    (wl * d_m1 + wr * d) / den
}

/// Akima slopes for one strictly increasing run of at least two nodes.
pub fn akima(x: &[f64], y: &[f64], yp: &mut [f64]) {
    let n = x.len();
    if n == 2 {
        let slope = secant(x, y, 0);
        yp[0] = slope;
        yp[1] = slope;
        return;
    }

    // m[k + 2] is the secant of segment k, two synthetic secants on each side
    let mut m = vec![0.0; n + 3];
    for k in 0..n - 1 {
        m[k + 2] = secant(x, y, k);
    }
    m[1] = 2.0 * m[2] - m[3];
    m[0] = 2.0 * m[1] - m[2];
    m[n + 1] = 2.0 * m[n] - m[n - 1];
    m[n + 2] = 2.0 * m[n + 1] - m[n];

    let epsilon = 1e-8
        * m.windows(2)
            .map(|w| (w[1] - w[0]).abs())
            .fold(0.0, f64::max);

    for i in 0..n {
        yp[i] = akima_one(epsilon, m[i], m[i + 1], m[i + 2], m[i + 3]);
    }
}
