use super::secant;

/// Bessel slopes: length weighted average of the adjacent secants, with the
/// three point one sided formula at both ends.
pub fn bessel(x: &[f64], y: &[f64], yp: &mut [f64]) {
    let n = x.len();
    if n == 2 {
        let slope = secant(x, y, 0);
        yp[0] = slope;
        yp[1] = slope;
        return;
    }

    let m: Vec<f64> = (0..n - 1).map(|k| secant(x, y, k)).collect();
    for i in 1..n - 1 {
        let dl = x[i] - x[i - 1];
        let dr = x[i + 1] - x[i];
        yp[i] = (dr * m[i - 1] + dl * m[i]) / (dl + dr);
    }
    yp[0] = 1.5 * m[0] - 0.5 * m[1];
    yp[n - 1] = 1.5 * m[n - 2] - 0.5 * m[n - 3];
}
