use super::{secant, sign_test};

/// Shape preserving slopes (Fritsch-Carlson with Butland's interior weights).
///
/// Interior slopes vanish at local extrema of the data. End slopes come from a
/// non centered three point formula, zeroed when they disagree in sign with the
/// adjacent secant and limited to three times that secant across a sign change.
pub fn pchip(x: &[f64], y: &[f64], yp: &mut [f64]) {
    let n = x.len();
    if n == 2 {
        let slope = secant(x, y, 0);
        yp[0] = slope;
        yp[1] = slope;
        return;
    }

    let mut h1 = x[1] - x[0];
    let mut del1 = secant(x, y, 0);
    let mut h2 = x[2] - x[1];
    let mut del2 = secant(x, y, 1);

    let mut hsum = h1 + h2;
    let w1 = (h1 + hsum) / hsum;
    let w2 = -h1 / hsum;
    yp[0] = limit_end(w1 * del1 + w2 * del2, del1, del2);

    for i in 1..n - 1 {
        if i > 1 {
            h1 = h2;
            h2 = x[i + 1] - x[i];
            hsum = h1 + h2;
            del1 = del2;
            del2 = secant(x, y, i);
        }
        yp[i] = 0.0;
        if sign_test(del1, del2) > 0 {
            let w1 = (1.0 + h1 / hsum) / 3.0;
            let w2 = (1.0 + h2 / hsum) / 3.0;
            let dmax = del1.abs().max(del2.abs());
            let dmin = del1.abs().min(del2.abs());
            let drat1 = del1 / dmax;
            let drat2 = del2 / dmax;
            yp[i] = dmin / (w1 * drat1 + w2 * drat2);
        }
    }

    let w1 = -h2 / hsum;
    let w2 = (h2 + hsum) / hsum;
    yp[n - 1] = limit_end(w1 * del1 + w2 * del2, del2, del1);
}

/// Applies the end rule to slope `d` next to secant `near` (with `far` the
/// secant after it).
fn limit_end(d: f64, near: f64, far: f64) -> f64 {
    if sign_test(d, near) <= 0 {
        0.0
    } else if sign_test(near, far) < 0 && d.abs() > (3.0 * near).abs() {
        3.0 * near
    } else {
        d
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;
    use crate::hermite;

    #[test]
    fn flat_start() {
        let x = [0.0, 1.0, 2.0];
        let y = [0.0, 0.0, 1.0];
        let mut yp = [0.0; 3];
        pchip(&x, &y, &mut yp);
        assert_eq!(yp[0], 0.0);
        assert_eq!(yp[1], 0.0);
        assert!(yp[2] > 0.0);
    }

    #[test]
    fn extremum_gets_zero_slope() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 2.0, 1.0, 3.0];
        let mut yp = [0.0; 4];
        pchip(&x, &y, &mut yp);
        assert_eq!(yp[1], 0.0);
        assert_eq!(yp[2], 0.0);
    }

    #[test]
    fn end_limited_to_three_secants() {
        let x = [0.0, 1.0, 1.1];
        let y = [0.0, 1.0, -5.0];
        let mut yp = [0.0; 3];
        pchip(&x, &y, &mut yp);
        assert_approx_eq!(yp[0], 3.0, 1e-12);
    }

    #[test]
    fn monotone_data_gives_monotone_segments() {
        let mut rng = StdRng::seed_from_u64(3);
        let n = 30;
        let mut x = vec![0.0; n];
        let mut y = vec![0.0; n];
        for k in 1..n {
            x[k] = x[k - 1] + rng.gen_range(0.05..2.0);
            y[k] = y[k - 1] + rng.gen_range(0.001..5.0);
        }
        let mut yp = vec![0.0; n];
        pchip(&x, &y, &mut yp);
        for i in 0..n - 1 {
            let h = x[i + 1] - x[i];
            let mut previous = y[i];
            for s in 1..=100 {
                let t = h * s as f64 / 100.0;
                let value = hermite::dot(&hermite::cubic(t, h), &[y[i], y[i + 1], yp[i], yp[i + 1]]);
                assert!(value >= previous - 1e-12, "segment {} not monotone", i);
                previous = value;
            }
        }
    }
}
