//! Two-point Hermite bases.
//!
//! Every function takes the local offset `t = x - X_i` and the segment width `h`
//! and returns the weights of the control values. For the cubic family the
//! weights multiply `[Y_i, Y_{i+1}, Yp_i, Yp_{i+1}]`, for the quintic family
//! `[Y_i, Y_{i+1}, Yp_i, Yp_{i+1}, Ypp_i, Ypp_{i+1}]`.
//!
//! The quintic expressions keep their expanded form on purpose: the
//! monotonicity checks downstream rely on their exact round-off at `t = 0`
//! and `t = h`.

pub type Cubic = [f64; 4];
pub type Quintic = [f64; 6];

pub fn cubic(t: f64, h: f64) -> Cubic {
    let s = t / h;
    let b1 = s * s * (3.0 - 2.0 * s);
    [1.0 - b1, b1, t * (s * (s - 2.0) + 1.0), t * s * (s - 1.0)]
}

pub fn cubic_d(t: f64, h: f64) -> Cubic {
    let s = t / h;
    let b0 = 6.0 * s * (s - 1.0) / h;
    [b0, -b0, (3.0 * s - 4.0) * s + 1.0, s * (3.0 * s - 2.0)]
}

pub fn cubic_dd(t: f64, h: f64) -> Cubic {
    let s = t / h;
    let b0 = (12.0 * s - 6.0) / (h * h);
    [b0, -b0, (6.0 * s - 4.0) / h, (6.0 * s - 2.0) / h]
}

pub fn cubic_ddd(_t: f64, h: f64) -> Cubic {
    let b0 = 12.0 / (h * h * h);
    let b2 = 6.0 / (h * h);
    [b0, -b0, b2, b2]
}

/// Cubic weights for derivative `order`; orders above 3 vanish.
pub fn cubic_order(order: usize, t: f64, h: f64) -> Cubic {
    match order {
        0 => cubic(t, h),
        1 => cubic_d(t, h),
        2 => cubic_dd(t, h),
        3 => cubic_ddd(t, h),
        _ => [0.0; 4],
    }
}

pub fn quintic(x: f64, h: f64) -> Quintic {
    let t1 = h * h;
    let t4 = x * x;
    let t7 = h - x;
    let t8 = t7 * t7;
    let t9 = t8 * t7;
    let t11 = t1 * t1;
    let t2 = 1.0 / t11;
    let t3 = 1.0 / h;
    let t13 = t3 * t2;
    let t14 = t4 * x;
    let t17 = t4 * t4;
    let t36 = t3 / t1 / 2.0;
    [
        t13 * t9 * (3.0 * x * h + t1 + 6.0 * t4),
        t13 * (-15.0 * h * t17 + 6.0 * t17 * x + 10.0 * t1 * t14),
        t2 * t9 * x * (h + 3.0 * x),
        t2 * (3.0 * x - 4.0 * h) * t7 * t14,
        t36 * t9 * t4,
        t36 * t8 * t14,
    ]
}

pub fn quintic_d(x: f64, h: f64) -> Quintic {
    let t1 = h - x;
    let t2 = t1 * t1;
    let t3 = x * x;
    let t5 = h * h;
    let t6 = t5 * t5;
    let t4 = 1.0 / t6;
    let t7 = 1.0 / h;
    let t10 = 30.0 * t3 * t2 * t7 * t4;
    let t11 = 5.0 * x;
    let t23 = t3 * t3;
    let t30 = t7 / t5 / 2.0;
    [
        -t10,
        t10,
        t4 * (h - 3.0 * x) * (h + t11) * t2,
        t4 * (t3 * (28.0 * x * h - 12.0 * t5) - 15.0 * t23),
        t30 * (2.0 * h - t11) * t2 * x,
        t30 * (3.0 * h - t11) * t3 * t1,
    ]
}

pub fn quintic_dd(x: f64, h: f64) -> Quintic {
    let t1 = h - x;
    let t2 = x * t1;
    let t5 = h * h;
    let t6 = t5 * t5;
    let t3 = 1.0 / t6;
    let t4 = 1.0 / h;
    let t11 = 60.0 * (h - 2.0 * x) * t2 * t4 * t3;
    let t26 = x * x;
    let t31 = t4 / t5;
    [
        -t11,
        t11,
        12.0 * t3 * t1 * (5.0 * x - 3.0 * h) * x,
        12.0 * t3 * t2 * (5.0 * x - 2.0 * h),
        t31 * (10.0 * t26 + t5 - 8.0 * h * x) * t1,
        t31 * (t26 * (10.0 * x - 12.0 * h) + 3.0 * x * t5),
    ]
}

pub fn quintic_ddd(x: f64, h: f64) -> Quintic {
    let t1 = h * h;
    let t3 = h * x;
    let t5 = x * x;
    let t7 = 360.0 * t3 - 60.0 * t1 - 360.0 * t5;
    let t8 = t1 * t1;
    let t9 = 1.0 / t8;
    let t11 = 1.0 / h;
    let t10 = t11 * t9;
    let t14 = 180.0 * t5;
    let t22 = 30.0 * t5;
    let t25 = t11 / t1;
    let b0 = t7 * t10;
    [
        b0,
        -b0,
        t9 * (192.0 * t3 - 36.0 * t1 - t14),
        t9 * (168.0 * t3 - 24.0 * t1 - t14),
        t25 * (36.0 * t3 - 9.0 * t1 - t22),
        t25 * (3.0 * t1 - 24.0 * t3 + t22),
    ]
}

pub fn quintic_dddd(x: f64, h: f64) -> Quintic {
    let t3 = 360.0 * h - 720.0 * x;
    let t4 = h * h;
    let t5 = t4 * t4;
    let t6 = 1.0 / t5;
    let t8 = 1.0 / h;
    let t7 = t8 * t6;
    let t10 = 360.0 * x;
    let t16 = 60.0 * x;
    let t19 = t8 / t4;
    let b0 = t7 * t3;
    [
        b0,
        -b0,
        t6 * (192.0 * h - t10),
        t6 * (168.0 * h - t10),
        t19 * (36.0 * h - t16),
        t19 * (t16 - 24.0 * h),
    ]
}

pub fn quintic_ddddd(_x: f64, h: f64) -> Quintic {
    let t1 = h * h;
    let t2 = t1 * t1;
    let t3 = 1.0 / t2;
    let t4 = 1.0 / h;
    let t5 = 720.0 * t4 * t3;
    let t10 = 60.0 * t4 / t1;
    [-t5, t5, -360.0 * t3, -360.0 * t3, -t10, t10]
}

/// Quintic weights for derivative `order`; orders above 5 vanish.
pub fn quintic_order(order: usize, t: f64, h: f64) -> Quintic {
    match order {
        0 => quintic(t, h),
        1 => quintic_d(t, h),
        2 => quintic_dd(t, h),
        3 => quintic_ddd(t, h),
        4 => quintic_dddd(t, h),
        5 => quintic_ddddd(t, h),
        _ => [0.0; 6],
    }
}

/// Power basis coefficients `[c0, c1, c2, c3]` of the cubic Hermite segment in
/// the local variable `t = x - X_i`.
pub fn cubic_to_power(h: f64, p0: f64, p1: f64, dp0: f64, dp1: f64) -> [f64; 4] {
    let slope = (p1 - p0) / h;
    [
        p0,
        dp0,
        (3.0 * slope - 2.0 * dp0 - dp1) / h,
        (dp0 + dp1 - 2.0 * slope) / (h * h),
    ]
}

/// Power basis coefficients `[c0, .., c5]` of the quintic Hermite segment in
/// the local variable `t = x - X_i`.
pub fn quintic_to_power(
    h: f64,
    p0: f64,
    p1: f64,
    dp0: f64,
    dp1: f64,
    ddp0: f64,
    ddp1: f64,
) -> [f64; 6] {
    let dp = p1 - p0;
    let h2 = h * h;
    let h3 = h2 * h;
    [
        p0,
        dp0,
        ddp0 / 2.0,
        (20.0 * dp - (8.0 * dp1 + 12.0 * dp0) * h - (3.0 * ddp0 - ddp1) * h2) / (2.0 * h3),
        (-30.0 * dp + (14.0 * dp1 + 16.0 * dp0) * h + (3.0 * ddp0 - 2.0 * ddp1) * h2)
            / (2.0 * h3 * h),
        (12.0 * dp - 6.0 * (dp1 + dp0) * h - (ddp0 - ddp1) * h2) / (2.0 * h3 * h2),
    ]
}

#[inline]
pub(crate) fn dot<const N: usize>(weights: &[f64; N], values: &[f64; N]) -> f64 {
    weights.iter().zip(values.iter()).map(|(w, v)| w * v).sum()
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    fn assert_slice_eq(a: &[f64], b: &[f64], eps: f64) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_approx_eq!(x, y, eps);
        }
    }

    #[test]
    fn cubic_end_points() {
        let eps = 1e-14;
        let h = 0.7;
        assert_slice_eq(&cubic(0.0, h), &[1.0, 0.0, 0.0, 0.0], eps);
        assert_slice_eq(&cubic(h, h), &[0.0, 1.0, 0.0, 0.0], eps);
        assert_slice_eq(&cubic_d(0.0, h), &[0.0, 0.0, 1.0, 0.0], eps);
        assert_slice_eq(&cubic_d(h, h), &[0.0, 0.0, 0.0, 1.0], eps);
    }

    #[test]
    fn quintic_end_points() {
        let eps = 1e-12;
        let h = 1.3;
        let unit = |k: usize| {
            let mut e = [0.0; 6];
            e[k] = 1.0;
            e
        };
        assert_slice_eq(&quintic(0.0, h), &unit(0), eps);
        assert_slice_eq(&quintic(h, h), &unit(1), eps);
        assert_slice_eq(&quintic_d(0.0, h), &unit(2), eps);
        assert_slice_eq(&quintic_d(h, h), &unit(3), eps);
        assert_slice_eq(&quintic_dd(0.0, h), &unit(4), eps);
        assert_slice_eq(&quintic_dd(h, h), &unit(5), eps);
    }

    #[test]
    fn partition_of_unity() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let h: f64 = rng.gen_range(0.1..3.0);
            let t = rng.gen_range(0.0..h);
            let c = cubic(t, h);
            assert_approx_eq!(c[0] + c[1], 1.0, 1e-12);
            let q = quintic(t, h);
            assert_approx_eq!(q[0] + q[1], 1.0, 1e-12);
        }
    }

    #[test]
    fn derivatives_match_finite_differences() {
        let eps = 1e-5;
        let delta = 1e-6;
        let h = 1.7;
        let t = 0.45;
        for order in 0..3 {
            let lo = cubic_order(order, t - delta, h);
            let hi = cubic_order(order, t + delta, h);
            let d = cubic_order(order + 1, t, h);
            for k in 0..4 {
                assert_approx_eq!((hi[k] - lo[k]) / (2.0 * delta), d[k], eps);
            }
        }
        for order in 0..5 {
            let lo = quintic_order(order, t - delta, h);
            let hi = quintic_order(order, t + delta, h);
            let d = quintic_order(order + 1, t, h);
            for k in 0..6 {
                assert_approx_eq!((hi[k] - lo[k]) / (2.0 * delta), d[k], 1e-3 * d[k].abs().max(1.0));
            }
        }
        assert_eq!(cubic_order(4, t, h), [0.0; 4]);
        assert_eq!(quintic_order(6, t, h), [0.0; 6]);
    }

    #[test]
    fn power_form_agrees_with_basis() {
        let eps = 1e-10;
        let h = 0.8;
        let (p0, p1, dp0, dp1, ddp0, ddp1) = (1.0, -0.5, 2.0, 0.3, -1.0, 4.0);
        let c = cubic_to_power(h, p0, p1, dp0, dp1);
        let q = quintic_to_power(h, p0, p1, dp0, dp1, ddp0, ddp1);
        for step in 0..=10 {
            let t = h * step as f64 / 10.0;
            let expected = dot(&cubic(t, h), &[p0, p1, dp0, dp1]);
            let value = c[0] + t * (c[1] + t * (c[2] + t * c[3]));
            assert_approx_eq!(value, expected, eps);

            let expected = dot(&quintic(t, h), &[p0, p1, dp0, dp1, ddp0, ddp1]);
            let value = q.iter().rev().fold(0.0, |acc, ck| acc * t + ck);
            assert_approx_eq!(value, expected, eps);
        }
    }
}
