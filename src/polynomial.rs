/// Power basis polynomial in the local variable `x - origin`.
///
/// Segments of a spline export themselves in this form (see
/// [`Spline1D::coeffs`](crate::Spline1D::coeffs)).
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<f64>,
    origin: f64,
}

impl Polynomial {
    pub fn new(coefficients: Vec<f64>, origin: f64) -> Self {
        Polynomial { coefficients, origin }
    }

    pub fn get_coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn get_origin(&self) -> f64 {
        self.origin
    }

    /// Number of coefficients.
    pub fn order(&self) -> usize {
        self.coefficients.len()
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let t = x - self.origin;
        self.coefficients.iter().rev().fold(0.0, |acc, c| acc * t + c)
    }

    pub fn derivative(&self) -> Polynomial {
        let coefficients = self
            .coefficients
            .iter()
            .enumerate()
            .skip(1)
            .map(|(power, c)| power as f64 * c)
            .collect();
        Polynomial::new(coefficients, self.origin)
    }

    /// Real roots inside the open interval `(a, b)`, ascending.
    ///
    /// Closed form up to degree two, bracketing plus bisection above.
    pub fn roots_in(&self, a: f64, b: f64) -> Vec<f64> {
        let c = self.trimmed();
        let mut roots = match c.len() {
            0 | 1 => Vec::new(),
            2 => vec![self.origin - c[0] / c[1]],
            3 => quadratic_roots(c[2], c[1], c[0])
                .into_iter()
                .map(|t| t + self.origin)
                .collect(),
            _ => return self.bracketed_roots(a, b),
        };
        roots.retain(|r| *r > a && *r < b);
        roots.sort_by(f64::total_cmp);
        roots
    }

    /// Smallest and largest value on `[a, b]`.
    pub fn extrema(&self, a: f64, b: f64) -> (f64, f64) {
        let (fa, fb) = (self.evaluate(a), self.evaluate(b));
        let mut lo = fa.min(fb);
        let mut hi = fa.max(fb);
        for r in self.derivative().roots_in(a, b) {
            let v = self.evaluate(r);
            lo = lo.min(v);
            hi = hi.max(v);
        }
        (lo, hi)
    }

    fn trimmed(&self) -> &[f64] {
        let mut len = self.coefficients.len();
        while len > 0 && self.coefficients[len - 1] == 0.0 {
            len -= 1;
        }
        &self.coefficients[..len]
    }

    fn bracketed_roots(&self, a: f64, b: f64) -> Vec<f64> {
        const SUBDIVISIONS: usize = 64;
        let step = (b - a) / SUBDIVISIONS as f64;
        let mut roots = Vec::new();
        let mut left = a;
        let mut f_left = self.evaluate(a);
        for k in 1..=SUBDIVISIONS {
            let right = if k == SUBDIVISIONS { b } else { a + step * k as f64 };
            let f_right = self.evaluate(right);
            if f_left == 0.0 && left > a {
                roots.push(left);
            } else if f_left * f_right < 0.0 {
                roots.push(self.bisect(left, right, f_left));
            }
            left = right;
            f_left = f_right;
        }
        roots
    }

    fn bisect(&self, mut lo: f64, mut hi: f64, f_lo: f64) -> f64 {
        let sign = f_lo.signum();
        for _ in 0..100 {
            let mid = 0.5 * (lo + hi);
            if mid <= lo || mid >= hi {
                break;
            }
            if self.evaluate(mid).signum() == sign {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    }
}

fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    // avoids cancellation between -b and sqrt(disc)
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    if q == 0.0 {
        return vec![0.0];
    }
    vec![q / a, c / q]
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    #[test]
    fn evaluate() {
        let eps = 1e-6;
        let coefficients = vec![1.0, 2.5, -0.25];
        let polynomial = Polynomial::new(coefficients, 0.0);

        assert_approx_eq!(polynomial.evaluate(2.1), 5.1475, eps);
        assert_approx_eq!(polynomial.evaluate(-3.14), -9.3149, eps);
        assert_approx_eq!(polynomial.evaluate(0.0), 1.0, eps);

        let shifted = Polynomial::new(vec![1.0, 2.5, -0.25], 1.0);
        assert_approx_eq!(shifted.evaluate(3.1), 5.1475, eps);
        assert_eq!(shifted.get_origin(), 1.0);
        assert_eq!(shifted.derivative().get_origin(), 1.0);
    }

    #[test]
    fn derivative_and_roots() {
        let eps = 1e-9;
        // (x - 1)(x - 2)(x - 4) around origin 0
        let p = Polynomial::new(vec![-8.0, 14.0, -7.0, 1.0], 0.0);
        let d = p.derivative();
        assert_eq!(d.get_coefficients(), &[14.0, -14.0, 3.0]);

        let roots = d.roots_in(0.0, 5.0);
        assert_eq!(roots.len(), 2);
        for r in roots {
            assert_approx_eq!(d.evaluate(r), 0.0, eps);
        }

        let quartic = Polynomial::new(vec![4.0, 0.0, -5.0, 0.0, 1.0], 0.0);
        let roots = quartic.roots_in(-3.0, 3.0);
        let expected = [-2.0, -1.0, 1.0, 2.0];
        assert_eq!(roots.len(), 4);
        for (r, e) in roots.iter().zip(expected.iter()) {
            assert_approx_eq!(r, e, 1e-9);
        }
    }

    #[test]
    fn extrema_on_interval() {
        let p = Polynomial::new(vec![0.0, 0.0, -1.0], 0.5);
        let (lo, hi) = p.extrema(0.0, 1.0);
        assert_approx_eq!(hi, 0.0, 1e-12);
        assert_approx_eq!(lo, -0.25, 1e-12);
    }
}
