//! Parametric curves through points in `R^dim`.

use std::fmt;

use crate::{
    error::{Result, SplineError},
    hermite,
    search::SearchCache,
    spline::Spline1D,
};

/// Cubic Hermite curve sharing one knot vector across all components, with
/// Catmull-Rom slopes.
#[derive(Debug, Clone)]
pub struct SplineVec {
    name: String,
    knots: Vec<f64>,
    y: Vec<Vec<f64>>,
    yp: Vec<Vec<f64>>,
    cache: SearchCache,
}

impl SplineVec {
    pub fn new(name: &str) -> Self {
        SplineVec {
            name: name.to_string(),
            knots: Vec::new(),
            y: Vec::new(),
            yp: Vec::new(),
            cache: SearchCache::per_thread(),
        }
    }

    /// Loads the points, one slice of coordinates per component. Knots and
    /// slopes must be recomputed afterwards.
    pub fn setup(&mut self, components: &[&[f64]]) -> Result<()> {
        let npts = components.first().map_or(0, |c| c.len());
        if npts < 2 {
            return Err(SplineError::InsufficientPoints { kind: "vector", required: 2, found: npts });
        }
        for c in components {
            if c.len() != npts {
                return Err(SplineError::DimensionMismatch { what: "component", expected: npts, found: c.len() });
            }
            if let Some(index) = c.iter().position(|v| !v.is_finite()) {
                return Err(SplineError::NonFiniteInput { what: "component", index });
            }
        }
        self.y = components.iter().map(|c| c.to_vec()).collect();
        self.yp = vec![vec![0.0; npts]; components.len()];
        self.knots.clear();
        self.cache.reset();
        Ok(())
    }

    /// Loads `npts` points of `dim` components from a column major matrix,
    /// component `k` of point `j` sitting at `points[k + j * ld]`.
    pub fn setup_strided(&mut self, dim: usize, npts: usize, points: &[f64], ld: usize) -> Result<()> {
        if ld < dim {
            return Err(SplineError::DimensionMismatch { what: "ldY", expected: dim, found: ld });
        }
        let needed = if npts == 0 { 0 } else { (npts - 1) * ld + dim };
        if points.len() < needed {
            return Err(SplineError::DimensionMismatch { what: "Y", expected: needed, found: points.len() });
        }
        let components: Vec<Vec<f64>> = (0..dim).map(|k| (0..npts).map(|j| points[k + j * ld]).collect()).collect();
        let borrowed: Vec<&[f64]> = components.iter().map(Vec::as_slice).collect();
        self.setup(&borrowed)
    }

    /// Uses the given knots, which must be strictly increasing.
    pub fn set_knots(&mut self, knots: &[f64]) -> Result<()> {
        if knots.len() != self.num_points() {
            return Err(SplineError::DimensionMismatch {
                what: "knots",
                expected: self.num_points(),
                found: knots.len(),
            });
        }
        for (index, pair) in knots.windows(2).enumerate() {
            if !(pair[0] < pair[1]) {
                return Err(SplineError::NonMonotoneNodes { index: index + 1, previous: pair[0], current: pair[1] });
            }
        }
        self.knots = knots.to_vec();
        self.cache.reset();
        Ok(())
    }

    /// Knots proportional to the cumulated distance between points, on `[0, 1]`.
    pub fn set_knots_chord_length(&mut self) -> Result<()> {
        let chords = self.chords();
        self.cumulate(chords)
    }

    /// Knots proportional to the cumulated square root of the distances.
    pub fn set_knots_centripetal(&mut self) -> Result<()> {
        let chords = self.chords().into_iter().map(f64::sqrt).collect();
        self.cumulate(chords)
    }

    fn chords(&self) -> Vec<f64> {
        (0..self.num_points().saturating_sub(1))
            .map(|j| {
                self.y
                    .iter()
                    .map(|c| (c[j + 1] - c[j]).powi(2))
                    .sum::<f64>()
                    .sqrt()
            })
            .collect()
    }

    fn cumulate(&mut self, lengths: Vec<f64>) -> Result<()> {
        let total: f64 = lengths.iter().sum();
        let mut knots = Vec::with_capacity(lengths.len() + 1);
        let mut acc = 0.0;
        knots.push(0.0);
        for l in &lengths {
            acc += l;
            knots.push(acc / total);
        }
        if let Some(last) = knots.last_mut() {
            *last = 1.0;
        }
        self.set_knots(&knots)
    }

    /// Catmull-Rom slopes on the current knots. Interior slopes blend the two
    /// adjacent differences, end slopes use the one sided three point rule.
    pub fn catmull_rom(&mut self) -> Result<()> {
        let n = self.num_points();
        if self.knots.len() != n {
            return Err(SplineError::NotBuilt);
        }
        let t = &self.knots;
        for (y, yp) in self.y.iter().zip(self.yp.iter_mut()) {
            if n == 2 {
                let slope = (y[1] - y[0]) / (t[1] - t[0]);
                yp[0] = slope;
                yp[1] = slope;
                continue;
            }
            for j in 1..n - 1 {
                let l1 = t[j] - t[j - 1];
                let l2 = t[j + 1] - t[j];
                let ll = l1 + l2;
                yp[j] = (l2 / l1) / ll * (y[j] - y[j - 1]) + (l1 / l2) / ll * (y[j + 1] - y[j]);
            }

            let (l1, l2) = (t[1] - t[0], t[2] - t[1]);
            let ll = l1 + l2;
            yp[0] = ll / (l1 * l2) * (y[1] - y[0]) - (l1 / l2) / ll * (y[2] - y[0]);

            let last = n - 1;
            let (l1, l2) = (t[last] - t[last - 1], t[last - 1] - t[last - 2]);
            let ll = l1 + l2;
            yp[last] = (l1 / l2) / ll * (y[last - 2] - y[last]) - ll / (l1 * l2) * (y[last - 1] - y[last]);
        }
        log::debug!("catmull-rom slopes for curve '{}' ({} points, dim {})", self.name, n, self.dim());
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dim(&self) -> usize {
        self.y.len()
    }

    pub fn num_points(&self) -> usize {
        self.y.first().map_or(0, Vec::len)
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn y_nodes(&self, component: usize) -> &[f64] {
        &self.y[component]
    }

    pub fn yp_nodes(&self, component: usize) -> &[f64] {
        &self.yp[component]
    }

    pub fn x_min(&self) -> f64 {
        self.knots.first().copied().unwrap_or(f64::NAN)
    }

    pub fn x_max(&self) -> f64 {
        self.knots.last().copied().unwrap_or(f64::NAN)
    }

    fn weights(&self, t: f64, order: usize) -> Option<(usize, hermite::Cubic)> {
        if self.knots.len() < 2 {
            return None;
        }
        let i = self.cache.find(&self.knots, t);
        let h = self.knots[i + 1] - self.knots[i];
        Some((i, hermite::cubic_order(order, t - self.knots[i], h)))
    }

    fn component(&self, i: usize, w: &hermite::Cubic, k: usize) -> f64 {
        let (y, yp) = (&self.y[k], &self.yp[k]);
        hermite::dot(w, &[y[i], y[i + 1], yp[i], yp[i + 1]])
    }

    /// Derivative `order` of component `k` at parameter `t`; NaN before knots
    /// are set.
    pub fn eval_order(&self, t: f64, k: usize, order: usize) -> f64 {
        match self.weights(t, order) {
            Some((i, w)) => self.component(i, &w, k),
            None => f64::NAN,
        }
    }

    /// Derivative `order` of every component at parameter `t`.
    pub fn eval_all_order(&self, t: f64, order: usize) -> Vec<f64> {
        match self.weights(t, order) {
            Some((i, w)) => (0..self.dim()).map(|k| self.component(i, &w, k)).collect(),
            None => vec![f64::NAN; self.dim()],
        }
    }

    pub fn eval(&self, t: f64, k: usize) -> f64 {
        self.eval_order(t, k, 0)
    }

    pub fn d(&self, t: f64, k: usize) -> f64 {
        self.eval_order(t, k, 1)
    }

    pub fn dd(&self, t: f64, k: usize) -> f64 {
        self.eval_order(t, k, 2)
    }

    pub fn ddd(&self, t: f64, k: usize) -> f64 {
        self.eval_order(t, k, 3)
    }

    pub fn eval_all(&self, t: f64) -> Vec<f64> {
        self.eval_all_order(t, 0)
    }

    pub fn d_all(&self, t: f64) -> Vec<f64> {
        self.eval_all_order(t, 1)
    }

    pub fn dd_all(&self, t: f64) -> Vec<f64> {
        self.eval_all_order(t, 2)
    }

    pub fn ddd_all(&self, t: f64) -> Vec<f64> {
        self.eval_all_order(t, 3)
    }

    /// Signed curvature of the first two components.
    pub fn curvature(&self, t: f64) -> f64 {
        planar([self.d(t, 0), self.dd(t, 0), 0.0, 0.0], [self.d(t, 1), self.dd(t, 1), 0.0, 0.0]).0
    }

    /// Derivative of [`SplineVec::curvature`] along the parameter.
    pub fn curvature_d(&self, t: f64) -> f64 {
        let x = [self.d(t, 0), self.dd(t, 0), self.ddd(t, 0), 0.0];
        let y = [self.d(t, 1), self.dd(t, 1), self.ddd(t, 1), 0.0];
        planar(x, y).1
    }

    pub fn info(&self) -> String {
        format!(
            "vector spline '{}': dim {}, {} points, t in [{}, {}]",
            self.name,
            self.dim(),
            self.num_points(),
            self.x_min(),
            self.x_max()
        )
    }
}

impl fmt::Display for SplineVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.info())?;
        for (j, t) in self.knots.iter().enumerate() {
            let point: Vec<f64> = self.y.iter().map(|c| c[j]).collect();
            writeln!(f, "t = {} P = {:?}", t, point)?;
        }
        Ok(())
    }
}

/// Curvature and its first two derivatives for a planar curve, given
/// `[x', x'', x''', x'''']` and the same for `y`.
fn planar(x: [f64; 4], y: [f64; 4]) -> (f64, f64, f64) {
    let [x1, x2, x3, x4] = x;
    let [y1, y2, y3, y4] = y;

    let n = x1 * y2 - y1 * x2;
    let n1 = x1 * y3 - y1 * x3;
    let n2 = x2 * y3 + x1 * y4 - y2 * x3 - y1 * x4;

    let d = x1 * x1 + y1 * y1;
    let d1 = 2.0 * (x1 * x2 + y1 * y2);
    let d2 = 2.0 * (x2 * x2 + x1 * x3 + y2 * y2 + y1 * y3);

    let s = d.sqrt();
    let p3 = d * s;
    let p5 = p3 * d;
    let p7 = p5 * d;

    let k = n / p3;
    let k1 = n1 / p3 - 1.5 * n * d1 / p5;
    let k2 = n2 / p3 - 3.0 * n1 * d1 / p5 - 1.5 * n * d2 / p5 + 3.75 * n * d1 * d1 / p7;
    (k, k1, k2)
}

fn derivatives(spline: &Spline1D, s: f64) -> [f64; 4] {
    [spline.d(s), spline.dd(s), spline.ddd(s), spline.dddd(s)]
}

/// Signed curvature at `s` of the planar curve `(x(s), y(s))`.
pub fn curvature(s: f64, x: &Spline1D, y: &Spline1D) -> f64 {
    planar(derivatives(x, s), derivatives(y, s)).0
}

/// Derivative of [`curvature`] with respect to `s`.
pub fn curvature_d(s: f64, x: &Spline1D, y: &Spline1D) -> f64 {
    planar(derivatives(x, s), derivatives(y, s)).1
}

/// Second derivative of [`curvature`] with respect to `s`.
pub fn curvature_dd(s: f64, x: &Spline1D, y: &Spline1D) -> f64 {
    planar(derivatives(x, s), derivatives(y, s)).2
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use assert_approx_eq::assert_approx_eq;

    use super::*;
    use crate::config::SplineType;

    #[test]
    fn chord_length_and_centripetal_knots() {
        let xs = [0.0, 3.0, 3.0, 7.0];
        let ys = [0.0, 4.0, 4.0 + 9.0, 4.0 + 9.0 + 3.0];
        // chords 5, 9, 5
        let mut curve = SplineVec::new("path");
        curve.setup(&[&xs, &ys]).unwrap();
        curve.set_knots_chord_length().unwrap();
        assert_eq!(curve.knots(), &[0.0, 5.0 / 19.0, 14.0 / 19.0, 1.0]);

        curve.set_knots_centripetal().unwrap();
        let total = 5f64.sqrt() * 2.0 + 3.0;
        assert_approx_eq!(curve.knots()[1], 5f64.sqrt() / total, 1e-15);
        assert_approx_eq!(curve.knots()[2], (5f64.sqrt() + 3.0) / total, 1e-15);
        assert_eq!(curve.knots()[3], 1.0);
    }

    #[test]
    fn repeated_points_are_rejected() {
        let mut curve = SplineVec::new("stuck");
        curve.setup(&[&[0.0, 1.0, 1.0], &[0.0, 1.0, 1.0]]).unwrap();
        assert!(matches!(curve.set_knots_chord_length(), Err(SplineError::NonMonotoneNodes { .. })));
        assert!(matches!(curve.catmull_rom(), Err(SplineError::NotBuilt)));
        assert!(curve.eval(0.5, 0).is_nan());
    }

    #[test]
    fn catmull_rom_reproduces_quadratics() {
        let t = [0.0, 0.3, 0.5, 1.2, 2.0];
        let x: Vec<f64> = t.iter().map(|v| 2.0 * v - 1.0).collect();
        let y: Vec<f64> = t.iter().map(|v| v * v - v).collect();
        let mut curve = SplineVec::new("parabola");
        curve.setup(&[&x, &y]).unwrap();
        curve.set_knots(&t).unwrap();
        curve.catmull_rom().unwrap();

        for (j, &tj) in t.iter().enumerate() {
            assert_approx_eq!(curve.yp_nodes(0)[j], 2.0, 1e-12);
            assert_approx_eq!(curve.yp_nodes(1)[j], 2.0 * tj - 1.0, 1e-12);
        }
        for s in [0.1, 0.7, 1.9] {
            let p = curve.eval_all(s);
            assert_approx_eq!(p[0], 2.0 * s - 1.0, 1e-12);
            assert_approx_eq!(p[1], s * s - s, 1e-12);
            assert_approx_eq!(curve.dd(s, 1), 2.0, 1e-10);
            assert_eq!(curve.ddd_all(s).len(), 2);
        }
        // x' = 2, y'' = 2, y' = 2s - 1
        let s: f64 = 0.7;
        let expected = 4.0 / (4.0 + (2.0 * s - 1.0).powi(2)).powf(1.5);
        assert_approx_eq!(curve.curvature(s), expected, 1e-10);
    }

    #[test]
    fn strided_points() {
        let points = [0.0, 0.0, 9.0, 1.0, 1.0, 9.0, 2.0, 0.0, 9.0];
        let mut curve = SplineVec::new("zigzag");
        curve.setup_strided(2, 3, &points, 3).unwrap();
        assert_eq!(curve.dim(), 2);
        assert_eq!(curve.y_nodes(1), &[0.0, 1.0, 0.0]);
        assert!(curve.setup_strided(2, 3, &points[..7], 3).is_err());
    }

    #[test]
    fn planar_curvature_matches_finite_differences() {
        // x = s, y = s^3
        let at = |s: f64| planar([1.0, 0.0, 0.0, 0.0], [3.0 * s * s, 6.0 * s, 6.0, 0.0]);
        // Richardson extrapolated central differences
        let derivative = |f: &dyn Fn(f64) -> f64, s: f64| {
            let central = |h: f64| (f(s + h) - f(s - h)) / (2.0 * h);
            (4.0 * central(5e-4) - central(1e-3)) / 3.0
        };
        let s = 0.4;
        let (k, k1, k2) = at(s);
        assert_approx_eq!(k, 6.0 * s / (1.0 + 9.0 * s.powi(4)).powf(1.5), 1e-12);
        let expected = derivative(&|v| at(v).0, s);
        assert_approx_eq!(k1, expected, 1e-7 * expected.abs());
        let expected = derivative(&|v| at(v).1, s);
        assert_approx_eq!(k2, expected, 1e-7 * expected.abs());
    }

    #[test]
    fn circle_has_unit_curvature() {
        let s: Vec<f64> = (0..=40).map(|i| i as f64 * PI / 20.0).collect();
        let xs: Vec<f64> = s.iter().map(|v| v.cos()).collect();
        let ys: Vec<f64> = s.iter().map(|v| v.sin()).collect();
        let x = Spline1D::from_points(SplineType::Quintic, &s, &xs).unwrap();
        let y = Spline1D::from_points(SplineType::Quintic, &s, &ys).unwrap();
        for v in [0.5, 1.3, 2.9, 5.1] {
            assert_approx_eq!(curvature(v, &x, &y), 1.0, 1e-3);
            assert_approx_eq!(curvature_d(v, &x, &y), 0.0, 5e-2);
        }
    }
}
