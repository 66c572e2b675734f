use std::{fmt, io::Write};

use crate::{
    config::{CubicBoundary, QuinticCurvature, QuinticSubType, SplineConfig, SplineType},
    error::{check_finite, Result, SplineError},
    hermite,
    nodes::{ExternalBuffers, NodeSet},
    polynomial::Polynomial,
    search::SearchCache,
    slopes::{self, Estimator},
};

/// One dimensional piecewise polynomial through a set of nodes.
///
/// The kind fixes how per-node derivatives are obtained; evaluation is
/// Hermite based for every kind except `Constant` and `Linear`. The spline can
/// be evaluated from several threads at once once it is built (see
/// [`SearchCache`]), but building and pushing need exclusive access.
#[derive(Debug, Clone)]
pub struct Spline1D<'a> {
    kind: SplineType,
    config: SplineConfig,
    start: CubicBoundary,
    end: CubicBoundary,
    quintic_slopes: QuinticSubType,
    quintic_curvature: QuinticCurvature,
    nodes: NodeSet<'a>,
    cache: SearchCache,
    runs: usize,
}

/// Power basis export of a spline, see [`Spline1D::coeffs`].
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficients {
    pub order: usize,
    pub cfs: Vec<f64>,
    pub nodes: Vec<f64>,
}

impl<'a> Spline1D<'a> {
    pub fn new(kind: SplineType) -> Self {
        Self::with_config(kind, SplineConfig::default())
    }

    pub fn with_config(kind: SplineType, config: SplineConfig) -> Self {
        let cache = SearchCache::new(config.per_thread_cache);
        Spline1D {
            kind,
            config,
            start: CubicBoundary::default(),
            end: CubicBoundary::default(),
            quintic_slopes: QuinticSubType::default(),
            quintic_curvature: QuinticCurvature::default(),
            nodes: NodeSet::new(),
            cache,
            runs: 0,
        }
    }

    /// Factory by type name, e.g. `"pchip"`.
    pub fn from_name(name: &str, type_name: &str) -> Result<Self> {
        let kind = type_name.parse::<SplineType>()?;
        Ok(Self::with_config(kind, SplineConfig::named(name)))
    }

    /// Builds a spline of `kind` through `x`, `y` in one go.
    pub fn from_points(kind: SplineType, x: &[f64], y: &[f64]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(SplineError::DimensionMismatch { what: "Y", expected: x.len(), found: y.len() });
        }
        let mut spline = Self::new(kind);
        spline.build_from(x, 1, y, 1, x.len())?;
        Ok(spline)
    }

    pub fn kind(&self) -> SplineType {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &SplineConfig {
        &self.config
    }

    /// End conditions of the cubic solve (also used by the cubic quintic sub type).
    pub fn set_boundary(&mut self, start: CubicBoundary, end: CubicBoundary) {
        self.start = start;
        self.end = end;
        self.invalidate();
    }

    pub fn set_quintic(&mut self, slopes: QuinticSubType, curvature: QuinticCurvature) {
        self.quintic_slopes = slopes;
        self.quintic_curvature = curvature;
        self.invalidate();
    }

    pub fn set_closed(&mut self, closed: bool) {
        self.config.closed = closed;
    }

    pub fn set_range_check(&mut self, on: bool) {
        self.config.range_check = on;
    }

    pub fn set_extended_constant(&mut self, on: bool) {
        self.config.extended_constant = on;
    }

    // ---- storage -----------------------------------------------------------

    pub fn reserve(&mut self, n: usize) {
        self.nodes.reserve(n);
        self.invalidate();
    }

    /// Writes nodes into caller owned buffers instead of owned storage.
    pub fn reserve_external(&mut self, n: usize, buffers: ExternalBuffers<'a>) -> Result<()> {
        self.nodes.reserve_external(n, buffers)?;
        self.invalidate();
        Ok(())
    }

    pub fn push_back(&mut self, x: f64, y: f64) -> Result<()> {
        self.nodes.push(x, y)
    }

    pub fn push_back_hermite(&mut self, x: f64, y: f64, yp: f64) -> Result<()> {
        self.nodes.push_hermite(x, y, yp)
    }

    pub fn drop_back(&mut self) {
        self.nodes.drop_back();
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.cache.reset();
        self.runs = 0;
    }

    // ---- build -------------------------------------------------------------

    /// Copies `n` strided samples and builds.
    pub fn build_from(&mut self, x: &[f64], incx: usize, y: &[f64], incy: usize, n: usize) -> Result<()> {
        self.nodes.load(x, incx, y, incy, n)?;
        self.build()
    }

    /// Builds a Hermite spline from values and first derivatives.
    pub fn build_hermite(&mut self, x: &[f64], y: &[f64], yp: &[f64]) -> Result<()> {
        self.nodes.load_hermite(x, y, yp)?;
        self.build()
    }

    /// Computes the derivative arrays from the pushed nodes.
    ///
    /// Building again without touching the nodes gives bit identical results.
    pub fn build(&mut self) -> Result<()> {
        let n = self.nodes.len();
        let required = self.kind.min_points();
        if n < required {
            return Err(SplineError::InsufficientPoints { kind: self.kind.name(), required, found: n });
        }
        if n >= 2 && self.nodes.x()[0] >= self.nodes.x()[n - 1] {
            let (min, max) = (self.nodes.x()[0], self.nodes.x()[n - 1]);
            log::error!("{} spline '{}': all {} nodes share x = {}", self.kind, self.config.name, n, min);
            return Err(SplineError::InvalidRange { min, max });
        }
        self.invalidate();

        let estimator = match self.kind {
            SplineType::Constant | SplineType::Linear | SplineType::Hermite => None,
            SplineType::Cubic => Some(Estimator::Cubic { start: self.start, end: self.end }),
            SplineType::Akima => Some(Estimator::Akima),
            SplineType::Bessel => Some(Estimator::Bessel),
            SplineType::Pchip => Some(Estimator::Pchip),
            SplineType::Quintic => Some(Estimator::Quintic {
                slopes: self.quintic_slopes,
                curvature: self.quintic_curvature,
                start: self.start,
                end: self.end,
            }),
        };

        let quintic = self.kind == SplineType::Quintic;
        if self.kind.order() >= 4 {
            self.nodes.ensure_derivatives(quintic)?;
        }
        self.runs = match estimator {
            Some(estimator) => {
                let (x, y, yp, ypp) = self.nodes.split_mut();
                slopes::estimate(estimator, x, y, yp, ypp)
            }
            None => self.nodes.runs().len() - 1,
        };

        if self.config.scan_finite() && self.kind.order() >= 4 {
            let scanned = check_finite(self.nodes.yp(), "Yp")
                .and_then(|_| if quintic { check_finite(self.nodes.ypp(), "Ypp") } else { Ok(()) });
            if let Err(err) = scanned {
                log::error!("{} spline '{}': {}", self.kind, self.config.name, err);
                return Err(err);
            }
        }

        self.nodes.mark_built();
        log::debug!(
            "built {} spline '{}' on {} points in {} runs",
            self.kind,
            self.config.name,
            n,
            self.runs
        );
        Ok(())
    }

    /// Drops the calling thread's interval hint, see [`SearchCache::release`].
    pub fn release_thread(&self) {
        self.cache.release();
    }

    pub fn is_built(&self) -> bool {
        self.nodes.is_built()
    }

    // ---- evaluation --------------------------------------------------------

    pub fn eval(&self, x: f64) -> f64 {
        self.eval_order(x, 0)
    }

    pub fn d(&self, x: f64) -> f64 {
        self.eval_order(x, 1)
    }

    pub fn dd(&self, x: f64) -> f64 {
        self.eval_order(x, 2)
    }

    pub fn ddd(&self, x: f64) -> f64 {
        self.eval_order(x, 3)
    }

    pub fn dddd(&self, x: f64) -> f64 {
        self.eval_order(x, 4)
    }

    pub fn ddddd(&self, x: f64) -> f64 {
        self.eval_order(x, 5)
    }

    /// Value, first and second derivative.
    pub fn eval_with_derivatives(&self, x: f64) -> [f64; 3] {
        [self.eval_order(x, 0), self.eval_order(x, 1), self.eval_order(x, 2)]
    }

    /// Derivative of `order` at `x`, failing outside the node range when range
    /// checking is on.
    pub fn evaluate(&self, x: f64, order: usize) -> Result<f64> {
        if !self.is_built() {
            return Err(SplineError::NotBuilt);
        }
        if self.config.range_check && !self.config.closed {
            let (min, max) = (self.x_min(), self.x_max());
            if !(min <= x && x <= max) {
                return Err(SplineError::OutOfRange { x, min, max });
            }
        }
        Ok(self.eval_order(x, order))
    }

    /// Evaluates derivative `order`. Outside the node range the boundary
    /// polynomial is extended, or the boundary value held when the spline is
    /// configured with `extended_constant`. NaN before the first build.
    pub fn eval_order(&self, x: f64, order: usize) -> f64 {
        if !self.is_built() {
            return f64::NAN;
        }
        let xs = self.nodes.x();
        let ys = self.nodes.y();
        let n = xs.len();
        if n == 1 {
            return if order == 0 { ys[0] } else { 0.0 };
        }

        let x = if self.config.closed { self.wrap(x) } else { x };
        if self.config.extended_constant {
            if x < xs[0] {
                return if order == 0 { ys[0] } else { 0.0 };
            }
            if x > xs[n - 1] {
                return if order == 0 { ys[n - 1] } else { 0.0 };
            }
        }

        let i = self.cache.find(xs, x);
        let h = xs[i + 1] - xs[i];
        let t = x - xs[i];
        match self.kind {
            SplineType::Constant => match order {
                0 if x >= xs[i + 1] => ys[i + 1],
                0 => ys[i],
                _ => 0.0,
            },
            SplineType::Linear => match order {
                0 => ys[i] + (ys[i + 1] - ys[i]) * (t / h),
                1 => (ys[i + 1] - ys[i]) / h,
                _ => 0.0,
            },
            SplineType::Quintic => {
                let yp = self.nodes.yp();
                let ypp = self.nodes.ypp();
                hermite::dot(
                    &hermite::quintic_order(order, t, h),
                    &[ys[i], ys[i + 1], yp[i], yp[i + 1], ypp[i], ypp[i + 1]],
                )
            }
            _ => {
                let yp = self.nodes.yp();
                hermite::dot(&hermite::cubic_order(order, t, h), &[ys[i], ys[i + 1], yp[i], yp[i + 1]])
            }
        }
    }

    fn wrap(&self, x: f64) -> f64 {
        let (min, max) = (self.x_min(), self.x_max());
        let period = max - min;
        if period <= 0.0 || (min <= x && x <= max) {
            return x;
        }
        min + (x - min).rem_euclid(period)
    }

    // ---- inspection --------------------------------------------------------

    pub fn num_points(&self) -> usize {
        self.nodes.len()
    }

    /// Number of strictly increasing runs found by the last build.
    pub fn num_runs(&self) -> usize {
        self.runs
    }

    pub fn x_nodes(&self) -> &[f64] {
        self.nodes.x()
    }

    pub fn y_nodes(&self) -> &[f64] {
        self.nodes.y()
    }

    pub fn yp_nodes(&self) -> &[f64] {
        self.nodes.yp()
    }

    pub fn ypp_nodes(&self) -> &[f64] {
        self.nodes.ypp()
    }

    pub fn x_node(&self, i: usize) -> f64 {
        self.nodes.x()[i]
    }

    pub fn y_node(&self, i: usize) -> f64 {
        self.nodes.y()[i]
    }

    /// First derivative stored at node `i`.
    pub fn yp_node(&self, i: usize) -> f64 {
        self.nodes.yp().get(i).copied().unwrap_or(f64::NAN)
    }

    pub fn x_min(&self) -> f64 {
        self.nodes.x().first().copied().unwrap_or(f64::NAN)
    }

    pub fn x_max(&self) -> f64 {
        self.nodes.x().last().copied().unwrap_or(f64::NAN)
    }

    pub fn y_min(&self) -> f64 {
        self.y_extrema().0
    }

    pub fn y_max(&self) -> f64 {
        self.y_extrema().1
    }

    /// Exact extremes of the spline over its node range.
    pub fn y_extrema(&self) -> (f64, f64) {
        let ys = self.nodes.y();
        let mut lo = ys.iter().copied().fold(f64::INFINITY, f64::min);
        let mut hi = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if self.is_built() && self.kind.order() >= 4 {
            let xs = self.nodes.x();
            for i in 0..xs.len().saturating_sub(1) {
                if xs[i] < xs[i + 1] {
                    let (a, b) = self.segment(i).extrema(xs[i], xs[i + 1]);
                    lo = lo.min(a);
                    hi = hi.max(b);
                }
            }
        }
        (lo, hi)
    }

    /// Power basis polynomial of segment `i`, in `x - X_i`.
    pub fn segment(&self, i: usize) -> Polynomial {
        let xs = self.nodes.x();
        let ys = self.nodes.y();
        let h = xs[i + 1] - xs[i];
        let coefficients = if h <= 0.0 {
            let mut c = vec![0.0; self.kind.order()];
            c[0] = ys[i];
            c
        } else {
            match self.kind {
                SplineType::Constant => vec![ys[i]],
                SplineType::Linear => vec![ys[i], (ys[i + 1] - ys[i]) / h],
                SplineType::Quintic => {
                    let (yp, ypp) = (self.nodes.yp(), self.nodes.ypp());
                    hermite::quintic_to_power(h, ys[i], ys[i + 1], yp[i], yp[i + 1], ypp[i], ypp[i + 1]).to_vec()
                }
                _ => {
                    let yp = self.nodes.yp();
                    hermite::cubic_to_power(h, ys[i], ys[i + 1], yp[i], yp[i + 1]).to_vec()
                }
            }
        };
        Polynomial::new(coefficients, xs[i])
    }

    /// Exports the power basis coefficients of every segment.
    ///
    /// Coefficient `k` of segment `i` lands at `cfs[i + k * nseg]`, or at
    /// `cfs[order * i + k]` when `transpose` is set.
    pub fn coeffs(&self, transpose: bool) -> Result<Coefficients> {
        if !self.is_built() {
            return Err(SplineError::NotBuilt);
        }
        let order = self.kind.order();
        let nseg = self.nodes.len().saturating_sub(1);
        let mut cfs = vec![0.0; order * nseg];
        for i in 0..nseg {
            let segment = self.segment(i);
            for (k, c) in segment.get_coefficients().iter().enumerate() {
                let index = if transpose { order * i + k } else { i + k * nseg };
                cfs[index] = *c;
            }
        }
        Ok(Coefficients { order, cfs, nodes: self.nodes.x().to_vec() })
    }

    /// Fritsch-Carlson monotonicity of the built cubic Hermite data.
    ///
    /// Returns 2 when every segment is strictly monotone in the same
    /// direction, 1 when some segments are flat, 0 when the data itself
    /// changes direction and -1 when some segment leaves the monotone region
    /// although its data would allow it.
    pub fn check_monotonicity(&self) -> i32 {
        let xs = self.nodes.x();
        let ys = self.nodes.y();
        let yp = self.nodes.yp();
        if !self.is_built() || self.kind.order() < 4 || self.kind == SplineType::Quintic {
            return -1;
        }
        let mut flag = 2;
        let mut direction = 0.0;
        for i in 0..xs.len().saturating_sub(1) {
            let h = xs[i + 1] - xs[i];
            if h <= 0.0 {
                continue;
            }
            let slope = (ys[i + 1] - ys[i]) / h;
            if slope == 0.0 {
                if yp[i] != 0.0 || yp[i + 1] != 0.0 {
                    return -1;
                }
                flag = flag.min(1);
                continue;
            }
            if direction * slope < 0.0 {
                return 0;
            }
            direction = slope.signum();
            let a = yp[i] / slope;
            let b = yp[i + 1] / slope;
            if a < 0.0 || b < 0.0 {
                return -1;
            }
            if a <= 3.0 && b <= 3.0 {
                continue;
            }
            // outside the box the slopes must stay on the inner side of the ellipse
            let lean = 2.0 * a + b - 3.0;
            let spread = 2.0 * (a + b - 2.0);
            let margin = a * spread - lean * lean;
            if (spread >= 0.0 && margin < 0.0) || (spread < 0.0 && margin > 0.0) {
                return -1;
            }
        }
        flag
    }

    // ---- mutation after build ----------------------------------------------

    /// Shifts the abscissas so that the first node sits at `x0`.
    pub fn set_origin(&mut self, x0: f64) {
        let Some(&first) = self.nodes.x().first() else {
            return;
        };
        let shift = x0 - first;
        for x in self.nodes.x_mut() {
            *x += shift;
        }
        self.cache.reset();
    }

    /// Maps the node range linearly onto `[xmin, xmax]` keeping the shape.
    pub fn set_range(&mut self, xmin: f64, xmax: f64) -> Result<()> {
        if !(xmin < xmax) {
            return Err(SplineError::InvalidRange { min: xmin, max: xmax });
        }
        let (old_min, old_max) = (self.x_min(), self.x_max());
        if self.nodes.is_empty() || !(old_min < old_max) {
            return Err(SplineError::NotBuilt);
        }
        let scale = (xmax - xmin) / (old_max - old_min);
        for x in self.nodes.x_mut() {
            *x = xmin + (*x - old_min) * scale;
        }
        if self.kind.order() >= 4 {
            for yp in self.nodes.yp_mut() {
                *yp /= scale;
            }
            for ypp in self.nodes.ypp_mut() {
                *ypp /= scale * scale;
            }
        }
        self.cache.reset();
        Ok(())
    }

    // ---- diagnostics -------------------------------------------------------

    /// Writes `intervals + 1` samples of the spline over its range as a tab
    /// separated table.
    pub fn dump<W: Write>(&self, out: &mut W, intervals: usize, header: &str) -> std::io::Result<()> {
        writeln!(out, "{}", header)?;
        let (min, max) = (self.x_min(), self.x_max());
        let intervals = intervals.max(1);
        for k in 0..=intervals {
            let x = min + (max - min) * k as f64 / intervals as f64;
            writeln!(out, "{}\t{}", x, self.eval(x))?;
        }
        Ok(())
    }

    pub fn info(&self) -> String {
        format!(
            "{} spline '{}': {} points, {} runs, x in [{}, {}]{}",
            self.kind,
            self.config.name,
            self.num_points(),
            self.runs,
            self.x_min(),
            self.x_max(),
            if self.config.closed { ", closed" } else { "" }
        )
    }
}

impl fmt::Display for Spline1D<'_> {
    /// Segment by segment listing of the nodes and derivatives.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let xs = self.nodes.x();
        let ys = self.nodes.y();
        let (yp, ypp) = (self.nodes.yp(), self.nodes.ypp());
        let hermite = self.kind.order() >= 4 && yp.len() == xs.len();
        let quintic = self.kind == SplineType::Quintic && ypp.len() == xs.len();
        for i in 0..xs.len().saturating_sub(1) {
            write!(f, "segment N.{:4} X:[{}, {}] Y:[{}, {}]", i, xs[i], xs[i + 1], ys[i], ys[i + 1])?;
            if hermite {
                write!(f, " Yp:[{}, {}]", yp[i], yp[i + 1])?;
            }
            if quintic {
                write!(f, " Ypp:[{}, {}]", ypp[i], ypp[i + 1])?;
            }
            writeln!(f, " slope: {}", (ys[i + 1] - ys[i]) / (xs[i + 1] - xs[i]))?;
        }
        Ok(())
    }
}
