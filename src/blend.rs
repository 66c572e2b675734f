//! Linear blends `(1 - s) S0 + s S1` of two splines over the same domain.
//!
//! The blend parameter `s` is not clamped, values outside `[0, 1]`
//! extrapolate the blend.

use crate::{
    error::{Result, SplineError},
    spline::Spline1D,
    surface::Spline2D,
};

#[inline]
fn mix(s: f64, first: f64, second: f64) -> f64 {
    (1.0 - s) * first + s * second
}

fn same(what: &'static str, first: f64, second: f64) -> Result<()> {
    if first == second {
        Ok(())
    } else {
        let err = SplineError::IncompatibleBlend { what, first, second };
        log::error!("blend: {}", err);
        Err(err)
    }
}

/// Blend of two built 1-D splines sharing their first and last abscissa.
///
/// The two splines may differ in kind and in their nodes.
#[derive(Debug, Clone)]
pub struct Spline1DBlend<'a> {
    first: Spline1D<'a>,
    second: Spline1D<'a>,
}

impl<'a> Spline1DBlend<'a> {
    pub fn new(first: Spline1D<'a>, second: Spline1D<'a>) -> Result<Self> {
        if !first.is_built() || !second.is_built() {
            return Err(SplineError::NotBuilt);
        }
        same("x_min", first.x_min(), second.x_min())?;
        same("x_max", first.x_max(), second.x_max())?;
        Ok(Spline1DBlend { first, second })
    }

    pub fn first(&self) -> &Spline1D<'a> {
        &self.first
    }

    pub fn second(&self) -> &Spline1D<'a> {
        &self.second
    }

    pub fn into_parts(self) -> (Spline1D<'a>, Spline1D<'a>) {
        (self.first, self.second)
    }

    pub fn x_min(&self) -> f64 {
        self.first.x_min()
    }

    pub fn x_max(&self) -> f64 {
        self.first.x_max()
    }

    /// Blended value at the first node.
    pub fn y_begin(&self, s: f64) -> f64 {
        mix(s, self.first.y_node(0), self.second.y_node(0))
    }

    /// Blended value at the last node.
    pub fn y_end(&self, s: f64) -> f64 {
        let (n0, n1) = (self.first.num_points(), self.second.num_points());
        mix(s, self.first.y_node(n0 - 1), self.second.y_node(n1 - 1))
    }

    /// Moves both splines so that they start at `x0`.
    pub fn set_origin(&mut self, x0: f64) {
        self.first.set_origin(x0);
        self.second.set_origin(x0);
    }

    /// Maps both splines onto `[xmin, xmax]`.
    pub fn set_range(&mut self, xmin: f64, xmax: f64) -> Result<()> {
        self.first.set_range(xmin, xmax)?;
        self.second.set_range(xmin, xmax)
    }

    pub fn eval_order(&self, x: f64, s: f64, order: usize) -> f64 {
        mix(s, self.first.eval_order(x, order), self.second.eval_order(x, order))
    }

    pub fn eval(&self, x: f64, s: f64) -> f64 {
        self.eval_order(x, s, 0)
    }

    pub fn d(&self, x: f64, s: f64) -> f64 {
        self.eval_order(x, s, 1)
    }

    pub fn dd(&self, x: f64, s: f64) -> f64 {
        self.eval_order(x, s, 2)
    }

    pub fn ddd(&self, x: f64, s: f64) -> f64 {
        self.eval_order(x, s, 3)
    }

    pub fn dddd(&self, x: f64, s: f64) -> f64 {
        self.eval_order(x, s, 4)
    }

    pub fn ddddd(&self, x: f64, s: f64) -> f64 {
        self.eval_order(x, s, 5)
    }

    /// Blended value, first and second derivative.
    pub fn eval_with_derivatives(&self, x: f64, s: f64) -> [f64; 3] {
        let a = self.first.eval_with_derivatives(x);
        let b = self.second.eval_with_derivatives(x);
        std::array::from_fn(|k| mix(s, a[k], b[k]))
    }
}

/// Blend of two surfaces on the same rectangle.
#[derive(Debug, Clone)]
pub struct Spline2DBlend {
    first: Spline2D,
    second: Spline2D,
}

impl Spline2DBlend {
    pub fn new(first: Spline2D, second: Spline2D) -> Result<Self> {
        same("x_min", first.x_min(), second.x_min())?;
        same("x_max", first.x_max(), second.x_max())?;
        same("y_min", first.y_min(), second.y_min())?;
        same("y_max", first.y_max(), second.y_max())?;
        Ok(Spline2DBlend { first, second })
    }

    pub fn first(&self) -> &Spline2D {
        &self.first
    }

    pub fn second(&self) -> &Spline2D {
        &self.second
    }

    pub fn into_parts(self) -> (Spline2D, Spline2D) {
        (self.first, self.second)
    }

    pub fn x_min(&self) -> f64 {
        self.first.x_min()
    }

    pub fn x_max(&self) -> f64 {
        self.first.x_max()
    }

    pub fn y_min(&self) -> f64 {
        self.first.y_min()
    }

    pub fn y_max(&self) -> f64 {
        self.first.y_max()
    }

    /// Blended partial derivative of order `ox` in x and `oy` in y.
    pub fn eval_order(&self, x: f64, y: f64, s: f64, ox: usize, oy: usize) -> f64 {
        mix(s, self.first.eval_order(x, y, ox, oy), self.second.eval_order(x, y, ox, oy))
    }

    pub fn eval(&self, x: f64, y: f64, s: f64) -> f64 {
        self.eval_order(x, y, s, 0, 0)
    }

    pub fn dx(&self, x: f64, y: f64, s: f64) -> f64 {
        self.eval_order(x, y, s, 1, 0)
    }

    pub fn dy(&self, x: f64, y: f64, s: f64) -> f64 {
        self.eval_order(x, y, s, 0, 1)
    }

    pub fn dxx(&self, x: f64, y: f64, s: f64) -> f64 {
        self.eval_order(x, y, s, 2, 0)
    }

    pub fn dxy(&self, x: f64, y: f64, s: f64) -> f64 {
        self.eval_order(x, y, s, 1, 1)
    }

    pub fn dyy(&self, x: f64, y: f64, s: f64) -> f64 {
        self.eval_order(x, y, s, 0, 2)
    }

    /// `[value, dx, dy]`.
    pub fn d(&self, x: f64, y: f64, s: f64) -> [f64; 3] {
        let (a, b) = (self.first.d(x, y), self.second.d(x, y));
        std::array::from_fn(|k| mix(s, a[k], b[k]))
    }

    /// `[value, dx, dy, dxx, dxy, dyy]`.
    pub fn dd(&self, x: f64, y: f64, s: f64) -> [f64; 6] {
        let (a, b) = (self.first.dd(x, y), self.second.dd(x, y));
        std::array::from_fn(|k| mix(s, a[k], b[k]))
    }
}
