//! Tensor product surfaces on rectangular grids.

mod akima;
mod estimate;

use std::fmt;

use nalgebra::{SMatrix, SVector};

use crate::{
    config::{Spline2DType, SplineConfig},
    error::{check_finite, Result, SplineError},
    hermite,
    search::SearchCache,
};

pub use akima::revised_akima;

/// Sample values on a rectangular grid, stored as `z[i * ny + j]` for the
/// node `(x[i], y[j])`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid2D {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    z_min: f64,
    z_max: f64,
}

impl Grid2D {
    /// Grid from row major values (`z[i * y.len() + j]`).
    pub fn new(x: &[f64], y: &[f64], z: &[f64]) -> Result<Self> {
        Self::from_strided(x, y, z, y.len(), false, false)
    }

    /// Grid from a matrix with leading dimension `ldz`.
    ///
    /// Without flags the value at `(i, j)` is `z[i * ldz + j]`; with
    /// `fortran_storage` it is `z[i + j * ldz]`. `transposed` swaps the roles
    /// of `i` and `j` in the input.
    pub fn from_strided(
        x: &[f64],
        y: &[f64],
        z: &[f64],
        ldz: usize,
        fortran_storage: bool,
        transposed: bool,
    ) -> Result<Self> {
        let (nx, ny) = (x.len(), y.len());
        check_axis(x, "X")?;
        check_axis(y, "Y")?;

        let column_major = fortran_storage != transposed;
        let inner = if column_major { nx } else { ny };
        let outer = if column_major { ny } else { nx };
        if ldz < inner {
            return Err(SplineError::DimensionMismatch { what: "ldZ", expected: inner, found: ldz });
        }
        let needed = (outer - 1) * ldz + inner;
        if z.len() < needed {
            return Err(SplineError::DimensionMismatch { what: "Z", expected: needed, found: z.len() });
        }

        let mut values = Vec::with_capacity(nx * ny);
        for i in 0..nx {
            for j in 0..ny {
                let index = if column_major { i + j * ldz } else { i * ldz + j };
                let value = z[index];
                if !value.is_finite() {
                    return Err(SplineError::NonFiniteInput { what: "Z", index });
                }
                values.push(value);
            }
        }
        let z_min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let z_max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Ok(Grid2D { x: x.to_vec(), y: y.to_vec(), z: values, z_min, z_max })
    }

    pub fn nx(&self) -> usize {
        self.x.len()
    }

    pub fn ny(&self) -> usize {
        self.y.len()
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn z(&self) -> &[f64] {
        &self.z
    }

    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        i * self.y.len() + j
    }

    #[inline]
    pub fn at(&self, i: usize, j: usize) -> f64 {
        self.z[self.index(i, j)]
    }

    pub fn z_min(&self) -> f64 {
        self.z_min
    }

    pub fn z_max(&self) -> f64 {
        self.z_max
    }
}

fn check_axis(nodes: &[f64], what: &'static str) -> Result<()> {
    if nodes.len() < 2 {
        return Err(SplineError::InsufficientPoints { kind: "surface", required: 2, found: nodes.len() });
    }
    for (index, pair) in nodes.windows(2).enumerate() {
        if !pair[0].is_finite() {
            return Err(SplineError::NonFiniteInput { what, index });
        }
        if pair[0] >= pair[1] {
            return Err(SplineError::NonMonotoneNodes { index: index + 1, previous: pair[0], current: pair[1] });
        }
    }
    match nodes.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(SplineError::NonFiniteInput { what, index }),
        None => Ok(()),
    }
}

/// Derivative grids a surface kind evaluates against, each aligned with `Z`.
#[derive(Debug, Clone, PartialEq)]
enum Patches {
    Bilinear,
    Cubic {
        dx: Vec<f64>,
        dy: Vec<f64>,
        dxy: Vec<f64>,
    },
    Quintic {
        dx: Vec<f64>,
        dy: Vec<f64>,
        dxx: Vec<f64>,
        dyy: Vec<f64>,
        dxy: Vec<f64>,
        dxxy: Vec<f64>,
        dxyy: Vec<f64>,
        dxxyy: Vec<f64>,
    },
}

/// Interpolating surface over a [`Grid2D`].
#[derive(Debug, Clone)]
pub struct Spline2D {
    kind: Spline2DType,
    config: SplineConfig,
    grid: Grid2D,
    patches: Patches,
    x_cache: SearchCache,
    y_cache: SearchCache,
}

impl Spline2D {
    /// Builds a surface of `kind` over `grid`.
    pub fn new(kind: Spline2DType, grid: Grid2D) -> Result<Self> {
        Self::with_config(kind, grid, SplineConfig::default())
    }

    pub fn with_config(kind: Spline2DType, grid: Grid2D, config: SplineConfig) -> Result<Self> {
        let patches = match kind {
            Spline2DType::Bilinear => Patches::Bilinear,
            Spline2DType::BiCubic => {
                let (dx, dy, dxy) = estimate::bicubic(&grid);
                Patches::Cubic { dx, dy, dxy }
            }
            Spline2DType::Akima => {
                let (dx, dy, dxy) = revised_akima(&grid)?;
                Patches::Cubic { dx, dy, dxy }
            }
            Spline2DType::BiQuintic => {
                let d = estimate::biquintic(&grid);
                Patches::Quintic {
                    dx: d.dx,
                    dy: d.dy,
                    dxx: d.dxx,
                    dyy: d.dyy,
                    dxy: d.dxy,
                    dxxy: d.dxxy,
                    dxyy: d.dxyy,
                    dxxyy: d.dxxyy,
                }
            }
        };

        let spline = Spline2D {
            kind,
            x_cache: SearchCache::new(config.per_thread_cache),
            y_cache: SearchCache::new(config.per_thread_cache),
            config,
            grid,
            patches,
        };
        if spline.config.scan_finite() {
            spline.scan_finite()?;
        }
        log::debug!(
            "built {} surface '{}' on a {}x{} grid",
            spline.kind,
            spline.config.name,
            spline.grid.nx(),
            spline.grid.ny()
        );
        Ok(spline)
    }

    /// Factory by type name, e.g. `"bicubic"`.
    pub fn from_name(type_name: &str, x: &[f64], y: &[f64], z: &[f64]) -> Result<Self> {
        let kind = type_name.parse::<Spline2DType>()?;
        Self::new(kind, Grid2D::new(x, y, z)?)
    }

    fn scan_finite(&self) -> Result<()> {
        let grids: Vec<(&'static str, &Vec<f64>)> = match &self.patches {
            Patches::Bilinear => Vec::new(),
            Patches::Cubic { dx, dy, dxy } => vec![("DX", dx), ("DY", dy), ("DXY", dxy)],
            Patches::Quintic { dx, dy, dxx, dyy, dxy, dxxy, dxyy, dxxyy } => vec![
                ("DX", dx),
                ("DY", dy),
                ("DXX", dxx),
                ("DYY", dyy),
                ("DXY", dxy),
                ("DXXY", dxxy),
                ("DXYY", dxyy),
                ("DXXYY", dxxyy),
            ],
        };
        for (what, values) in grids {
            if let Err(err) = check_finite(values, what) {
                log::error!("{} surface '{}': {}", self.kind, self.config.name, err);
                return Err(err);
            }
        }
        Ok(())
    }

    pub fn kind(&self) -> Spline2DType {
        self.kind
    }

    pub fn grid(&self) -> &Grid2D {
        &self.grid
    }

    pub fn set_range_check(&mut self, on: bool) {
        self.config.range_check = on;
    }

    pub fn set_extended_constant(&mut self, on: bool) {
        self.config.extended_constant = on;
    }

    /// Drops the calling thread's interval hints on both axes.
    pub fn release_thread(&self) {
        self.x_cache.release();
        self.y_cache.release();
    }

    pub fn x_min(&self) -> f64 {
        self.grid.x[0]
    }

    pub fn x_max(&self) -> f64 {
        self.grid.x[self.grid.nx() - 1]
    }

    pub fn y_min(&self) -> f64 {
        self.grid.y[0]
    }

    pub fn y_max(&self) -> f64 {
        self.grid.y[self.grid.ny() - 1]
    }

    pub fn z_min(&self) -> f64 {
        self.grid.z_min
    }

    pub fn z_max(&self) -> f64 {
        self.grid.z_max
    }

    pub fn eval(&self, x: f64, y: f64) -> f64 {
        self.eval_order(x, y, 0, 0)
    }

    pub fn dx(&self, x: f64, y: f64) -> f64 {
        self.eval_order(x, y, 1, 0)
    }

    pub fn dy(&self, x: f64, y: f64) -> f64 {
        self.eval_order(x, y, 0, 1)
    }

    pub fn dxx(&self, x: f64, y: f64) -> f64 {
        self.eval_order(x, y, 2, 0)
    }

    pub fn dxy(&self, x: f64, y: f64) -> f64 {
        self.eval_order(x, y, 1, 1)
    }

    pub fn dyy(&self, x: f64, y: f64) -> f64 {
        self.eval_order(x, y, 0, 2)
    }

    /// `[value, dx, dy]`.
    pub fn d(&self, x: f64, y: f64) -> [f64; 3] {
        [self.eval(x, y), self.dx(x, y), self.dy(x, y)]
    }

    /// `[value, dx, dy, dxx, dxy, dyy]`.
    pub fn dd(&self, x: f64, y: f64) -> [f64; 6] {
        [
            self.eval(x, y),
            self.dx(x, y),
            self.dy(x, y),
            self.dxx(x, y),
            self.dxy(x, y),
            self.dyy(x, y),
        ]
    }

    /// Value at `(x, y)`, failing outside the grid when range checking is on.
    pub fn evaluate(&self, x: f64, y: f64) -> Result<f64> {
        if self.config.range_check {
            if !(self.x_min() <= x && x <= self.x_max()) {
                return Err(SplineError::OutOfRange { x, min: self.x_min(), max: self.x_max() });
            }
            if !(self.y_min() <= y && y <= self.y_max()) {
                return Err(SplineError::OutOfRange { x: y, min: self.y_min(), max: self.y_max() });
            }
        }
        Ok(self.eval(x, y))
    }

    /// Partial derivative of order `ox` in x and `oy` in y.
    pub fn eval_order(&self, x: f64, y: f64, ox: usize, oy: usize) -> f64 {
        let (mut x, mut y) = (x, y);
        if self.config.extended_constant {
            let (cx, cy) = (x.clamp(self.x_min(), self.x_max()), y.clamp(self.y_min(), self.y_max()));
            if (cx != x && ox > 0) || (cy != y && oy > 0) {
                return 0.0;
            }
            x = cx;
            y = cy;
        }

        let grid = &self.grid;
        let i = self.x_cache.find(&grid.x, x);
        let j = self.y_cache.find(&grid.y, y);
        let hx = grid.x[i + 1] - grid.x[i];
        let hy = grid.y[j + 1] - grid.y[j];
        let tx = x - grid.x[i];
        let ty = y - grid.y[j];

        match &self.patches {
            Patches::Bilinear => bilinear(grid, i, j, tx / hx, ty / hy, hx, hy, ox, oy),
            Patches::Cubic { dx, dy, dxy } => {
                let sources: [[&[f64]; 2]; 2] = [[&grid.z, dy], [dx, dxy]];
                let m = SMatrix::<f64, 4, 4>::from_fn(|r, c| corner(grid, &sources, i, j, r, c));
                let u = SVector::<f64, 4>::from(hermite::cubic_order(ox, tx, hx));
                let v = SVector::<f64, 4>::from(hermite::cubic_order(oy, ty, hy));
                u.dot(&(m * v))
            }
            Patches::Quintic { dx, dy, dxx, dyy, dxy, dxxy, dxyy, dxxyy } => {
                let sources: [[&[f64]; 3]; 3] = [[&grid.z, dy, dyy], [dx, dxy, dxyy], [dxx, dxxy, dxxyy]];
                let m = SMatrix::<f64, 6, 6>::from_fn(|r, c| corner(grid, &sources, i, j, r, c));
                let u = SVector::<f64, 6>::from(hermite::quintic_order(ox, tx, hx));
                let v = SVector::<f64, 6>::from(hermite::quintic_order(oy, ty, hy));
                u.dot(&(m * v))
            }
        }
    }

    pub fn info(&self) -> String {
        format!(
            "{} surface '{}': {}x{} grid, x in [{}, {}], y in [{}, {}], z in [{}, {}]",
            self.kind,
            self.config.name,
            self.grid.nx(),
            self.grid.ny(),
            self.x_min(),
            self.x_max(),
            self.y_min(),
            self.y_max(),
            self.z_min(),
            self.z_max()
        )
    }
}

/// Entry `(r, c)` of the corner matrix: row `r = 2a + p` carries the x
/// derivative `a` at node `i + p`, column `c = 2b + q` the y derivative `b` at
/// node `j + q`.
#[inline]
fn corner<const K: usize>(grid: &Grid2D, sources: &[[&[f64]; K]; K], i: usize, j: usize, r: usize, c: usize) -> f64 {
    let (a, p) = (r / 2, r % 2);
    let (b, q) = (c / 2, c % 2);
    sources[a][b][grid.index(i + p, j + q)]
}

#[allow(clippy::too_many_arguments)]
fn bilinear(grid: &Grid2D, i: usize, j: usize, u: f64, v: f64, hx: f64, hy: f64, ox: usize, oy: usize) -> f64 {
    let z00 = grid.at(i, j);
    let z01 = grid.at(i, j + 1);
    let z10 = grid.at(i + 1, j);
    let z11 = grid.at(i + 1, j + 1);
    match (ox, oy) {
        (0, 0) => (1.0 - u) * (z00 * (1.0 - v) + z01 * v) + u * (z10 * (1.0 - v) + z11 * v),
        (1, 0) => ((z10 - z00) * (1.0 - v) + (z11 - z01) * v) / hx,
        (0, 1) => ((z01 - z00) * (1.0 - u) + (z11 - z10) * u) / hy,
        (1, 1) => (z11 - z10 - z01 + z00) / (hx * hy),
        _ => 0.0,
    }
}

impl fmt::Display for Spline2D {
    /// Patch by patch listing of corner values and first derivatives.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grid = &self.grid;
        writeln!(f, "Nx={} Ny={}", grid.nx(), grid.ny())?;
        for i in 0..grid.nx() - 1 {
            for j in 0..grid.ny() - 1 {
                writeln!(
                    f,
                    "patch ({},{}) DX = {:.4} DY = {:.4} Z = [{:.4}, {:.4}, {:.4}, {:.4}]",
                    i,
                    j,
                    grid.x[i + 1] - grid.x[i],
                    grid.y[j + 1] - grid.y[j],
                    grid.at(i, j),
                    grid.at(i, j + 1),
                    grid.at(i + 1, j),
                    grid.at(i + 1, j + 1)
                )?;
            }
        }
        Ok(())
    }
}
