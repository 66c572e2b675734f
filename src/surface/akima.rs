//! Revised Akima estimation of `DX`, `DY` and `DXY` on a rectangular grid.
//!
//! Every node gets a 7x7 window of neighbours centred on it. Outside the grid
//! the window is filled by repeating the boundary spacing and extrapolating the
//! values with the quadratic through the three nearest nodes (first along x on
//! the real rows, then along y on every column). Each derivative is a weighted
//! mean of primary estimates from four-point stencils, weighted by the inverse
//! of how badly a plane (or a bilinear patch) fits the stencil.

use nalgebra::{SMatrix, SVector};

use super::Grid2D;
use crate::error::{Result, SplineError};

const HALF: isize = 3;
const WIDTH: usize = 7;
const CENTRE: usize = 3;
const STENCILS: [[usize; 3]; 4] = [[0, 1, 2], [1, 2, 4], [2, 4, 5], [4, 5, 6]];

type Window = [[f64; WIDTH]; WIDTH];

/// `(DX, DY, DXY)` grids, aligned with the values of `grid`.
pub fn revised_akima(grid: &Grid2D) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>)> {
    let size = grid.nx() * grid.ny();
    let mut dx = Vec::with_capacity(size);
    let mut dy = Vec::with_capacity(size);
    let mut dxy = Vec::with_capacity(size);

    for i in 0..grid.nx() {
        let xo = offsets(grid.x(), i);
        for j in 0..grid.ny() {
            let yo = offsets(grid.y(), j);
            let w = window(grid, i, j);
            let z00 = w[CENTRE][CENTRE];

            let along_x: [f64; WIDTH] = std::array::from_fn(|a| w[a][CENTRE]);
            let along_y: [f64; WIDTH] = w[CENTRE];
            let estimates = (slope(&xo, &along_x, z00), slope(&yo, &along_y, z00), cross(&xo, &yo, &w));
            match estimates {
                (Some(x), Some(y), Some(xy)) => {
                    dx.push(x);
                    dy.push(y);
                    dxy.push(xy);
                }
                _ => {
                    let err = SplineError::DegenerateStencil { i, j };
                    log::error!("revised akima surface: {}", err);
                    return Err(err);
                }
            }
        }
    }
    Ok((dx, dy, dxy))
}

/// Coordinate of node `idx`, continuing the boundary spacing past either end.
fn coordinate(nodes: &[f64], idx: isize) -> f64 {
    let n = nodes.len() as isize;
    if idx < 0 {
        nodes[0] + idx as f64 * (nodes[1] - nodes[0])
    } else if idx >= n {
        let last = nodes[(n - 1) as usize];
        last + (idx - n + 1) as f64 * (last - nodes[(n - 2) as usize])
    } else {
        nodes[idx as usize]
    }
}

/// Window abscissas relative to node `centre`.
fn offsets(nodes: &[f64], centre: usize) -> [f64; WIDTH] {
    let origin = nodes[centre];
    std::array::from_fn(|w| coordinate(nodes, centre as isize + w as isize - HALF) - origin)
}

/// Real node indices used to extrapolate towards `idx`, which lies outside
/// `0..n`.
fn support(n: usize, idx: isize) -> std::ops::Range<usize> {
    let k = n.min(3);
    if idx < 0 {
        0..k
    } else {
        n - k..n
    }
}

/// Lagrange extrapolation through two or three points.
fn extrapolate(ts: &[f64], zs: &[f64], t: f64) -> f64 {
    let mut value = 0.0;
    for (k, (&tk, &zk)) in ts.iter().zip(zs).enumerate() {
        let mut basis = 1.0;
        for (m, &tm) in ts.iter().enumerate() {
            if m != k {
                basis *= (t - tm) / (tk - tm);
            }
        }
        value += zk * basis;
    }
    value
}

fn window(grid: &Grid2D, i: usize, j: usize) -> Window {
    let (nx, ny) = (grid.nx() as isize, grid.ny() as isize);
    let (x, y) = (grid.x(), grid.y());
    let mut w = [[0.0; WIDTH]; WIDTH];

    for b in 0..WIDTH {
        let jj = j as isize + b as isize - HALF;
        if jj < 0 || jj >= ny {
            continue;
        }
        let jj = jj as usize;
        for a in 0..WIDTH {
            let ii = i as isize + a as isize - HALF;
            w[a][b] = if (0..nx).contains(&ii) {
                grid.at(ii as usize, jj)
            } else {
                let rows = support(grid.nx(), ii);
                let ts: Vec<f64> = rows.clone().map(|k| x[k]).collect();
                let zs: Vec<f64> = rows.map(|k| grid.at(k, jj)).collect();
                extrapolate(&ts, &zs, coordinate(x, ii))
            };
        }
    }

    for b in 0..WIDTH {
        let jj = j as isize + b as isize - HALF;
        if (0..ny).contains(&jj) {
            continue;
        }
        let columns = support(grid.ny(), jj);
        let ts: Vec<f64> = columns.clone().map(|k| y[k]).collect();
        let slots: Vec<usize> = columns.map(|k| k + CENTRE - j).collect();
        let t = coordinate(y, jj);
        for row in w.iter_mut() {
            let zs: Vec<f64> = slots.iter().map(|&s| row[s]).collect();
            row[b] = extrapolate(&ts, &zs, t);
        }
    }
    w
}

/// Weighted mean of primary estimates. Stencils whose volatility vanishes
/// override all others.
#[derive(Debug, Default)]
struct Blend {
    weighted: f64,
    weight: f64,
    exact: f64,
    exact_count: usize,
}

impl Blend {
    fn add(&mut self, estimate: f64, volatility: f64, scale: f64, epsilon: f64) {
        if !(estimate.is_finite() && volatility.is_finite()) {
            return;
        }
        if volatility > epsilon {
            let weight = 1.0 / (volatility * scale);
            self.weighted += weight * estimate;
            self.weight += weight;
        } else {
            self.exact += estimate;
            self.exact_count += 1;
        }
    }

    fn finish(self) -> Option<f64> {
        if self.exact_count > 0 {
            Some(self.exact / self.exact_count as f64)
        } else if self.weight > 0.0 {
            Some(self.weighted / self.weight)
        } else {
            None
        }
    }
}

/// First derivative at the window centre along one line of the window.
fn slope(offsets: &[f64; WIDTH], values: &[f64; WIDTH], z00: f64) -> Option<f64> {
    let epsilon = values.iter().map(|v| (v - z00).powi(2)).sum::<f64>() * 1e-12;
    let mut blend = Blend::default();

    for stencil in STENCILS {
        let xs = stencil.map(|k| offsets[k]);
        let zs = stencil.map(|k| values[k] - z00);

        let mut estimate = 0.0;
        for k in 0..3 {
            let (a, b) = others(k);
            estimate += zs[k] * xs[a] * xs[b] / (xs[k] * (xs[k] - xs[a]) * (xs[k] - xs[b]));
        }

        // least squares line through the centre and the stencil
        let sx: f64 = xs.iter().sum();
        let sz: f64 = zs.iter().sum();
        let sxx: f64 = xs.iter().map(|v| v * v).sum();
        let sxz: f64 = xs.iter().zip(&zs).map(|(x, z)| x * z).sum();
        let denominator = 4.0 * sxx - sx * sx;
        let b0 = (sxx * sz - sx * sxz) / denominator;
        let b1 = (4.0 * sxz - sx * sz) / denominator;
        let volatility = b0 * b0 + xs.iter().zip(&zs).map(|(x, z)| (z - b0 - b1 * x).powi(2)).sum::<f64>();

        blend.add(estimate, volatility, sxx, epsilon);
    }
    blend.finish()
}

/// Mixed derivative at the window centre from every pair of x and y stencils.
fn cross(xo: &[f64; WIDTH], yo: &[f64; WIDTH], w: &Window) -> Option<f64> {
    let z00 = w[CENTRE][CENTRE];
    let mut blend = Blend::default();

    for sx in STENCILS {
        let xs = sx.map(|k| xo[k]);
        let cx = lagrange_slopes(&xs);
        for sy in STENCILS {
            let ys = sy.map(|k| yo[k]);
            let cy = lagrange_slopes(&ys);

            let mut estimate = 0.0;
            for (k, &a) in sx.iter().enumerate() {
                for (l, &b) in sy.iter().enumerate() {
                    let mixed = w[a][b] - w[a][CENTRE] - w[CENTRE][b] + z00;
                    estimate += cx[k] * cy[l] * mixed;
                }
            }

            // the centre row and column close the 4x4 block
            let rows = [CENTRE, sx[0], sx[1], sx[2]];
            let columns = [CENTRE, sy[0], sy[1], sy[2]];
            let block: [[f64; 4]; 4] = std::array::from_fn(|r| std::array::from_fn(|c| w[rows[r]][columns[c]]));
            let epsilon = block.iter().flatten().map(|v| (v - z00).powi(2)).sum::<f64>() * 1e-12;
            let Some(volatility) = bilinear_residual(&xs, &ys, &block, z00) else {
                continue;
            };

            let sxx: f64 = xs.iter().map(|v| v * v).sum();
            let syy: f64 = ys.iter().map(|v| v * v).sum();
            blend.add(estimate, volatility, sxx * syy, epsilon);
        }
    }
    blend.finish()
}

#[inline]
fn others(k: usize) -> (usize, usize) {
    match k {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    }
}

/// Derivative at zero of the Lagrange basis polynomial of each stencil node,
/// over the nodes `{0, t0, t1, t2}`.
fn lagrange_slopes(ts: &[f64; 3]) -> [f64; 3] {
    std::array::from_fn(|k| {
        let (a, b) = others(k);
        ts[a] * ts[b] / (ts[k] * (ts[k] - ts[a]) * (ts[k] - ts[b]))
    })
}

/// Sum of squared residuals of the least squares fit of
/// `z = b0 + b1 x + b2 y + b3 x y` over the 4x4 block.
fn bilinear_residual(xs: &[f64; 3], ys: &[f64; 3], block: &[[f64; 4]; 4], z00: f64) -> Option<f64> {
    let px = [0.0, xs[0], xs[1], xs[2]];
    let py = [0.0, ys[0], ys[1], ys[2]];
    let design = SMatrix::<f64, 16, 4>::from_fn(|r, c| {
        let (x, y) = (px[r / 4], py[r % 4]);
        match c {
            0 => 1.0,
            1 => x,
            2 => y,
            _ => x * y,
        }
    });
    let rhs = SVector::<f64, 16>::from_fn(|r, _| block[r / 4][r % 4] - z00);

    let normal = design.transpose() * design;
    let coefficients = normal.lu().solve(&(design.transpose() * rhs))?;
    Some((rhs - design * coefficients).norm_squared())
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    fn random_axis(rng: &mut StdRng, n: usize) -> Vec<f64> {
        let mut nodes = vec![rng.gen_range(-2.0..0.0)];
        for _ in 1..n {
            let last = nodes[nodes.len() - 1];
            nodes.push(last + rng.gen_range(0.1..1.5));
        }
        nodes
    }

    fn sampled(x: &[f64], y: &[f64], f: impl Fn(f64, f64) -> f64) -> Grid2D {
        let z: Vec<f64> = x.iter().flat_map(|&xi| y.iter().map(move |&yj| (xi, yj))).map(|(a, b)| f(a, b)).collect();
        Grid2D::new(x, y, &z).unwrap()
    }

    #[test]
    fn planar_data_is_recovered_on_any_grid() {
        let mut rng = StdRng::seed_from_u64(17);
        for (nx, ny) in [(2, 2), (3, 5), (6, 4), (9, 8)] {
            let x = random_axis(&mut rng, nx);
            let y = random_axis(&mut rng, ny);
            let grid = sampled(&x, &y, |x, y| 2.0 * x + 3.0 * y);
            let (dx, dy, dxy) = revised_akima(&grid).unwrap();
            for k in 0..nx * ny {
                assert_approx_eq!(dx[k], 2.0, 1e-10);
                assert_approx_eq!(dy[k], 3.0, 1e-10);
                assert_approx_eq!(dxy[k], 0.0, 1e-10);
            }
        }
    }

    #[test]
    fn quadratics_are_exact() {
        let x = [0.0, 0.7, 1.0, 2.1, 2.5, 3.0, 4.2];
        let y = [-1.0, 0.0, 0.4, 1.5, 2.0];
        let grid = sampled(&x, &y, |x, y| x * x - x * y + 0.5 * y * y);
        let (dx, dy, dxy) = revised_akima(&grid).unwrap();
        for i in 0..x.len() {
            for j in 0..y.len() {
                let k = grid.index(i, j);
                assert_approx_eq!(dx[k], 2.0 * x[i] - y[j], 1e-8);
                assert_approx_eq!(dy[k], -x[i] + y[j], 1e-8);
                assert_approx_eq!(dxy[k], -1.0, 1e-8);
            }
        }
    }

    #[test]
    fn window_extends_boundary_spacing() {
        let x = [0.0, 1.0, 3.0];
        assert_eq!(coordinate(&x, -2), -2.0);
        assert_eq!(coordinate(&x, 4), 7.0);
        assert_eq!(offsets(&x, 0), [-3.0, -2.0, -1.0, 0.0, 1.0, 3.0, 5.0]);
        assert_eq!(extrapolate(&[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0], 3.0), 9.0);
        assert_eq!(extrapolate(&[0.0, 1.0], &[1.0, 3.0], -1.0), -1.0);
    }

    #[test]
    fn constant_offset_leaves_derivatives_unchanged() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [0.0, 0.5, 1.0, 1.5, 2.0];
        let f = |x: f64, y: f64| (if x > 2.5 { 1.0 } else { 0.0 }) + 0.3 * (x * y).sin();
        let (dx, dy, dxy) = revised_akima(&sampled(&x, &y, f)).unwrap();
        let (dx_up, dy_up, dxy_up) = revised_akima(&sampled(&x, &y, |x, y| f(x, y) + 1e6)).unwrap();
        for k in 0..x.len() * y.len() {
            assert_approx_eq!(dx[k], dx_up[k], 1e-6);
            assert_approx_eq!(dy[k], dy_up[k], 1e-6);
            assert_approx_eq!(dxy[k], dxy_up[k], 1e-6);
        }
    }

    #[test]
    fn flat_data_has_zero_derivatives() {
        let grid = sampled(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 2.0], |_, _| 4.0);
        let (dx, dy, dxy) = revised_akima(&grid).unwrap();
        assert!(dx.iter().chain(&dy).chain(&dxy).all(|v| v.abs() < 1e-12));
    }
}
