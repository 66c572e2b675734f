use super::Grid2D;
use crate::{
    config::{CubicBoundary, QuinticCurvature, QuinticSubType},
    slopes::{pchip, quintic},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// Runs a 1-D estimator over every grid line of `values` along `axis` and
/// returns the first and second derivative grids.
fn sweep<F>(grid: &Grid2D, axis: Axis, values: &[f64], mut estimate: F) -> (Vec<f64>, Vec<f64>)
where
    F: FnMut(&[f64], &[f64], &mut [f64], &mut [f64]),
{
    let (nodes, lines) = match axis {
        Axis::X => (grid.x(), grid.ny()),
        Axis::Y => (grid.y(), grid.nx()),
    };
    let len = nodes.len();
    let index = |k: usize, l: usize| match axis {
        Axis::X => grid.index(k, l),
        Axis::Y => grid.index(l, k),
    };

    let mut first = vec![0.0; values.len()];
    let mut second = vec![0.0; values.len()];
    let mut line = vec![0.0; len];
    let mut d1 = vec![0.0; len];
    let mut d2 = vec![0.0; len];
    for l in 0..lines {
        for (k, v) in line.iter_mut().enumerate() {
            *v = values[index(k, l)];
        }
        estimate(nodes, &line, &mut d1, &mut d2);
        for k in 0..len {
            first[index(k, l)] = d1[k];
            second[index(k, l)] = d2[k];
        }
    }
    (first, second)
}

fn average(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(a, b)| 0.5 * (a + b)).collect()
}

fn pchip_line(x: &[f64], y: &[f64], yp: &mut [f64], _ypp: &mut [f64]) {
    pchip(x, y, yp)
}

fn quintic_line(x: &[f64], y: &[f64], yp: &mut [f64], ypp: &mut [f64]) {
    quintic(
        x,
        y,
        yp,
        ypp,
        QuinticSubType::Cubic,
        QuinticCurvature::ThirdDerivativeContinuous,
        CubicBoundary::Extrapolate,
        CubicBoundary::Extrapolate,
    )
}

/// `(DX, DY, DXY)` from shape preserving slopes along each axis. The cross
/// derivative averages the two orders of differentiation.
pub(super) fn bicubic(grid: &Grid2D) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let (dx, _) = sweep(grid, Axis::X, grid.z(), pchip_line);
    let (dy, _) = sweep(grid, Axis::Y, grid.z(), pchip_line);
    let (dyx, _) = sweep(grid, Axis::X, &dy, pchip_line);
    let (dxy, _) = sweep(grid, Axis::Y, &dx, pchip_line);
    let dxy = average(&dxy, &dyx);
    (dx, dy, dxy)
}

pub(super) struct QuinticGrids {
    pub dx: Vec<f64>,
    pub dy: Vec<f64>,
    pub dxx: Vec<f64>,
    pub dyy: Vec<f64>,
    pub dxy: Vec<f64>,
    pub dxxy: Vec<f64>,
    pub dxyy: Vec<f64>,
    pub dxxyy: Vec<f64>,
}

/// All eight derivative grids of the biquintic patch, from 1-D quintic
/// splines along each axis. Mixed terms are reached along both axes and
/// averaged.
pub(super) fn biquintic(grid: &Grid2D) -> QuinticGrids {
    let (dx, dxx) = sweep(grid, Axis::X, grid.z(), quintic_line);
    let (dy, dyy) = sweep(grid, Axis::Y, grid.z(), quintic_line);

    let (dxy_a, dxxy_a) = sweep(grid, Axis::X, &dy, quintic_line);
    let (dxyy_a, dxxyy_a) = sweep(grid, Axis::X, &dyy, quintic_line);
    let (dxy_b, dxyy_b) = sweep(grid, Axis::Y, &dx, quintic_line);
    let (dxxy_b, dxxyy_b) = sweep(grid, Axis::Y, &dxx, quintic_line);

    QuinticGrids {
        dxy: average(&dxy_a, &dxy_b),
        dxxy: average(&dxxy_a, &dxxy_b),
        dxyy: average(&dxyy_a, &dxyy_b),
        dxxyy: average(&dxxyy_a, &dxxyy_b),
        dx,
        dy,
        dxx,
        dyy,
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    fn saddle() -> Grid2D {
        let x = [0.0, 0.5, 1.5, 2.0, 3.5];
        let y = [1.0, 2.0, 2.2, 4.0];
        let mut z = Vec::new();
        for &xi in &x {
            for &yj in &y {
                z.push(xi * yj);
            }
        }
        Grid2D::new(&x, &y, &z).unwrap()
    }

    #[test]
    fn bicubic_derivatives_of_a_saddle() {
        let grid = saddle();
        let (dx, dy, dxy) = bicubic(&grid);
        for i in 0..grid.nx() {
            for j in 0..grid.ny() {
                let k = grid.index(i, j);
                assert_approx_eq!(dx[k], grid.y()[j], 1e-12);
                assert_approx_eq!(dy[k], grid.x()[i], 1e-12);
                assert_approx_eq!(dxy[k], 1.0, 1e-12);
            }
        }
    }

    #[test]
    fn biquintic_derivatives_of_a_saddle() {
        let grid = saddle();
        let d = biquintic(&grid);
        for i in 0..grid.nx() {
            for j in 0..grid.ny() {
                let k = grid.index(i, j);
                assert_approx_eq!(d.dx[k], grid.y()[j], 1e-10);
                assert_approx_eq!(d.dy[k], grid.x()[i], 1e-10);
                assert_approx_eq!(d.dxy[k], 1.0, 1e-10);
                assert_approx_eq!(d.dxx[k], 0.0, 1e-9);
                assert_approx_eq!(d.dxxyy[k], 0.0, 1e-8);
            }
        }
    }

    #[test]
    fn two_by_two_grid() {
        let grid = Grid2D::new(&[0.0, 1.0], &[0.0, 2.0], &[0.0, 2.0, 1.0, 5.0]).unwrap();
        let (dx, dy, dxy) = bicubic(&grid);
        assert_eq!(dx, vec![1.0, 3.0, 1.0, 3.0]);
        assert_eq!(dy, vec![1.0, 1.0, 2.0, 2.0]);
        assert_eq!(dxy, vec![1.0; 4]);
    }
}
