extern crate hermite_splines;

use hermite_splines::{Grid2D, Spline2D, Spline2DType};

fn main() {
    let x: Vec<f64> = (0..8).map(|i| i as f64 * 0.5).collect();
    let y: Vec<f64> = (0..6).map(|j| j as f64 * 0.4).collect();
    let mut z = Vec::new();
    for xi in &x {
        for yj in &y {
            z.push((xi * yj).sin());
        }
    }
    let grid = Grid2D::new(&x, &y, &z).unwrap();

    let kinds = [Spline2DType::Bilinear, Spline2DType::BiCubic, Spline2DType::BiQuintic, Spline2DType::Akima];
    let surfaces: Vec<Spline2D> = kinds.iter().map(|&kind| Spline2D::new(kind, grid.clone()).unwrap()).collect();

    println!("x;y;exact;bilinear;bicubic;biquintic;akima");
    for i in 0..=14 {
        let (px, py) = (0.25 * i as f64, 0.15 * i as f64);
        print!("{:.2};{:.2};{:.4}", px, py, (px * py).sin());
        for surface in &surfaces {
            print!(";{:.4}", surface.eval(px, py));
        }
        println!();
    }
}
