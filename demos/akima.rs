extern crate hermite_splines;

use hermite_splines::{Spline1D, SplineType};

fn main() {
    let x = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
    let y = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.5, 0.0];

    let akima = Spline1D::from_points(SplineType::Akima, &x, &y).unwrap();
    let cubic = Spline1D::from_points(SplineType::Cubic, &x, &y).unwrap();

    let number_of_steps = 70;
    let step = (x[7] - x[0]) / number_of_steps as f64;

    println!("x;akima;cubic");
    for i in 0..=number_of_steps {
        let v = x[0] + step * i as f64;
        println!("{:.2};{:.4};{:.4}", v, akima.eval(v), cubic.eval(v));
    }
}
