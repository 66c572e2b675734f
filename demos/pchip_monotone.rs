extern crate hermite_splines;

use hermite_splines::{Spline1D, SplineType};

fn main() {
    let x = [0.0, 1.0, 1.5, 3.0, 4.0, 6.0];
    let y = [0.0, 0.1, 2.0, 2.1, 5.0, 5.0];

    let mut pchip = Spline1D::from_name("pchip", "pchip").unwrap();
    pchip.build_from(&x, 1, &y, 1, x.len()).unwrap();
    let bessel = Spline1D::from_points(SplineType::Bessel, &x, &y).unwrap();

    println!("pchip monotonicity: {}", pchip.check_monotonicity());
    println!("bessel monotonicity: {}", bessel.check_monotonicity());

    let mut out = std::io::stdout();
    pchip.dump(&mut out, 60, "x\tpchip").unwrap();
}
