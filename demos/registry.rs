extern crate hermite_splines;

use hermite_splines::registry;

fn main() {
    registry::init();
    if registry::new_spline("profile", "quintic") != 0 {
        eprintln!("cannot create spline 'profile'");
        return;
    }
    for i in 0..=8 {
        let x = i as f64 * 0.5;
        if registry::push(x, x.sin()) != 0 {
            eprintln!("push of ({}, {}) rejected", x, x.sin());
            registry::shutdown();
            return;
        }
    }
    if registry::build() != 0 {
        eprintln!("build failed");
        registry::shutdown();
        return;
    }

    println!("x;y;dy;ddy");
    for i in 0..=40 {
        let x = i as f64 * 0.1;
        println!(
            "{:.2};{:.4};{:.4};{:.4}",
            x,
            registry::eval(x),
            registry::eval_d(x),
            registry::eval_dd(x)
        );
    }
    registry::shutdown();
}
