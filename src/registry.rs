//! Process wide table of named splines with a selected "head".
//!
//! Every operation acts on the head spline and reports failure as a status
//! code (`0` on success, `-1` otherwise) so that it can sit directly behind a
//! foreign function boundary. Evaluators return `0.0` when nothing is
//! selected.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{error::SplineError, spline::Spline1D};

#[derive(Debug, Default)]
struct Registry {
    splines: HashMap<String, Spline1D<'static>>,
    head: Option<String>,
}

impl Registry {
    fn head_mut(&mut self) -> Option<&mut Spline1D<'static>> {
        let id = self.head.as_ref()?;
        self.splines.get_mut(id)
    }

    fn head(&self) -> Option<&Spline1D<'static>> {
        let id = self.head.as_ref()?;
        self.splines.get(id)
    }
}

static REGISTRY: Mutex<Option<Registry>> = Mutex::new(None);

fn lock() -> MutexGuard<'static, Option<Registry>> {
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner)
}

fn with<T>(f: impl FnOnce(&mut Registry) -> T) -> T {
    let mut guard = lock();
    f(guard.get_or_insert_with(Registry::default))
}

fn status(result: Result<(), SplineError>, operation: &str) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            log::error!("registry {}: {}", operation, err);
            -1
        }
    }
}

fn on_head(operation: &str, f: impl FnOnce(&mut Spline1D<'static>) -> Result<(), SplineError>) -> i32 {
    with(|registry| match registry.head_mut() {
        Some(spline) => status(f(spline), operation),
        None => {
            log::error!("registry {}: no spline selected", operation);
            -1
        }
    })
}

/// Creates an empty registry, keeping an existing one.
pub fn init() {
    with(|_| ());
}

/// Drops every spline.
pub fn shutdown() {
    lock().take();
}

/// Creates spline `id` of the named type and selects it. An existing spline
/// with the same id is replaced.
pub fn new_spline(id: &str, type_name: &str) -> i32 {
    match Spline1D::from_name(id, type_name) {
        Ok(spline) => with(|registry| {
            registry.splines.insert(id.to_string(), spline);
            registry.head = Some(id.to_string());
            log::debug!("registry: new {} spline '{}'", type_name, id);
            0
        }),
        Err(err) => status(Err(err), "new_spline"),
    }
}

pub fn select(id: &str) -> i32 {
    with(|registry| {
        if registry.splines.contains_key(id) {
            registry.head = Some(id.to_string());
            0
        } else {
            log::error!("registry select: no spline '{}'", id);
            -1
        }
    })
}

/// Removes spline `id`; removing the head clears the selection.
pub fn delete(id: &str) -> i32 {
    with(|registry| {
        if registry.splines.remove(id).is_none() {
            log::error!("registry delete: no spline '{}'", id);
            return -1;
        }
        if registry.head.as_deref() == Some(id) {
            registry.head = None;
        }
        0
    })
}

/// Id of the selected spline.
pub fn head() -> Option<String> {
    with(|registry| registry.head.clone())
}

/// Logs a description of the head spline.
pub fn print() -> i32 {
    with(|registry| match registry.head() {
        Some(spline) => {
            log::info!("{}", spline.info());
            0
        }
        None => -1,
    })
}

pub fn type_name() -> Option<&'static str> {
    with(|registry| registry.head().map(|spline| spline.kind().name()))
}

/// Drops every point of the head spline.
pub fn reset() -> i32 {
    on_head("reset", |spline| {
        spline.clear();
        Ok(())
    })
}

pub fn push(x: f64, y: f64) -> i32 {
    on_head("push", |spline| spline.push_back(x, y))
}

/// Builds the head spline from the points pushed so far.
pub fn build() -> i32 {
    on_head("build", |spline| spline.build())
}

/// Replaces the head spline's points with `x`, `y` and builds it.
pub fn build_with(x: &[f64], y: &[f64]) -> i32 {
    on_head("build", |spline| {
        if x.len() != y.len() {
            return Err(SplineError::DimensionMismatch { what: "Y", expected: x.len(), found: y.len() });
        }
        spline.build_from(x, 1, y, 1, x.len())
    })
}

fn eval_head(x: f64, order: usize) -> f64 {
    with(|registry| registry.head().map_or(0.0, |spline| spline.eval_order(x, order)))
}

pub fn eval(x: f64) -> f64 {
    eval_head(x, 0)
}

pub fn eval_d(x: f64) -> f64 {
    eval_head(x, 1)
}

pub fn eval_dd(x: f64) -> f64 {
    eval_head(x, 2)
}

pub fn eval_ddd(x: f64) -> f64 {
    eval_head(x, 3)
}

pub fn eval_dddd(x: f64) -> f64 {
    eval_head(x, 4)
}

pub fn eval_ddddd(x: f64) -> f64 {
    eval_head(x, 5)
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    // the registry is global, tests touching it take turns
    static SERIAL: Mutex<()> = Mutex::new(());

    fn serial() -> MutexGuard<'static, ()> {
        SERIAL.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[test]
    fn lifecycle() {
        let _guard = serial();
        shutdown();
        init();
        assert_eq!(head(), None);
        assert_eq!(eval(1.0), 0.0);
        assert_eq!(push(0.0, 0.0), -1);

        assert_eq!(new_spline("a", "linear"), 0);
        assert_eq!(type_name(), Some("linear"));
        for (x, y) in [(0.0, 0.0), (1.0, 2.0), (3.0, 0.0)] {
            assert_eq!(push(x, y), 0);
        }
        assert_eq!(build(), 0);
        assert_approx_eq!(eval(0.5), 1.0, 1e-15);
        assert_approx_eq!(eval_d(2.0), -1.0, 1e-15);
        assert_eq!(eval_dd(2.0), 0.0);
        assert_eq!(print(), 0);

        assert_eq!(new_spline("b", "quintic"), 0);
        assert_eq!(head().as_deref(), Some("b"));
        assert_eq!(build_with(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 8.0, 27.0]), 0);
        assert_approx_eq!(eval_dd(1.5), 9.0, 1e-9);
        assert_approx_eq!(eval_ddd(1.5), 6.0, 1e-8);
        assert!(eval_dddd(1.5).abs() < 1e-6);
        assert!(eval_ddddd(1.5).is_finite());

        assert_eq!(select("a"), 0);
        assert_approx_eq!(eval(0.5), 1.0, 1e-15);
        assert_eq!(select("missing"), -1);
        assert_eq!(head().as_deref(), Some("a"));

        assert_eq!(delete("a"), 0);
        assert_eq!(head(), None);
        assert_eq!(delete("a"), -1);
        assert_eq!(type_name(), None);
        shutdown();
    }

    #[test]
    fn failures_report_status() {
        let _guard = serial();
        shutdown();
        assert_eq!(new_spline("x", "hyperbolic"), -1);
        assert_eq!(head(), None);

        assert_eq!(new_spline("x", "akima"), 0);
        assert_eq!(push(0.0, 1.0), 0);
        assert_eq!(build(), -1);
        assert_eq!(push(-1.0, 1.0), -1);
        assert_eq!(build_with(&[0.0, 1.0], &[1.0]), -1);

        assert_eq!(push(1.0, 2.0), 0);
        assert_eq!(build(), 0);
        assert_eq!(reset(), 0);
        assert!(eval(0.5).is_nan());

        assert_eq!(new_spline("x", "pchip"), 0);
        assert_eq!(type_name(), Some("pchip"));
        shutdown();
    }
}
