use thiserror::Error;

/// Errors raised while configuring, building or (opt-in) range-checking a spline.
///
/// Everything here is a construction-time failure. Evaluation of a built spline
/// only fails with [`SplineError::OutOfRange`], and only when range checking was
/// switched on in its [`SplineConfig`](crate::SplineConfig).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplineError {
    #[error("{kind} spline needs at least {required} points, got {found}")]
    InsufficientPoints {
        kind: &'static str,
        required: usize,
        found: usize,
    },

    #[error("x = {x} is out of range [{min}, {max}]")]
    OutOfRange { x: f64, min: f64, max: f64 },

    #[error("build produced a non finite {what} at index {index}")]
    NonFiniteResult { what: &'static str, index: usize },

    #[error("non finite {what} at index {index}")]
    NonFiniteInput { what: &'static str, index: usize },

    #[error("abscissa decreases at index {index}: {current} after {previous}")]
    NonMonotoneNodes {
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("no usable stencil weight at grid node ({i}, {j})")]
    DegenerateStencil { i: usize, j: usize },

    #[error("unknown spline type `{0}`")]
    UnknownSplineType(String),

    #[error("external storage holds at most {capacity} points")]
    CapacityExceeded { capacity: usize },

    #[error("size mismatch for {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("invalid range [{min}, {max}]")]
    InvalidRange { min: f64, max: f64 },

    #[error("spline has not been built")]
    NotBuilt,

    #[error("blended splines disagree on {what}: {first} vs {second}")]
    IncompatibleBlend { what: &'static str, first: f64, second: f64 },
}

pub type Result<T> = std::result::Result<T, SplineError>;

/// Returns the first non finite entry of `values` as an error.
pub(crate) fn check_finite(values: &[f64], what: &'static str) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(SplineError::NonFiniteResult { what, index }),
        None => Ok(()),
    }
}
