//! Piecewise Hermite interpolation in one and two dimensions.
//!
//! One dimensional splines ([`Spline1D`]) cover constant, linear, cubic,
//! Akima, Bessel, PCHIP, quintic and user supplied Hermite data. Surfaces
//! ([`Spline2D`]) are bilinear, bicubic, biquintic or revised Akima patches on a
//! rectangular [`Grid2D`]. [`SplineVec`] threads a curve through points in any
//! dimension. [`Spline1DBlend`] and [`Spline2DBlend`] mix two splines on the
//! same domain.
//!
//! Built splines are read only and may be evaluated from several threads at
//! once.
//!
//! # Example
//! ```
//! use hermite_splines::{Spline1D, SplineType};
//! use assert_approx_eq::assert_approx_eq;
//!
//! let x = [0.0, 1.0, 2.0, 3.0, 4.0];
//! let y = [0.0, 1.0, 8.0, 27.0, 64.0];
//! let spline = Spline1D::from_points(SplineType::Cubic, &x, &y).unwrap();
//!
//! assert_approx_eq!(3.375, spline.eval(1.5), 1e-10);
//! assert_approx_eq!(6.75, spline.d(1.5), 1e-10);
//! assert_eq!(4, spline.segment(2).order());
//! ```

#![allow(clippy::needless_range_loop)]

mod blend;
mod config;
mod curve;
mod error;
pub mod hermite;
mod nodes;
mod polynomial;
pub mod registry;
pub mod search;
pub mod slopes;
mod spline;
mod surface;

pub use blend::{Spline1DBlend, Spline2DBlend};
pub use config::{CubicBoundary, QuinticCurvature, QuinticSubType, Spline2DType, SplineConfig, SplineType};
pub use curve::{curvature, curvature_d, curvature_dd, SplineVec};
pub use error::{Result, SplineError};
pub use nodes::{ExternalBuffers, NodeBuffer, NodeSet};
pub use polynomial::Polynomial;
pub use search::SearchCache;
pub use spline::{Coefficients, Spline1D};
pub use surface::{revised_akima, Grid2D, Spline2D};
