use std::{fmt, str::FromStr};

use crate::error::SplineError;

/// Closed set of one dimensional spline kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplineType {
    Constant,
    Linear,
    Cubic,
    Akima,
    Bessel,
    Pchip,
    Quintic,
    Hermite,
}

impl SplineType {
    pub const ALL: [SplineType; 8] = [
        SplineType::Constant,
        SplineType::Linear,
        SplineType::Cubic,
        SplineType::Akima,
        SplineType::Bessel,
        SplineType::Pchip,
        SplineType::Quintic,
        SplineType::Hermite,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SplineType::Constant => "constant",
            SplineType::Linear => "linear",
            SplineType::Cubic => "cubic",
            SplineType::Akima => "akima",
            SplineType::Bessel => "bessel",
            SplineType::Pchip => "pchip",
            SplineType::Quintic => "quintic",
            SplineType::Hermite => "hermite",
        }
    }

    /// Fewest nodes a build accepts.
    pub fn min_points(self) -> usize {
        match self {
            SplineType::Constant => 1,
            _ => 2,
        }
    }

    /// Coefficients per segment in the power basis export.
    pub fn order(self) -> usize {
        match self {
            SplineType::Constant => 1,
            SplineType::Linear => 2,
            SplineType::Quintic => 6,
            _ => 4,
        }
    }
}

impl fmt::Display for SplineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SplineType {
    type Err = SplineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        SplineType::ALL
            .into_iter()
            .find(|kind| kind.name() == lower)
            .ok_or_else(|| SplineError::UnknownSplineType(s.to_string()))
    }
}

/// Closed set of surface kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spline2DType {
    Bilinear,
    BiCubic,
    BiQuintic,
    Akima,
}

impl Spline2DType {
    pub fn name(self) -> &'static str {
        match self {
            Spline2DType::Bilinear => "bilinear",
            Spline2DType::BiCubic => "bicubic",
            Spline2DType::BiQuintic => "biquintic",
            Spline2DType::Akima => "akima",
        }
    }
}

impl fmt::Display for Spline2DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Spline2DType {
    type Err = SplineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bilinear" => Ok(Spline2DType::Bilinear),
            "bicubic" => Ok(Spline2DType::BiCubic),
            "biquintic" => Ok(Spline2DType::BiQuintic),
            "akima" | "akima2d" => Ok(Spline2DType::Akima),
            _ => Err(SplineError::UnknownSplineType(s.to_string())),
        }
    }
}

/// End condition of the tridiagonal cubic solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CubicBoundary {
    /// Second derivative of the polynomial through the nearest nodes.
    #[default]
    Extrapolate,
    /// Vanishing second derivative.
    Natural,
    /// Equal second derivative on the two outermost nodes.
    ParabolicRunout,
    /// Continuous third derivative at the second node.
    NotAKnot,
}

/// How a quintic spline gets its first derivatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuinticSubType {
    #[default]
    Cubic,
    Pchip,
    Akima,
    Bessel,
}

/// How a quintic spline gets its second derivatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuinticCurvature {
    /// Tridiagonal system making the third derivative continuous.
    #[default]
    ThirdDerivativeContinuous,
    /// Three point estimate per node, limited by its one sided neighbours.
    Local,
}

/// Behaviour shared by every spline object.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineConfig {
    pub name: String,
    /// Fail range checked evaluation outside `[x_min, x_max]`.
    pub range_check: bool,
    /// Wrap abscissas periodically into the node range.
    pub closed: bool,
    /// Hold the boundary value outside the node range.
    pub extended_constant: bool,
    /// Per-thread interval hints instead of a single shared one.
    pub per_thread_cache: bool,
    /// Scan derivative arrays for NaN after every build, also in release builds.
    pub check_finite: bool,
}

impl Default for SplineConfig {
    fn default() -> Self {
        SplineConfig {
            name: "spline".to_string(),
            range_check: false,
            closed: false,
            extended_constant: false,
            per_thread_cache: true,
            check_finite: false,
        }
    }
}

impl SplineConfig {
    pub fn named(name: &str) -> Self {
        SplineConfig {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_range_check(mut self, on: bool) -> Self {
        self.range_check = on;
        self
    }

    pub fn with_closed(mut self, on: bool) -> Self {
        self.closed = on;
        self
    }

    pub fn with_extended_constant(mut self, on: bool) -> Self {
        self.extended_constant = on;
        self
    }

    pub fn with_per_thread_cache(mut self, on: bool) -> Self {
        self.per_thread_cache = on;
        self
    }

    pub fn with_check_finite(mut self, on: bool) -> Self {
        self.check_finite = on;
        self
    }

    pub(crate) fn scan_finite(&self) -> bool {
        self.check_finite || cfg!(debug_assertions)
    }
}
