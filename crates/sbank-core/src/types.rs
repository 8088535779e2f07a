use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, SbankError};

/// Coordinate frame used to map raw uniform samples into `(x1, x2)`.
///
/// The frame also selects the default metric: `ScaledEuclidean` stretches the
/// first axis, the other two use the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoordinateFrame {
    /// `(x1, x2)` sampled directly as `(x, y)`.
    Cartesian,
    /// Bounds are interpreted as `(r, theta)` and mapped to `(r cos, r sin)`.
    Polar,
    /// Cartesian sampling under the scaled metric `diag(1/4, 1)`.
    ScaledEuclidean,
}

impl CoordinateFrame {
    /// All supported frames in CLI listing order.
    pub const ALL: [CoordinateFrame; 3] = [
        CoordinateFrame::Cartesian,
        CoordinateFrame::Polar,
        CoordinateFrame::ScaledEuclidean,
    ];

    /// Stable name used in configuration files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinateFrame::Cartesian => "Cartesian",
            CoordinateFrame::Polar => "Polar",
            CoordinateFrame::ScaledEuclidean => "ScaledEuclidean",
        }
    }
}

impl fmt::Display for CoordinateFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoordinateFrame {
    type Err = SbankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CoordinateFrame::ALL
            .into_iter()
            .find(|frame| frame.as_str() == s)
            .ok_or_else(|| {
                SbankError::Config(
                    ErrorInfo::new("unknown-frame", "unsupported coordinate frame")
                        .with_context("frame", s)
                        .with_hint("expected one of Cartesian|Polar|ScaledEuclidean"),
                )
            })
    }
}

/// Scalar projection used to sort the bank and bound coverage queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NeighborhoodKey {
    /// First coordinate.
    #[default]
    X1,
    /// Second coordinate.
    X2,
    /// Metric norm of the point.
    Norm,
}

impl NeighborhoodKey {
    /// Stable name used in configuration files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            NeighborhoodKey::X1 => "x1",
            NeighborhoodKey::X2 => "x2",
            NeighborhoodKey::Norm => "norm",
        }
    }
}

impl fmt::Display for NeighborhoodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NeighborhoodKey {
    type Err = SbankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x1" => Ok(NeighborhoodKey::X1),
            "x2" => Ok(NeighborhoodKey::X2),
            "norm" => Ok(NeighborhoodKey::Norm),
            other => Err(SbankError::Config(
                ErrorInfo::new("unknown-nhood-param", "unsupported neighbourhood key")
                    .with_context("nhood_param", other)
                    .with_hint("expected one of x1|x2|norm"),
            )),
        }
    }
}
