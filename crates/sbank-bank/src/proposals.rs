use std::f64::consts::TAU;

use rand::distributions::{Distribution, Uniform};
use sbank_core::errors::{ErrorInfo, SbankError};
use sbank_core::{CoordinateFrame, RngHandle};
use serde::{Deserialize, Serialize};

use crate::metric::Metric;
use crate::template::Template;

/// Axis-aligned sampling bounds.
///
/// For the polar frame the first axis is the radius and the second the angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Lower bound of the first axis.
    pub x1_min: f64,
    /// Upper bound of the first axis.
    pub x1_max: f64,
    /// Lower bound of the second axis.
    pub x2_min: f64,
    /// Upper bound of the second axis.
    pub x2_max: f64,
}

impl Region {
    /// Validates bounds for the given frame.
    pub fn new(
        x1: (f64, f64),
        x2: (f64, f64),
        frame: CoordinateFrame,
    ) -> Result<Self, SbankError> {
        let region = Self {
            x1_min: x1.0,
            x1_max: x1.1,
            x2_min: x2.0,
            x2_max: x2.1,
        };
        region.validate(frame)?;
        Ok(region)
    }

    /// Unit square `[0, 1] x [0, 1]`.
    pub fn unit_square() -> Self {
        Self {
            x1_min: 0.0,
            x1_max: 1.0,
            x2_min: 0.0,
            x2_max: 1.0,
        }
    }

    /// Checks `min <= max` on both axes plus the polar domain restrictions.
    pub fn validate(&self, frame: CoordinateFrame) -> Result<(), SbankError> {
        check_axis("x1", self.x1_min, self.x1_max)?;
        check_axis("x2", self.x2_min, self.x2_max)?;
        if frame == CoordinateFrame::Polar
            && (self.x1_min < 0.0 || self.x2_min < 0.0 || self.x2_max > TAU)
        {
            return Err(SbankError::Config(
                ErrorInfo::new("polar-bounds", "polar bounds must satisfy r >= 0 and theta in [0, 2pi]")
                    .with_context("r", format!("[{}, {}]", self.x1_min, self.x1_max))
                    .with_context("theta", format!("[{}, {}]", self.x2_min, self.x2_max)),
            ));
        }
        Ok(())
    }
}

fn check_axis(axis: &str, min: f64, max: f64) -> Result<(), SbankError> {
    if !(min.is_finite() && max.is_finite() && (max - min).is_finite()) {
        return Err(SbankError::Config(
            ErrorInfo::new("bounds-non-finite", "region bounds must be finite")
                .with_context("axis", axis)
                .with_context("min", min.to_string())
                .with_context("max", max.to_string()),
        ));
    }
    if min > max {
        return Err(SbankError::Config(
            ErrorInfo::new("bounds-inverted", "region lower bound exceeds upper bound")
                .with_context("axis", axis)
                .with_context("min", min.to_string())
                .with_context("max", max.to_string()),
        ));
    }
    Ok(())
}

/// Infinite stream of uniformly drawn proposals.
///
/// Every call to `next` consumes one sample per axis, first axis first, from
/// the borrowed RNG. The stream never ends on its own; the consumer stops it
/// by no longer pulling.
#[derive(Debug)]
pub struct ProposalStream<'r> {
    frame: CoordinateFrame,
    metric: Metric,
    axis1: Uniform<f64>,
    axis2: Uniform<f64>,
    rng: &'r mut RngHandle,
}

/// Builds the proposal stream for a region and frame.
pub fn generate<'r>(
    region: &Region,
    frame: CoordinateFrame,
    metric: Metric,
    rng: &'r mut RngHandle,
) -> Result<ProposalStream<'r>, SbankError> {
    region.validate(frame)?;
    Ok(ProposalStream {
        frame,
        metric,
        axis1: Uniform::new_inclusive(region.x1_min, region.x1_max),
        axis2: Uniform::new_inclusive(region.x2_min, region.x2_max),
        rng,
    })
}

impl ProposalStream<'_> {
    /// Frame used to map samples into `(x1, x2)`.
    pub fn frame(&self) -> CoordinateFrame {
        self.frame
    }
}

impl Iterator for ProposalStream<'_> {
    type Item = Template;

    fn next(&mut self) -> Option<Template> {
        let a = self.axis1.sample(&mut *self.rng);
        let b = self.axis2.sample(&mut *self.rng);
        let (x1, x2) = match self.frame {
            CoordinateFrame::Cartesian | CoordinateFrame::ScaledEuclidean => (a, b),
            CoordinateFrame::Polar => (a * b.cos(), a * b.sin()),
        };
        Some(Template::new(x1, x2, &self.metric))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}
