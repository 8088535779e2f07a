use nalgebra::{Matrix2, SymmetricEigen, Vector2};
use sbank_core::errors::{ErrorInfo, SbankError};
use sbank_core::CoordinateFrame;
use serde::{Deserialize, Serialize};

use crate::template::Template;

const SYMMETRY_TOLERANCE: f64 = 1e-12;

/// Positive-definite quadratic form defining distances over `(x1, x2)`.
///
/// Distances are `sqrt(dᵀ M d)`; the norm of a point is its distance from the
/// origin. A `Metric` can only be obtained through a validating constructor,
/// so every instance is symmetric with strictly positive eigenvalues.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metric {
    matrix: Matrix2<f64>,
}

/// Principal axes of the coverage region `{d : dᵀ M d <= r²}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageEllipse {
    /// Full extent along the first principal axis.
    pub width: f64,
    /// Full extent along the second principal axis.
    pub height: f64,
    /// Orientation of the first principal axis, in degrees from `x1`.
    pub angle_deg: f64,
}

impl Metric {
    /// Plain Euclidean distance.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix2::identity(),
        }
    }

    /// Euclidean distance with the `x1` direction stretched by a factor of two.
    pub fn scaled_euclidean() -> Self {
        Self {
            matrix: Matrix2::new(0.25, 0.0, 0.0, 1.0),
        }
    }

    /// Default metric attached to a coordinate frame.
    pub fn for_frame(frame: CoordinateFrame) -> Self {
        match frame {
            CoordinateFrame::Cartesian | CoordinateFrame::Polar => Self::identity(),
            CoordinateFrame::ScaledEuclidean => Self::scaled_euclidean(),
        }
    }

    /// Builds a metric from row-major entries, rejecting anything that is not
    /// a finite symmetric positive-definite matrix.
    pub fn from_rows(rows: [[f64; 2]; 2]) -> Result<Self, SbankError> {
        let describe = || format!("{rows:?}");
        if rows.iter().flatten().any(|value| !value.is_finite()) {
            return Err(SbankError::Config(
                ErrorInfo::new("metric-non-finite", "metric entries must be finite")
                    .with_context("metric", describe()),
            ));
        }
        let [[a, b], [c, d]] = rows;
        if (b - c).abs() > SYMMETRY_TOLERANCE * (1.0 + b.abs().max(c.abs())) {
            return Err(SbankError::Config(
                ErrorInfo::new("metric-asymmetric", "metric matrix must be symmetric")
                    .with_context("metric", describe()),
            ));
        }
        let matrix = Matrix2::new(a, b, c, d);
        let eigen = SymmetricEigen::new(matrix);
        if eigen.eigenvalues.iter().any(|value| *value <= 0.0) {
            return Err(SbankError::Config(
                ErrorInfo::new(
                    "metric-not-positive-definite",
                    "metric matrix must be positive definite",
                )
                .with_context("metric", describe())
                .with_context(
                    "eigenvalues",
                    format!("{:?}", eigen.eigenvalues.as_slice()),
                ),
            ));
        }
        Ok(Self { matrix })
    }

    /// Row-major entries, suitable for serialization.
    pub fn rows(&self) -> [[f64; 2]; 2] {
        [
            [self.matrix[(0, 0)], self.matrix[(0, 1)]],
            [self.matrix[(1, 0)], self.matrix[(1, 1)]],
        ]
    }

    /// Evaluates `dᵀ M d` for the displacement `(dx1, dx2)`.
    pub fn quadratic_form(&self, dx1: f64, dx2: f64) -> f64 {
        let delta = Vector2::new(dx1, dx2);
        delta.dot(&(self.matrix * delta))
    }

    /// Metric norm of the point `(x1, x2)`.
    pub fn norm(&self, x1: f64, x2: f64) -> f64 {
        self.quadratic_form(x1, x2).sqrt()
    }

    /// Metric distance between two templates.
    pub fn distance(&self, a: &Template, b: &Template) -> f64 {
        self.quadratic_form(b.x1() - a.x1(), b.x2() - a.x2()).sqrt()
    }

    /// Ellipse of points within `radius` of a template, for plotting collaborators.
    pub fn coverage_ellipse(&self, radius: f64) -> CoverageEllipse {
        // M⁻¹ shares eigenvectors with M and has reciprocal eigenvalues.
        let eigen = SymmetricEigen::new(self.matrix);
        let axis = |value: f64| 2.0 * radius * (1.0 / value).sqrt();
        let vectors = eigen.eigenvectors;
        CoverageEllipse {
            width: axis(eigen.eigenvalues[0]),
            height: axis(eigen.eigenvalues[1]),
            angle_deg: vectors[(1, 0)].atan2(vectors[(0, 0)]).to_degrees(),
        }
    }
}

impl Default for Metric {
    fn default() -> Self {
        Self::identity()
    }
}
