use std::fmt;

use sbank_core::NeighborhoodKey;

use crate::metric::Metric;

/// Point of the 2-D parameter space held by, or proposed to, a bank.
///
/// The metric norm is computed once at construction. Templates carry no
/// identity beyond their coordinates and provenance flag. Bank files hold
/// coordinates only; loading rebuilds templates under the bank metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Template {
    x1: f64,
    x2: f64,
    norm: f64,
    is_seed_point: bool,
}

impl Template {
    /// Creates a template generated during the current run.
    pub fn new(x1: f64, x2: f64, metric: &Metric) -> Self {
        Self {
            x1,
            x2,
            norm: metric.norm(x1, x2),
            is_seed_point: false,
        }
    }

    /// Creates a template loaded from a pre-existing bank.
    pub fn seed(x1: f64, x2: f64, metric: &Metric) -> Self {
        Self {
            is_seed_point: true,
            ..Self::new(x1, x2, metric)
        }
    }

    /// First coordinate.
    pub fn x1(&self) -> f64 {
        self.x1
    }

    /// Second coordinate.
    pub fn x2(&self) -> f64 {
        self.x2
    }

    /// Metric norm `sqrt(pᵀ M p)`.
    pub fn norm(&self) -> f64 {
        self.norm
    }

    /// Whether the template came from a seed bank.
    pub fn is_seed_point(&self) -> bool {
        self.is_seed_point
    }

    /// Coordinates as an `(x1, x2)` pair.
    pub fn params(&self) -> [f64; 2] {
        [self.x1, self.x2]
    }

    /// Scalar projection used to order the bank.
    pub fn key(&self, key: NeighborhoodKey) -> f64 {
        match key {
            NeighborhoodKey::X1 => self.x1,
            NeighborhoodKey::X2 => self.x2,
            NeighborhoodKey::Norm => self.norm,
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.x1, self.x2)
    }
}
