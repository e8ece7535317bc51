use crate::error::BarycenterError;
use crate::error::Result;
use crate::metric::GroundMetric;

/// Euclidean (L2) ground metric, `internal_p = 2`.
///
/// The distance of `(b, d)` to the diagonal is `(d - b) / sqrt(2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanGround;

impl GroundMetric for EuclideanGround {
  fn distance(&self, a: [f64; 2], b: [f64; 2]) -> f64 {
    rdist(a, b).sqrt()
  }

  fn diagonal_distance(&self, p: [f64; 2]) -> f64 {
    (p[1] - p[0]).abs() / std::f64::consts::SQRT_2
  }

  fn squared_distance(&self, a: [f64; 2], b: [f64; 2]) -> Option<f64> {
    Some(rdist(a, b))
  }
}

/// Chebyshev (L-infinity) ground metric, `internal_p = inf`.
///
/// This is the ground metric of the bottleneck distance. The distance to the
/// diagonal is half the persistence.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChebyshevGround;

impl GroundMetric for ChebyshevGround {
  fn distance(&self, a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - b[0]).abs().max((a[1] - b[1]).abs())
  }

  fn diagonal_distance(&self, p: [f64; 2]) -> f64 {
    (p[1] - p[0]).abs() / 2.0
  }
}

/// Minkowski (L-p) ground metric for a finite `p >= 1`.
#[derive(Debug, Clone, Copy)]
pub struct MinkowskiGround {
  p: f64,
}

impl MinkowskiGround {
  /// # Errors
  ///
  /// [`BarycenterError::InvalidConfig`] unless `1 <= p < inf`.
  pub fn new(p: f64) -> Result<Self> {
    if !(p >= 1.0 && p.is_finite()) {
      return Err(BarycenterError::InvalidConfig(format!(
        "Minkowski exponent must be finite and >= 1, got {p}"
      )));
    }
    Ok(Self { p })
  }

  pub fn p(&self) -> f64 {
    self.p
  }
}

impl GroundMetric for MinkowskiGround {
  fn distance(&self, a: [f64; 2], b: [f64; 2]) -> f64 {
    ((a[0] - b[0]).abs().powf(self.p) + (a[1] - b[1]).abs().powf(self.p)).powf(1.0 / self.p)
  }
}

/// Squared Euclidean distance (rdist), the barycenter's transport cost.
#[inline(always)]
pub fn rdist(a: [f64; 2], b: [f64; 2]) -> f64 {
  let db = a[0] - b[0];
  let dd = a[1] - b[1];
  db * db + dd * dd
}
