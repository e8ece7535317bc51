use crate::diagram::diagonal_projection;
use std::fmt::Debug;

/// A ground metric on the (birth, death) half-plane.
///
/// The ground metric measures how far apart two diagram points are, and how
/// far a point is from the diagonal. Wasserstein matchings raise it to the
/// matching order `q` to get the transport cost. Thread-safety (Send + Sync)
/// is required because matchings against different diagrams run in parallel.
pub trait GroundMetric: Debug + Send + Sync {
  /// Distance between two off-diagonal points.
  fn distance(&self, a: [f64; 2], b: [f64; 2]) -> f64;

  /// Distance from a point to the diagonal.
  ///
  /// For every `L_p` ground metric the closest diagonal point is the
  /// orthogonal projection, so the default measures the distance to it.
  fn diagonal_distance(&self, p: [f64; 2]) -> f64 {
    self.distance(p, diagonal_projection(p))
  }

  /// Optional squared distance without a square root.
  ///
  /// Return `Some` if the metric has a cheaper squared form. Order-2
  /// matchings take their point-to-point costs from it and fall back to
  /// `distance(a, b)^2` otherwise.
  ///
  /// Default: None
  fn squared_distance(&self, _a: [f64; 2], _b: [f64; 2]) -> Option<f64> {
    None
  }
}
