//! Optimal partial matchings between persistence diagrams.
//!
//! A matching pairs points of diagram `A` with points of diagram `B`; every
//! point left out is sent to its projection on the diagonal. The optimal one
//! is found by reducing to a square assignment problem: `A` is padded with one
//! diagonal slot per point of `B` and vice versa, so a problem of size
//! `|A| + |B|` is handed to the Hungarian solver.

pub mod hungarian;

use crate::diagram::PersistenceDiagram;
use crate::error::BarycenterError;
use crate::error::Result;
use crate::metric::GroundMetric;
use hungarian::solve_assignment;
use ndarray::Array2;
use serde::Deserialize;
use serde::Serialize;
use typed_builder::TypedBuilder;

/// An optimal partial matching between two diagrams.
///
/// Each pair is `(index in A, index in B)`; `None` stands for the diagonal.
/// Every point of either diagram appears in exactly one pair, and no pair is
/// `(None, None)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matching {
  pairs: Vec<(Option<usize>, Option<usize>)>,
  cost: f64,
  order: f64,
}

impl Matching {
  /// The matched pairs, points of `A` first in index order, then the points of
  /// `B` sent to the diagonal.
  pub fn pairs(&self) -> &[(Option<usize>, Option<usize>)] {
    &self.pairs
  }

  /// Total transport cost: sum of ground distances raised to `order`.
  pub fn cost(&self) -> f64 {
    self.cost
  }

  /// The Wasserstein distance `cost^(1/order)`.
  pub fn distance(&self) -> f64 {
    self.cost.powf(1.0 / self.order)
  }

  /// For each point of `A`, its partner in `B` (or `None` for the diagonal).
  pub fn partners_of_a(&self, len_a: usize) -> Vec<Option<usize>> {
    let mut partners = vec![None; len_a];
    for &(a, b) in &self.pairs {
      if let Some(a) = a {
        partners[a] = b;
      }
    }
    partners
  }

  /// Points of `B` matched to the diagonal.
  pub fn unmatched_b(&self) -> impl Iterator<Item = usize> + '_ {
    self.pairs.iter().filter_map(|&(a, b)| match (a, b) {
      (None, Some(b)) => Some(b),
      _ => None,
    })
  }
}

#[derive(TypedBuilder, Debug)]
pub struct OptimalMatching<'a> {
  a: &'a PersistenceDiagram,
  b: &'a PersistenceDiagram,
  metric: &'a dyn GroundMetric,
  #[builder(default = 2.0)]
  order: f64,
}

impl<'a> OptimalMatching<'a> {
  /*
    Compute a minimum-cost partial matching between A and B.

    Augmented cost matrix of size (n + m), n = |A|, m = |B|:

                    B points (m)          diagonal slots (n)
      A points      c(a_i, b_j)           c(a_i, diag)
      diag slots    c(b_j, diag)          0

    where c is the ground distance raised to `order`. Any A point may use any
    of the n diagonal slots, so the padding never constrains the solution.

    Fails with CostOverflow if any entry is not finite; finite coordinates
    can still overflow once raised to `order`.
  */
  pub fn exec(self) -> Result<Matching> {
    let OptimalMatching {
      a,
      b,
      metric,
      order,
    } = self;

    let n = a.len();
    let m = b.len();
    let size = n + m;

    let squared = order == 2.0;
    let pair_cost = |p: [f64; 2], q: [f64; 2]| {
      if squared {
        metric
          .squared_distance(p, q)
          .unwrap_or_else(|| metric.distance(p, q).powi(2))
      } else {
        metric.distance(p, q).powf(order)
      }
    };
    let diag_cost = |p: [f64; 2]| {
      let d = metric.diagonal_distance(p);
      if squared { d * d } else { d.powf(order) }
    };

    let a_diag: Vec<f64> = a.iter().map(diag_cost).collect();
    let b_diag: Vec<f64> = b.iter().map(diag_cost).collect();

    let mut cost = Array2::<f64>::zeros((size, size));
    for (i, p) in a.iter().enumerate() {
      for (j, q) in b.iter().enumerate() {
        cost[(i, j)] = pair_cost(p, q);
      }
      for k in 0..n {
        cost[(i, m + k)] = a_diag[i];
      }
    }
    for k in 0..m {
      for (j, &c) in b_diag.iter().enumerate() {
        cost[(n + k, j)] = c;
      }
    }

    let overflow = BarycenterError::CostOverflow { order };
    if cost.iter().any(|c| !c.is_finite()) {
      return Err(overflow);
    }
    let row_to_col = solve_assignment(cost.view()).ok_or(overflow)?;

    let mut pairs = Vec::with_capacity(size);
    let mut total = 0.0;
    for (row, &col) in row_to_col.iter().enumerate() {
      total += cost[(row, col)];
      match (row < n, col < m) {
        (true, true) => pairs.push((Some(row), Some(col))),
        (true, false) => pairs.push((Some(row), None)),
        (false, true) => pairs.push((None, Some(col))),
        (false, false) => {}
      }
    }

    if !total.is_finite() {
      return Err(BarycenterError::CostOverflow { order });
    }
    Ok(Matching {
      pairs,
      cost: total,
      order,
    })
  }
}

/// Compute the optimal matching between two diagrams for the `order`-Wasserstein
/// distance with the given ground metric.
///
/// # Errors
///
/// [`BarycenterError::InvalidConfig`] unless `order` is finite and `>= 1`.
/// [`BarycenterError::CostOverflow`] if a transport cost is not representable.
pub fn wasserstein_matching(
  a: &PersistenceDiagram,
  b: &PersistenceDiagram,
  order: f64,
  metric: &dyn GroundMetric,
) -> Result<Matching> {
  if !(order >= 1.0 && order.is_finite()) {
    return Err(BarycenterError::InvalidConfig(format!(
      "Wasserstein order must be finite and >= 1, got {order}"
    )));
  }
  OptimalMatching::builder()
    .a(a)
    .b(b)
    .metric(metric)
    .order(order)
    .build()
    .exec()
}

/// The `order`-Wasserstein distance between two diagrams.
///
/// # Example
///
/// ```
/// use pd_barycenter::{EuclideanGround, PersistenceDiagram, wasserstein_distance};
///
/// let a = PersistenceDiagram::from_pairs(&[(0.0, 1.0)]).unwrap();
/// let b = PersistenceDiagram::empty();
/// let d = wasserstein_distance(&a, &b, 2.0, &EuclideanGround).unwrap();
/// assert!((d - 1.0 / 2f64.sqrt()).abs() < 1e-12);
/// ```
pub fn wasserstein_distance(
  a: &PersistenceDiagram,
  b: &PersistenceDiagram,
  order: f64,
  metric: &dyn GroundMetric,
) -> Result<f64> {
  wasserstein_matching(a, b, order, metric).map(|m| m.distance())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::distances::ChebyshevGround;
  use crate::distances::EuclideanGround;
  use crate::distances::MinkowskiGround;

  fn dg(pairs: &[(f64, f64)]) -> PersistenceDiagram {
    PersistenceDiagram::from_pairs(pairs).unwrap()
  }

  #[test]
  fn identical_diagrams_have_zero_distance() {
    let a = dg(&[(0.1, 0.5), (0.2, 0.9), (0.3, 0.35)]);
    let m = wasserstein_matching(&a, &a, 2.0, &EuclideanGround).unwrap();
    assert_eq!(m.cost(), 0.0);
    assert_eq!(
      m.partners_of_a(a.len()),
      vec![Some(0), Some(1), Some(2)]
    );
  }

  #[test]
  fn empty_against_empty() {
    let e = PersistenceDiagram::empty();
    let m = wasserstein_matching(&e, &e, 2.0, &EuclideanGround).unwrap();
    assert!(m.pairs().is_empty());
    assert_eq!(m.distance(), 0.0);
  }

  #[test]
  fn far_points_prefer_the_diagonal() {
    // Both points are close to the diagonal but far from each other.
    let a = dg(&[(0.0, 0.1)]);
    let b = dg(&[(5.0, 5.1)]);
    let m = wasserstein_matching(&a, &b, 2.0, &EuclideanGround).unwrap();
    assert_eq!(m.partners_of_a(1), vec![None]);
    assert_eq!(m.unmatched_b().collect::<Vec<_>>(), vec![0]);
    assert!((m.cost() - 2.0 * 0.005).abs() < 1e-12);
  }

  #[test]
  fn close_points_match_each_other() {
    let a = dg(&[(0.2, 0.5)]);
    let b = dg(&[(0.2, 0.7)]);
    let m = wasserstein_matching(&a, &b, 2.0, &EuclideanGround).unwrap();
    assert_eq!(m.pairs(), &[(Some(0), Some(0))]);
    assert!((m.cost() - 0.04).abs() < 1e-12);
  }

  #[test]
  fn distance_is_symmetric() {
    let a = dg(&[(0.1, 0.15), (0.1, 0.7), (0.55, 0.84)]);
    let b = dg(&[(0.12, 0.41), (0.61, 0.75)]);
    for order in [1.0, 2.0, 3.0] {
      let ab = wasserstein_distance(&a, &b, order, &EuclideanGround).unwrap();
      let ba = wasserstein_distance(&b, &a, order, &EuclideanGround).unwrap();
      assert!((ab - ba).abs() < 1e-12);
    }
  }

  #[test]
  fn chebyshev_order_one_distance() {
    let a = dg(&[(0.0, 1.0)]);
    let b = dg(&[(0.0, 1.2)]);
    let d = wasserstein_distance(&a, &b, 1.0, &ChebyshevGround).unwrap();
    assert!((d - 0.2).abs() < 1e-12);
  }

  #[test]
  fn rejects_bad_order() {
    let a = dg(&[(0.0, 1.0)]);
    assert!(wasserstein_distance(&a, &a, 0.5, &EuclideanGround).is_err());
  }

  /// Only knows squared distances; `distance` must never be reached at order 2.
  #[derive(Debug)]
  struct SquaredOnly;

  impl GroundMetric for SquaredOnly {
    fn distance(&self, _a: [f64; 2], _b: [f64; 2]) -> f64 {
      panic!("order-2 costs must come from squared_distance")
    }

    fn diagonal_distance(&self, p: [f64; 2]) -> f64 {
      (p[1] - p[0]).abs() / 2f64.sqrt()
    }

    fn squared_distance(&self, a: [f64; 2], b: [f64; 2]) -> Option<f64> {
      Some((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2))
    }
  }

  #[test]
  fn order_two_uses_squared_distance() {
    let a = dg(&[(0.2, 0.5)]);
    let b = dg(&[(0.2, 0.7)]);
    let m = wasserstein_matching(&a, &b, 2.0, &SquaredOnly).unwrap();
    assert!((m.cost() - 0.04).abs() < 1e-12);
  }

  #[test]
  fn metrics_without_squared_form_fall_back_to_distance() {
    let a = dg(&[(0.1, 0.15), (0.1, 0.7), (0.55, 0.84)]);
    let b = dg(&[(0.12, 0.41), (0.61, 0.75)]);
    let euclid = wasserstein_distance(&a, &b, 2.0, &EuclideanGround).unwrap();
    let minkowski = MinkowskiGround::new(2.0).unwrap();
    let generic = wasserstein_distance(&a, &b, 2.0, &minkowski).unwrap();
    assert!((euclid - generic).abs() < 1e-12);
  }

  #[test]
  fn overflowing_costs_are_an_error() {
    let a = dg(&[(-1e300, 1e300)]);
    let b = dg(&[(-1e300, -1e300)]);
    assert_eq!(
      wasserstein_distance(&a, &b, 2.0, &EuclideanGround),
      Err(BarycenterError::CostOverflow { order: 2.0 })
    );
  }
}
