use crate::error::BarycenterError;
use crate::error::Result;
use ndarray::Array2;
use ndarray::ArrayView2;
use serde::Deserialize;
use serde::Serialize;

/// A persistence diagram: a multiset of (birth, death) pairs.
///
/// Points are stored as the rows of an `n × 2` array, column 0 holding births
/// and column 1 deaths. Row order carries no meaning and duplicate rows are
/// distinct points. An empty diagram always has shape `0 × 2`.
///
/// Every point satisfies `death >= birth` and has finite coordinates; the
/// constructors reject anything else. Serialized, a diagram is its point
/// array, and deserializing goes back through [`PersistenceDiagram::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Array2<f64>", into = "Array2<f64>")]
pub struct PersistenceDiagram {
  points: Array2<f64>,
}

impl PersistenceDiagram {
  /// Wrap an `n × 2` array of (birth, death) rows.
  ///
  /// An array with zero rows is accepted whatever its column count and
  /// normalised to `0 × 2`.
  ///
  /// # Errors
  ///
  /// - [`BarycenterError::InvalidShape`] if a non-empty array does not have 2 columns
  /// - [`BarycenterError::NonFinitePoint`] for NaN or infinite coordinates
  /// - [`BarycenterError::InvalidDiagram`] for a point with `death < birth`
  pub fn new(points: Array2<f64>) -> Result<Self> {
    if points.nrows() == 0 {
      return Ok(Self::empty());
    }
    if points.ncols() != 2 {
      return Err(BarycenterError::InvalidShape {
        diagram: 0,
        ncols: points.ncols(),
      });
    }
    for (idx, row) in points.outer_iter().enumerate() {
      let (birth, death) = (row[0], row[1]);
      if !birth.is_finite() || !death.is_finite() {
        return Err(BarycenterError::NonFinitePoint {
          diagram: 0,
          point: idx,
        });
      }
      if death < birth {
        return Err(BarycenterError::InvalidDiagram {
          diagram: 0,
          point: idx,
          birth,
          death,
        });
      }
    }
    Ok(Self { points })
  }

  /// Build a diagram from (birth, death) pairs.
  pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self> {
    let points = Array2::from_shape_fn((pairs.len(), 2), |(i, j)| {
      if j == 0 { pairs[i].0 } else { pairs[i].1 }
    });
    Self::new(points)
  }

  /// The diagram with no points.
  pub fn empty() -> Self {
    Self {
      points: Array2::zeros((0, 2)),
    }
  }

  /// Build from coordinates produced by the solver, which preserve the
  /// invariants by construction.
  pub(crate) fn from_points_unchecked(points: Vec<[f64; 2]>) -> Self {
    let mut arr = Array2::zeros((points.len(), 2));
    for (i, [b, d]) in points.into_iter().enumerate() {
      arr[(i, 0)] = b;
      arr[(i, 1)] = d.max(b);
    }
    Self { points: arr }
  }

  /// Number of points, counted with multiplicity.
  pub fn len(&self) -> usize {
    self.points.nrows()
  }

  pub fn is_empty(&self) -> bool {
    self.points.nrows() == 0
  }

  /// Get the `i`-th point as `[birth, death]`.
  ///
  /// # Panics
  ///
  /// Panics if `i >= self.len()`.
  pub fn point(&self, i: usize) -> [f64; 2] {
    [self.points[(i, 0)], self.points[(i, 1)]]
  }

  /// Iterate over the points as `[birth, death]`.
  pub fn iter(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
    self.points.outer_iter().map(|row| [row[0], row[1]])
  }

  /// Zero-copy view of the `n × 2` point array.
  pub fn points(&self) -> ArrayView2<'_, f64> {
    self.points.view()
  }

  /// Consume the diagram and return the point array.
  pub fn into_array(self) -> Array2<f64> {
    self.points
  }

  /// Sum of `death - birth` over all points.
  pub fn total_persistence(&self) -> f64 {
    self.iter().map(|[b, d]| d - b).sum()
  }
}

impl Default for PersistenceDiagram {
  fn default() -> Self {
    Self::empty()
  }
}

impl TryFrom<Array2<f64>> for PersistenceDiagram {
  type Error = BarycenterError;

  fn try_from(points: Array2<f64>) -> Result<Self> {
    Self::new(points)
  }
}

impl From<PersistenceDiagram> for Array2<f64> {
  fn from(diagram: PersistenceDiagram) -> Self {
    diagram.points
  }
}

/// Orthogonal projection of a point onto the diagonal `birth == death`.
#[inline(always)]
pub fn diagonal_projection(p: [f64; 2]) -> [f64; 2] {
  let mid = (p[0] + p[1]) / 2.0;
  [mid, mid]
}

/// Validate a whole input set, tagging errors with the offending diagram index.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use pd_barycenter::{BarycenterError, validate_diagrams};
///
/// let err = validate_diagrams(&[array![[0.0, 1.0]], array![[0.5, 0.2]]]).unwrap_err();
/// assert!(matches!(err, BarycenterError::InvalidDiagram { diagram: 1, .. }));
/// ```
pub fn validate_diagrams(diagrams: &[Array2<f64>]) -> Result<Vec<PersistenceDiagram>> {
  diagrams
    .iter()
    .enumerate()
    .map(|(i, d)| PersistenceDiagram::new(d.clone()).map_err(|e| e.in_diagram(i)))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use ndarray::array;

  #[test]
  fn empty_array_normalises_shape() {
    let dg = PersistenceDiagram::new(Array2::zeros((0, 0))).unwrap();
    assert!(dg.is_empty());
    assert_eq!(dg.points().shape(), &[0, 2]);
  }

  #[test]
  fn rejects_death_before_birth() {
    let err = PersistenceDiagram::new(array![[0.1, 0.4], [0.5, 0.3]]).unwrap_err();
    assert_eq!(
      err,
      BarycenterError::InvalidDiagram {
        diagram: 0,
        point: 1,
        birth: 0.5,
        death: 0.3,
      }
    );
  }

  #[test]
  fn rejects_wrong_column_count() {
    let err = PersistenceDiagram::new(array![[0.1, 0.4, 0.2]]).unwrap_err();
    assert_eq!(err, BarycenterError::InvalidShape { diagram: 0, ncols: 3 });
  }

  #[test]
  fn rejects_infinite_death() {
    let err = PersistenceDiagram::from_pairs(&[(0.0, f64::INFINITY)]).unwrap_err();
    assert_eq!(err, BarycenterError::NonFinitePoint { diagram: 0, point: 0 });
  }

  #[test]
  fn diagonal_points_are_valid() {
    let dg = PersistenceDiagram::from_pairs(&[(0.3, 0.3), (0.1, 0.2)]).unwrap();
    assert_eq!(dg.len(), 2);
    assert_eq!(dg.point(0), [0.3, 0.3]);
    assert!((dg.total_persistence() - 0.1).abs() < 1e-12);
  }

  #[test]
  fn validate_diagrams_reports_diagram_index() {
    let set = vec![array![[0.0, 1.0]], Array2::zeros((0, 2)), array![[2.0, 1.0]]];
    let err = validate_diagrams(&set).unwrap_err();
    assert!(matches!(
      err,
      BarycenterError::InvalidDiagram {
        diagram: 2,
        point: 0,
        ..
      }
    ));
  }

  #[test]
  fn serde_roundtrip_keeps_points() {
    let dg = PersistenceDiagram::from_pairs(&[(0.0, 1.0), (0.2, 0.5)]).unwrap();
    let bytes = bincode::serialize(&dg).unwrap();
    let back: PersistenceDiagram = bincode::deserialize(&bytes).unwrap();
    assert_eq!(back, dg);
  }

  #[test]
  fn deserialize_rejects_tampered_points() {
    // A diagram serializes as its point array, so this is a valid diagram's
    // byte layout with birth and death swapped.
    let bytes = bincode::serialize(&array![[1.0, 0.0]]).unwrap();
    assert!(bincode::deserialize::<PersistenceDiagram>(&bytes).is_err());

    let bytes = bincode::serialize(&array![[0.0, f64::NAN]]).unwrap();
    assert!(bincode::deserialize::<PersistenceDiagram>(&bytes).is_err());
  }

  #[test]
  fn deserialized_empty_diagram_is_normalised() {
    let bytes = bincode::serialize(&Array2::<f64>::zeros((0, 0))).unwrap();
    let dg: PersistenceDiagram = bincode::deserialize(&bytes).unwrap();
    assert_eq!(dg.points().shape(), &[0, 2]);
  }

  #[test]
  fn projection_lands_on_diagonal() {
    assert_eq!(diagonal_projection([0.2, 0.6]), [0.4, 0.4]);
  }
}
