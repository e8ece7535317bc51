//! Error types for diagram validation and barycenter computation.

use thiserror::Error;

/// Error type for every fallible operation in this crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BarycenterError {
  /// A point dies before it is born.
  #[error("diagram {diagram}: point {point} has death {death} < birth {birth}")]
  InvalidDiagram {
    diagram: usize,
    point: usize,
    birth: f64,
    death: f64,
  },

  /// A coordinate is NaN or infinite.
  #[error("diagram {diagram}: point {point} has a non-finite coordinate")]
  NonFinitePoint { diagram: usize, point: usize },

  /// A non-empty array whose rows are not (birth, death) pairs.
  #[error("diagram {diagram}: expected 2 columns, got {ncols}")]
  InvalidShape { diagram: usize, ncols: usize },

  /// The barycenter of zero diagrams is undefined.
  #[error("cannot compute the barycenter of an empty set of diagrams")]
  EmptyInput,

  /// The requested seed diagram does not exist.
  #[error("init index {index} is out of range for {n_diagrams} diagrams")]
  InitOutOfRange { index: usize, n_diagrams: usize },

  #[error("invalid configuration: {0}")]
  InvalidConfig(String),

  /// A transport cost is not finite, e.g. squared coordinates overflow `f64`.
  #[error("matching cost overflowed: coordinates are too large for order {order}")]
  CostOverflow { order: f64 },
}

impl BarycenterError {
  /// Re-attribute a validation error to diagram `index` of an input set.
  pub(crate) fn in_diagram(self, index: usize) -> Self {
    match self {
      BarycenterError::InvalidDiagram {
        point, birth, death, ..
      } => BarycenterError::InvalidDiagram {
        diagram: index,
        point,
        birth,
        death,
      },
      BarycenterError::NonFinitePoint { point, .. } => BarycenterError::NonFinitePoint {
        diagram: index,
        point,
      },
      BarycenterError::InvalidShape { ncols, .. } => BarycenterError::InvalidShape {
        diagram: index,
        ncols,
      },
      other => other,
    }
  }
}

/// Result type for barycenter operations.
pub type Result<T> = std::result::Result<T, BarycenterError>;
