use crate::diagram::PersistenceDiagram;
use ndarray::Array2;
use serde::Deserialize;
use serde::Serialize;

/// A computed barycenter together with its iteration log.
///
/// This is a lightweight struct that holds only the final results, without
/// the input diagrams the solver carried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedBarycenter {
  pub(crate) diagram: PersistenceDiagram,
  pub(crate) groupings: Vec<Vec<Option<usize>>>,
  pub(crate) energy: f64,
  pub(crate) n_iter: usize,
  pub(crate) converged: bool,
}

impl FittedBarycenter {
  /// The barycenter diagram. Row order is unspecified.
  pub fn diagram(&self) -> &PersistenceDiagram {
    &self.diagram
  }

  /// Consume the result and return the barycenter diagram.
  pub fn into_diagram(self) -> PersistenceDiagram {
    self.diagram
  }

  /// Consume the result and return the `n × 2` point array.
  pub fn into_array(self) -> Array2<f64> {
    self.diagram.into_array()
  }

  /// For each barycenter point `j` and input diagram `i`, the index of the
  /// point of diagram `i` matched to it, or `None` for the diagonal.
  pub fn groupings(&self) -> &[Vec<Option<usize>>] {
    &self.groupings
  }

  /// Mean squared 2-Wasserstein distance from the barycenter to the inputs.
  pub fn energy(&self) -> f64 {
    self.energy
  }

  /// Number of assignment/update rounds that were run.
  pub fn n_iter(&self) -> usize {
    self.n_iter
  }

  /// False if the iteration cap or time limit stopped the solver first.
  pub fn converged(&self) -> bool {
    self.converged
  }
}
