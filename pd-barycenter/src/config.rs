use crate::diagram::PersistenceDiagram;
use crate::error::BarycenterError;
use crate::error::Result;
use serde::Deserialize;
use serde::Serialize;
use std::time::Duration;

/// How the barycenter candidate is seeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum InitStrategy {
  /// Run the iteration once from every distinct input diagram and keep the
  /// result with the lowest energy. Ties go to the lowest index.
  ///
  /// The result is never worse than any single input. Only
  /// [`LagrangianBarycenter`](crate::LagrangianBarycenter) supports this; a
  /// [`BarycenterSolver`](crate::BarycenterSolver) runs exactly one seed.
  #[default]
  BestOfInputs,

  /// Start from the input diagram with the most points. Ties go to the lowest
  /// index.
  Largest,

  /// Start from the input diagram at this index.
  Index(usize),

  /// Start from a caller-supplied diagram, not necessarily one of the inputs.
  Diagram(PersistenceDiagram),
}

/// Configuration for the Lloyd iteration loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationParams {
  /// Hard cap on the number of assignment/update rounds.
  ///
  /// Reaching the cap is not an error; the current candidate is returned.
  ///
  /// Must be >= 1.
  ///
  /// Default: 1000
  pub max_iterations: usize,

  /// Largest coordinate change still counted as "unchanged".
  ///
  /// The candidate has converged once an iteration creates no new points,
  /// removes none, and moves no coordinate by more than this amount.
  ///
  /// Must be >= 0.
  ///
  /// Default: 1e-10
  pub tolerance: f64,

  /// Wall-clock budget for the whole fit, checked between iterations.
  ///
  /// Default: None (no limit)
  pub time_limit: Option<Duration>,
}

impl Default for IterationParams {
  fn default() -> Self {
    Self {
      max_iterations: 1000,
      tolerance: 1e-10,
      time_limit: None,
    }
  }
}

/// Configuration for the assignment step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingParams {
  /// Match the candidate against the input diagrams in parallel.
  ///
  /// Results are merged in input order, so this never changes the output.
  ///
  /// Default: true
  pub parallel: bool,
}

impl Default for MatchingParams {
  fn default() -> Self {
    Self { parallel: true }
  }
}

/// Complete barycenter configuration.
///
/// # Example
///
/// ```
/// use pd_barycenter::{BarycenterConfig, InitStrategy, IterationParams};
///
/// let config = BarycenterConfig {
///     init: InitStrategy::Index(3),
///     iteration: IterationParams {
///         max_iterations: 50,
///         ..Default::default()
///     },
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BarycenterConfig {
  /// Seed for the barycenter candidate.
  pub init: InitStrategy,

  /// Iteration loop configuration.
  pub iteration: IterationParams,

  /// Assignment step configuration.
  pub matching: MatchingParams,

  /// Log per-iteration progress at `info` level instead of `debug`.
  ///
  /// Never affects the result.
  ///
  /// Default: false
  pub verbose: bool,
}

impl BarycenterConfig {
  /// Check parameter ranges.
  pub fn validate(&self) -> Result<()> {
    if self.iteration.max_iterations < 1 {
      return Err(BarycenterError::InvalidConfig(
        "max_iterations must be >= 1, got 0".to_string(),
      ));
    }
    if !(self.iteration.tolerance >= 0.0) {
      return Err(BarycenterError::InvalidConfig(format!(
        "tolerance must be >= 0, got {}",
        self.iteration.tolerance
      )));
    }
    Ok(())
  }
}
