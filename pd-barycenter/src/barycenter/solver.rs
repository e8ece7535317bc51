use super::assignment::Assignment;
use super::assignment::AssignmentStep;
use super::fitted::FittedBarycenter;
use super::weighted_mean::weighted_diagonal_mean;
use crate::config::BarycenterConfig;
use crate::config::InitStrategy;
use crate::diagram::PersistenceDiagram;
use crate::error::BarycenterError;
use crate::error::Result;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;

/// Active state of the Lloyd-style barycenter iteration.
///
/// Owns the input diagrams (never modified) and the current candidate. The
/// solver can be serialized between iterations and resumed later, then
/// converted to a lightweight [`FittedBarycenter`] when done.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarycenterSolver {
  diagrams: Vec<PersistenceDiagram>,
  candidate: PersistenceDiagram,

  // State of the last assignment step
  groupings: Vec<Vec<Option<usize>>>,
  energy: f64,

  // Progress tracking
  current_iteration: usize,
  max_iterations: usize,
  converged: bool,

  tolerance: f64,
  parallel: bool,
  verbose: bool,
}

impl BarycenterSolver {
  /// Seed a solver from the input diagrams.
  ///
  /// When every input is empty the solver starts out converged on the empty
  /// diagram and never iterates.
  ///
  /// # Errors
  ///
  /// - [`BarycenterError::EmptyInput`] if `diagrams` is empty
  /// - [`BarycenterError::InitOutOfRange`] for an `init` index past the end
  /// - [`BarycenterError::InvalidConfig`] if the configuration fails validation,
  ///   or for [`InitStrategy::BestOfInputs`], which needs one solver per seed
  pub fn new(diagrams: Vec<PersistenceDiagram>, config: &BarycenterConfig) -> Result<Self> {
    config.validate()?;
    if diagrams.is_empty() {
      return Err(BarycenterError::EmptyInput);
    }

    let all_empty = diagrams.iter().all(PersistenceDiagram::is_empty);
    let candidate = if all_empty {
      PersistenceDiagram::empty()
    } else {
      match &config.init {
        InitStrategy::BestOfInputs => {
          return Err(BarycenterError::InvalidConfig(
            "a solver runs a single seed; use Largest, Index or Diagram".to_string(),
          ));
        }
        InitStrategy::Largest => {
          // max_by_key keeps the last maximum; reverse to favour the lowest index.
          let (_, seed) = diagrams
            .iter()
            .enumerate()
            .rev()
            .max_by_key(|(_, d)| d.len())
            .ok_or(BarycenterError::EmptyInput)?;
          seed.clone()
        }
        InitStrategy::Index(index) => diagrams
          .get(*index)
          .cloned()
          .ok_or(BarycenterError::InitOutOfRange {
            index: *index,
            n_diagrams: diagrams.len(),
          })?,
        InitStrategy::Diagram(seed) => seed.clone(),
      }
    };

    debug!(
      n_diagrams = diagrams.len(),
      n_points = candidate.len(),
      all_empty,
      "barycenter solver seeded"
    );

    Ok(Self {
      groupings: vec![vec![None; diagrams.len()]; candidate.len()],
      diagrams,
      candidate,
      energy: 0.0,
      current_iteration: 0,
      max_iterations: config.iteration.max_iterations,
      converged: all_empty,
      tolerance: config.iteration.tolerance,
      parallel: config.matching.parallel,
      verbose: config.verbose,
    })
  }

  /// Run up to `n` more assignment/update rounds, stopping early on convergence.
  ///
  /// On error the solver keeps the candidate of the last completed round.
  ///
  /// # Errors
  ///
  /// [`BarycenterError::CostOverflow`] if a matching cost is not finite.
  ///
  /// # Panics
  ///
  /// Panics if this would exceed `max_iterations`. Check `remaining_iterations()` first.
  pub fn step_iterations(&mut self, n: usize) -> Result<()> {
    assert!(
      self.current_iteration + n <= self.max_iterations,
      "Cannot step {} iterations: would exceed max_iterations {} (current: {})",
      n,
      self.max_iterations,
      self.current_iteration
    );

    for _ in 0..n {
      if self.converged {
        break;
      }
      self.step()?;
    }
    Ok(())
  }

  fn step(&mut self) -> Result<()> {
    let Assignment {
      groupings,
      unmatched,
      energy,
    } = AssignmentStep::builder()
      .candidate(&self.candidate)
      .diagrams(&self.diagrams)
      .parallel(self.parallel)
      .build()
      .exec()?;

    let m = self.diagrams.len();

    // Move every candidate point to the mean of its matches; drop the ones
    // nobody matched.
    let updated: Vec<[f64; 2]> = groupings
      .iter()
      .filter_map(|row| {
        let matched: Vec<[f64; 2]> = row
          .iter()
          .enumerate()
          .filter_map(|(i, x)| x.map(|x| self.diagrams[i].point(x)))
          .collect();
        weighted_diagonal_mean(&matched, m)
      })
      .collect();
    let removed = self.candidate.len() - updated.len();

    // Input points left on the diagonal seed new candidate points.
    let created: Vec<[f64; 2]> = unmatched
      .iter()
      .filter_map(|&(i, x)| weighted_diagonal_mean(&[self.diagrams[i].point(x)], m))
      .collect();

    let stable = created.is_empty()
      && removed == 0
      && updated
        .iter()
        .zip(self.candidate.iter())
        .all(|(new, old)| {
          (new[0] - old[0]).abs() <= self.tolerance && (new[1] - old[1]).abs() <= self.tolerance
        });

    self.current_iteration += 1;
    self.energy = energy;
    self.groupings = groupings;
    self.converged = stable;

    let n_created = created.len();
    let mut points = updated;
    points.extend(created);
    self.candidate = PersistenceDiagram::from_points_unchecked(points);

    if self.verbose {
      info!(
        iteration = self.current_iteration,
        n_points = self.candidate.len(),
        energy,
        created = n_created,
        removed,
        "barycenter iteration"
      );
    } else {
      debug!(
        iteration = self.current_iteration,
        n_points = self.candidate.len(),
        energy,
        created = n_created,
        removed,
        "barycenter iteration"
      );
    }
    Ok(())
  }

  /// Whether the last round left the candidate unchanged.
  pub fn is_converged(&self) -> bool {
    self.converged
  }

  /// Number of rounds run so far.
  pub fn current_iteration(&self) -> usize {
    self.current_iteration
  }

  pub fn max_iterations(&self) -> usize {
    self.max_iterations
  }

  pub fn remaining_iterations(&self) -> usize {
    self.max_iterations - self.current_iteration
  }

  /// The current barycenter candidate.
  pub fn candidate(&self) -> &PersistenceDiagram {
    &self.candidate
  }

  /// The input diagrams.
  pub fn diagrams(&self) -> &[PersistenceDiagram] {
    &self.diagrams
  }

  /// Energy of the candidate seen by the last assignment step.
  pub fn energy(&self) -> f64 {
    self.energy
  }

  /// Consume the solver and return the fitted barycenter.
  ///
  /// A converged candidate reuses the groupings of its last assignment step.
  /// Otherwise (iteration cap or time limit reached, or no step run yet) one
  /// more assignment is computed so the groupings and energy describe the
  /// returned diagram.
  ///
  /// # Errors
  ///
  /// [`BarycenterError::CostOverflow`] if that final assignment fails.
  pub fn into_fitted(self) -> Result<FittedBarycenter> {
    let (groupings, energy) = if self.converged {
      (self.groupings, self.energy)
    } else {
      let assignment = AssignmentStep::builder()
        .candidate(&self.candidate)
        .diagrams(&self.diagrams)
        .parallel(self.parallel)
        .build()
        .exec()?;
      (assignment.groupings, assignment.energy)
    };

    Ok(FittedBarycenter {
      diagram: self.candidate,
      groupings,
      energy,
      n_iter: self.current_iteration,
      converged: self.converged,
    })
  }
}
