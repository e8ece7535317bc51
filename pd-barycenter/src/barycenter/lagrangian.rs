use super::assignment::AssignmentStep;
use super::fitted::FittedBarycenter;
use super::solver::BarycenterSolver;
use crate::config::BarycenterConfig;
use crate::config::InitStrategy;
use crate::diagram::PersistenceDiagram;
use crate::diagram::validate_diagrams;
use crate::error::BarycenterError;
use crate::error::Result;
use ndarray::Array2;
use std::time::Instant;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Lagrangian barycenter of persistence diagrams.
///
/// Finds a diagram `Y` that locally minimises `sum_i W_2(Y, X_i)^2` by
/// alternating optimal matchings against every input with a move of each
/// point of `Y` to the mean of its matches, as in k-means.
///
/// # Example
///
/// ```
/// use pd_barycenter::{BarycenterConfig, LagrangianBarycenter, PersistenceDiagram};
///
/// let diagrams = vec![
///     PersistenceDiagram::from_pairs(&[(0.2, 0.5)]).unwrap(),
///     PersistenceDiagram::from_pairs(&[(0.2, 0.7)]).unwrap(),
/// ];
/// let fitted = LagrangianBarycenter::new(BarycenterConfig::default())
///     .fit(&diagrams)
///     .unwrap();
/// assert_eq!(fitted.diagram().len(), 1);
/// ```
pub struct LagrangianBarycenter {
  config: BarycenterConfig,
}

impl LagrangianBarycenter {
  pub fn new(config: BarycenterConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &BarycenterConfig {
    &self.config
  }

  /// Compute the barycenter of already validated diagrams.
  ///
  /// The inputs are cloned into the solver and never modified. With
  /// [`InitStrategy::BestOfInputs`] one solver runs per distinct input and the
  /// `time_limit` covers all of them together.
  ///
  /// # Errors
  ///
  /// - [`BarycenterError::EmptyInput`] if `diagrams` is empty
  /// - [`BarycenterError::InitOutOfRange`] for an `init` index past the end
  /// - [`BarycenterError::InvalidConfig`] if the configuration fails validation
  /// - [`BarycenterError::CostOverflow`] if coordinates are too large to square
  pub fn fit(&self, diagrams: &[PersistenceDiagram]) -> Result<FittedBarycenter> {
    let started = Instant::now();
    let fitted = match &self.config.init {
      InitStrategy::BestOfInputs => self.fit_best_of_inputs(diagrams, started)?,
      _ => self.fit_seeded(diagrams, &self.config, started)?,
    };

    if self.config.verbose {
      info!(
        duration_ms = started.elapsed().as_millis(),
        n_iter = fitted.n_iter(),
        n_points = fitted.diagram().len(),
        energy = fitted.energy(),
        converged = fitted.converged(),
        "barycenter complete"
      );
    }
    Ok(fitted)
  }

  /// Run from every input as the seed and keep the lowest energy. Duplicate
  /// inputs reach the same result, so only their first copy runs.
  fn fit_best_of_inputs(
    &self,
    diagrams: &[PersistenceDiagram],
    started: Instant,
  ) -> Result<FittedBarycenter> {
    self.config.validate()?;
    if diagrams.is_empty() {
      return Err(BarycenterError::EmptyInput);
    }

    let mut best: Option<(usize, FittedBarycenter)> = None;
    for (index, seed) in diagrams.iter().enumerate() {
      if diagrams[..index].contains(seed) {
        continue;
      }
      let config = BarycenterConfig {
        init: InitStrategy::Index(index),
        ..self.config.clone()
      };
      let fitted = self.fit_seeded(diagrams, &config, started)?;
      debug!(
        seed = index,
        n_iter = fitted.n_iter(),
        energy = fitted.energy(),
        "seeded run finished"
      );
      if best
        .as_ref()
        .is_none_or(|(_, current)| fitted.energy() < current.energy())
      {
        best = Some((index, fitted));
      }
    }

    let (seed, fitted) = best.ok_or(BarycenterError::EmptyInput)?;
    debug!(seed, energy = fitted.energy(), "kept lowest-energy seed");
    Ok(fitted)
  }

  fn fit_seeded(
    &self,
    diagrams: &[PersistenceDiagram],
    config: &BarycenterConfig,
    started: Instant,
  ) -> Result<FittedBarycenter> {
    let mut solver = BarycenterSolver::new(diagrams.to_vec(), config)?;

    let mut timed_out = false;
    while !solver.is_converged() && solver.remaining_iterations() > 0 {
      if let Some(limit) = config.iteration.time_limit {
        if started.elapsed() >= limit {
          timed_out = true;
          break;
        }
      }
      solver.step_iterations(1)?;
    }

    if !solver.is_converged() {
      warn!(
        n_iter = solver.current_iteration(),
        max_iterations = solver.max_iterations(),
        timed_out,
        "barycenter stopped before convergence"
      );
    }

    solver.into_fitted()
  }

  /// Validate raw `n × 2` arrays, then compute their barycenter.
  ///
  /// # Errors
  ///
  /// Everything [`fit`](Self::fit) returns, plus the validation errors of
  /// [`PersistenceDiagram::new`] tagged with the index of the offending diagram.
  pub fn fit_arrays(&self, diagrams: &[Array2<f64>]) -> Result<FittedBarycenter> {
    let diagrams = validate_diagrams(diagrams)?;
    self.fit(&diagrams)
  }
}

/// Barycenter of a set of diagrams given as `n × 2` arrays.
///
/// `init` selects the input diagram that seeds the iteration; `None` runs from
/// every input and keeps the lowest-energy result (lowest index on ties), so
/// the barycenter is never worse than any single input. `verbose` logs
/// per-iteration progress at `info` level and never changes the result.
///
/// Returns the barycenter as an `n × 2` array with unspecified row order; the
/// barycenter of all-empty inputs is the `0 × 2` array.
///
/// # Errors
///
/// - [`BarycenterError::InvalidDiagram`] for a point with `death < birth`
/// - [`BarycenterError::EmptyInput`] if `pdiagset` is empty
/// - [`BarycenterError::InitOutOfRange`] if `init` is past the end
/// - [`BarycenterError::CostOverflow`] if coordinates are too large to square
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use pd_barycenter::lagrangian_barycenter;
///
/// let x = array![[0.1, 0.7], [0.55, 0.84]];
/// let y = lagrangian_barycenter(&[x.clone()], None, false).unwrap();
/// assert_eq!(y.shape(), x.shape());
/// ```
pub fn lagrangian_barycenter(
  pdiagset: &[Array2<f64>],
  init: Option<usize>,
  verbose: bool,
) -> Result<Array2<f64>> {
  let config = BarycenterConfig {
    init: init.map_or(InitStrategy::BestOfInputs, InitStrategy::Index),
    verbose,
    ..Default::default()
  };
  let fitted = LagrangianBarycenter::new(config).fit_arrays(pdiagset)?;
  Ok(fitted.into_array())
}

/// Mean squared 2-Wasserstein distance from `candidate` to `diagrams`.
///
/// This is the objective the barycenter minimises, scaled by `1 / m`.
///
/// # Errors
///
/// [`BarycenterError::EmptyInput`] if `diagrams` is empty, and
/// [`BarycenterError::CostOverflow`] if a matching cost is not finite.
pub fn barycenter_energy(
  candidate: &PersistenceDiagram,
  diagrams: &[PersistenceDiagram],
) -> Result<f64> {
  if diagrams.is_empty() {
    return Err(BarycenterError::EmptyInput);
  }
  let assignment = AssignmentStep::builder()
    .candidate(candidate)
    .diagrams(diagrams)
    .build()
    .exec()?;
  Ok(assignment.energy)
}
