use crate::diagram::PersistenceDiagram;
use crate::distances::EuclideanGround;
use crate::error::Result;
use crate::matching::Matching;
use crate::matching::OptimalMatching;
use rayon::prelude::*;
use typed_builder::TypedBuilder;

/// Result of matching the candidate against every input diagram.
#[derive(Debug, Clone)]
pub struct Assignment {
  /// `groupings[j][i]` is the point of diagram `i` matched to candidate point
  /// `j`, or `None` if diagram `i` sends it to the diagonal.
  pub groupings: Vec<Vec<Option<usize>>>,

  /// `(diagram, point)` for every input point matched to the diagonal,
  /// sorted.
  pub unmatched: Vec<(usize, usize)>,

  /// Mean squared 2-Wasserstein distance from the candidate to the inputs.
  pub energy: f64,
}

#[derive(TypedBuilder, Debug)]
pub struct AssignmentStep<'a> {
  candidate: &'a PersistenceDiagram,
  diagrams: &'a [PersistenceDiagram],
  #[builder(default = true)]
  parallel: bool,
}

impl<'a> AssignmentStep<'a> {
  /*
    Compute the optimal (order 2, internal_p 2) matching between the
    candidate and each input diagram, then merge them into per-point
    groupings.

    Each matching only reads the candidate and one input, so they run as an
    independent fan-out. The merge walks the results in input order; the
    output does not depend on `parallel`. A failed matching fails the step.
  */
  pub fn exec(self) -> Result<Assignment> {
    let AssignmentStep {
      candidate,
      diagrams,
      parallel,
    } = self;

    let match_one = |x: &PersistenceDiagram| -> Result<Matching> {
      OptimalMatching::builder()
        .a(candidate)
        .b(x)
        .metric(&EuclideanGround)
        .order(2.0)
        .build()
        .exec()
    };

    let matchings: Vec<Matching> = if parallel {
      diagrams.par_iter().map(match_one).collect::<Result<_>>()?
    } else {
      diagrams.iter().map(match_one).collect::<Result<_>>()?
    };

    let m = diagrams.len();
    let k = candidate.len();
    let mut groupings = vec![vec![None; m]; k];
    let mut unmatched = Vec::new();
    let mut total_cost = 0.0;

    for (i, matching) in matchings.iter().enumerate() {
      total_cost += matching.cost();
      for (j, partner) in matching.partners_of_a(k).into_iter().enumerate() {
        groupings[j][i] = partner;
      }
      let mut spare: Vec<usize> = matching.unmatched_b().collect();
      spare.sort_unstable();
      unmatched.extend(spare.into_iter().map(|x| (i, x)));
    }

    Ok(Assignment {
      groupings,
      unmatched,
      energy: if m > 0 { total_cost / m as f64 } else { 0.0 },
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::BarycenterError;

  #[test]
  fn empty_candidate_leaves_every_point_unmatched() {
    let diagrams = vec![
      PersistenceDiagram::from_pairs(&[(0.2, 0.5)]).unwrap(),
      PersistenceDiagram::empty(),
      PersistenceDiagram::from_pairs(&[(0.3, 0.6), (0.7, 0.8)]).unwrap(),
    ];
    let candidate = PersistenceDiagram::empty();
    let assignment = AssignmentStep::builder()
      .candidate(&candidate)
      .diagrams(&diagrams)
      .build()
      .exec()
      .unwrap();
    assert!(assignment.groupings.is_empty());
    assert_eq!(assignment.unmatched, vec![(0, 0), (2, 0), (2, 1)]);
  }

  #[test]
  fn parallel_and_sequential_agree() {
    let diagrams = vec![
      PersistenceDiagram::from_pairs(&[(0.2, 0.5), (0.1, 0.9)]).unwrap(),
      PersistenceDiagram::from_pairs(&[(0.2, 0.7)]).unwrap(),
      PersistenceDiagram::from_pairs(&[(0.3, 0.6), (0.7, 0.8), (0.2, 0.3)]).unwrap(),
    ];
    let candidate = PersistenceDiagram::from_pairs(&[(0.25, 0.6), (0.15, 0.8)]).unwrap();
    let run = |parallel| {
      AssignmentStep::builder()
        .candidate(&candidate)
        .diagrams(&diagrams)
        .parallel(parallel)
        .build()
        .exec()
        .unwrap()
    };
    let (par, seq) = (run(true), run(false));
    assert_eq!(par.groupings, seq.groupings);
    assert_eq!(par.unmatched, seq.unmatched);
    assert_eq!(par.energy, seq.energy);
  }

  #[test]
  fn overflow_in_any_diagram_is_reported() {
    let diagrams = vec![
      PersistenceDiagram::from_pairs(&[(0.2, 0.5)]).unwrap(),
      PersistenceDiagram::from_pairs(&[(-1e300, 1e300)]).unwrap(),
    ];
    let candidate = PersistenceDiagram::from_pairs(&[(0.2, 0.6)]).unwrap();
    for parallel in [true, false] {
      let result = AssignmentStep::builder()
        .candidate(&candidate)
        .diagrams(&diagrams)
        .parallel(parallel)
        .build()
        .exec();
      assert!(matches!(result, Err(BarycenterError::CostOverflow { .. })));
    }
  }
}
