use ndarray::ArrayView2;

/*
  Solve the square linear assignment problem with the Hungarian method
  (Kuhn-Munkres, shortest augmenting path form with dual potentials).

  Parameters
  ----------
  cost: array of shape (n, n)
      Finite assignment costs; cost[i, j] is the price of giving column j
      to row i.

  Returns
  -------
  row_to_col: vector of length n, or None
      row_to_col[i] is the column assigned to row i. The assignment has
      minimum total cost. None if no finite augmenting step exists, which
      only happens when costs or potentials are not finite.

  Rows are inserted in index order and a column only replaces the current
  best candidate on a strictly smaller reduced cost, so among equal-cost
  assignments the same one is returned on every run.
*/
pub fn solve_assignment(cost: ArrayView2<f64>) -> Option<Vec<usize>> {
  let n = cost.nrows();
  debug_assert_eq!(n, cost.ncols(), "assignment cost matrix must be square");
  if n == 0 {
    return Some(Vec::new());
  }

  // Index 0 is a virtual column/row used as the root of each augmenting tree;
  // real rows and columns are 1-based below.
  let mut u = vec![0.0f64; n + 1];
  let mut v = vec![0.0f64; n + 1];
  let mut col_owner = vec![0usize; n + 1];
  let mut way = vec![0usize; n + 1];
  let mut min_slack = vec![f64::INFINITY; n + 1];
  let mut used = vec![false; n + 1];

  for row in 1..=n {
    col_owner[0] = row;
    let mut j0 = 0usize;
    min_slack.fill(f64::INFINITY);
    used.fill(false);

    loop {
      used[j0] = true;
      let i0 = col_owner[j0];
      let mut delta = f64::INFINITY;
      let mut j1 = 0usize;

      for j in 1..=n {
        if used[j] {
          continue;
        }
        let reduced = cost[(i0 - 1, j - 1)] - u[i0] - v[j];
        if reduced < min_slack[j] {
          min_slack[j] = reduced;
          way[j] = j0;
        }
        if min_slack[j] < delta {
          delta = min_slack[j];
          j1 = j;
        }
      }
      if !delta.is_finite() {
        return None;
      }

      for j in 0..=n {
        if used[j] {
          u[col_owner[j]] += delta;
          v[j] -= delta;
        } else {
          min_slack[j] -= delta;
        }
      }

      j0 = j1;
      if col_owner[j0] == 0 {
        break;
      }
    }

    // Flip the augmenting path back to the root.
    loop {
      let j1 = way[j0];
      col_owner[j0] = col_owner[j1];
      j0 = j1;
      if j0 == 0 {
        break;
      }
    }
  }

  let mut row_to_col = vec![0usize; n];
  for j in 1..=n {
    row_to_col[col_owner[j] - 1] = j - 1;
  }
  Some(row_to_col)
}

#[cfg(test)]
mod tests {
  use super::*;
  use ndarray::Array2;
  use ndarray::array;

  fn total(cost: &Array2<f64>, assignment: &[usize]) -> f64 {
    assignment
      .iter()
      .enumerate()
      .map(|(i, &j)| cost[(i, j)])
      .sum()
  }

  /// Exhaustive minimum over all permutations, for small n.
  fn brute_force(cost: &Array2<f64>) -> f64 {
    fn rec(cost: &Array2<f64>, row: usize, taken: &mut Vec<bool>) -> f64 {
      if row == cost.nrows() {
        return 0.0;
      }
      let mut best = f64::INFINITY;
      for j in 0..cost.ncols() {
        if !taken[j] {
          taken[j] = true;
          best = best.min(cost[(row, j)] + rec(cost, row + 1, taken));
          taken[j] = false;
        }
      }
      best
    }
    rec(cost, 0, &mut vec![false; cost.ncols()])
  }

  #[test]
  fn solves_textbook_instance() {
    let cost = array![[4.0, 1.0, 3.0], [2.0, 0.0, 5.0], [3.0, 2.0, 2.0]];
    let assignment = solve_assignment(cost.view()).unwrap();
    assert_eq!(total(&cost, &assignment), 5.0);
  }

  #[test]
  fn assignment_is_a_permutation() {
    let cost = array![[1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 1.0]];
    let mut assignment = solve_assignment(cost.view()).unwrap();
    assignment.sort_unstable();
    assert_eq!(assignment, vec![0, 1, 2]);
  }

  #[test]
  fn matches_brute_force_on_random_instances() {
    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    let mut rng = StdRng::seed_from_u64(7);
    for n in 1..=6 {
      for _ in 0..20 {
        let cost = Array2::from_shape_fn((n, n), |_| rng.random::<f64>());
        let assignment = solve_assignment(cost.view()).unwrap();
        assert!((total(&cost, &assignment) - brute_force(&cost)).abs() < 1e-9);
      }
    }
  }

  #[test]
  fn empty_matrix() {
    assert_eq!(solve_assignment(Array2::<f64>::zeros((0, 0)).view()), Some(vec![]));
  }

  #[test]
  fn infinite_costs_return_none() {
    let cost = array![[f64::INFINITY, 1.0], [f64::INFINITY, 2.0]];
    assert_eq!(solve_assignment(cost.view()), None);
  }
}
