use crate::diagram::diagonal_projection;

/*
  Mean of the off-diagonal points matched to one barycenter point, with the
  diagrams that matched it to the diagonal counted as copies of the diagonal.

  Parameters
  ----------
  points: slice of k points, k <= m
      The off-diagonal points matched to the barycenter point, at most one
      per input diagram.

  m: int
      Number of input diagrams. The (m - k) remaining diagrams contribute
      the projection of the mean onto the diagonal.

  Returns
  -------
  (k * mean + (m - k) * proj(mean)) / m, or None when k == 0 (a point that
  every diagram sends to the diagonal has nothing left to represent).
*/
pub fn weighted_diagonal_mean(points: &[[f64; 2]], m: usize) -> Option<[f64; 2]> {
  let k = points.len();
  if k == 0 || m == 0 {
    return None;
  }
  debug_assert!(k <= m, "more matched points ({k}) than diagrams ({m})");

  let mut mean = [0.0f64; 2];
  for p in points {
    mean[0] += p[0];
    mean[1] += p[1];
  }
  mean[0] /= k as f64;
  mean[1] /= k as f64;

  let delta = diagonal_projection(mean);
  let (k, rest, m) = (k as f64, (m - points.len()) as f64, m as f64);
  Some([
    (k * mean[0] + rest * delta[0]) / m,
    (k * mean[1] + rest * delta[1]) / m,
  ])
}
