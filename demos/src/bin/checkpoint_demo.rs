/// Demonstration of checkpoint/resume for the barycenter solver.
///
/// This example shows how to:
/// 1. Seed a solver from a set of diagrams
/// 2. Step one iteration at a time, saving a checkpoint after each of the first two
/// 3. Load a checkpoint and resume until convergence
use pd_barycenter::BarycenterConfig;
use pd_barycenter::BarycenterSolver;
use pd_barycenter::InitStrategy;
use pd_barycenter::PersistenceDiagram;
use std::fs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt::init();

  println!("Barycenter Checkpoint/Resume Demo");
  println!();

  let diagrams = vec![
    PersistenceDiagram::from_pairs(&[(0.2, 0.5)])?,
    PersistenceDiagram::from_pairs(&[(0.2, 0.7)])?,
    PersistenceDiagram::from_pairs(&[(0.3, 0.6), (0.7, 0.8), (0.2, 0.3)])?,
    PersistenceDiagram::empty(),
  ];

  // Seeding from the empty diagram makes the solver build every point itself.
  let config = BarycenterConfig {
    init: InitStrategy::Index(3),
    ..Default::default()
  };
  let mut solver = BarycenterSolver::new(diagrams, &config)?;

  println!("=== Phase 1: Iterating with checkpoints ===");
  let mut checkpoints = Vec::new();
  while !solver.is_converged() && solver.current_iteration() < 2 {
    solver.step_iterations(1)?;
    println!(
      "  Iteration {} - {} points, energy of previous candidate: {:.6}",
      solver.current_iteration(),
      solver.candidate().len(),
      solver.energy()
    );

    let bytes = bincode::serialize(&solver)?;
    let filename = format!("barycenter_checkpoint_{:03}.bin", solver.current_iteration());
    fs::write(&filename, &bytes)?;
    println!("    Checkpoint saved: {} ({} bytes)", filename, bytes.len());
    checkpoints.push(filename);
  }

  println!();
  println!("=== Phase 2: Resuming from the last checkpoint ===");
  let Some(last) = checkpoints.last() else {
    println!("Nothing to resume: converged immediately.");
    return Ok(());
  };
  let mut resumed: BarycenterSolver = bincode::deserialize(&fs::read(last)?)?;
  println!(
    "Checkpoint loaded at iteration {}/{}",
    resumed.current_iteration(),
    resumed.max_iterations()
  );

  while !resumed.is_converged() && resumed.remaining_iterations() > 0 {
    resumed.step_iterations(1)?;
    println!(
      "  Iteration {} - {} points",
      resumed.current_iteration(),
      resumed.candidate().len()
    );
  }

  let fitted = resumed.into_fitted()?;
  println!();
  println!(
    "Barycenter after {} iterations (converged: {}):",
    fitted.n_iter(),
    fitted.converged()
  );
  for [birth, death] in fitted.diagram().iter() {
    println!("  ({birth:.4}, {death:.4})");
  }

  println!();
  println!("=== Cleanup ===");
  for filename in &checkpoints {
    fs::remove_file(filename)?;
    println!("Removed {}", filename);
  }

  Ok(())
}
