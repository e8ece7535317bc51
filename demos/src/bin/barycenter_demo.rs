use clap::Parser;
use ndarray::Array2;
use pd_barycenter::BarycenterConfig;
use pd_barycenter::InitStrategy;
use pd_barycenter::IterationParams;
use pd_barycenter::LagrangianBarycenter;
use pd_barycenter::PersistenceDiagram;
use pd_barycenter::validate_diagrams;
use rand::Rng;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "Persistence Diagram Barycenter Demo")]
struct Args {
  /// JSON file holding a list of diagrams, each a list of [birth, death] pairs.
  /// When absent, noisy copies of a built-in diagram are generated.
  #[arg(short, long)]
  input: Option<PathBuf>,

  /// Number of noisy copies to generate (ignored with --input)
  #[arg(short, long, default_value = "8")]
  copies: usize,

  /// Maximum coordinate jitter of generated copies
  #[arg(short, long, default_value = "0.03")]
  noise: f64,

  /// Index of the diagram that seeds the barycenter (default: try every input)
  #[arg(long)]
  init: Option<usize>,

  /// Iteration cap
  #[arg(short, long, default_value = "1000")]
  max_iterations: usize,

  /// Write the barycenter as JSON to this path
  #[arg(short, long)]
  output: Option<PathBuf>,

  /// Log every iteration
  #[arg(short, long)]
  verbose: bool,
}

const BASE_DIAGRAM: [(f64, f64); 9] = [
  (0.1, 0.15),
  (0.1, 0.7),
  (0.2, 0.22),
  (0.55, 0.84),
  (0.11, 0.91),
  (0.61, 0.75),
  (0.33, 0.46),
  (0.12, 0.41),
  (0.32, 0.48),
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let args = Args::parse();

  println!("Persistence Diagram Barycenter Demo");
  println!("===================================");

  let diagrams = match &args.input {
    Some(path) => load_diagrams(path)?,
    None => noisy_copies(args.copies, args.noise)?,
  };
  let sizes: Vec<usize> = diagrams.iter().map(PersistenceDiagram::len).collect();
  println!("Diagrams: {} (sizes {:?})", diagrams.len(), sizes);
  println!();

  let config = BarycenterConfig {
    init: args.init.map_or(InitStrategy::BestOfInputs, InitStrategy::Index),
    iteration: IterationParams {
      max_iterations: args.max_iterations,
      ..Default::default()
    },
    verbose: args.verbose,
    ..Default::default()
  };

  println!("Computing Lagrangian barycenter...");
  let start = Instant::now();
  let fitted = LagrangianBarycenter::new(config).fit(&diagrams)?;
  println!(
    "  Finished in {:.3}s after {} iterations (converged: {})",
    start.elapsed().as_secs_f32(),
    fitted.n_iter(),
    fitted.converged()
  );
  println!("  Energy (mean squared W2): {:.6}", fitted.energy());
  println!();

  println!("Barycenter ({} points):", fitted.diagram().len());
  for [birth, death] in fitted.diagram().iter() {
    println!("  ({birth:.4}, {death:.4})");
  }

  if let Some(path) = &args.output {
    let points: Vec<[f64; 2]> = fitted.diagram().iter().collect();
    fs::write(path, serde_json::to_string_pretty(&points)?)?;
    println!();
    println!("Saved to {}", path.display());
  }

  Ok(())
}

/// Read `[[[b, d], ...], ...]` from a JSON file.
fn load_diagrams(path: &Path) -> Result<Vec<PersistenceDiagram>, Box<dyn std::error::Error>> {
  let raw: Vec<Vec<[f64; 2]>> = serde_json::from_str(&fs::read_to_string(path)?)?;
  let arrays: Vec<Array2<f64>> = raw
    .iter()
    .map(|points| Array2::from_shape_fn((points.len(), 2), |(r, c)| points[r][c]))
    .collect();
  Ok(validate_diagrams(&arrays)?)
}

/// Jitter every point of the base diagram and randomly drop a few.
fn noisy_copies(
  copies: usize,
  noise: f64,
) -> Result<Vec<PersistenceDiagram>, Box<dyn std::error::Error>> {
  let mut rng = rand::rng();
  let mut diagrams = Vec::with_capacity(copies);
  for _ in 0..copies {
    let mut pairs = Vec::with_capacity(BASE_DIAGRAM.len());
    for &(b, d) in &BASE_DIAGRAM {
      if rng.random_bool(0.1) {
        continue;
      }
      let b = b + rng.random_range(-noise..=noise);
      let d = d + rng.random_range(-noise..=noise);
      pairs.push((b, d.max(b)));
    }
    diagrams.push(PersistenceDiagram::from_pairs(&pairs)?);
  }
  Ok(diagrams)
}
