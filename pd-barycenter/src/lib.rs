//! Lagrangian barycenters and Wasserstein matchings of persistence diagrams.
//!
//! A persistence diagram is a multiset of (birth, death) pairs. This library
//! computes an "average" diagram of a collection: a diagram minimising the
//! sum of squared 2-Wasserstein distances to every input, found by a
//! Lloyd-style relaxation that alternates optimal partial matchings (points
//! may be matched to the diagonal) with a move of each barycenter point to
//! the mean of its matches.
//!
//! Diagrams are taken as given; computing them from data is out of scope.
//!
//! # Example
//!
//! ```
//! use ndarray::array;
//! use pd_barycenter::lagrangian_barycenter;
//!
//! let dg1 = array![[0.2, 0.5]];
//! let dg2 = array![[0.2, 0.7]];
//! let dg3 = array![[0.3, 0.6], [0.7, 0.8], [0.2, 0.3]];
//! let dg4 = ndarray::Array2::<f64>::zeros((0, 2));
//!
//! let barycenter = lagrangian_barycenter(&[dg1, dg2, dg3, dg4], Some(3), false).unwrap();
//! assert_eq!(barycenter.nrows(), 3);
//! ```
//!
//! # Features
//!
//! - **Exact matchings**: Hungarian assignment on the diagonal-augmented cost matrix
//! - **Parallel assignment step**: Rayon fan-out over input diagrams, merged in order
//! - **Resumable**: [`BarycenterSolver`] serializes between iterations
//! - **Extensible ground metrics**: via the [`GroundMetric`] trait
//!
//! # Public API
//!
//! * [`lagrangian_barycenter`] - One-call barycenter of `n × 2` arrays
//! * [`LagrangianBarycenter`] - Configurable barycenter algorithm
//! * [`BarycenterSolver`] - Step-by-step iteration state
//! * [`FittedBarycenter`] - Result with groupings, energy and iteration count
//! * [`wasserstein_distance`] / [`wasserstein_matching`] - q-Wasserstein distance
//! * [`PersistenceDiagram`] - Validated diagram type

// Public modules
pub mod config;
pub mod diagram;
pub mod error;
pub mod metric;

// Public re-exports (primary API)
pub use barycenter::fitted::FittedBarycenter;
pub use barycenter::lagrangian::LagrangianBarycenter;
pub use barycenter::lagrangian::barycenter_energy;
pub use barycenter::lagrangian::lagrangian_barycenter;
pub use barycenter::solver::BarycenterSolver;
pub use config::BarycenterConfig;
pub use config::InitStrategy;
pub use config::IterationParams;
pub use config::MatchingParams;
pub use diagram::PersistenceDiagram;
pub use diagram::validate_diagrams;
pub use error::BarycenterError;
pub use error::Result;
pub use matching::Matching;
pub use matching::wasserstein_distance;
pub use matching::wasserstein_matching;
pub use metric::GroundMetric;

// Internal modules (not exposed)
mod barycenter;
mod distances;
mod matching;

// Re-export ground metrics for convenience
pub use distances::ChebyshevGround;
pub use distances::EuclideanGround;
pub use distances::MinkowskiGround;
