pub mod assignment;
pub mod fitted;
pub mod lagrangian;
pub mod solver;
pub mod weighted_mean;
