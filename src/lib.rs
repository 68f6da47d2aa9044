//! pipelcg: deep-pipelined conjugate gradient over opaque operators
//!
//! This crate implements the pipelined(l) conjugate gradient method for large
//! sparse symmetric positive-definite systems Ax = b distributed across
//! parallel ranks. `l` extra operator/preconditioner applications run ahead of
//! the global reduction they depend on, so the latency of each inner-product
//! reduction is overlapped with `l` steps of local work.

pub mod parallel;

pub mod config;
pub mod core;
pub mod error;
pub mod pipeline;
pub mod preconditioner;
pub mod solver;
pub mod utils;

// Re-exports for convenience
pub use config::*;
pub use core::*;
pub use error::*;
pub use pipeline::*;
pub use preconditioner::*;
pub use solver::*;
pub use utils::*;

// Re-export SolveStats at the crate root for convenience
pub use utils::convergence::SolveStats;
