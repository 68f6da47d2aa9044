pub mod convergence;
pub mod vecops;

pub use convergence::{Convergence, ConvergedReason, SolveStats};
