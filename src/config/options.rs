//! Command-line or API options for the pipelined CG solver.
//!
//! This module provides the `PipelcgOptions` struct, which collects the
//! recognized solver options: the pipeline depth `l`, the eigenvalue bound
//! estimates feeding the shift selector, and the convergence criteria.

use crate::error::KError;

/// Solver options with their defaults.
#[derive(Debug, Clone)]
pub struct PipelcgOptions {
    /// Pipeline depth `l` (number of speculative operator applications, >= 1)
    pub pipeline_depth: usize,

    /// Estimate for the smallest eigenvalue (0 = unknown/unused)
    pub lambda_min: f64,

    /// Estimate for the largest eigenvalue (0 = unknown/unused)
    pub lambda_max: f64,

    /// Relative convergence tolerance on the residual norm
    pub rtol: f64,

    /// Absolute convergence tolerance on the residual norm
    pub atol: f64,

    /// Iteration cap, cumulative across restarts (>= pipeline_depth)
    pub max_iters: usize,
}

impl Default for PipelcgOptions {
    fn default() -> Self {
        Self {
            pipeline_depth: 1,
            lambda_min: 0.0,
            lambda_max: 0.0,
            rtol: 1e-8,
            atol: 0.0,
            max_iters: 10_000,
        }
    }
}

impl PipelcgOptions {
    /// Check the option combination that must hold before any workspace is
    /// allocated: `max_iters >= 1`, `pipeline_depth >= 1`, and
    /// `pipeline_depth <= max_iters`.
    pub fn validate(&self) -> Result<(), KError> {
        if self.max_iters < 1 {
            return Err(KError::InvalidConfig(
                "max_iters argument must be positive".into(),
            ));
        }
        if self.pipeline_depth < 1 {
            return Err(KError::InvalidConfig(
                "pipeline_depth argument must be positive".into(),
            ));
        }
        if self.pipeline_depth > self.max_iters {
            return Err(KError::InvalidConfig(
                "pipeline_depth argument must not exceed max_iters".into(),
            ));
        }
        Ok(())
    }
}
