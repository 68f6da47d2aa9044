//! Convergence tracking & tolerance checks for iterative solvers.

/// Why a solve stopped (or has not).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConvergedReason {
    /// Residual norm fell below `rtol` times the initial residual norm.
    ConvergedRtol,
    /// Residual norm fell below the absolute tolerance.
    ConvergedAtol,
    /// Iteration cap reached without convergence.
    DivergedIts,
    /// Repeated breakdowns exhausted the restart budget.
    DivergedBreakdown,
    /// No verdict yet.
    Iterating,
}

impl ConvergedReason {
    pub fn is_converged(self) -> bool {
        matches!(self, ConvergedReason::ConvergedRtol | ConvergedReason::ConvergedAtol)
    }
}

/// Stopping criteria.
pub struct Convergence<T> {
    pub rtol: T,
    pub atol: T,
    pub max_iters: usize,
}

#[derive(Clone, Debug)]
pub struct SolveStats<T> {
    pub iterations: usize,
    pub final_residual: T,
    pub converged: bool,
    pub reason: ConvergedReason,
    /// Number of restart cycles taken after the first attempt.
    pub restarts: usize,
    /// Number of global reductions launched over the whole solve.
    pub reductions: usize,
}

impl<T: Copy + num_traits::Float> Convergence<T> {
    pub fn new(rtol: T, max_iters: usize) -> Self {
        Self { rtol, atol: T::zero(), max_iters }
    }

    /// Judge the residual norm at iteration `its` against the tolerances and
    /// the iteration cap.
    pub fn check(&self, res_norm: T, res0_norm: T, its: usize) -> ConvergedReason {
        if res_norm <= self.atol {
            ConvergedReason::ConvergedAtol
        } else if res_norm <= self.rtol * res0_norm {
            ConvergedReason::ConvergedRtol
        } else if its >= self.max_iters {
            ConvergedReason::DivergedIts
        } else {
            ConvergedReason::Iterating
        }
    }
}
