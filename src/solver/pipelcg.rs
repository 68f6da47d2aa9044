//! Pipelined(l) conjugate gradient with deep pipelines.
//!
//! Classical CG serializes a global reduction into every iteration; at scale
//! the reduction latency dominates. This solver runs `l` operator and
//! preconditioner applications speculatively ahead of the reduction they
//! depend on, so each inner-product reduction is awaited only `l` iterations
//! after it was launched. The price is a shifted auxiliary basis, an
//! incrementally factorized banded Gram matrix, and a breakdown mode that is
//! handled with a GMRES-style restart instead of a hard failure.
//!
//! Structure of one inner step `it`:
//! 1. advance the basis (warm-up steps apply the Chebyshev shift),
//! 2. complete the Gram column whose reduction was launched `l` steps ago,
//!    orthogonalize it against the band and take the diagonal square root
//!    (breakdown check lives here),
//! 3. derive the tridiagonal recurrence coefficients,
//! 4. update the basis rings and working image by the three-term recurrence,
//! 5. compute local partial dot products for the newest column and launch its
//!    reduction,
//! 6. update the iterate and residual norm via the two-term eta/zeta
//!    recurrence and run the convergence test.
//!
//! # References
//! - Cornelis, Cools, Vanroose (2018). The communication-hiding pipelined
//!   BiCGStab/CG family with deeper pipelines.

use crate::core::traits::{InnerProduct, MatVec};
use crate::error::KError;
use crate::parallel::Comm;
use crate::pipeline::{chebyshev_shifts, Workspace};
use crate::preconditioner::Preconditioner;
use crate::solver::LinearSolver;
use crate::utils::convergence::{Convergence, ConvergedReason, SolveStats};
use crate::utils::vecops::{axpy, scale};

/// A Gram pivot at or below this fraction of the unorthogonalized diagonal
/// is roundoff, not a new direction: the column lies numerically in the span
/// of the previous ones.
const PIVOT_COLLAPSE_TOL: f64 = 100.0 * f64::EPSILON;

/// Deep-pipelined CG solver.
///
/// Generic over the communicator `C`; the pipeline depth decides how many
/// reductions may be outstanding (`l + 1`) and how much local work hides each
/// reduction's latency.
pub struct PipelcgSolver<C: Comm> {
    pub conv: Convergence<f64>,
    /// Pipeline depth `l`.
    pub l: usize,
    /// Eigenvalue bound estimates for the shift selector (0 = unknown).
    pub lambda_min: f64,
    pub lambda_max: f64,
    pub comm: C,
    pub monitor: Option<Box<dyn FnMut(usize, f64)>>,
    pub residual_history: Vec<f64>,
}

/// Progress that survives restarts: the cumulative inner iteration count and
/// the reference residual norm for the relative tolerance.
struct RunState {
    its: usize,
    res0: f64,
}

enum InnerOutcome {
    /// Positive-definiteness was lost; restart from the current iterate.
    Breakdown,
    /// Converged or diverged with the given reason.
    Finished(ConvergedReason),
}

fn apply_pc<M, V>(
    pc: Option<&dyn Preconditioner<M, V>>,
    r: &V,
    z: &mut V,
) -> Result<(), KError>
where
    V: AsRef<[f64]> + AsMut<[f64]>,
{
    match pc {
        Some(pc) => pc.apply(r, z),
        None => {
            z.as_mut().copy_from_slice(r.as_ref());
            Ok(())
        }
    }
}

impl<C: Comm> PipelcgSolver<C> {
    pub fn new(comm: C, rtol: f64, max_iters: usize) -> Self {
        Self {
            conv: Convergence::new(rtol, max_iters),
            l: 1,
            lambda_min: 0.0,
            lambda_max: 0.0,
            comm,
            monitor: None,
            residual_history: Vec::new(),
        }
    }

    /// Construct from an options struct, validating the combination.
    pub fn from_options(comm: C, opts: &crate::config::PipelcgOptions) -> Result<Self, KError> {
        opts.validate()?;
        Ok(Self {
            conv: Convergence {
                rtol: opts.rtol,
                atol: opts.atol,
                max_iters: opts.max_iters,
            },
            l: opts.pipeline_depth,
            lambda_min: opts.lambda_min,
            lambda_max: opts.lambda_max,
            comm,
            monitor: None,
            residual_history: Vec::new(),
        })
    }

    /// Set the pipeline depth `l`.
    pub fn with_depth(mut self, l: usize) -> Self {
        self.l = l;
        self
    }

    /// Supply eigenvalue bound estimates for the Chebyshev shifts.
    pub fn with_spectrum(mut self, lambda_min: f64, lambda_max: f64) -> Self {
        self.lambda_min = lambda_min;
        self.lambda_max = lambda_max;
        self
    }

    pub fn with_monitor<F>(mut self, f: F) -> Self
    where
        F: FnMut(usize, f64) + 'static,
    {
        self.monitor = Some(Box::new(f));
        self
    }

    /// Record a residual norm: history, monitor callback, convergence test.
    fn report(&mut self, rs: &mut RunState, dp: f64) -> Option<ConvergedReason> {
        if rs.res0 == 0.0 {
            rs.res0 = dp;
        }
        self.residual_history.push(dp);
        if let Some(monitor) = self.monitor.as_mut() {
            monitor(rs.its, dp);
        }
        match self.conv.check(dp, rs.res0, rs.its) {
            ConvergedReason::Iterating => None,
            reason => Some(reason),
        }
    }

    /// One restart attempt: up to `max_it + l` inner steps (the extra `l`
    /// steps drain the pipeline warm-up).
    fn run_inner<M, V>(
        &mut self,
        a: &M,
        pc: Option<&dyn Preconditioner<M, V>>,
        x: &mut V,
        ws: &mut Workspace<V, C::Handle>,
        rs: &mut RunState,
    ) -> Result<InnerOutcome, KError>
    where
        M: MatVec<V>,
        (): InnerProduct<V, Scalar = f64>,
        V: AsRef<[f64]> + AsMut<[f64]> + From<Vec<f64>> + Clone,
    {
        let l = self.l;
        let max_it = self.conv.max_iters;
        let ip = ();

        let mut beta = 0.0;
        let mut eta = 0.0;
        let mut zeta = 0.0;

        for it in 0..max_it + l {
            let mut pivot_collapsed = false;

            // --- Basis advance: z_{it+1} = B A z_it ---
            ws.upp.as_mut().copy_from_slice(ws.up.as_ref());
            ws.up.as_mut().copy_from_slice(ws.u.as_ref());
            if it < l {
                // warm-up: fill the ring top-down and apply the base shift to
                // both the new basis vector and the working image
                a.matvec(ws.z.get(l - it), &mut ws.u);
                apply_pc(pc, &ws.u, ws.z.get_mut(l - it - 1))?;
                let sigma_it = ws.sigma[it];
                {
                    let (znew, zold) = ws.z.get_pair_mut(l - it - 1, l - it);
                    axpy(znew.as_mut(), -sigma_it, zold.as_ref());
                }
                axpy(ws.u.as_mut(), -sigma_it, ws.z.get(l - it).as_ref());
            } else {
                if let Some(ze) = &mut ws.z_extra {
                    // l == 1: the departing slot is still needed two steps on
                    ze.as_mut().copy_from_slice(ws.z.get(l).as_ref());
                }
                ws.z.rotate();
                a.matvec(ws.z.get(1), &mut ws.u);
                apply_pc(pc, &ws.u, ws.z.get_mut(0))?;
            }

            // --- Gram column completion ---
            if it >= l {
                let col = it - l + 1;
                let k = it - l;

                if it == l {
                    // first reduction fixes the scale of the whole warm-up
                    ws.reqs.complete(0, &self.comm, &mut ws.g);
                    beta = ws.g.get(0, 0).sqrt();
                    ws.g.set(0, 0, 1.0);
                    axpy(ws.v.get_mut(2 * l).as_mut(), 1.0 / beta, ws.p.as_ref());
                    for j in 0..=l {
                        scale(ws.z.get_mut(j).as_mut(), 1.0 / beta);
                    }
                    scale(ws.u.as_mut(), 1.0 / beta);
                    scale(ws.up.as_mut(), 1.0 / beta);
                    scale(ws.upp.as_mut(), 1.0 / beta);
                }

                // the reduction for this column was launched l steps ago
                ws.reqs.complete(col, &self.comm, &mut ws.g);

                let lo = (it + 1).saturating_sub(3 * l); // max(it - 3l + 1, 0)
                if it <= 2 * l - 1 {
                    // warm-up columns were computed against unscaled vectors
                    let invbeta2 = 1.0 / (beta * beta);
                    for j in lo..=col {
                        ws.g.set(j, col, ws.g.get(j, col) * invbeta2);
                    }
                }

                // band-restricted triangular solve against completed columns
                for j in (it + 2).saturating_sub(2 * l)..=k {
                    let mut sum = 0.0;
                    for row in lo..j {
                        sum += ws.g.get(row, j) * ws.g.get(row, col);
                    }
                    ws.g.set(j, col, (ws.g.get(j, col) - sum) / ws.g.get(j, j));
                }

                let mut sum = 0.0;
                for row in lo..=k {
                    let gr = ws.g.get(row, col);
                    sum += gr * gr;
                }

                let raw = ws.g.get(col, col);
                let diag = raw - sum;
                if diag < 0.0 {
                    // loss of positive-definiteness: end the hanging
                    // dot-products in the pipeline, then hand control back to
                    // the restart loop ('it' can exceed max_it here)
                    let end = (it + 1).min(max_it + 1);
                    ws.reqs.drain(col + 1..end, &self.comm, &mut ws.g);
                    return Ok(InnerOutcome::Breakdown);
                }
                // A pivot at roundoff scale leaves no valid direction to
                // factor against. The iterate update for this step only
                // needs entries from earlier columns, so it still runs below
                // before control returns to the restart loop.
                pivot_collapsed = diag <= PIVOT_COLLAPSE_TOL * raw.abs();
                if !pivot_collapsed {
                    ws.g.set(col, col, diag.sqrt());
                }

                // --- Recurrence coefficients, three regimes ---
                if it < 2 * l {
                    if it == l {
                        ws.gamma[k] = (ws.g.get(k, k + 1) + ws.sigma[k] * ws.g.get(k, k))
                            / ws.g.get(k, k);
                    } else {
                        ws.gamma[k] = (ws.g.get(k, k + 1) + ws.sigma[k] * ws.g.get(k, k)
                            - ws.delta[k - 1] * ws.g.get(k - 1, k))
                            / ws.g.get(k, k);
                    }
                    if !pivot_collapsed {
                        ws.delta[k] = ws.g.get(k + 1, k + 1) / ws.g.get(k, k);
                    }
                } else if it == 2 * l {
                    ws.gamma[k] = (ws.g.get(k, k) * ws.gamma[k - l]
                        + ws.g.get(k, k + 1) * ws.delta[k - l]
                        - ws.g.get(k - 1, k) * ws.delta[k - 1])
                        / ws.g.get(k, k);
                    if !pivot_collapsed {
                        ws.delta[k] = (ws.g.get(k + 1, k + 1) * ws.delta[k - l]) / ws.g.get(k, k);
                    }
                } else {
                    // G(k, k-1) is the structural zero below the diagonal
                    ws.gamma[k] = (ws.g.get(k, k - 1) * ws.delta[k - l - 1]
                        + ws.g.get(k, k) * ws.gamma[k - l]
                        + ws.g.get(k, k + 1) * ws.delta[k - l]
                        - ws.g.get(k - 1, k) * ws.delta[k - 1])
                        / ws.g.get(k, k);
                    if !pivot_collapsed {
                        ws.delta[k] = (ws.g.get(k + 1, k + 1) * ws.delta[k - l]) / ws.g.get(k, k);
                    }
                }

                if !pivot_collapsed {
                    // --- Recurrence for the V basis ---
                    let gcc = ws.g.get(col, col);
                    if it < 3 * l {
                        let dst = 3 * l - it - 1;
                        axpy(ws.v.get_mut(dst).as_mut(), 1.0 / gcc, ws.z.get(l).as_ref());
                        for j in lo..=k {
                            let coeff = -ws.g.get(j, col) / gcc;
                            let (vd, vs) = ws.v.get_pair_mut(dst, 2 * l - j);
                            axpy(vd.as_mut(), coeff, vs.as_ref());
                        }
                    } else {
                        ws.v.rotate();
                        ws.v.get_mut(0).as_mut().fill(0.0);
                        axpy(ws.v.get_mut(0).as_mut(), 1.0 / gcc, ws.z.get(l).as_ref());
                        for j in lo..=k {
                            let coeff = -ws.g.get(j, col) / gcc;
                            let (vd, vs) = ws.v.get_pair_mut(0, col - j);
                            axpy(vd.as_mut(), coeff, vs.as_ref());
                        }
                    }

                    // --- Recurrence for the Z basis and the working image ---
                    if it > l {
                        let dl = ws.delta[k - 1];
                        if let Some(ze) = &ws.z_extra {
                            axpy(ws.z.get_mut(0).as_mut(), -dl, ze.as_ref());
                        } else {
                            let (z0, z2) = ws.z.get_pair_mut(0, 2);
                            axpy(z0.as_mut(), -dl, z2.as_ref());
                        }
                        axpy(ws.u.as_mut(), -dl, ws.upp.as_ref());
                    }
                    {
                        let gam = ws.gamma[k];
                        let (z0, z1) = ws.z.get_pair_mut(0, 1);
                        axpy(z0.as_mut(), -gam, z1.as_ref());
                    }
                    scale(ws.z.get_mut(0).as_mut(), 1.0 / ws.delta[k]);
                    axpy(ws.u.as_mut(), -ws.gamma[k], ws.up.as_ref());
                    scale(ws.u.as_mut(), 1.0 / ws.delta[k]);
                }
            }

            // --- Local dot products, then launch the column's reduction ---
            if it < l {
                let mut locals = Vec::with_capacity(it + 2);
                for j in 0..it + 2 {
                    locals.push(ip.dot(&ws.u, ws.z.get(l - j)));
                }
                let handle = self.comm.start_sum(locals);
                ws.reqs.launch(it + 1, 0, handle);
            } else if it < max_it && !pivot_collapsed {
                let start = (it + 1).saturating_sub(2 * l); // max(it - 2l + 1, 0)
                let middle = it - l + 2;
                let end = it + 2;
                let mut locals = Vec::with_capacity(end - start);
                for j in start..middle {
                    let vj = if it < 3 * l {
                        ws.v.get(2 * l - j)
                    } else {
                        ws.v.get(it - l + 1 - j)
                    };
                    locals.push(ip.dot(&ws.u, vj));
                }
                for j in middle..end {
                    locals.push(ip.dot(&ws.u, ws.z.get(it + 1 - j)));
                }
                let handle = self.comm.start_sum(locals);
                ws.reqs.launch(it + 1, start, handle);
            }

            // --- Solution vector and residual norm ---
            if it >= l {
                let k = it - l;
                let mut reason = if it == l {
                    if rs.its != 0 {
                        rs.its += 1;
                    }
                    eta = ws.gamma[0];
                    zeta = beta;
                    ws.p.as_mut().copy_from_slice(ws.v.get(2 * l).as_ref());
                    scale(ws.p.as_mut(), 1.0 / eta);
                    axpy(x.as_mut(), zeta, ws.p.as_ref());
                    self.report(rs, beta)
                } else {
                    rs.its += 1;
                    let lam = ws.delta[k - 1] / eta;
                    eta = ws.gamma[k] - lam * ws.delta[k - 1];
                    zeta = -lam * zeta;
                    scale(ws.p.as_mut(), -ws.delta[k - 1] / eta);
                    let vtop = if it < 3 * l {
                        ws.v.get(3 * l - it)
                    } else if pivot_collapsed {
                        // the ring was not rotated this step
                        ws.v.get(0)
                    } else {
                        ws.v.get(1)
                    };
                    axpy(ws.p.as_mut(), 1.0 / eta, vtop.as_ref());
                    axpy(x.as_mut(), zeta, ws.p.as_ref());
                    self.report(rs, zeta.abs())
                };
                if reason.is_none() && rs.its >= max_it - 1 {
                    reason = Some(ConvergedReason::DivergedIts);
                }
                if let Some(reason) = reason {
                    // end the hanging dot-products before leaving the loop
                    let end = (it + 2).min(max_it + 1);
                    ws.reqs.drain(it - l + 2..end, &self.comm, &mut ws.g);
                    return Ok(InnerOutcome::Finished(reason));
                }
                if pivot_collapsed {
                    // no reduction was launched this step; drain the rest and
                    // let the restart reseed from the just-updated iterate
                    let end = (it + 1).min(max_it + 1);
                    ws.reqs.drain(it - l + 2..end, &self.comm, &mut ws.g);
                    return Ok(InnerOutcome::Breakdown);
                }
            }
        }

        // pipeline drained without a verdict; let the restart loop decide
        Ok(InnerOutcome::Breakdown)
    }
}

impl<M, V, C> LinearSolver<M, V> for PipelcgSolver<C>
where
    M: MatVec<V>,
    (): InnerProduct<V, Scalar = f64>,
    V: AsRef<[f64]> + AsMut<[f64]> + From<Vec<f64>> + Clone,
    C: Comm,
{
    type Error = KError;
    type Scalar = f64;

    /// Run the restart envelope: compute the true residual, seed the
    /// pipeline, drive the recurrence engine, and restart cleanly after a
    /// breakdown. The cumulative inner-iteration count across restarts never
    /// exceeds `max_iters`.
    fn solve(
        &mut self,
        a: &M,
        pc: Option<&dyn Preconditioner<M, V>>,
        b: &V,
        x: &mut V,
    ) -> Result<SolveStats<f64>, KError> {
        let n = b.as_ref().len();
        let l = self.l;
        let max_it = self.conv.max_iters;
        let mut ws: Workspace<V, C::Handle> = Workspace::new(n, l, max_it)?;
        ws.sigma = chebyshev_shifts(self.lambda_min, self.lambda_max, l, pc.is_some());
        self.residual_history.clear();

        let ip = ();
        let mut rs = RunState { its: 0, res0: 0.0 };
        let mut reason = None;
        let mut guess_zero = x.as_ref().iter().all(|&xi| xi == 0.0);
        let mut outer_it = 0;

        while rs.its < max_it {
            // Init: true residual from the current iterate
            if guess_zero {
                ws.u.as_mut().copy_from_slice(b.as_ref());
            } else {
                a.matvec(x, &mut ws.u);
                for (ui, bi) in ws.u.as_mut().iter_mut().zip(b.as_ref()) {
                    *ui = bi - *ui;
                }
            }
            // Seed: the preconditioned residual becomes the first direction
            apply_pc(pc, &ws.u, &mut ws.p)?;
            if outer_it > 0 {
                ws.reinit();
            }
            let g00 = ip.dot(&ws.u, &ws.p);
            let handle = self.comm.start_sum(vec![g00]);
            ws.reqs.launch(0, 0, handle);
            ws.z.get_mut(l).as_mut().copy_from_slice(ws.p.as_ref());

            match self.run_inner(a, pc, x, &mut ws, &mut rs)? {
                InnerOutcome::Finished(r) => {
                    reason = Some(r);
                    break;
                }
                InnerOutcome::Breakdown => {}
            }
            outer_it += 1;
            guess_zero = false;
            if outer_it > max_it {
                // breakdown on every attempt without progress
                reason = Some(ConvergedReason::DivergedBreakdown);
                break;
            }
        }

        let reason = reason.unwrap_or(ConvergedReason::DivergedIts);
        Ok(SolveStats {
            iterations: rs.its,
            final_residual: self.residual_history.last().copied().unwrap_or(0.0),
            converged: reason.is_converged(),
            reason,
            restarts: outer_it,
            reductions: ws.reqs.launched(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::SerialComm;

    // Simple diagonal operator for testing
    struct DiagMat {
        diag: Vec<f64>,
    }
    impl MatVec<Vec<f64>> for DiagMat {
        fn matvec(&self, x: &Vec<f64>, y: &mut Vec<f64>) {
            for (i, di) in self.diag.iter().enumerate() {
                y[i] = di * x[i];
            }
        }
    }

    #[test]
    fn depth_one_solves_diagonal_spd() {
        // A = diag(1,2,3,4), b = ones: x = (1, 1/2, 1/3, 1/4)
        let a = DiagMat { diag: vec![1.0, 2.0, 3.0, 4.0] };
        let b = vec![1.0; 4];
        let mut x = vec![0.0; 4];
        let mut solver = PipelcgSolver::new(SerialComm, 1e-10, 10);
        let stats = solver.solve(&a, None, &b, &mut x).unwrap();
        assert!(stats.converged, "pipelined CG did not converge: {:?}", stats.reason);
        // four distinct eigenvalues: exact termination in at most 4 steps
        assert!(stats.iterations <= 4, "took {} iterations", stats.iterations);
        let expected = [1.0, 0.5, 1.0 / 3.0, 0.25];
        for (xi, ei) in x.iter().zip(expected.iter()) {
            assert!((xi - ei).abs() < 1e-8, "xi = {}, expected = {}", xi, ei);
        }
    }

    #[test]
    fn depth_two_matches_depth_one_solution() {
        let a = DiagMat { diag: vec![1.0, 2.0, 3.0, 4.0] };
        let b = vec![1.0; 4];

        let mut x1 = vec![0.0; 4];
        let mut s1 = PipelcgSolver::new(SerialComm, 1e-10, 10);
        let stats1 = s1.solve(&a, None, &b, &mut x1).unwrap();

        let mut x2 = vec![0.0; 4];
        let mut s2 = PipelcgSolver::new(SerialComm, 1e-10, 10).with_depth(2);
        let stats2 = s2.solve(&a, None, &b, &mut x2).unwrap();

        assert!(stats1.converged && stats2.converged);
        for (a1, a2) in x1.iter().zip(x2.iter()) {
            assert!((a1 - a2).abs() < 1e-8, "l=1 and l=2 disagree: {} vs {}", a1, a2);
        }
    }

    #[test]
    fn nonzero_initial_guess_is_honored() {
        let a = DiagMat { diag: vec![2.0, 5.0, 9.0] };
        let x_true = vec![3.0, -1.0, 0.5];
        let b = vec![6.0, -5.0, 4.5];
        let mut x = vec![1.0, 1.0, 1.0];
        let mut solver = PipelcgSolver::new(SerialComm, 1e-12, 50);
        let stats = solver.solve(&a, None, &b, &mut x).unwrap();
        assert!(stats.converged);
        for (xi, ti) in x.iter().zip(x_true.iter()) {
            assert!((xi - ti).abs() < 1e-8);
        }
    }

    #[test]
    fn returned_iterate_satisfies_the_true_residual() {
        // The convergence claim must hold for ‖b − Ax‖ of the returned
        // iterate, not merely for the recurrence estimate the solver
        // reports along the way.
        let a = DiagMat { diag: vec![1.0, 2.0, 3.0, 4.0] };
        let b = vec![1.0; 4];
        let norm_b = 2.0;
        for rtol in [1e-4, 1e-6, 1e-8] {
            let mut x = vec![0.0; 4];
            let mut solver = PipelcgSolver::new(SerialComm, rtol, 50);
            let stats = solver.solve(&a, None, &b, &mut x).unwrap();
            assert!(stats.converged, "rtol {}: {:?}", rtol, stats.reason);
            let mut ax = vec![0.0; 4];
            a.matvec(&x, &mut ax);
            let true_res = b
                .iter()
                .zip(&ax)
                .map(|(bi, ai)| (bi - ai) * (bi - ai))
                .sum::<f64>()
                .sqrt();
            assert!(
                true_res <= rtol * norm_b,
                "rtol {}: true residual {}",
                rtol,
                true_res
            );
            for (xi, ei) in x.iter().zip([1.0, 0.5, 1.0 / 3.0, 0.25]) {
                assert!((xi - ei).abs() < 1e-6, "xi = {}, expected = {}", xi, ei);
            }
        }
    }

    #[test]
    fn invalid_depth_is_a_setup_error() {
        let a = DiagMat { diag: vec![1.0, 2.0] };
        let b = vec![1.0; 2];
        let mut x = vec![0.0; 2];
        let mut solver = PipelcgSolver::new(SerialComm, 1e-8, 10).with_depth(0);
        assert!(matches!(
            solver.solve(&a, None, &b, &mut x),
            Err(KError::InvalidConfig(_))
        ));
        let mut solver = PipelcgSolver::new(SerialComm, 1e-8, 5).with_depth(6);
        assert!(matches!(
            solver.solve(&a, None, &b, &mut x),
            Err(KError::InvalidConfig(_))
        ));
    }

    #[test]
    fn history_and_monitor_agree() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let a = DiagMat { diag: vec![1.0, 2.0, 3.0, 4.0, 5.0] };
        let b = vec![1.0; 5];
        let mut x = vec![0.0; 5];
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut solver = PipelcgSolver::new(SerialComm, 1e-10, 20)
            .with_monitor(move |_its, dp| sink.borrow_mut().push(dp));
        let stats = solver.solve(&a, None, &b, &mut x).unwrap();
        assert!(stats.converged);
        assert_eq!(*seen.borrow(), solver.residual_history);
        assert!(!solver.residual_history.is_empty());
        // first reported norm is the initial residual norm sqrt(5)
        assert!((solver.residual_history[0] - 5.0f64.sqrt()).abs() < 1e-12);
    }
}
