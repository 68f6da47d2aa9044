//! Shift selection for the pipelined basis.
//!
//! Without a preconditioner the shifted basis is stabilized with Chebyshev
//! points of the estimated spectrum `[lambda_min, lambda_max]`. With a
//! preconditioner active the shifts are all zero: the preconditioner is
//! assumed to already improve conditioning.

use std::f64::consts::PI;

/// Compute the `l` base shifts. Pure function of the configuration.
pub fn chebyshev_shifts(
    lambda_min: f64,
    lambda_max: f64,
    l: usize,
    preconditioned: bool,
) -> Vec<f64> {
    if preconditioned {
        return vec![0.0; l];
    }
    let mid = 0.5 * (lambda_min + lambda_max);
    let half = 0.5 * (lambda_max - lambda_min);
    (0..l)
        .map(|i| mid + half * (PI * (2.0 * i as f64 + 1.0) / (2.0 * l as f64)).cos())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preconditioned_shifts_are_zero() {
        assert_eq!(chebyshev_shifts(1.0, 100.0, 4, true), vec![0.0; 4]);
    }

    #[test]
    fn unknown_bounds_give_zero_shifts() {
        assert_eq!(chebyshev_shifts(0.0, 0.0, 3, false), vec![0.0; 3]);
    }

    #[test]
    fn single_shift_is_the_midpoint() {
        let s = chebyshev_shifts(2.0, 10.0, 1, false);
        assert_eq!(s.len(), 1);
        assert!((s[0] - 6.0).abs() < 1e-14);
    }

    #[test]
    fn shifts_lie_inside_the_bounds() {
        let (lo, hi) = (0.5, 9.5);
        for &sigma in &chebyshev_shifts(lo, hi, 6, false) {
            assert!(sigma > lo && sigma < hi);
        }
    }

    #[test]
    fn shifts_are_symmetric_about_the_midpoint() {
        let s = chebyshev_shifts(1.0, 5.0, 4, false);
        let mid = 3.0;
        for i in 0..s.len() {
            let mirror = s[s.len() - 1 - i];
            assert!((s[i] - mid + (mirror - mid)).abs() < 1e-14);
        }
    }
}
