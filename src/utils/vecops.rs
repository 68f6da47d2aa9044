//! AXPY-style slice primitives used by the recurrence updates.

/// y ← y + alpha · x
///
/// A zero `alpha` leaves `y` untouched even when `x` holds non-finite
/// entries, so a converged-at-start solve cannot poison the iterate.
pub fn axpy(y: &mut [f64], alpha: f64, x: &[f64]) {
    debug_assert_eq!(y.len(), x.len());
    if alpha == 0.0 {
        return;
    }
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += alpha * *xi;
    }
}

/// x ← alpha · x
pub fn scale(x: &mut [f64], alpha: f64) {
    for xi in x.iter_mut() {
        *xi *= alpha;
    }
}
