//! Preconditioner interface.
//!
//! The solver consumes a preconditioner as an opaque operator; no concrete
//! preconditioners are shipped here. When a non-identity preconditioner is
//! supplied, the shift selector disables the Chebyshev stabilizing shifts.

use crate::error::KError;

/// A preconditioner M ≈ A⁻¹.
pub trait Preconditioner<M, V> {
    /// Apply M⁻¹ to r, writing z = M⁻¹ r
    fn apply(&self, r: &V, z: &mut V) -> Result<(), KError>;
    /// Optionally: setup/factorize from A
    fn setup(&mut self, _a: &M) -> Result<(), KError> {
        Ok(())
    }
}
