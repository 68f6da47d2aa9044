//! Core linear-algebra traits for pipelcg.
//!
//! The solver consumes the operator, the preconditioner and the vector
//! primitives through these seams only; it never looks inside a matrix.

/// Matrix–vector product: y ← A x.
pub trait MatVec<V> {
    /// Compute y = A · x.
    fn matvec(&self, x: &V, y: &mut V);
}

/// Inner products & norms over the rank-local part of a vector.
///
/// `dot` is unreduced: on a distributed rank it returns the local partial
/// inner product, and the communicator is responsible for the global sum.
pub trait InnerProduct<V> {
    /// Associated scalar type.
    type Scalar: Copy + PartialOrd + From<f64>;
    /// Compute dot(x, y) over the local entries.
    fn dot(&self, x: &V, y: &V) -> Self::Scalar;
    /// Compute ‖x‖₂ over the local entries.
    fn norm(&self, x: &V) -> Self::Scalar;
}
