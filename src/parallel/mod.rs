//! Communicator abstraction with asynchronous sum-reductions.
//!
//! The pipelined solver needs exactly one collective primitive: "launch an
//! elementwise global sum now, block on it later". `start_sum` returns a
//! handle immediately; `finish_sum` blocks until the reduced buffer is
//! available. The solver guarantees at most `l + 1` handles are outstanding
//! at any instant and that every handle is finished before it returns.

pub trait Comm {
    /// Token for one in-flight reduction, single-owner from launch to wait.
    type Handle;

    fn rank(&self) -> usize;
    fn size(&self) -> usize;
    fn barrier(&self);

    /// Launch an asynchronous elementwise sum of `local` across all ranks.
    fn start_sum(&self, local: Vec<f64>) -> Self::Handle;

    /// Block until the reduction behind `handle` completes and return the
    /// globally summed buffer.
    fn finish_sum(&self, handle: Self::Handle) -> Vec<f64>;

    /// Blocking scalar all-reduce, for callers that have no work to overlap.
    fn all_reduce(&self, x: f64) -> f64 {
        let reduced = self.finish_sum(self.start_sum(vec![x]));
        reduced[0]
    }
}

/// Single-rank communicator: every reduction is the identity and completes
/// at launch time. `finish_sum` still hands the buffer back only on wait, so
/// the solver's issue/await discipline is exercised unchanged.
pub struct SerialComm;

impl Comm for SerialComm {
    type Handle = Vec<f64>;

    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }
    fn barrier(&self) {}

    fn start_sum(&self, local: Vec<f64>) -> Vec<f64> {
        local
    }

    fn finish_sum(&self, handle: Vec<f64>) -> Vec<f64> {
        handle
    }
}

#[cfg(feature = "mpi")]
pub mod mpi_comm;
#[cfg(feature = "mpi")]
pub use mpi_comm::MpiComm;

#[cfg(feature = "rayon")]
pub mod rayon_comm;
#[cfg(feature = "rayon")]
pub use rayon_comm::RayonComm;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_sum_is_identity() {
        let comm = SerialComm;
        let h = comm.start_sum(vec![1.0, 2.5, -3.0]);
        assert_eq!(comm.finish_sum(h), vec![1.0, 2.5, -3.0]);
    }

    #[test]
    fn serial_all_reduce() {
        let comm = SerialComm;
        assert_eq!(comm.all_reduce(4.25), 4.25);
        assert_eq!(comm.rank(), 0);
        assert_eq!(comm.size(), 1);
    }
}
