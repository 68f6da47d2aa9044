//! MPI-based distributed communicator.
//!
//! Implements the `Comm` trait over an MPI world communicator, mapping
//! `start_sum`/`finish_sum` onto `MPI_Iallreduce`/`MPI_Wait`. This is the
//! backend that actually buys latency hiding: the solver issues a reduction,
//! keeps applying the operator locally for `l` more steps, and only then
//! waits on the request.
//!
//! Buffer ownership: rsmpi ties a nonblocking request to the lifetime of its
//! buffers, so both buffers are moved to the heap and leaked for the duration
//! of the request (`StaticScope`), then reclaimed in `finish_sum` once the
//! wait has completed. No handle outlives the solve; the solver drains every
//! pending reduction on all exit paths.

use mpi::collective::SystemOperation;
use mpi::request::{Request, StaticScope};
use mpi::topology::SimpleCommunicator;
use mpi::traits::*;

use super::Comm;

/// MPI communicator wrapper for distributed ranks.
pub struct MpiComm {
    /// The MPI world communicator (all processes in the job).
    pub world: SimpleCommunicator,
    /// The rank (ID) of this process within the communicator.
    pub rank: usize,
    /// The total number of processes in the communicator.
    pub size: usize,
}

impl MpiComm {
    /// Initializes MPI and constructs a new `MpiComm` instance.
    ///
    /// # Panics
    /// Panics if MPI initialization fails.
    pub fn new() -> Self {
        let universe = mpi::initialize().unwrap();
        let world = universe.world();
        let rank = world.rank() as usize;
        let size = world.size() as usize;
        MpiComm { world, rank, size }
    }
}

/// One in-flight `MPI_Iallreduce`. Owns its send and receive buffers as raw
/// boxes until the wait completes.
pub struct MpiReduction {
    req: Request<'static, [f64], StaticScope>,
    send: *mut [f64],
    recv: *mut [f64],
}

impl Comm for MpiComm {
    type Handle = MpiReduction;

    fn rank(&self) -> usize {
        self.rank
    }
    fn size(&self) -> usize {
        self.size
    }
    fn barrier(&self) {
        self.world.barrier();
    }

    fn start_sum(&self, local: Vec<f64>) -> MpiReduction {
        let send = Box::into_raw(local.into_boxed_slice());
        // Safety: `send` stays valid and unaliased until finish_sum reclaims
        // it after the wait.
        let send_ref: &'static [f64] = unsafe { &*send };
        let recv = Box::into_raw(vec![0.0; send_ref.len()].into_boxed_slice());
        let recv_ref: &'static mut [f64] = unsafe { &mut *recv };
        let req = self.world.immediate_all_reduce_into(
            StaticScope,
            send_ref,
            recv_ref,
            SystemOperation::sum(),
        );
        MpiReduction { req, send, recv }
    }

    fn finish_sum(&self, handle: MpiReduction) -> Vec<f64> {
        let MpiReduction { req, send, recv } = handle;
        req.wait_without_status();
        // Safety: the request has completed, so MPI no longer touches either
        // buffer and the raw boxes can be reclaimed.
        unsafe {
            drop(Box::from_raw(send));
            Box::from_raw(recv).into_vec()
        }
    }

    fn all_reduce(&self, x: f64) -> f64 {
        let mut y = x;
        self.world.all_reduce_into(&x, &mut y, &SystemOperation::sum());
        y
    }
}
