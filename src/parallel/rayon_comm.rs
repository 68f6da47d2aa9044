// rayon-based shared-memory communicator

use super::Comm;

/// Shared-memory communicator: one logical rank whose local vector operations
/// parallelize over the global rayon pool. Reductions are therefore the
/// identity, as in the serial case.
pub struct RayonComm;

impl RayonComm {
    pub fn new() -> Self {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_cpus::get())
            .build_global()
            .ok();
        RayonComm
    }
}

impl Default for RayonComm {
    fn default() -> Self {
        Self::new()
    }
}

impl Comm for RayonComm {
    type Handle = Vec<f64>;

    fn rank(&self) -> usize {
        0
    }
    fn size(&self) -> usize {
        1
    }
    fn barrier(&self) {
        rayon::scope(|_| {});
    }

    fn start_sum(&self, local: Vec<f64>) -> Vec<f64> {
        local
    }

    fn finish_sum(&self, handle: Vec<f64>) -> Vec<f64> {
        handle
    }
}
