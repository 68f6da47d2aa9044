//! Pipeline state owned by the recurrence engine.
//!
//! Everything here is allocated once per solve and reset (not reallocated) on
//! every restart: the two basis rings, the work vectors, the banded Gram
//! matrix, the recurrence coefficient arrays and the table of in-flight
//! reduction handles.

pub mod gram;
pub mod reductions;
pub mod ring;
pub mod shifts;

pub use gram::GramBand;
pub use reductions::PendingReductions;
pub use ring::VecRing;
pub use shifts::chebyshev_shifts;

use crate::error::KError;

/// Per-solve workspace of the pipelined CG engine.
///
/// `V` is the vector capability, `H` the communicator's reduction handle.
pub struct Workspace<V, H> {
    pub l: usize,
    pub max_it: usize,
    /// Shifted Krylov basis, `l + 1` slots, newest at logical 0.
    pub z: VecRing<V>,
    /// Unshifted basis used to rebuild the direction vector, `2l + 1` slots.
    pub v: VecRing<V>,
    /// Stand-in for ring slot Z[2] when `l == 1`: a two-slot ring cannot
    /// retain the vector from two rotations ago.
    pub z_extra: Option<V>,
    /// Direction vector.
    pub p: V,
    /// Working image (preconditioned operator applications land here).
    pub u: V,
    /// Previous working image.
    pub up: V,
    /// Working image from two steps back.
    pub upp: V,
    /// Banded coefficient matrix, one new column per iteration.
    pub g: GramBand,
    /// Tridiagonal recurrence coefficients.
    pub gamma: Vec<f64>,
    pub delta: Vec<f64>,
    /// Base shifts, recomputed once per solve.
    pub sigma: Vec<f64>,
    /// Outstanding reduction handles, at most `l + 1` in flight.
    pub reqs: PendingReductions<H>,
}

impl<V, H> Workspace<V, H>
where
    V: From<Vec<f64>> + AsRef<[f64]> + AsMut<[f64]>,
{
    /// Allocate all solver state for a system of local dimension `n`.
    /// Fails on an invalid `l`/`max_it` combination.
    pub fn new(n: usize, l: usize, max_it: usize) -> Result<Self, KError> {
        if max_it < 1 {
            return Err(KError::InvalidConfig("max_iters argument must be positive".into()));
        }
        if l < 1 {
            return Err(KError::InvalidConfig("pipeline_depth argument must be positive".into()));
        }
        if l > max_it {
            return Err(KError::InvalidConfig(
                "pipeline_depth argument must not exceed max_iters".into(),
            ));
        }

        let zero = || V::from(vec![0.0; n]);
        Ok(Self {
            l,
            max_it,
            z: VecRing::new((0..l + 1).map(|_| zero()).collect()),
            v: VecRing::new((0..2 * l + 1).map(|_| zero()).collect()),
            z_extra: (l == 1).then(zero),
            p: zero(),
            u: zero(),
            up: zero(),
            upp: zero(),
            g: GramBand::new(max_it + 1, 3 * l),
            gamma: vec![0.0; max_it + 1],
            delta: vec![0.0; max_it + 1],
            sigma: vec![0.0; l],
            reqs: PendingReductions::new(max_it + 1, l + 1),
        })
    }

    /// Re-initialize for a restart: zero both basis rings, the image history
    /// and the whole coefficient state. `u` and `p` are not touched; the
    /// restart controller recomputes them from the current iterate. Every
    /// pending reduction must already be drained.
    pub fn reinit(&mut self) {
        self.z.reset();
        self.v.reset();
        if let Some(ze) = &mut self.z_extra {
            ze.as_mut().fill(0.0);
        }
        self.up.as_mut().fill(0.0);
        self.upp.as_mut().fill(0.0);
        self.gamma.fill(0.0);
        self.delta.fill(0.0);
        self.g.reset();
        self.reqs.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Ws = Workspace<Vec<f64>, Vec<f64>>;

    #[test]
    fn allocation_sizes_follow_depth() {
        let ws = Ws::new(5, 3, 20).unwrap();
        assert_eq!(ws.z.capacity(), 4);
        assert_eq!(ws.v.capacity(), 7);
        assert!(ws.z_extra.is_none());
        assert_eq!(ws.g.n(), 21);
        assert_eq!(ws.g.half_bandwidth(), 9);
        assert_eq!(ws.sigma.len(), 3);
    }

    #[test]
    fn depth_one_gets_the_extra_vector() {
        let ws = Ws::new(5, 1, 10).unwrap();
        assert!(ws.z_extra.is_some());
    }

    #[test]
    fn invalid_configurations_are_rejected() {
        assert!(Ws::new(5, 0, 10).is_err());
        assert!(Ws::new(5, 1, 0).is_err());
        assert!(Ws::new(5, 11, 10).is_err());
    }

    #[test]
    fn reinit_zeroes_everything_it_owns() {
        let mut ws = Ws::new(3, 2, 8).unwrap();
        ws.z.get_mut(0).fill(1.0);
        ws.v.get_mut(4).fill(2.0);
        ws.up.fill(3.0);
        ws.upp.fill(4.0);
        ws.gamma[2] = 5.0;
        ws.delta[3] = 6.0;
        ws.g.set(1, 2, 7.0);

        ws.reinit();

        for i in 0..ws.z.capacity() {
            assert!(ws.z.get(i).iter().all(|&x| x == 0.0));
        }
        for i in 0..ws.v.capacity() {
            assert!(ws.v.get(i).iter().all(|&x| x == 0.0));
        }
        assert!(ws.up.iter().all(|&x| x == 0.0));
        assert!(ws.upp.iter().all(|&x| x == 0.0));
        assert!(ws.gamma.iter().all(|&x| x == 0.0));
        assert!(ws.delta.iter().all(|&x| x == 0.0));
        for i in 0..ws.g.n() {
            for j in 0..ws.g.n() {
                assert_eq!(ws.g.raw(i, j), 0.0);
            }
        }
    }
}
