//! Fixed-capacity ring of owned basis vectors.
//!
//! The pipelined recurrence keeps the `l+1` newest shifted basis vectors and
//! the `2l+1` newest unshifted ones. Advancing the basis must not copy vector
//! storage: rotation moves a head index so that the slot holding the oldest
//! vector becomes logical slot 0, ready to be overwritten with the newest.

/// Ring buffer of vectors addressed by logical slot; slot 0 is the newest
/// vector after a rotation, higher slots are progressively older.
pub struct VecRing<V> {
    slots: Vec<V>,
    head: usize,
}

impl<V> VecRing<V> {
    pub fn new(slots: Vec<V>) -> Self {
        assert!(!slots.is_empty());
        Self { slots, head: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn phys(&self, slot: usize) -> usize {
        debug_assert!(slot < self.slots.len());
        (self.head + slot) % self.slots.len()
    }

    pub fn get(&self, slot: usize) -> &V {
        &self.slots[self.phys(slot)]
    }

    pub fn get_mut(&mut self, slot: usize) -> &mut V {
        let p = self.phys(slot);
        &mut self.slots[p]
    }

    /// Rotate the ring: the storage of the oldest slot becomes logical slot 0
    /// (to be overwritten), every other vector ages by one slot. O(1), index
    /// arithmetic only.
    pub fn rotate(&mut self) {
        let cap = self.slots.len();
        self.head = (self.head + cap - 1) % cap;
    }

    /// Disjoint access to one mutable and one shared slot, for the
    /// three-term recurrence updates. Panics if `dst == src`.
    pub fn get_pair_mut(&mut self, dst: usize, src: usize) -> (&mut V, &V) {
        let (pd, ps) = (self.phys(dst), self.phys(src));
        assert_ne!(pd, ps, "ring slots must be distinct");
        if pd < ps {
            let (lo, hi) = self.slots.split_at_mut(ps);
            (&mut lo[pd], &hi[0])
        } else {
            let (lo, hi) = self.slots.split_at_mut(pd);
            (&mut hi[0], &lo[ps])
        }
    }
}

impl<V: AsMut<[f64]>> VecRing<V> {
    /// Zero every slot and reset the rotation, in preparation for a restart.
    pub fn reset(&mut self) {
        self.head = 0;
        for slot in &mut self.slots {
            slot.as_mut().fill(0.0);
        }
    }
}
