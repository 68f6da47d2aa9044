//! Table of in-flight asynchronous reductions.
//!
//! Each Gram column gets exactly one global sum-reduction, launched the
//! moment its local partial dot products are available and awaited `l`
//! iterations later. This table owns the handles in between, remembers which
//! rows of which column each one carries, and writes the reduced values into
//! the Gram matrix on completion. At most `l + 1` reductions are in flight at
//! any instant.

use std::ops::Range;

use crate::parallel::Comm;
use crate::pipeline::gram::GramBand;

enum Slot<H> {
    Idle,
    InFlight { handle: H, row_start: usize },
    Done,
}

pub struct PendingReductions<H> {
    slots: Vec<Slot<H>>,
    in_flight: usize,
    limit: usize,
    launched: usize,
}

impl<H> PendingReductions<H> {
    /// One slot per Gram column (`max_it + 1` of them); `limit` is the
    /// in-flight bound `l + 1`.
    pub fn new(columns: usize, limit: usize) -> Self {
        Self {
            slots: (0..columns).map(|_| Slot::Idle).collect(),
            in_flight: 0,
            limit,
            launched: 0,
        }
    }

    /// Record the reduction for `col`, carrying rows `row_start..` of that
    /// column.
    pub fn launch(&mut self, col: usize, row_start: usize, handle: H) {
        assert!(
            matches!(self.slots[col], Slot::Idle),
            "reduction for column {col} already launched"
        );
        self.slots[col] = Slot::InFlight { handle, row_start };
        self.in_flight += 1;
        self.launched += 1;
        debug_assert!(self.in_flight <= self.limit, "more than {} reductions in flight", self.limit);
    }

    /// Block until the reduction for `col` completes and scatter the reduced
    /// values into `g`. No-op if the column has no reduction in flight.
    pub fn complete<C>(&mut self, col: usize, comm: &C, g: &mut GramBand)
    where
        C: Comm<Handle = H>,
    {
        if let Slot::InFlight { handle, row_start } =
            std::mem::replace(&mut self.slots[col], Slot::Done)
        {
            let reduced = comm.finish_sum(handle);
            for (k, value) in reduced.into_iter().enumerate() {
                g.set(row_start + k, col, value);
            }
            self.in_flight -= 1;
        }
    }

    /// Wait on every in-flight reduction whose column lies in `cols`. Early
    /// exits go through here so the messaging layer is never left with
    /// unmatched collectives.
    pub fn drain<C>(&mut self, cols: Range<usize>, comm: &C, g: &mut GramBand)
    where
        C: Comm<Handle = H>,
    {
        for col in cols {
            self.complete(col, comm, g);
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn launched(&self) -> usize {
        self.launched
    }

    /// Return every slot to idle for a restart. All handles must have been
    /// waited on first.
    pub fn reset(&mut self) {
        assert_eq!(self.in_flight, 0, "reset with reductions still in flight");
        for slot in &mut self.slots {
            *slot = Slot::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::SerialComm;

    fn table(cols: usize, limit: usize) -> PendingReductions<Vec<f64>> {
        PendingReductions::new(cols, limit)
    }

    #[test]
    fn complete_scatters_into_gram_column() {
        let comm = SerialComm;
        let mut g = GramBand::new(8, 3);
        let mut reqs = table(8, 2);
        reqs.launch(3, 1, comm.start_sum(vec![0.5, 1.5, 2.5]));
        assert_eq!(reqs.in_flight(), 1);
        reqs.complete(3, &comm, &mut g);
        assert_eq!(reqs.in_flight(), 0);
        assert_eq!(g.get(1, 3), 0.5);
        assert_eq!(g.get(2, 3), 1.5);
        assert_eq!(g.get(3, 3), 2.5);
    }

    #[test]
    fn complete_is_idempotent_per_column() {
        let comm = SerialComm;
        let mut g = GramBand::new(4, 2);
        let mut reqs = table(4, 2);
        reqs.launch(1, 0, comm.start_sum(vec![4.0]));
        reqs.complete(1, &comm, &mut g);
        reqs.complete(1, &comm, &mut g); // already done, no effect
        assert_eq!(g.get(0, 1), 4.0);
    }

    #[test]
    fn drain_covers_exactly_the_requested_range() {
        let comm = SerialComm;
        let mut g = GramBand::new(10, 9);
        let mut reqs = table(10, 4);
        for col in 2..6 {
            reqs.launch(col, col, comm.start_sum(vec![col as f64]));
        }
        reqs.drain(2..5, &comm, &mut g);
        assert_eq!(reqs.in_flight(), 1); // column 5 untouched
        assert_eq!(g.get(3, 3), 3.0);
        reqs.complete(5, &comm, &mut g);
        assert_eq!(reqs.in_flight(), 0);
    }

    #[test]
    #[should_panic(expected = "already launched")]
    fn double_launch_panics() {
        let comm = SerialComm;
        let mut reqs = table(4, 2);
        reqs.launch(0, 0, comm.start_sum(vec![1.0]));
        reqs.launch(0, 0, comm.start_sum(vec![2.0]));
    }

    #[test]
    #[should_panic(expected = "still in flight")]
    fn reset_requires_empty_pipeline() {
        let comm = SerialComm;
        let mut reqs = table(4, 2);
        reqs.launch(0, 0, comm.start_sum(vec![1.0]));
        reqs.reset();
    }

    #[test]
    fn reset_reopens_slots() {
        let comm = SerialComm;
        let mut g = GramBand::new(4, 3);
        let mut reqs = table(4, 2);
        reqs.launch(0, 0, comm.start_sum(vec![1.0]));
        reqs.complete(0, &comm, &mut g);
        reqs.reset();
        reqs.launch(0, 0, comm.start_sum(vec![2.0]));
        reqs.complete(0, &comm, &mut g);
        assert_eq!(g.get(0, 0), 2.0);
        assert_eq!(reqs.launched(), 2);
    }
}
