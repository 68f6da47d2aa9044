//! Banded Gram coefficient matrix.
//!
//! The pipelined recurrence builds, one column per iteration, the triangular
//! matrix G relating the shifted basis to the orthonormalized one (Z = V G).
//! Only entries within a half-bandwidth of `3l` of the diagonal are ever
//! touched; everything else stays zero for the lifetime of the solve. Storage
//! is a dense `(max_it+1)²` column-major allocation; moderate iteration caps
//! keep it cheap.

/// Logically upper-triangular banded matrix with checked accessors.
pub struct GramBand {
    n: usize,
    half_bw: usize,
    data: Vec<f64>,
}

impl GramBand {
    /// `n` rows/columns, entries confined to `|j - i| <= half_bw`.
    pub fn new(n: usize, half_bw: usize) -> Self {
        Self { n, half_bw, data: vec![0.0; n * n] }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn half_bandwidth(&self) -> usize {
        self.half_bw
    }

    fn in_band(&self, i: usize, j: usize) -> bool {
        i < self.n && j < self.n && i.abs_diff(j) <= self.half_bw
    }

    /// Read an in-band entry. Sub-diagonal entries are never written and read
    /// back as the structural zero, which the steady-state recurrence relies
    /// on.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(self.in_band(i, j), "G({i},{j}) outside band (bw = {})", self.half_bw);
        self.data[j * self.n + i]
    }

    /// Write an entry; only the upper-triangular part of the band is
    /// writable.
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        assert!(
            i <= j && self.in_band(i, j),
            "G({i},{j}) not writable (bw = {})",
            self.half_bw
        );
        self.data[j * self.n + i] = value;
    }

    /// Unchecked read of the backing storage, for diagnostics and tests of
    /// the band invariant.
    pub fn raw(&self, i: usize, j: usize) -> f64 {
        self.data[j * self.n + i]
    }

    /// Zero everything, in preparation for a restart.
    pub fn reset(&mut self) {
        self.data.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_roundtrip_in_band() {
        let mut g = GramBand::new(10, 3);
        g.set(2, 4, 1.5);
        g.set(4, 4, 2.0);
        assert_eq!(g.get(2, 4), 1.5);
        assert_eq!(g.get(4, 4), 2.0);
    }

    #[test]
    fn subdiagonal_reads_are_structural_zero() {
        let mut g = GramBand::new(10, 3);
        g.set(3, 5, 7.0);
        assert_eq!(g.get(5, 3), 0.0);
    }

    #[test]
    #[should_panic(expected = "outside band")]
    fn read_outside_band_panics() {
        let g = GramBand::new(10, 3);
        let _ = g.get(0, 4);
    }

    #[test]
    #[should_panic(expected = "not writable")]
    fn write_below_diagonal_panics() {
        let mut g = GramBand::new(10, 3);
        g.set(5, 3, 1.0);
    }

    #[test]
    #[should_panic(expected = "not writable")]
    fn write_outside_band_panics() {
        let mut g = GramBand::new(10, 2);
        g.set(0, 3, 1.0);
    }

    #[test]
    fn off_band_stays_zero_under_banded_writes() {
        let n = 12;
        let bw = 3;
        let mut g = GramBand::new(n, bw);
        for j in 0..n {
            for i in j.saturating_sub(bw)..=j {
                g.set(i, j, 1.0);
            }
        }
        for j in 0..n {
            for i in 0..n {
                if i.abs_diff(j) > bw {
                    assert_eq!(g.raw(i, j), 0.0, "G({i},{j}) escaped the band");
                }
            }
        }
    }

    #[test]
    fn reset_rezeros() {
        let mut g = GramBand::new(6, 2);
        g.set(1, 2, 3.0);
        g.reset();
        assert_eq!(g.get(1, 2), 0.0);
    }
}
