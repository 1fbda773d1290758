//! Bit-packed selection mask (1 bit per row)
//!
//! Filter kernels write one bit per row (1 = keep, 0 = drop) and the
//! compaction step walks the mask a word at a time.

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    /// Each u64 holds 64 selection bits (LSB = bit 0)
    bits: Vec<u64>,
    /// Total number of rows (not bits)
    len: usize,
}

impl Bitmap {
    /// Create bitmap with every row selected
    pub fn new_all_valid(len: usize) -> Self {
        let words = len.div_ceil(64);
        let mut bits = vec![!0u64; words];

        // Mask off unused bits in last word
        let rem = len % 64;
        if rem != 0 {
            bits[words - 1] = (1u64 << rem) - 1;
        }

        Self { bits, len }
    }

    /// Create bitmap with no row selected
    pub fn new_all_null(len: usize) -> Self {
        let words = len.div_ceil(64);
        Self {
            bits: vec![0u64; words],
            len,
        }
    }

    /// Build a mask from a predicate over a numeric slice
    ///
    /// Packs 64 comparisons into one word before storing it.
    pub fn from_predicate(x: &[f64], pred: impl Fn(f64) -> bool) -> Self {
        let len = x.len();
        let mut bits = Vec::with_capacity(len.div_ceil(64));
        for chunk in x.chunks(64) {
            let mut word = 0u64;
            for (b, &v) in chunk.iter().enumerate() {
                word |= (pred(v) as u64) << b;
            }
            bits.push(word);
        }
        Self { bits, len }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get selection bit at index i
    #[inline]
    pub fn get(&self, i: usize) -> bool {
        debug_assert!(i < self.len);
        let w = i >> 6; // word index (i / 64)
        let b = i & 63; // bit index (i % 64)
        (self.bits[w] >> b) & 1 == 1
    }

    /// Set selection bit at index i
    #[inline]
    pub fn set(&mut self, i: usize, v: bool) {
        debug_assert!(i < self.len);
        let w = i >> 6;
        let b = i & 63;
        let mask = 1u64 << b;
        if v {
            self.bits[w] |= mask;
        } else {
            self.bits[w] &= !mask;
        }
    }

    /// Get raw word at word index (for fast iteration)
    #[inline]
    pub fn word(&self, w: usize) -> u64 {
        self.bits[w]
    }

    /// Number of u64 words
    #[inline]
    pub fn words_len(&self) -> usize {
        self.bits.len()
    }

    /// Number of selected rows
    pub fn count_ones(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_valid() {
        let bm = Bitmap::new_all_valid(100);
        assert_eq!(bm.len(), 100);
        assert_eq!(bm.count_ones(), 100);
        for i in 0..100 {
            assert!(bm.get(i), "bit {} should be set", i);
        }
    }

    #[test]
    fn test_all_null() {
        let bm = Bitmap::new_all_null(100);
        assert_eq!(bm.count_ones(), 0);
        for i in 0..100 {
            assert!(!bm.get(i), "bit {} should be clear", i);
        }
    }

    #[test]
    fn test_set_get() {
        let mut bm = Bitmap::new_all_valid(100);
        bm.set(50, false);
        assert!(!bm.get(50));
        assert!(bm.get(49));
        assert!(bm.get(51));
    }

    #[test]
    fn test_from_predicate() {
        let x: Vec<f64> = (0..70).map(|i| i as f64).collect();
        let bm = Bitmap::from_predicate(&x, |v| v > 60.0);
        assert_eq!(bm.len(), 70);
        assert_eq!(bm.count_ones(), 9);
        assert!(!bm.get(60));
        assert!(bm.get(61));
        assert!(bm.get(69));
    }

    #[test]
    fn test_predicate_drops_nan() {
        let bm = Bitmap::from_predicate(&[f64::NAN, 25.0], |v| v > 20.0);
        assert!(!bm.get(0));
        assert!(bm.get(1));
    }
}
