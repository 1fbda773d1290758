//! Column-level kernels (embedded NaN, no bitmaps for nulls)
//!
//! All kernels work directly on data slices.
//! NaN propagation handled by IEEE 754 automatically.

use hashbrown::HashMap;

use crate::table::Column;

/// scale: out[i] = x[i] * factor
#[inline]
pub fn scale_into(out: &mut [f64], x: &[f64], factor: f64) {
    assert_eq!(out.len(), x.len());
    for (o, &v) in out.iter_mut().zip(x) {
        *o = v * factor;
    }
}

/// scale: elementwise multiply into a fresh column
pub fn scale_column(x: &Column, factor: f64) -> Result<Column, &'static str> {
    let data = x.as_f64_slice()?;
    let mut out = vec![0.0; data.len()];
    scale_into(&mut out, data, factor);
    Ok(Column::F64(out))
}

/// sum: propagates NaN
#[inline]
pub fn sum(x: &[f64]) -> f64 {
    let mut result = 0.0;
    for &val in x {
        result += val; // NaN propagates automatically
    }
    result
}

/// mean: propagates NaN, NaN for empty input
#[inline]
pub fn mean(x: &[f64]) -> f64 {
    if x.is_empty() {
        return f64::NAN;
    }
    sum(x) / (x.len() as f64)
}

/// quantile of an ascending slice, linear interpolation between ranks
///
/// `q` is clamped to [0, 1]; NaN for empty input.
pub fn quantile_sorted(x: &[f64], q: f64) -> f64 {
    if x.is_empty() {
        return f64::NAN;
    }
    let h = (x.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    x[lo] + (h - lo as f64) * (x[hi] - x[lo])
}

/// Per-group running sums, keyed by an integral group key
///
/// Slots are handed out in first-seen order; [`GroupAccumulator::finish`]
/// sorts them by key so output order does not depend on input order.
#[derive(Debug, Default)]
pub struct GroupAccumulator {
    slots: HashMap<i64, usize>,
    keys: Vec<i64>,
    sums: Vec<f64>,
    counts: Vec<usize>,
}

impl GroupAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, key: i64, value: f64) {
        let next = self.keys.len();
        let slot = *self.slots.entry(key).or_insert(next);
        if slot == next {
            self.keys.push(key);
            self.sums.push(0.0);
            self.counts.push(0);
        }
        self.sums[slot] += value;
        self.counts[slot] += 1;
    }

    /// Sorted keys and their means
    pub fn finish(self) -> (Vec<i64>, Vec<f64>) {
        let mut order: Vec<usize> = (0..self.keys.len()).collect();
        order.sort_unstable_by_key(|&s| self.keys[s]);
        let keys = order.iter().map(|&s| self.keys[s]).collect();
        let means = order
            .iter()
            .map(|&s| self.sums[s] / self.counts[s] as f64)
            .collect();
        (keys, means)
    }
}

/// group_mean: mean of `values` per distinct key, keys ascending
pub fn group_mean(keys: &[i64], values: &[f64]) -> (Vec<i64>, Vec<f64>) {
    assert_eq!(keys.len(), values.len());
    let mut acc = GroupAccumulator::new();
    for (&k, &v) in keys.iter().zip(values) {
        acc.push(k, v);
    }
    acc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_column() {
        let col = Column::new_f64(vec![20.0, 10.0]);
        let out = scale_column(&col, 0.425).unwrap();
        let data = out.as_f64_slice().unwrap();
        assert!((data[0] - 8.5).abs() < 1e-9);
        assert!((data[1] - 4.25).abs() < 1e-9);
    }

    #[test]
    fn test_scale_rejects_non_numeric() {
        assert!(scale_column(&Column::new_i64(vec![1]), 2.0).is_err());
    }

    #[test]
    fn test_sum_with_nan() {
        assert_eq!(sum(&[1.0, 2.0, 3.0, 4.0]), 10.0);
        assert!(sum(&[1.0, f64::NAN, 3.0]).is_nan());
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_quantile_interpolates() {
        let x = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile_sorted(&x, 0.0), 1.0);
        assert_eq!(quantile_sorted(&x, 0.5), 2.5);
        assert_eq!(quantile_sorted(&x, 0.25), 1.75);
        assert_eq!(quantile_sorted(&x, 1.0), 4.0);
        assert_eq!(quantile_sorted(&[7.0], 0.9), 7.0);
        assert!(quantile_sorted(&[], 0.5).is_nan());
    }

    #[test]
    fn test_group_mean_sorted_keys() {
        let keys = [8, 4, 8, 6, 4];
        let vals = [10.0, 30.0, 20.0, 21.0, 20.0];
        let (k, m) = group_mean(&keys, &vals);
        assert_eq!(k, vec![4, 6, 8]);
        assert_eq!(m, vec![25.0, 21.0, 15.0]);
    }

    #[test]
    fn test_group_mean_empty() {
        let (k, m) = group_mean(&[], &[]);
        assert!(k.is_empty());
        assert!(m.is_empty());
    }
}
