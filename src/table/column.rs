//! Typed column storage

use std::fmt;
use std::sync::Arc;

use super::Bitmap;

/// Physical kind of a column
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    F64,
    I64,
    Sym,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::F64 => "f64",
            ColumnKind::I64 => "i64",
            ColumnKind::Sym => "sym",
        };
        f.write_str(name)
    }
}

/// A typed column of data
///
/// Missing numeric values are embedded as `f64::NAN`; integral and symbol
/// columns have no null representation (the benchmark dataset has none).
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    /// Numeric measures
    F64(Vec<f64>),

    /// Integral values, used as categorical group keys
    I64(Vec<i64>),

    /// Interned string identifiers
    ///
    /// Replication and filtering clone the `Arc`, never the string bytes.
    Sym(Vec<Arc<str>>),
}

impl Column {
    pub fn new_f64(data: Vec<f64>) -> Self {
        Column::F64(data)
    }

    pub fn new_i64(data: Vec<i64>) -> Self {
        Column::I64(data)
    }

    /// Create a Sym column from anything string-like
    pub fn new_sym<I, S>(data: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Column::Sym(data.into_iter().map(|s| Arc::from(s.as_ref())).collect())
    }

    pub fn len(&self) -> usize {
        match self {
            Column::F64(data) => data.len(),
            Column::I64(data) => data.len(),
            Column::Sym(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::F64(_) => ColumnKind::F64,
            Column::I64(_) => ColumnKind::I64,
            Column::Sym(_) => ColumnKind::Sym,
        }
    }

    /// Get raw F64 slice for monomorphic kernels
    #[inline(always)]
    pub fn as_f64_slice(&self) -> Result<&[f64], &'static str> {
        match self {
            Column::F64(data) => Ok(data),
            _ => Err("Expected F64 column"),
        }
    }

    /// Get raw I64 slice for monomorphic kernels
    #[inline(always)]
    pub fn as_i64_slice(&self) -> Result<&[i64], &'static str> {
        match self {
            Column::I64(data) => Ok(data),
            _ => Err("Expected I64 column"),
        }
    }

    /// Get raw Sym slice
    #[inline(always)]
    pub fn as_sym_slice(&self) -> Result<&[Arc<str>], &'static str> {
        match self {
            Column::Sym(data) => Ok(data),
            _ => Err("Expected Sym column"),
        }
    }

    /// Keep the rows whose bit is set in `mask`
    pub fn filter(&self, mask: &Bitmap) -> Column {
        debug_assert_eq!(mask.len(), self.len());
        let n = mask.count_ones();
        match self {
            Column::F64(data) => Column::F64(compact(data, mask, n)),
            Column::I64(data) => Column::I64(compact(data, mask, n)),
            Column::Sym(data) => Column::Sym(compact(data, mask, n)),
        }
    }

    /// Concatenate `times` copies of this column
    pub fn repeat(&self, times: usize) -> Column {
        match self {
            Column::F64(data) => Column::F64(data.repeat(times)),
            Column::I64(data) => Column::I64(data.repeat(times)),
            Column::Sym(data) => Column::Sym(
                data.iter()
                    .cycle()
                    .take(data.len() * times)
                    .cloned()
                    .collect(),
            ),
        }
    }
}

/// Copy the selected elements with a word-at-a-time walk over the mask
fn compact<T: Clone>(data: &[T], mask: &Bitmap, n: usize) -> Vec<T> {
    let mut out = Vec::with_capacity(n);
    for w in 0..mask.words_len() {
        let mut word = mask.word(w);
        while word != 0 {
            let bit = word.trailing_zeros() as usize;
            out.push(data[(w << 6) + bit].clone());
            word &= word - 1;
        }
    }
    out
}
