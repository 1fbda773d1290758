//! Fused segment kernels
//!
//! Each kernel walks its input once per segment: predicates are evaluated
//! together per row, derived columns are computed only for kept rows, and
//! grouped means accumulate while filtering.

use super::execution_plan::{Predicate, Segment, Source};
use crate::builtins::{scale_column, GroupAccumulator};
use crate::error::{BenchError, Result};
use crate::table::{Bitmap, Column, Table};

/// A numeric source bound to input slices
#[derive(Clone, Copy)]
enum Numeric<'a> {
    F64(&'a [f64]),
    I64(&'a [i64]),
    Scaled(&'a [f64], f64),
}

impl Numeric<'_> {
    #[inline(always)]
    fn get(&self, i: usize) -> f64 {
        match *self {
            Numeric::F64(x) => x[i],
            Numeric::I64(x) => x[i] as f64,
            Numeric::Scaled(x, f) => x[i] * f,
        }
    }
}

fn bind<'a>(table: &'a Table, source: Source) -> Result<Numeric<'a>> {
    let (input, factor) = match source {
        Source::Input(i) => (i, None),
        Source::Scaled { input, factor } => (input, Some(factor)),
    };
    let col = table
        .columns
        .get(input)
        .ok_or_else(|| BenchError::Input(format!("plan references column {}", input)))?;
    match (col, factor) {
        (Column::F64(x), None) => Ok(Numeric::F64(x)),
        (Column::F64(x), Some(f)) => Ok(Numeric::Scaled(x, f)),
        (Column::I64(x), None) => Ok(Numeric::I64(x)),
        _ => Err(BenchError::Input(format!(
            "column `{}` is {}, expected a numeric column",
            table.names[input],
            col.kind()
        ))),
    }
}

fn bind_predicates<'a>(table: &'a Table, preds: &[Predicate]) -> Result<Vec<(Numeric<'a>, f64)>> {
    preds
        .iter()
        .map(|p| Ok((bind(table, p.source)?, p.threshold)))
        .collect()
}

#[inline(always)]
fn keep(preds: &[(Numeric<'_>, f64)], i: usize) -> bool {
    preds.iter().all(|(src, t)| src.get(i) > *t)
}

/// One pass over the rows with every predicate checked per row
fn select_rows(preds: &[(Numeric<'_>, f64)], n: usize) -> Bitmap {
    let mut mask = Bitmap::new_all_null(n);
    for i in (0..n).filter(|&i| keep(preds, i)) {
        mask.set(i, true);
    }
    mask
}

/// Filter + projection + derived columns
pub fn scan(segment: &Segment, table: &Table) -> Result<Table> {
    let preds = bind_predicates(table, &segment.predicates)?;
    let mask = if preds.is_empty() {
        None
    } else {
        Some(select_rows(&preds, table.row_count()))
    };

    let mut names = Vec::with_capacity(segment.outputs.len());
    let mut columns = Vec::with_capacity(segment.outputs.len());
    for (name, source) in &segment.outputs {
        let col = match (*source, &mask) {
            (Source::Input(i), None) => table.columns[i].clone(),
            (Source::Input(i), Some(mask)) => table.columns[i].filter(mask),
            (Source::Scaled { input, factor }, None) => scale_column(&table.columns[input], factor)
                .map_err(|e| BenchError::Input(format!("derive `{}`: {}", name, e)))?,
            (Source::Scaled { input, factor }, Some(mask)) => {
                let x = table.columns[input]
                    .as_f64_slice()
                    .map_err(|e| BenchError::Input(format!("derive `{}`: {}", name, e)))?;
                Column::F64(scale_selected(x, factor, mask))
            }
        };
        names.push(name.clone());
        columns.push(col);
    }
    Table::try_new(names, columns)
}

/// Gather and scale in one step, touching only selected rows
fn scale_selected(x: &[f64], factor: f64, mask: &Bitmap) -> Vec<f64> {
    let mut out = Vec::with_capacity(mask.count_ones());
    for w in 0..mask.words_len() {
        let mut word = mask.word(w);
        while word != 0 {
            let i = (w << 6) + word.trailing_zeros() as usize;
            out.push(x[i] * factor);
            word &= word - 1;
        }
    }
    out
}

/// Filter + grouped mean in a single pass; filtered rows are never stored
pub fn aggregate(segment: &Segment, table: &Table) -> Result<Table> {
    let [(key_name, key_source), (value_name, value_source)] = segment.outputs.as_slice() else {
        return Err(BenchError::Input("aggregate segment needs [key, value] outputs".into()));
    };
    let Source::Input(key_idx) = *key_source else {
        return Err(BenchError::Input(format!("group key `{}` must be stored", key_name)));
    };
    let keys = table.columns[key_idx]
        .as_i64_slice()
        .map_err(|e| BenchError::Input(format!("group key `{}`: {}", key_name, e)))?;
    let values = bind(table, *value_source)?;
    let preds = bind_predicates(table, &segment.predicates)?;

    let mut acc = GroupAccumulator::new();
    for (i, &k) in keys.iter().enumerate() {
        if keep(&preds, i) {
            acc.push(k, values.get(i));
        }
    }
    let (keys, means) = acc.finish();

    Ok(Table::new(
        vec![key_name.clone(), value_name.clone()],
        vec![Column::I64(keys), Column::F64(means)],
    ))
}
