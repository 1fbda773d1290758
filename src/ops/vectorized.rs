//! Columnar kernels over typed slices
//!
//! Predicates write a selection bitmap, arithmetic runs as a tight loop
//! over one column, grouping hashes integral keys. Each step materializes
//! its result table before the next one starts.

use std::sync::Arc;

use super::{Kernel, OperationKind, OperationParams, OperationSet, MEAN_COLUMN};
use crate::builtins::{group_mean, scale_column};
use crate::dataset::{schema, Dataset};
use crate::error::{BenchError, Result};
use crate::registry::Method;
use crate::table::{Bitmap, Column, Table};

fn filter_table(table: &Table, threshold: f64) -> Result<Table> {
    let mask = Bitmap::from_predicate(table.f64(schema::MPG)?, |v| v > threshold);
    Ok(table.filter(&mask))
}

fn group_mean_table(table: &Table) -> Result<Table> {
    let (keys, means) = group_mean(table.i64(schema::CYL)?, table.f64(schema::MPG)?);
    Ok(Table::new(
        vec![schema::CYL.into(), MEAN_COLUMN.into()],
        vec![Column::I64(keys), Column::F64(means)],
    ))
}

pub fn filter(ds: &Dataset, params: &OperationParams) -> Result<Table> {
    filter_table(ds, params.filter_threshold)
}

pub fn select(ds: &Dataset, params: &OperationParams) -> Result<Table> {
    ds.select(&params.select_names())
}

pub fn mutate(ds: &Dataset, params: &OperationParams) -> Result<Table> {
    let derived = scale_column(ds.column(schema::MPG)?, params.mutate_factor)
        .map_err(|e| BenchError::Input(format!("mutate source `mpg`: {}", e)))?;
    ds.with_column(&params.mutate_output, derived)
}

pub fn group_aggregate(ds: &Dataset, _params: &OperationParams) -> Result<Table> {
    group_mean_table(ds)
}

pub fn chained(ds: &Dataset, params: &OperationParams) -> Result<Table> {
    let filtered = filter_table(ds, params.filter_threshold)?;
    group_mean_table(&filtered)
}

/// The vectorized dispatch record
pub fn operation_set(params: &OperationParams) -> OperationSet {
    OperationSet::new(Method::Vectorized, |op| {
        let params = params.clone();
        let f: fn(&Dataset, &OperationParams) -> Result<Table> = match op {
            OperationKind::Filter => filter,
            OperationKind::Select => select,
            OperationKind::Mutate => mutate,
            OperationKind::GroupAggregate => group_aggregate,
            OperationKind::Chained => chained,
        };
        let kernel: Kernel = Arc::new(move |ds: &Dataset| f(ds, &params));
        kernel
    })
}
