//! Row-at-a-time baseline
//!
//! Materializes the dataset as a vector of rows, works row by row, and
//! rebuilds a columnar table at the end. No kernels, no masks.

use std::sync::Arc;

use hashbrown::HashMap;

use super::{Kernel, OperationKind, OperationParams, OperationSet, MEAN_COLUMN};
use crate::dataset::{schema, Dataset};
use crate::error::{BenchError, Result};
use crate::registry::Method;
use crate::table::{Column, ColumnKind, Table};

#[derive(Clone, Debug)]
enum Value {
    F64(f64),
    I64(i64),
    Sym(Arc<str>),
}

/// Row-major copy of a table
struct Rows {
    names: Vec<String>,
    kinds: Vec<ColumnKind>,
    rows: Vec<Vec<Value>>,
}

impl Rows {
    fn from_table(table: &Table) -> Rows {
        let n = table.row_count();
        let mut rows = Vec::with_capacity(n);
        for i in 0..n {
            let row = table
                .columns
                .iter()
                .map(|col| match col {
                    Column::F64(d) => Value::F64(d[i]),
                    Column::I64(d) => Value::I64(d[i]),
                    Column::Sym(d) => Value::Sym(Arc::clone(&d[i])),
                })
                .collect();
            rows.push(row);
        }
        Rows {
            names: table.names.clone(),
            kinds: table.columns.iter().map(Column::kind).collect(),
            rows,
        }
    }

    fn position(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| BenchError::Input(format!("no column named `{}`", name)))
    }

    fn into_table(self) -> Result<Table> {
        let mut columns: Vec<Column> = self
            .kinds
            .iter()
            .map(|kind| match kind {
                ColumnKind::F64 => Column::F64(Vec::with_capacity(self.rows.len())),
                ColumnKind::I64 => Column::I64(Vec::with_capacity(self.rows.len())),
                ColumnKind::Sym => Column::Sym(Vec::with_capacity(self.rows.len())),
            })
            .collect();
        for row in self.rows {
            for (col, value) in columns.iter_mut().zip(row) {
                match (col, value) {
                    (Column::F64(d), Value::F64(v)) => d.push(v),
                    (Column::I64(d), Value::I64(v)) => d.push(v),
                    (Column::Sym(d), Value::Sym(v)) => d.push(v),
                    _ => return Err(BenchError::Input("row value kind mismatch".into())),
                }
            }
        }
        Table::try_new(self.names, columns)
    }
}

fn numeric(row: &[Value], idx: usize, name: &str) -> Result<f64> {
    match &row[idx] {
        Value::F64(v) => Ok(*v),
        _ => Err(BenchError::Input(format!("column `{}` is not numeric", name))),
    }
}

fn filter_rows(rows: Rows, threshold: f64) -> Result<Rows> {
    let idx = rows.position(schema::MPG)?;
    let mut kept = Vec::new();
    for row in rows.rows {
        if numeric(&row, idx, schema::MPG)? > threshold {
            kept.push(row);
        }
    }
    Ok(Rows { rows: kept, ..rows })
}

fn group_mean_rows(rows: &Rows) -> Result<Table> {
    let key_idx = rows.position(schema::CYL)?;
    let val_idx = rows.position(schema::MPG)?;
    let mut groups: HashMap<i64, (f64, usize)> = HashMap::new();
    for row in &rows.rows {
        let key = match &row[key_idx] {
            Value::I64(k) => *k,
            _ => return Err(BenchError::Input("group key `cyl` is not integral".into())),
        };
        let entry = groups.entry(key).or_insert((0.0, 0));
        entry.0 += numeric(row, val_idx, schema::MPG)?;
        entry.1 += 1;
    }

    let mut out: Vec<(i64, f64)> = groups
        .into_iter()
        .map(|(k, (s, n))| (k, s / n as f64))
        .collect();
    out.sort_unstable_by_key(|&(k, _)| k);

    Ok(Table::new(
        vec![schema::CYL.into(), MEAN_COLUMN.into()],
        vec![
            Column::I64(out.iter().map(|&(k, _)| k).collect()),
            Column::F64(out.iter().map(|&(_, m)| m).collect()),
        ],
    ))
}

pub fn filter(ds: &Dataset, params: &OperationParams) -> Result<Table> {
    filter_rows(Rows::from_table(ds), params.filter_threshold)?.into_table()
}

pub fn select(ds: &Dataset, params: &OperationParams) -> Result<Table> {
    let rows = Rows::from_table(ds);
    let picks = params
        .select_columns
        .iter()
        .map(|name| rows.position(name))
        .collect::<Result<Vec<_>>>()?;
    let projected = rows
        .rows
        .iter()
        .map(|row| picks.iter().map(|&i| row[i].clone()).collect())
        .collect();
    Rows {
        names: params.select_columns.clone(),
        kinds: picks.iter().map(|&i| rows.kinds[i]).collect(),
        rows: projected,
    }
    .into_table()
}

pub fn mutate(ds: &Dataset, params: &OperationParams) -> Result<Table> {
    let mut rows = Rows::from_table(ds);
    if rows.names.contains(&params.mutate_output) {
        return Err(BenchError::Input(format!(
            "column `{}` already exists",
            params.mutate_output
        )));
    }
    let idx = rows.position(schema::MPG)?;
    for row in &mut rows.rows {
        let derived = numeric(row, idx, schema::MPG)? * params.mutate_factor;
        row.push(Value::F64(derived));
    }
    rows.names.push(params.mutate_output.clone());
    rows.kinds.push(ColumnKind::F64);
    rows.into_table()
}

pub fn group_aggregate(ds: &Dataset, _params: &OperationParams) -> Result<Table> {
    group_mean_rows(&Rows::from_table(ds))
}

pub fn chained(ds: &Dataset, params: &OperationParams) -> Result<Table> {
    let filtered = filter_rows(Rows::from_table(ds), params.filter_threshold)?;
    group_mean_rows(&filtered)
}

/// The native dispatch record
pub fn operation_set(params: &OperationParams) -> OperationSet {
    OperationSet::new(Method::Native, |op| {
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
