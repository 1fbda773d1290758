//! Core table and column types

pub mod bitmap;
pub mod column;

pub use bitmap::Bitmap;
pub use column::{Column, ColumnKind};

use std::sync::Arc;

use crate::error::{BenchError, Result};

/// A table is a collection of named, typed columns of equal length
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub names: Vec<String>,
    pub columns: Vec<Column>,
}

impl Table {
    /// Build a table from trusted parts
    ///
    /// Panics if names and columns disagree; use [`Table::try_new`] for
    /// anything read from outside the crate.
    pub fn new(names: Vec<String>, columns: Vec<Column>) -> Self {
        assert_eq!(names.len(), columns.len());
        Self { names, columns }
    }

    /// Build a table, checking name count and column lengths
    pub fn try_new(names: Vec<String>, columns: Vec<Column>) -> Result<Self> {
        if names.len() != columns.len() {
            return Err(BenchError::Input(format!(
                "{} column names for {} columns",
                names.len(),
                columns.len()
            )));
        }
        if let Some(first) = columns.first() {
            let n = first.len();
            for (name, col) in names.iter().zip(&columns) {
                if col.len() != n {
                    return Err(BenchError::Input(format!(
                        "column `{}` has {} rows, expected {}",
                        name,
                        col.len(),
                        n
                    )));
                }
            }
        }
        Ok(Self { names, columns })
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn col_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.column_index(name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| BenchError::Input(format!("no column named `{}`", name)))
    }

    pub fn f64(&self, name: &str) -> Result<&[f64]> {
        let col = self.column(name)?;
        col.as_f64_slice().map_err(|e| typed_access(name, col, e))
    }

    pub fn i64(&self, name: &str) -> Result<&[i64]> {
        let col = self.column(name)?;
        col.as_i64_slice().map_err(|e| typed_access(name, col, e))
    }

    pub fn sym(&self, name: &str) -> Result<&[Arc<str>]> {
        let col = self.column(name)?;
        col.as_sym_slice().map_err(|e| typed_access(name, col, e))
    }

    /// Project the named columns, in the order given
    pub fn select(&self, names: &[&str]) -> Result<Table> {
        let mut out_names = Vec::with_capacity(names.len());
        let mut out_cols = Vec::with_capacity(names.len());
        for &name in names {
            out_cols.push(self.column(name)?.clone());
            out_names.push(name.to_string());
        }
        Ok(Table::new(out_names, out_cols))
    }

    /// Keep rows whose bit is set, across every column
    pub fn filter(&self, mask: &Bitmap) -> Table {
        Table::new(
            self.names.clone(),
            self.columns.iter().map(|c| c.filter(mask)).collect(),
        )
    }

    /// Return a copy of this table with one extra column appended
    pub fn with_column(&self, name: &str, col: Column) -> Result<Table> {
        if self.column_index(name).is_some() {
            return Err(BenchError::Input(format!("column `{}` already exists", name)));
        }
        let mut names = self.names.clone();
        let mut columns = self.columns.clone();
        names.push(name.to_string());
        columns.push(col);
        Table::try_new(names, columns)
    }

    /// Concatenate `times` copies of the whole table
    pub fn repeat(&self, times: usize) -> Table {
        Table::new(
            self.names.clone(),
            self.columns.iter().map(|c| c.repeat(times)).collect(),
        )
    }
}

fn typed_access(name: &str, col: &Column, reason: &str) -> BenchError {
    BenchError::Input(format!("column `{}` is {}: {}", name, col.kind(), reason))
}
