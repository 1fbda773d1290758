//! Benchmark dataset: seed table and whole-table replication
//!
//! The working dataset is the seed table repeated end to end until it holds
//! at least the requested number of rows. Row counts are always a whole
//! multiple of the seed length: a target that does not divide evenly is
//! rounded *up* to the next multiple.

mod seed;

pub use seed::{load_seed_csv, mtcars};

use std::ops::Deref;
use std::sync::Arc;

use tracing::debug;

use crate::error::{BenchError, Result};
use crate::table::{ColumnKind, Table};

/// Column names of the benchmark schema
pub mod schema {
    /// Row identifier (car model)
    pub const MODEL: &str = "model";
    /// Fuel efficiency, miles per gallon
    pub const MPG: &str = "mpg";
    /// Cylinder count, the categorical group key
    pub const CYL: &str = "cyl";
    /// Gross horsepower
    pub const HP: &str = "hp";
}

const SCHEMA: [(&str, ColumnKind); 4] = [
    (schema::MODEL, ColumnKind::Sym),
    (schema::MPG, ColumnKind::F64),
    (schema::CYL, ColumnKind::I64),
    (schema::HP, ColumnKind::F64),
];

/// Immutable, shared benchmark input
///
/// Every operation receives `&Dataset` and returns a fresh table, so no
/// repetition can observe another's output.
#[derive(Clone, Debug)]
pub struct Dataset {
    table: Arc<Table>,
    replicas: usize,
}

impl Dataset {
    /// Wrap a table as one replica, projected to the schema column order
    ///
    /// Extra columns are dropped, so every method sees the same layout.
    pub fn from_table(table: Table) -> Result<Self> {
        check_schema(&table)?;
        Ok(Self {
            table: Arc::new(project(&table)?),
            replicas: 1,
        })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// How many copies of the seed table this dataset holds
    pub fn replicas(&self) -> usize {
        self.replicas
    }
}

impl Deref for Dataset {
    type Target = Table;

    fn deref(&self) -> &Table {
        &self.table
    }
}

/// Expand `seed` to at least `target_rows` rows by whole-table replication
///
/// The seed is repeated `ceil(target_rows / seed_len)` times. Output is
/// deterministic: identical inputs give identical row order.
pub fn build(seed: &Table, target_rows: usize) -> Result<Dataset> {
    if target_rows < 1 {
        return Err(BenchError::Input("target row count must be at least 1".into()));
    }
    let seed_len = seed.row_count();
    if seed.col_count() == 0 || seed_len == 0 {
        return Err(BenchError::Input("seed table is empty".into()));
    }
    check_schema(seed)?;

    let replicas = target_rows.div_ceil(seed_len);
    let table = project(seed)?.repeat(replicas);
    debug!(
        seed_rows = seed_len,
        target_rows,
        replicas,
        rows = table.row_count(),
        "dataset built"
    );

    Ok(Dataset {
        table: Arc::new(table),
        replicas,
    })
}

fn project(table: &Table) -> Result<Table> {
    table.select(&SCHEMA.map(|(name, _)| name))
}

/// Column names of a built dataset, in storage order
pub fn schema_names() -> Vec<String> {
    SCHEMA.iter().map(|(name, _)| name.to_string()).collect()
}

/// Verify the table carries every schema column with the right kind
pub fn check_schema(table: &Table) -> Result<()> {
    for (name, kind) in SCHEMA {
        let col = table.column(name)?;
        if col.kind() != kind {
            return Err(BenchError::Input(format!(
                "column `{}` must be {}, found {}",
                name,
                kind,
                col.kind()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    #[test]
    fn test_build_rounds_up_to_whole_replicas() {
        let seed = mtcars();
        let ds = build(&seed, 3000).unwrap();
        assert_eq!(ds.replicas(), 94);
        assert_eq!(ds.row_count(), 94 * 32);
        assert!(ds.row_count() >= 3000);
    }

    #[test]
    fn test_build_exact_multiple() {
        let ds = build(&mtcars(), 64).unwrap();
        assert_eq!(ds.row_count(), 64);
    }

    #[test]
    fn test_build_small_target_keeps_whole_seed() {
        let ds = build(&mtcars(), 1).unwrap();
        assert_eq!(ds.row_count(), 32);
    }

    #[test]
    fn test_build_preserves_row_order() {
        let seed = mtcars();
        let ds = build(&seed, 96).unwrap();
        let models = ds.sym(schema::MODEL).unwrap();
        let seed_models = seed.sym(schema::MODEL).unwrap();
        assert_eq!(&models[32..64], seed_models);
        assert_eq!(&models[64..96], seed_models);
    }

    #[test]
    fn test_build_rejects_zero_target() {
        assert!(matches!(build(&mtcars(), 0), Err(BenchError::Input(_))));
    }

    #[test]
    fn test_build_rejects_empty_seed() {
        let empty = Table::new(
            vec!["model".into(), "mpg".into(), "cyl".into(), "hp".into()],
            vec![
                Column::new_sym(Vec::<&str>::new()),
                Column::new_f64(vec![]),
                Column::new_i64(vec![]),
                Column::new_f64(vec![]),
            ],
        );
        assert!(matches!(build(&empty, 10), Err(BenchError::Input(_))));
        assert!(matches!(
            build(&Table::new(vec![], vec![]), 10),
            Err(BenchError::Input(_))
        ));
    }

    #[test]
    fn test_build_rejects_wrong_column_kind() {
        let bad = Table::new(
            vec!["model".into(), "mpg".into(), "cyl".into(), "hp".into()],
            vec![
                Column::new_sym(["a"]),
                Column::new_f64(vec![20.0]),
                Column::new_f64(vec![4.0]),
                Column::new_f64(vec![100.0]),
            ],
        );
        assert!(matches!(build(&bad, 10), Err(BenchError::Input(_))));
    }

    #[test]
    fn test_from_table_normalizes_layout() {
        let shuffled = mtcars()
            .select(&["hp", "mpg", "model", "cyl"])
            .unwrap()
            .with_column("wt", Column::new_f64(vec![3.0; 32]))
            .unwrap();
        let ds = Dataset::from_table(shuffled).unwrap();
        assert_eq!(ds.names, schema_names());
        assert_eq!(ds.f64(schema::MPG).unwrap(), mtcars().f64(schema::MPG).unwrap());
    }

    #[test]
    fn test_build_drops_extra_columns() {
        let seed = mtcars()
            .with_column("wt", Column::new_f64(vec![1.0; 32]))
            .unwrap();
        let ds = build(&seed, 32).unwrap();
        assert_eq!(ds.names, vec!["model", "mpg", "cyl", "hp"]);
    }
}
