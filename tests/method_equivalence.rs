//! Equivalence tests across methods
//!
//! Every method must produce the same rows, columns and values for every
//! operation (values within 1e-9, row order ignored).

use std::cmp::Ordering;

use framebench::ops::{native, optimized, vectorized, MEAN_COLUMN};
use framebench::{
    build, mtcars, Column, Dataset, Method, OperationKind, OperationParams, OperationSet, Table,
};

#[derive(Clone, Debug)]
enum Cell {
    F(f64),
    I(i64),
    S(String),
}

fn cell_cmp(a: &Cell, b: &Cell) -> Ordering {
    match (a, b) {
        (Cell::F(x), Cell::F(y)) => x.total_cmp(y),
        (Cell::I(x), Cell::I(y)) => x.cmp(y),
        (Cell::S(x), Cell::S(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn cells_close(a: &Cell, b: &Cell) -> bool {
    match (a, b) {
        (Cell::F(x), Cell::F(y)) => (x - y).abs() <= 1e-9,
        (Cell::I(x), Cell::I(y)) => x == y,
        (Cell::S(x), Cell::S(y)) => x == y,
        _ => false,
    }
}

/// Rows of a table, sorted for order-insensitive comparison
fn sorted_rows(t: &Table) -> Vec<Vec<Cell>> {
    let mut rows: Vec<Vec<Cell>> = (0..t.row_count())
        .map(|i| {
            t.columns
                .iter()
                .map(|c| match c {
                    Column::F64(v) => Cell::F(v[i]),
                    Column::I64(v) => Cell::I(v[i]),
                    Column::Sym(v) => Cell::S(v[i].to_string()),
                })
                .collect()
        })
        .collect();
    rows.sort_by(|a, b| {
        a.iter()
            .zip(b)
            .map(|(x, y)| cell_cmp(x, y))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    rows
}

fn assert_equivalent(a: &Table, b: &Table, what: &str) {
    assert_eq!(a.names, b.names, "{}: column names differ", what);
    let kinds_a: Vec<_> = a.columns.iter().map(|c| c.kind()).collect();
    let kinds_b: Vec<_> = b.columns.iter().map(|c| c.kind()).collect();
    assert_eq!(kinds_a, kinds_b, "{}: column kinds differ", what);
    assert_eq!(a.row_count(), b.row_count(), "{}: row counts differ", what);

    for (ra, rb) in sorted_rows(a).iter().zip(sorted_rows(b).iter()) {
        assert!(
            ra.iter().zip(rb).all(|(x, y)| cells_close(x, y)),
            "{}: rows differ: {:?} vs {:?}",
            what,
            ra,
            rb
        );
    }
}

fn all_sets(params: &OperationParams) -> Vec<OperationSet> {
    vec![
        native::operation_set(params),
        vectorized::operation_set(params),
        optimized::operation_set(params).expect("optimized plans"),
    ]
}

fn small_dataset(mpg: Vec<f64>, cyl: Vec<i64>) -> Dataset {
    let n = mpg.len();
    let models: Vec<String> = (0..n).map(|i| format!("car{}", i)).collect();
    let hp: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
    Dataset::from_table(Table::new(
        vec!["model".into(), "mpg".into(), "cyl".into(), "hp".into()],
        vec![
            Column::new_sym(models),
            Column::new_f64(mpg),
            Column::new_i64(cyl),
            Column::new_f64(hp),
        ],
    ))
    .unwrap()
}

#[test]
fn test_all_operations_equivalent_on_replicated_mtcars() {
    let ds = build(&mtcars(), 3000).unwrap();
    let params = OperationParams::default();
    let sets = all_sets(&params);

    for op in OperationKind::ALL {
        let baseline = sets[0].execute(op, &ds).unwrap();
        for set in &sets[1..] {
            let out = set.execute(op, &ds).unwrap();
            let what = format!("{} ({} vs native)", op, set.owner());
            assert_equivalent(&out, &baseline, &what);
        }
    }
}

#[test]
fn test_equivalent_with_non_default_params() {
    let ds = build(&mtcars(), 96).unwrap();
    let params = OperationParams {
        filter_threshold: 15.0,
        select_columns: vec!["hp".into(), "model".into()],
        mutate_factor: 2.0,
        mutate_output: "double_mpg".into(),
    };
    let sets = all_sets(&params);

    for op in OperationKind::ALL {
        let baseline = sets[0].execute(op, &ds).unwrap();
        for set in &sets[1..] {
            let what = format!("{} ({})", op, set.owner());
            assert_equivalent(&set.execute(op, &ds).unwrap(), &baseline, &what);
        }
    }
}

#[test]
fn test_filter_strictly_greater_every_method() {
    let ds = small_dataset(vec![25.0, 15.0, 20.0], vec![4, 8, 6]);
    for set in all_sets(&OperationParams::default()) {
        let out = set.execute(OperationKind::Filter, &ds).unwrap();
        assert_eq!(out.f64("mpg").unwrap(), &[25.0], "{}", set.owner());
        assert_eq!(out.sym("model").unwrap()[0].as_ref(), "car0");
    }
}

#[test]
fn test_mutate_twenty_mpg_every_method() {
    let ds = small_dataset(vec![20.0], vec![6]);
    for set in all_sets(&OperationParams::default()) {
        let out = set.execute(OperationKind::Mutate, &ds).unwrap();
        let kpl = out.f64("kpl").unwrap();
        assert!((kpl[0] - 8.5).abs() < 1e-9, "{}: {}", set.owner(), kpl[0]);
        assert_eq!(out.f64("mpg").unwrap(), &[20.0]);
    }
}

#[test]
fn test_select_projects_in_order_every_method() {
    let ds = build(&mtcars(), 32).unwrap();
    for set in all_sets(&OperationParams::default()) {
        let out = set.execute(OperationKind::Select, &ds).unwrap();
        assert_eq!(out.names, vec!["mpg", "cyl", "hp"], "{}", set.owner());
        assert_eq!(out.row_count(), 32);
    }
}

#[test]
fn test_group_aggregate_sorted_keys_every_method() {
    let ds = small_dataset(vec![10.0, 30.0, 20.0, 21.0, 20.0], vec![8, 4, 8, 6, 4]);
    for set in all_sets(&OperationParams::default()) {
        let out = set.execute(OperationKind::GroupAggregate, &ds).unwrap();
        assert_eq!(out.names, vec!["cyl", MEAN_COLUMN]);
        assert_eq!(out.i64("cyl").unwrap(), &[4, 6, 8], "{}", set.owner());
        assert_eq!(out.f64(MEAN_COLUMN).unwrap(), &[25.0, 21.0, 15.0]);
    }
}

#[test]
fn test_chained_with_nothing_passing_is_empty() {
    let ds = small_dataset(vec![10.0, 12.0], vec![8, 8]);
    for set in all_sets(&OperationParams::default()) {
        let out = set.execute(OperationKind::Chained, &ds).unwrap();
        assert_eq!(out.row_count(), 0, "{}", set.owner());
        assert_eq!(out.names, vec!["cyl", MEAN_COLUMN]);
    }
}

#[test]
fn test_dataset_unchanged_by_operations() {
    let ds = build(&mtcars(), 64).unwrap();
    let before = ds.table().clone();
    for set in all_sets(&OperationParams::default()) {
        for op in OperationKind::ALL {
            set.execute(op, &ds).unwrap();
        }
    }
    assert_eq!(ds.table(), &before);
    assert!(all_sets(&OperationParams::default())
        .iter()
        .all(|s| s.owner() != Method::Other));
}

#[test]
fn test_equivalent_on_reordered_and_widened_tables() {
    let seed = mtcars();
    let reordered = seed.select(&["mpg", "model", "cyl", "hp"]).unwrap();
    let widened = seed
        .with_column("wt", Column::new_f64(vec![3.2; seed.row_count()]))
        .unwrap();
    let sets = all_sets(&OperationParams::default());

    for table in [reordered, widened] {
        let ds = Dataset::from_table(table).unwrap();
        for op in OperationKind::ALL {
            let baseline = sets[0].execute(op, &ds).unwrap();
            for set in &sets[1..] {
                let out = set.execute(op, &ds).unwrap();
                assert_equivalent(&out, &baseline, &format!("{} ({})", op, set.owner()));
            }
        }
    }
}
