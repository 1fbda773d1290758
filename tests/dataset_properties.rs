//! Property tests for dataset replication

use framebench::table::Column;
use framebench::{build, Table};
use proptest::prelude::*;

fn seed(rows: &[(f64, i64)]) -> Table {
    Table::new(
        vec!["model".into(), "mpg".into(), "cyl".into(), "hp".into()],
        vec![
            Column::new_sym((0..rows.len()).map(|i| format!("m{}", i))),
            Column::new_f64(rows.iter().map(|r| r.0).collect()),
            Column::new_i64(rows.iter().map(|r| r.1).collect()),
            Column::new_f64(vec![100.0; rows.len()]),
        ],
    )
}

proptest! {
    #[test]
    fn row_count_is_smallest_covering_multiple(
        rows in prop::collection::vec((0.0f64..50.0, 3i64..9), 1..40),
        target in 1usize..5000,
    ) {
        let seed = seed(&rows);
        let ds = build(&seed, target).unwrap();
        let n = rows.len();

        prop_assert_eq!(ds.row_count() % n, 0);
        prop_assert!(ds.row_count() >= target);
        prop_assert!(ds.row_count() - n < target);
        prop_assert_eq!(ds.replicas() * n, ds.row_count());
    }

    #[test]
    fn build_is_deterministic(
        rows in prop::collection::vec((0.0f64..50.0, 3i64..9), 1..20),
        target in 1usize..500,
    ) {
        let seed = seed(&rows);
        let a = build(&seed, target).unwrap();
        let b = build(&seed, target).unwrap();
        prop_assert_eq!(a.table(), b.table());
    }

    #[test]
    fn every_replica_is_the_seed(
        rows in prop::collection::vec((0.0f64..50.0, 3i64..9), 1..20),
        target in 1usize..300,
    ) {
        let seed = seed(&rows);
        let ds = build(&seed, target).unwrap();
        let n = rows.len();
        let mpg = ds.f64("mpg").unwrap();
        let seed_mpg = seed.f64("mpg").unwrap();
        for chunk in mpg.chunks(n) {
            prop_assert_eq!(chunk, seed_mpg);
        }
    }
}
