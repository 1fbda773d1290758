//! Planned, fused kernels
//!
//! Each operation is described once as a `PipeIR`, planned against the
//! dataset schema when the set is built, and executed by the segment
//! executor on every call. Filter followed by grouping runs as a single
//! pass with no intermediate table.

use std::sync::Arc;

use tracing::debug;

use super::{Kernel, OperationKind, OperationParams, OperationSet, MEAN_COLUMN};
use crate::dataset::{schema, schema_names, Dataset};
use crate::error::Result;
use crate::pipeline::{ExecutionPlan, Executor, PipeIR, Planner, Step};
use crate::registry::Method;
use crate::table::Table;

fn filter_step(params: &OperationParams) -> Step {
    Step::Filter {
        column: schema::MPG.into(),
        threshold: params.filter_threshold,
    }
}

fn group_step() -> Step {
    Step::GroupMean {
        key: schema::CYL.into(),
        value: schema::MPG.into(),
        output: MEAN_COLUMN.into(),
    }
}

/// The pipeline computing `op`
pub fn pipeline(op: OperationKind, params: &OperationParams) -> PipeIR {
    let ir = PipeIR::new();
    match op {
        OperationKind::Filter => ir.then(filter_step(params)),
        OperationKind::Select => ir.then(Step::Select {
            columns: params.select_columns.clone(),
        }),
        OperationKind::Mutate => ir.then(Step::Derive {
            source: schema::MPG.into(),
            output: params.mutate_output.clone(),
            factor: params.mutate_factor,
        }),
        OperationKind::GroupAggregate => ir.then(group_step()),
        OperationKind::Chained => ir.then(filter_step(params)).then(group_step()),
    }
}

fn run_plan(plan: &ExecutionPlan, ds: &Dataset) -> Result<Table> {
    Executor::new().execute(plan, ds.table()).map(|r| r.table)
}

/// The optimized dispatch record
///
/// Plans every operation up front; a parameter set that cannot be planned
/// (unknown select column, clashing mutate output) fails here rather than
/// inside a timed run.
pub fn operation_set(params: &OperationParams) -> Result<OperationSet> {
    let names = schema_names();
    let mut plans = Vec::with_capacity(OperationKind::ALL.len());
    for op in OperationKind::ALL {
        let plan = Arc::new(Planner::plan(&pipeline(op, params), &names)?);
        debug!(
            operation = %op,
            segments = plan.len(),
            fused = plan.segments.iter().filter(|s| s.is_fused()).count(),
            "planned"
        );
        plans.push(plan);
    }

    Ok(OperationSet::new(Method::Optimized, |op| {
        let plan = Arc::clone(&plans[op.index()]);
        let kernel: Kernel = Arc::new(move |ds: &Dataset| run_plan(&plan, ds));
        kernel
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{build, mtcars};

    fn set() -> OperationSet {
        operation_set(&OperationParams::default()).unwrap()
    }

    #[test]
    fn test_owner_is_optimized() {
        assert_eq!(set().owner(), Method::Optimized);
    }

    #[test]
    fn test_chained_plans_single_fused_segment() {
        let plan = Planner::plan(
            &pipeline(OperationKind::Chained, &OperationParams::default()),
            &schema_names(),
        )
        .unwrap();
        assert_eq!(plan.len(), 1);
        assert!(plan.segments[0].is_fused());
    }

    #[test]
    fn test_filter_count() {
        let ds = build(&mtcars(), 64).unwrap();
        let out = set().execute(OperationKind::Filter, &ds).unwrap();
        assert_eq!(out.row_count(), 28);
        assert_eq!(out.names, schema_names());
    }

    #[test]
    fn test_mutate_appends_scaled_column() {
        let ds = build(&mtcars(), 32).unwrap();
        let out = set().execute(OperationKind::Mutate, &ds).unwrap();
        let mpg = out.f64("mpg").unwrap();
        let kpl = out.f64("kpl").unwrap();
        assert_eq!(out.row_count(), 32);
        for (m, k) in mpg.iter().zip(kpl) {
            assert!((m * 0.425 - k).abs() < 1e-12);
        }
    }

    #[test]
    fn test_group_means() {
        let ds = build(&mtcars(), 96).unwrap();
        let out = set().execute(OperationKind::GroupAggregate, &ds).unwrap();
        assert_eq!(out.i64("cyl").unwrap(), &[4, 6, 8]);
        let means = out.f64(MEAN_COLUMN).unwrap();
        assert!((means[2] - 15.1).abs() < 1e-9);
    }

    #[test]
    fn test_chained_drops_eight_cylinders() {
        let ds = build(&mtcars(), 32).unwrap();
        let out = set().execute(OperationKind::Chained, &ds).unwrap();
        assert_eq!(out.i64("cyl").unwrap(), &[4, 6]);
    }

    #[test]
    fn test_unknown_select_column_fails_at_build() {
        let params = OperationParams {
            select_columns: vec!["wt".into()],
            ..OperationParams::default()
        };
        assert!(operation_set(&params).is_err());
    }
}
