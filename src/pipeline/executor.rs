//! Pipeline executor
//!
//! Executes an ExecutionPlan by dispatching segments to the fused kernels.

use super::colwise_fused;
use super::execution_plan::{ExecutionPlan, Segment, SegmentKind};
use crate::error::{BenchError, Result};
use crate::table::Table;

/// Execution statistics for plan inspection
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecutionStats {
    /// Number of segments executed
    pub segments_executed: usize,

    /// Number of segments that filtered and computed in one pass
    pub segments_fused: usize,
}

/// Pipeline executor
#[derive(Debug, Default)]
pub struct Executor {
    stats: ExecutionStats,
}

impl Executor {
    /// Create a new executor
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a plan on an input table
    ///
    /// The input is only read; every segment allocates its own output.
    pub fn execute(&mut self, plan: &ExecutionPlan, input: &Table) -> Result<ExecutionResult> {
        if plan.input_names() != input.names.as_slice() {
            return Err(BenchError::Input(format!(
                "plan expects columns {:?}, input has {:?}",
                plan.input_names(),
                input.names
            )));
        }

        let mut current: Option<Table> = None;
        for segment in &plan.segments {
            let source = current.as_ref().unwrap_or(input);
            let output = self.execute_segment(segment, source)?;
            current = Some(output);
        }

        Ok(ExecutionResult {
            table: current.unwrap_or_else(|| input.clone()),
            stats: self.stats.clone(),
        })
    }

    /// Execute a single segment
    fn execute_segment(&mut self, segment: &Segment, input: &Table) -> Result<Table> {
        let out = match segment.kind {
            SegmentKind::Scan => colwise_fused::scan(segment, input)?,
            SegmentKind::Aggregate => colwise_fused::aggregate(segment, input)?,
        };
        self.stats.segments_executed += 1;
        if segment.is_fused() {
            self.stats.segments_fused += 1;
        }
        Ok(out)
    }
}

/// Result of pipeline execution
#[derive(Debug)]
pub struct ExecutionResult {
    pub table: Table,
    pub stats: ExecutionStats,
}
