//! Pipeline planner
//!
//! Converts PipeIR into ExecutionPlan by:
//! 1. Tracking the output schema symbolically (name -> source)
//! 2. Accumulating filters and derives into the pending segment
//! 3. Closing a segment at every reducer, which absorbs pending filters

use super::execution_plan::{ExecutionPlan, Predicate, Segment, SegmentKind, Source};
use super::ir::{PipeIR, Step};
use crate::error::{BenchError, Result};

/// Pipeline planner
pub struct Planner {
    /// Schema the pending segment reads
    input_names: Vec<String>,

    /// Current output schema, relative to `input_names`
    columns: Vec<(String, Source)>,

    /// Filters not yet absorbed by a segment
    predicates: Vec<Predicate>,

    /// Completed segments
    segments: Vec<Segment>,
}

impl Planner {
    /// Create a planner over a known input schema
    pub fn new(input_names: &[String]) -> Self {
        Planner {
            input_names: input_names.to_vec(),
            columns: identity(input_names),
            predicates: Vec::new(),
            segments: Vec::new(),
        }
    }

    /// Plan a pipeline IR into an execution plan
    pub fn plan(ir: &PipeIR, input_names: &[String]) -> Result<ExecutionPlan> {
        let mut planner = Planner::new(input_names);

        for step in &ir.steps {
            planner.process_step(step)?;
        }

        // Flush pending work; an empty pipeline still yields one copy scan
        if planner.has_pending() || planner.segments.is_empty() {
            planner.flush_scan();
        }

        Ok(ExecutionPlan {
            segments: planner.segments,
        })
    }

    /// Process a single step
    fn process_step(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::Filter { column, threshold } => {
                let source = self.lookup(column)?;
                self.predicates.push(Predicate {
                    source,
                    threshold: *threshold,
                });
            }

            Step::Select { columns } => {
                let projected = columns
                    .iter()
                    .map(|name| Ok((name.clone(), self.lookup(name)?)))
                    .collect::<Result<Vec<_>>>()?;
                self.columns = projected;
            }

            Step::Derive {
                source,
                output,
                factor,
            } => {
                if self.columns.iter().any(|(n, _)| n == output) {
                    return Err(BenchError::Input(format!(
                        "column `{}` already exists",
                        output
                    )));
                }
                let derived = match self.lookup(source)? {
                    Source::Input(input) => Source::Scaled {
                        input,
                        factor: *factor,
                    },
                    Source::Scaled { input, factor: f } => Source::Scaled {
                        input,
                        factor: f * factor,
                    },
                };
                self.columns.push((output.clone(), derived));
            }

            Step::GroupMean { key, value, output } => {
                let key_source = self.lookup(key)?;
                if !matches!(key_source, Source::Input(_)) {
                    return Err(BenchError::Input(format!(
                        "group key `{}` must be a stored column",
                        key
                    )));
                }
                let value_source = self.lookup(value)?;

                self.segments.push(Segment {
                    kind: SegmentKind::Aggregate,
                    input_names: self.input_names.clone(),
                    predicates: std::mem::take(&mut self.predicates),
                    outputs: vec![(key.clone(), key_source), (output.clone(), value_source)],
                });
                self.restart(vec![key.clone(), output.clone()]);
            }
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<Source> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, src)| *src)
            .ok_or_else(|| BenchError::Input(format!("no column named `{}`", name)))
    }

    /// Anything beyond an identity copy of the segment input
    fn has_pending(&self) -> bool {
        !self.predicates.is_empty() || self.columns != identity(&self.input_names)
    }

    fn flush_scan(&mut self) {
        let outputs = std::mem::take(&mut self.columns);
        let names: Vec<String> = outputs.iter().map(|(n, _)| n.clone()).collect();
        self.segments.push(Segment {
            kind: SegmentKind::Scan,
            input_names: self.input_names.clone(),
            predicates: std::mem::take(&mut self.predicates),
            outputs,
        });
        self.restart(names);
    }

    /// Start a fresh segment over the given schema
    fn restart(&mut self, names: Vec<String>) {
        self.columns = identity(&names);
        self.input_names = names;
    }
}

fn identity(names: &[String]) -> Vec<(String, Source)> {
    names
        .iter()
        .enumerate()
        .map(|(i, n)| (n.clone(), Source::Input(i)))
        .collect()
}
