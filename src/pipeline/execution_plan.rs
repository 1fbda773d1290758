//! Execution plan with segments
//!
//! Column references are resolved to input positions at plan time, so
//! executing a plan does no name lookups. Each segment reads the output of
//! the previous one (the first reads the pipeline input).

/// Where a value comes from, relative to the segment's input table
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Source {
    /// An input column as-is
    Input(usize),
    /// An input column multiplied by a constant (chained derives fold)
    Scaled { input: usize, factor: f64 },
}

/// Row predicate: `source > threshold`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Predicate {
    pub source: Source,
    pub threshold: f64,
}

/// Kind of execution segment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    /// Row filter + projection + derived columns, one output row per kept row
    Scan,

    /// Row filter + grouped mean, one output row per group
    Aggregate,
}

/// A unit of work executed in a single pass over its input
#[derive(Clone, Debug)]
pub struct Segment {
    pub kind: SegmentKind,

    /// Column names this segment expects, in order
    pub input_names: Vec<String>,

    /// Conjunction of row predicates
    pub predicates: Vec<Predicate>,

    /// Output columns; for `Aggregate` this is exactly `[key, value]`
    pub outputs: Vec<(String, Source)>,
}

impl Segment {
    /// True when filtering and computing happen in the same pass
    pub fn is_fused(&self) -> bool {
        if self.predicates.is_empty() {
            return false;
        }
        match self.kind {
            SegmentKind::Aggregate => true,
            SegmentKind::Scan => self
                .outputs
                .iter()
                .any(|(_, src)| matches!(src, Source::Scaled { .. })),
        }
    }
}

/// Complete execution plan for a pipeline
#[derive(Clone, Debug, Default)]
pub struct ExecutionPlan {
    /// Segments to execute in order
    pub segments: Vec<Segment>,
}

impl ExecutionPlan {
    /// Number of segments in plan
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Schema the whole plan expects as input
    pub fn input_names(&self) -> &[String] {
        self.segments
            .first()
            .map(|s| s.input_names.as_slice())
            .unwrap_or(&[])
    }
}
