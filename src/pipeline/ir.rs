//! Intermediate Representation for table pipelines
//!
//! A pipeline is a linear sequence of steps applied to one input table,
//! before planning and fusion.

/// A single step in the pipeline IR
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    /// Keep rows where `column > threshold`
    Filter { column: String, threshold: f64 },

    /// Project columns, in the order given
    Select { columns: Vec<String> },

    /// Append `output = source * factor`
    Derive {
        source: String,
        output: String,
        factor: f64,
    },

    /// Mean of `value` per distinct `key`; output is `[key, output]`
    GroupMean {
        key: String,
        value: String,
        output: String,
    },
}

impl Step {
    /// Reducers change the table's shape, so planning restarts after them
    pub fn is_reducer(&self) -> bool {
        matches!(self, Step::GroupMean { .. })
    }
}

/// Pipeline intermediate representation
#[derive(Clone, Debug, Default)]
pub struct PipeIR {
    pub steps: Vec<Step>,
}

impl PipeIR {
    /// Create empty pipeline
    pub fn new() -> Self {
        PipeIR { steps: Vec::new() }
    }

    /// Add a step to the pipeline
    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Builder form of [`PipeIR::push`]
    pub fn then(mut self, step: Step) -> Self {
        self.push(step);
        self
    }

    /// Number of steps in pipeline
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if pipeline is empty
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
