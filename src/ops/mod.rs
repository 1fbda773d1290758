//! Operation catalog and per-method dispatch records
//!
//! Five fixed operations, each implemented once per method:
//!
//! ```text
//! filter           rows where mpg > threshold
//! select           project mpg, cyl, hp
//! mutate           append kpl = mpg * 0.425
//! group_aggregate  mean(mpg) by cyl, keys ascending
//! chained          filter, then group_aggregate, as one timed unit
//! ```
//!
//! Every implementation is a pure `&Dataset -> Table` function; the shared
//! dataset is never modified.

pub mod native;
pub mod optimized;
pub mod vectorized;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dataset::{schema, Dataset};
use crate::error::{BenchError, Result};
use crate::registry::Method;
use crate::table::Table;

/// One named data-transformation task
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Filter,
    Select,
    Mutate,
    GroupAggregate,
    Chained,
}

impl OperationKind {
    /// Catalog order; also the facet order of the report
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Filter,
        OperationKind::Select,
        OperationKind::Mutate,
        OperationKind::GroupAggregate,
        OperationKind::Chained,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OperationKind::Filter => "filter",
            OperationKind::Select => "select",
            OperationKind::Mutate => "mutate",
            OperationKind::GroupAggregate => "group_aggregate",
            OperationKind::Chained => "chained",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Constants shared by every method's implementation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OperationParams {
    /// Filter keeps rows with `mpg` strictly above this
    pub filter_threshold: f64,
    /// Columns kept by select, in output order
    pub select_columns: Vec<String>,
    /// mpg -> km per litre
    pub mutate_factor: f64,
    /// Name of the column appended by mutate
    pub mutate_output: String,
}

impl Default for OperationParams {
    fn default() -> Self {
        Self {
            filter_threshold: 20.0,
            select_columns: vec![schema::MPG.into(), schema::CYL.into(), schema::HP.into()],
            mutate_factor: 0.425,
            mutate_output: "kpl".into(),
        }
    }
}

impl OperationParams {
    pub fn validate(&self) -> Result<()> {
        if !self.filter_threshold.is_finite() {
            return Err(BenchError::Input("filter threshold must be finite".into()));
        }
        if !self.mutate_factor.is_finite() {
            return Err(BenchError::Input("mutate factor must be finite".into()));
        }
        if self.select_columns.is_empty() {
            return Err(BenchError::Input("select needs at least one column".into()));
        }
        if self.mutate_output.is_empty() {
            return Err(BenchError::Input("mutate output column needs a name".into()));
        }
        Ok(())
    }

    pub(crate) fn select_names(&self) -> Vec<&str> {
        self.select_columns.iter().map(String::as_str).collect()
    }
}

/// Name of the aggregated column produced by group_aggregate and chained
pub const MEAN_COLUMN: &str = "mean_mpg";

/// A callable implementation of one operation
pub type Kernel = Arc<dyn Fn(&Dataset) -> Result<Table>>;

/// One method's implementations of the whole catalog
pub struct OperationSet {
    owner: Method,
    kernels: [Kernel; 5],
}

impl OperationSet {
    /// Build a set by asking `make` for each operation in catalog order
    pub fn new(owner: Method, mut make: impl FnMut(OperationKind) -> Kernel) -> Self {
        Self {
            owner,
            kernels: OperationKind::ALL.map(&mut make),
        }
    }

    /// Method whose code these kernels are
    pub fn owner(&self) -> Method {
        self.owner
    }

    pub fn kernel(&self, op: OperationKind) -> &Kernel {
        &self.kernels[op.index()]
    }

    /// Run one operation untimed
    pub fn execute(&self, op: OperationKind, dataset: &Dataset) -> Result<Table> {
        (self.kernel(op))(dataset)
    }
}

impl fmt::Debug for OperationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationSet")
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}
