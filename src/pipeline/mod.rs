//! Pipeline planning and fused execution
//!
//! Backs the `optimized` method. Each operation is written once as a linear
//! pipeline, planned into segments against the dataset schema, and
//! executed segment by segment:
//!
//! ```text
//! PipeIR:        [Filter(mpg > 20), GroupMean(cyl, mpg)]
//!     ↓
//! ExecutionPlan: [Aggregate { predicates: [#1 > 20], key: #2, value: #1 }]
//!     ↓
//! Executor:      one pass over the rows, no intermediate table
//! ```
//!
//! Planning happens once, when the method is activated; every timed run
//! reuses the same plan.

pub mod colwise_fused;
pub mod execution_plan;
pub mod executor;
pub mod ir;
pub mod planner;

pub use execution_plan::{ExecutionPlan, Predicate, Segment, SegmentKind, Source};
pub use executor::{ExecutionResult, ExecutionStats, Executor};
pub use ir::{PipeIR, Step};
pub use planner::Planner;
