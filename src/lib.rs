//! framebench: timing harness for tabular operations across implementations
//!
//! Builds a replicated dataset, times a fixed catalog of operations under
//! several methods in a controlled activation order, and renders the
//! timings as a faceted, log-scaled comparison plot.

pub mod builtins;
pub mod config;
pub mod dataset;
pub mod error;
pub mod harness;
pub mod ops;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod results;
pub mod table;

pub use config::{BenchConfig, ConfigOverlay};
pub use dataset::{build, load_seed_csv, mtcars, Dataset};
pub use error::{BenchError, Result};
pub use harness::{measure, run, PhaseEvent, PhaseLog, Session, SessionOutput};
pub use ops::{OperationKind, OperationParams, OperationSet};
pub use registry::{Method, MethodState, Registry};
pub use report::{persist, PlotArtifact, Reporter};
pub use results::{Aggregator, ResultRow, ResultTable, SummaryRow, TimingSample};
pub use table::{Bitmap, Column, ColumnKind, Table};
