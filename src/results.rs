//! Timing samples and the normalized result table
//!
//! Samples are tagged with their operation and method when recorded. The
//! aggregator only concatenates; unit conversion to milliseconds happens
//! once, in [`Aggregator::finalize`].

use std::fs::File;
use std::io;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::builtins::{mean, quantile_sorted};
use crate::error::{BenchError, Result};
use crate::ops::OperationKind;
use crate::registry::Method;

/// One timed execution
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimingSample {
    pub operation: OperationKind,
    pub method: Method,
    pub elapsed: Duration,
}

/// Collects sample batches in record order
#[derive(Debug, Default)]
pub struct Aggregator {
    samples: Vec<TimingSample>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one (operation, method) batch
    pub fn record(&mut self, operation: OperationKind, method: Method, samples: &[Duration]) {
        self.samples.extend(samples.iter().map(|&elapsed| TimingSample {
            operation,
            method,
            elapsed,
        }));
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Convert every sample to a row, in record order
    pub fn finalize(self) -> ResultTable {
        let rows = self
            .samples
            .into_iter()
            .map(|s| ResultRow {
                operation: s.operation,
                method: s.method,
                elapsed_ms: s.elapsed.as_secs_f64() * 1e3,
            })
            .collect();
        ResultTable { rows }
    }
}

/// One normalized measurement
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ResultRow {
    pub operation: OperationKind,
    pub method: Method,
    pub elapsed_ms: f64,
}

/// Per (operation, method) console summary, milliseconds
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SummaryRow {
    pub operation: OperationKind,
    pub method: Method,
    pub samples: usize,
    pub min_ms: f64,
    pub median_ms: f64,
    pub mean_ms: f64,
    pub max_ms: f64,
}

/// Finalized, read-only benchmark results
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultTable {
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct operations present, in catalog order
    pub fn operations(&self) -> Vec<OperationKind> {
        OperationKind::ALL
            .into_iter()
            .filter(|op| self.rows.iter().any(|r| r.operation == *op))
            .collect()
    }

    /// Distinct methods present, in first-recorded order
    pub fn methods(&self) -> Vec<Method> {
        let mut out = Vec::new();
        for row in &self.rows {
            if !out.contains(&row.method) {
                out.push(row.method);
            }
        }
        out
    }

    /// Elapsed times for one (operation, method), record order
    pub fn samples(&self, operation: OperationKind, method: Method) -> Vec<f64> {
        self.rows
            .iter()
            .filter(|r| r.operation == operation && r.method == method)
            .map(|r| r.elapsed_ms)
            .collect()
    }

    pub fn summary(&self) -> Vec<SummaryRow> {
        let mut out = Vec::new();
        for operation in self.operations() {
            for method in self.methods() {
                let mut ms = self.samples(operation, method);
                if ms.is_empty() {
                    continue;
                }
                ms.sort_by(f64::total_cmp);
                out.push(SummaryRow {
                    operation,
                    method,
                    samples: ms.len(),
                    min_ms: ms[0],
                    median_ms: quantile_sorted(&ms, 0.5),
                    mean_ms: mean(&ms),
                    max_ms: ms[ms.len() - 1],
                });
            }
        }
        out
    }

    /// Raw rows as CSV with header `operation,method,elapsed_ms`
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer =
            csv::Writer::from_path(path).map_err(|e| BenchError::io(path, io::Error::other(e)))?;
        for row in &self.rows {
            writer
                .serialize(row)
                .map_err(|e| BenchError::io(path, io::Error::other(e)))?;
        }
        writer.flush().map_err(|e| BenchError::io(path, e))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.rows)
    }

    /// Raw rows as a pretty-printed JSON array
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| BenchError::io(path, e))?;
        serde_json::to_writer_pretty(io::BufWriter::new(file), &self.rows)
            .map_err(|e| BenchError::io(path, e.into()))
    }
}
