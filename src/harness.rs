//! Timing harness
//!
//! [`run`] times one operation of one method. [`Session`] drives a whole
//! benchmark: methods in configured order, each activated and then measured
//! across the catalog, with every phase change logged and recorded.

use std::hint::black_box;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::BenchConfig;
use crate::dataset::Dataset;
use crate::error::{BenchError, Result};
use crate::ops::{OperationKind, OperationSet};
use crate::registry::{self, Method, Registry};
use crate::results::{Aggregator, ResultTable};

/// Measure wall-clock time for a synchronous operation
pub fn measure<F, R>(f: F) -> (R, Duration)
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed();
    (result, elapsed)
}

fn execute_once(op: OperationKind, set: &OperationSet, dataset: &Dataset) -> Result<Duration> {
    let (out, elapsed) = measure(|| set.execute(op, black_box(dataset)));
    match out {
        Ok(table) => {
            drop(black_box(table));
            Ok(elapsed)
        }
        Err(e) => Err(BenchError::Operation {
            operation: op,
            method: set.owner(),
            message: e.to_string(),
        }),
    }
}

/// Time `repetitions` executions of `op`, one duration per run
///
/// Any failing run aborts the whole measurement.
pub fn run(
    op: OperationKind,
    set: &OperationSet,
    dataset: &Dataset,
    repetitions: usize,
) -> Result<Vec<Duration>> {
    run_with_warmup(op, set, dataset, 0, repetitions)
}

/// As [`run`], preceded by `warmup` untimed executions
pub fn run_with_warmup(
    op: OperationKind,
    set: &OperationSet,
    dataset: &Dataset,
    warmup: usize,
    repetitions: usize,
) -> Result<Vec<Duration>> {
    for _ in 0..warmup {
        execute_once(op, set, dataset)?;
    }
    let mut samples = Vec::with_capacity(repetitions);
    for _ in 0..repetitions {
        samples.push(execute_once(op, set, dataset)?);
    }
    Ok(samples)
}

/// A phase boundary crossed during a session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseEvent {
    Activated(Method),
    /// `ran` is the owner of the operation set that was timed
    Benchmarked {
        operation: OperationKind,
        method: Method,
        ran: Method,
    },
}

/// Ordered record of phase boundaries
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PhaseLog {
    events: Vec<PhaseEvent>,
}

impl PhaseLog {
    pub fn push(&mut self, event: PhaseEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[PhaseEvent] {
        &self.events
    }

    pub fn position(&self, event: PhaseEvent) -> Option<usize> {
        self.events.iter().position(|e| *e == event)
    }

    /// Index of the last benchmark event for `method`
    pub fn last_benchmark_of(&self, method: Method) -> Option<usize> {
        self.events
            .iter()
            .rposition(|e| {
                matches!(e, PhaseEvent::Benchmarked { method: m, .. } if *m == method)
            })
    }
}

/// Results of a completed session
#[derive(Debug)]
pub struct SessionOutput {
    pub results: ResultTable,
    pub log: PhaseLog,
}

/// One benchmark run over a fixed dataset
#[derive(Debug)]
pub struct Session {
    dataset: Dataset,
    methods: Vec<Method>,
    repetitions: usize,
    warmup: usize,
    registry: Registry,
    aggregator: Aggregator,
    log: PhaseLog,
}

impl Session {
    /// Check the configuration and register its methods
    ///
    /// Fails before anything is measured if a method is unavailable or the
    /// order would benchmark a method after its overrider.
    pub fn new(config: &BenchConfig, dataset: Dataset) -> Result<Self> {
        config.validate()?;
        let methods = config.methods();
        for &method in &methods {
            registry::ensure_available(method)?;
        }
        registry::check_order(&methods)?;
        let registry = Registry::new(config.params.clone(), &methods)?;

        Ok(Self {
            dataset,
            methods,
            repetitions: config.repetitions,
            warmup: config.warmup,
            registry,
            aggregator: Aggregator::new(),
            log: PhaseLog::default(),
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn log(&self) -> &PhaseLog {
        &self.log
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn activate(&mut self, method: Method) -> Result<()> {
        self.registry.activate(method)?;
        self.log.push(PhaseEvent::Activated(method));
        Ok(())
    }

    /// Measure every operation of an active method
    pub fn benchmark_method(&mut self, method: Method) -> Result<()> {
        let set = self.registry.begin_benchmark(method)?;
        if set.owner() != method {
            return Err(BenchError::Phase(format!(
                "`{}` slot holds `{}` implementations",
                method,
                set.owner()
            )));
        }

        for op in OperationKind::ALL {
            debug!(operation = %op, method = %method, reps = self.repetitions, "timing");
            let samples =
                run_with_warmup(op, &set, &self.dataset, self.warmup, self.repetitions)
                    .inspect_err(|e| {
                        warn!(operation = %op, method = %method, error = %e, "benchmark aborted")
                    })?;
            self.aggregator.record(op, method, &samples);
            self.log.push(PhaseEvent::Benchmarked {
                operation: op,
                method,
                ran: set.owner(),
            });
        }

        self.registry.finish_benchmark(method);
        info!(method = %method, samples = self.aggregator.sample_count(), "benchmarked");
        Ok(())
    }

    /// Activate and benchmark every configured method in order
    pub fn run(mut self) -> Result<SessionOutput> {
        info!(
            rows = self.dataset.row_count(),
            methods = self.methods.len(),
            reps = self.repetitions,
            warmup = self.warmup,
            "benchmark session starting"
        );
        for method in self.methods.clone() {
            self.activate(method)?;
            self.benchmark_method(method)?;
        }
        Ok(self.finish())
    }

    /// Finalize whatever has been recorded so far
    pub fn finish(self) -> SessionOutput {
        SessionOutput {
            results: self.aggregator.finalize(),
            log: self.log,
        }
    }
}
