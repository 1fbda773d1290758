//! Method registry
//!
//! Maps each method to its operation set. Methods move through a fixed
//! lifecycle, and activation of an overriding method is only allowed once
//! every method it shadows has been measured:
//!
//! ```text
//! Registered --activate--> Active --benchmark--> Benchmarked
//!      |                                              |
//!      +------ overrider activated ------> Overridden { by }
//! ```
//!
//! An overridden slot resolves to the overrider's operation set, so code
//! dispatching through the old name silently runs the new implementation.

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{BenchError, Result};
use crate::ops::{native, optimized, vectorized, OperationParams, OperationSet};

/// A family of implementations of the operation catalog
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Row-at-a-time baseline
    Native,
    /// Columnar kernels with a selection bitmap
    Vectorized,
    /// Planned pipelines with fused execution
    Optimized,
    /// Any identifier we do not recognize
    Other,
}

impl Method {
    /// Every label a result row may carry
    pub const DECLARED: [Method; 4] = [
        Method::Native,
        Method::Vectorized,
        Method::Optimized,
        Method::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Method::Native => "native",
            Method::Vectorized => "vectorized",
            Method::Optimized => "optimized",
            Method::Other => "other",
        }
    }

    /// Parse a user-facing identifier; unknown names map to `Other`
    pub fn from_label(label: &str) -> Method {
        let label = label.trim();
        Method::DECLARED
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(label))
            .unwrap_or(Method::Other)
    }

    /// Methods whose dispatch slots this one takes over on activation
    pub fn overrides(self) -> &'static [Method] {
        match self {
            Method::Optimized => &[Method::Vectorized],
            _ => &[],
        }
    }

    /// Whether an implementation exists for this method
    pub fn is_available(self) -> bool {
        !matches!(self, Method::Other)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fail with `DependencyLoad` if `method` has no implementation
pub fn ensure_available(method: Method) -> Result<()> {
    if method.is_available() {
        Ok(())
    } else {
        Err(BenchError::DependencyLoad { method })
    }
}

/// Check that no method is listed after a method that overrides it
pub fn check_order(methods: &[Method]) -> Result<()> {
    for (i, m) in methods.iter().enumerate() {
        for (j, later) in methods.iter().enumerate().skip(i + 1) {
            if later == m {
                return Err(BenchError::Input(format!(
                    "method `{}` listed twice (positions {} and {})",
                    m,
                    i + 1,
                    j + 1
                )));
            }
        }
        for earlier in &methods[..i] {
            if earlier.overrides().contains(m) {
                return Err(BenchError::Phase(format!(
                    "`{}` overrides `{}` and must come after it",
                    earlier, m
                )));
            }
        }
    }
    Ok(())
}

fn load(method: Method, params: &OperationParams) -> Result<OperationSet> {
    match method {
        Method::Native => Ok(native::operation_set(params)),
        Method::Vectorized => Ok(vectorized::operation_set(params)),
        Method::Optimized => optimized::operation_set(params),
        Method::Other => Err(BenchError::DependencyLoad { method }),
    }
}

/// Lifecycle state of one method's slot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodState {
    Registered,
    Active,
    Benchmarked,
    Overridden { by: Method },
}

#[derive(Debug)]
struct Slot {
    state: MethodState,
    set: Option<Arc<OperationSet>>,
}

/// Method -> operation set, populated in phase order
#[derive(Debug)]
pub struct Registry {
    params: OperationParams,
    slots: HashMap<Method, Slot>,
}

impl Registry {
    /// Register `methods`; every one must have an implementation
    pub fn new(params: OperationParams, methods: &[Method]) -> Result<Self> {
        params.validate()?;
        let mut slots = HashMap::with_capacity(methods.len());
        for &method in methods {
            ensure_available(method)?;
            slots.insert(
                method,
                Slot {
                    state: MethodState::Registered,
                    set: None,
                },
            );
        }
        Ok(Self { params, slots })
    }

    pub fn state(&self, method: Method) -> Option<MethodState> {
        self.slots.get(&method).map(|s| s.state)
    }

    /// Load `method`'s implementations and take over the slots it overrides
    pub fn activate(&mut self, method: Method) -> Result<()> {
        ensure_available(method)?;
        match self.state(method) {
            Some(MethodState::Registered) => {}
            Some(MethodState::Overridden { by }) => {
                return Err(BenchError::Phase(format!(
                    "`{}` is already overridden by `{}`",
                    method, by
                )));
            }
            Some(_) => {
                return Err(BenchError::Phase(format!("`{}` is already active", method)));
            }
            None => {
                return Err(BenchError::Phase(format!("`{}` is not registered", method)));
            }
        }

        for &victim in method.overrides() {
            if let Some(MethodState::Registered | MethodState::Active) = self.state(victim) {
                return Err(BenchError::Phase(format!(
                    "`{}` overrides `{}`, which has not been benchmarked yet",
                    method, victim
                )));
            }
        }

        let set = Arc::new(load(method, &self.params)?);
        for &victim in method.overrides() {
            self.slots.insert(
                victim,
                Slot {
                    state: MethodState::Overridden { by: method },
                    set: Some(Arc::clone(&set)),
                },
            );
            debug!(method = %victim, by = %method, "slot overridden");
        }
        self.slots.insert(
            method,
            Slot {
                state: MethodState::Active,
                set: Some(set),
            },
        );
        info!(method = %method, "activated");
        Ok(())
    }

    /// Operation set currently installed in `method`'s slot
    pub fn resolve(&self, method: Method) -> Result<Arc<OperationSet>> {
        self.slots
            .get(&method)
            .and_then(|s| s.set.clone())
            .ok_or_else(|| BenchError::Phase(format!("`{}` has not been activated", method)))
    }

    /// Hand out `method`'s own implementations for measurement
    pub fn begin_benchmark(&self, method: Method) -> Result<Arc<OperationSet>> {
        match self.state(method) {
            Some(MethodState::Active | MethodState::Benchmarked) => self.resolve(method),
            Some(MethodState::Overridden { by }) => Err(BenchError::Phase(format!(
                "cannot benchmark `{}`: its slot now runs `{}`",
                method, by
            ))),
            _ => Err(BenchError::Phase(format!(
                "cannot benchmark `{}` before activating it",
                method
            ))),
        }
    }

    pub fn finish_benchmark(&mut self, method: Method) {
        if let Some(slot) = self.slots.get_mut(&method) {
            if slot.state == MethodState::Active {
                slot.state = MethodState::Benchmarked;
            }
        }
    }
}
