//! Benchmark configuration
//!
//! Three layers, later ones winning: the embedded `config/default.toml`, an
//! optional user file holding any subset of keys, and command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, Result};
use crate::ops::OperationParams;
use crate::registry::Method;

/// Embedded defaults
pub const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Default plot file name
pub const DEFAULT_OUTPUT: &str = "mtcars_benchmarking_plot.pdf";

/// Complete run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    pub target_rows: usize,
    pub repetitions: usize,
    pub warmup: usize,
    /// Method identifiers in benchmark order
    pub methods: Vec<String>,
    pub output: PathBuf,
    pub params: OperationParams,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            target_rows: 32_000,
            repetitions: 100,
            warmup: 2,
            methods: ["native", "vectorized", "optimized"]
                .map(String::from)
                .to_vec(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            params: OperationParams::default(),
        }
    }
}

/// A partial configuration laid over a complete one
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverlay {
    pub target_rows: Option<usize>,
    pub repetitions: Option<usize>,
    pub warmup: Option<usize>,
    pub methods: Option<Vec<String>>,
    pub output: Option<PathBuf>,
    pub params: Option<OperationParams>,
}

impl ConfigOverlay {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| BenchError::Config(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| BenchError::Config(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&text)
            .map_err(|e| BenchError::Config(format!("{}: {}", path.display(), e)))
    }
}

impl BenchConfig {
    /// The embedded defaults
    pub fn embedded() -> Result<Self> {
        toml::from_str(DEFAULT_CONFIG).map_err(|e| BenchError::Config(e.to_string()))
    }

    /// Embedded defaults, overlaid with `path` when given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::embedded()?;
        if let Some(path) = path {
            config.merge(&ConfigOverlay::from_file(path)?);
        }
        Ok(config)
    }

    pub fn merge(&mut self, overlay: &ConfigOverlay) {
        if let Some(v) = overlay.target_rows {
            self.target_rows = v;
        }
        if let Some(v) = overlay.repetitions {
            self.repetitions = v;
        }
        if let Some(v) = overlay.warmup {
            self.warmup = v;
        }
        if let Some(v) = &overlay.methods {
            self.methods.clone_from(v);
        }
        if let Some(v) = &overlay.output {
            self.output.clone_from(v);
        }
        if let Some(v) = &overlay.params {
            self.params.clone_from(v);
        }
    }

    /// Parsed methods; unrecognized names come back as `Method::Other`
    pub fn methods(&self) -> Vec<Method> {
        self.methods.iter().map(|m| Method::from_label(m)).collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_rows == 0 {
            return Err(BenchError::Config("target_rows must be at least 1".into()));
        }
        if self.repetitions == 0 {
            return Err(BenchError::Config("repetitions must be at least 1".into()));
        }
        if self.methods.is_empty() {
            return Err(BenchError::Config("no methods configured".into()));
        }
        if self.output.as_os_str().is_empty() {
            return Err(BenchError::Config("output path is empty".into()));
        }
        self.params.validate()
    }
}
