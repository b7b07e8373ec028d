//! History outputs: scalar time series recorded per region of a step.

use serde::{Deserialize, Serialize};

/// One named series of `(time, value)` samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryOutput {
    pub name: String,
    #[serde(default)]
    pub data: Vec<(f64, f64)>,
}

impl HistoryOutput {
    pub fn new(name: impl Into<String>, data: Vec<(f64, f64)>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// A region (assembly, node set, element) owning history outputs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoryRegion {
    pub name: String,
    #[serde(default)]
    pub outputs: Vec<HistoryOutput>,
}

impl HistoryRegion {
    pub fn new(name: impl Into<String>, outputs: Vec<HistoryOutput>) -> Self {
        Self {
            name: name.into(),
            outputs,
        }
    }
}
