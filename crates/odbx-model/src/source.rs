//! The read-only contract of a result container.

use thiserror::Error;

use crate::field::FieldOutput;
use crate::history::HistoryRegion;
use crate::mesh::Instance;

/// Lookup failures of a result container
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("unknown instance: {0}")]
    UnknownInstance(String),

    #[error("unknown step: {0}")]
    UnknownStep(String),

    #[error("step {step} has no frame {frame}")]
    UnknownFrame { step: String, frame: usize },

    #[error("step {step} frame {frame} has no field output {field}")]
    UnknownField {
        step: String,
        frame: usize,
        field: String,
    },
}

/// One snapshot of a step
#[derive(Debug, Clone, PartialEq)]
pub struct FrameInfo {
    /// Zero-based position of the frame in its step
    pub index: usize,
    /// Step time (or frequency, load factor) of the frame
    pub value: f64,
    pub description: String,
}

/// A loaded result container.
///
/// Every method is a synchronous, read-only query; implementations must
/// return names in the container's native order.
pub trait ResultSource {
    fn instance_names(&self) -> Vec<String>;

    fn instance(&self, name: &str) -> Result<&Instance, SourceError>;

    fn step_names(&self) -> Vec<String>;

    fn frames(&self, step: &str) -> Result<Vec<FrameInfo>, SourceError>;

    fn frame(&self, step: &str, frame: usize) -> Result<FrameInfo, SourceError> {
        self.frames(step)?
            .into_iter()
            .find(|f| f.index == frame)
            .ok_or_else(|| SourceError::UnknownFrame {
                step: step.to_string(),
                frame,
            })
    }

    /// Names of the field outputs stored at one frame
    fn field_names(&self, step: &str, frame: usize) -> Result<Vec<String>, SourceError>;

    fn field_output(&self, step: &str, frame: usize, name: &str)
    -> Result<&FieldOutput, SourceError>;

    fn history_regions(&self, step: &str) -> Result<&[HistoryRegion], SourceError>;
}
