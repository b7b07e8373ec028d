//! In-memory result container.
//!
//! The archive keeps everything in `Vec`s so native iteration order is the
//! order the records were written in.

use serde::{Deserialize, Serialize};

use crate::field::FieldOutput;
use crate::history::HistoryRegion;
use crate::mesh::Instance;
use crate::source::{FrameInfo, ResultSource, SourceError};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultArchive {
    #[serde(default)]
    pub instances: Vec<Instance>,
    #[serde(default)]
    pub steps: Vec<ArchiveStep>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArchiveStep {
    pub name: String,
    #[serde(default)]
    pub frames: Vec<ArchiveFrame>,
    #[serde(default)]
    pub history_regions: Vec<HistoryRegion>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArchiveFrame {
    /// Step time of the frame
    pub value: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<FieldOutput>,
}

impl ArchiveFrame {
    pub fn new(value: f64, fields: Vec<FieldOutput>) -> Self {
        Self {
            value,
            description: String::new(),
            fields,
        }
    }
}

impl ResultArchive {
    fn step(&self, name: &str) -> Result<&ArchiveStep, SourceError> {
        self.steps
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| SourceError::UnknownStep(name.to_string()))
    }

    fn archive_frame(&self, step: &str, frame: usize) -> Result<&ArchiveFrame, SourceError> {
        self.step(step)?
            .frames
            .get(frame)
            .ok_or_else(|| SourceError::UnknownFrame {
                step: step.to_string(),
                frame,
            })
    }
}

impl ResultSource for ResultArchive {
    fn instance_names(&self) -> Vec<String> {
        self.instances.iter().map(|i| i.name.clone()).collect()
    }

    fn instance(&self, name: &str) -> Result<&Instance, SourceError> {
        self.instances
            .iter()
            .find(|i| i.name == name)
            .ok_or_else(|| SourceError::UnknownInstance(name.to_string()))
    }

    fn step_names(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.name.clone()).collect()
    }

    fn frames(&self, step: &str) -> Result<Vec<FrameInfo>, SourceError> {
        Ok(self
            .step(step)?
            .frames
            .iter()
            .enumerate()
            .map(|(index, f)| FrameInfo {
                index,
                value: f.value,
                description: f.description.clone(),
            })
            .collect())
    }

    fn field_names(&self, step: &str, frame: usize) -> Result<Vec<String>, SourceError> {
        Ok(self
            .archive_frame(step, frame)?
            .fields
            .iter()
            .map(|f| f.name.clone())
            .collect())
    }

    fn field_output(
        &self,
        step: &str,
        frame: usize,
        name: &str,
    ) -> Result<&FieldOutput, SourceError> {
        self.archive_frame(step, frame)?
            .fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| SourceError::UnknownField {
                step: step.to_string(),
                frame,
                field: name.to_string(),
            })
    }

    fn history_regions(&self, step: &str) -> Result<&[HistoryRegion], SourceError> {
        Ok(&self.step(step)?.history_regions)
    }
}
