//! Descriptor of a result container: instance names and frame labels per
//! step, written as JSON beside the input.

use std::fs;
use std::path::{Path, PathBuf};

use odbx_model::ResultSource;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDescriptor {
    pub instances: Vec<String>,
    /// `[step, [frame labels]]` pairs in container order
    pub steps: Vec<(String, Vec<String>)>,
}

/// `Step-1-frame-07` for frame 7 of a step with 12 frames
pub fn frame_label(step: &str, frame: usize, frame_count: usize) -> String {
    let width = frame_count.to_string().len();
    format!("{step}-frame-{frame:0width$}")
}

impl ResultDescriptor {
    pub fn from_source<S: ResultSource + ?Sized>(source: &S) -> Result<Self> {
        let instances = source.instance_names();
        let mut steps = Vec::new();
        for step in source.step_names() {
            let frames = source.frames(&step)?;
            let labels = frames
                .iter()
                .map(|f| frame_label(&step, f.index, frames.len()))
                .collect();
            steps.push((step, labels));
        }
        Ok(Self { instances, steps })
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(self)?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

/// `{input_dir}/{stem}{suffix}.json`
pub fn descriptor_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = crate::convert::input_stem(input);
    input
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(format!("{stem}{suffix}.json"))
}
