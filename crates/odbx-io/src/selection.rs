//! Ordered step → frames selection, e.g. `Step-1:0,1,2`.

use std::str::FromStr;

use crate::error::ConvertError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFrames {
    pub step: String,
    pub frames: Vec<usize>,
}

impl StepFrames {
    pub fn new(step: impl Into<String>, frames: Vec<usize>) -> Self {
        Self {
            step: step.into(),
            frames,
        }
    }
}

impl FromStr for StepFrames {
    type Err = ConvertError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (step, frames) = raw.rsplit_once(':').ok_or_else(|| {
            ConvertError::InvalidData(format!("expected step:frame[,frame...], got {raw:?}"))
        })?;
        let step = step.trim();
        if step.is_empty() {
            return Err(ConvertError::InvalidData(format!("missing step name in {raw:?}")));
        }
        let frames = frames
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<usize>().map_err(|e| {
                    ConvertError::InvalidData(format!("bad frame index {s:?} in {raw:?}: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(StepFrames::new(step, frames))
    }
}

/// Requested frames, in caller order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameSelection {
    steps: Vec<StepFrames>,
}

impl FrameSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step. A step already present keeps its position and takes the
    /// new frame list.
    pub fn insert(&mut self, entry: StepFrames) {
        match self.steps.iter_mut().find(|s| s.step == entry.step) {
            Some(existing) => existing.frames = entry.frames,
            None => self.steps.push(entry),
        }
    }

    pub fn steps(&self) -> &[StepFrames] {
        &self.steps
    }

    pub fn step_names(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.step.as_str())
    }

    /// (step, frame) pairs: steps in order, frames in order within a step
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.steps
            .iter()
            .flat_map(|s| s.frames.iter().map(move |&f| (s.step.as_str(), f)))
    }

    pub fn len(&self) -> usize {
        self.steps.iter().map(|s| s.frames.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<StepFrames> for FrameSelection {
    fn from_iter<I: IntoIterator<Item = StepFrames>>(iter: I) -> Self {
        let mut selection = FrameSelection::new();
        for entry in iter {
            selection.insert(entry);
        }
        selection
    }
}
