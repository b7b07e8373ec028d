//! PVD collection manifest.
//!
//! Entries follow the selection order (steps as given, frames as given
//! within a step), not the frames' time values.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use odbx_model::ResultSource;

use crate::data_array::escape_attr;
use crate::error::Result;
use crate::selection::FrameSelection;

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionEntry {
    pub timestep: f64,
    pub part: usize,
    pub file: String,
}

/// File name of one frame document, relative to the output directory
pub fn frame_file_name(step: &str, frame: usize) -> String {
    format!("{step}_{frame}.vtu")
}

pub fn build_collection<S: ResultSource + ?Sized>(
    source: &S,
    selection: &FrameSelection,
) -> Result<Vec<CollectionEntry>> {
    selection
        .iter()
        .enumerate()
        .map(|(part, (step, frame))| {
            let info = source.frame(step, frame)?;
            Ok(CollectionEntry {
                timestep: info.value,
                part,
                file: frame_file_name(step, frame),
            })
        })
        .collect()
}

pub fn render_collection(entries: &[CollectionEntry]) -> Result<String> {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\"?>\n");
    out.push_str(
        "<VTKFile type=\"Collection\" version=\"1.0\" byte_order=\"LittleEndian\" header_type=\"UInt64\">\n",
    );
    out.push_str("  <Collection>\n");
    for entry in entries {
        writeln!(
            out,
            "    <DataSet timestep=\"{}\" part=\"{}\" file=\"{}\"/>",
            entry.timestep,
            entry.part,
            escape_attr(&entry.file)
        )?;
    }
    out.push_str("  </Collection>\n");
    out.push_str("</VTKFile>\n");
    Ok(out)
}

pub fn write_collection(path: impl AsRef<Path>, entries: &[CollectionEntry]) -> Result<()> {
    fs::write(path, render_collection(entries)?)?;
    Ok(())
}
