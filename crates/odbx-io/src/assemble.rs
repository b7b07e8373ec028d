//! Scatters per-instance data blocks into one densely indexed buffer.
//!
//! Rows start at zero and are overwritten by every block that covers them,
//! in block order. Rows no block covers stay zero.

use odbx_model::DataBlock;

use crate::error::{ConvertError, Result};
use crate::index::LabelIndex;
use crate::integration::reshape_block;

/// Row-major `rows × components` array of values
#[derive(Debug, Clone, PartialEq)]
pub struct OutputBuffer {
    rows: usize,
    components: usize,
    values: Vec<f64>,
}

impl OutputBuffer {
    pub fn zeros(rows: usize, components: usize) -> Self {
        Self {
            rows,
            components,
            values: vec![0.0; rows * components],
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn component_count(&self) -> usize {
        self.components
    }

    pub fn row(&self, index: usize) -> &[f64] {
        let start = index * self.components;
        &self.values[start..start + self.components]
    }

    pub fn row_mut(&mut self, index: usize) -> &mut [f64] {
        let start = index * self.components;
        &mut self.values[start..start + self.components]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact(0) panics; a zero-width buffer still has `rows` rows
        (0..self.rows).map(move |i| self.row(i))
    }

    /// Write `values` at the start of row `index`; trailing components
    /// keep their current value
    pub fn write_row(&mut self, array: &str, index: usize, values: &[f64]) -> Result<()> {
        if values.len() > self.components {
            return Err(ConvertError::ComponentOverflow {
                array: array.to_string(),
                got: values.len(),
                width: self.components,
            });
        }
        self.row_mut(index)[..values.len()].copy_from_slice(values);
        Ok(())
    }
}

/// Assemble the buffer of one array.
///
/// Blocks carrying integration point numbers are regrouped to one row per
/// element first (see [`reshape_block`]).
pub fn assemble<'b>(
    array: &str,
    blocks: impl IntoIterator<Item = &'b DataBlock>,
    index: &LabelIndex,
    total: usize,
    components: usize,
) -> Result<OutputBuffer> {
    let mut buffer = OutputBuffer::zeros(total, components);

    for block in blocks {
        if block.integration_points.is_some() {
            let grouped = reshape_block(array, block)?;
            for (label, row) in grouped.labels.iter().zip(&grouped.rows) {
                let at = index.resolve(&block.instance, *label)?;
                buffer.write_row(array, at, row)?;
            }
        } else {
            if block.labels.len() != block.data.len() {
                return Err(ConvertError::InvalidData(format!(
                    "{array}: block of instance {} has {} labels for {} rows",
                    block.instance,
                    block.labels.len(),
                    block.data.len()
                )));
            }
            for (label, row) in block.labels.iter().zip(&block.data) {
                let at = index.resolve(&block.instance, *label)?;
                buffer.write_row(array, at, row)?;
            }
        }
    }

    Ok(buffer)
}
