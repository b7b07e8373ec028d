//! History outputs → rectangular CSV table.
//!
//! One column per (step, region, output), named `step_region_output`, in
//! discovery order. Shorter series are zero-padded at the tail. Only the
//! value of each `(time, value)` sample is kept.

use std::fs::File;
use std::io;
use std::path::Path;

use odbx_model::ResultSource;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryTable {
    pub headers: Vec<String>,
    /// `height × width`, row-major
    pub rows: Vec<Vec<f64>>,
}

impl HistoryTable {
    pub fn collect<'s, S: ResultSource + ?Sized>(
        source: &S,
        steps: impl IntoIterator<Item = &'s str>,
    ) -> Result<Self> {
        let mut headers = Vec::new();
        let mut columns: Vec<Vec<f64>> = Vec::new();

        for step in steps {
            for region in source.history_regions(step)? {
                for output in &region.outputs {
                    headers.push(format!("{step}_{}_{}", region.name, output.name));
                    columns.push(output.data.iter().map(|&(_, value)| value).collect());
                }
            }
        }

        let height = columns.iter().map(Vec::len).max().unwrap_or(0);
        let rows = (0..height)
            .map(|i| {
                columns
                    .iter()
                    .map(|column| column.get(i).copied().unwrap_or(0.0))
                    .collect()
            })
            .collect();

        Ok(Self { headers, rows })
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        if self.headers.is_empty() {
            wtr.flush()?;
            return Ok(());
        }
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(|v| format!("{v:.6}")))?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        self.write_csv(File::create(path)?)
    }
}
