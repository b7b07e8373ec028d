//! ASCII `<DataArray>` rendering.

use std::fmt::{self, Write};

use crate::assemble::OutputBuffer;
use crate::error::Result;

/// Escape a value for use inside a double-quoted XML attribute
pub(crate) fn escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render one attribute array. Missing labels fall back to the component
/// position; every buffer row is written, in global index order.
pub fn render_data_array(
    name: &str,
    component_labels: &[String],
    buffer: &OutputBuffer,
) -> Result<String> {
    let mut out = String::new();
    write_data_array(&mut out, name, component_labels, buffer)?;
    Ok(out)
}

fn write_data_array(
    out: &mut String,
    name: &str,
    component_labels: &[String],
    buffer: &OutputBuffer,
) -> fmt::Result {
    let components = buffer.component_count();
    write!(
        out,
        "<DataArray type=\"Float32\" Name=\"{}\" NumberOfComponents=\"{}\"",
        escape_attr(name),
        components
    )?;
    for i in 0..components {
        let label = component_labels
            .get(i)
            .map(|l| escape_attr(l))
            .unwrap_or_else(|| i.to_string());
        write!(out, " ComponentName{i}=\"{label}\"")?;
    }
    out.push_str(" format=\"ascii\">\n");

    for row in buffer.rows() {
        for (i, value) in row.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            write!(out, "{value}")?;
        }
        out.push('\n');
    }
    out.push_str("</DataArray>\n");
    Ok(())
}
