//! VTU XML writer for ParaView visualization
//!
//! Builds the unstructured grid of the selected instances once and renders
//! one document per frame around the attribute arrays of that frame.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use odbx_io::{ConversionConfig, GlobalIndex, MeshGeometry, UnstructuredGridWriter, AttributeSection};
//! use odbx_model::ResultSource;
//!
//! let archive = odbx_io::load_archive("job.json")?;
//! let instances = vec![archive.instance("PART-1-1")?];
//! let index = GlobalIndex::build(instances.iter().copied())?;
//! let catalog = ConversionConfig::default().catalog();
//! let geometry = MeshGeometry::build(&instances, &index, &catalog)?;
//! let writer = UnstructuredGridWriter::new(&geometry);
//! writer.write("Step-1_0.vtu", AttributeSection::default(), AttributeSection::default())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;

use odbx_model::Instance;

use crate::catalog::{CellKind, ElementTypeCatalog};
use crate::classify::AttributeClass;
use crate::data_array::escape_attr;
use crate::error::Result;
use crate::index::GlobalIndex;

/// Points and cells of the selected instances, in global index order
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGeometry {
    pub points: Vec<[f64; 3]>,
    /// Global node indices of every cell
    pub connectivity: Vec<Vec<usize>>,
    /// Running sum of connectivity lengths, one per cell
    pub offsets: Vec<usize>,
    pub cell_types: Vec<CellKind>,
}

impl MeshGeometry {
    /// Walk the instances in selection order. Fails on the first element
    /// tag the catalog does not know.
    pub fn build(
        instances: &[&Instance],
        index: &GlobalIndex,
        catalog: &ElementTypeCatalog,
    ) -> Result<Self> {
        let mut geometry = MeshGeometry {
            points: Vec::with_capacity(index.node_count()),
            connectivity: Vec::with_capacity(index.element_count()),
            offsets: Vec::with_capacity(index.element_count()),
            cell_types: Vec::with_capacity(index.element_count()),
        };

        let mut offset = 0usize;
        for instance in instances {
            geometry
                .points
                .extend(instance.nodes.iter().map(|n| n.coordinates));

            for element in &instance.elements {
                let cell = element
                    .connectivity
                    .iter()
                    .map(|&label| index.nodes.resolve(&instance.name, label))
                    .collect::<Result<Vec<_>>>()?;
                offset += cell.len();
                geometry.connectivity.push(cell);
                geometry.offsets.push(offset);
                geometry.cell_types.push(catalog.classify(&element.type_tag)?);
            }
        }

        Ok(geometry)
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn cell_count(&self) -> usize {
        self.cell_types.len()
    }
}

/// Rendered arrays of one `PointData` or `CellData` section, with their
/// names grouped by attribute class
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeSection {
    names: BTreeMap<AttributeClass, Vec<String>>,
    arrays: String,
}

impl AttributeSection {
    pub fn push(&mut self, class: AttributeClass, name: impl Into<String>, rendered: &str) {
        self.names.entry(class).or_default().push(name.into());
        self.arrays.push_str(rendered);
    }

    pub fn names(&self, class: AttributeClass) -> &[String] {
        self.names.get(&class).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.names.values().all(Vec::is_empty)
    }

    /// `Tensors="'S','E'" Vectors="'U'"`
    fn class_attributes(&self) -> Result<String> {
        let mut out = String::new();
        for (class, names) in &self.names {
            if names.is_empty() {
                continue;
            }
            let list: Vec<String> = names.iter().map(|n| format!("'{}'", escape_attr(n))).collect();
            write!(out, " {}=\"{}\"", class.as_str(), list.join(","))?;
        }
        Ok(out)
    }

    fn render(&self, out: &mut String, tag: &str) -> Result<()> {
        writeln!(out, "      <{tag}{}>", self.class_attributes()?)?;
        out.push_str(&self.arrays);
        writeln!(out, "      </{tag}>")?;
        Ok(())
    }
}

/// VTU writer for one mesh geometry
pub struct UnstructuredGridWriter<'a> {
    geometry: &'a MeshGeometry,
}

impl<'a> UnstructuredGridWriter<'a> {
    pub fn new(geometry: &'a MeshGeometry) -> Self {
        Self { geometry }
    }

    /// Render a complete document
    pub fn render(&self, point_data: AttributeSection, cell_data: AttributeSection) -> Result<String> {
        let mut out = String::new();
        self.write_vtu_header(&mut out)?;
        self.write_vtu_points(&mut out)?;
        point_data.render(&mut out, "PointData")?;
        cell_data.render(&mut out, "CellData")?;
        self.write_vtu_cells(&mut out)?;
        self.write_vtu_footer(&mut out);
        Ok(out)
    }

    /// Render and write the document. Nothing is written if rendering
    /// fails upstream, since arrays are complete before this call.
    pub fn write<P: AsRef<Path>>(
        &self,
        path: P,
        point_data: AttributeSection,
        cell_data: AttributeSection,
    ) -> Result<()> {
        let doc = self.render(point_data, cell_data)?;
        fs::write(path, doc)?;
        Ok(())
    }

    fn write_vtu_header(&self, out: &mut String) -> fmt::Result {
        out.push_str("<?xml version=\"1.0\"?>\n");
        out.push_str(
            "<VTKFile type=\"UnstructuredGrid\" version=\"1.0\" byte_order=\"LittleEndian\">\n",
        );
        out.push_str("  <UnstructuredGrid>\n");
        writeln!(
            out,
            "    <Piece NumberOfPoints=\"{}\" NumberOfCells=\"{}\">",
            self.geometry.point_count(),
            self.geometry.cell_count()
        )
    }

    fn write_vtu_points(&self, out: &mut String) -> fmt::Result {
        out.push_str("      <Points>\n");
        out.push_str("<DataArray type=\"Float64\" NumberOfComponents=\"3\" format=\"ascii\">\n");
        for [x, y, z] in &self.geometry.points {
            writeln!(out, "{x} {y} {z}")?;
        }
        out.push_str("</DataArray>\n");
        out.push_str("      </Points>\n");
        Ok(())
    }

    fn write_vtu_cells(&self, out: &mut String) -> fmt::Result {
        out.push_str("      <Cells>\n");

        out.push_str("<DataArray type=\"Int64\" Name=\"connectivity\" format=\"ascii\">\n");
        for cell in &self.geometry.connectivity {
            let line: Vec<String> = cell.iter().map(usize::to_string).collect();
            writeln!(out, "{}", line.join(" "))?;
        }
        out.push_str("</DataArray>\n");

        out.push_str("<DataArray type=\"Int64\" Name=\"offsets\" format=\"ascii\">\n");
        for offset in &self.geometry.offsets {
            writeln!(out, "{offset}")?;
        }
        out.push_str("</DataArray>\n");

        out.push_str("<DataArray type=\"Int64\" Name=\"types\" format=\"ascii\">\n");
        for kind in &self.geometry.cell_types {
            writeln!(out, "{}", kind.code())?;
        }
        out.push_str("</DataArray>\n");

        out.push_str("      </Cells>\n");
        Ok(())
    }

    fn write_vtu_footer(&self, out: &mut String) {
        out.push_str("    </Piece>\n");
        out.push_str("  </UnstructuredGrid>\n");
        out.push_str("</VTKFile>\n");
    }
}
