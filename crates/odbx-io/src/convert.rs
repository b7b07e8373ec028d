//! Per-frame transcoding pipeline.
//!
//! The global index and the mesh geometry are built once per run; every
//! frame then classifies, splits and assembles its field outputs against
//! them and renders one VTU document. Frames share nothing mutable, so
//! they can be converted in any order or in parallel.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use odbx_model::{FieldOutput, Position, ResultSource, SourceError};
use rayon::prelude::*;

use crate::assemble::assemble;
use crate::catalog::ElementTypeCatalog;
use crate::classify::{AttributeClass, classify_field};
use crate::collection::frame_file_name;
use crate::config::OrientationConfig;
use crate::data_array::render_data_array;
use crate::error::Result;
use crate::index::{GlobalIndex, LabelIndex};
use crate::integration::{centroid_name, expanded_labels, integration_points_name};
use crate::orientation::orientation_buffer;
use crate::sections::{FieldScan, matching_blocks, scan_field, split_arrays};
use crate::selection::FrameSelection;
use crate::vtk_writer::{AttributeSection, MeshGeometry, UnstructuredGridWriter};

/// File stem of a result container: everything before the first `.`
pub fn input_stem(input: &Path) -> String {
    input
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.split('.').next())
        .unwrap_or_default()
        .to_string()
}

/// Where one conversion run writes its files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    dir: PathBuf,
    stem: String,
}

impl OutputLayout {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
        }
    }

    /// `{input_dir}/{stem}{suffix}/`
    pub fn for_input(input: &Path, suffix: &str) -> Self {
        let stem = format!("{}{suffix}", input_stem(input));
        let dir = input.parent().unwrap_or_else(|| Path::new("")).join(&stem);
        Self { dir, stem }
    }

    /// Create the output directory
    pub fn create(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn frame_path(&self, step: &str, frame: usize) -> PathBuf {
        self.dir.join(frame_file_name(step, frame))
    }

    pub fn collection_path(&self) -> PathBuf {
        self.dir.join(format!("{}.pvd", self.stem))
    }

    pub fn history_path(&self) -> PathBuf {
        self.dir.join(format!("{}.csv", self.stem))
    }
}

/// Result of converting one frame
#[derive(Debug)]
pub struct FrameOutcome {
    pub step: String,
    pub frame: usize,
    pub result: Result<PathBuf>,
}

/// What one emitted array is made of
struct ArrayPlan<'s> {
    name: &'s str,
    class: AttributeClass,
    position: Position,
    labels: &'s [String],
}

pub struct Transcoder<'a, S: ResultSource + ?Sized> {
    source: &'a S,
    orientation: &'a OrientationConfig,
    instances: Vec<String>,
    index: GlobalIndex,
    geometry: MeshGeometry,
}

impl<'a, S: ResultSource + ?Sized> Transcoder<'a, S> {
    /// Resolve the selected instances and build the index and geometry.
    /// Unknown instances and unknown element types fail the whole run.
    pub fn new(
        source: &'a S,
        instances: &[String],
        catalog: &ElementTypeCatalog,
        orientation: &'a OrientationConfig,
    ) -> Result<Self> {
        let selected = instances
            .iter()
            .map(|name| source.instance(name))
            .collect::<std::result::Result<Vec<_>, SourceError>>()?;
        let index = GlobalIndex::build(selected.iter().copied())?;
        let geometry = MeshGeometry::build(&selected, &index, catalog)?;
        info!(
            "indexed {} instance(s): {} nodes, {} elements",
            selected.len(),
            index.node_count(),
            index.element_count()
        );

        Ok(Self {
            source,
            orientation,
            instances: instances.to_vec(),
            index,
            geometry,
        })
    }

    pub fn index(&self) -> &GlobalIndex {
        &self.index
    }

    pub fn geometry(&self) -> &MeshGeometry {
        &self.geometry
    }

    /// Build the point and cell attribute sections of one frame
    pub fn frame_sections(
        &self,
        step: &str,
        frame: usize,
    ) -> Result<(AttributeSection, AttributeSection)> {
        self.source.frame(step, frame)?;
        let mut point_data = AttributeSection::default();
        let mut cell_data = AttributeSection::default();

        for name in self.source.field_names(step, frame)? {
            let field = self.source.field_output(step, frame, &name)?;
            self.push_field(field, &mut point_data, &mut cell_data)?;
        }
        self.push_orientation(step, frame, &mut cell_data)?;

        Ok((point_data, cell_data))
    }

    pub fn render_frame(&self, step: &str, frame: usize) -> Result<String> {
        let (point_data, cell_data) = self.frame_sections(step, frame)?;
        UnstructuredGridWriter::new(&self.geometry).render(point_data, cell_data)
    }

    /// Convert one frame into `{step}_{frame}.vtu` inside the layout
    /// directory, which must already exist
    pub fn write_frame(&self, layout: &OutputLayout, step: &str, frame: usize) -> Result<PathBuf> {
        let (point_data, cell_data) = self.frame_sections(step, frame)?;
        let path = layout.frame_path(step, frame);
        UnstructuredGridWriter::new(&self.geometry).write(&path, point_data, cell_data)?;
        info!("wrote {}", path.display());
        Ok(path)
    }

    /// Convert every selected frame, sequentially
    pub fn write_frames(&self, layout: &OutputLayout, selection: &FrameSelection) -> Vec<FrameOutcome> {
        selection
            .iter()
            .map(|(step, frame)| self.outcome(layout, step, frame))
            .collect()
    }

    fn outcome(&self, layout: &OutputLayout, step: &str, frame: usize) -> FrameOutcome {
        let result = self.write_frame(layout, step, frame);
        if let Err(err) = &result {
            warn!("step {step} frame {frame} failed: {err}");
        }
        FrameOutcome {
            step: step.to_string(),
            frame,
            result,
        }
    }

    fn push_field(
        &self,
        field: &FieldOutput,
        point_data: &mut AttributeSection,
        cell_data: &mut AttributeSection,
    ) -> Result<()> {
        let classified = classify_field(field)?;
        let scan = scan_field(field, &self.instances, classified.position);
        let class = classified.class;
        let labels = &classified.component_labels;

        match classified.position {
            Position::Nodal => {
                let plan = ArrayPlan {
                    name: &field.name,
                    class,
                    position: Position::Nodal,
                    labels,
                };
                self.push_arrays(field, &scan, &plan, &self.index.nodes, point_data)
            }
            Position::IntegrationPoint => {
                let centroid = centroid_name(&field.name);
                let plan = ArrayPlan {
                    name: &centroid,
                    class,
                    position: Position::Centroid,
                    labels,
                };
                self.push_arrays(field, &scan, &plan, &self.index.elements, cell_data)?;

                let expanded = integration_points_name(&field.name);
                let ip_labels = expanded_labels(labels, scan.max_integration_points);
                let plan = ArrayPlan {
                    name: &expanded,
                    class,
                    position: Position::IntegrationPoint,
                    labels: &ip_labels,
                };
                self.push_arrays(field, &scan, &plan, &self.index.elements, cell_data)
            }
            Position::Centroid => {
                let plan = ArrayPlan {
                    name: &field.name,
                    class,
                    position: Position::Centroid,
                    labels,
                };
                self.push_arrays(field, &scan, &plan, &self.index.elements, cell_data)
            }
            Position::ElementNodal => {
                warn!("skipping field {}: element-nodal output is not converted", field.name);
                Ok(())
            }
        }
    }

    fn push_arrays(
        &self,
        field: &FieldOutput,
        scan: &FieldScan,
        plan: &ArrayPlan<'_>,
        index: &LabelIndex,
        section: &mut AttributeSection,
    ) -> Result<()> {
        for slice in split_arrays(plan.name, scan) {
            let blocks = matching_blocks(field, &self.instances, plan.position, slice.section_point);
            let buffer = assemble(&slice.name, blocks, index, index.len(), plan.labels.len())?;
            debug!(
                "{} {}: {} x {}",
                plan.class.as_str(),
                slice.name,
                buffer.row_count(),
                buffer.component_count()
            );
            let rendered = render_data_array(&slice.name, plan.labels, &buffer)?;
            section.push(plan.class, slice.name, &rendered);
        }
        Ok(())
    }

    fn push_orientation(&self, step: &str, frame: usize, cell_data: &mut AttributeSection) -> Result<()> {
        if !self.orientation.enabled {
            return Ok(());
        }
        let field = match self
            .source
            .field_output(step, frame, &self.orientation.source_field)
        {
            Ok(field) => field,
            Err(SourceError::UnknownField { .. }) => {
                warn!(
                    "step {step} frame {frame} has no {} output, skipping {}",
                    self.orientation.source_field, self.orientation.array_name
                );
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let name = &self.orientation.array_name;
        let buffer = orientation_buffer(name, field, &self.instances, &self.index.elements)?;
        cell_data.push(
            AttributeClass::Vectors,
            name.as_str(),
            &render_data_array(name, &[], &buffer)?,
        );
        Ok(())
    }
}

impl<S: ResultSource + Sync + ?Sized> Transcoder<'_, S> {
    /// Convert every selected frame on the current rayon pool. Outcomes
    /// are returned in selection order.
    pub fn write_frames_parallel(
        &self,
        layout: &OutputLayout,
        selection: &FrameSelection,
    ) -> Vec<FrameOutcome> {
        let requests: Vec<(&str, usize)> = selection.iter().collect();
        requests
            .into_par_iter()
            .map(|(step, frame)| self.outcome(layout, step, frame))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_derives_from_input_name() {
        let layout = OutputLayout::for_input(Path::new("/runs/plate.odb.json"), "_a");
        assert_eq!(layout.dir(), Path::new("/runs/plate_a"));
        assert_eq!(layout.stem(), "plate_a");
        assert_eq!(layout.frame_path("Step-1", 4), PathBuf::from("/runs/plate_a/Step-1_4.vtu"));
        assert_eq!(layout.collection_path(), PathBuf::from("/runs/plate_a/plate_a.pvd"));
        assert_eq!(layout.history_path(), PathBuf::from("/runs/plate_a/plate_a.csv"));
    }

    #[test]
    fn input_stem_stops_at_first_dot() {
        assert_eq!(input_stem(Path::new("beam.odb")), "beam");
        assert_eq!(input_stem(Path::new("dir/beam")), "beam");
    }
}
