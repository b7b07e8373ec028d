//! Result transcoding for the odbx converter.
//!
//! This crate provides:
//! - **Global indexing** of nodes and elements across instances
//! - **Field classification** into VTK scalars, vectors and tensors
//! - **Section point splitting** and **integration point expansion**
//! - **Sorted assembly** of data blocks into dense arrays
//! - **Material orientation** vectors from quaternion fields
//! - **VTU/PVD export** for ParaView visualization
//! - **History tables** (CSV) and **result descriptors** (JSON)
//! - **JSON result archives** implementing `odbx_model::ResultSource`

pub mod archive;
pub mod assemble;
pub mod catalog;
pub mod classify;
pub mod collection;
pub mod config;
pub mod convert;
pub mod data_array;
pub mod error;
pub mod header;
pub mod history;
pub mod index;
pub mod integration;
pub mod orientation;
pub mod sections;
pub mod selection;
pub mod vtk_writer;

pub use archive::{load_archive, save_archive};
pub use assemble::{OutputBuffer, assemble};
pub use catalog::{CellKind, CellPattern, ElementTypeCatalog};
pub use classify::{AttributeClass, ClassifiedField, classify_field};
pub use collection::{CollectionEntry, build_collection, render_collection, write_collection};
pub use config::{ConversionConfig, OrientationConfig};
pub use convert::{FrameOutcome, OutputLayout, Transcoder};
pub use data_array::render_data_array;
pub use error::{ConvertError, Result};
pub use header::{ResultDescriptor, descriptor_path};
pub use history::HistoryTable;
pub use index::{GlobalIndex, LabelIndex};
pub use orientation::quaternion_to_direction;
pub use sections::{FieldScan, scan_field, split_arrays};
pub use selection::{FrameSelection, StepFrames};
pub use vtk_writer::{AttributeSection, MeshGeometry, UnstructuredGridWriter};
