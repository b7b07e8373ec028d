//! Result data model shared by the odbx transcoder.
//!
//! This crate provides:
//! - **Mesh records**: nodes, elements and named instances
//! - **Field outputs**: typed per-frame results split into data blocks
//! - **History outputs**: scalar time series grouped by region
//! - **`ResultSource`**: the read-only contract a result container exposes
//! - **`ResultArchive`**: an in-memory container that can be deserialized

pub mod archive;
pub mod field;
pub mod history;
pub mod mesh;
pub mod source;

pub use archive::{ArchiveFrame, ArchiveStep, ResultArchive};
pub use field::{DataBlock, DataKind, FieldOutput, Position, SectionPoint};
pub use history::{HistoryOutput, HistoryRegion};
pub use mesh::{Element, Instance, Node};
pub use source::{FrameInfo, ResultSource, SourceError};
