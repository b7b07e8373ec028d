//! Error types for odbx-io

use odbx_model::SourceError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConvertError>;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("{0} element type not found in the cell catalog")]
    UnknownElementType(String),

    #[error(
        "field {field}: cannot reshape {rows} rows into elements of {points} integration points"
    )]
    Reshape {
        field: String,
        rows: usize,
        points: usize,
    },

    #[error("field {field} declares {count} data locations, exactly one is supported")]
    LocationCount { field: String, count: usize },

    #[error("label {label} of instance {instance} is not in the global index")]
    UnknownLabel { instance: String, label: i32 },

    #[error("label {label} appears twice in instance {instance}")]
    DuplicateLabel { instance: String, label: i32 },

    #[error("instance {0} is selected more than once")]
    DuplicateInstance(String),

    #[error("array {array}: row has {got} components, array holds {width}")]
    ComponentOverflow {
        array: String,
        got: usize,
        width: usize,
    },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("formatting error: {0}")]
    Format(#[from] std::fmt::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}
