//! Conversion settings, built once at startup and passed down explicitly.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{CellPattern, ElementTypeCatalog, default_patterns};
use crate::error::Result;

pub const MATERIAL_ORIENTATION: &str = "Material_Orientation";

/// Material orientation array settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrientationConfig {
    pub enabled: bool,
    /// Name of the emitted cell array
    pub array_name: String,
    /// Field whose centroid blocks carry the local coordinate system
    pub source_field: String,
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            array_name: MATERIAL_ORIENTATION.to_string(),
            source_field: "S".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    pub element_types: Vec<CellPattern>,
    pub orientation: OrientationConfig,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            element_types: default_patterns(),
            orientation: OrientationConfig::default(),
        }
    }
}

impl ConversionConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn catalog(&self) -> ElementTypeCatalog {
        ElementTypeCatalog::new(self.element_types.clone())
    }
}
