//! Element type tag → VTK cell kind lookup.
//!
//! Tags are matched by substring against an ordered pattern list; the first
//! pattern contained in the tag wins, so `C3D8R` and `DC3D8` both resolve
//! through `C3D8`.

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};

/// VTK cell type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Vertex = 1,
    Line = 3,
    Triangle = 5,
    Quad = 9,
    Tetra = 10,
    Hexahedron = 12,
    Wedge = 13,
    Pyramid = 14,
    QuadraticEdge = 21,
    QuadraticTriangle = 22,
    QuadraticQuad = 23,
    QuadraticTetra = 24,
    QuadraticHexahedron = 25,
    QuadraticWedge = 26,
    BiquadraticQuad = 28,
}

impl CellKind {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// One entry of the pattern table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellPattern {
    pub pattern: String,
    pub cell: CellKind,
}

impl CellPattern {
    pub fn new(pattern: impl Into<String>, cell: CellKind) -> Self {
        Self {
            pattern: pattern.into(),
            cell,
        }
    }
}

/// Built-in table. Solid families come first, then shells, beams and
/// rigid surfaces.
pub fn default_patterns() -> Vec<CellPattern> {
    vec![
        CellPattern::new("C3D4", CellKind::Tetra),
        CellPattern::new("C3D6", CellKind::Wedge),
        CellPattern::new("C3D8", CellKind::Hexahedron),
        CellPattern::new("C3D10", CellKind::QuadraticTetra),
        CellPattern::new("C3D15", CellKind::QuadraticWedge),
        CellPattern::new("C3D20", CellKind::QuadraticHexahedron),
        CellPattern::new("S3", CellKind::Triangle),
        CellPattern::new("S4", CellKind::Quad),
        CellPattern::new("S8", CellKind::QuadraticQuad),
        CellPattern::new("S9", CellKind::BiquadraticQuad),
        CellPattern::new("B31", CellKind::Line),
        CellPattern::new("R3D3", CellKind::Triangle),
        CellPattern::new("R3D4", CellKind::Quad),
        CellPattern::new("B32", CellKind::QuadraticEdge),
        CellPattern::new("T3D2", CellKind::Line),
        CellPattern::new("T3D3", CellKind::QuadraticEdge),
    ]
}

/// Immutable pattern table, built once per process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementTypeCatalog {
    patterns: Vec<CellPattern>,
}

impl Default for ElementTypeCatalog {
    fn default() -> Self {
        Self::new(default_patterns())
    }
}

impl ElementTypeCatalog {
    pub fn new(patterns: Vec<CellPattern>) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &[CellPattern] {
        &self.patterns
    }

    /// Resolve a solver element tag to its cell kind
    pub fn classify(&self, tag: &str) -> Result<CellKind> {
        self.patterns
            .iter()
            .find(|p| tag.contains(p.pattern.as_str()))
            .map(|p| p.cell)
            .ok_or_else(|| ConvertError::UnknownElementType(tag.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_solid_and_shell_variants() {
        let catalog = ElementTypeCatalog::default();
        assert_eq!(catalog.classify("C3D8R").unwrap(), CellKind::Hexahedron);
        assert_eq!(catalog.classify("C3D10M").unwrap(), CellKind::QuadraticTetra);
        assert_eq!(catalog.classify("C3D20R").unwrap(), CellKind::QuadraticHexahedron);
        assert_eq!(catalog.classify("S4R").unwrap(), CellKind::Quad);
        assert_eq!(catalog.classify("CPS3").unwrap(), CellKind::Triangle);
        assert_eq!(catalog.classify("S8R5").unwrap(), CellKind::QuadraticQuad);
        assert_eq!(catalog.classify("R3D4").unwrap(), CellKind::Quad);
        assert_eq!(catalog.classify("B31").unwrap().code(), 3);
        assert_eq!(catalog.classify("S9R5").unwrap().code(), 28);
    }

    #[test]
    fn first_matching_pattern_wins() {
        let catalog = ElementTypeCatalog::new(vec![
            CellPattern::new("C3D", CellKind::Vertex),
            CellPattern::new("C3D8", CellKind::Hexahedron),
        ]);
        assert_eq!(catalog.classify("C3D8").unwrap(), CellKind::Vertex);
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let catalog = ElementTypeCatalog::default();
        let err = catalog.classify("SPRINGA").expect_err("no pattern matches");
        assert!(matches!(err, ConvertError::UnknownElementType(tag) if tag == "SPRINGA"));
    }
}
