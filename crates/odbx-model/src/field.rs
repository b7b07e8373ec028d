//! Field outputs and the data blocks they are split into.
//!
//! A field output holds one block per (instance, position, section point,
//! element family) combination. Blocks are read-only and regenerated for
//! every field of every frame.

use serde::{Deserialize, Serialize};

/// Where the values of a field are defined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Position {
    /// At nodes
    Nodal,
    /// At element integration points
    IntegrationPoint,
    /// Reduced to the element centroid
    Centroid,
    /// Extrapolated to element nodes
    ElementNodal,
}

/// Declared data type of a field output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataKind {
    #[serde(rename = "SCALAR")]
    Scalar,
    #[serde(rename = "VECTOR")]
    Vector,
    #[serde(rename = "TENSOR_3D_FULL")]
    Tensor3dFull,
    #[serde(rename = "TENSOR_3D_SURFACE")]
    Tensor3dSurface,
    #[serde(rename = "TENSOR_3D_PLANAR")]
    Tensor3dPlanar,
    #[serde(rename = "TENSOR_2D_SURFACE")]
    Tensor2dSurface,
    #[serde(rename = "TENSOR_2D_PLANAR")]
    Tensor2dPlanar,
}

/// A layered location (e.g. a ply) inside an element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SectionPoint {
    pub number: i32,
    /// Human-readable description, appended to output array names
    pub description: String,
}

impl SectionPoint {
    pub fn new(number: i32, description: impl Into<String>) -> Self {
        Self {
            number,
            description: description.into(),
        }
    }
}

/// Values of one field for one instance at one position.
///
/// `labels` and `data` are parallel: row `i` of `data` belongs to
/// `labels[i]`. Integration-point blocks repeat each element label once per
/// integration point and carry the 1-based point number of every row in
/// `integration_points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataBlock {
    /// Name of the instance the labels belong to
    pub instance: String,
    pub position: Position,
    #[serde(default)]
    pub section_point: Option<SectionPoint>,
    /// Node labels for nodal blocks, element labels otherwise
    pub labels: Vec<i32>,
    /// One row of component values per label
    pub data: Vec<Vec<f64>>,
    #[serde(default)]
    pub integration_points: Option<Vec<u32>>,
    /// Orientation quaternion `(q1, q2, q3, w)` per row
    #[serde(default)]
    pub local_coord_system: Option<Vec<Vec<f64>>>,
}

impl DataBlock {
    /// Create a block without section point, integration points or orientation
    pub fn new(
        instance: impl Into<String>,
        position: Position,
        labels: Vec<i32>,
        data: Vec<Vec<f64>>,
    ) -> Self {
        Self {
            instance: instance.into(),
            position,
            section_point: None,
            labels,
            data,
            integration_points: None,
            local_coord_system: None,
        }
    }

    pub fn with_section_point(mut self, section_point: SectionPoint) -> Self {
        self.section_point = Some(section_point);
        self
    }

    pub fn with_integration_points(mut self, points: Vec<u32>) -> Self {
        self.integration_points = Some(points);
        self
    }

    pub fn with_local_coord_system(mut self, quaternions: Vec<Vec<f64>>) -> Self {
        self.local_coord_system = Some(quaternions);
        self
    }

    /// Highest integration point number in this block, if it has any
    pub fn max_integration_point(&self) -> Option<u32> {
        self.integration_points
            .as_ref()
            .and_then(|points| points.iter().copied().max())
    }
}

/// A named result defined over nodes or elements at one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOutput {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DataKind,
    #[serde(default)]
    pub component_labels: Vec<String>,
    /// Declared data locations; exactly one is supported
    pub locations: Vec<Position>,
    #[serde(default)]
    pub blocks: Vec<DataBlock>,
}

impl FieldOutput {
    pub fn new(
        name: impl Into<String>,
        kind: DataKind,
        component_labels: Vec<String>,
        location: Position,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            component_labels,
            locations: vec![location],
            blocks: Vec::new(),
        }
    }

    pub fn with_block(mut self, block: DataBlock) -> Self {
        self.blocks.push(block);
        self
    }

    /// Blocks of one instance at one position, in native order
    pub fn blocks_at<'a, 'n>(
        &'a self,
        instance: &'n str,
        position: Position,
    ) -> impl Iterator<Item = &'a DataBlock> + use<'a, 'n> {
        self.blocks
            .iter()
            .filter(move |b| b.instance == instance && b.position == position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_use_solver_spelling() {
        let raw = r#"["NODAL", "INTEGRATION_POINT", "CENTROID", "ELEMENT_NODAL"]"#;
        let parsed: Vec<Position> = serde_json::from_str(raw).expect("positions should parse");
        assert_eq!(
            parsed,
            vec![
                Position::Nodal,
                Position::IntegrationPoint,
                Position::Centroid,
                Position::ElementNodal
            ]
        );
    }

    #[test]
    fn max_integration_point_reads_block_numbers() {
        let block = DataBlock::new("A", Position::IntegrationPoint, vec![1, 1, 1], vec![vec![0.0]; 3])
            .with_integration_points(vec![1, 2, 3]);
        assert_eq!(block.max_integration_point(), Some(3));

        let plain = DataBlock::new("A", Position::Centroid, vec![1], vec![vec![0.0]]);
        assert_eq!(plain.max_integration_point(), None);
    }

    #[test]
    fn blocks_at_filters_by_instance_and_position() {
        let field = FieldOutput::new("S", DataKind::Tensor3dFull, vec![], Position::IntegrationPoint)
            .with_block(DataBlock::new("A", Position::IntegrationPoint, vec![1], vec![vec![1.0]]))
            .with_block(DataBlock::new("A", Position::Centroid, vec![1], vec![vec![2.0]]))
            .with_block(DataBlock::new("B", Position::Centroid, vec![1], vec![vec![3.0]]));

        let centroid: Vec<_> = field.blocks_at("A", Position::Centroid).collect();
        assert_eq!(centroid.len(), 1);
        assert_eq!(centroid[0].data[0][0], 2.0);
    }
}
