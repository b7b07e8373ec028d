//! Maps a field output onto a VTK attribute class.

use odbx_model::{DataKind, FieldOutput, Position};

use crate::error::{ConvertError, Result};

/// VTK attribute class. The declaration order is the order classes are
/// listed in a `PointData` / `CellData` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttributeClass {
    Tensors,
    Vectors,
    Scalars,
}

impl AttributeClass {
    pub fn as_str(self) -> &'static str {
        match self {
            AttributeClass::Tensors => "Tensors",
            AttributeClass::Vectors => "Vectors",
            AttributeClass::Scalars => "Scalars",
        }
    }

    pub fn from_kind(kind: DataKind) -> Self {
        match kind {
            DataKind::Scalar => AttributeClass::Scalars,
            DataKind::Vector => AttributeClass::Vectors,
            DataKind::Tensor3dFull
            | DataKind::Tensor3dSurface
            | DataKind::Tensor3dPlanar
            | DataKind::Tensor2dSurface
            | DataKind::Tensor2dPlanar => AttributeClass::Tensors,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedField {
    pub class: AttributeClass,
    pub component_labels: Vec<String>,
    pub position: Position,
}

impl ClassifiedField {
    pub fn component_count(&self) -> usize {
        self.component_labels.len()
    }
}

/// Classify a field. A field must declare exactly one location.
///
/// Scalars without component labels get the single label `"0"`. Vectors
/// and tensors without labels get positional labels `0..N`, where `N` is
/// the widest data row at the declared location.
pub fn classify_field(field: &FieldOutput) -> Result<ClassifiedField> {
    let position = match field.locations.as_slice() {
        [position] => *position,
        other => {
            return Err(ConvertError::LocationCount {
                field: field.name.clone(),
                count: other.len(),
            });
        }
    };

    let class = AttributeClass::from_kind(field.kind);
    let mut component_labels = field.component_labels.clone();
    if component_labels.is_empty() {
        let width = match class {
            AttributeClass::Scalars => 1,
            _ => field
                .blocks
                .iter()
                .filter(|b| b.position == position)
                .flat_map(|b| b.data.iter().map(Vec::len))
                .max()
                .unwrap_or(0),
        };
        component_labels = (0..width).map(|i| i.to_string()).collect();
    }

    Ok(ClassifiedField {
        class,
        component_labels,
        position,
    })
}
