//! Splits a layered field into one array per section point.
//!
//! Pass one (`scan_field`) walks every block of the selected instances at
//! the field's position; pass two (`split_arrays`) names the arrays to emit.

use odbx_model::{DataBlock, FieldOutput, Position, SectionPoint};

/// What pass one found for a field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldScan {
    /// Distinct section points, in discovery order
    pub section_points: Vec<SectionPoint>,
    /// Largest integration point count of any block, at least 1
    pub max_integration_points: usize,
}

pub fn scan_field(field: &FieldOutput, instances: &[String], position: Position) -> FieldScan {
    let mut section_points: Vec<SectionPoint> = Vec::new();
    let mut max_integration_points = 1usize;

    for instance in instances {
        for block in field.blocks_at(instance, position) {
            if let Some(sp) = &block.section_point
                && !section_points.contains(sp)
            {
                section_points.push(sp.clone());
            }
            if let Some(n) = block.max_integration_point() {
                max_integration_points = max_integration_points.max(n as usize);
            }
        }
    }

    FieldScan {
        section_points,
        max_integration_points,
    }
}

/// One output array of a field: its name and the section point it is
/// restricted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArraySlice<'s> {
    pub name: String,
    pub section_point: Option<&'s SectionPoint>,
}

/// Without section points: one array named `base`. With them: one array
/// per section point, named `base + description`. Names are not
/// deduplicated.
pub fn split_arrays<'s>(base: &str, scan: &'s FieldScan) -> Vec<ArraySlice<'s>> {
    if scan.section_points.is_empty() {
        return vec![ArraySlice {
            name: base.to_string(),
            section_point: None,
        }];
    }
    scan.section_points
        .iter()
        .map(|sp| ArraySlice {
            name: format!("{base}{}", sp.description),
            section_point: Some(sp),
        })
        .collect()
}

/// Blocks feeding one array: selected instances in order, native block
/// order inside each, restricted to `section_point` when given
pub fn matching_blocks<'a>(
    field: &'a FieldOutput,
    instances: &'a [String],
    position: Position,
    section_point: Option<&'a SectionPoint>,
) -> impl Iterator<Item = &'a DataBlock> + use<'a> {
    instances
        .iter()
        .flat_map(move |instance| field.blocks_at(instance, position))
        .filter(move |block| match section_point {
            Some(sp) => block.section_point.as_ref() == Some(sp),
            None => true,
        })
}
