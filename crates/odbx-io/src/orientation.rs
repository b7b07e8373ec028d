//! Material orientation: quaternion per element → primary direction vector.
//!
//! The quaternion `(q1, q2, q3, w)` comes from the local coordinate system
//! attached to the centroid blocks of one field. When the field is layered,
//! only the first section point found is used.

use odbx_model::{FieldOutput, Position, SectionPoint};

use crate::assemble::OutputBuffer;
use crate::error::{ConvertError, Result};
use crate::index::LabelIndex;
use crate::sections::matching_blocks;

/// First row of the rotation matrix of `(q1, q2, q3, w)`
pub fn quaternion_to_direction(q: [f64; 4]) -> [f64; 3] {
    let [q1, q2, q3, w] = q;
    [
        w * w + q1 * q1 - q2 * q2 - q3 * q3,
        2.0 * (q1 * q2 - q3 * w),
        2.0 * (q1 * q3 + q2 * w),
    ]
}

/// First section point carried by any centroid block, walking the selected
/// instances in order
pub fn first_section_point<'f>(
    field: &'f FieldOutput,
    instances: &[String],
) -> Option<&'f SectionPoint> {
    instances.iter().find_map(|instance| {
        field
            .blocks_at(instance, Position::Centroid)
            .find_map(|b| b.section_point.as_ref())
    })
}

/// Build the `element_count × 3` direction buffer. Elements without an
/// orientation entry keep the zero vector.
pub fn orientation_buffer(
    array: &str,
    field: &FieldOutput,
    instances: &[String],
    elements: &LabelIndex,
) -> Result<OutputBuffer> {
    let mut quaternions = OutputBuffer::zeros(elements.len(), 4);
    let section_point = first_section_point(field, instances);

    for block in matching_blocks(field, instances, Position::Centroid, section_point) {
        let Some(systems) = &block.local_coord_system else {
            continue;
        };
        if systems.len() != block.labels.len() {
            return Err(ConvertError::InvalidData(format!(
                "{array}: {} orientations for {} labels in instance {}",
                systems.len(),
                block.labels.len(),
                block.instance
            )));
        }
        for (label, q) in block.labels.iter().zip(systems) {
            let at = elements.resolve(&block.instance, *label)?;
            quaternions.write_row(array, at, q)?;
        }
    }

    let mut directions = OutputBuffer::zeros(elements.len(), 3);
    for row in 0..quaternions.row_count() {
        let q = quaternions.row(row);
        let direction = quaternion_to_direction([q[0], q[1], q[2], q[3]]);
        directions.row_mut(row).copy_from_slice(&direction);
    }
    Ok(directions)
}
