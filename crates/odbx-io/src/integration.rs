//! Integration-point fields: centroid reduction and per-point expansion.
//!
//! An integration-point block stores one row per (element, point). The
//! expanded array packs the points of one element side by side:
//! `[ip1 components, ip2 components, ...]`, zero-padded up to the largest
//! point count seen for the field.

use odbx_model::DataBlock;

use crate::error::{ConvertError, Result};

pub fn centroid_name(field: &str) -> String {
    format!("{field}_Centroid")
}

pub fn integration_points_name(field: &str) -> String {
    format!("{field}_IntegrationPoints")
}

/// Component labels of the expanded array: the base labels repeated once
/// per integration point
pub fn expanded_labels(labels: &[String], max_points: usize) -> Vec<String> {
    labels
        .iter()
        .cloned()
        .cycle()
        .take(labels.len() * max_points)
        .collect()
}

/// Rows of a block regrouped into one row per element
#[derive(Debug, Clone, PartialEq)]
pub struct ElementRows {
    pub labels: Vec<i32>,
    pub rows: Vec<Vec<f64>>,
}

/// Regroup an integration-point block. Every consecutive run of
/// `max_integration_point` rows belongs to one element; the row count must
/// be a multiple of that number and every run must carry a single label.
pub fn reshape_block(array: &str, block: &DataBlock) -> Result<ElementRows> {
    let points = block.max_integration_point().unwrap_or(1) as usize;
    let rows = block.data.len();
    if points == 0 || rows % points != 0 {
        return Err(ConvertError::Reshape {
            field: array.to_string(),
            rows,
            points,
        });
    }
    if block.labels.len() != rows {
        return Err(ConvertError::InvalidData(format!(
            "{array}: block of instance {} has {} labels for {rows} rows",
            block.instance,
            block.labels.len()
        )));
    }

    let mut labels = Vec::with_capacity(rows / points);
    for chunk in block.labels.chunks(points) {
        let label = chunk[0];
        if let Some(other) = chunk.iter().find(|&&l| l != label) {
            return Err(ConvertError::InvalidData(format!(
                "{array}: integration points of element {label} in instance {} run into element {other}",
                block.instance
            )));
        }
        labels.push(label);
    }
    let rows = block
        .data
        .chunks(points)
        .map(|chunk| chunk.iter().flatten().copied().collect())
        .collect();

    Ok(ElementRows { labels, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use odbx_model::Position;

    #[test]
    fn derived_names() {
        assert_eq!(centroid_name("S"), "S_Centroid");
        assert_eq!(integration_points_name("S"), "S_IntegrationPoints");
    }

    #[test]
    fn expanded_labels_repeat_per_point() {
        let base = vec!["S11".to_string(), "S22".to_string()];
        assert_eq!(
            expanded_labels(&base, 3),
            vec!["S11", "S22", "S11", "S22", "S11", "S22"]
        );
        assert_eq!(expanded_labels(&base, 3).len(), 6);
    }

    #[test]
    fn packs_points_of_each_element_into_one_row() {
        let block = DataBlock::new(
            "A",
            Position::IntegrationPoint,
            vec![5, 5, 8, 8],
            vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0], vec![7.0, 8.0]],
        )
        .with_integration_points(vec![1, 2, 1, 2]);

        let reshaped = reshape_block("S", &block).expect("rows divide evenly");
        assert_eq!(reshaped.labels, vec![5, 8]);
        assert_eq!(reshaped.rows[0], vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(reshaped.rows[1], vec![5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn uneven_row_count_is_a_reshape_error() {
        let block = DataBlock::new(
            "A",
            Position::IntegrationPoint,
            vec![1, 1, 1],
            vec![vec![0.0]; 3],
        )
        .with_integration_points(vec![1, 2, 1]);

        let err = reshape_block("S", &block).expect_err("3 rows do not split into pairs");
        assert!(matches!(
            err,
            ConvertError::Reshape { rows: 3, points: 2, .. }
        ));
    }

    #[test]
    fn run_spanning_two_elements_is_rejected() {
        // two points per element, but each element only wrote one row
        let block = DataBlock::new(
            "A",
            Position::IntegrationPoint,
            vec![5, 8],
            vec![vec![1.0], vec![2.0]],
        )
        .with_integration_points(vec![1, 2]);

        let err = reshape_block("S", &block).expect_err("labels 5 and 8 cannot share a row");
        assert!(matches!(&err, ConvertError::InvalidData(msg) if msg.contains("element 5") && msg.contains("element 8")));
    }
}
