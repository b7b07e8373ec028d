//! Dense global numbering of nodes and elements across instances.
//!
//! Indices are assigned by walking the selected instances in the given
//! order and, inside each, the native node/element order. Every output
//! array of a frame is aligned on the same `GlobalIndex`.

use std::collections::HashMap;

use odbx_model::Instance;

use crate::error::{ConvertError, Result};

/// (instance, label) → dense index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelIndex {
    by_instance: HashMap<String, HashMap<i32, usize>>,
    len: usize,
}

impl LabelIndex {
    pub fn get(&self, instance: &str, label: i32) -> Option<usize> {
        self.by_instance
            .get(instance)
            .and_then(|labels| labels.get(&label))
            .copied()
    }

    pub fn resolve(&self, instance: &str, label: i32) -> Result<usize> {
        self.get(instance, label)
            .ok_or_else(|| ConvertError::UnknownLabel {
                instance: instance.to_string(),
                label,
            })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn insert_instance(
        &mut self,
        instance: &str,
        labels: impl Iterator<Item = i32>,
    ) -> Result<()> {
        let map = self.by_instance.entry(instance.to_string()).or_default();
        for label in labels {
            if map.insert(label, self.len).is_some() {
                return Err(ConvertError::DuplicateLabel {
                    instance: instance.to_string(),
                    label,
                });
            }
            self.len += 1;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalIndex {
    pub nodes: LabelIndex,
    pub elements: LabelIndex,
}

impl GlobalIndex {
    /// Build the index for an ordered instance selection
    pub fn build<'a>(instances: impl IntoIterator<Item = &'a Instance>) -> Result<Self> {
        let mut index = GlobalIndex::default();
        for instance in instances {
            if index.nodes.by_instance.contains_key(&instance.name) {
                return Err(ConvertError::DuplicateInstance(instance.name.clone()));
            }
            index
                .nodes
                .insert_instance(&instance.name, instance.nodes.iter().map(|n| n.label))?;
            index
                .elements
                .insert_instance(&instance.name, instance.elements.iter().map(|e| e.label))?;
        }
        Ok(index)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odbx_model::{Element, Node};

    fn instance(name: &str, node_labels: &[i32], element_labels: &[i32]) -> Instance {
        Instance::new(
            name,
            node_labels
                .iter()
                .map(|&l| Node::new(l, l as f64, 0.0, 0.0))
                .collect(),
            element_labels
                .iter()
                .map(|&l| Element::new(l, "S3", vec![]))
                .collect(),
        )
    }

    #[test]
    fn assigns_contiguous_indices_in_selection_order() {
        let a = instance("A", &[10, 3], &[7]);
        let b = instance("B", &[3, 1, 99], &[7]);
        let index = GlobalIndex::build([&a, &b]).expect("index builds");

        assert_eq!(index.node_count(), 5);
        assert_eq!(index.element_count(), 2);
        assert_eq!(index.nodes.get("A", 10), Some(0));
        assert_eq!(index.nodes.get("A", 3), Some(1));
        assert_eq!(index.nodes.get("B", 3), Some(2));
        assert_eq!(index.nodes.get("B", 99), Some(4));
        assert_eq!(index.elements.get("A", 7), Some(0));
        assert_eq!(index.elements.get("B", 7), Some(1));
    }

    #[test]
    fn indices_form_a_bijection_and_rebuild_identically() {
        let a = instance("A", &[5, 4, 3, 2, 1], &[2, 1]);
        let b = instance("B", &[100, 200], &[9]);
        let first = GlobalIndex::build([&b, &a]).expect("index builds");
        let second = GlobalIndex::build([&b, &a]).expect("index builds");
        assert_eq!(first, second);

        let mut seen: Vec<usize> = a
            .nodes
            .iter()
            .map(|n| first.nodes.get("A", n.label).unwrap())
            .chain(b.nodes.iter().map(|n| first.nodes.get("B", n.label).unwrap()))
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..7).collect::<Vec<_>>());
        assert_eq!(first.nodes.get("B", 100), Some(0));
    }

    #[test]
    fn selection_order_changes_numbering() {
        let a = instance("A", &[1], &[]);
        let b = instance("B", &[1], &[]);
        let ab = GlobalIndex::build([&a, &b]).unwrap();
        let ba = GlobalIndex::build([&b, &a]).unwrap();
        assert_eq!(ab.nodes.get("A", 1), Some(0));
        assert_eq!(ba.nodes.get("A", 1), Some(1));
    }

    #[test]
    fn rejects_duplicates() {
        let dup = instance("A", &[1, 1], &[]);
        assert!(matches!(
            GlobalIndex::build([&dup]),
            Err(ConvertError::DuplicateLabel { label: 1, .. })
        ));

        let a = instance("A", &[1], &[]);
        assert!(matches!(
            GlobalIndex::build([&a, &a]),
            Err(ConvertError::DuplicateInstance(name)) if name == "A"
        ));
    }

    #[test]
    fn resolve_reports_missing_labels() {
        let a = instance("A", &[1], &[]);
        let index = GlobalIndex::build([&a]).unwrap();
        assert!(matches!(
            index.nodes.resolve("A", 2),
            Err(ConvertError::UnknownLabel { label: 2, .. })
        ));
        assert!(index.nodes.resolve("B", 1).is_err());
    }
}
