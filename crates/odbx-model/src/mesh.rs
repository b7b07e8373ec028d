//! Mesh records as they come out of a result container.
//!
//! Labels are only unique inside one instance; they are neither dense nor
//! zero-based.

use serde::{Deserialize, Serialize};

/// A node of one instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node label within its instance
    pub label: i32,
    /// X, Y, Z coordinates
    pub coordinates: [f64; 3],
}

impl Node {
    /// Create a new node
    pub fn new(label: i32, x: f64, y: f64, z: f64) -> Self {
        Self {
            label,
            coordinates: [x, y, z],
        }
    }
}

/// An element of one instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Element label within its instance
    pub label: i32,
    /// Solver element type tag (e.g. `C3D8R`, `S4`)
    #[serde(rename = "type")]
    pub type_tag: String,
    /// Node labels, in solver order
    pub connectivity: Vec<i32>,
}

impl Element {
    /// Create a new element
    pub fn new(label: i32, type_tag: impl Into<String>, connectivity: Vec<i32>) -> Self {
        Self {
            label,
            type_tag: type_tag.into(),
            connectivity,
        }
    }
}

/// A named sub-mesh of the assembly
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Instance {
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Instance {
    pub fn new(name: impl Into<String>, nodes: Vec<Node>, elements: Vec<Element>) -> Self {
        Self {
            name: name.into(),
            nodes,
            elements,
        }
    }
}
