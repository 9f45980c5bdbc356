//! Search kernels over the element graph
//!
//! Three algorithms, each returning the found paths plus a count of
//! frontier insertions:
//! - [`bfs_forward`]: forward synthesis from the primitives
//! - [`dfs_backward`]: backward decomposition of the target
//! - [`bidirectional`]: meet-in-the-middle of the two
//!
//! The [`parallel`] module fans each of them out over blocking workers.

mod backward;
mod bidirectional;
mod forward;
pub mod parallel;

pub use backward::dfs_backward;
pub use bidirectional::{bidirectional, BidirectionalOutcome};
pub use forward::bfs_forward;

pub(crate) use backward::BackwardSearch;
pub(crate) use bidirectional::BidirectionalSearch;
pub(crate) use forward::ForwardFrontier;

use crate::corpus::is_primitive;
use crate::graph::ElementGraph;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// One element occurrence on a path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathNode {
    pub element: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<[String; 2]>,
}

impl PathNode {
    /// Node without ingredients (primitive or not yet expanded)
    pub fn leaf(graph: &ElementGraph, element: &str) -> Self {
        Self {
            element: element.to_string(),
            image_path: graph.image_ref(element),
            ingredients: None,
        }
    }

    /// Node carrying the recipe used to make it
    pub fn derived(graph: &ElementGraph, element: &str, ingredients: [String; 2]) -> Self {
        Self {
            element: element.to_string(),
            image_path: graph.image_ref(element),
            ingredients: Some(ingredients),
        }
    }
}

/// Ordered element occurrences witnessing a synthesis or decomposition
pub type RecipePath = Vec<PathNode>;

/// Paths found by one kernel run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    pub paths: Vec<RecipePath>,
    /// Frontier insertions performed by the run
    pub visited: usize,
}

impl SearchOutcome {
    /// Shortcut result for a primitive target
    pub(crate) fn primitive(graph: &ElementGraph, target: &str) -> Self {
        Self {
            paths: vec![vec![PathNode::leaf(graph, target)]],
            visited: 1,
        }
    }
}

/// Path search algorithm selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchAlgorithm {
    Bfs,
    Dfs,
    Bidirectional,
}

impl SearchAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchAlgorithm::Bfs => "bfs",
            SearchAlgorithm::Dfs => "dfs",
            SearchAlgorithm::Bidirectional => "bidirectional",
        }
    }
}

impl fmt::Display for SearchAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bfs" => Ok(SearchAlgorithm::Bfs),
            "dfs" => Ok(SearchAlgorithm::Dfs),
            "bidirectional" | "bidi" => Ok(SearchAlgorithm::Bidirectional),
            other => Err(Error::InvalidAlgorithm(other.to_string())),
        }
    }
}

/// Recipe-selection strategy for the recursive tree builders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeFlavor {
    /// Prefer the recipe with the most primitive ingredients
    Bfs,
    /// Prefer the recipe with the cheapest ingredients
    Dfs,
}

impl TreeFlavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            TreeFlavor::Bfs => "bfs",
            TreeFlavor::Dfs => "dfs",
        }
    }
}

impl fmt::Display for TreeFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TreeFlavor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bfs" => Ok(TreeFlavor::Bfs),
            "dfs" => Ok(TreeFlavor::Dfs),
            other => Err(Error::InvalidAlgorithm(other.to_string())),
        }
    }
}

/// Concatenate two paths keeping the first occurrence of every element
pub fn merge_paths(first: &[PathNode], second: &[PathNode]) -> RecipePath {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut merged = Vec::with_capacity(first.len() + second.len());
    for node in first.iter().chain(second) {
        if seen.insert(node.element.as_str()) {
            merged.push(node.clone());
        }
    }
    merged
}

/// Sorted, deduplicated primitives used by a path
pub fn primitive_anchors(path: &[PathNode]) -> Vec<String> {
    let mut anchors: Vec<String> = path
        .iter()
        .filter(|n| is_primitive(&n.element))
        .map(|n| n.element.clone())
        .collect();
    anchors.sort();
    anchors.dedup();
    anchors
}

/// Sorted, deduplicated elements of a path
pub fn element_set(path: &[PathNode]) -> Vec<String> {
    let mut elements: Vec<String> = path.iter().map(|n| n.element.clone()).collect();
    elements.sort();
    elements.dedup();
    elements
}
