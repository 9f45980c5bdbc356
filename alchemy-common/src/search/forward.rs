//! Forward synthesis: breadth-first combination starting from the primitives

use super::{merge_paths, PathNode, RecipePath, SearchOutcome};
use crate::corpus::is_primitive;
use crate::graph::ElementGraph;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Known elements with their derivation paths
///
/// Every element is inserted at most once; `visited` counts insertions.
#[derive(Debug, Default)]
pub(crate) struct ForwardFrontier {
    paths: HashMap<String, RecipePath>,
    pub(crate) visited: usize,
}

impl ForwardFrontier {
    /// Frontier holding the primitives present in the graph
    pub(crate) fn seeded(graph: &ElementGraph) -> Self {
        let mut frontier = Self::default();
        for primitive in graph.primitives() {
            frontier
                .paths
                .insert(primitive.to_string(), vec![PathNode::leaf(graph, primitive)]);
            frontier.visited += 1;
        }
        frontier
    }

    pub(crate) fn is_known(&self, name: &str) -> bool {
        self.paths.contains_key(name)
    }

    pub(crate) fn path(&self, name: &str) -> Option<&RecipePath> {
        self.paths.get(name)
    }

    /// Combine `current` with every known partner
    ///
    /// Returns the newly discovered elements in corpus recipe order. Each new
    /// element's path is the merge of its ingredients' paths followed by the
    /// element itself.
    pub(crate) fn expand(&mut self, graph: &ElementGraph, current: &str) -> Vec<String> {
        let mut discovered = Vec::new();

        for (_, recipe) in graph.recipes_consuming(current) {
            if recipe.is_self_referential() || self.paths.contains_key(&recipe.result) {
                continue;
            }
            let Some(partner) = recipe.other_ingredient(current) else {
                continue;
            };
            if !self.paths.contains_key(partner) {
                continue;
            }

            let [a, b] = &recipe.ingredients;
            let (Some(path_a), Some(path_b)) = (self.paths.get(a), self.paths.get(b)) else {
                continue;
            };
            let mut path = merge_paths(path_a, path_b);
            path.push(PathNode::derived(
                graph,
                &recipe.result,
                recipe.ingredients.clone(),
            ));

            self.paths.insert(recipe.result.clone(), path);
            self.visited += 1;
            discovered.push(recipe.result.clone());
        }

        discovered
    }
}

/// Forward breadth-first synthesis of `target`
///
/// Paths run primitives first, target last. Each element is discovered once,
/// so at most one path is produced per target.
pub fn bfs_forward(
    graph: &ElementGraph,
    target: &str,
    max_results: usize,
    single_path: bool,
) -> SearchOutcome {
    if !graph.contains(target) {
        return SearchOutcome::default();
    }
    if is_primitive(target) {
        return SearchOutcome::primitive(graph, target);
    }

    let max_results = max_results.max(1);
    let mut frontier = ForwardFrontier::seeded(graph);
    let mut queue: VecDeque<String> = graph.primitives().iter().map(|p| p.to_string()).collect();
    let mut paths = Vec::new();

    'search: while let Some(current) = queue.pop_front() {
        for element in frontier.expand(graph, &current) {
            if element == target {
                if let Some(path) = frontier.path(&element) {
                    paths.push(path.clone());
                }
                if single_path || paths.len() >= max_results {
                    break 'search;
                }
            }
            queue.push_back(element);
        }
    }

    debug!(
        "bfs_forward({}): {} paths, {} visited",
        target,
        paths.len(),
        frontier.visited
    );

    SearchOutcome {
        paths,
        visited: frontier.visited,
    }
}
