//! Backward decomposition: depth-first expansion of the target's recipes

use super::{PathNode, RecipePath, SearchOutcome};
use crate::corpus::is_primitive;
use crate::graph::{ElementGraph, RecipeId};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Derived element waiting to be expanded
#[derive(Debug, Clone)]
struct Pending {
    element: String,
    /// Position of the element's node in the partial path
    node_index: usize,
    /// Elements expanded above this one on its branch
    ancestors: Vec<String>,
}

/// One depth-first decomposition run
///
/// Paths are target first; an element's node receives its ingredients when it
/// is expanded and the ingredient nodes are appended after everything already
/// on the path. A path is complete once no derived element is pending.
pub(crate) struct BackwardSearch<'g, F> {
    graph: &'g ElementGraph,
    target: String,
    root_recipe: Option<RecipeId>,
    max_results: usize,
    cancel: Option<CancellationToken>,
    sink: F,
    path: RecipePath,
    found: usize,
    halted: bool,
    visited: usize,
}

impl<'g, F> BackwardSearch<'g, F>
where
    F: FnMut(RecipePath) -> bool,
{
    /// `sink` receives every complete path and returns false to halt the run
    pub(crate) fn new(graph: &'g ElementGraph, target: &str, max_results: usize, sink: F) -> Self {
        Self {
            graph,
            target: target.to_string(),
            root_recipe: None,
            max_results: max_results.max(1),
            cancel: None,
            sink,
            path: Vec::new(),
            found: 0,
            halted: false,
            visited: 0,
        }
    }

    /// Only decompose the target through `recipe`
    pub(crate) fn with_root_recipe(mut self, recipe: RecipeId) -> Self {
        self.root_recipe = Some(recipe);
        self
    }

    pub(crate) fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Run to completion and return the number of nodes appended
    pub(crate) fn run(mut self) -> usize {
        if !self.graph.contains(&self.target) {
            return 0;
        }
        if is_primitive(&self.target) {
            let node = PathNode::leaf(self.graph, &self.target);
            (self.sink)(vec![node]);
            return 1;
        }

        self.path.push(PathNode::leaf(self.graph, &self.target));
        self.visited += 1;
        let mut pending = vec![Pending {
            element: self.target.clone(),
            node_index: 0,
            ancestors: Vec::new(),
        }];
        self.descend(&mut pending);
        self.visited
    }

    fn should_stop(&self) -> bool {
        self.halted
            || self.found >= self.max_results
            || self.cancel.as_ref().is_some_and(|c| c.is_cancelled())
    }

    /// Already expanded on the partial path, or waiting to be
    fn is_scheduled(&self, element: &str, pending: &[Pending]) -> bool {
        pending.iter().any(|p| p.element == element)
            || self
                .path
                .iter()
                .any(|n| n.element == element && n.ingredients.is_some())
    }

    /// Leaves `pending` as it found it
    fn descend(&mut self, pending: &mut Vec<Pending>) {
        if self.should_stop() {
            return;
        }

        let Some(current) = pending.pop() else {
            self.found += 1;
            if !(self.sink)(self.path.clone()) {
                self.halted = true;
            }
            return;
        };

        let mut chain = current.ancestors.clone();
        chain.push(current.element.clone());

        let graph = self.graph;
        let is_root = current.node_index == 0;
        for (id, recipe) in graph.recipes_producing(&current.element) {
            if self.should_stop() {
                break;
            }
            if is_root && self.root_recipe.is_some_and(|root| root != id) {
                continue;
            }
            if recipe.is_self_referential()
                || recipe
                    .ingredients
                    .iter()
                    .any(|i| chain.contains(i) || !graph.is_reachable(i))
            {
                continue;
            }

            let path_len = self.path.len();
            let pending_len = pending.len();

            self.path[current.node_index].ingredients = Some(recipe.ingredients.clone());
            for ingredient in &recipe.ingredients {
                self.path.push(PathNode::leaf(graph, ingredient));
                self.visited += 1;
            }

            // First ingredient ends on top of the stack
            let mut to_expand: Vec<Pending> = Vec::new();
            for (offset, ingredient) in recipe.ingredients.iter().enumerate() {
                if is_primitive(ingredient)
                    || !graph.has_recipes(ingredient)
                    || to_expand.iter().any(|p| p.element == *ingredient)
                    || self.is_scheduled(ingredient, pending)
                {
                    continue;
                }
                to_expand.push(Pending {
                    element: ingredient.clone(),
                    node_index: path_len + offset,
                    ancestors: chain.clone(),
                });
            }
            pending.extend(to_expand.into_iter().rev());

            self.descend(pending);

            pending.truncate(pending_len);
            self.path.truncate(path_len);
            self.path[current.node_index].ingredients = None;
        }

        pending.push(current);
    }
}

/// Backward depth-first decomposition of `target`
///
/// Recipes are tried in corpus order and ingredients in recorded order. Paths
/// are returned target first.
pub fn dfs_backward(graph: &ElementGraph, target: &str, max_results: usize) -> SearchOutcome {
    let mut paths = Vec::new();
    let visited = BackwardSearch::new(graph, target, max_results, |path| {
        paths.push(path);
        true
    })
    .run();

    debug!(
        "dfs_backward({}): {} paths, {} visited",
        target,
        paths.len(),
        visited
    );

    SearchOutcome { paths, visited }
}
