//! Bidirectional search: forward synthesis meets backward decomposition

use super::{merge_paths, primitive_anchors, ForwardFrontier, PathNode, RecipePath};
use crate::corpus::is_primitive;
use crate::graph::{ElementGraph, RecipeId};
use std::collections::{HashMap, HashSet, VecDeque};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Paths found by a bidirectional run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BidirectionalOutcome {
    /// Paths primitives first, target last
    pub paths: Vec<RecipePath>,
    /// Element where each path's two halves met, parallel to `paths`
    pub meeting_points: Vec<String>,
    /// Insertions into both frontiers
    pub visited: usize,
}

/// Backward side: every element seen from the target, with the
/// `(product, recipe)` edge it was reached through
#[derive(Debug, Default)]
struct BackwardFrontier {
    via: HashMap<String, Option<(String, RecipeId)>>,
    order: Vec<String>,
    queue: VecDeque<String>,
    visited: usize,
}

impl BackwardFrontier {
    fn insert(&mut self, element: &str, via: Option<(String, RecipeId)>) {
        self.via.insert(element.to_string(), via);
        self.order.push(element.to_string());
        self.queue.push_back(element.to_string());
        self.visited += 1;
    }
}

pub(crate) struct BidirectionalSearch<'g> {
    graph: &'g ElementGraph,
    target: String,
    root_recipe: Option<RecipeId>,
    max_results: usize,
    single_path: bool,
    cancel: Option<CancellationToken>,
}

impl<'g> BidirectionalSearch<'g> {
    pub(crate) fn new(
        graph: &'g ElementGraph,
        target: &str,
        max_results: usize,
        single_path: bool,
    ) -> Self {
        Self {
            graph,
            target: target.to_string(),
            root_recipe: None,
            max_results: max_results.max(1),
            single_path,
            cancel: None,
        }
    }

    /// Only let the two halves meet through this recipe of the target
    pub(crate) fn with_root_recipe(mut self, recipe: RecipeId) -> Self {
        self.root_recipe = Some(recipe);
        self
    }

    pub(crate) fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn allows(&self, product: &str, recipe: RecipeId) -> bool {
        product != self.target || self.root_recipe.map_or(true, |root| root == recipe)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|c| c.is_cancelled())
    }

    pub(crate) fn run(self) -> BidirectionalOutcome {
        let graph = self.graph;
        if !graph.contains(&self.target) {
            return BidirectionalOutcome::default();
        }
        if is_primitive(&self.target) {
            return BidirectionalOutcome {
                paths: vec![vec![PathNode::leaf(graph, &self.target)]],
                meeting_points: vec![self.target.clone()],
                visited: 1,
            };
        }

        let mut forward = ForwardFrontier::seeded(graph);
        let mut forward_queue: VecDeque<String> =
            graph.primitives().iter().map(|p| p.to_string()).collect();
        let mut backward = BackwardFrontier::default();
        backward.insert(&self.target, None);

        let mut outcome = BidirectionalOutcome::default();
        let mut anchors_seen: HashSet<Vec<String>> = HashSet::new();
        let mut met: HashSet<String> = HashSet::new();

        loop {
            self.collect_meetings(&forward, &backward, &mut met, &mut anchors_seen, &mut outcome);

            let done = outcome.paths.len() >= self.max_results
                || (self.single_path && !outcome.paths.is_empty());
            if done || self.is_cancelled() {
                break;
            }
            if forward_queue.is_empty() && backward.queue.is_empty() {
                break;
            }

            let expand_forward = !forward_queue.is_empty()
                && (backward.queue.is_empty() || forward_queue.len() <= backward.queue.len());

            if expand_forward {
                for _ in 0..forward_queue.len() {
                    let Some(current) = forward_queue.pop_front() else {
                        break;
                    };
                    forward_queue.extend(forward.expand(graph, &current));
                }
            } else {
                for _ in 0..backward.queue.len() {
                    let Some(current) = backward.queue.pop_front() else {
                        break;
                    };
                    self.expand_backward(&mut backward, &current);
                }
            }
        }

        outcome.visited = forward.visited + backward.visited;
        debug!(
            "bidirectional({}): {} paths, meeting at {:?}, {} visited",
            self.target,
            outcome.paths.len(),
            outcome.meeting_points,
            outcome.visited
        );
        outcome
    }

    /// Predecessors of `current`: both ingredients of each producing recipe
    fn expand_backward(&self, backward: &mut BackwardFrontier, current: &str) {
        let graph = self.graph;
        for (id, recipe) in graph.recipes_producing(current) {
            if recipe.is_self_referential() || !self.allows(current, id) {
                continue;
            }
            for ingredient in &recipe.ingredients {
                if backward.via.contains_key(ingredient) || !graph.is_reachable(ingredient) {
                    continue;
                }
                backward.insert(ingredient, Some((current.to_string(), id)));
            }
        }
    }

    fn collect_meetings(
        &self,
        forward: &ForwardFrontier,
        backward: &BackwardFrontier,
        met: &mut HashSet<String>,
        anchors_seen: &mut HashSet<Vec<String>>,
        outcome: &mut BidirectionalOutcome,
    ) {
        for element in &backward.order {
            if outcome.paths.len() >= self.max_results {
                return;
            }
            if met.contains(element) {
                continue;
            }
            let Some(path) = self.join_at(forward, backward, element) else {
                continue;
            };
            met.insert(element.clone());

            if anchors_seen.insert(primitive_anchors(&path)) {
                outcome.paths.push(path);
                outcome.meeting_points.push(element.clone());
            }
        }
    }

    /// Forward path to `meeting` followed by the backward chain to the target
    ///
    /// None while some part of the chain is not yet forward-known.
    fn join_at(
        &self,
        forward: &ForwardFrontier,
        backward: &BackwardFrontier,
        meeting: &str,
    ) -> Option<RecipePath> {
        let graph = self.graph;

        let mut path = match forward.path(meeting) {
            Some(path) if self.forward_path_allowed(path, meeting) => path.clone(),
            _ => {
                let (_, recipe) = graph.recipes_producing(meeting).find(|(id, r)| {
                    !r.is_self_referential()
                        && self.allows(meeting, *id)
                        && r.ingredients.iter().all(|i| forward.is_known(i))
                })?;
                let [a, b] = &recipe.ingredients;
                let mut path = merge_paths(forward.path(a)?, forward.path(b)?);
                path.push(PathNode::derived(graph, meeting, recipe.ingredients.clone()));
                path
            }
        };

        let mut current = meeting.to_string();
        while let Some(Some((product, id))) = backward.via.get(&current) {
            let recipe = graph.recipe(*id);
            let sibling = recipe.other_ingredient(&current)?;
            if !path.iter().any(|n| n.element == sibling) {
                path = merge_paths(&path, forward.path(sibling)?);
            }
            if !path.iter().any(|n| n.element == *product) {
                path.push(PathNode::derived(graph, product, recipe.ingredients.clone()));
            }
            current = product.clone();
        }

        Some(path)
    }

    /// A forward path ending at the target must use the permitted root recipe
    fn forward_path_allowed(&self, path: &[PathNode], meeting: &str) -> bool {
        if meeting != self.target || self.root_recipe.is_none() {
            return true;
        }
        let Some(ingredients) = path.last().and_then(|n| n.ingredients.as_ref()) else {
            return false;
        };
        self.graph
            .recipes_producing(meeting)
            .any(|(id, r)| self.allows(meeting, id) && r.ingredients == *ingredients)
    }
}

/// Bidirectional breadth-first search for `target`
///
/// The smaller non-empty frontier expands one level at a time. Distinct paths
/// are those with distinct sets of primitive anchors.
pub fn bidirectional(
    graph: &ElementGraph,
    target: &str,
    max_results: usize,
    single_path: bool,
) -> BidirectionalOutcome {
    BidirectionalSearch::new(graph, target, max_results, single_path).run()
}
