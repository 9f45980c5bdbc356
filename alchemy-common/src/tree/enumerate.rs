//! Distinct recipe tree enumeration

use super::{RecipeTree, TreeBuilder};
use crate::corpus::is_primitive;
use crate::graph::{ElementGraph, RecipeId};
use crate::search::TreeFlavor;
use std::collections::HashSet;
use tracing::debug;

/// Recipe levels expanded with full variation before the flavor builder
/// takes over
pub const MAX_VARIATION_DEPTH: usize = 3;

struct Enumerator<'g> {
    graph: &'g ElementGraph,
    builder: TreeBuilder<'g>,
    local_cap: usize,
}

impl<'g> Enumerator<'g> {
    fn new(graph: &'g ElementGraph, max_count: usize, flavor: TreeFlavor) -> Self {
        Self {
            graph,
            builder: TreeBuilder::new(graph, flavor),
            local_cap: max_count.div_ceil(2).max(1),
        }
    }

    /// Trees rooted at `name` made with `recipe`, up to `cap`, distinct by
    /// signature
    fn recipe_variations(
        &mut self,
        name: &str,
        recipe: RecipeId,
        depth: usize,
        cap: usize,
        active: &mut HashSet<String>,
    ) -> Vec<RecipeTree> {
        let ingredients = self.graph.recipe(recipe).ingredients.clone();

        active.insert(name.to_string());
        let first = self.ingredient_variations(&ingredients[0], depth, active);
        let second = self.ingredient_variations(&ingredients[1], depth, active);
        active.remove(name);

        let image = self.graph.image_ref(name);
        let mut trees = Vec::new();
        let mut signatures = HashSet::new();

        'product: for left in &first {
            for right in &second {
                let tree =
                    RecipeTree::internal(name, image.clone(), vec![left.clone(), right.clone()]);
                if signatures.insert(tree.signature()) {
                    trees.push(tree);
                    if trees.len() >= cap {
                        break 'product;
                    }
                }
            }
        }

        trees
    }

    /// Alternative sub-trees for one ingredient, capped at the local cap
    fn ingredient_variations(
        &mut self,
        name: &str,
        depth: usize,
        active: &mut HashSet<String>,
    ) -> Vec<RecipeTree> {
        let image = self.graph.image_ref(name);

        if depth + 1 >= MAX_VARIATION_DEPTH {
            return vec![self.builder.build_branch(name, active)];
        }

        self.builder.add_visited(1);
        if is_primitive(name) {
            return vec![RecipeTree::base(name, image)];
        }
        if active.contains(name) {
            return vec![RecipeTree::circular(name, image)];
        }
        if !self.graph.has_recipes(name) {
            return vec![RecipeTree::dead_end(name, image)];
        }

        let cap = self.local_cap;
        let mut variations = Vec::new();
        let mut signatures = HashSet::new();
        for recipe in self.graph.usable_recipes(name) {
            for tree in self.recipe_variations(name, recipe, depth + 1, cap, active) {
                if signatures.insert(tree.signature()) {
                    variations.push(tree);
                }
                if variations.len() >= cap {
                    return variations;
                }
            }
        }

        if variations.is_empty() {
            variations.push(self.builder.build_branch(name, active));
        }
        variations
    }
}

/// Up to `max_count` signature-distinct trees for `target`
///
/// Each top-level recipe contributes the Cartesian product of its ingredients'
/// variations. When nothing can be produced a single flavor tree is returned.
/// Returns the trees and the number of nodes visited.
pub fn enumerate_trees(
    graph: &ElementGraph,
    target: &str,
    max_count: usize,
    flavor: TreeFlavor,
) -> (Vec<RecipeTree>, usize) {
    if !graph.contains(target) {
        return (Vec::new(), 0);
    }
    let image = graph.image_ref(target);
    if is_primitive(target) {
        return (vec![RecipeTree::base(target, image)], 1);
    }
    if !graph.has_recipes(target) {
        return (vec![RecipeTree::dead_end(target, image)], 1);
    }

    let max_count = max_count.max(1);
    let mut enumerator = Enumerator::new(graph, max_count, flavor);
    let mut trees = Vec::new();
    let mut signatures = HashSet::new();

    'recipes: for recipe in graph.usable_recipes(target) {
        let mut active = HashSet::new();
        let remaining = max_count - trees.len();
        for tree in enumerator.recipe_variations(target, recipe, 0, remaining, &mut active) {
            if signatures.insert(tree.signature()) {
                trees.push(tree);
                if trees.len() >= max_count {
                    break 'recipes;
                }
            }
        }
    }

    if trees.is_empty() {
        trees.push(enumerator.builder.build(target));
    }

    debug!(
        "enumerate_trees({}, {}, {}): {} trees",
        target,
        max_count,
        flavor,
        trees.len()
    );
    (trees, enumerator.builder.visited())
}

/// Distinct trees for `target` restricted to one top-level recipe
pub fn enumerate_recipe_trees(
    graph: &ElementGraph,
    target: &str,
    recipe: RecipeId,
    max_count: usize,
    flavor: TreeFlavor,
) -> (Vec<RecipeTree>, usize) {
    let max_count = max_count.max(1);
    let mut enumerator = Enumerator::new(graph, max_count, flavor);
    let mut active = HashSet::new();
    let trees = enumerator.recipe_variations(target, recipe, 0, max_count, &mut active);
    (trees, enumerator.builder.visited())
}
