//! Recursive cheapest-recipe builders

use super::RecipeTree;
use crate::corpus::is_primitive;
use crate::graph::{ElementGraph, RecipeId};
use crate::search::TreeFlavor;
use std::collections::HashSet;

/// Builds one tree per element by always choosing a single recipe
///
/// - [`TreeFlavor::Bfs`]: most primitive ingredients
/// - [`TreeFlavor::Dfs`]: lowest ingredient cost (primitive 1, derived 2,
///   dead end 1)
///
/// Ties go to the earlier recipe in corpus order. `visited` counts every node
/// built.
pub struct TreeBuilder<'g> {
    graph: &'g ElementGraph,
    flavor: TreeFlavor,
    visited: usize,
}

impl<'g> TreeBuilder<'g> {
    pub fn new(graph: &'g ElementGraph, flavor: TreeFlavor) -> Self {
        Self {
            graph,
            flavor,
            visited: 0,
        }
    }

    pub fn flavor(&self) -> TreeFlavor {
        self.flavor
    }

    pub fn visited(&self) -> usize {
        self.visited
    }

    pub(crate) fn add_visited(&mut self, count: usize) {
        self.visited += count;
    }

    pub fn build(&mut self, name: &str) -> RecipeTree {
        let mut active = HashSet::new();
        self.build_branch(name, &mut active)
    }

    /// Tree whose root uses `recipe`; ingredients follow the flavor
    pub fn build_with_recipe(&mut self, name: &str, recipe: RecipeId) -> RecipeTree {
        let mut active = HashSet::new();
        self.visited += 1;
        active.insert(name.to_string());
        let ingredients = self.graph.recipe(recipe).ingredients.clone();
        let children = ingredients
            .iter()
            .map(|i| self.build_branch(i, &mut active))
            .collect();
        RecipeTree::internal(name, self.graph.image_ref(name), children)
    }

    /// Build `name` below the elements in `active`
    pub(crate) fn build_branch(&mut self, name: &str, active: &mut HashSet<String>) -> RecipeTree {
        self.visited += 1;
        let image = self.graph.image_ref(name);

        if is_primitive(name) {
            return RecipeTree::base(name, image);
        }
        if active.contains(name) {
            return RecipeTree::circular(name, image);
        }
        let Some(recipe) = self.choose_recipe(name) else {
            return RecipeTree::dead_end(name, image);
        };

        active.insert(name.to_string());
        let ingredients = self.graph.recipe(recipe).ingredients.clone();
        let children = ingredients
            .iter()
            .map(|i| self.build_branch(i, active))
            .collect();
        active.remove(name);

        RecipeTree::internal(name, image, children)
    }

    /// Recipe the flavor picks for `name`
    pub fn choose_recipe(&self, name: &str) -> Option<RecipeId> {
        let candidates = self.graph.usable_recipes(name);
        let mut best: Option<(RecipeId, usize)> = None;

        for id in candidates {
            let ingredients = &self.graph.recipe(id).ingredients;
            let score = match self.flavor {
                TreeFlavor::Bfs => ingredients.iter().filter(|i| is_primitive(i)).count(),
                TreeFlavor::Dfs => ingredients.iter().map(|i| self.ingredient_cost(i)).sum(),
            };
            let better = match (best, self.flavor) {
                (None, _) => true,
                (Some((_, current)), TreeFlavor::Bfs) => score > current,
                (Some((_, current)), TreeFlavor::Dfs) => score < current,
            };
            if better {
                best = Some((id, score));
            }
        }

        best.map(|(id, _)| id)
    }

    fn ingredient_cost(&self, name: &str) -> usize {
        if is_primitive(name) || !self.graph.has_recipes(name) {
            1
        } else {
            2
        }
    }
}
