//! Element graph: producing and consuming recipe indices over the corpus
//!
//! Built once from the effective corpus and never mutated. Recipe ids follow
//! corpus order (elements in file order, recipes in element order), which is
//! the tie-break order used by every search and builder.

use crate::corpus::{Corpus, Element, PRIMITIVES};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

/// Index into [`ElementGraph::recipe`]
pub type RecipeId = usize;

/// A recipe viewed as a graph edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub result: String,
    pub ingredients: [String; 2],
}

impl Recipe {
    /// Result appears among its own ingredients
    pub fn is_self_referential(&self) -> bool {
        self.ingredients.iter().any(|i| *i == self.result)
    }

    /// The ingredient paired with `name`, if `name` is an ingredient
    pub fn other_ingredient(&self, name: &str) -> Option<&str> {
        let [a, b] = &self.ingredients;
        if a == name {
            Some(b)
        } else if b == name {
            Some(a)
        } else {
            None
        }
    }

    pub fn has_ingredient(&self, name: &str) -> bool {
        self.ingredients.iter().any(|i| i == name)
    }
}

/// Per-element adjacency
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub name: String,
    pub image_ref: String,
    pub tier: u32,
    /// Recipes whose result is this element
    pub produced_by: Vec<RecipeId>,
    /// Recipes that use this element as an ingredient
    pub consumed_by: Vec<RecipeId>,
}

/// Read-only AND/OR graph over the effective corpus
#[derive(Debug)]
pub struct ElementGraph {
    corpus: Corpus,
    recipes: Vec<Recipe>,
    nodes: HashMap<String, GraphNode>,
    reachable: HashSet<String>,
}

impl ElementGraph {
    pub fn new(corpus: Corpus) -> Self {
        let mut nodes: HashMap<String, GraphNode> = corpus
            .elements()
            .iter()
            .map(|e| {
                (
                    e.name.clone(),
                    GraphNode {
                        name: e.name.clone(),
                        image_ref: e.image_ref().to_string(),
                        tier: e.tier,
                        produced_by: Vec::new(),
                        consumed_by: Vec::new(),
                    },
                )
            })
            .collect();

        let mut recipes = Vec::new();
        for element in corpus.elements() {
            for recipe in &element.recipes {
                let id = recipes.len();
                recipes.push(Recipe {
                    result: element.name.clone(),
                    ingredients: recipe.ingredients.clone(),
                });

                if let Some(node) = nodes.get_mut(&element.name) {
                    node.produced_by.push(id);
                }
                let [a, b] = &recipe.ingredients;
                if let Some(node) = nodes.get_mut(a) {
                    node.consumed_by.push(id);
                }
                if a != b {
                    if let Some(node) = nodes.get_mut(b) {
                        node.consumed_by.push(id);
                    }
                }
            }
        }

        let reachable = compute_reachable(&nodes, &recipes);
        debug!(
            "Element graph built: {} elements, {} recipes, {} reachable",
            nodes.len(),
            recipes.len(),
            reachable.len()
        );

        Self {
            corpus,
            recipes,
            nodes,
            reachable,
        }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn element(&self, name: &str) -> Option<&Element> {
        self.corpus.get(name)
    }

    pub fn node(&self, name: &str) -> Option<&GraphNode> {
        self.nodes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn recipe(&self, id: RecipeId) -> &Recipe {
        &self.recipes[id]
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    /// Recipes producing `name`, corpus order, self-referential ones included
    pub fn recipes_producing<'a>(
        &'a self,
        name: &str,
    ) -> impl Iterator<Item = (RecipeId, &'a Recipe)> + 'a {
        self.nodes
            .get(name)
            .map(|n| n.produced_by.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |&id| (id, &self.recipes[id]))
    }

    /// Recipes consuming `name`, corpus order, self-referential ones included
    pub fn recipes_consuming<'a>(
        &'a self,
        name: &str,
    ) -> impl Iterator<Item = (RecipeId, &'a Recipe)> + 'a {
        self.nodes
            .get(name)
            .map(|n| n.consumed_by.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |&id| (id, &self.recipes[id]))
    }

    /// Non-self-referential recipes producing `name`, corpus order
    pub fn usable_recipes(&self, name: &str) -> Vec<RecipeId> {
        self.recipes_producing(name)
            .filter(|(_, r)| !r.is_self_referential())
            .map(|(id, _)| id)
            .collect()
    }

    /// Element has at least one producing recipe
    pub fn has_recipes(&self, name: &str) -> bool {
        self.nodes
            .get(name)
            .map(|n| !n.produced_by.is_empty())
            .unwrap_or(false)
    }

    /// Element can be synthesized from the primitives
    pub fn is_reachable(&self, name: &str) -> bool {
        self.reachable.contains(name)
    }

    pub fn image_ref(&self, name: &str) -> String {
        self.nodes
            .get(name)
            .map(|n| n.image_ref.clone())
            .unwrap_or_default()
    }

    /// Primitives present in the corpus, canonical order
    pub fn primitives(&self) -> Vec<&'static str> {
        PRIMITIVES
            .iter()
            .copied()
            .filter(|p| self.nodes.contains_key(*p))
            .collect()
    }
}

/// Forward closure from the primitives
fn compute_reachable(nodes: &HashMap<String, GraphNode>, recipes: &[Recipe]) -> HashSet<String> {
    let mut reachable: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<String> = VecDeque::new();

    for primitive in PRIMITIVES {
        if nodes.contains_key(primitive) {
            reachable.insert(primitive.to_string());
            queue.push_back(primitive.to_string());
        }
    }

    while let Some(current) = queue.pop_front() {
        let Some(node) = nodes.get(&current) else {
            continue;
        };
        for &id in &node.consumed_by {
            let recipe = &recipes[id];
            if reachable.contains(&recipe.result) || recipe.is_self_referential() {
                continue;
            }
            if recipe.ingredients.iter().all(|i| reachable.contains(i)) {
                reachable.insert(recipe.result.clone());
                queue.push_back(recipe.result.clone());
            }
        }
    }

    reachable
}
