//! Recipe trees: model, canonical signatures and builders
//!
//! A tree's root is the target element; an internal node's children are the
//! two ingredients of one recipe producing it. Leaves are primitives or carry
//! a flag explaining why expansion stopped.

mod builder;
mod enumerate;
mod from_path;

pub use builder::TreeBuilder;
pub use enumerate::{enumerate_recipe_trees, enumerate_trees, MAX_VARIATION_DEPTH};
pub use from_path::tree_from_path;

use serde::{Deserialize, Serialize};

fn is_false(flag: &bool) -> bool {
    !*flag
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeTree {
    pub name: String,
    #[serde(default)]
    pub image_path: String,
    #[serde(default)]
    pub ingredients: Vec<RecipeTree>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_base_element: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub no_recipe: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_circular_reference: bool,
}

impl RecipeTree {
    fn bare(name: &str, image_path: String) -> Self {
        Self {
            name: name.to_string(),
            image_path,
            ingredients: Vec::new(),
            is_base_element: false,
            no_recipe: false,
            is_circular_reference: false,
        }
    }

    /// Primitive leaf
    pub fn base(name: &str, image_path: String) -> Self {
        Self {
            is_base_element: true,
            ..Self::bare(name, image_path)
        }
    }

    /// Derived element without any producing recipe
    pub fn dead_end(name: &str, image_path: String) -> Self {
        Self {
            no_recipe: true,
            ..Self::bare(name, image_path)
        }
    }

    /// Element already active on the current branch
    pub fn circular(name: &str, image_path: String) -> Self {
        Self {
            is_circular_reference: true,
            ..Self::bare(name, image_path)
        }
    }

    pub fn internal(name: &str, image_path: String, ingredients: Vec<RecipeTree>) -> Self {
        Self {
            ingredients,
            ..Self::bare(name, image_path)
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.ingredients.is_empty()
    }

    pub fn node_count(&self) -> usize {
        1 + self.ingredients.iter().map(RecipeTree::node_count).sum::<usize>()
    }

    pub fn depth(&self) -> usize {
        1 + self
            .ingredients
            .iter()
            .map(RecipeTree::depth)
            .max()
            .unwrap_or(0)
    }

    /// Canonical signature, independent of sibling order
    ///
    /// `name|[child;child]` with child signatures sorted; a leaf is `name|[]`.
    pub fn signature(&self) -> String {
        let mut children: Vec<String> =
            self.ingredients.iter().map(RecipeTree::signature).collect();
        children.sort();
        format!("{}|[{}]", self.name, children.join(";"))
    }

    /// Root name plus the sorted names of its direct ingredients
    pub fn top_level_signature(&self) -> String {
        let mut names: Vec<&str> = self.ingredients.iter().map(|c| c.name.as_str()).collect();
        names.sort_unstable();
        format!("{}|{}", self.name, names.join(","))
    }
}
