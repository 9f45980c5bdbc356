//! Path to tree reconstruction

use super::{RecipeTree, TreeBuilder};
use crate::corpus::is_primitive;
use crate::graph::ElementGraph;
use crate::search::{PathNode, TreeFlavor};
use std::collections::HashSet;

/// Rebuild a recipe tree from a target-first path
///
/// For each element the first recipe whose ingredients all occur later in the
/// path wins, and each ingredient is rebuilt from the suffix starting at its
/// first later occurrence. Elements the path cannot explain are built by the
/// `flavor` builder. Returns the tree and the number of nodes built, or None
/// for an empty path.
///
/// Forward paths (target last) must be reversed by the caller.
pub fn tree_from_path(
    graph: &ElementGraph,
    path: &[PathNode],
    flavor: TreeFlavor,
) -> Option<(RecipeTree, usize)> {
    if path.is_empty() {
        return None;
    }
    let mut builder = TreeBuilder::new(graph, flavor);
    let mut active = HashSet::new();
    let tree = convert(graph, &mut builder, path, &mut active);
    Some((tree, builder.visited()))
}

fn convert(
    graph: &ElementGraph,
    builder: &mut TreeBuilder<'_>,
    path: &[PathNode],
    active: &mut HashSet<String>,
) -> RecipeTree {
    let head = path[0].element.as_str();
    let image = graph.image_ref(head);

    if is_primitive(head) {
        builder.add_visited(1);
        return RecipeTree::base(head, image);
    }
    if active.contains(head) {
        builder.add_visited(1);
        return RecipeTree::circular(head, image);
    }
    if path.len() == 1 {
        return builder.build_branch(head, active);
    }
    if !graph.has_recipes(head) {
        builder.add_visited(1);
        return RecipeTree::dead_end(head, image);
    }

    let rest = &path[1..];
    for id in graph.usable_recipes(head) {
        let recipe = graph.recipe(id);
        let positions: Option<Vec<usize>> = recipe
            .ingredients
            .iter()
            .map(|i| rest.iter().position(|n| n.element == *i).map(|p| p + 1))
            .collect();
        let Some(positions) = positions else {
            continue;
        };

        builder.add_visited(1);
        active.insert(head.to_string());
        let children = positions
            .into_iter()
            .map(|start| convert(graph, builder, &path[start..], active))
            .collect();
        active.remove(head);
        return RecipeTree::internal(head, image, children);
    }

    builder.build_branch(head, active)
}
