//! HTTP API handlers for alchemy-server

pub mod animate;
pub mod elements;
pub mod error;
pub mod health;
pub mod options;
pub mod params;
pub mod recipes;
pub mod trees;

pub use animate::animate;
pub use elements::{get_element, list_elements};
pub use error::{ApiError, ApiResult};
pub use health::health_routes;
pub use options::answer_options;
pub use recipes::{best_recipes, multiple_recipes, recipe_paths, search};
pub use trees::{
    best_recipes_tree, bfs_tree, bidirectional, dfs_tree, multiple_recipes_tree, recipe_tree,
};

use std::sync::Arc;

use alchemy_common::RecipeService;

use crate::AppState;

/// Run a CPU-bound façade call off the async runtime
pub(crate) async fn run_blocking<T, F>(state: &AppState, query: F) -> ApiResult<T>
where
    F: FnOnce(&RecipeService) -> alchemy_common::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let service = Arc::clone(&state.service);
    let result = tokio::task::spawn_blocking(move || query(&service)).await?;
    Ok(result?)
}
