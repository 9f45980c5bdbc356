//! alchemy-server library - HTTP/WebSocket front end for the recipe search engine
//!
//! Exposes the router so integration tests can drive it without a socket.

use std::sync::Arc;
use std::time::Duration;

use alchemy_common::RecipeService;
use axum::Router;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Query façade over the immutable element graph
    pub service: Arc<RecipeService>,
    /// Pause between animation events
    pub step_delay: Duration,
}

impl AppState {
    /// Create new application state
    pub fn new(service: RecipeService, step_delay: Duration) -> Self {
        Self {
            service: Arc::new(service),
            step_delay,
        }
    }
}

/// Build application router
///
/// CORS is open to any origin. Every `OPTIONS` request answers 200.
pub fn build_router(state: AppState) -> Router {
    use axum::http::{header, Method};
    use axum::middleware;
    use axum::routing::{get, post};
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let api = Router::new()
        .route("/api/elements", get(api::list_elements))
        .route("/api/elements/:name", get(api::get_element))
        .route("/api/search", post(api::search))
        .route("/api/recipes/:algo/:name", get(api::recipe_paths))
        .route("/api/multiple-recipes/:name", get(api::multiple_recipes))
        .route("/api/best-recipes/:name", get(api::best_recipes))
        .route("/api/tree/:algo/:name", get(api::recipe_tree))
        .route("/api/best-recipes-tree/:name", get(api::best_recipes_tree))
        .route(
            "/api/multiple-recipes-tree/:name",
            get(api::multiple_recipes_tree),
        )
        .route("/api/bfs-tree/:name", get(api::bfs_tree))
        .route("/api/dfs-tree/:name", get(api::dfs_tree))
        .route("/api/bidirectional/:name", get(api::bidirectional))
        .route("/api/animate/:name", get(api::animate));

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .layer(middleware::from_fn(api::answer_options))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
