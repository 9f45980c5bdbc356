//! Tree-returning endpoints
//!
//! The multi-threaded queries hand a cancellation token to their workers;
//! the token is cancelled when the handler future is dropped, so a client
//! that disconnects stops the search.

use std::str::FromStr;

use alchemy_common::{
    query::{BidirectionalOptions, BidirectionalResponse, CountParam, TreeResponse, TreesResponse},
    TreeFlavor,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{
    params::{parse_count, parse_flag, parse_flavor},
    run_blocking, ApiResult,
};
use crate::AppState;

/// Query parameters of the flavored tree listings
#[derive(Debug, Default, Deserialize)]
pub struct FlavoredTreesQuery {
    pub count: Option<String>,
    pub algorithm: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BfsTreeQuery {
    pub count: Option<String>,
    pub multithreaded: Option<String>,
}

/// `count` may be a number or `all`; `all=true` is equivalent
#[derive(Debug, Default, Deserialize)]
pub struct DfsTreeQuery {
    pub count: Option<String>,
    pub all: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BidirectionalQuery {
    pub count: Option<String>,
    pub multithreaded: Option<String>,
    pub single: Option<String>,
    pub tree: Option<String>,
}

/// GET /api/tree/:algo/:name
pub async fn recipe_tree(
    State(state): State<AppState>,
    Path((algo, name)): Path<(String, String)>,
) -> ApiResult<Json<TreeResponse>> {
    let flavor = TreeFlavor::from_str(&algo)?;
    let response = run_blocking(&state, move |service| service.tree(flavor, &name)).await?;
    Ok(Json(response))
}

/// GET /api/best-recipes-tree/:name?count=N&algorithm=bfs|dfs
pub async fn best_recipes_tree(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<FlavoredTreesQuery>,
) -> ApiResult<Json<TreesResponse>> {
    let count = parse_count(query.count.as_deref(), "count")?;
    let flavor = parse_flavor(query.algorithm.as_deref(), TreeFlavor::Bfs)?;
    let response = run_blocking(&state, move |service| {
        service.best_recipe_trees(&name, count, flavor)
    })
    .await?;
    Ok(Json(response))
}

/// GET /api/multiple-recipes-tree/:name?count=N&algorithm=dfs|bfs
///
/// Defaults to the DFS enumerator.
pub async fn multiple_recipes_tree(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<FlavoredTreesQuery>,
) -> ApiResult<Json<TreesResponse>> {
    let count = parse_count(query.count.as_deref(), "count")?;
    let flavor = parse_flavor(query.algorithm.as_deref(), TreeFlavor::Dfs)?;
    info!(element = %name, %flavor, "Multiple recipe trees request");

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let response = state
        .service
        .multiple_recipe_trees(&name, count, flavor, cancel)
        .await?;
    Ok(Json(response))
}

/// GET /api/bfs-tree/:name?count=N&multithreaded=true
pub async fn bfs_tree(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<BfsTreeQuery>,
) -> ApiResult<Json<TreesResponse>> {
    let count = parse_count(query.count.as_deref(), "count")?;
    let multithreaded = parse_flag(query.multithreaded.as_deref(), "multithreaded")?;
    info!(element = %name, multithreaded, "BFS trees request");

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let response = state
        .service
        .bfs_trees(&name, count, multithreaded, cancel)
        .await?;
    Ok(Json(response))
}

/// GET /api/dfs-tree/:name?count=N|all&all=true
pub async fn dfs_tree(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<DfsTreeQuery>,
) -> ApiResult<Json<TreesResponse>> {
    let all = parse_flag(query.all.as_deref(), "all")?;
    let count = match query.count.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        _ if all => Some(CountParam::All),
        Some(raw) => Some(CountParam::from_str(raw)?),
        None => None,
    };
    info!(element = %name, ?count, "DFS trees request");
    let response = run_blocking(&state, move |service| service.dfs_trees(&name, count)).await?;
    Ok(Json(response))
}

/// GET /api/bidirectional/:name?count=N&multithreaded=&single=&tree=
///
/// Returns paths with meeting points, or trees when `tree=true`.
pub async fn bidirectional(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<BidirectionalQuery>,
) -> ApiResult<Json<BidirectionalResponse>> {
    let options = BidirectionalOptions {
        count: parse_count(query.count.as_deref(), "count")?,
        multithreaded: parse_flag(query.multithreaded.as_deref(), "multithreaded")?,
        single: parse_flag(query.single.as_deref(), "single")?,
        tree: parse_flag(query.tree.as_deref(), "tree")?,
    };
    info!(element = %name, ?options, "Bidirectional request");

    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let response = state.service.bidirectional(&name, options, cancel).await?;
    Ok(Json(response))
}
