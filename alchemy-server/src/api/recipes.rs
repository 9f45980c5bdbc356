//! Path-returning search endpoints

use std::str::FromStr;

use alchemy_common::{
    query::{SearchRequest, SearchResponse},
    SearchAlgorithm,
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use super::{params::parse_count, run_blocking, ApiError, ApiResult};
use crate::AppState;

/// Query parameters of `/api/recipes/:algo/:name`
#[derive(Debug, Default, Deserialize)]
pub struct RecipesQuery {
    #[serde(rename = "maxResults")]
    pub max_results: Option<String>,
}

/// Query parameters carrying only a count
#[derive(Debug, Default, Deserialize)]
pub struct CountQuery {
    pub count: Option<String>,
}

/// POST /api/search
pub async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> ApiResult<Json<SearchResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    info!(
        element = %request.target_element,
        algorithm = request.algorithm.as_deref().unwrap_or("bfs"),
        "Search request"
    );
    let response = run_blocking(&state, move |service| service.search(&request)).await?;
    Ok(Json(response))
}

/// GET /api/recipes/:algo/:name?maxResults=N
pub async fn recipe_paths(
    State(state): State<AppState>,
    Path((algo, name)): Path<(String, String)>,
    Query(query): Query<RecipesQuery>,
) -> ApiResult<Json<SearchResponse>> {
    let algorithm = SearchAlgorithm::from_str(&algo)?;
    let max_results = parse_count(query.max_results.as_deref(), "maxResults")?;
    info!(element = %name, %algorithm, "Recipe paths request");
    let response = run_blocking(&state, move |service| {
        service.recipe_paths(algorithm, &name, max_results)
    })
    .await?;
    Ok(Json(response))
}

/// GET /api/multiple-recipes/:name?count=N
///
/// Paths with distinct primitive anchors first, then distinct element sets.
pub async fn multiple_recipes(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<CountQuery>,
) -> ApiResult<Json<SearchResponse>> {
    let count = parse_count(query.count.as_deref(), "count")?;
    let response =
        run_blocking(&state, move |service| service.multiple_recipes(&name, count)).await?;
    Ok(Json(response))
}

/// GET /api/best-recipes/:name?count=N
pub async fn best_recipes(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<CountQuery>,
) -> ApiResult<Json<SearchResponse>> {
    let count = parse_count(query.count.as_deref(), "count")?;
    let response = run_blocking(&state, move |service| service.best_recipes(&name, count)).await?;
    Ok(Json(response))
}
