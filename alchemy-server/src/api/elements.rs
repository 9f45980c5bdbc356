//! Element listing and lookup

use alchemy_common::Element;
use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use super::ApiResult;
use crate::AppState;

/// GET /api/elements
pub async fn list_elements(State(state): State<AppState>) -> Json<Vec<Element>> {
    Json(state.service.list_elements().to_vec())
}

/// GET /api/elements/:name
///
/// Returns the element record exactly as loaded (after validation).
pub async fn get_element(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Element>> {
    debug!(element = %name, "Element lookup");
    let element = state.service.element(&name)?;
    Ok(Json(element.clone()))
}
