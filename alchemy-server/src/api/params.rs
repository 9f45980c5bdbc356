//! Query-string parsing shared by the handlers
//!
//! Parameters arrive as raw strings so that a bad value produces the
//! service's JSON error body rather than the extractor's plain-text rejection.

use std::str::FromStr;

use alchemy_common::{SearchAlgorithm, TreeFlavor};

use super::{ApiError, ApiResult};

/// Parse an optional numeric parameter
pub fn parse_count(raw: Option<&str>, field: &str) -> ApiResult<Option<usize>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse::<usize>()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("invalid {}: {}", field, value))),
    }
}

/// Parse an optional boolean flag (`true`/`false`/`1`/`0`, absent = false)
pub fn parse_flag(raw: Option<&str>, field: &str) -> ApiResult<bool> {
    match raw.map(str::trim) {
        None | Some("") => Ok(false),
        Some(value) if value.eq_ignore_ascii_case("true") || value == "1" => Ok(true),
        Some(value) if value.eq_ignore_ascii_case("false") || value == "0" => Ok(false),
        Some(value) => Err(ApiError::BadRequest(format!("invalid {}: {}", field, value))),
    }
}

/// Parse a search algorithm, defaulting to BFS
pub fn parse_algorithm(raw: Option<&str>) -> ApiResult<SearchAlgorithm> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(SearchAlgorithm::Bfs),
        Some(value) => Ok(SearchAlgorithm::from_str(value)?),
    }
}

/// Parse a tree flavor, falling back to `default` when absent
pub fn parse_flavor(raw: Option<&str>, default: TreeFlavor) -> ApiResult<TreeFlavor> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(value) => Ok(TreeFlavor::from_str(value)?),
    }
}
