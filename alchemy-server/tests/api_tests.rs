//! Integration tests for alchemy-server API endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - Element listing and lookup
//! - Path queries (search body, recipes, multiple/best recipes)
//! - Tree queries (single, best, multiple, bfs/dfs enumeration, bidirectional)
//! - Animation endpoint validation before upgrade
//! - Error statuses, CORS and OPTIONS handling

use std::time::Duration;

use alchemy_common::config::QueryLimits;
use alchemy_common::{Corpus, RecipeService};
use alchemy_server::{build_router, AppState};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::util::ServiceExt; // for `oneshot` method

const TEST_CORPUS: &str = r#"[
    {"name": "Water", "tier": 1, "image": "https://img.example/water.png"},
    {"name": "Fire", "tier": 1},
    {"name": "Earth", "tier": 1},
    {"name": "Air", "tier": 1},
    {"name": "Steam", "tier": 2, "recipes": [{"ingredients": ["Water", "Fire"]}]},
    {"name": "Lava", "tier": 2, "recipes": [{"ingredients": ["Fire", "Earth"]}]},
    {"name": "Energy", "tier": 2, "recipes": [{"ingredients": ["Fire", "Air"]}]},
    {"name": "Stone", "tier": 3, "recipes": [{"ingredients": ["Lava", "Air"]}]},
    {"name": "Brick", "tier": 4, "recipes": [{"ingredients": ["Stone", "Fire"]}]},
    {"name": "Hot Spring", "tier": 3, "recipes": [{"ingredients": ["Steam", "Earth"]}]}
]"#;

/// Test helper: Create app over the in-memory corpus
fn setup_app() -> axum::Router {
    let corpus = Corpus::from_json_str(TEST_CORPUS).expect("test corpus should load");
    let service = RecipeService::from_corpus(corpus, QueryLimits::default());
    build_router(AppState::new(service, Duration::ZERO))
}

/// Test helper: Create request
fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: Create JSON POST request
fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Test helper: Element names of a serialized path
fn path_names(path: &Value) -> Vec<&str> {
    path.as_array()
        .expect("path should be an array")
        .iter()
        .map(|node| node["element"].as_str().unwrap())
        .collect()
}

// =============================================================================
// Health Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app();

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "alchemy-server");
    assert!(body["version"].is_string());
}

// =============================================================================
// Element Tests
// =============================================================================

#[tokio::test]
async fn test_list_elements() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/elements"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_get_primitive_element() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/elements/Water"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["name"], "Water");
    assert_eq!(body["tier"], 1);
    assert_eq!(body["recipes"], json!([]));
    assert_eq!(body["image"], "https://img.example/water.png");
}

#[tokio::test]
async fn test_get_element_with_encoded_space() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/elements/Hot%20Spring"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["name"], "Hot Spring");
    assert_eq!(body["recipes"][0]["ingredients"], json!(["Steam", "Earth"]));
}

#[tokio::test]
async fn test_get_unknown_element_is_404() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/elements/Unobtainium"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Unobtainium"));
}

// =============================================================================
// Path Query Tests
// =============================================================================

#[tokio::test]
async fn test_recipes_bfs_steam() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/recipes/bfs/Steam"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let paths = body["paths"].as_array().unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(path_names(&paths[0]), vec!["Water", "Fire", "Steam"]);
    assert_eq!(paths[0][2]["ingredients"], json!(["Water", "Fire"]));
    assert_eq!(paths[0][0]["imagePath"], "https://img.example/water.png");
    assert!(paths[0][0].get("ingredients").is_none());
    assert!(body["nodesVisited"].as_u64().unwrap() >= 5);
    assert!(body["timeElapsed"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_recipes_dfs_paths_start_with_primitives() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/recipes/dfs/Stone?maxResults=3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let paths = body["paths"].as_array().unwrap();
    assert_eq!(paths.len(), 1);
    let names = path_names(&paths[0]);
    assert_eq!(names.last(), Some(&"Stone"));
    assert!(["Water", "Fire", "Earth", "Air"].contains(&names[0]));
}

#[tokio::test]
async fn test_recipes_invalid_algorithm_is_400() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/recipes/astar/Steam"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "INVALID_ALGORITHM");
}

#[tokio::test]
async fn test_recipes_malformed_max_results_is_400() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/recipes/bfs/Steam?maxResults=lots"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_post() {
    let app = setup_app();

    let request = json_request(
        "/api/search",
        json!({"targetElement": "Energy", "algorithm": "bidirectional", "maxResults": 1}),
    );
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(path_names(&body["paths"][0]), vec!["Fire", "Air", "Energy"]);
}

#[tokio::test]
async fn test_search_malformed_body_is_400() {
    let app = setup_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/search")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_search_empty_target_is_400() {
    let app = setup_app();

    let request = json_request("/api/search", json!({"algorithm": "bfs"}));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_wrong_method_is_405() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/search"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_best_recipes_brick() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/best-recipes/Brick?count=2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let paths = body["paths"].as_array().unwrap();
    assert!(!paths.is_empty());
    assert!(paths.len() <= 2);

    let lengths: Vec<usize> = paths.iter().map(|p| p.as_array().unwrap().len()).collect();
    let mut sorted = lengths.clone();
    sorted.sort();
    assert_eq!(lengths, sorted);

    let brick = paths[0].as_array().unwrap().last().unwrap();
    assert_eq!(brick["element"], "Brick");
    let mut ingredients: Vec<&str> = brick["ingredients"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    ingredients.sort();
    assert_eq!(ingredients, vec!["Fire", "Stone"]);
}

#[tokio::test]
async fn test_multiple_recipes_unknown_element_is_404() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/multiple-recipes/Nothing?count=2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Tree Query Tests
// =============================================================================

#[tokio::test]
async fn test_single_tree() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/tree/dfs/Stone"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["tree"]["name"], "Stone");
    // False flags are left out of the JSON
    assert!(body["tree"].get("isBaseElement").is_none());
    assert!(body["tree"].get("noRecipe").is_none());
    assert_eq!(body["nodesVisited"], 5);
}

#[tokio::test]
async fn test_tree_rejects_bidirectional_flavor() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/tree/bidirectional/Stone"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_multiple_recipes_tree_stone() {
    let app = setup_app();

    let response = app
        .oneshot(test_request(
            "GET",
            "/api/multiple-recipes-tree/Stone?count=2&algorithm=dfs",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let trees = body["trees"].as_array().unwrap();
    assert_eq!(trees.len(), 1);
    assert_eq!(body["totalTreeNodes"], 5);
    assert_eq!(body["algorithm"], "dfs");

    let stone = &trees[0];
    assert_eq!(stone["name"], "Stone");
    assert_eq!(stone["ingredients"][0]["name"], "Lava");
    assert_eq!(stone["ingredients"][1]["name"], "Air");
    assert_eq!(stone["ingredients"][1]["isBaseElement"], true);
    assert_eq!(stone["ingredients"][0]["ingredients"][0]["name"], "Fire");
    assert_eq!(stone["ingredients"][0]["ingredients"][1]["name"], "Earth");
}

#[tokio::test]
async fn test_multiple_recipes_tree_default_flavor() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/multiple-recipes-tree/Stone?count=2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["trees"].as_array().unwrap().len(), 1);
    assert_eq!(body["algorithm"], "dfs");
}

#[tokio::test]
async fn test_multiple_recipes_tree_bfs_flavor() {
    let app = setup_app();

    let response = app
        .oneshot(test_request(
            "GET",
            "/api/multiple-recipes-tree/Brick?count=2&algorithm=bfs",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["trees"][0]["name"], "Brick");
    assert_eq!(body["algorithm"], "bfs");
}

#[tokio::test]
async fn test_best_recipes_tree() {
    let app = setup_app();

    let response = app
        .oneshot(test_request(
            "GET",
            "/api/best-recipes-tree/Brick?count=1&algorithm=bfs",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let trees = body["trees"].as_array().unwrap();
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0]["name"], "Brick");
}

#[tokio::test]
async fn test_bfs_tree_multithreaded() {
    let app = setup_app();

    let response = app
        .oneshot(test_request(
            "GET",
            "/api/bfs-tree/Brick?count=3&multithreaded=true",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["trees"].as_array().unwrap().len(), 1);
    assert_eq!(body["algorithm"], "bfs");
}

#[tokio::test]
async fn test_bfs_tree_malformed_flag_is_400() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/bfs-tree/Brick?multithreaded=maybe"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_dfs_tree_count_all() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/dfs-tree/Stone?count=all"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["trees"].as_array().unwrap().len(), 1);
    assert_eq!(body["algorithm"], "dfs");
}

#[tokio::test]
async fn test_dfs_tree_primitive() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/dfs-tree/Fire?all=true"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let trees = body["trees"].as_array().unwrap();
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0]["isBaseElement"], true);
    assert_eq!(trees[0]["ingredients"], json!([]));
}

#[tokio::test]
async fn test_dfs_tree_bad_count_is_400() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/dfs-tree/Stone?count=many"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bidirectional_energy() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/bidirectional/Energy"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let paths = body["paths"].as_array().unwrap();
    assert_eq!(paths.len(), 1);
    assert_eq!(path_names(&paths[0]), vec!["Fire", "Air", "Energy"]);
    assert_eq!(body["meetingPoints"], json!(["Energy"]));
}

#[tokio::test]
async fn test_bidirectional_tree_mode() {
    let app = setup_app();

    let response = app
        .oneshot(test_request(
            "GET",
            "/api/bidirectional/Brick?tree=true&multithreaded=true",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["trees"][0]["name"], "Brick");
    assert_eq!(body["algorithm"], "bidirectional");
    assert!(body.get("meetingPoints").is_none());
}

#[tokio::test]
async fn test_tree_endpoints_primitive_shortcut() {
    let uris = [
        "/api/best-recipes-tree/Water?algorithm=bfs",
        "/api/best-recipes-tree/Water?algorithm=dfs",
        "/api/multiple-recipes-tree/Water?algorithm=bfs",
        "/api/multiple-recipes-tree/Water?algorithm=dfs",
        "/api/bfs-tree/Water?multithreaded=true",
        "/api/dfs-tree/Water?count=all",
        "/api/bidirectional/Water?tree=true",
        "/api/bidirectional/Water?tree=true&multithreaded=true",
    ];

    for uri in uris {
        let app = setup_app();
        let response = app.oneshot(test_request("GET", uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);

        let body = extract_json(response.into_body()).await;
        let trees = body["trees"].as_array().unwrap();
        assert_eq!(trees.len(), 1, "{}", uri);
        assert_eq!(trees[0]["name"], "Water", "{}", uri);
        assert_eq!(trees[0]["isBaseElement"], true, "{}", uri);
        assert!(
            body["nodesVisited"].as_u64().unwrap() <= 1,
            "{} visited {}",
            uri,
            body["nodesVisited"]
        );
    }
}

// =============================================================================
// Animation Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_animate_unknown_element_is_404() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/animate/Nothing"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_animate_invalid_algorithm_is_400() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/animate/Steam?algorithm=astar"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_animate_without_upgrade_is_400() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("GET", "/api/animate/Steam?algorithm=bfs"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = extract_json(response.into_body()).await;
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("WebSocket"));
}

// =============================================================================
// CORS and OPTIONS Tests
// =============================================================================

#[tokio::test]
async fn test_bare_options_answers_200() {
    let app = setup_app();

    let response = app
        .oneshot(test_request("OPTIONS", "/api/elements"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = setup_app();

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/search")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_cors_header_on_get() {
    let app = setup_app();

    let request = Request::builder()
        .method("GET")
        .uri("/api/elements/Fire")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
