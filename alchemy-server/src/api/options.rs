//! Blanket `OPTIONS` handling
//!
//! Preflight requests carrying `Origin` are answered by the CORS layer;
//! anything else with the `OPTIONS` method lands here and gets an empty 200
//! instead of the router's 405.

use axum::{
    extract::Request,
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

pub async fn answer_options(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    next.run(request).await
}
