//! Animated search over WebSocket
//!
//! The plan is computed before the upgrade so that an unknown element or
//! algorithm is reported with a normal HTTP error. After the upgrade each
//! event is sent as one JSON text frame, paced by the configured step delay.
//! A close frame (or a dropped connection) from the client stops the stream.

use std::time::Duration;

use alchemy_common::animation::AnimationPlan;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, Query, State,
    },
    response::Response,
};
use futures::StreamExt;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{params::parse_algorithm, run_blocking, ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AnimateQuery {
    pub algorithm: Option<String>,
}

/// GET /api/animate/:name?algorithm=bfs|dfs|bidirectional
pub async fn animate(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<AnimateQuery>,
    upgrade: Option<WebSocketUpgrade>,
) -> ApiResult<Response> {
    let algorithm = parse_algorithm(query.algorithm.as_deref())?;
    let plan = run_blocking(&state, move |service| service.animation(&name, algorithm)).await?;

    let Some(upgrade) = upgrade else {
        return Err(ApiError::BadRequest(
            "WebSocket upgrade required".to_string(),
        ));
    };

    info!(
        element = %plan.element,
        %algorithm,
        steps = plan.steps.len(),
        "Starting animation stream"
    );
    let delay = state.step_delay;
    Ok(upgrade.on_upgrade(move |socket| stream_plan(socket, plan, delay)))
}

async fn stream_plan(mut socket: WebSocket, plan: AnimationPlan, delay: Duration) {
    let element = plan.element.clone();
    let events = plan.into_stream(delay);
    futures::pin_mut!(events);

    loop {
        tokio::select! {
            next = events.next() => {
                let Some(event) = next else {
                    debug!(element = %element, "Animation stream complete");
                    break;
                };
                let text = match serde_json::to_string(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Failed to encode animation event: {}", e);
                        break;
                    }
                };
                if socket.send(Message::Text(text)).await.is_err() {
                    debug!(element = %element, "Client went away mid-stream");
                    return;
                }
            }
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => {
                    info!(element = %element, "Client closed animation stream");
                    return;
                }
                Some(Ok(_)) => {}
            },
        }
    }

    if let Err(e) = socket.send(Message::Close(None)).await {
        debug!("Close frame not delivered: {}", e);
    }
}
