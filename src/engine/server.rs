//! HTTP search endpoint: `GET /search?q=TERM` relays the index's response JSON.
//!
//! An empty or missing `q` is `400`. A failed index call is `500`. Otherwise the response is `200`
//! with the index JSON unchanged.

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Query, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use log::{info, warn};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::engine::zinc::IndexStore;

/// Index handle shared by every request.
pub type SharedStore = Arc<dyn IndexStore>;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
}

/// `GET /search?q=TERM`. The index client is blocking, so the call runs on the blocking pool.
pub async fn search_handler(
    State(store): State<SharedStore>,
    Query(params): Query<SearchParams>,
) -> Response {
    let term = params.q.unwrap_or_default().trim().to_string();
    if term.is_empty() {
        return StatusCode::BAD_REQUEST.into_response();
    }
    match tokio::task::spawn_blocking(move || store.search(&term)).await {
        Ok(Ok(results)) => (StatusCode::OK, Json(results)).into_response(),
        Ok(Err(err)) => {
            warn!("search failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
        Err(err) => {
            warn!("search task failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Any origin may call the endpoint; applied to error responses too.
async fn add_cors_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}

pub fn create_router(store: SharedStore) -> Router {
    Router::new()
        .route("/search", get(search_handler))
        .layer(middleware::from_fn(add_cors_headers))
        .with_state(store)
}

/// Serve the search endpoint on `addr` until Ctrl+C.
pub async fn serve(addr: SocketAddr, store: SharedStore) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {}", addr))?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, create_router(store))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down search server");
        })
        .await
        .context("search server")?;
    Ok(())
}
