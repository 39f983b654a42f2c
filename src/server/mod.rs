mod handlers;
mod state;

use axum::routing::{get, post};
use axum::Router;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::overpass::OverpassClient;
use crate::search::GeoSearch;

pub fn build_router(config: &Config) -> Router {
    let client = OverpassClient::new(&config.overpass);
    let state = Arc::new(AppState::new(GeoSearch::new(client, config.search.clone())));

    Router::new()
        .route("/api/tools", get(handlers::tool_list))
        .route("/api/tools/call", post(handlers::call_tool))
        .route("/api/city", get(handlers::city))
        .route("/api/poi", get(handlers::poi))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(config: &Config) -> std::io::Result<()> {
    let app = build_router(config);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        error!(%addr, error = %e, "cannot bind");
        e
    })?;

    info!(%addr, endpoint = %config.overpass.endpoint, "geo assistant server listening");
    eprintln!("  Geo assistant server listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app).await
}
