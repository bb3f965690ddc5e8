use super::{backlinks, get_links, notes, wikilinks};
use crate::server::Server;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn api_routes(server: Arc<Server>) -> Router {
    Router::new()
        .route("/api/healthz", get(healthz))
        .route("/api/wikilinks/index", get(wikilinks::index))
        .route("/api/wikilinks/resolve", get(wikilinks::resolve))
        .route("/api/wikilinks/refresh", post(wikilinks::refresh))
        .route("/api/wikilinks/invalidate", post(wikilinks::invalidate))
        .route("/api/backlinks", get(backlinks::backlinks))
        .route("/api/links/*path", get(get_links::get_links))
        .route("/api/notes/*path", get(notes::read_note))
        .with_state(server)
}

async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
