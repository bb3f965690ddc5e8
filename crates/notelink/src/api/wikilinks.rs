use super::ApiError;
use crate::server::Server;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use notelink_core::matching::link_key;
use notelink_core::Resolution;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// `GET /api/wikilinks/index`: the full filename index.
pub async fn index(State(server): State<Arc<Server>>) -> Result<Response, ApiError> {
    let snapshot = server.snapshot().await?;
    Ok(Json(snapshot.index()).into_response())
}

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    target: Option<String>,
}

/// `GET /api/wikilinks/resolve?target=T`
pub async fn resolve(
    State(server): State<Arc<Server>>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<Resolution>, ApiError> {
    let target = query
        .target
        .as_deref()
        .map(link_key)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing required parameter: target".into()))?;

    let snapshot = server.snapshot().await?;
    let verdict = snapshot.resolve(target);
    tracing::debug!("Resolved {:?} at epoch {}: {:?}", target, snapshot.epoch(), verdict);

    Ok(Json(Resolution {
        target: target.to_string(),
        display: target.to_string(),
        verdict,
    }))
}

/// `POST /api/wikilinks/refresh`: rescan the vault and publish a new epoch.
pub async fn refresh(State(server): State<Arc<Server>>) -> Result<Json<Value>, ApiError> {
    let snapshot = server.refresh().await?;
    Ok(Json(json!({
        "epoch": snapshot.epoch(),
        "built_at": snapshot.built_at(),
        "notes": snapshot.notes().len(),
        "filenames": snapshot.index().len(),
    })))
}

/// `POST /api/wikilinks/invalidate`: end the current epoch without rescanning.
/// The next request that needs the index rebuilds it.
pub async fn invalidate(State(server): State<Arc<Server>>) -> Json<Value> {
    Json(json!({ "invalidated": server.invalidate() }))
}
