use super::ApiError;
use crate::server::Server;
use axum::extract::{Query, State};
use axum::Json;
use notelink_core::Backlink;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct BacklinksQuery {
    filename: Option<String>,
    /// Overrides the configured `snippet.mark` for this request.
    mark: Option<bool>,
}

/// `GET /api/backlinks?filename=F`: notes whose wikilinks target `F`.
///
/// An unknown or blank filename gives `[]`; only a missing parameter is an
/// error.
pub async fn backlinks(
    State(server): State<Arc<Server>>,
    Query(query): Query<BacklinksQuery>,
) -> Result<Json<Vec<Backlink>>, ApiError> {
    let filename = query
        .filename
        .ok_or_else(|| ApiError::BadRequest("missing required parameter: filename".into()))?;

    let mut options = *server.snippet();
    if let Some(mark) = query.mark {
        options.mark = mark;
    }

    let snapshot = server.snapshot().await?;
    Ok(Json(snapshot.backlinks(&filename, &options)))
}
