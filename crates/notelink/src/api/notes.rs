use super::ApiError;
use crate::server::Server;
use axum::extract::{Path, State};
use axum::Json;
use notelink_core::frontmatter;
use notelink_core::pathguard::resolve_note;
use notelink_core::title::note_title;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct NoteView {
    pub path: String,
    pub title: String,
    pub frontmatter: Option<Map<String, Value>>,
    /// Markdown without the frontmatter block.
    pub body: String,
    /// `body` with every wikilink replaced by a resolution marker.
    pub rendered: String,
}

/// `GET /api/notes/*path`: read a note straight from disk.
///
/// The file is read fresh on every request; only link resolution comes from
/// the published snapshot.
pub async fn read_note(
    State(server): State<Arc<Server>>,
    Path(path): Path<String>,
) -> Result<Json<NoteView>, ApiError> {
    let resolved = resolve_note(server.vault_root(), &path)?;
    let content = tokio::fs::read_to_string(&resolved)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to read {path}: {e}")))?;

    let snapshot = server.snapshot().await?;
    let (frontmatter, body) = frontmatter::split(&content);
    let title = note_title(&content, &path);
    let rendered = snapshot.rewrite(body).into_owned();

    Ok(Json(NoteView {
        title,
        frontmatter,
        body: body.to_string(),
        rendered,
        path,
    }))
}
