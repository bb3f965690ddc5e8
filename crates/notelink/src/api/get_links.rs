use super::ApiError;
use crate::server::Server;
use axum::extract::{Path, State};
use axum::Json;
use notelink_core::pathguard::validate_note_path;
use notelink_core::{Backlink, Resolution};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct NoteLinks {
    pub path: String,
    pub filename: String,
    /// Notes linking to this one.
    pub backlinks: Vec<Backlink>,
    /// Wikilinks in this note, resolved, in document order.
    pub forward_links: Vec<Resolution>,
}

/// `GET /api/links/*path`: backlinks and forward links of one note.
pub async fn get_links(
    State(server): State<Arc<Server>>,
    Path(path): Path<String>,
) -> Result<Json<NoteLinks>, ApiError> {
    let path = validate_note_path(&path)?;
    let snapshot = server.snapshot().await?;

    let note = snapshot
        .note(path)
        .ok_or_else(|| ApiError::NotFound(format!("note not found: {path}")))?;
    let filename = note
        .filename()
        .ok_or_else(|| ApiError::NotFound(format!("not a note: {path}")))?
        .to_string();

    let backlinks = snapshot.backlinks(&filename, server.snippet());
    let forward_links = snapshot.forward_links(path).unwrap_or_default();

    Ok(Json(NoteLinks {
        path: path.to_string(),
        filename,
        backlinks,
        forward_links,
    }))
}
