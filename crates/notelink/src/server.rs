use crate::api::{router, ApiError};
use crate::config::Settings;
use notelink_core::{FsVault, IndexStore, NoteSource, SnippetOptions, VaultSnapshot};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared state behind every request.
pub struct Server {
    store: IndexStore,
    vault_root: PathBuf,
    snippet: SnippetOptions,
}

impl Server {
    pub fn new(settings: &Settings) -> Self {
        let vault = FsVault::new(&settings.vault_dir).with_skip_prefixes(settings.skip_prefixes.clone());
        Self::with_source(Arc::new(vault), settings.vault_dir.clone(), settings.snippet)
    }

    /// Serve notes from `source`; note reads go through `vault_root`.
    pub fn with_source(
        source: Arc<dyn NoteSource>,
        vault_root: PathBuf,
        snippet: SnippetOptions,
    ) -> Self {
        Self {
            store: IndexStore::new(source),
            vault_root,
            snippet,
        }
    }

    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    pub fn vault_root(&self) -> &Path {
        &self.vault_root
    }

    pub fn snippet(&self) -> &SnippetOptions {
        &self.snippet
    }

    /// The published snapshot, scanning the vault on a blocking thread if
    /// none exists yet.
    pub async fn snapshot(self: &Arc<Self>) -> Result<Arc<VaultSnapshot>, ApiError> {
        if let Ok(snapshot) = self.store.current() {
            return Ok(snapshot);
        }
        let server = self.clone();
        Ok(tokio::task::spawn_blocking(move || server.store.snapshot())
            .await
            .map_err(|e| ApiError::Internal(format!("index build task failed: {e}")))??)
    }

    /// Rescan the vault and publish a new epoch.
    pub async fn refresh(self: &Arc<Self>) -> Result<Arc<VaultSnapshot>, ApiError> {
        let server = self.clone();
        Ok(tokio::task::spawn_blocking(move || server.store.refresh())
            .await
            .map_err(|e| ApiError::Internal(format!("index refresh task failed: {e}")))??)
    }

    /// Drop the published snapshot; the next read rebuilds from disk.
    pub fn invalidate(&self) -> Option<u64> {
        self.store.invalidate()
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn serve(
        self: Arc<Self>,
        addr: std::net::SocketAddr,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(
            "Serving vault {} on http://{}",
            self.vault_root.display(),
            listener.local_addr()?
        );

        axum::serve(listener, router::api_routes(self))
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}
