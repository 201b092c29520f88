use crate::config::Config;
use crate::core::{ArchiveHandler, LabelRegistry};
use crate::error::Result;
use crate::server;
use crate::state::AppState;
use std::future::{Future, IntoFuture};
use std::path::Path;
use tokio::fs;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Starting,
    Serving,
    Draining,
    Terminated,
}

/// Drives the process through start-up, serving, the shutdown export and exit.
pub struct Lifecycle {
    state_tx: watch::Sender<LifecycleState>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        let (state_tx, _) = watch::channel(LifecycleState::Starting);
        Self { state_tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> LifecycleState {
        *self.state_tx.borrow()
    }

    fn transition(&self, next: LifecycleState) {
        info!("Lifecycle: {:?} -> {:?}", self.state(), next);
        self.state_tx.send_replace(next);
    }

    /// Start-up: make sure the images directory exists, load the labels and
    /// clear label folders left by a previous run. Only the first two can fail.
    pub async fn prepare(&self, config: Config) -> Result<AppState> {
        fs::create_dir_all(&config.images_dir).await?;

        let labels = LabelRegistry::load(&config.labels_file).await?;
        info!("Loaded {} label choices", labels.len());

        if let Err(e) = clean_label_subfolders(&config.images_dir).await {
            warn!("Failed to clean label subfolders: {}", e);
        }

        Ok(AppState::new(config, labels))
    }

    /// Serves until `shutdown` resolves, then exports the label folders and
    /// returns. Open connections are not drained.
    pub async fn serve<F>(
        &self,
        state: AppState,
        archiver: &dyn ArchiveHandler,
        shutdown: F,
    ) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let listener = tokio::net::TcpListener::bind(state.config.bind_address()).await?;
        let local = listener.local_addr()?;

        println!("Server starting on http://localhost:{}", local.port());
        info!("Listening on {}", local);

        let app = server::router(state.clone());
        self.transition(LifecycleState::Serving);

        tokio::select! {
            result = axum::serve(listener, app).into_future() => {
                if let Err(e) = result {
                    error!("Server stopped unexpectedly: {}", e);
                }
            }
            _ = shutdown => {
                info!("Received interrupt signal, creating {}", state.config.archive_path.display());
            }
        }

        self.drain(&state, archiver).await;
        Ok(())
    }

    /// Runs the one export of the process. Failures are logged, never returned.
    pub async fn drain(&self, state: &AppState, archiver: &dyn ArchiveHandler) {
        self.transition(LifecycleState::Draining);

        let _exclusive = state.fs_gate.write().await;
        let output = &state.config.archive_path;

        match archiver.create_from_subfolders(state.images_dir(), output).await {
            Ok(summary) => {
                info!(
                    "Successfully created {} ({} files, {} skipped, {} bytes)",
                    output.display(),
                    summary.files_added,
                    summary.files_skipped,
                    summary.bytes_written
                );
                match archiver.list_contents(output).await {
                    Ok(contents) => info!("Archive holds {} entries", contents.total_files),
                    Err(e) => warn!("Could not read back {}: {}", output.display(), e),
                }
            }
            Err(e) => error!("Error creating {}: {}", output.display(), e),
        }

        self.transition(LifecycleState::Terminated);
    }
}

/// Removes every directory directly below `images_dir` so each run starts
/// with all images unlabeled. Individual failures are logged and skipped.
pub async fn clean_label_subfolders(images_dir: &Path) -> Result<()> {
    let mut entries = fs::read_dir(images_dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }

        let path = entry.path();
        match fs::remove_dir_all(&path).await {
            Ok(()) => info!("Cleaned label subfolder: {}", entry.file_name().to_string_lossy()),
            Err(e) => warn!("Failed to remove directory {}: {}", path.display(), e),
        }
    }

    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ZipHandler;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::tempdir;

    fn test_config(root: &Path) -> Config {
        Config {
            images_dir: root.join("images"),
            labels_file: root.join("labels.txt"),
            archive_path: root.join("result.zip"),
            host: "127.0.0.1".to_string(),
            port: 18081,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_prepare_creates_dir_and_cleans_subfolders() {
        let root = tempdir().unwrap();
        let config = test_config(root.path());
        fs::write(&config.labels_file, "A\nB\n").await.unwrap();
        fs::create_dir_all(config.images_dir.join("A")).await.unwrap();
        fs::write(config.images_dir.join("A").join("old.png"), b"x").await.unwrap();
        fs::write(config.images_dir.join("new.png"), b"x").await.unwrap();

        let lifecycle = Lifecycle::new();
        let state = lifecycle.prepare(config.clone()).await.unwrap();

        assert_eq!(state.labels.len(), 2);
        assert!(!config.images_dir.join("A").exists());
        assert!(config.images_dir.join("new.png").exists());
        assert_eq!(lifecycle.state(), LifecycleState::Starting);
    }

    #[tokio::test]
    async fn test_prepare_fails_without_labels() {
        let root = tempdir().unwrap();
        let config = test_config(root.path());

        let result = Lifecycle::new().prepare(config.clone()).await;

        assert!(result.is_err());
        // the working directory is still created before labels are read
        assert!(config.images_dir.is_dir());
    }

    #[tokio::test]
    async fn test_drain_archives_and_terminates() {
        let root = tempdir().unwrap();
        let config = test_config(root.path());
        fs::write(&config.labels_file, "A\nB\n").await.unwrap();

        let lifecycle = Lifecycle::new();
        let mut states = lifecycle.subscribe();
        let state = lifecycle.prepare(config.clone()).await.unwrap();
        fs::create_dir_all(config.images_dir.join("B")).await.unwrap();
        fs::write(config.images_dir.join("B").join("cat.png"), b"x").await.unwrap();

        lifecycle.drain(&state, &ZipHandler).await;

        assert_eq!(*states.borrow_and_update(), LifecycleState::Terminated);
        let info = ZipHandler.list_contents(&config.archive_path).await.unwrap();
        assert_eq!(info.entries[0].path, "B/cat.png");
    }

    #[tokio::test]
    async fn test_drain_failure_still_terminates() {
        let root = tempdir().unwrap();
        let mut config = test_config(root.path());
        fs::write(&config.labels_file, "A\n").await.unwrap();
        config.archive_path = PathBuf::from(root.path()).join("missing-dir").join("result.zip");

        let lifecycle = Lifecycle::new();
        let state = lifecycle.prepare(config).await.unwrap();
        lifecycle.drain(&state, &ZipHandler).await;

        assert_eq!(lifecycle.state(), LifecycleState::Terminated);
    }

    #[tokio::test]
    async fn test_drain_waits_for_in_flight_moves() {
        let root = tempdir().unwrap();
        let config = test_config(root.path());
        fs::write(&config.labels_file, "A\n").await.unwrap();

        let lifecycle = Arc::new(Lifecycle::new());
        let state = lifecycle.prepare(config.clone()).await.unwrap();
        let mut states = lifecycle.subscribe();

        // a label assignment in progress
        let move_guard = state.fs_gate.clone().read_owned().await;

        let export = tokio::spawn({
            let lifecycle = lifecycle.clone();
            let state = state.clone();
            async move { lifecycle.drain(&state, &ZipHandler).await }
        });

        states
            .wait_for(|s| *s == LifecycleState::Draining)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!export.is_finished());
        assert_eq!(lifecycle.state(), LifecycleState::Draining);
        assert!(!config.archive_path.exists());

        drop(move_guard);
        export.await.unwrap();

        assert_eq!(lifecycle.state(), LifecycleState::Terminated);
        assert!(config.archive_path.exists());
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let root = tempdir().unwrap();
        let mut config = test_config(root.path());
        config.port = 0;
        fs::write(&config.labels_file, "A\n").await.unwrap();

        let lifecycle = Lifecycle::new();
        let state = lifecycle.prepare(config.clone()).await.unwrap();
        lifecycle
            .serve(state, &ZipHandler, async {})
            .await
            .unwrap();

        assert_eq!(lifecycle.state(), LifecycleState::Terminated);
        assert!(config.archive_path.exists());
    }
}
