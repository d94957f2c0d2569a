//! Serialized dispatch of post folders.
//!
//! Any number of [`QueueHandle`]s push folder paths; a single [`QueueWorker`]
//! takes them in enqueue order and finishes each one (validation, publishing
//! and relocation) before looking at the next.

use crate::relocate::{relocate, Archive};
use crate::PostValidator;
use chrono::Local;
use courier_core::decode_folder_name;
use courier_error::{ScheduleError, ScheduleErrorKind};
use courier_interface::FolderProcessor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// What happened to one queue item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Published and moved to the given path
    Published(PathBuf),
    /// Rejected or failed and moved to the given path
    Failed(PathBuf),
    /// Folder no longer existed
    Skipped,
}

/// Builds the two halves of a dispatch queue.
pub struct DispatchQueue;

impl DispatchQueue {
    /// Create a queue for folders under `watch_root`.
    pub fn new(
        processor: Arc<dyn FolderProcessor>,
        validator: PostValidator,
        watch_root: impl Into<PathBuf>,
    ) -> (QueueHandle, QueueWorker) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = QueueWorker {
            rx,
            processor,
            validator,
            watch_root: watch_root.into(),
            hold_until_due: true,
        };
        (QueueHandle { tx }, worker)
    }
}

/// Enqueue side of the dispatch queue.
#[derive(Debug, Clone)]
pub struct QueueHandle {
    tx: mpsc::UnboundedSender<PathBuf>,
}

impl QueueHandle {
    /// Append a folder to the queue.
    pub fn enqueue(&self, folder: impl Into<PathBuf>) -> Result<(), ScheduleError> {
        let folder = folder.into();
        debug!(folder = %folder.display(), "Enqueueing post folder");
        self.tx.send(folder).map_err(|e| {
            error!("Dispatch worker is no longer receiving");
            ScheduleError::new(ScheduleErrorKind::WorkerStopped(format!(
                "cannot enqueue {}",
                e.0.display()
            )))
        })
    }
}

/// Processes queued folders one at a time.
pub struct QueueWorker {
    rx: mpsc::UnboundedReceiver<PathBuf>,
    processor: Arc<dyn FolderProcessor>,
    validator: PostValidator,
    watch_root: PathBuf,
    hold_until_due: bool,
}

impl QueueWorker {
    /// Whether to wait for a folder's scheduled minute before publishing.
    pub fn with_hold_until_due(mut self, hold: bool) -> Self {
        self.hold_until_due = hold;
        self
    }

    /// Run until every handle is dropped and the queue is drained.
    ///
    /// # Errors
    ///
    /// Returns the first relocation failure. Publishing and validation
    /// failures are not errors here; they move the folder to `_failed`.
    pub async fn run(mut self) -> Result<(), ScheduleError> {
        info!(watch_root = %self.watch_root.display(), "Dispatch worker started");
        while let Some(folder) = self.rx.recv().await {
            match self.dispatch(&folder).await {
                Ok(outcome) => debug!(?outcome, "Queue item done"),
                Err(e) => {
                    error!(error = %e, folder = %folder.display(), "Dispatch worker stopping");
                    return Err(e);
                }
            }
        }
        info!("Dispatch queue closed");
        Ok(())
    }

    #[instrument(skip(self), fields(folder = %folder.display()))]
    async fn dispatch(&self, folder: &Path) -> Result<DispatchOutcome, ScheduleError> {
        if !tokio::fs::try_exists(folder).await.unwrap_or(false) {
            warn!("Folder no longer exists, skipping");
            return Ok(DispatchOutcome::Skipped);
        }

        if self.hold_until_due {
            self.hold(folder).await;
        }

        let settings = match self.validator.validate(folder).await {
            Ok(settings) => settings,
            Err(report) => {
                warn!(reasons = report.reasons().len(), "Post folder rejected");
                let destination = relocate(folder, &self.watch_root, Archive::Failed).await?;
                return Ok(DispatchOutcome::Failed(destination));
            }
        };

        info!(post = %settings.summary(), "Publishing post folder");
        match self.processor.process(folder, &settings).await {
            Ok(()) => {
                info!("Post published");
                let destination = relocate(folder, &self.watch_root, Archive::Published).await?;
                Ok(DispatchOutcome::Published(destination))
            }
            Err(e) => {
                error!(error = %e, "Post failed");
                let destination = relocate(folder, &self.watch_root, Archive::Failed).await?;
                Ok(DispatchOutcome::Failed(destination))
            }
        }
    }

    /// Sleep until the folder's scheduled minute if it lies ahead.
    async fn hold(&self, folder: &Path) {
        let Some(target) = folder
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(decode_folder_name)
        else {
            return;
        };
        let now = Local::now().naive_local();
        if let Ok(wait) = (target - now).to_std() {
            info!(wait_secs = wait.as_secs(), "Holding folder until its scheduled time");
            tokio::time::sleep(wait).await;
        }
    }
}
