//! Detection orchestrator: live watch, startup scan and periodic scan.

use crate::scan::enqueue_eligible;
use crate::watcher::{FolderWatcher, Stabilizer};
use crate::{DispatchQueue, PostValidator, QueueHandle, ValidationConfig, WatchConfig};
use chrono::Local;
use courier_core::{decode_folder_name, EligibilityWindow};
use courier_error::{ScheduleError, ScheduleErrorKind};
use courier_interface::FolderProcessor;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

/// Feeds the dispatch queue from every detection source.
pub struct Orchestrator {
    config: WatchConfig,
    validation: ValidationConfig,
    processor: Arc<dyn FolderProcessor>,
}

impl Orchestrator {
    /// Orchestrator publishing through `processor`.
    pub fn new(
        config: WatchConfig,
        validation: ValidationConfig,
        processor: Arc<dyn FolderProcessor>,
    ) -> Self {
        Self {
            config,
            validation,
            processor,
        }
    }

    /// Run until Ctrl-C.
    pub async fn run(self) -> Result<(), ScheduleError> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Cannot listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
            info!("Received Ctrl-C");
        })
        .await
    }

    /// Run until `shutdown` completes or the dispatch worker fails.
    ///
    /// # Errors
    ///
    /// An invalid watch root is reported before anything starts. A fatal
    /// worker error ends the run.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ScheduleError>
    where
        F: Future<Output = ()>,
    {
        let root = check_watch_root(self.config.watch_dir()).await?;
        info!(root = %root.display(), "Starting post folder watch");

        let validator = PostValidator::new(self.validation.clone());
        let (queue, worker) = DispatchQueue::new(self.processor.clone(), validator, &root);
        let worker = worker.with_hold_until_due(*self.config.hold_until_due());
        let mut worker_task = tokio::spawn(worker.run());

        let (watcher, mut arrivals) = FolderWatcher::start(&root)?;
        let stabilizer = Stabilizer::new(self.config.stability_quiet(), self.config.stability_poll());
        let mut settling = JoinSet::new();

        let symmetric = self.config.symmetric_window();
        let forward = self.config.forward_window();

        if let Err(e) = enqueue_eligible(&root, symmetric, Local::now().naive_local(), &queue).await {
            warn!(error = %e, "Startup scan failed");
        }

        let period = self.config.process_interval();
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::pin!(shutdown);
        let result = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down");
                    worker_task.abort();
                    break Ok(());
                }
                joined = &mut worker_task => {
                    break match joined {
                        Ok(Ok(())) => Err(ScheduleError::new(ScheduleErrorKind::WorkerStopped(
                            "dispatch queue closed".to_string(),
                        ))),
                        Ok(Err(e)) => Err(e),
                        Err(e) => Err(ScheduleError::new(ScheduleErrorKind::WorkerStopped(
                            e.to_string(),
                        ))),
                    };
                }
                Some(folder) = arrivals.recv() => {
                    if stabilizer.track(&folder) {
                        settling.spawn(settle(folder, stabilizer.clone(), symmetric, queue.clone()));
                    }
                }
                Some(_) = settling.join_next() => {}
                _ = ticker.tick() => {
                    if let Err(e) = enqueue_eligible(&root, forward, Local::now().naive_local(), &queue).await {
                        warn!(error = %e, "Periodic scan failed");
                    }
                }
            }
        };

        settling.shutdown().await;
        drop(watcher);
        if let Err(e) = &result {
            error!(error = %e, "Post folder watch stopped");
        }
        result
    }
}

/// Wait for a new folder to settle, then enqueue it if it is due.
async fn settle(folder: PathBuf, stabilizer: Stabilizer, window: EligibilityWindow, queue: QueueHandle) {
    if !stabilizer.wait_until_stable(&folder).await {
        return;
    }
    let Some(name) = folder.file_name().and_then(|n| n.to_str()) else {
        return;
    };
    let Some(target) = decode_folder_name(name) else {
        return;
    };
    if window.is_time_to_publish(name, target, Local::now().naive_local()) {
        if let Err(e) = queue.enqueue(folder.clone()) {
            warn!(error = %e, "Cannot enqueue new folder");
        }
    } else {
        info!(folder = %name, "New folder is not due yet, leaving it for the periodic scan");
    }
}

/// The watch root must be an existing directory.
pub async fn check_watch_root(root: &Path) -> Result<PathBuf, ScheduleError> {
    if root.as_os_str().is_empty() {
        return Err(ScheduleError::new(ScheduleErrorKind::InvalidWatchRoot(
            "watch directory is not set".to_string(),
        )));
    }
    match tokio::fs::metadata(root).await {
        Ok(meta) if meta.is_dir() => Ok(root.to_path_buf()),
        Ok(_) => Err(ScheduleError::new(ScheduleErrorKind::InvalidWatchRoot(format!(
            "{} is not a directory",
            root.display()
        )))),
        Err(e) => Err(ScheduleError::new(ScheduleErrorKind::InvalidWatchRoot(format!(
            "{}: {}",
            root.display(),
            e
        )))),
    }
}
