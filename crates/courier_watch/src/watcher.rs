//! Live filesystem watch of the watch root.

use courier_core::is_post_folder_name;
use courier_error::{ScheduleError, ScheduleErrorKind};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

/// Non-recursive watcher reporting post folders that appear in the root.
///
/// Dropping the watcher stops the event stream.
pub struct FolderWatcher {
    _watcher: RecommendedWatcher,
}

impl FolderWatcher {
    /// Start watching `root`.
    ///
    /// The receiver yields paths of post-named entries created in or renamed
    /// into the root.
    pub fn start(root: &Path) -> Result<(Self, mpsc::UnboundedReceiver<PathBuf>), ScheduleError> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            match result {
                Ok(event) => {
                    for path in arrivals(&event) {
                        if tx.send(path).is_err() {
                            return;
                        }
                    }
                }
                Err(e) => error!(error = %e, "Filesystem watch error"),
            }
        })
        .map_err(|e| ScheduleError::new(ScheduleErrorKind::Watcher(e.to_string())))?;

        watcher
            .watch(root, RecursiveMode::NonRecursive)
            .map_err(|e| {
                ScheduleError::new(ScheduleErrorKind::Watcher(format!(
                    "cannot watch {}: {}",
                    root.display(),
                    e
                )))
            })?;
        info!(root = %root.display(), "Watching for new post folders");
        Ok((Self { _watcher: watcher }, rx))
    }
}

/// Post-named paths an event brings into the watched directory.
pub fn arrivals(event: &Event) -> Vec<PathBuf> {
    let paths: Vec<&PathBuf> = match event.kind {
        EventKind::Create(_) => event.paths.iter().collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::To))
        | EventKind::Modify(ModifyKind::Name(RenameMode::Any)) => event.paths.iter().collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => event.paths.last().into_iter().collect(),
        _ => Vec::new(),
    };
    paths
        .into_iter()
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(is_post_folder_name)
        })
        .cloned()
        .collect()
}

type Snapshot = Vec<(String, u64, Option<SystemTime>)>;

async fn snapshot(folder: &Path) -> Option<Snapshot> {
    let metadata = tokio::fs::metadata(folder).await.ok()?;
    if !metadata.is_dir() {
        return None;
    }
    let mut entries = tokio::fs::read_dir(folder).await.ok()?;
    let mut snapshot = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let (len, modified) = match entry.metadata().await {
            Ok(meta) => (meta.len(), meta.modified().ok()),
            Err(_) => (0, None),
        };
        snapshot.push((entry.file_name().to_string_lossy().into_owned(), len, modified));
    }
    snapshot.sort();
    Some(snapshot)
}

/// Waits for newly arrived folders to stop changing.
///
/// Clones share the set of folders being tracked.
#[derive(Debug, Clone)]
pub struct Stabilizer {
    in_flight: Arc<Mutex<HashSet<PathBuf>>>,
    quiet: Duration,
    poll: Duration,
}

impl Stabilizer {
    /// Folders count as stable once unchanged for `quiet`, checked every `poll`.
    pub fn new(quiet: Duration, poll: Duration) -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashSet::new())),
            quiet,
            poll,
        }
    }

    /// Start tracking `folder`. False if it is already tracked.
    pub fn track(&self, folder: &Path) -> bool {
        match self.in_flight.lock() {
            Ok(mut set) => set.insert(folder.to_path_buf()),
            Err(_) => {
                warn!("Stabilizer state poisoned");
                false
            }
        }
    }

    /// Whether `folder` is currently tracked.
    pub fn is_tracked(&self, folder: &Path) -> bool {
        self.in_flight
            .lock()
            .map(|set| set.contains(folder))
            .unwrap_or(false)
    }

    fn release(&self, folder: &Path) {
        if let Ok(mut set) = self.in_flight.lock() {
            set.remove(folder);
        }
    }

    /// Poll `folder` until its entries are unchanged for the quiet period.
    ///
    /// Returns false if the folder disappears. The folder is no longer
    /// tracked afterwards.
    pub async fn wait_until_stable(&self, folder: &Path) -> bool {
        let stable = self.poll_until_stable(folder).await;
        self.release(folder);
        stable
    }

    async fn poll_until_stable(&self, folder: &Path) -> bool {
        let Some(mut last) = snapshot(folder).await else {
            debug!(folder = %folder.display(), "Not a directory, ignoring");
            return false;
        };
        let mut unchanged_since = Instant::now();
        loop {
            sleep(self.poll).await;
            let Some(current) = snapshot(folder).await else {
                debug!(folder = %folder.display(), "Folder vanished while settling");
                return false;
            };
            if current != last {
                last = current;
                unchanged_since = Instant::now();
            } else if unchanged_since.elapsed() >= self.quiet {
                debug!(folder = %folder.display(), "Folder is stable");
                return true;
            }
        }
    }
}
