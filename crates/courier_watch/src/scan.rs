//! Directory scans of the watch root.

use crate::QueueHandle;
use chrono::NaiveDateTime;
use courier_core::{decode_folder_name, EligibilityWindow};
use courier_error::{ScheduleError, ScheduleErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Post-named directories directly under `root`, sorted by name.
///
/// Since names are timestamps, the order is also by target time.
pub async fn list_post_folders(root: &Path) -> Result<Vec<(PathBuf, NaiveDateTime)>, ScheduleError> {
    let scan_error = |e: std::io::Error| {
        ScheduleError::new(ScheduleErrorKind::Scan(format!(
            "cannot list {}: {}",
            root.display(),
            e
        )))
    };

    let mut entries = tokio::fs::read_dir(root).await.map_err(scan_error)?;
    let mut folders = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(scan_error)? {
        let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }
        let name = entry.file_name();
        if let Some(target) = name.to_str().and_then(decode_folder_name) {
            folders.push((entry.path(), target));
        }
    }
    folders.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));
    Ok(folders)
}

/// Enqueue every post folder under `root` that `window` accepts at `now`.
///
/// Returns the number of folders enqueued.
pub async fn enqueue_eligible(
    root: &Path,
    window: EligibilityWindow,
    now: NaiveDateTime,
    queue: &QueueHandle,
) -> Result<usize, ScheduleError> {
    let folders = list_post_folders(root).await?;
    let mut enqueued = 0;
    for (folder, target) in folders {
        let name = folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if window.is_time_to_publish(&name, target, now) {
            queue.enqueue(folder)?;
            enqueued += 1;
        } else {
            debug!(folder = %name, "Not due yet");
        }
    }
    info!(
        enqueued,
        past = window.past,
        future = window.future,
        "Scanned watch directory"
    );
    Ok(enqueued)
}
