//! Moving processed folders into the archive directories.

use courier_error::{ScheduleError, ScheduleErrorKind};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Archive directory under the watch root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Archive {
    /// Successfully published folders
    Published,
    /// Invalid or failed folders
    Failed,
}

impl Archive {
    /// Directory name under the watch root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Archive::Published => "_published",
            Archive::Failed => "_failed",
        }
    }
}

/// First free path among `path`, `path-1`, `path-2`, ...
///
/// A path whose existence cannot be determined is a relocation error.
pub async fn version_up_path(path: &Path) -> Result<PathBuf, ScheduleError> {
    if !exists(path).await? {
        return Ok(path.to_path_buf());
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    for version in 1..=u32::MAX {
        let candidate = path.with_file_name(format!("{}-{}", name, version));
        if !exists(&candidate).await? {
            return Ok(candidate);
        }
    }
    Err(ScheduleError::new(ScheduleErrorKind::Relocation(format!(
        "no free name for {}",
        path.display()
    ))))
}

async fn exists(path: &Path) -> Result<bool, ScheduleError> {
    tokio::fs::try_exists(path).await.map_err(|e| {
        ScheduleError::new(ScheduleErrorKind::Relocation(format!(
            "cannot check {}: {}",
            path.display(),
            e
        )))
    })
}

/// Move `folder` into `archive` under `watch_root` without overwriting.
///
/// Returns the final location.
#[instrument(skip(watch_root), fields(folder = %folder.display()))]
pub async fn relocate(
    folder: &Path,
    watch_root: &Path,
    archive: Archive,
) -> Result<PathBuf, ScheduleError> {
    let archive_dir = watch_root.join(archive.dir_name());
    tokio::fs::create_dir_all(&archive_dir).await.map_err(|e| {
        ScheduleError::new(ScheduleErrorKind::Relocation(format!(
            "cannot create {}: {}",
            archive_dir.display(),
            e
        )))
    })?;

    let name = folder.file_name().ok_or_else(|| {
        ScheduleError::new(ScheduleErrorKind::Relocation(format!(
            "{} has no folder name",
            folder.display()
        )))
    })?;
    let destination = version_up_path(&archive_dir.join(name)).await?;

    tokio::fs::rename(folder, &destination).await.map_err(|e| {
        ScheduleError::new(ScheduleErrorKind::Relocation(format!(
            "cannot move {} to {}: {}",
            folder.display(),
            destination.display(),
            e
        )))
    })?;
    info!(destination = %destination.display(), "Moved folder");
    Ok(destination)
}
