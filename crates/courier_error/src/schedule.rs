//! Scheduling and watch-root error types.

/// Kinds of scheduling errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ScheduleErrorKind {
    /// The watch root is missing or not a directory
    #[display("Invalid watch directory: {}", _0)]
    InvalidWatchRoot(String),
    /// A processed folder could not be moved to its archive
    #[display("Failed to relocate post folder: {}", _0)]
    Relocation(String),
    /// The filesystem watcher could not be started
    #[display("Watcher error: {}", _0)]
    Watcher(String),
    /// Listing the watch root failed
    #[display("Scan failed: {}", _0)]
    Scan(String),
    /// Other filesystem failure
    #[display("I/O error: {}", _0)]
    Io(String),
    /// The dispatch worker stopped unexpectedly
    #[display("Dispatch worker stopped: {}", _0)]
    WorkerStopped(String),
}

impl ScheduleErrorKind {
    /// Whether the watch process must stop when this error occurs.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidWatchRoot(_) | Self::Relocation(_) | Self::WorkerStopped(_)
        )
    }
}

/// Scheduling error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error, derive_getters::Getters)]
#[display("Schedule Error: {} at line {} in {}", kind, line, file)]
pub struct ScheduleError {
    kind: ScheduleErrorKind,
    line: u32,
    #[getter(skip)]
    file: &'static str,
}

impl ScheduleError {
    /// Create a new scheduling error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ScheduleErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Source file where the error was created.
    pub fn file(&self) -> &'static str {
        self.file
    }

    /// Whether the watch process must stop.
    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }
}
