//! Media staging error types.

/// Kinds of staging errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StagingErrorKind {
    /// Signing in to the storage backend failed
    #[display("Storage sign-in failed: {}", _0)]
    Authentication(String),
    /// Failed to read the local file before upload
    #[display("Failed to read file: {}", _0)]
    FileRead(String),
    /// Upload was rejected or did not complete
    #[display("Upload failed: {}", _0)]
    Upload(String),
    /// Staged object could not be deleted
    #[display("Delete failed: {}", _0)]
    Delete(String),
    /// Storage backend is not configured
    #[display("Staging not configured: {}", _0)]
    NotConfigured(String),
}

/// Staging error with location tracking.
///
/// # Examples
///
/// ```
/// use courier_error::{StagingError, StagingErrorKind};
///
/// let err = StagingError::new(StagingErrorKind::Upload("403 Forbidden".to_string()));
/// assert!(format!("{}", err).contains("Upload failed"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error, derive_getters::Getters)]
#[display("Staging Error: {} at line {} in {}", kind, line, file)]
pub struct StagingError {
    kind: StagingErrorKind,
    line: u32,
    #[getter(skip)]
    file: &'static str,
}

impl StagingError {
    /// Create a new staging error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StagingErrorKind) -> Self {
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
}
