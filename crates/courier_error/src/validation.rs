//! Post folder validation error.

/// A post folder failed validation.
///
/// Carries every failure reason found, not just the first.
///
/// # Examples
///
/// ```
/// use courier_error::ValidationError;
///
/// let err = ValidationError::new(
///     "2025.03.01-09.00",
///     vec!["platforms is empty".to_string(), "bodyText is empty".to_string()],
/// );
/// assert_eq!(err.reasons().len(), 2);
/// assert!(format!("{}", err).contains("platforms is empty; bodyText is empty"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error, derive_getters::Getters)]
#[display("Validation Error: {} is not a valid post ({})", folder, reasons.join("; "))]
pub struct ValidationError {
    folder: String,
    reasons: Vec<String>,
    line: u32,
    #[getter(skip)]
    file: &'static str,
}

impl ValidationError {
    /// Create a new validation error with caller location tracking.
    #[track_caller]
    pub fn new(folder: impl Into<String>, reasons: Vec<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            folder: folder.into(),
            reasons,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Source file where the error was created.
    pub fn file(&self) -> &'static str {
        self.file
    }
}
