//! Top-level error wrapper types.

use crate::{ConfigError, JsonError, PublishError, ScheduleError, StagingError, ValidationError};

/// Every error the courier crates can produce.
///
/// # Examples
///
/// ```
/// use courier_error::{CourierError, JsonError};
///
/// let json_err = JsonError::new("Unexpected end of input");
/// let err: CourierError = json_err.into();
/// assert!(format!("{}", err).contains("Unexpected end of input"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum CourierErrorKind {
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Media staging error
    #[from(StagingError)]
    Staging(StagingError),
    /// Platform publish error
    #[from(PublishError)]
    Publish(PublishError),
    /// Scheduling / watch-root error
    #[from(ScheduleError)]
    Schedule(ScheduleError),
    /// Post folder validation error
    #[from(ValidationError)]
    Validation(ValidationError),
}

/// Courier error with kind discrimination.
///
/// # Examples
///
/// ```
/// use courier_error::{CourierResult, ConfigError};
///
/// fn might_fail() -> CourierResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Courier Error: {}", _0)]
pub struct CourierError(Box<CourierErrorKind>);

impl CourierError {
    /// Create a new error from a kind.
    pub fn new(kind: CourierErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &CourierErrorKind {
        &self.0
    }

    /// Whether the error must stop the watch process.
    pub fn is_fatal(&self) -> bool {
        match self.kind() {
            CourierErrorKind::Schedule(e) => e.is_fatal(),
            CourierErrorKind::Config(_) => true,
            _ => false,
        }
    }
}

// Generic From implementation for any type that converts to CourierErrorKind
impl<T> From<T> for CourierError
where
    T: Into<CourierErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for courier operations.
pub type CourierResult<T> = std::result::Result<T, CourierError>;
