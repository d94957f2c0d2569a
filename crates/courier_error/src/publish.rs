//! Errors raised while publishing a post to a platform.

/// Specific publish failure conditions.
///
/// Platforms and containers are carried as plain strings so this crate stays
/// independent of the data model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PublishErrorKind {
    /// The platform rejected a container create call.
    #[display("{} rejected container creation: {}", platform, reason)]
    ContainerCreate {
        /// Platform name
        platform: String,
        /// Reason reported by the platform or transport
        reason: String,
    },

    /// The platform reported the container as failed.
    #[display("Container {} failed: {}", container, message)]
    ContainerFailed {
        /// Container ID
        container: String,
        /// Error message reported by the platform
        message: String,
    },

    /// The container never reached a terminal state.
    #[display("Container {} not ready to publish after {} attempts", container, attempts)]
    NotReady {
        /// Container ID
        container: String,
        /// Number of status checks performed
        attempts: u32,
    },

    /// A status check call itself failed.
    #[display("Status check for container {} failed: {}", container, reason)]
    StatusCheck {
        /// Container ID
        container: String,
        /// Failure reason
        reason: String,
    },

    /// The final publish call failed.
    #[display("Publishing on {} failed: {}", platform, reason)]
    Publish {
        /// Platform name
        platform: String,
        /// Failure reason
        reason: String,
    },

    /// The platform cannot publish this kind of post.
    #[display("{} does not support {}", platform, reason)]
    Unsupported {
        /// Platform name
        platform: String,
        /// What was not supported
        reason: String,
    },

    /// No client is registered for the platform.
    #[display("No client configured for {}", _0)]
    NotConfigured(String),

    /// Media could not be staged at a public URL.
    #[display("Media staging failed: {}", _0)]
    Staging(String),

    /// Signing in to the platform failed.
    #[display("Authentication with {} failed: {}", platform, reason)]
    Authentication {
        /// Platform name
        platform: String,
        /// Failure reason
        reason: String,
    },

    /// The platform API answered with a non-success status.
    #[display("{} API returned {}: {}", platform, status, message)]
    Api {
        /// Platform name
        platform: String,
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },

    /// The request never got an answer (connect, timeout, decode).
    #[display("Request to {} failed: {}", platform, reason)]
    Request {
        /// Platform name
        platform: String,
        /// Failure reason
        reason: String,
    },

    /// One or more platforms failed while publishing a folder.
    #[display("Publishing failed on: {}", _0)]
    PlatformsFailed(String),
}

/// Publish error with location tracking.
///
/// # Examples
///
/// ```
/// use courier_error::{PublishError, PublishErrorKind};
///
/// let err = PublishError::new(PublishErrorKind::NotReady {
///     container: "1789".to_string(),
///     attempts: 10,
/// });
/// assert!(format!("{}", err).contains("after 10 attempts"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error, derive_getters::Getters)]
#[display("Publish Error: {} at line {} in {}", kind, line, file)]
pub struct PublishError {
    kind: PublishErrorKind,
    line: u32,
    #[getter(skip)]
    file: &'static str,
}

impl PublishError {
    /// Create a new publish error with caller location tracking.
    #[track_caller]
    pub fn new(kind: PublishErrorKind) -> Self {
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

/// Result type for publish operations.
pub type PublishResult<T> = Result<T, PublishError>;
