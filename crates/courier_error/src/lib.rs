//! Error types for the courier post scheduler.
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use courier_error::{CourierResult, PublishError, PublishErrorKind};
//!
//! fn publish() -> CourierResult<String> {
//!     Err(PublishError::new(PublishErrorKind::NotConfigured("threads".into())))?
//! }
//!
//! match publish() {
//!     Ok(id) => println!("Published: {}", id),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod json;
mod publish;
mod schedule;
mod staging;
mod validation;

pub use config::ConfigError;
pub use error::{CourierError, CourierErrorKind, CourierResult};
pub use json::JsonError;
pub use publish::{PublishError, PublishErrorKind, PublishResult};
pub use schedule::{ScheduleError, ScheduleErrorKind};
pub use staging::{StagingError, StagingErrorKind};
pub use validation::ValidationError;
