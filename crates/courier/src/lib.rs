//! Courier - folder-based social media post scheduler
//!
//! Drop a folder named after its publish time (`YYYY.MM.DD-HH.MM`) with a
//! `settings.json` and its media into the watch directory; courier publishes
//! it to Bluesky, Instagram, Mastodon, Threads and Twitter when it is due and
//! moves it to `_published` or `_failed`.
//!
//! # Architecture
//!
//! - `courier_error` - Error types
//! - `courier_core` - Folder names, platform limits, settings model, time windows
//! - `courier_interface` - Platform and staging capability traits
//! - `courier_social` - Container state machine, platform clients, publisher
//! - `courier_watch` - Detection, validation and the dispatch queue
//!
//! This crate loads configuration and credentials, wires the pieces together
//! and re-exports the main types.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod create;
mod credentials;
mod logging;
mod setup;

pub use config::{BlueskySection, CourierConfig, FirebaseSection, MastodonSection, expand_home};
pub use create::{AttachmentArg, NewPost, create_post_folder};
pub use credentials::Credentials;
pub use logging::init_tracing;
pub use setup::{build_publisher, build_registry, build_staging, build_stats_sources};

pub use courier_core::{
    EligibilityWindow, Platform, PostSettings, decode_folder_name, encode_folder_name,
};
pub use courier_error::{CourierError, CourierErrorKind, CourierResult};
pub use courier_social::{PlatformRegistry, PostPublisher, StatsReporter};
pub use courier_watch::{Orchestrator, PostValidator, ValidationConfig, WatchConfig};
