//! Post folder detection and dispatch for courier.
//!
//! This crate finds scheduled post folders under a watch directory and feeds
//! them through a strictly serialized dispatch queue.
//!
//! # Detection
//!
//! - [`FolderWatcher`] reports folders created in or moved into the root;
//!   [`Stabilizer`] waits until their contents stop changing.
//! - [`enqueue_eligible`] scans the root once at startup and then periodically.
//! - [`Orchestrator`] wires all sources to one [`DispatchQueue`].
//!
//! # Dispatch
//!
//! The [`QueueWorker`] validates each folder with [`PostValidator`], hands it
//! to a [`FolderProcessor`] and moves it into `_published` or `_failed`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod orchestrator;
mod queue;
mod relocate;
mod scan;
mod validator;
mod watcher;

pub use config::{ValidationConfig, WatchConfig, WatchConfigBuilder};
pub use courier_interface::FolderProcessor;
pub use orchestrator::{check_watch_root, Orchestrator};
pub use queue::{DispatchOutcome, DispatchQueue, QueueHandle, QueueWorker};
pub use relocate::{relocate, version_up_path, Archive};
pub use scan::{enqueue_eligible, list_post_folders};
pub use validator::{PostValidator, ValidationReport};
pub use watcher::{arrivals, FolderWatcher, Stabilizer};
