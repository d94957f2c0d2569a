//! Core data types for the courier post scheduler.
//!
//! This crate holds the pieces every other courier crate agrees on:
//! - the folder-name time codec (`YYYY.MM.DD-HH.MM`)
//! - the eligibility window used to decide whether a folder is due
//! - the `settings.json` data model
//! - per-platform limits (characters, attachments, formats)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod folder_time;
mod platform;
mod settings;
mod window;

pub use folder_time::{
    decode_folder_name, encode_folder_name, is_post_folder_name, truncate_to_minute,
    FOLDER_NAME_FORMAT,
};
pub use platform::{
    common_formats, max_attachments_for, max_chars_for, mime_type_for, MediaKind, Platform,
    PlatformLimits,
};
pub use settings::{
    Attachment, PostSettings, PostType, PostUnit, PostUnitBuilder, RawPostSettings, RawPostUnit,
    SETTINGS_FILE_NAME,
};
pub use window::{is_outside_minutes, is_within_minutes, EligibilityWindow};
