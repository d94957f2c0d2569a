//! The `settings.json` data model.
//!
//! Parsing is lenient: platform names and post types are kept as strings in
//! [`RawPostSettings`] so that unknown values surface as validation failures
//! instead of parse errors. [`PostSettings`] is the checked form.

use crate::Platform;
use courier_error::JsonError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name of the settings document inside a post folder.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Kind of a post unit.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    /// Body text only
    #[display("text")]
    Text,
    /// One or more attachments with optional body text
    #[display("media")]
    Media,
}

impl std::str::FromStr for PostType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(PostType::Text),
            "media" => Ok(PostType::Media),
            _ => Err(format!("Unknown post type: {}", s)),
        }
    }
}

/// A file referenced by a post unit, relative to the post folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// File name inside the post folder.
    filename: String,
    /// Accessibility description.
    #[serde(default)]
    alt_text: String,
}

impl Attachment {
    /// Create an attachment reference.
    pub fn new(filename: impl Into<String>, alt_text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            alt_text: alt_text.into(),
        }
    }

    /// Lowercase file extension without the dot.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }
}

/// One unit of a post chain as read from disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPostUnit {
    /// Post type string, checked during validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_type: Option<String>,
    /// Body text.
    #[serde(default)]
    pub body_text: String,
    /// Attachments in publish order.
    #[serde(default)]
    pub file_infos: Vec<Attachment>,
}

/// Settings document as read from disk, before validation.
///
/// Accepts the flat single-post form
/// `{ postType, platforms, bodyText, fileInfos }` as well as the chained form
/// `{ platforms, posts: [...] }`.
///
/// # Examples
///
/// ```
/// use courier_core::RawPostSettings;
///
/// let raw = RawPostSettings::parse(
///     r#"{ "postType": "text", "platforms": ["bluesky"], "bodyText": "hi", "fileInfos": [] }"#,
/// ).unwrap();
/// assert_eq!(raw.units().len(), 1);
/// assert_eq!(raw.units()[0].body_text, "hi");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPostSettings {
    /// Platform names, checked during validation.
    #[serde(default)]
    pub platforms: Vec<String>,
    /// Flat form post type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_type: Option<String>,
    /// Flat form body text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_text: Option<String>,
    /// Flat form attachments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_infos: Option<Vec<Attachment>>,
    /// Chained form units.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub posts: Vec<RawPostUnit>,
}

impl RawPostSettings {
    /// Parse a settings document.
    #[track_caller]
    pub fn parse(contents: &str) -> Result<Self, JsonError> {
        serde_json::from_str(contents)
            .map_err(|e| JsonError::new(format!("Invalid {}: {}", SETTINGS_FILE_NAME, e)))
    }

    /// Post units in publish order.
    ///
    /// The chained form wins when present; otherwise the flat fields form a
    /// single unit.
    pub fn units(&self) -> Vec<RawPostUnit> {
        if !self.posts.is_empty() {
            return self.posts.clone();
        }
        vec![RawPostUnit {
            post_type: self.post_type.clone(),
            body_text: self.body_text.clone().unwrap_or_default(),
            file_infos: self.file_infos.clone().unwrap_or_default(),
        }]
    }

    /// Serialize as pretty JSON.
    #[track_caller]
    pub fn to_json(&self) -> Result<String, JsonError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| JsonError::new(format!("Failed to serialize settings: {}", e)))
    }
}

/// A validated post unit.
///
/// # Examples
///
/// ```
/// use courier_core::{Attachment, PostType, PostUnitBuilder};
///
/// let unit = PostUnitBuilder::default()
///     .post_type(PostType::Media)
///     .body_text("sunset")
///     .attachments(vec![Attachment::new("a.jpg", "orange sky")])
///     .build()
///     .unwrap();
/// assert_eq!(unit.attachments().len(), 1);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct PostUnit {
    /// Kind of the unit.
    post_type: PostType,
    /// Body text, possibly empty for media units.
    #[builder(default)]
    body_text: String,
    /// Attachments in publish order.
    #[builder(default)]
    attachments: Vec<Attachment>,
}

/// Validated settings of one scheduled post folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct PostSettings {
    /// Target platforms in dispatch order.
    platforms: Vec<Platform>,
    /// Units of the post chain in publish order; never empty.
    posts: Vec<PostUnit>,
}

impl PostSettings {
    /// Assemble checked settings.
    pub fn new(platforms: Vec<Platform>, posts: Vec<PostUnit>) -> Self {
        Self { platforms, posts }
    }

    /// Whether any unit carries attachments.
    pub fn has_attachments(&self) -> bool {
        self.posts.iter().any(|unit| !unit.attachments.is_empty())
    }

    /// Every attachment across all units, in chain order.
    pub fn attachments(&self) -> impl Iterator<Item = &Attachment> {
        self.posts.iter().flat_map(|unit| unit.attachments.iter())
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        let platforms: Vec<&str> = self.platforms.iter().map(Platform::as_str).collect();
        format!(
            "{} unit(s), {} attachment(s) -> {}",
            self.posts.len(),
            self.attachments().count(),
            platforms.join(", ")
        )
    }
}

impl From<&PostSettings> for RawPostSettings {
    fn from(settings: &PostSettings) -> Self {
        let platforms = settings
            .platforms
            .iter()
            .map(|p| p.as_str().to_string())
            .collect();
        let mut units: Vec<RawPostUnit> = settings
            .posts
            .iter()
            .map(|unit| RawPostUnit {
                post_type: Some(unit.post_type.to_string()),
                body_text: unit.body_text.clone(),
                file_infos: unit.attachments.clone(),
            })
            .collect();

        if units.len() == 1 {
            let unit = units.remove(0);
            RawPostSettings {
                platforms,
                post_type: unit.post_type,
                body_text: Some(unit.body_text),
                file_infos: Some(unit.file_infos),
                posts: Vec::new(),
            }
        } else {
            RawPostSettings {
                platforms,
                posts: units,
                ..Default::default()
            }
        }
    }
}
