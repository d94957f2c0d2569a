//! Identifiers and value types shared by platform clients.

use courier_core::MediaKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Opaque platform-side container identifier.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
pub struct ContainerId(String);

impl From<&str> for ContainerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl ContainerId {
    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opaque identifier of a published post.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
pub struct PostId(String);

impl From<&str> for PostId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl PostId {
    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Processing state of a container.
///
/// # Examples
///
/// ```
/// use courier_interface::ContainerState;
///
/// assert_eq!(ContainerState::from_status("FINISHED", None), ContainerState::Finished);
/// assert!(matches!(
///     ContainerState::from_status("EXPIRED", None),
///     ContainerState::Error(_)
/// ));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ContainerState {
    /// Still being processed by the platform.
    #[display("IN_PROGRESS")]
    InProgress,
    /// Ready to publish.
    #[display("FINISHED")]
    Finished,
    /// Failed; will never become publishable.
    #[display("ERROR({})", _0)]
    Error(String),
}

impl ContainerState {
    /// Map a Graph API status string.
    ///
    /// `EXPIRED` and `PUBLISHED` containers cannot be published again and map
    /// to [`ContainerState::Error`], as does any unrecognised status.
    pub fn from_status(status: &str, message: Option<&str>) -> Self {
        match status {
            "FINISHED" => ContainerState::Finished,
            "IN_PROGRESS" => ContainerState::InProgress,
            "ERROR" => ContainerState::Error(
                message
                    .filter(|m| !m.is_empty())
                    .unwrap_or("container reported ERROR")
                    .to_string(),
            ),
            "EXPIRED" => ContainerState::Error("container expired".to_string()),
            "PUBLISHED" => ContainerState::Error("container already published".to_string()),
            other => ContainerState::Error(format!("unexpected container status {}", other)),
        }
    }
}

/// Options applied when creating a container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerOptions {
    /// The container is a child of a carousel.
    pub is_carousel_item: bool,
    /// Post this container replies to.
    pub reply_to: Option<PostId>,
}

impl ContainerOptions {
    /// Options for a carousel child.
    pub fn carousel_item() -> Self {
        Self {
            is_carousel_item: true,
            reply_to: None,
        }
    }

    /// Options for a reply to `parent`, or a top-level post when `None`.
    pub fn replying_to(parent: Option<PostId>) -> Self {
        Self {
            is_carousel_item: false,
            reply_to: parent,
        }
    }
}

/// A post as reported by a direct platform after publishing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct PublishedPost {
    /// Platform identifier (status ID, tweet ID, record URI).
    id: PostId,
    /// Content hash where the platform needs one to reply (Bluesky CID).
    content_id: Option<String>,
    /// Public link, when known.
    url: Option<String>,
}

impl PublishedPost {
    /// Create a published post reference.
    pub fn new(id: impl Into<PostId>, content_id: Option<String>, url: Option<String>) -> Self {
        Self {
            id: id.into(),
            content_id,
            url,
        }
    }
}

/// Reply target of a chained post.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct ReplyTo {
    /// First post of the chain.
    root: PublishedPost,
    /// Post being replied to directly.
    parent: PublishedPost,
}

impl ReplyTo {
    /// Create a reply target.
    pub fn new(root: PublishedPost, parent: PublishedPost) -> Self {
        Self { root, parent }
    }
}

/// A local attachment ready for upload.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct LocalMedia {
    /// Absolute path of the file.
    path: PathBuf,
    /// Accessibility description.
    alt_text: String,
    /// Image or video, as classified for the target platform.
    kind: MediaKind,
    /// MIME type derived from the extension.
    #[getter(skip)]
    mime: &'static str,
}

impl LocalMedia {
    /// Create a local media reference.
    pub fn new(path: PathBuf, alt_text: impl Into<String>, kind: MediaKind, mime: &'static str) -> Self {
        Self {
            path,
            alt_text: alt_text.into(),
            kind,
            mime,
        }
    }

    /// MIME type derived from the extension.
    pub fn mime(&self) -> &&'static str {
        &self.mime
    }
}

/// Content of one post handed to a direct platform.
///
/// # Examples
///
/// ```
/// use courier_interface::PostDraftBuilder;
///
/// let draft = PostDraftBuilder::default().text("hello").build().unwrap();
/// assert!(draft.media().is_empty());
/// assert!(draft.reply_to().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters, derive_builder::Builder)]
#[builder(setter(into))]
pub struct PostDraft {
    /// Body text.
    #[builder(default)]
    text: String,
    /// Attachments in order.
    #[builder(default)]
    media: Vec<LocalMedia>,
    /// Reply target for chained posts.
    #[builder(default)]
    reply_to: Option<ReplyTo>,
}

/// A file staged at a public URL.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct StagedMedia {
    /// URL the platform fetches the media from.
    public_url: String,
    /// Backend-specific handle used to delete the object.
    handle: String,
}

impl StagedMedia {
    /// Create a staged media reference.
    pub fn new(public_url: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            public_url: public_url.into(),
            handle: handle.into(),
        }
    }
}

/// Engagement counters of an account's most recent post.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct PostStats {
    /// Post the counters belong to.
    post_id: PostId,
    /// Counter name to value, e.g. `likes`, `replies`.
    metrics: BTreeMap<String, u64>,
}

impl PostStats {
    /// Create a stats reading.
    pub fn new<K: Into<String>>(
        post_id: impl Into<PostId>,
        metrics: impl IntoIterator<Item = (K, u64)>,
    ) -> Self {
        Self {
            post_id: post_id.into(),
            metrics: metrics.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
