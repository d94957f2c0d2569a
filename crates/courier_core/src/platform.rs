//! Supported platforms and their publishing limits.

use serde::{Deserialize, Serialize};

/// A social platform a post can be dispatched to.
///
/// # Examples
///
/// ```
/// use courier_core::Platform;
///
/// let platform: Platform = "threads".parse().unwrap();
/// assert_eq!(platform, Platform::Threads);
/// assert_eq!(platform.to_string(), "threads");
/// assert!(platform.limits().needs_public_url());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Bluesky (AT Protocol)
    #[display("bluesky")]
    Bluesky,
    /// Instagram Graph API
    #[display("instagram")]
    Instagram,
    /// Mastodon instance API
    #[display("mastodon")]
    Mastodon,
    /// Threads Graph API
    #[display("threads")]
    Threads,
    /// Twitter / X API v2
    #[display("twitter")]
    Twitter,
}

impl Platform {
    /// Lowercase identifier as written in `settings.json`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Bluesky => "bluesky",
            Platform::Instagram => "instagram",
            Platform::Mastodon => "mastodon",
            Platform::Threads => "threads",
            Platform::Twitter => "twitter",
        }
    }

    /// Publishing limits for this platform.
    pub fn limits(&self) -> &'static PlatformLimits {
        match self {
            Platform::Bluesky => &BLUESKY,
            Platform::Instagram => &INSTAGRAM,
            Platform::Mastodon => &MASTODON,
            Platform::Threads => &THREADS,
            Platform::Twitter => &TWITTER,
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bluesky" => Ok(Platform::Bluesky),
            "instagram" => Ok(Platform::Instagram),
            "mastodon" => Ok(Platform::Mastodon),
            "threads" => Ok(Platform::Threads),
            "twitter" => Ok(Platform::Twitter),
            _ => Err(format!("Unknown platform: {}", s)),
        }
    }
}

/// Kind of an attachment as a platform sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, derive_more::Display)]
pub enum MediaKind {
    /// Still image
    #[display("image")]
    Image,
    /// Video clip
    #[display("video")]
    Video,
}

/// Static publishing limits of a platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformLimits {
    /// Maximum body text length in Unicode scalar values.
    max_chars: usize,
    /// Maximum number of attachments on one post.
    max_attachments: usize,
    /// Accepted image extensions (lowercase, no dot).
    image_formats: &'static [&'static str],
    /// Accepted video extensions (lowercase, no dot).
    video_formats: &'static [&'static str],
    /// Whether a post without attachments can be published.
    text_only: bool,
    /// Whether media must be reachable at a public URL.
    needs_public_url: bool,
    /// Whether posts can be chained as replies.
    supports_replies: bool,
}

impl PlatformLimits {
    /// Maximum body text length in Unicode scalar values.
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Maximum number of attachments on one post.
    pub fn max_attachments(&self) -> usize {
        self.max_attachments
    }

    /// Accepted image extensions.
    pub fn image_formats(&self) -> &'static [&'static str] {
        self.image_formats
    }

    /// Accepted video extensions.
    pub fn video_formats(&self) -> &'static [&'static str] {
        self.video_formats
    }

    /// Whether a post without attachments can be published.
    pub fn text_only(&self) -> bool {
        self.text_only
    }

    /// Whether media must be reachable at a public URL.
    pub fn needs_public_url(&self) -> bool {
        self.needs_public_url
    }

    /// Whether posts can be chained as replies.
    pub fn supports_replies(&self) -> bool {
        self.supports_replies
    }

    /// Classify an extension, or `None` if the platform does not accept it.
    pub fn media_kind(&self, extension: &str) -> Option<MediaKind> {
        let ext = extension.to_ascii_lowercase();
        if self.image_formats.contains(&ext.as_str()) {
            Some(MediaKind::Image)
        } else if self.video_formats.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// Whether the platform accepts files with this extension.
    pub fn accepts(&self, extension: &str) -> bool {
        self.media_kind(extension).is_some()
    }
}

static BLUESKY: PlatformLimits = PlatformLimits {
    max_chars: 300,
    max_attachments: 4,
    image_formats: &["jpeg", "jpg", "png", "webp"],
    video_formats: &[],
    text_only: true,
    needs_public_url: false,
    supports_replies: true,
};

static INSTAGRAM: PlatformLimits = PlatformLimits {
    max_chars: 2200,
    max_attachments: 10,
    image_formats: &["jpeg", "jpg"],
    video_formats: &["mp4", "mov"],
    text_only: false,
    needs_public_url: true,
    supports_replies: false,
};

static MASTODON: PlatformLimits = PlatformLimits {
    max_chars: 500,
    max_attachments: 4,
    image_formats: &["jpeg", "jpg", "png", "webp", "heif"],
    video_formats: &["gif", "mp4", "mov", "webm", "m4v"],
    text_only: true,
    needs_public_url: false,
    supports_replies: true,
};

static THREADS: PlatformLimits = PlatformLimits {
    max_chars: 500,
    max_attachments: 10,
    image_formats: &["jpeg", "jpg", "png"],
    video_formats: &["mp4", "mov"],
    text_only: true,
    needs_public_url: true,
    supports_replies: true,
};

static TWITTER: PlatformLimits = PlatformLimits {
    max_chars: 280,
    max_attachments: 4,
    image_formats: &["jpeg", "jpg", "png", "gif", "webp"],
    video_formats: &["mp4", "mov"],
    text_only: true,
    needs_public_url: false,
    supports_replies: true,
};

/// Smallest character cap across `platforms`, or `None` when empty.
pub fn max_chars_for(platforms: &[Platform]) -> Option<usize> {
    platforms.iter().map(|p| p.limits().max_chars()).min()
}

/// Smallest attachment cap across `platforms`, or `None` when empty.
pub fn max_attachments_for(platforms: &[Platform]) -> Option<usize> {
    platforms.iter().map(|p| p.limits().max_attachments()).min()
}

/// Extensions accepted by every platform in `platforms`.
///
/// Order follows the first platform's image formats, then its video formats.
pub fn common_formats(platforms: &[Platform]) -> Vec<&'static str> {
    let Some((first, rest)) = platforms.split_first() else {
        return Vec::new();
    };
    let limits = first.limits();
    limits
        .image_formats()
        .iter()
        .chain(limits.video_formats().iter())
        .copied()
        .filter(|ext| rest.iter().all(|p| p.limits().accepts(ext)))
        .collect()
}

/// MIME type for a file extension, used when uploading raw bytes.
pub fn mime_type_for(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heif" => "image/heif",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}
