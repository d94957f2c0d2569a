//! Creating scheduled post folders from the command line.

use courier_core::{
    Attachment, Platform, PostSettings, PostType, PostUnitBuilder, RawPostSettings,
    SETTINGS_FILE_NAME, encode_folder_name,
};
use courier_error::{
    ConfigError, CourierError, CourierResult, ScheduleError, ScheduleErrorKind,
};
use courier_watch::{PostValidator, ValidationConfig};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Input format of `--at`.
pub const AT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A `--file PATH[::ALT]` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentArg {
    /// Source file to copy into the post folder
    pub path: PathBuf,
    /// Alt text, empty when not given
    pub alt_text: String,
}

impl std::str::FromStr for AttachmentArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, alt_text) = match s.split_once("::") {
            Some((path, alt)) => (path, alt.to_string()),
            None => (s, String::new()),
        };
        if path.is_empty() {
            return Err(format!("Missing file path in '{}'", s));
        }
        Ok(Self {
            path: PathBuf::from(path),
            alt_text,
        })
    }
}

/// A post described on the command line.
#[derive(Debug, Clone)]
pub struct NewPost {
    /// Scheduled local time
    pub at: NaiveDateTime,
    /// Target platforms
    pub platforms: Vec<Platform>,
    /// Body text of the first post
    pub text: String,
    /// Attachments of the first post
    pub files: Vec<AttachmentArg>,
    /// Text of follow-up replies, in order
    pub replies: Vec<String>,
}

impl NewPost {
    /// Parse `--at` and `--platform` values.
    pub fn parse(
        at: &str,
        platforms: &[String],
        text: impl Into<String>,
        files: Vec<AttachmentArg>,
        replies: Vec<String>,
    ) -> CourierResult<Self> {
        let at = NaiveDateTime::parse_from_str(at, AT_FORMAT).map_err(|e| {
            CourierError::from(ConfigError::new(format!(
                "Invalid --at '{}', expected YYYY-MM-DD HH:MM: {}",
                at, e
            )))
        })?;
        let platforms = platforms
            .iter()
            .map(|name| name.parse::<Platform>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CourierError::from(ConfigError::new(e)))?;
        Ok(Self {
            at,
            platforms,
            text: text.into(),
            files,
            replies,
        })
    }

    /// Settings document for this post, naming attachments by file name.
    pub fn settings(&self) -> CourierResult<PostSettings> {
        let attachments = self
            .files
            .iter()
            .map(|file| {
                file_name(&file.path).map(|name| Attachment::new(name, file.alt_text.clone()))
            })
            .collect::<CourierResult<Vec<_>>>()?;
        let post_type = if attachments.is_empty() {
            PostType::Text
        } else {
            PostType::Media
        };

        let mut units = vec![build_unit(post_type, &self.text, attachments)?];
        for reply in &self.replies {
            units.push(build_unit(PostType::Text, reply, Vec::new())?);
        }
        Ok(PostSettings::new(self.platforms.clone(), units))
    }
}

fn build_unit(
    post_type: PostType,
    text: &str,
    attachments: Vec<Attachment>,
) -> CourierResult<courier_core::PostUnit> {
    PostUnitBuilder::default()
        .post_type(post_type)
        .body_text(text)
        .attachments(attachments)
        .build()
        .map_err(|e| CourierError::from(ConfigError::new(e.to_string())))
}

fn file_name(path: &Path) -> CourierResult<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            CourierError::from(ConfigError::new(format!(
                "{} is not a file path",
                path.display()
            )))
        })
}

fn io_error(context: String, e: std::io::Error) -> CourierError {
    CourierError::from(ScheduleError::new(ScheduleErrorKind::Io(format!(
        "{}: {}",
        context, e
    ))))
}

/// Write `post` as a folder under `watch_dir` and validate it.
///
/// The folder is removed again when it does not validate.
///
/// # Errors
///
/// Returns an error if the folder already exists, a file cannot be copied or
/// the result is not a valid post.
#[instrument(skip(post, validation), fields(at = %post.at))]
pub async fn create_post_folder(
    watch_dir: &Path,
    post: &NewPost,
    validation: &ValidationConfig,
) -> CourierResult<PathBuf> {
    let settings = post.settings()?;
    let folder = watch_dir.join(encode_folder_name(&post.at));
    if tokio::fs::try_exists(&folder).await.unwrap_or(false) {
        return Err(CourierError::from(ScheduleError::new(ScheduleErrorKind::Io(
            format!("{} already exists", folder.display()),
        ))));
    }

    tokio::fs::create_dir_all(&folder)
        .await
        .map_err(|e| io_error(format!("cannot create {}", folder.display()), e))?;

    if let Err(e) = populate(&folder, post, &settings).await {
        remove_quietly(&folder).await;
        return Err(e);
    }

    let validator = PostValidator::new(validation.clone().with_file_wait_timeout_ms(0));
    if let Err(report) = validator.validate(&folder).await {
        remove_quietly(&folder).await;
        return Err(report.into());
    }

    info!(folder = %folder.display(), post = %settings.summary(), "Created post folder");
    Ok(folder)
}

async fn populate(folder: &Path, post: &NewPost, settings: &PostSettings) -> CourierResult<()> {
    for file in &post.files {
        let destination = folder.join(file_name(&file.path)?);
        tokio::fs::copy(&file.path, &destination)
            .await
            .map_err(|e| io_error(format!("cannot copy {}", file.path.display()), e))?;
    }

    let json = RawPostSettings::from(settings).to_json()?;
    tokio::fs::write(folder.join(SETTINGS_FILE_NAME), json)
        .await
        .map_err(|e| io_error(format!("cannot write {}", SETTINGS_FILE_NAME), e))
}

async fn remove_quietly(folder: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(folder).await {
        warn!(folder = %folder.display(), error = %e, "Could not remove rejected folder");
    }
}
