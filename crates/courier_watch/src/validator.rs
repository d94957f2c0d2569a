//! Post folder validation.

use crate::ValidationConfig;
use courier_core::{
    common_formats, max_attachments_for, max_chars_for, Attachment, Platform, PostSettings,
    PostType, PostUnit, PostUnitBuilder, RawPostSettings, SETTINGS_FILE_NAME,
};
use courier_error::ValidationError;
use std::path::{Component, Path, PathBuf};
use tokio::time::{sleep, Instant};
use tracing::{debug, instrument, warn};

/// Every reason a folder was rejected.
pub type ValidationReport = ValidationError;

/// Checks a post folder before it is handed to the publisher.
#[derive(Debug, Clone, Default)]
pub struct PostValidator {
    config: ValidationConfig,
}

impl PostValidator {
    /// Validator with the given file wait settings.
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate `folder` and return its checked settings.
    ///
    /// All failures are collected and logged at warn level. Missing attachment
    /// files are waited for only when every other rule passed; otherwise they
    /// are checked once and reported with the rest.
    #[instrument(skip(self), fields(folder = %folder.display()))]
    pub async fn validate(&self, folder: &Path) -> Result<PostSettings, ValidationReport> {
        let name = folder_label(folder);
        let settings_path = folder.join(SETTINGS_FILE_NAME);

        let contents = match tokio::fs::read_to_string(&settings_path).await {
            Ok(contents) => contents,
            Err(e) => {
                return Err(report(
                    name,
                    vec![format!("cannot read {}: {}", SETTINGS_FILE_NAME, e)],
                ));
            }
        };
        let raw = match RawPostSettings::parse(&contents) {
            Ok(raw) => raw,
            Err(e) => return Err(report(name, vec![e.message.clone()])),
        };

        let mut reasons = Vec::new();
        let platforms = check_platforms(&raw.platforms, &mut reasons);
        let units = check_units(&raw, &platforms, &mut reasons);

        if !reasons.is_empty() {
            let raw_units = raw.units();
            let attachments = raw_units.iter().flat_map(|unit| unit.file_infos.iter());
            reasons.extend(missing_reasons(missing_files(folder, attachments).await));
            return Err(report(name, reasons));
        }

        let missing = self.wait_for_files(folder, &units).await;
        if !missing.is_empty() {
            return Err(report(name, missing_reasons(missing)));
        }

        let settings = PostSettings::new(platforms, units);
        debug!(summary = %settings.summary(), "Post folder is valid");
        Ok(settings)
    }

    /// Poll until every referenced file exists or the timeout elapses.
    ///
    /// Returns the names still missing.
    async fn wait_for_files(&self, folder: &Path, units: &[PostUnit]) -> Vec<String> {
        let deadline = Instant::now() + self.config.file_wait_timeout();
        loop {
            let attachments = units.iter().flat_map(|unit| unit.attachments());
            let missing = missing_files(folder, attachments).await;
            if missing.is_empty() || Instant::now() >= deadline {
                return missing;
            }
            debug!(missing = missing.len(), "Waiting for attachment files");
            sleep(self.config.file_poll()).await;
        }
    }
}

fn folder_label(folder: &Path) -> String {
    folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| folder.display().to_string())
}

fn missing_reasons(missing: Vec<String>) -> Vec<String> {
    missing
        .into_iter()
        .map(|file| format!("attachment {} does not exist", file))
        .collect()
}

/// Whether `name` is a single path component naming an entry of the folder.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

fn report(folder: String, reasons: Vec<String>) -> ValidationReport {
    for reason in &reasons {
        warn!(folder = %folder, reason = %reason, "Invalid post folder");
    }
    ValidationError::new(folder, reasons)
}

fn check_platforms(names: &[String], reasons: &mut Vec<String>) -> Vec<Platform> {
    if names.is_empty() {
        reasons.push("platforms is empty".to_string());
    }
    let mut platforms = Vec::new();
    for name in names {
        match name.parse::<Platform>() {
            Ok(platform) if !platforms.contains(&platform) => platforms.push(platform),
            Ok(_) => {}
            Err(_) => reasons.push(format!("unknown platform '{}'", name)),
        }
    }
    platforms
}

fn check_units(
    raw: &RawPostSettings,
    platforms: &[Platform],
    reasons: &mut Vec<String>,
) -> Vec<PostUnit> {
    let max_chars = max_chars_for(platforms);
    let max_attachments = max_attachments_for(platforms);
    let formats = common_formats(platforms);
    let raw_units = raw.units();
    let chained = raw_units.len() > 1;

    let mut units = Vec::new();
    for (index, unit) in raw_units.iter().enumerate() {
        let label = if chained {
            format!("post {}: ", index + 1)
        } else {
            String::new()
        };

        let post_type = match unit.post_type.as_deref() {
            None => {
                reasons.push(format!("{}postType is missing", label));
                None
            }
            Some(value) => match value.parse::<PostType>() {
                Ok(post_type) => Some(post_type),
                Err(_) => {
                    reasons.push(format!("{}unsupported postType '{}'", label, value));
                    None
                }
            },
        };

        for attachment in &unit.file_infos {
            if !is_plain_file_name(attachment.filename()) {
                reasons.push(format!(
                    "{}{} must be a plain file name inside the post folder",
                    label,
                    attachment.filename()
                ));
            }
        }

        if let Some(max) = max_chars {
            let length = unit.body_text.chars().count();
            if length > max {
                reasons.push(format!(
                    "{}bodyText has {} characters, limit is {}",
                    label, length, max
                ));
            }
        }

        match post_type {
            Some(PostType::Text) => {
                if unit.body_text.trim().is_empty() {
                    reasons.push(format!("{}bodyText is empty", label));
                }
                if !unit.file_infos.is_empty() {
                    reasons.push(format!("{}text posts cannot carry attachments", label));
                }
                for platform in platforms {
                    if !platform.limits().text_only() {
                        reasons.push(format!(
                            "{}{} cannot publish text-only posts",
                            label, platform
                        ));
                    }
                }
            }
            Some(PostType::Media) => {
                if unit.file_infos.is_empty() {
                    reasons.push(format!("{}media posts need at least one attachment", label));
                }
                match max_attachments {
                    Some(max) if unit.file_infos.len() > max => reasons.push(format!(
                        "{}{} attachments, limit is {}",
                        label,
                        unit.file_infos.len(),
                        max
                    )),
                    _ => {}
                }
                check_extensions(&unit.file_infos, &formats, platforms, &label, reasons);
            }
            None => {}
        }

        if let Some(post_type) = post_type {
            match PostUnitBuilder::default()
                .post_type(post_type)
                .body_text(unit.body_text.clone())
                .attachments(unit.file_infos.clone())
                .build()
            {
                Ok(unit) => units.push(unit),
                Err(e) => reasons.push(format!("{}{}", label, e)),
            }
        }
    }
    units
}

fn check_extensions(
    attachments: &[Attachment],
    formats: &[&str],
    platforms: &[Platform],
    label: &str,
    reasons: &mut Vec<String>,
) {
    if platforms.is_empty() {
        return;
    }
    for attachment in attachments {
        match attachment.extension() {
            Some(ext) if formats.contains(&ext.as_str()) => {}
            Some(ext) => reasons.push(format!(
                "{}{} has unsupported format '{}' (allowed: {})",
                label,
                attachment.filename(),
                ext,
                formats.join(", ")
            )),
            None => reasons.push(format!(
                "{}{} has no file extension",
                label,
                attachment.filename()
            )),
        }
    }
}

async fn missing_files<'a>(
    folder: &Path,
    attachments: impl Iterator<Item = &'a Attachment>,
) -> Vec<String> {
    let mut missing = Vec::new();
    for attachment in attachments {
        if !is_plain_file_name(attachment.filename()) {
            continue;
        }
        let path: PathBuf = folder.join(attachment.filename());
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            missing.push(attachment.filename().clone());
        }
    }
    missing
}
