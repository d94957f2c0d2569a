//! Layered configuration loading.
//!
//! Sources, later ones winning:
//! - Bundled defaults (include_str! from courier.toml)
//! - `~/.config/courier/courier.toml`
//! - `./courier.toml`
//! - An explicit `--config` file
//! - `COURIER_<SECTION>__<KEY>` environment variables

use courier_error::{ConfigError, CourierError, CourierResult};
use courier_social::{ContainerConfig, PublishConfig, StatsConfig};
use courier_watch::{ValidationConfig, WatchConfig};
use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../courier.toml");

/// `[bluesky]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, Getters)]
pub struct BlueskySection {
    /// PDS base URL
    #[serde(default)]
    service_url: Option<String>,
}

/// `[mastodon]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, Getters)]
pub struct MastodonSection {
    /// Instance base URL, overridden by `MASTODON_INSTANCE_URL`
    #[serde(default)]
    instance_url: Option<String>,
}

/// `[firebase]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, Getters)]
pub struct FirebaseSection {
    /// Storage bucket used for media staging
    #[serde(default)]
    storage_bucket: Option<String>,
}

/// Top-level courier configuration.
///
/// # Example
///
/// ```no_run
/// use courier::CourierConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CourierConfig::load(None)?;
/// println!("Watching {}", config.watch().watch_dir().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, Getters)]
pub struct CourierConfig {
    /// Detection and dispatch settings
    #[serde(default)]
    watch: WatchConfig,
    /// Post folder validation settings
    #[serde(default)]
    validation: ValidationConfig,
    /// Media container polling settings
    #[serde(default)]
    container: ContainerConfig,
    /// Multi-platform failure handling
    #[serde(default)]
    publish: PublishConfig,
    /// Schedule of `watch --stats`
    #[serde(default)]
    stats: StatsConfig,
    /// Bluesky settings
    #[serde(default)]
    bluesky: BlueskySection,
    /// Mastodon settings
    #[serde(default)]
    mastodon: MastodonSection,
    /// Firebase staging settings
    #[serde(default)]
    firebase: FirebaseSection,
}

impl CourierConfig {
    /// Load every configuration layer, with `explicit` as the last file.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or a value has the wrong type.
    /// Missing optional files are skipped.
    #[instrument]
    pub fn load(explicit: Option<&Path>) -> CourierResult<Self> {
        debug!("Loading configuration");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/courier/courier.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("courier").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("COURIER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .map_err(|e| {
                CourierError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                CourierError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;
        Ok(config.with_home_expanded())
    }

    /// Load a single file on top of the bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> CourierResult<Self> {
        let config: Self = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                CourierError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                CourierError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })?;
        Ok(config.with_home_expanded())
    }

    /// Replace the watch settings, e.g. after a command line override.
    pub fn with_watch(mut self, watch: WatchConfig) -> Self {
        self.watch = watch;
        self
    }

    fn with_home_expanded(mut self) -> Self {
        let expanded = expand_home(self.watch.watch_dir());
        self.watch = self.watch.with_watch_dir(expanded);
        self
    }
}

/// Resolve a leading `~` against the home directory.
///
/// Paths without `~`, or with no known home directory, are returned as is.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
