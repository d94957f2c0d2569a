//! Publishing configuration.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing of the container status poll.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct ContainerConfig {
    /// Wait before the first status check (milliseconds)
    #[serde(default = "default_grace_ms")]
    #[builder(default = "default_grace_ms()")]
    grace_ms: u64,

    /// Wait between status checks (milliseconds)
    #[serde(default = "default_interval_ms")]
    #[builder(default = "default_interval_ms()")]
    interval_ms: u64,

    /// Status checks before giving up
    #[serde(default = "default_max_attempts")]
    #[builder(default = "default_max_attempts()")]
    max_attempts: u32,
}

fn default_grace_ms() -> u64 {
    5_000
}

fn default_interval_ms() -> u64 {
    30_000
}

fn default_max_attempts() -> u32 {
    10
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            grace_ms: default_grace_ms(),
            interval_ms: default_interval_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl ContainerConfig {
    /// Grace period as a duration.
    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }

    /// Poll interval as a duration.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// What to do with the remaining platforms once one fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop at the first failing platform.
    #[default]
    #[display("abort")]
    Abort,
    /// Try every platform and report all failures.
    #[display("continue")]
    Continue,
}

/// Folder-level publishing options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct PublishConfig {
    /// Behaviour after a platform failure
    #[serde(default)]
    failure_policy: FailurePolicy,
}

/// Schedule of the optional stats report.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct StatsConfig {
    /// Minutes between stats checks
    #[serde(default = "default_stats_interval_minutes")]
    #[builder(default = "default_stats_interval_minutes()")]
    interval_minutes: u64,

    /// First local hour in which checks run
    #[serde(default = "default_active_from_hour")]
    #[builder(default = "default_active_from_hour()")]
    active_from_hour: u32,

    /// Local hour at which checks stop (24 = midnight)
    #[serde(default = "default_active_until_hour")]
    #[builder(default = "default_active_until_hour()")]
    active_until_hour: u32,
}

fn default_stats_interval_minutes() -> u64 {
    60
}

fn default_active_from_hour() -> u32 {
    6
}

fn default_active_until_hour() -> u32 {
    24
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_stats_interval_minutes(),
            active_from_hour: default_active_from_hour(),
            active_until_hour: default_active_until_hour(),
        }
    }
}

impl StatsConfig {
    /// Check interval as a duration.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.max(1) * 60)
    }

    /// Whether checks run during local `hour`.
    ///
    /// A window whose start is after its end wraps past midnight.
    ///
    /// # Examples
    ///
    /// ```
    /// use courier_social::StatsConfig;
    ///
    /// let config = StatsConfig::default();
    /// assert!(!config.is_active_hour(5));
    /// assert!(config.is_active_hour(6));
    /// assert!(config.is_active_hour(23));
    /// ```
    pub fn is_active_hour(&self, hour: u32) -> bool {
        let (from, until) = (self.active_from_hour, self.active_until_hour);
        if from <= until {
            hour >= from && hour < until
        } else {
            hour >= from || hour < until
        }
    }
}
