//! Watch and validation settings.

use courier_core::EligibilityWindow;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Settings of the detection orchestrator and dispatch queue.
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
pub struct WatchConfig {
    /// Directory holding scheduled post folders
    #[serde(default)]
    #[builder(setter(into))]
    watch_dir: PathBuf,

    /// Minutes between forward scans
    #[serde(default = "default_process_interval_minutes")]
    #[builder(default = "default_process_interval_minutes()")]
    process_interval_minutes: u64,

    /// How far in the past a folder may be and still be dispatched (minutes, `<= 0`)
    #[serde(default = "default_past_threshold_minutes")]
    #[builder(default = "default_past_threshold_minutes()")]
    past_threshold_minutes: i64,

    /// How far in the future a folder may be dispatched early (minutes, `>= 0`)
    #[serde(default = "default_future_threshold_minutes")]
    #[builder(default = "default_future_threshold_minutes()")]
    future_threshold_minutes: i64,

    /// Hold a dispatched folder until its scheduled minute
    #[serde(default = "default_hold_until_due")]
    #[builder(default = "default_hold_until_due()")]
    hold_until_due: bool,

    /// Quiet period before a new folder counts as fully copied (milliseconds)
    #[serde(default = "default_stability_quiet_ms")]
    #[builder(default = "default_stability_quiet_ms()")]
    stability_quiet_ms: u64,

    /// Poll interval of the copy stability check (milliseconds)
    #[serde(default = "default_stability_poll_ms")]
    #[builder(default = "default_stability_poll_ms()")]
    stability_poll_ms: u64,
}

fn default_process_interval_minutes() -> u64 {
    5
}

fn default_past_threshold_minutes() -> i64 {
    -10
}

fn default_future_threshold_minutes() -> i64 {
    10
}

fn default_hold_until_due() -> bool {
    true
}

fn default_stability_quiet_ms() -> u64 {
    2_000
}

fn default_stability_poll_ms() -> u64 {
    500
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self::new(PathBuf::new())
    }
}

impl WatchConfig {
    /// Defaults for `watch_dir`.
    pub fn new(watch_dir: impl Into<PathBuf>) -> Self {
        Self {
            watch_dir: watch_dir.into(),
            process_interval_minutes: default_process_interval_minutes(),
            past_threshold_minutes: default_past_threshold_minutes(),
            future_threshold_minutes: default_future_threshold_minutes(),
            hold_until_due: default_hold_until_due(),
            stability_quiet_ms: default_stability_quiet_ms(),
            stability_poll_ms: default_stability_poll_ms(),
        }
    }

    /// Window used by the live watch and the startup scan.
    pub fn symmetric_window(&self) -> EligibilityWindow {
        EligibilityWindow::new(self.past_threshold_minutes, self.future_threshold_minutes)
    }

    /// Window used by the periodic scan.
    pub fn forward_window(&self) -> EligibilityWindow {
        EligibilityWindow::forward(self.future_threshold_minutes)
    }

    /// Forward scan period.
    pub fn process_interval(&self) -> Duration {
        Duration::from_secs(self.process_interval_minutes.max(1) * 60)
    }

    /// Stability quiet period.
    pub fn stability_quiet(&self) -> Duration {
        Duration::from_millis(self.stability_quiet_ms)
    }

    /// Stability poll interval.
    pub fn stability_poll(&self) -> Duration {
        Duration::from_millis(self.stability_poll_ms.max(1))
    }
}

/// Settings of the post folder validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct ValidationConfig {
    /// Total time to wait for referenced files to appear (milliseconds)
    #[serde(default = "default_file_wait_timeout_ms")]
    file_wait_timeout_ms: u64,

    /// Poll interval while waiting for files (milliseconds)
    #[serde(default = "default_file_poll_ms")]
    file_poll_ms: u64,
}

fn default_file_wait_timeout_ms() -> u64 {
    10_000
}

fn default_file_poll_ms() -> u64 {
    500
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            file_wait_timeout_ms: default_file_wait_timeout_ms(),
            file_poll_ms: default_file_poll_ms(),
        }
    }
}

impl ValidationConfig {
    /// File wait timeout.
    pub fn file_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.file_wait_timeout_ms)
    }

    /// File poll interval.
    pub fn file_poll(&self) -> Duration {
        Duration::from_millis(self.file_poll_ms.max(1))
    }
}
