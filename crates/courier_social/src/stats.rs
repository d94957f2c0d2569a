//! Periodic engagement report for the latest post on each platform.
//!
//! A [`StatsReporter`] owns the last reading per platform and logs each new
//! reading with its change since the previous one. Publishers hold a
//! [`StatsHandle`] and reset a platform after posting to it, so the next
//! report starts from the new post.

use crate::StatsConfig;
use chrono::{Local, Timelike};
use courier_core::Platform;
use courier_interface::{PostId, PostStats, StatsSource};
use derive_getters::Getters;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

/// One counter and its change since the previous reading.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct MetricChange {
    /// Counter name.
    name: String,
    /// Current value.
    value: u64,
    /// Difference to the previous reading of the same post.
    delta: Option<i64>,
}

/// A platform reading compared with the one before it.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct StatsChange {
    /// Platform the reading came from.
    platform: Platform,
    /// Post the counters belong to.
    post_id: PostId,
    /// Counters in name order.
    metrics: Vec<MetricChange>,
}

impl std::fmt::Display for StatsChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, metric) in self.metrics.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", metric.name, metric.value)?;
            match metric.delta {
                Some(delta) if delta > 0 => write!(f, " (+{})", delta)?,
                Some(delta) if delta < 0 => write!(f, " ({})", delta)?,
                _ => {}
            }
        }
        Ok(())
    }
}

/// Last reading per platform.
#[derive(Debug, Clone, Default)]
pub struct LastStats {
    readings: HashMap<Platform, PostStats>,
}

impl LastStats {
    /// Previous reading for `platform`.
    pub fn get(&self, platform: Platform) -> Option<&PostStats> {
        self.readings.get(&platform)
    }

    /// Forget the reading for `platform`.
    pub fn reset(&mut self, platform: Platform) {
        if self.readings.remove(&platform).is_some() {
            debug!(%platform, "Reset last stats");
        }
    }

    /// Store `current` and compare it with the previous reading.
    ///
    /// Deltas are only computed against a reading of the same post.
    pub fn update(&mut self, platform: Platform, current: PostStats) -> StatsChange {
        let previous = self
            .readings
            .get(&platform)
            .filter(|previous| previous.post_id() == current.post_id());
        let metrics = current
            .metrics()
            .iter()
            .map(|(name, value)| MetricChange {
                name: name.clone(),
                value: *value,
                delta: previous
                    .and_then(|p| p.metrics().get(name))
                    .map(|before| *value as i64 - *before as i64),
            })
            .collect();
        let change = StatsChange {
            platform,
            post_id: current.post_id().clone(),
            metrics,
        };
        self.readings.insert(platform, current);
        change
    }
}

/// Sends resets to a running [`StatsReporter`].
#[derive(Debug, Clone)]
pub struct StatsHandle {
    tx: mpsc::UnboundedSender<Platform>,
}

impl StatsHandle {
    /// Drop the last reading of `platform` after a new post went out.
    pub fn reset(&self, platform: Platform) {
        if self.tx.send(platform).is_err() {
            debug!(%platform, "Stats reporter is not running");
        }
    }
}

/// Polls every source on a schedule and logs what changed.
pub struct StatsReporter {
    sources: Vec<Arc<dyn StatsSource>>,
    config: StatsConfig,
    last: LastStats,
    resets: mpsc::UnboundedReceiver<Platform>,
}

impl StatsReporter {
    /// Create a reporter and the handle that resets it.
    pub fn new(sources: Vec<Arc<dyn StatsSource>>, config: StatsConfig) -> (StatsHandle, Self) {
        let (tx, resets) = mpsc::unbounded_channel();
        let reporter = Self {
            sources,
            config,
            last: LastStats::default(),
            resets,
        };
        (StatsHandle { tx }, reporter)
    }

    /// Readings kept so far.
    pub fn last(&self) -> &LastStats {
        &self.last
    }

    /// Apply pending resets, then read every source once.
    ///
    /// A failing source is logged and skipped.
    #[instrument(skip(self), fields(sources = self.sources.len()))]
    pub async fn poll_once(&mut self) -> Vec<StatsChange> {
        while let Ok(platform) = self.resets.try_recv() {
            self.last.reset(platform);
        }

        let mut changes = Vec::new();
        for source in &self.sources {
            let platform = source.platform();
            match source.latest_stats().await {
                Ok(Some(stats)) => {
                    let change = self.last.update(platform, stats);
                    info!(%platform, post = %change.post_id, stats = %change, "Post stats");
                    changes.push(change);
                }
                Ok(None) => debug!(%platform, "No posts to report"),
                Err(e) => warn!(%platform, error = %e, "Checking stats failed"),
            }
        }
        changes
    }

    /// Report on schedule until every handle is dropped.
    pub async fn run(mut self) {
        let period = self.config.interval();
        info!(
            minutes = period.as_secs() / 60,
            from = self.config.active_from_hour(),
            until = self.config.active_until_hour(),
            "Checking stats periodically"
        );
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.config.is_active_hour(Local::now().hour()) {
                        self.poll_once().await;
                    } else {
                        debug!("Outside stats hours");
                    }
                }
                reset = self.resets.recv() => match reset {
                    Some(platform) => self.last.reset(platform),
                    None => break,
                },
            }
        }
        info!("Stats reporter stopped");
    }
}
