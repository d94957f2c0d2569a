//! Fixtures and recording doubles for the watch tests.

#![allow(dead_code)]

use async_trait::async_trait;
use courier_core::{Platform, PostSettings};
use courier_error::{PublishError, PublishErrorKind, PublishResult};
use courier_interface::{DirectPlatform, FolderProcessor, PostDraft, PublishedPost};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared, ordered event log.
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Folder processor that logs `start:{name}` / `end:{name}` around a delay.
pub struct RecordingProcessor {
    log: EventLog,
    delay: Duration,
    fail: Vec<String>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl RecordingProcessor {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            delay: Duration::ZERO,
            fail: Vec::new(),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing_for(mut self, folder: &str) -> Self {
        self.fail.push(folder.to_string());
        self
    }

    /// Highest number of folders processed at the same time.
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FolderProcessor for RecordingProcessor {
    async fn process(&self, folder: &Path, _settings: &PostSettings) -> PublishResult<()> {
        let name = folder.file_name().unwrap().to_string_lossy().into_owned();
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now_active, Ordering::SeqCst);
        self.log.lock().unwrap().push(format!("start:{}", name));

        tokio::time::sleep(self.delay).await;

        self.log.lock().unwrap().push(format!("end:{}", name));
        self.active.fetch_sub(1, Ordering::SeqCst);
        if self.fail.contains(&name) {
            return Err(PublishError::new(PublishErrorKind::Publish {
                platform: "mock".to_string(),
                reason: "scripted failure".to_string(),
            }));
        }
        Ok(())
    }
}

/// Direct platform that records every publish call.
pub struct RecordingPlatform {
    platform: Platform,
    log: EventLog,
}

impl RecordingPlatform {
    pub fn new(platform: Platform, log: EventLog) -> Self {
        Self { platform, log }
    }
}

#[async_trait]
impl DirectPlatform for RecordingPlatform {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn publish(&self, draft: &PostDraft) -> PublishResult<PublishedPost> {
        self.log
            .lock()
            .unwrap()
            .push(format!("{}:publish:{}", self.platform, draft.text()));
        Ok(PublishedPost::new("p1", None, Some("https://example.test/p1".to_string())))
    }
}

/// Write a post folder with the given settings document.
pub fn write_folder(root: &Path, name: &str, settings: &Value) -> PathBuf {
    let folder = root.join(name);
    std::fs::create_dir_all(&folder).unwrap();
    std::fs::write(
        folder.join("settings.json"),
        serde_json::to_string_pretty(settings).unwrap(),
    )
    .unwrap();
    folder
}

/// Flat text-only settings.
pub fn text_settings(platforms: &[&str], text: &str) -> Value {
    json!({
        "postType": "text",
        "platforms": platforms,
        "bodyText": text,
        "fileInfos": []
    })
}

/// Flat media settings.
pub fn media_settings(platforms: &[&str], text: &str, files: &[&str]) -> Value {
    let infos: Vec<Value> = files
        .iter()
        .map(|f| json!({ "filename": f, "altText": "" }))
        .collect();
    json!({
        "postType": "media",
        "platforms": platforms,
        "bodyText": text,
        "fileInfos": infos
    })
}
