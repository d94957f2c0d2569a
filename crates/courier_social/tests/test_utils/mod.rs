//! Recording test doubles for the capability traits.

#![allow(dead_code)]

use async_trait::async_trait;
use courier_core::Platform;
use courier_error::{PublishError, PublishErrorKind, PublishResult, StagingError, StagingErrorKind};
use courier_interface::{
    ContainerId, ContainerOptions, ContainerPlatform, ContainerState, DirectPlatform,
    MediaStaging, PostDraft, PostId, PostStats, PublishedPost, StagedMedia, StatsSource,
};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// Shared, ordered call log.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub fn count(log: &CallLog, prefix: &str) -> usize {
    log.lock().unwrap().iter().filter(|c| c.starts_with(prefix)).count()
}

/// Scripted answer to one status check.
#[derive(Debug, Clone)]
pub enum MockStatus {
    InProgress,
    Finished,
    Error(String),
    CallFails,
}

/// Container platform answering status checks from a script.
///
/// Once the script is exhausted every check answers `fallback`.
pub struct MockContainerPlatform {
    platform: Platform,
    script: Mutex<VecDeque<MockStatus>>,
    fallback: MockStatus,
    fail_create: bool,
    log: CallLog,
    next_id: AtomicU32,
}

impl MockContainerPlatform {
    pub fn new(platform: Platform, log: CallLog) -> Self {
        Self {
            platform,
            script: Mutex::new(VecDeque::new()),
            fallback: MockStatus::Finished,
            fail_create: false,
            log,
            next_id: AtomicU32::new(1),
        }
    }

    pub fn with_script(self, script: Vec<MockStatus>) -> Self {
        *self.script.lock().unwrap() = script.into();
        self
    }

    pub fn with_fallback(mut self, fallback: MockStatus) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    fn record(&self, call: String) {
        self.log.lock().unwrap().push(format!("{}:{}", self.platform, call));
    }

    fn create(&self, what: String, options: &ContainerOptions) -> PublishResult<ContainerId> {
        let reply = options
            .reply_to
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        self.record(format!(
            "create:{}:item={}:reply={}",
            what, options.is_carousel_item, reply
        ));
        if self.fail_create {
            return Err(PublishError::new(PublishErrorKind::ContainerCreate {
                platform: self.platform.to_string(),
                reason: "rejected".to_string(),
            }));
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(ContainerId::from(format!("c{}", n)))
    }
}

#[async_trait]
impl ContainerPlatform for MockContainerPlatform {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn create_text_container(
        &self,
        text: &str,
        options: &ContainerOptions,
    ) -> PublishResult<ContainerId> {
        self.create(format!("text({})", text), options)
    }

    async fn create_image_container(
        &self,
        image_url: &str,
        _text: &str,
        options: &ContainerOptions,
    ) -> PublishResult<ContainerId> {
        self.create(format!("image({})", image_url), options)
    }

    async fn create_video_container(
        &self,
        video_url: &str,
        _text: &str,
        options: &ContainerOptions,
    ) -> PublishResult<ContainerId> {
        self.create(format!("video({})", video_url), options)
    }

    async fn create_carousel_container(
        &self,
        children: &[ContainerId],
        _text: &str,
        options: &ContainerOptions,
    ) -> PublishResult<ContainerId> {
        let children: Vec<&str> = children.iter().map(ContainerId::as_str).collect();
        self.create(format!("carousel({})", children.join(",")), options)
    }

    async fn check_container_status(&self, id: &ContainerId) -> PublishResult<ContainerState> {
        self.record(format!("status:{}", id));
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match next {
            MockStatus::InProgress => Ok(ContainerState::InProgress),
            MockStatus::Finished => Ok(ContainerState::Finished),
            MockStatus::Error(message) => Ok(ContainerState::Error(message)),
            MockStatus::CallFails => Err(PublishError::new(PublishErrorKind::StatusCheck {
                container: id.to_string(),
                reason: "connection reset".to_string(),
            })),
        }
    }

    async fn publish(&self, id: &ContainerId) -> PublishResult<PostId> {
        self.record(format!("publish:{}", id));
        Ok(PostId::from(format!("post-{}", id)))
    }
}

/// Direct platform that records drafts.
pub struct MockDirectPlatform {
    platform: Platform,
    fail: bool,
    log: CallLog,
    next_id: AtomicU32,
}

impl MockDirectPlatform {
    pub fn new(platform: Platform, log: CallLog) -> Self {
        Self {
            platform,
            fail: false,
            log,
            next_id: AtomicU32::new(1),
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl DirectPlatform for MockDirectPlatform {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn publish(&self, draft: &PostDraft) -> PublishResult<PublishedPost> {
        let reply = draft
            .reply_to()
            .as_ref()
            .map(|r| format!("{}/{}", r.root().id(), r.parent().id()))
            .unwrap_or_else(|| "-".to_string());
        self.log.lock().unwrap().push(format!(
            "{}:publish:{}:media={}:reply={}",
            self.platform,
            draft.text(),
            draft.media().len(),
            reply
        ));
        if self.fail {
            return Err(PublishError::new(PublishErrorKind::Api {
                platform: self.platform.to_string(),
                status: 500,
                message: "boom".to_string(),
            }));
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(PublishedPost::new(
            format!("{}-{}", self.platform, n),
            Some(format!("cid{}", n)),
            None,
        ))
    }
}

/// Staging backend that records uploads and deletes.
pub struct MockStaging {
    fail: bool,
    log: CallLog,
}

impl MockStaging {
    pub fn new(log: CallLog) -> Self {
        Self { fail: false, log }
    }

    pub fn failing(log: CallLog) -> Self {
        Self { fail: true, log }
    }
}

#[async_trait]
impl MediaStaging for MockStaging {
    async fn upload_file(&self, path: &Path) -> Result<StagedMedia, StagingError> {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        self.log.lock().unwrap().push(format!("staging:upload:{}", name));
        if self.fail {
            return Err(StagingError::new(StagingErrorKind::Upload("denied".to_string())));
        }
        Ok(StagedMedia::new(format!("https://cdn.test/{}", name), name))
    }

    async fn delete_file(&self, media: &StagedMedia) -> Result<(), StagingError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("staging:delete:{}", media.handle()));
        Ok(())
    }
}

/// Stats source answering from a script, then repeating its last reading.
pub struct MockStatsSource {
    platform: Platform,
    script: Mutex<VecDeque<Option<PostStats>>>,
    last: Mutex<Option<PostStats>>,
    fail: bool,
}

impl MockStatsSource {
    pub fn new(platform: Platform, readings: Vec<Option<PostStats>>) -> Self {
        Self {
            platform,
            script: Mutex::new(readings.into()),
            last: Mutex::new(None),
            fail: false,
        }
    }

    pub fn failing(platform: Platform) -> Self {
        Self {
            fail: true,
            ..Self::new(platform, Vec::new())
        }
    }
}

#[async_trait]
impl StatsSource for MockStatsSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn latest_stats(&self) -> PublishResult<Option<PostStats>> {
        if self.fail {
            return Err(PublishError::new(PublishErrorKind::Api {
                platform: self.platform.to_string(),
                status: 401,
                message: "expired token".to_string(),
            }));
        }
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            *last = next;
        }
        Ok(last.clone())
    }
}

/// Reading of `post` with likes and replies.
pub fn reading(post: &str, likes: u64, replies: u64) -> PostStats {
    PostStats::new(post, [("likes", likes), ("replies", replies)])
}
