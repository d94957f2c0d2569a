//! Registry mapping platforms to their publishing clients.

use courier_core::Platform;
use courier_error::{PublishError, PublishErrorKind, PublishResult};
use courier_interface::{ContainerPlatform, DirectPlatform};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// A registered client, tagged by the shape of its API.
#[derive(Clone)]
pub enum PlatformHandle {
    /// Two-phase container API.
    Container(Arc<dyn ContainerPlatform>),
    /// One-shot API.
    Direct(Arc<dyn DirectPlatform>),
}

impl PlatformHandle {
    async fn authenticate(&self) -> PublishResult<()> {
        match self {
            PlatformHandle::Container(client) => client.authenticate().await,
            PlatformHandle::Direct(client) => client.authenticate().await,
        }
    }
}

impl std::fmt::Debug for PlatformHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformHandle::Container(client) => write!(f, "Container({})", client.platform()),
            PlatformHandle::Direct(client) => write!(f, "Direct({})", client.platform()),
        }
    }
}

/// Registry of platform clients.
///
/// The publish loop looks clients up here and never branches on platform
/// names itself.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = PlatformRegistry::new();
/// registry.register_container(ThreadsClient::new(user_id, token));
/// registry.register_direct(MastodonClient::new(instance, token));
/// registry.authenticate_all().await;
/// ```
#[derive(Debug, Clone, Default)]
pub struct PlatformRegistry {
    handles: BTreeMap<Platform, PlatformHandle>,
}

impl PlatformRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        debug!("Creating new PlatformRegistry");
        Self::default()
    }

    /// Register a container-style client, replacing any previous one.
    pub fn register_container<C: ContainerPlatform + 'static>(&mut self, client: C) -> &mut Self {
        let platform = client.platform();
        info!(%platform, "Registering container platform client");
        self.handles
            .insert(platform, PlatformHandle::Container(Arc::new(client)));
        self
    }

    /// Register a one-shot client, replacing any previous one.
    pub fn register_direct<D: DirectPlatform + 'static>(&mut self, client: D) -> &mut Self {
        let platform = client.platform();
        info!(%platform, "Registering direct platform client");
        self.handles
            .insert(platform, PlatformHandle::Direct(Arc::new(client)));
        self
    }

    /// Client for `platform`.
    pub fn get(&self, platform: Platform) -> Option<&PlatformHandle> {
        self.handles.get(&platform)
    }

    /// Client for `platform`, or a `NotConfigured` error.
    #[track_caller]
    pub fn require(&self, platform: Platform) -> PublishResult<&PlatformHandle> {
        self.handles.get(&platform).ok_or_else(|| {
            PublishError::new(PublishErrorKind::NotConfigured(platform.to_string()))
        })
    }

    /// Registered platforms in sorted order.
    pub fn platforms(&self) -> Vec<Platform> {
        self.handles.keys().copied().collect()
    }

    /// Whether a client is registered for `platform`.
    pub fn has_platform(&self, platform: Platform) -> bool {
        self.handles.contains_key(&platform)
    }

    /// Authenticate every client and drop the ones that fail.
    ///
    /// Returns the platforms that were removed.
    #[instrument(skip(self))]
    pub async fn authenticate_all(&mut self) -> Vec<Platform> {
        let mut failed = Vec::new();
        for (platform, handle) in &self.handles {
            match handle.authenticate().await {
                Ok(()) => debug!(%platform, "Authenticated"),
                Err(e) => {
                    warn!(%platform, error = %e, "Authentication failed, platform disabled");
                    failed.push(*platform);
                }
            }
        }
        for platform in &failed {
            self.handles.remove(platform);
        }
        failed
    }
}
