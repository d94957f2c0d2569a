//! Publishing for courier: the container state machine, the platform
//! registry, the per-folder publisher, the platform clients and the optional
//! stats report.
//!
//! # Example
//!
//! ```rust,ignore
//! use courier_social::{PlatformRegistry, PostPublisher, ThreadsClient};
//!
//! let mut registry = PlatformRegistry::new();
//! registry.register_container(ThreadsClient::new(user_id, token));
//! let publisher = PostPublisher::new(registry, Some(staging), container, publish);
//! publisher.publish_folder(&folder, &settings).await.into_result()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bluesky;
mod config;
pub mod container;
mod dry_run;
mod firebase;
mod graph;
mod http;
mod instagram;
mod mastodon;
mod publisher;
mod registry;
mod stats;
mod threads;
mod twitter;

pub use bluesky::{link_facets, BlueskyClient};
pub use config::{
    ContainerConfig, ContainerConfigBuilder, FailurePolicy, PublishConfig, StatsConfig,
    StatsConfigBuilder,
};
pub use container::{ContainerUnit, StagedAttachment};
pub use dry_run::{DryRunContainerClient, DryRunDirectClient, DryRunStaging};
pub use firebase::{firebase_object_path, FirebaseCredentials, FirebaseStaging};
pub use instagram::{InstagramClient, InstagramStatus};
pub use mastodon::MastodonClient;
pub use publisher::{PlatformOutcome, PostPublisher, PublishReport};
pub use registry::{PlatformHandle, PlatformRegistry};
pub use stats::{LastStats, MetricChange, StatsChange, StatsHandle, StatsReporter};
pub use threads::{ThreadsClient, ThreadsStatus};
pub use twitter::TwitterClient;
