//! Command handlers.

use courier::{
    AttachmentArg, CourierConfig, Credentials, NewPost, Orchestrator, PostValidator,
    StatsReporter, build_publisher, build_stats_sources, create_post_folder,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Run the watch loop until Ctrl-C or a fatal error.
#[instrument(skip(config))]
pub async fn watch(
    config: CourierConfig,
    dry_run: bool,
    dir: Option<PathBuf>,
    stats: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = match dir {
        Some(dir) => {
            let watch = config.watch().clone().with_watch_dir(courier::expand_home(&dir));
            config.with_watch(watch)
        }
        None => config,
    };
    if dry_run {
        info!("Dry run: no platform will be contacted");
    }

    let credentials = Credentials::from_env();
    let mut publisher = build_publisher(&config, &credentials, dry_run).await;

    let reporter_task = match (stats, dry_run) {
        (true, true) => {
            warn!("Stats are not checked during a dry run");
            None
        }
        (true, false) => {
            let sources = build_stats_sources(&config, &credentials);
            let (handle, reporter) = StatsReporter::new(sources, config.stats().clone());
            publisher = publisher.with_stats(handle);
            Some(tokio::spawn(reporter.run()))
        }
        (false, _) => None,
    };

    let result = Orchestrator::new(
        config.watch().clone(),
        config.validation().clone(),
        Arc::new(publisher),
    )
    .run()
    .await;
    if let Some(task) = reporter_task {
        task.abort();
    }
    result?;
    Ok(())
}

/// Create a post folder and print its location.
pub async fn create_post(
    config: &CourierConfig,
    at: &str,
    platforms: &[String],
    text: String,
    files: Vec<AttachmentArg>,
    replies: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let post = NewPost::parse(at, platforms, text, files, replies)?;
    let folder = create_post_folder(config.watch().watch_dir(), &post, config.validation()).await?;
    println!("Created {}", folder.display());
    Ok(())
}

/// Validate a folder and print the outcome.
pub async fn check_folder(
    config: &CourierConfig,
    folder: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let validator = PostValidator::new(config.validation().clone());
    match validator.validate(folder).await {
        Ok(settings) => {
            println!("{} is valid: {}", folder.display(), settings.summary());
            Ok(())
        }
        Err(report) => {
            println!("{} is not valid:", folder.display());
            for reason in report.reasons() {
                println!("  - {}", reason);
            }
            Err(report.into())
        }
    }
}
