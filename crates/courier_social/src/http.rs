//! Shared request handling for the platform clients.

use courier_core::Platform;
use courier_error::{PublishError, PublishErrorKind, PublishResult};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::error;

/// Send a request and decode a JSON success body.
///
/// Transport failures map to `Request`, non-success statuses to `Api` with
/// the response body as the message.
pub(crate) async fn send_json<T: DeserializeOwned>(
    platform: Platform,
    request: RequestBuilder,
) -> PublishResult<T> {
    let response = request.send().await.map_err(|e| {
        error!(%platform, error = ?e, "Request failed");
        PublishError::new(PublishErrorKind::Request {
            platform: platform.to_string(),
            reason: e.to_string(),
        })
    })?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        error!(%platform, status = %status, body = %body, "API returned error");
        return Err(PublishError::new(PublishErrorKind::Api {
            platform: platform.to_string(),
            status: status.as_u16(),
            message: body,
        }));
    }

    response.json::<T>().await.map_err(|e| {
        error!(%platform, error = ?e, "Failed to parse response");
        PublishError::new(PublishErrorKind::Request {
            platform: platform.to_string(),
            reason: format!("Failed to parse response: {}", e),
        })
    })
}

/// Rewrap a transport or API failure as a stage-specific error.
pub(crate) fn restage(error: PublishError, stage: impl FnOnce(String) -> PublishErrorKind) -> PublishError {
    PublishError::new(stage(error.kind().to_string()))
}

/// Read an attachment from disk.
pub(crate) async fn read_media(platform: Platform, path: &std::path::Path) -> PublishResult<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| {
        error!(%platform, path = %path.display(), error = ?e, "Failed to read media");
        PublishError::new(PublishErrorKind::Publish {
            platform: platform.to_string(),
            reason: format!("Failed to read {}: {}", path.display(), e),
        })
    })
}

/// Multipart file part for an attachment.
pub(crate) fn media_part(
    platform: Platform,
    media: &courier_interface::LocalMedia,
    bytes: Vec<u8>,
) -> PublishResult<reqwest::multipart::Part> {
    let file_name = media
        .path()
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    reqwest::multipart::Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(media.mime())
        .map_err(|e| {
            PublishError::new(PublishErrorKind::Publish {
                platform: platform.to_string(),
                reason: format!("Invalid media type {}: {}", media.mime(), e),
            })
        })
}
