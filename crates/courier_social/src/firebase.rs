//! Firebase Storage staging over the REST API.
//!
//! Files are uploaded to `user/{uid}/{post folder}/{file name}` after a
//! password sign-in, and fetched by platforms through a tokenised download
//! URL.

use async_trait::async_trait;
use courier_core::mime_type_for;
use courier_error::{StagingError, StagingErrorKind};
use courier_interface::{MediaStaging, StagedMedia};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument};

const IDENTITY_TOOLKIT_URL: &str =
    "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword";
const STORAGE_URL: &str = "https://firebasestorage.googleapis.com/v0/b";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignIn {
    id_token: String,
    local_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageObject {
    name: String,
    #[serde(default)]
    download_tokens: Option<String>,
}

/// Firebase credentials and bucket.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct FirebaseCredentials {
    /// Web API key
    api_key: String,
    /// Account email
    email: String,
    /// Account password
    password: String,
    /// Storage bucket, e.g. `my-app.appspot.com`
    storage_bucket: String,
}

impl FirebaseCredentials {
    /// Bundle credentials.
    pub fn new(
        api_key: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        storage_bucket: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            email: email.into(),
            password: password.into(),
            storage_bucket: storage_bucket.into(),
        }
    }
}

/// Object path for a file inside a post folder.
///
/// # Examples
///
/// ```
/// use courier_social::firebase_object_path;
/// use std::path::Path;
///
/// let path = firebase_object_path("uid1", Path::new("/watch/2025.03.01-09.00/a.jpg"));
/// assert_eq!(path, "user/uid1/2025.03.01-09.00/a.jpg");
/// ```
pub fn firebase_object_path(uid: &str, file: &Path) -> String {
    let parent = file
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("user/{}/{}/{}", uid, parent, name)
}

/// Firebase Storage staging backend.
pub struct FirebaseStaging {
    client: Client,
    credentials: FirebaseCredentials,
    session: RwLock<Option<SignIn>>,
}

impl std::fmt::Debug for FirebaseStaging {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseStaging")
            .field("storage_bucket", self.credentials.storage_bucket())
            .finish_non_exhaustive()
    }
}

impl FirebaseStaging {
    /// Create a staging backend. Sign-in happens on first use.
    pub fn new(credentials: FirebaseCredentials) -> Self {
        debug!("Creating new Firebase staging backend");
        Self {
            client: Client::new(),
            credentials,
            session: RwLock::new(None),
        }
    }

    /// Sign in with email and password.
    #[instrument(skip(self))]
    pub async fn sign_in(&self) -> Result<(), StagingError> {
        let request = self
            .client
            .post(IDENTITY_TOOLKIT_URL)
            .query(&[("key", self.credentials.api_key())])
            .json(&SignInRequest {
                email: self.credentials.email(),
                password: self.credentials.password(),
                return_secure_token: true,
            });
        let response = request.send().await.map_err(|e| {
            error!(error = ?e, "Firebase sign-in request failed");
            StagingError::new(StagingErrorKind::Authentication(e.to_string()))
        })?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Firebase sign-in rejected");
            return Err(StagingError::new(StagingErrorKind::Authentication(format!(
                "{}: {}",
                status, body
            ))));
        }
        let session: SignIn = response.json().await.map_err(|e| {
            StagingError::new(StagingErrorKind::Authentication(format!(
                "Failed to parse response: {}",
                e
            )))
        })?;
        info!(uid = %session.local_id, "Signed in to Firebase");
        *self.session.write().await = Some(session);
        Ok(())
    }

    async fn session(&self) -> Result<SignIn, StagingError> {
        if let Some(session) = self.session.read().await.as_ref() {
            return Ok(session.clone());
        }
        self.sign_in().await?;
        self.session.read().await.clone().ok_or_else(|| {
            StagingError::new(StagingErrorKind::Authentication(
                "no session after sign-in".to_string(),
            ))
        })
    }

    fn bucket_url(&self, segments: &[&str]) -> Result<Url, StagingError> {
        let mut url = Url::parse(STORAGE_URL)
            .map_err(|e| StagingError::new(StagingErrorKind::NotConfigured(e.to_string())))?;
        url.path_segments_mut()
            .map_err(|_| {
                StagingError::new(StagingErrorKind::NotConfigured(
                    "storage URL cannot be a base".to_string(),
                ))
            })?
            .push(self.credentials.storage_bucket())
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl MediaStaging for FirebaseStaging {
    #[instrument(skip(self), fields(path = %path.display()))]
    async fn upload_file(&self, path: &Path) -> Result<StagedMedia, StagingError> {
        let session = self.session().await?;
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            StagingError::new(StagingErrorKind::FileRead(format!("{}: {}", path.display(), e)))
        })?;
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = firebase_object_path(&session.local_id, path);

        let url = self.bucket_url(&["o"])?;

        let response = self
            .client
            .post(url)
            .query(&[("uploadType", "media"), ("name", name.as_str())])
            .header("authorization", format!("Firebase {}", session.id_token))
            .header("content-type", mime_type_for(&ext))
            .body(bytes)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Upload request failed");
                StagingError::new(StagingErrorKind::Upload(e.to_string()))
            })?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Upload rejected");
            return Err(StagingError::new(StagingErrorKind::Upload(format!(
                "{}: {}",
                status, body
            ))));
        }
        let object: StorageObject = response.json().await.map_err(|e| {
            StagingError::new(StagingErrorKind::Upload(format!(
                "Failed to parse response: {}",
                e
            )))
        })?;

        let token = object.download_tokens.unwrap_or_default();
        let token = token.split(',').next().unwrap_or_default();
        let mut public_url = self.bucket_url(&["o", object.name.as_str()])?;
        public_url
            .query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("token", token);

        info!(object = %object.name, "Uploaded media to Firebase Storage");
        Ok(StagedMedia::new(public_url.to_string(), object.name))
    }

    #[instrument(skip(self), fields(object = %media.handle()))]
    async fn delete_file(&self, media: &StagedMedia) -> Result<(), StagingError> {
        let session = self.session().await?;
        let response = self
            .client
            .delete(self.bucket_url(&["o", media.handle().as_str()])?)
            .header("authorization", format!("Firebase {}", session.id_token))
            .send()
            .await
            .map_err(|e| StagingError::new(StagingErrorKind::Delete(e.to_string())))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StagingError::new(StagingErrorKind::Delete(format!(
                "{}: {}",
                status, body
            ))));
        }
        debug!("Deleted staged object");
        Ok(())
    }
}
