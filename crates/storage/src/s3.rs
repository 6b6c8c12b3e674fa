//! [`ObjectStorage`] backed by the AWS S3 SDK.
//!
//! Works against any S3-compatible service (Aliyun OSS, MinIO, AWS) by
//! pointing the client at a custom endpoint with static credentials.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use aws_credential_types::Credentials;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use serde::Serialize;

use crate::config::StorageSettings;
use crate::error::StorageError;

/// Lifetime of a signed upload URL.
pub const PUT_URL_EXPIRY: Duration = Duration::from_secs(900);

/// Lifetime of a signed download URL.
pub const GET_URL_EXPIRY: Duration = Duration::from_secs(3600);

/// A presigned PUT handed to a client so it can upload directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignedUpload {
    pub upload_url: String,
    /// Where the object will be readable once uploaded.
    pub file_url: String,
    /// Headers the client must send with the PUT.
    pub headers: BTreeMap<String, String>,
    pub object_key: String,
}

#[derive(Debug, Clone)]
struct Connected {
    client: aws_sdk_s3::Client,
    settings: StorageSettings,
}

/// Storage collaborator. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ObjectStorage {
    /// Either a ready client or the name of the first missing variable.
    inner: Result<Connected, String>,
}

impl ObjectStorage {
    /// Read settings from the environment. Never fails; missing settings
    /// surface on the first call that needs them.
    pub fn from_env() -> Self {
        match StorageSettings::from_env() {
            Ok(settings) => Self::new(settings),
            Err(missing) => {
                tracing::info!(missing = %missing, "Object storage not configured");
                Self::unconfigured(missing)
            }
        }
    }

    pub fn new(settings: StorageSettings) -> Self {
        let credentials = Credentials::new(
            settings.access_key_id.clone(),
            settings.access_key_secret.clone(),
            None,
            None,
            "remix-storage",
        );
        let config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .endpoint_url(settings.endpoint_url())
            .credentials_provider(credentials)
            .build();

        Self {
            inner: Ok(Connected {
                client: aws_sdk_s3::Client::from_conf(config),
                settings,
            }),
        }
    }

    /// Storage that fails every call with a configuration error naming
    /// `missing`.
    pub fn unconfigured(missing: impl Into<String>) -> Self {
        Self {
            inner: Err(missing.into()),
        }
    }

    /// Whether all required settings are present.
    pub fn is_configured(&self) -> bool {
        self.inner.is_ok()
    }

    fn connected(&self) -> Result<&Connected, StorageError> {
        self.inner
            .as_ref()
            .map_err(|missing| StorageError::Configuration(missing.clone()))
    }

    /// Presign a PUT of `object_key` with the given content type.
    pub async fn sign_put(&self, object_key: &str, content_type: &str) -> Result<SignedUpload, StorageError> {
        let conn = self.connected()?;
        let presigned = conn
            .client
            .put_object()
            .bucket(&conn.settings.bucket)
            .key(object_key)
            .content_type(content_type)
            .presigned(presigning(PUT_URL_EXPIRY)?)
            .await
            .map_err(|e| StorageError::Request(DisplayErrorContext(&e).to_string()))?;

        let headers = BTreeMap::from([("Content-Type".to_string(), content_type.to_string())]);

        Ok(SignedUpload {
            upload_url: presigned.uri().to_string(),
            file_url: conn.settings.public_url(object_key),
            headers,
            object_key: object_key.to_string(),
        })
    }

    /// Upload a local file and return its public URL.
    pub async fn upload_file(
        &self,
        local_path: &Path,
        object_key: &str,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let conn = self.connected()?;
        let body = ByteStream::from_path(local_path)
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))?;

        conn.client
            .put_object()
            .bucket(&conn.settings.bucket)
            .key(object_key)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::Request(DisplayErrorContext(&e).to_string()))?;

        tracing::info!(object_key, "Uploaded object");
        Ok(conn.settings.public_url(object_key))
    }

    /// Link for reading `object_key`: signed for an hour when
    /// `OSS_SIGNED_DOWNLOADS` is on, public otherwise.
    pub async fn download_url(&self, object_key: &str) -> Result<String, StorageError> {
        let conn = self.connected()?;
        if !conn.settings.signed_downloads {
            return Ok(conn.settings.public_url(object_key));
        }
        let presigned = conn
            .client
            .get_object()
            .bucket(&conn.settings.bucket)
            .key(object_key)
            .presigned(presigning(GET_URL_EXPIRY)?)
            .await
            .map_err(|e| StorageError::Request(DisplayErrorContext(&e).to_string()))?;
        Ok(presigned.uri().to_string())
    }
}

fn presigning(expires_in: Duration) -> Result<PresigningConfig, StorageError> {
    PresigningConfig::expires_in(expires_in).map_err(|e| StorageError::InvalidConfig(e.to_string()))
}
