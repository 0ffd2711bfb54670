use std::time::Duration;

use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::Serialize;

use crate::config::S3Config;
use crate::error::AppError;

const MAX_FILE_NAME_LEN: usize = 128;

/// Attachment store. Messages carry only object keys; clients move bytes
/// directly against the store with the URLs issued here.
pub struct ObjectStorage {
    client: Client,
    bucket: String,
    upload_ttl: Duration,
    download_ttl: Duration,
}

#[derive(Debug, Serialize)]
pub struct UploadAuthorization {
    pub upload_url: String,
    pub key: String,
    pub expires_in_seconds: u64,
}

/// Build an S3 client from the provided configuration
pub async fn build_storage(
    config: &S3Config,
    upload_ttl_seconds: u64,
    download_ttl_seconds: u64,
) -> Result<ObjectStorage, AppError> {
    let credentials = Credentials::new(
        &config.access_key_id,
        &config.secret_access_key,
        None,
        None,
        "chat-service",
    );

    let shared_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .credentials_provider(credentials)
        .load()
        .await;

    let mut builder = aws_sdk_s3::config::Builder::from(&shared_config);
    if let Some(endpoint) = &config.endpoint {
        if !endpoint.trim().is_empty() {
            builder = builder.endpoint_url(endpoint);
        }
    }

    Ok(ObjectStorage {
        client: Client::from_conf(builder.build()),
        bucket: config.bucket.clone(),
        upload_ttl: Duration::from_secs(upload_ttl_seconds),
        download_ttl: Duration::from_secs(download_ttl_seconds),
    })
}

impl ObjectStorage {
    /// Issue a short-lived write authorization for a new object
    pub async fn issue_upload(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> Result<UploadAuthorization, AppError> {
        let key = object_key(Utc::now(), &random_suffix(), file_name)?;

        let presign_cfg = PresigningConfig::builder()
            .expires_in(self.upload_ttl)
            .build()
            .map_err(|e| AppError::Storage(format!("presign config: {e}")))?;

        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .presigned(presign_cfg)
            .await
            .map_err(|e| AppError::Storage(format!("presign upload: {e}")))?;

        Ok(UploadAuthorization {
            upload_url: presigned.uri().to_string(),
            key,
            expires_in_seconds: self.upload_ttl.as_secs(),
        })
    }

    /// Issue a read authorization for an existing object. Download URLs live
    /// longer than upload URLs.
    pub async fn issue_download(&self, key: &str) -> Result<String, AppError> {
        validate_object_key(key)?;

        let presign_cfg = PresigningConfig::builder()
            .expires_in(self.download_ttl)
            .build()
            .map_err(|e| AppError::Storage(format!("presign config: {e}")))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign_cfg)
            .await
            .map_err(|e| AppError::Storage(format!("presign download: {e}")))?;

        Ok(presigned.uri().to_string())
    }
}

fn random_suffix() -> String {
    let mut bytes = [0u8; 4];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Keep a recognizable original name in the key while refusing anything that
/// could escape the upload prefix
pub fn sanitize_file_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("file name is required".into()));
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(AppError::Validation(
            "file name must not contain path separators".into(),
        ));
    }
    if name.chars().any(|c| c.is_control()) {
        return Err(AppError::Validation(
            "file name contains control characters".into(),
        ));
    }

    let sanitized: String = name
        .chars()
        .take(MAX_FILE_NAME_LEN)
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    Ok(sanitized)
}

/// Object key layout: date prefix, millisecond timestamp, random suffix,
/// sanitized original name. Timestamp plus suffix keeps concurrent uploads
/// of the same file name from colliding.
pub fn object_key(
    now: DateTime<Utc>,
    suffix: &str,
    file_name: &str,
) -> Result<String, AppError> {
    let name = sanitize_file_name(file_name)?;
    Ok(format!(
        "uploads/{}/{}-{}-{}",
        now.format("%Y-%m-%d"),
        now.timestamp_millis(),
        suffix,
        name
    ))
}

pub fn validate_object_key(key: &str) -> Result<(), AppError> {
    if key.is_empty() || key.len() > 512 {
        return Err(AppError::Validation("invalid object key".into()));
    }
    if key.contains("..") || key.starts_with('/') || key.contains('\\') {
        return Err(AppError::Validation("invalid object key".into()));
    }
    if key.chars().any(|c| c.is_control()) {
        return Err(AppError::Validation("invalid object key".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sanitize_keeps_safe_names() {
        assert_eq!(sanitize_file_name("report-v2.pdf").unwrap(), "report-v2.pdf");
        assert_eq!(sanitize_file_name("my photo.png").unwrap(), "my_photo.png");
    }

    #[test]
    fn sanitize_rejects_traversal() {
        assert!(sanitize_file_name("../../etc/passwd").is_err());
        assert!(sanitize_file_name("dir/file.txt").is_err());
        assert!(sanitize_file_name("dir\\file.txt").is_err());
        assert!(sanitize_file_name("").is_err());
        assert!(sanitize_file_name("evil\u{0000}.txt").is_err());
    }

    #[test]
    fn object_key_layout_is_stable() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 12, 30, 45).unwrap();
        let key = object_key(now, "deadbeef", "notes.txt").unwrap();
        assert_eq!(
            key,
            format!("uploads/2024-03-05/{}-deadbeef-notes.txt", now.timestamp_millis())
        );
        assert!(validate_object_key(&key).is_ok());
    }

    #[test]
    fn object_key_validation_rejects_escapes() {
        assert!(validate_object_key("uploads/2024-03-05/ok.txt").is_ok());
        assert!(validate_object_key("uploads/../secrets").is_err());
        assert!(validate_object_key("/absolute").is_err());
        assert!(validate_object_key("").is_err());
    }
}
