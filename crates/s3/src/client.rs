//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from
//! blobsync-core. Containers are S3 buckets; objects are addressed by their
//! slash-normalized relative path.

use async_trait::async_trait;
use bytes::Bytes;
use jiff::Timestamp;

use blobsync_core::{AccountConfig, ContainerInfo, Error, ObjectStore, RemoteItem, Result};

const LIST_PAGE_SIZE: i32 = 1000;

/// S3-backed object store
pub struct S3Client {
    inner: aws_sdk_s3::Client,
}

impl S3Client {
    /// Create a new S3 client from a parsed account configuration
    pub async fn new(account: AccountConfig) -> Result<Self> {
        let credentials = aws_credential_types::Credentials::new(
            account.access_key.clone(),
            account.secret_key.clone(),
            None, // session token
            None, // expiry
            "blobsync-static-credentials",
        );

        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(aws_config::Region::new(account.region.clone()))
            .endpoint_url(&account.endpoint)
            .load()
            .await;

        // Path-style addressing for compatibility with non-AWS endpoints
        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(true)
            .build();

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
        })
    }

    /// Format AWS SDK error into a detailed error message
    fn format_sdk_error<E: std::fmt::Display>(error: &aws_sdk_s3::error::SdkError<E>) -> String {
        match error {
            aws_sdk_s3::error::SdkError::ServiceError(service_err) => {
                let err = service_err.err();
                let meta = service_err.raw();
                let mut msg = format!("Service error: {}", err);
                // Try to extract additional error information from headers
                if let Some(code) = meta.headers().get("x-amz-error-code")
                    && let Ok(code_str) = std::str::from_utf8(code.as_bytes())
                {
                    msg.push_str(&format!(" (code: {})", code_str));
                }
                msg
            }
            aws_sdk_s3::error::SdkError::ConstructionFailure(err) => {
                format!("Request construction failed: {:?}", err)
            }
            aws_sdk_s3::error::SdkError::TimeoutError(_) => "Request timeout".to_string(),
            aws_sdk_s3::error::SdkError::DispatchFailure(err) => {
                format!("Network dispatch error: {:?}", err)
            }
            aws_sdk_s3::error::SdkError::ResponseError(err) => {
                format!("Response error: {:?}", err)
            }
            _ => error.to_string(),
        }
    }
}

/// Token driving the next listing page; None ends the pagination
///
/// A truncated response without a continuation token would otherwise
/// re-request the first page forever, so it ends the listing too.
fn next_page_token(is_truncated: bool, token: Option<&str>) -> Option<String> {
    if is_truncated {
        token.map(|t| t.to_string())
    } else {
        None
    }
}

/// True when an SDK error string denotes an absent bucket or key
fn indicates_missing(message: &str) -> bool {
    message.contains("NotFound")
        || message.contains("NoSuchKey")
        || message.contains("NoSuchBucket")
        || message.contains("404")
}

fn map_err_for<E: std::fmt::Display>(
    target: String,
) -> impl FnOnce(aws_sdk_s3::error::SdkError<E>) -> Error {
    move |e| {
        let message = S3Client::format_sdk_error(&e);
        if indicates_missing(&message) {
            Error::NotFound(target)
        } else {
            Error::Network(message)
        }
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list_containers(&self) -> Result<Vec<ContainerInfo>> {
        let response = self
            .inner
            .list_buckets()
            .send()
            .await
            .map_err(|e| Error::Network(Self::format_sdk_error(&e)))?;

        let containers = response
            .buckets()
            .iter()
            .map(|bucket| ContainerInfo {
                name: bucket.name().unwrap_or_default().to_string(),
                last_modified: bucket
                    .creation_date()
                    .and_then(|d| Timestamp::from_second(d.secs()).ok()),
            })
            .collect();

        Ok(containers)
    }

    async fn ensure_container(&self, name: &str) -> Result<()> {
        match self.inner.head_bucket().bucket(name).send().await {
            Ok(_) => return Ok(()),
            Err(e) => {
                let message = Self::format_sdk_error(&e);
                if !indicates_missing(&message) {
                    return Err(Error::Network(message));
                }
            }
        }

        tracing::debug!(container = name, "creating container");
        self.inner
            .create_bucket()
            .bucket(name)
            .acl(aws_sdk_s3::types::BucketCannedAcl::Private)
            .send()
            .await
            .map_err(|e| Error::Network(Self::format_sdk_error(&e)))?;

        Ok(())
    }

    async fn list_objects(&self, container: &str) -> Result<Vec<RemoteItem>> {
        let mut items = Vec::new();
        let mut continuation_token: Option<String> = None;

        // Flat listing: no delimiter, paginate until the store reports the
        // end.
        loop {
            let mut request = self
                .inner
                .list_objects_v2()
                .bucket(container)
                .max_keys(LIST_PAGE_SIZE);
            if let Some(token) = &continuation_token {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(map_err_for(format!("container '{container}'")))?;

            for object in response.contents() {
                let key = object.key().unwrap_or_default().to_string();
                if key.is_empty() || key.ends_with('/') {
                    continue;
                }
                items.push(RemoteItem {
                    key,
                    size_bytes: object.size().unwrap_or(0).max(0) as u64,
                    last_modified: object
                        .last_modified()
                        .and_then(|d| Timestamp::from_second(d.secs()).ok()),
                });
            }

            continuation_token = next_page_token(
                response.is_truncated().unwrap_or(false),
                response.next_continuation_token(),
            );
            if continuation_token.is_none() {
                break;
            }
        }

        Ok(items)
    }

    async fn head_object(&self, container: &str, key: &str) -> Result<RemoteItem> {
        let response = self
            .inner
            .head_object()
            .bucket(container)
            .key(key)
            .send()
            .await
            .map_err(map_err_for(format!("{container}/{key}")))?;

        Ok(RemoteItem {
            key: key.to_string(),
            size_bytes: response.content_length().unwrap_or(0).max(0) as u64,
            last_modified: response
                .last_modified()
                .and_then(|d| Timestamp::from_second(d.secs()).ok()),
        })
    }

    async fn get_object(&self, container: &str, key: &str) -> Result<Bytes> {
        let response = self
            .inner
            .get_object()
            .bucket(container)
            .key(key)
            .send()
            .await
            .map_err(map_err_for(format!("{container}/{key}")))?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| Error::Network(e.to_string()))?
            .into_bytes();

        Ok(data)
    }

    async fn put_object(
        &self,
        container: &str,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Result<()> {
        let mut request = self
            .inner
            .put_object()
            .bucket(container)
            .key(key)
            .body(aws_sdk_s3::primitives::ByteStream::from(body));

        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        request
            .send()
            .await
            .map_err(|e| Error::Network(Self::format_sdk_error(&e)))?;

        Ok(())
    }

    async fn delete_object(&self, container: &str, key: &str) -> Result<()> {
        self.inner
            .delete_object()
            .bucket(container)
            .key(key)
            .send()
            .await
            .map_err(map_err_for(format!("{container}/{key}")))?;

        Ok(())
    }

    async fn delete_container(&self, name: &str) -> Result<()> {
        // S3 refuses to delete a non-empty bucket, so drain it first.
        let keys: Vec<String> = self
            .list_objects(name)
            .await?
            .into_iter()
            .map(|item| item.key)
            .collect();

        for key in keys {
            self.delete_object(name, &key).await?;
        }

        self.inner
            .delete_bucket()
            .bucket(name)
            .send()
            .await
            .map_err(map_err_for(format!("container '{name}'")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_page_token() {
        assert_eq!(next_page_token(true, Some("abc")), Some("abc".to_string()));
        assert_eq!(next_page_token(false, Some("abc")), None);
        // Truncated but tokenless must end the listing, not loop
        assert_eq!(next_page_token(true, None), None);
    }

    #[test]
    fn test_indicates_missing() {
        assert!(indicates_missing("Service error: NoSuchKey"));
        assert!(indicates_missing("Service error: NoSuchBucket (code: 404)"));
        assert!(indicates_missing("NotFound"));
        assert!(!indicates_missing("503 Service Unavailable"));
        assert!(!indicates_missing("connection reset"));
    }
}
