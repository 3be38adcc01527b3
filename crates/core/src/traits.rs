//! Object store gateway trait
//!
//! Keeps the engine independent of any specific SDK; the s3 crate provides
//! the production implementation and tests use in-memory fakes.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::item::{ContainerInfo, RemoteItem};

/// Capability interface over the remote object store
///
/// Implementations must be safely shareable across concurrent workers; every
/// method is stateless per call. `head_object`, `get_object`,
/// `delete_object` and `delete_container` report an absent target as
/// `Error::NotFound` so callers can distinguish absence from transport
/// failure.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Enumerate all containers on the account
    async fn list_containers(&self) -> Result<Vec<ContainerInfo>>;

    /// Resolve a container, creating it with private access if absent
    async fn ensure_container(&self, name: &str) -> Result<()>;

    /// Flat listing of every object in the container, paginated internally
    async fn list_objects(&self, container: &str) -> Result<Vec<RemoteItem>>;

    /// Metadata probe for a single object
    async fn head_object(&self, container: &str, key: &str) -> Result<RemoteItem>;

    async fn get_object(&self, container: &str, key: &str) -> Result<Bytes>;

    async fn put_object(
        &self,
        container: &str,
        key: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Result<()>;

    async fn delete_object(&self, container: &str, key: &str) -> Result<()>;

    /// Remove the container and everything in it
    async fn delete_container(&self, name: &str) -> Result<()>;
}
