//! Object store operations
//!
//! This is the surface the excluded layers (CLI, upload orchestration) build
//! on. `mall-s3` provides the S3 REST implementation.

use async_trait::async_trait;

use crate::body::Body;
use crate::error::Result;
use crate::types::{Bucket, Item, Lookup, ObjectContent};

/// Operations against an S3-compatible object store
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List all buckets owned by the caller
    async fn list_buckets(&self) -> Result<Vec<Bucket>>;

    /// Size of an object in bytes
    async fn stat(&self, bucket: &str, key: &str) -> Result<Lookup<u64>>;

    /// Fetch a whole object
    async fn get(&self, bucket: &str, key: &str) -> Result<Lookup<ObjectContent>>;

    /// Fetch `length` bytes starting at `offset`
    ///
    /// A negative `length` reads to the end of the object. A negative
    /// `offset` is rejected before any request is made.
    async fn get_partial(
        &self,
        bucket: &str,
        key: &str,
        offset: i64,
        length: i64,
    ) -> Result<Lookup<Body>>;

    /// Create a bucket
    async fn put_bucket(&self, bucket: &str) -> Result<()>;

    /// Store an object of known size
    ///
    /// `content_md5` is the raw MD5 digest of the body; when given, the
    /// service verifies the upload against it.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        content_md5: Option<&[u8]>,
        size: u64,
        body: Body,
    ) -> Result<()>;

    /// List up to `max_keys` items at or after `start_key`
    ///
    /// Keys before `start_key` are skipped. When exactly `max_keys` items are
    /// returned there is no indication whether more exist.
    async fn get_bucket(&self, bucket: &str, start_key: &str, max_keys: i64) -> Result<Vec<Item>>;

    /// Hostname serving `bucket`, queried through `hostname`
    async fn bucket_location(&self, bucket: &str, hostname: &str) -> Result<String>;
}
