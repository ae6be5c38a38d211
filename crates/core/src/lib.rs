//! mall-core: Core library for the mall object storage client
//!
//! This crate provides the protocol-independent pieces of the client:
//! - Error taxonomy and the `Lookup` not-found outcome
//! - Object and bucket types
//! - Request/response bodies and the `Transport` seam
//! - The `ObjectStore` trait implemented by protocol adapters
//! - Retry with backoff, observers and configuration
//!
//! The S3 REST protocol itself lives in `mall-s3`.

pub mod body;
pub mod config;
pub mod error;
pub mod observe;
pub mod retry;
pub mod traits;
pub mod transport;
pub mod types;

pub use body::{Body, BodyReader, ByteStream};
pub use config::{Backoff, Config, DEFAULT_HOSTNAME, RetryConfig};
pub use error::{Error, Result, ServiceError};
pub use observe::{NoopObserver, RetryObserver, TracingObserver};
pub use retry::{Retry, RetryBuilder, is_retryable_error, retry_with_backoff};
pub use traits::ObjectStore;
pub use transport::Transport;
pub use types::{Bucket, Item, Lookup, ObjectContent};
