//! mall-s3: S3 REST protocol client
//!
//! Implements [`mall_core::ObjectStore`] over HTTP:
//! - URL construction for service, bucket, object, listing and location requests
//! - Object stat, whole and ranged reads, uploads and bucket creation
//! - Paginated bucket listing with retry and per-page validation
//! - Decoding of XML error documents into structured service errors
//!
//! Requests go through a [`mall_core::Transport`]; [`ReqwestTransport`] is the default.

pub mod client;
pub mod error;
pub mod lister;
pub mod location;
pub mod transport;
pub mod url;
mod xml;

#[cfg(test)]
mod testing;

pub use crate::url::UrlBuilder;
pub use client::Client;
pub use error::{ERROR_BODY_LIMIT, SIGNATURE_DOES_NOT_MATCH, TEMPORARY_REDIRECT, decode_error_body};
pub use lister::{BucketLister, MAX_OBJECT_LIST};
pub use location::DEFAULT_LOCATION_ENDPOINT;
pub use transport::ReqwestTransport;

pub use mall_core::{
    Body, Bucket, Config, Error, Item, Lookup, ObjectContent, ObjectStore, Result, RetryConfig,
    RetryObserver, ServiceError, Transport,
};
pub use tokio_util::sync::CancellationToken;
