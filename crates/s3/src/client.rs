//! S3 client implementation
//!
//! Speaks the S3 REST protocol through a [`Transport`] and implements the
//! [`ObjectStore`] trait from mall-core.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use http::header::{CONTENT_LENGTH, RANGE, USER_AGENT};
use http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode, Uri};
use mall_core::config::default_user_agent;
use mall_core::{
    Body, Bucket, Config, Error, Item, Lookup, ObjectContent, ObjectStore, Result, RetryConfig,
    Transport,
};

use crate::error::decode_error;
use crate::lister::BucketLister;
use crate::transport::ReqwestTransport;
use crate::url::UrlBuilder;
use crate::xml::{self, ListAllMyBucketsResult};

const CONTENT_MD5: &str = "content-md5";

/// S3 REST client for one host
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct Client {
    urls: UrlBuilder,
    transport: Arc<dyn Transport>,
    user_agent: HeaderValue,
    retry: RetryConfig,
}

impl Client {
    /// Create a client for `hostname` using the default reqwest transport
    pub fn new(hostname: &str) -> Result<Self> {
        Self::from_config(&Config {
            hostname: hostname.to_string(),
            ..Default::default()
        })
    }

    /// Create a client from a loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(config)?);
        Self::build(UrlBuilder::new(&config.hostname, config.secure)?, transport)?
            .with_retry(config.retry.clone())
            .with_user_agent(&config.effective_user_agent())
    }

    /// Create a client for `hostname` that sends requests through `transport`
    pub fn with_transport(hostname: &str, transport: Arc<dyn Transport>) -> Result<Self> {
        Self::build(UrlBuilder::new(hostname, false)?, transport)
    }

    fn build(urls: UrlBuilder, transport: Arc<dyn Transport>) -> Result<Self> {
        let user_agent = HeaderValue::from_str(&default_user_agent())
            .map_err(|e| Error::InvalidRequest(format!("invalid user agent: {e}")))?;
        Ok(Self {
            urls,
            transport,
            user_agent,
            retry: RetryConfig::default(),
        })
    }

    /// Replace the retry policy used by bucket listings
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Result<Self> {
        self.user_agent = HeaderValue::from_str(user_agent)
            .map_err(|e| Error::InvalidRequest(format!("invalid user agent {user_agent:?}: {e}")))?;
        Ok(self)
    }

    pub fn hostname(&self) -> &str {
        self.urls.hostname()
    }

    pub fn urls(&self) -> &UrlBuilder {
        &self.urls
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// A bucket lister using this client's retry policy
    ///
    /// Use it directly to inject an observer or a cancellation token.
    pub fn lister(&self) -> BucketLister<'_> {
        BucketLister::new(self)
    }

    pub(crate) fn request(&self, method: Method, uri: Uri) -> http::request::Builder {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(USER_AGENT, self.user_agent.clone())
    }

    pub(crate) async fn send(
        &self,
        builder: http::request::Builder,
        body: Body,
    ) -> Result<Response<Body>> {
        let request = builder
            .body(body)
            .map_err(|e| Error::InvalidRequest(e.to_string()))?;
        self.transport.round_trip(request).await
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("urls", &self.urls)
            .field("user_agent", &self.user_agent)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

/// Parse a `Content-Length` header
fn content_length(headers: &HeaderMap) -> Result<Option<u64>> {
    let Some(value) = headers.get(CONTENT_LENGTH) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Some)
        .ok_or_else(|| Error::MalformedResponse(format!("invalid Content-Length: {value:?}")))
}

/// `Range` header value for `length` bytes at `offset`; negative `length` reads to the end
fn range_header(offset: i64, length: i64) -> Result<String> {
    if offset < 0 {
        return Err(Error::InvalidArgument(format!(
            "invalid negative offset {offset}"
        )));
    }
    if length < 0 {
        return Ok(format!("bytes={offset}-"));
    }
    let last = offset
        .checked_add(length)
        .and_then(|end| end.checked_sub(1))
        .ok_or_else(|| {
            Error::InvalidArgument(format!("range {offset}+{length} overflows"))
        })?;
    Ok(format!("bytes={offset}-{last}"))
}

#[async_trait]
impl ObjectStore for Client {
    async fn list_buckets(&self) -> Result<Vec<Bucket>> {
        let uri = self.urls.service_url()?;
        let response = self
            .send(self.request(Method::GET, uri), Body::empty())
            .await?;
        if response.status() != StatusCode::OK {
            return Err(decode_error("ListAllMyBuckets", response).await);
        }

        let body = response.into_body().collect().await?;
        Ok(xml::decode::<ListAllMyBucketsResult>(&body)?.into_buckets())
    }

    async fn stat(&self, bucket: &str, key: &str) -> Result<Lookup<u64>> {
        let uri = self.urls.key_url(bucket, key)?;
        let response = self
            .send(self.request(Method::HEAD, uri), Body::empty())
            .await?;

        match response.status() {
            StatusCode::OK => match content_length(response.headers())? {
                Some(size) => Ok(Lookup::Found(size)),
                None => Err(Error::MalformedResponse(format!(
                    "missing Content-Length statting {bucket}/{key}"
                ))),
            },
            StatusCode::NOT_FOUND => Ok(Lookup::NotFound),
            _ => Err(decode_error("StatObject", response).await),
        }
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Lookup<ObjectContent>> {
        let uri = self.urls.key_url(bucket, key)?;
        let response = self
            .send(self.request(Method::GET, uri), Body::empty())
            .await?;

        match response.status() {
            StatusCode::OK => {
                let size = content_length(response.headers())?;
                Ok(Lookup::Found(ObjectContent {
                    body: response.into_body(),
                    size,
                }))
            }
            StatusCode::NOT_FOUND => Ok(Lookup::NotFound),
            _ => Err(decode_error("GetObject", response).await),
        }
    }

    async fn get_partial(
        &self,
        bucket: &str,
        key: &str,
        offset: i64,
        length: i64,
    ) -> Result<Lookup<Body>> {
        let range = range_header(offset, length)?;
        let uri = self.urls.key_url(bucket, key)?;
        let response = self
            .send(
                self.request(Method::GET, uri).header(RANGE, range),
                Body::empty(),
            )
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::PARTIAL_CONTENT => Ok(Lookup::Found(response.into_body())),
            StatusCode::NOT_FOUND => Ok(Lookup::NotFound),
            _ => Err(decode_error("GetObject", response).await),
        }
    }

    async fn put_bucket(&self, bucket: &str) -> Result<()> {
        let uri = self.urls.bucket_url(bucket)?;
        let response = self
            .send(self.request(Method::PUT, uri), Body::empty())
            .await?;
        if response.status() != StatusCode::OK {
            return Err(decode_error("PutBucket", response).await);
        }
        Ok(())
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        content_md5: Option<&[u8]>,
        size: u64,
        body: Body,
    ) -> Result<()> {
        let uri = self.urls.key_url(bucket, key)?;
        let mut builder = self
            .request(Method::PUT, uri)
            .header(CONTENT_LENGTH, size);
        if let Some(digest) = content_md5 {
            builder = builder.header(CONTENT_MD5, BASE64.encode(digest));
        }

        let response = self.send(builder, body).await?;
        if response.status() != StatusCode::OK {
            return Err(decode_error("PutObject", response).await);
        }
        Ok(())
    }

    async fn get_bucket(&self, bucket: &str, start_key: &str, max_keys: i64) -> Result<Vec<Item>> {
        self.lister().list(bucket, start_key, max_keys).await
    }

    async fn bucket_location(&self, bucket: &str, hostname: &str) -> Result<String> {
        self.resolve_location(bucket, hostname).await
    }
}
