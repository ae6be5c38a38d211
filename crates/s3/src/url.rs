//! Request URL construction
//!
//! Buckets and keys are addressed path-style: `scheme://host/bucket/key`.

use http::Uri;
use mall_core::{DEFAULT_HOSTNAME, Error, Result};
use url::Url;

/// Builds bucket- and key-scoped URLs for one host
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    scheme: &'static str,
    hostname: String,
}

impl UrlBuilder {
    /// Validate `hostname` (`host[:port]`); empty means `localhost`
    pub fn new(hostname: &str, secure: bool) -> Result<Self> {
        let scheme = if secure { "https" } else { "http" };
        let hostname = if hostname.is_empty() {
            DEFAULT_HOSTNAME
        } else {
            hostname
        };

        let parsed = Url::parse(&format!("{scheme}://{hostname}/"))
            .map_err(|e| Error::InvalidRequest(format!("invalid hostname {hostname:?}: {e}")))?;
        if parsed.host_str().is_none()
            || parsed.path() != "/"
            || parsed.query().is_some()
            || parsed.fragment().is_some()
            || !parsed.username().is_empty()
            || parsed.password().is_some()
        {
            return Err(Error::InvalidRequest(format!(
                "invalid hostname {hostname:?}: expected host[:port]"
            )));
        }

        Ok(Self {
            scheme,
            hostname: hostname.to_string(),
        })
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn is_secure(&self) -> bool {
        self.scheme == "https"
    }

    /// `scheme://host/`
    pub fn service_url(&self) -> Result<Uri> {
        parse(format!("{}://{}/", self.scheme, self.hostname))
    }

    /// `scheme://host/bucket/`
    pub fn bucket_url(&self, bucket: &str) -> Result<Uri> {
        parse(self.bucket_prefix(bucket))
    }

    /// `scheme://host/bucket/key`
    pub fn key_url(&self, bucket: &str, key: &str) -> Result<Uri> {
        parse(format!("{}{}", self.bucket_prefix(bucket), encode_key(key)))
    }

    /// One page of a bucket listing starting after `marker`
    pub fn list_url(&self, bucket: &str, marker: &str, max_keys: usize) -> Result<Uri> {
        parse(format!(
            "{}?marker={}&max-keys={}",
            self.bucket_prefix(bucket),
            urlencoding::encode(marker),
            max_keys
        ))
    }

    /// The location subresource of a bucket
    pub fn location_url(&self, bucket: &str) -> Result<Uri> {
        parse(format!("{}?location", self.bucket_prefix(bucket)))
    }

    fn bucket_prefix(&self, bucket: &str) -> String {
        format!(
            "{}://{}/{}/",
            self.scheme,
            self.hostname,
            urlencoding::encode(bucket)
        )
    }
}

/// Percent-encode each segment of a key, keeping `/` separators
fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn parse(url: String) -> Result<Uri> {
    url.parse::<Uri>()
        .map_err(|e| Error::InvalidRequest(format!("invalid URL {url:?}: {e}")))
}
