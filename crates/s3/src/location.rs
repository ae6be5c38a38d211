//! Bucket location resolution

use http::{Method, StatusCode};
use mall_core::{Body, Error, Result};

use crate::client::Client;
use crate::error::decode_error;
use crate::url::UrlBuilder;
use crate::xml::{self, LocationConstraint};

/// Endpoint serving buckets without a location constraint
pub const DEFAULT_LOCATION_ENDPOINT: &str = "localhost";

impl Client {
    /// Ask `hostname` where `bucket` lives and derive the endpoint serving it
    pub(crate) async fn resolve_location(&self, bucket: &str, hostname: &str) -> Result<String> {
        let urls = UrlBuilder::new(hostname, self.urls().is_secure())?;
        let response = self
            .send(
                self.request(Method::GET, urls.location_url(bucket)?),
                Body::empty(),
            )
            .await?;

        if response.status() != StatusCode::OK {
            return Err(decode_error("GetBucketLocation", response).await);
        }

        let body = response.into_body().collect().await?;
        let doc: LocationConstraint = xml::decode(&body)?;

        tracing::debug!(bucket, location = %doc.location, "Resolved bucket location");
        Ok(endpoint_for(doc.location.trim(), urls.hostname()))
    }
}

fn endpoint_for(location: &str, hostname: &str) -> String {
    if location.is_empty() {
        DEFAULT_LOCATION_ENDPOINT.to_string()
    } else {
        format!("minio-{location}.{hostname}")
    }
}
