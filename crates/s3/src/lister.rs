//! Paginated bucket listing
//!
//! A listing is a sequence of `GET /bucket/?marker=..&max-keys=..` pages.
//! Each page is fetched under the retry policy, checked against the request
//! it answers, and only then are its items committed. A call either returns
//! a fully validated, strictly increasing sequence of items or an error.

use std::sync::Arc;

use http::{Method, StatusCode, Uri};
use mall_core::{
    Body, Error, Item, Result, Retry, RetryConfig, RetryObserver, TracingObserver,
    is_retryable_error,
};
use tokio_util::sync::CancellationToken;

use crate::client::Client;
use crate::error::decode_error;
use crate::xml::{self, ListBucketResult};

/// Hard per-page limit of the service
pub const MAX_OBJECT_LIST: usize = 1000;

const OP: &str = "ListBucket";

/// How much of a rejected page body is quoted in errors
const SNIPPET_LEN: usize = 512;

/// Lists the items of a bucket across pages
pub struct BucketLister<'a> {
    client: &'a Client,
    retry: RetryConfig,
    observer: Arc<dyn RetryObserver>,
    cancel: Option<CancellationToken>,
}

impl<'a> BucketLister<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            client,
            retry: client.retry_config().clone(),
            observer: Arc::new(TracingObserver),
            cancel: None,
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Report retries and committed pages to `observer` instead of `tracing`
    pub fn with_observer(mut self, observer: Arc<dyn RetryObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Abort round trips and backoff sleeps once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// List up to `max_keys` items of `bucket`, starting at `start_key`
    ///
    /// Stops early when the service reports no more pages. When exactly
    /// `max_keys` items come back there is no telling whether more exist.
    pub async fn list(&self, bucket: &str, start_key: &str, max_keys: i64) -> Result<Vec<Item>> {
        let max_keys = usize::try_from(max_keys)
            .map_err(|_| Error::InvalidArgument(format!("invalid negative max_keys {max_keys}")))?;

        let retry = Retry::new(&self.retry)
            .observer(self.observer.as_ref())
            .cancel_on(self.cancel.as_ref());

        let mut items: Vec<Item> = Vec::new();
        let mut marker = start_key.to_string();

        while items.len() < max_keys {
            let fetch = (max_keys - items.len()).min(MAX_OBJECT_LIST);
            let uri = self.client.urls().list_url(bucket, &marker, fetch)?;

            let page = retry
                .run(
                    OP,
                    || self.fetch_page(&uri, bucket, &marker, fetch),
                    is_retryable_error,
                )
                .await?;

            let before = items.len();
            for entry in page.contents {
                let item = Item::from(entry);

                // The previous page's last key comes back first.
                if items.last().is_some_and(|last| last.key == item.key) {
                    continue;
                }
                if item.key.as_str() < start_key {
                    return Err(Error::ProtocolViolation(format!(
                        "listing {bucket}: item key {:?} but wanted at least {start_key:?}",
                        item.key
                    )));
                }
                if let Some(last) = items.last()
                    && item.key < last.key
                {
                    return Err(Error::ProtocolViolation(format!(
                        "listing {bucket}: item key {:?} after {:?}",
                        item.key, last.key
                    )));
                }
                if items.len() == max_keys {
                    break;
                }

                marker.clone_from(&item.key);
                items.push(item);
            }

            let added = items.len() - before;
            self.observer
                .page_committed(bucket, &marker, added, page.is_truncated);

            if !page.is_truncated {
                break;
            }
            if added == 0 {
                return Err(Error::ProtocolViolation(format!(
                    "listing {bucket}: truncated page after {marker:?} returned no new keys"
                )));
            }
        }

        Ok(items)
    }

    /// One round trip for one page, validated against the request
    async fn fetch_page(
        &self,
        uri: &Uri,
        bucket: &str,
        marker: &str,
        max_keys: usize,
    ) -> Result<ListBucketResult> {
        let response = self
            .client
            .send(
                self.client.request(Method::GET, uri.clone()),
                Body::empty(),
            )
            .await?;

        // 4xx is permanent, 5xx transient; the error's status decides.
        if response.status() != StatusCode::OK {
            return Err(decode_error(OP, response).await);
        }

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| Error::Network(format!("reading listing of {bucket}: {e}")))?;

        let page: ListBucketResult = xml::decode(&body).map_err(|e| {
            Error::MalformedResponse(format!("{e}; from: {}", snippet(&body)))
        })?;

        if page.max_keys != max_keys || page.name != bucket || page.marker != marker {
            return Err(Error::MalformedResponse(format!(
                "unexpected page (bucket {:?}, marker {:?}, max-keys {}) for request \
                 (bucket {bucket:?}, marker {marker:?}, max-keys {max_keys}); from: {}",
                page.name,
                page.marker,
                page.max_keys,
                snippet(&body)
            )));
        }

        Ok(page)
    }
}

fn snippet(body: &[u8]) -> String {
    let end = body.len().min(SNIPPET_LEN);
    String::from_utf8_lossy(&body[..end]).into_owned()
}
