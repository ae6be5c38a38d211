//! Test helpers: a mocked transport and canned responses

use std::sync::Arc;

use async_trait::async_trait;
use http::{Request, Response, StatusCode};
use mall_core::{Body, Result, RetryBuilder, Transport};

use crate::client::Client;

mockall::mock! {
    pub HttpTransport {}

    #[async_trait]
    impl Transport for HttpTransport {
        async fn round_trip(&self, request: Request<Body>) -> Result<Response<Body>>;
    }
}

/// A client for `localhost` over `transport`, with millisecond backoff
pub(crate) fn client_with(transport: MockHttpTransport) -> Client {
    Client::with_transport("", Arc::new(transport))
        .unwrap()
        .with_retry(
            RetryBuilder::new()
                .max_attempts(5)
                .initial_backoff_ms(1)
                .max_backoff_ms(5)
                .build(),
        )
}

pub(crate) fn response(status: u16, body: &'static str) -> Result<Response<Body>> {
    response_with(status, &[], body)
}

pub(crate) fn response_with(
    status: u16,
    headers: &[(&'static str, &'static str)],
    body: &'static str,
) -> Result<Response<Body>> {
    let mut builder = Response::builder().status(StatusCode::from_u16(status).unwrap());
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    Ok(builder.body(Body::from(body)).unwrap())
}

/// A `ListBucketResult` page echoing `bucket`, `marker` and `max_keys`
pub(crate) fn list_page(
    bucket: &str,
    marker: &str,
    max_keys: usize,
    truncated: bool,
    keys: &[&str],
) -> String {
    let contents: String = keys
        .iter()
        .map(|key| {
            format!(
                "<Contents><Key>{key}</Key>\
                 <LastModified>2024-05-01T12:00:00.000Z</LastModified>\
                 <Size>{}</Size></Contents>",
                key.len()
            )
        })
        .collect();
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <ListBucketResult xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">\
         <Name>{bucket}</Name><Prefix></Prefix><Marker>{marker}</Marker>\
         <MaxKeys>{max_keys}</MaxKeys><IsTruncated>{truncated}</IsTruncated>\
         {contents}</ListBucketResult>"
    )
}

/// A 200 response carrying an owned body
pub(crate) fn ok_xml(body: String) -> Result<Response<Body>> {
    Ok(Response::builder()
        .status(StatusCode::OK)
        .body(Body::from(body))
        .unwrap())
}
