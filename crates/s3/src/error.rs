//! Decoding of failed responses into [`ServiceError`]

use bytes::Bytes;
use http::{HeaderMap, Response, StatusCode};
use mall_core::{Body, Error, ServiceError};

use crate::xml::{self, ErrorDocument};

/// Upper bound on how much of an error body is kept
pub const ERROR_BODY_LIMIT: usize = 1 << 20;

/// Provider code asking the client to retarget the request
pub const TEMPORARY_REDIRECT: &str = "TemporaryRedirect";

/// Provider code for a request signature the service did not accept
pub const SIGNATURE_DOES_NOT_MATCH: &str = "SignatureDoesNotMatch";

/// Consume a failed response and turn it into an [`Error::Service`]
///
/// Reading the body is best effort: an unreadable body is treated as empty.
pub(crate) async fn decode_error(op: &'static str, response: Response<Body>) -> Error {
    let (parts, body) = response.into_parts();
    let body = body
        .collect_limited(ERROR_BODY_LIMIT)
        .await
        .unwrap_or_default();
    decode_error_body(op, parts.status, parts.headers, body).into()
}

/// Build a [`ServiceError`] from a response body, decoding it if it is an XML error document
///
/// Never fails: an undecodable body leaves the provider fields empty.
pub fn decode_error_body(
    op: &'static str,
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
) -> ServiceError {
    let doc = xml::decode::<ErrorDocument>(&body).unwrap_or_default();
    let mut err = ServiceError::new(op, status, headers, body);

    if doc.code == SIGNATURE_DOES_NOT_MATCH {
        log_string_to_sign(&doc.string_to_sign_bytes);
    }
    if doc.code == TEMPORARY_REDIRECT && !doc.endpoint.is_empty() {
        err.use_endpoint = Some(doc.endpoint);
    }
    err.code = non_empty(doc.code);
    err.message = non_empty(doc.message);
    err.request_id = non_empty(doc.request_id);
    err.bucket = non_empty(doc.bucket);
    err
}

/// Log what the service expected to be signed; diagnostics only
fn log_string_to_sign(hex_bytes: &str) {
    let compact: String = hex_bytes.chars().filter(|c| !c.is_whitespace()).collect();
    let want = hex::decode(&compact).unwrap_or_default();
    let readable = String::from_utf8_lossy(&want);
    tracing::warn!(
        len = want.len(),
        string_to_sign = %readable.escape_debug(),
        hex = %hex::encode(&want),
        "Signature does not match; the service expected a different string to sign"
    );
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(status: u16, body: &'static str) -> ServiceError {
        decode_error_body(
            "ListBucket",
            StatusCode::from_u16(status).unwrap(),
            HeaderMap::new(),
            Bytes::from_static(body.as_bytes()),
        )
    }

    #[test]
    fn test_temporary_redirect_sets_endpoint() {
        let err = decode(
            307,
            "<Error><Code>TemporaryRedirect</Code><Message>Moved</Message>\
             <Bucket>photos</Bucket><Endpoint>photos.eu.example.com</Endpoint></Error>",
        );
        assert_eq!(err.code.as_deref(), Some("TemporaryRedirect"));
        assert_eq!(err.use_endpoint.as_deref(), Some("photos.eu.example.com"));
        assert_eq!(err.message.as_deref(), Some("Moved"));
        assert_eq!(err.bucket.as_deref(), Some("photos"));
    }

    #[test]
    fn test_other_codes_do_not_redirect() {
        let err = decode(
            301,
            "<Error><Code>PermanentRedirect</Code><Endpoint>elsewhere</Endpoint>\
             <RequestId>ABC123</RequestId></Error>",
        );
        assert_eq!(err.code.as_deref(), Some("PermanentRedirect"));
        assert_eq!(err.request_id.as_deref(), Some("ABC123"));
        assert!(err.bucket.is_none());
        assert!(err.use_endpoint.is_none());
    }

    #[test]
    fn test_signature_mismatch_is_only_diagnostic() {
        let err = decode(
            403,
            "<Error><Code>SignatureDoesNotMatch</Code>\
             <StringToSignBytes>47 45 54 0a</StringToSignBytes></Error>",
        );
        assert_eq!(err.code.as_deref(), Some("SignatureDoesNotMatch"));
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert!(err.use_endpoint.is_none());
    }

    #[test]
    fn test_malformed_body_keeps_raw_body() {
        let err = decode(500, "<html>Internal Server Error");
        assert!(err.code.is_none());
        assert!(err.message.is_none());
        assert_eq!(&err.body[..], b"<html>Internal Server Error");
        insta::assert_snapshot!(err.to_string(), @"ListBucket: status 500");
    }

    #[test]
    fn test_display_with_error_document() {
        let err = decode(404, "<Error><Code>NoSuchBucket</Code></Error>");
        insta::assert_snapshot!(
            err.to_string(),
            @"ListBucket: status 404: <Error><Code>NoSuchBucket</Code></Error>"
        );
    }

    #[tokio::test]
    async fn test_decode_error_bounds_body() {
        let big = "x".repeat(ERROR_BODY_LIMIT + 100);
        let response = Response::builder()
            .status(StatusCode::BAD_REQUEST)
            .body(Body::from(big))
            .unwrap();

        let err = decode_error("PutObject", response).await;
        let service = err.service().expect("service error");
        assert_eq!(service.body.len(), ERROR_BODY_LIMIT);
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert!(!err.is_transient());
    }
}
