//! XML documents of the S3 REST protocol (2006-03-01 schema)
//!
//! Each document type names its root element and maps every wire element it
//! reads with an explicit `rename`. Elements not listed are ignored.

use mall_core::{Bucket, Error, Item, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// A decodable document with a fixed root element
pub(crate) trait Document: DeserializeOwned {
    const ROOT: &'static str;
}

/// Decode `body` as document `T`, checking its root element first
pub(crate) fn decode<T: Document>(body: &[u8]) -> Result<T> {
    match root_element(body) {
        Some(root) if root == T::ROOT => {}
        Some(root) => {
            return Err(Error::MalformedResponse(format!(
                "expected <{}> document, got <{root}>",
                T::ROOT
            )));
        }
        None => {
            return Err(Error::MalformedResponse(format!(
                "expected <{}> document, got no XML element",
                T::ROOT
            )));
        }
    }

    quick_xml::de::from_reader(body)
        .map_err(|e| Error::MalformedResponse(format!("invalid <{}> document: {e}", T::ROOT)))
}

/// Local name of the first element in `body`
fn root_element(body: &[u8]) -> Option<String> {
    let mut reader = Reader::from_reader(body);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}

/// `GET /` response
#[derive(Debug, Deserialize)]
pub(crate) struct ListAllMyBucketsResult {
    #[serde(rename = "Buckets", default)]
    pub buckets: BucketList,
}

impl Document for ListAllMyBucketsResult {
    const ROOT: &'static str = "ListAllMyBucketsResult";
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct BucketList {
    #[serde(rename = "Bucket", default)]
    pub bucket: Vec<BucketEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BucketEntry {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "CreationDate", default)]
    pub creation_date: String,
}

impl ListAllMyBucketsResult {
    pub fn into_buckets(self) -> Vec<Bucket> {
        self.buckets
            .bucket
            .into_iter()
            .map(|b| Bucket {
                name: b.name,
                creation_date: b.creation_date,
            })
            .collect()
    }
}

/// One page of `GET /bucket/?marker=..&max-keys=..`
#[derive(Debug, Deserialize)]
pub(crate) struct ListBucketResult {
    /// Echoed bucket name
    #[serde(rename = "Name", default)]
    pub name: String,
    /// Echoed marker
    #[serde(rename = "Marker", default)]
    pub marker: String,
    /// Echoed page size
    #[serde(rename = "MaxKeys", default)]
    pub max_keys: usize,
    #[serde(rename = "IsTruncated", default)]
    pub is_truncated: bool,
    #[serde(rename = "Contents", default)]
    pub contents: Vec<ContentsEntry>,
}

impl Document for ListBucketResult {
    const ROOT: &'static str = "ListBucketResult";
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentsEntry {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "LastModified", default)]
    pub last_modified: String,
    #[serde(rename = "Size", default)]
    pub size: u64,
}

impl From<ContentsEntry> for Item {
    fn from(entry: ContentsEntry) -> Self {
        Item::new(entry.key, entry.last_modified, entry.size)
    }
}

/// Error response body
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorDocument {
    #[serde(rename = "Code", default)]
    pub code: String,
    #[serde(rename = "Message", default)]
    pub message: String,
    #[serde(rename = "RequestId", default)]
    pub request_id: String,
    #[serde(rename = "Bucket", default)]
    pub bucket: String,
    #[serde(rename = "Endpoint", default)]
    pub endpoint: String,
    /// Hex bytes of the string the service signed, separated by spaces
    #[serde(rename = "StringToSignBytes", default)]
    pub string_to_sign_bytes: String,
}

impl Document for ErrorDocument {
    const ROOT: &'static str = "Error";
}

/// `GET /bucket/?location` response
#[derive(Debug, Deserialize)]
pub(crate) struct LocationConstraint {
    #[serde(rename = "$text", default)]
    pub location: String,
}

impl Document for LocationConstraint {
    const ROOT: &'static str = "LocationConstraint";
}
