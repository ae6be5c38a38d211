//! Domain values returned by object storage operations

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::body::Body;

/// A top-level container for objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub name: String,

    /// ISO-8601 creation time as sent by the service, e.g. `2006-02-03T16:45:09.000Z`
    pub creation_date: String,
}

impl Bucket {
    /// Parsed creation time, if the service sent a valid timestamp
    pub fn created_at(&self) -> Option<Timestamp> {
        self.creation_date.parse().ok()
    }
}

/// An object entry produced by a bucket listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub key: String,

    /// ISO-8601 modification time as sent by the service
    pub last_modified: String,

    /// Size in bytes
    pub size: u64,
}

impl Item {
    pub fn new(key: impl Into<String>, last_modified: impl Into<String>, size: u64) -> Self {
        Self {
            key: key.into(),
            last_modified: last_modified.into(),
            size,
        }
    }

    /// Parsed modification time, if the service sent a valid timestamp
    pub fn modified_at(&self) -> Option<Timestamp> {
        self.last_modified.parse().ok()
    }
}

/// Outcome of an operation addressing a single object
///
/// `NotFound` is a valid steady-state answer (HTTP 404), kept apart from
/// every failure reported through [`crate::Error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Lookup::NotFound)
    }

    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::NotFound => Lookup::NotFound,
        }
    }
}

impl<T: Default> Lookup<T> {
    /// The found value, or `T::default()` (a size of 0 for `stat`)
    pub fn found_or_default(self) -> T {
        self.found().unwrap_or_default()
    }
}

/// A whole object body returned by `get`
///
/// The caller owns `body`; dropping it releases the connection.
#[derive(Debug)]
pub struct ObjectContent {
    pub body: Body,

    /// Value of `Content-Length`, when the service sent one
    pub size: Option<u64>,
}
