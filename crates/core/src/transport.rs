//! Request execution seam
//!
//! Everything that talks to the service goes through a [`Transport`]. The
//! default implementation lives in `mall-s3` and is backed by reqwest; tests
//! substitute a mock.

use async_trait::async_trait;
use http::{Request, Response};

use crate::body::Body;
use crate::error::Result;

/// Executes one HTTP round trip
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return the response, whatever its status.
    ///
    /// Implementations return [`crate::Error::Network`] only when no
    /// response was obtained. Status codes are interpreted by the caller.
    async fn round_trip(&self, request: Request<Body>) -> Result<Response<Body>>;
}
