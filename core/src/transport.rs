use crate::{Body, Result};
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// RoundTrip takes one request and produces one response.
///
/// It's the extension point middlewares are stacked on: a middleware
/// implements `RoundTrip` and forwards to the `RoundTrip` it wraps.
/// Implementations must be safe to call concurrently. Cancellation is
/// dropping the returned future.
#[async_trait]
pub trait RoundTrip: Debug + Send + Sync + 'static {
    /// Perform the exchange.
    ///
    /// Errors are transport-level failures only; any HTTP status, including
    /// 4xx and 5xx, is a successful round trip.
    async fn round_trip(&self, req: http::Request<Body>) -> Result<http::Response<Body>>;
}

#[async_trait]
impl<T: RoundTrip + ?Sized> RoundTrip for Arc<T> {
    async fn round_trip(&self, req: http::Request<Body>) -> Result<http::Response<Body>> {
        self.as_ref().round_trip(req).await
    }
}

#[async_trait]
impl<T: RoundTrip + ?Sized> RoundTrip for Box<T> {
    async fn round_trip(&self, req: http::Request<Body>) -> Result<http::Response<Body>> {
        self.as_ref().round_trip(req).await
    }
}
