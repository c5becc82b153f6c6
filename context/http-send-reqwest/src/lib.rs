//! reqwest based transports for `sigv4_core`.
//!
//! [`ReqwestHttpSend`] implements both seams the signing stack needs:
//!
//! - [`HttpSend`] for credential providers, for example STS `AssumeRole`.
//! - [`RoundTrip`] as the innermost transport that signed requests are
//!   forwarded to.
//!
//! ```no_run
//! use sigv4_core::{Body, RoundTrip};
//! use sigv4_http_send_reqwest::ReqwestHttpSend;
//!
//! # async fn example() -> sigv4_core::Result<()> {
//! let transport = ReqwestHttpSend::default();
//! let req = http::Request::get("http://127.0.0.1:9090/api/v1/query")
//!     .body(Body::empty())?;
//! let resp = transport.round_trip(req).await?;
//! println!("status: {}", resp.status());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use log::debug;
use reqwest::{Client, Request};
use sigv4_core::{Body, Error, HttpSend, Result, RoundTrip};

/// Transport backed by a [`reqwest::Client`].
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let req = Request::try_from(req)
            .map_err(|e| Error::request_invalid("failed to build http request").with_source(e))?;
        let resp = self
            .client
            .execute(req)
            .await
            .map_err(|e| Error::transport_failed("failed to send http request").with_source(e))?;

        collect_response(resp).await
    }
}

#[async_trait]
impl RoundTrip for ReqwestHttpSend {
    async fn round_trip(&self, req: http::Request<Body>) -> Result<http::Response<Body>> {
        let (parts, body) = req.into_parts();
        debug!("sending {} {}", parts.method, parts.uri);

        let mut builder = self
            .client
            .request(parts.method, parts.uri.to_string())
            .version(parts.version)
            .headers(parts.headers);
        // An absent body stays absent on the wire.
        if !body.is_empty() {
            builder = builder.body(body.collect().await?);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| Error::transport_failed("failed to send http request").with_source(e))?;
        let (parts, bs) = collect_response(resp).await?.into_parts();
        Ok(http::Response::from_parts(parts, Body::from(bs)))
    }
}

async fn collect_response(resp: reqwest::Response) -> Result<http::Response<Bytes>> {
    let resp: http::Response<reqwest::Body> = resp.into();
    let (parts, body) = resp.into_parts();
    let bs = BodyExt::collect(body)
        .await
        .map(|buf| buf.to_bytes())
        .map_err(|e| Error::transport_failed("failed to read response body").with_source(e))?;
    Ok(http::Response::from_parts(parts, bs))
}
