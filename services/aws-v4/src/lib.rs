//! AWS SigV4 request signing as an HTTP transport middleware.
//!
//! [`SigV4RoundTripper`] wraps any [`sigv4_core::RoundTrip`] and signs
//! every request that passes through it. Request bodies are buffered in a
//! [`BufferPool`] so they can be hashed and resent, the request path is
//! normalized before signing, and a request rejected because its session
//! token expired is retried once with a refreshed credential.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sigv4_aws_v4::{SigV4RoundTripper, SigningConfig};
//! use sigv4_core::{Body, Context, OsEnv, RoundTrip};
//! use sigv4_file_read_tokio::TokioFileRead;
//! use sigv4_http_send_reqwest::ReqwestHttpSend;
//!
//! # async fn example() -> sigv4_core::Result<()> {
//! let ctx = Context::new()
//!     .with_file_read(TokioFileRead)
//!     .with_http_send(ReqwestHttpSend::default())
//!     .with_env(OsEnv);
//!
//! let cfg = SigningConfig::from_file(&ctx, "sigv4.toml").await?;
//! let rt = SigV4RoundTripper::from_config(ctx, &cfg, Arc::new(ReqwestHttpSend::default())).await?;
//!
//! let req = http::Request::post(
//!     "https://aps-workspaces.us-east-1.amazonaws.com/workspaces/ws-1/api/v1/remote_write",
//! )
//! .body(Body::from("payload"))?;
//! let resp = rt.round_trip(req).await?;
//! println!("{}", resp.status());
//! # Ok(())
//! # }
//! ```

mod buffer;
pub use buffer::{BufferPool, BufferedBody};

mod config;
pub use config::{Secret, SigningConfig};

mod constants;

mod credential;
pub use credential::Credential;

mod path;
pub use path::canonicalize_path;

mod provide_credential;
pub use provide_credential::{
    AssumeRoleCredentialProvider, DefaultCredentialProvider, EnvCredentialProvider,
    ProfileCredentialProvider, StaticCredentialProvider,
};

mod round_tripper;
pub use round_tripper::{SigV4RoundTripper, MAX_ATTEMPTS};

mod sign_request;
pub use sign_request::RequestSigner;
