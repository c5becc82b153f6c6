//! Core components for signing HTTP requests in flight.
//!
//! This crate provides the foundational types and traits shared by the
//! sigv4 workspace.
//!
//! ## Overview
//!
//! - **Context**: a container holding implementations for file reading, HTTP
//!   sending and environment access, so ambient state is always injected.
//! - **Traits**: [`ProvideCredential`] loads credentials, [`SignRequest`]
//!   attaches a signature, [`RoundTrip`] performs one HTTP exchange.
//! - **Signer**: caches the credential of a provider, refreshes it on demand
//!   and signs requests with it.
//! - **Body**: request/response bodies that distinguish "absent" from
//!   "zero-length" and support one-shot readers.
//!
//! ## Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use sigv4_core::{Context, ProvideCredential, Result, SignRequest, Signer, SigningCredential};
//!
//! #[derive(Clone, Debug)]
//! struct Token(String);
//!
//! impl SigningCredential for Token {
//!     fn is_valid(&self) -> bool {
//!         !self.0.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct Loader;
//!
//! #[async_trait]
//! impl ProvideCredential for Loader {
//!     type Credential = Token;
//!
//!     async fn provide_credential(&self, _: &Context) -> Result<Option<Token>> {
//!         Ok(Some(Token("secret".to_string())))
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct Bearer;
//!
//! #[async_trait]
//! impl SignRequest for Bearer {
//!     type Credential = Token;
//!
//!     async fn sign_request(
//!         &self,
//!         _: &Context,
//!         req: &mut http::request::Parts,
//!         _payload: &[u8],
//!         cred: Option<&Token>,
//!     ) -> Result<()> {
//!         if let Some(cred) = cred {
//!             req.headers.insert(
//!                 http::header::AUTHORIZATION,
//!                 format!("Bearer {}", cred.0).parse()?,
//!             );
//!         }
//!         Ok(())
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let signer = Signer::new(Context::new(), Loader, Bearer);
//! let mut parts = http::Request::new(()).into_parts().0;
//! signer.sign(&mut parts, b"").await?;
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};
mod context;
pub use context::{
    Context, Env, FileRead, HttpSend, NoopEnv, NoopFileRead, NoopHttpSend, OsEnv, StaticEnv,
};
mod api;
pub use api::{ProvideCredential, SignRequest, SigningCredential};
mod chain;
pub use chain::ProvideCredentialChain;
mod signer;
pub use signer::Signer;
mod body;
pub use body::Body;
mod transport;
pub use transport::RoundTrip;
