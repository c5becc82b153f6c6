use crate::buffer::{BufferPool, BufferedBody};
use crate::constants::{
    EXPIRED_TOKEN_ERROR_TYPES, UNSIGNED_TRACING_HEADERS, UNSIGNED_TRACING_HEADER_PREFIX,
    X_AMZN_ERRORTYPE,
};
use crate::path::canonicalize_uri;
use crate::provide_credential::{
    AssumeRoleCredentialProvider, DefaultCredentialProvider, StaticCredentialProvider,
};
use crate::{Credential, RequestSigner, SigningConfig};
use async_trait::async_trait;
use http::header::{Entry, HeaderMap, HeaderName, HeaderValue};
use http::request::Parts;
use log::debug;
use sigv4_core::{Body, Context, ProvideCredential, Result, RoundTrip, Signer};
use std::fmt::{self, Debug};
use std::sync::Arc;

/// Total number of times one request may be sent: the first attempt plus
/// one retry after an expired session token.
pub const MAX_ATTEMPTS: usize = 2;

/// A [`RoundTrip`] that signs every request with AWS SigV4 before handing it
/// to the next transport.
///
/// For each request it:
///
/// 1. buffers the body so it can be hashed and resent,
/// 2. collapses repeated `/` in the path,
/// 3. signs with the cached credential, leaving tracing headers unsigned,
/// 4. forwards the request and, if the service answers `403` with an
///    expired token error type, drops the cached credential (unless a newer
///    one was loaded meanwhile) and sends the request once more.
///
/// It's safe to share between tasks; wrap it in an [`Arc`] and clone that.
#[derive(Clone)]
pub struct SigV4RoundTripper {
    region: String,
    service: String,
    signer: Signer<Credential>,
    next: Arc<dyn RoundTrip>,
    pool: BufferPool,
}

impl Debug for SigV4RoundTripper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigV4RoundTripper")
            .field("region", &self.region)
            .field("service", &self.service)
            .field("next", &self.next)
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

impl SigV4RoundTripper {
    /// Create a round tripper that signs with credentials from `provider`.
    pub fn new(
        ctx: Context,
        provider: impl ProvideCredential<Credential = Credential>,
        request_signer: RequestSigner,
        next: Arc<dyn RoundTrip>,
    ) -> Self {
        Self {
            region: request_signer.region().to_string(),
            service: request_signer.service().to_string(),
            signer: Signer::new(ctx, provider, request_signer),
            next,
            pool: BufferPool::new(),
        }
    }

    /// Share `pool` with other round trippers.
    pub fn with_pool(mut self, pool: BufferPool) -> Self {
        self.pool = pool;
        self
    }

    /// Build a round tripper from a signing config.
    ///
    /// The config is validated, the region resolved and a credential fetched
    /// once, so a broken setup fails here instead of on the first request.
    ///
    /// Credentials come from, in order of preference:
    ///
    /// - `access_key` and `secret_key` in the config,
    /// - the environment and the shared AWS files, honouring `profile`.
    ///
    /// When `role_arn` is set that credential is only used to call STS
    /// `AssumeRole`, and requests are signed with the assumed role.
    pub async fn from_config(
        ctx: Context,
        cfg: &SigningConfig,
        next: Arc<dyn RoundTrip>,
    ) -> Result<Self> {
        cfg.validate()?;
        let region = cfg.resolve_region(&ctx).await?;

        let mut provider: Box<dyn ProvideCredential<Credential = Credential>> =
            match (cfg.access_key(), cfg.secret_key()) {
                (Some(ak), Some(sk)) => Box::new(StaticCredentialProvider::new(ak, sk)),
                _ => match cfg.profile() {
                    Some(profile) => Box::new(DefaultCredentialProvider::with_profile(profile)),
                    None => Box::new(DefaultCredentialProvider::new()),
                },
            };

        if let Some(role_arn) = cfg.role_arn() {
            let sts_signer = Signer::new(ctx.clone(), provider, RequestSigner::new("sts", &region));
            let mut assume_role =
                AssumeRoleCredentialProvider::new(role_arn, sts_signer).with_region(&region);
            if let Some(external_id) = cfg.external_id() {
                assume_role = assume_role.with_external_id(external_id);
            }
            provider = Box::new(assume_role);
        }

        let rt = Self::new(
            ctx,
            provider,
            RequestSigner::new(cfg.service_name(), &region),
            next,
        );
        rt.signer.credential().await.map_err(|e| {
            e.with_context(format!("region: {region}"))
                .with_context(format!("service: {}", rt.service))
        })?;
        debug!("sigv4 round tripper ready for {region}/{}", rt.service);

        Ok(rt)
    }

    /// Region requests are signed for.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Service requests are signed for.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Pool the request bodies are buffered in.
    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    /// Build one signed attempt of the request, along with the credential
    /// it was signed with.
    async fn signed_request(
        &self,
        parts: &Parts,
        body: &BufferedBody,
    ) -> Result<(http::Request<Body>, Credential)> {
        let mut req = http::Request::new(body.replay());
        *req.method_mut() = parts.method.clone();
        *req.uri_mut() = parts.uri.clone();
        *req.version_mut() = parts.version;
        *req.headers_mut() = parts.headers.clone();
        *req.extensions_mut() = parts.extensions.clone();

        let (mut signed, replay) = req.into_parts();
        let unsigned = take_tracing_headers(&mut signed.headers);
        let cred = self.signer.sign(&mut signed, body.payload()).await?;
        for (name, value) in unsigned {
            signed.headers.append(name, value);
        }

        Ok((http::Request::from_parts(signed, replay), cred))
    }
}

#[async_trait]
impl RoundTrip for SigV4RoundTripper {
    async fn round_trip(&self, req: http::Request<Body>) -> Result<http::Response<Body>> {
        let (mut parts, body) = req.into_parts();
        let body = self.pool.buffer(body).await?;
        parts.uri = canonicalize_uri(&parts.uri)?;

        let mut attempt = 1;
        loop {
            let (req, cred) = self.signed_request(&parts, &body).await?;
            let resp = self.next.round_trip(req).await?;

            if attempt >= MAX_ATTEMPTS || !is_expired_token(&resp) {
                return Ok(resp);
            }
            debug!(
                "{} {} was rejected with an expired token, refreshing credential and retrying",
                parts.method, parts.uri
            );
            self.signer.invalidate_if(&cred);
            attempt += 1;
        }
    }
}

fn is_tracing_header(name: &HeaderName) -> bool {
    let name = name.as_str();
    UNSIGNED_TRACING_HEADERS.contains(&name) || name.starts_with(UNSIGNED_TRACING_HEADER_PREFIX)
}

/// Remove every tracing header from `headers`, keeping all their values.
fn take_tracing_headers(headers: &mut HeaderMap) -> Vec<(HeaderName, HeaderValue)> {
    let names: Vec<HeaderName> = headers
        .keys()
        .filter(|name| is_tracing_header(name))
        .cloned()
        .collect();

    let mut taken = Vec::new();
    for name in names {
        if let Entry::Occupied(entry) = headers.entry(name) {
            let (name, values) = entry.remove_entry_mult();
            taken.extend(values.map(|value| (name.clone(), value)));
        }
    }
    taken
}

/// A `403` whose `x-amzn-errortype` names an expired session token.
///
/// The header may carry a `:`-separated suffix, only the part before it counts.
fn is_expired_token(resp: &http::Response<Body>) -> bool {
    if resp.status() != http::StatusCode::FORBIDDEN {
        return false;
    }
    resp.headers()
        .get(X_AMZN_ERRORTYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(':').next())
        .is_some_and(|v| EXPIRED_TOKEN_ERROR_TYPES.contains(&v.trim()))
}
