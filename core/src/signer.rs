use crate::{Context, Error, ProvideCredential, Result, SignRequest, SigningCredential};
use log::debug;
use std::sync::{Arc, Mutex};

/// Signer is the main struct used to sign the request.
///
/// It caches the credential returned by its provider and only asks the
/// provider again once the cached one is no longer valid or has been
/// [invalidated](Signer::invalidate). Cloning a signer is cheap and every
/// clone shares the same cache.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<Mutex<Option<K>>>,
    refresh: Arc<tokio::sync::Mutex<()>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            loader: Arc::new(loader),
            builder: Arc::new(builder),
            credential: Arc::new(Mutex::new(None)),
            refresh: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// The context this signer resolves credentials with.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Return the cached credential, loading a new one if needed.
    ///
    /// Concurrent callers that find the cache empty wait on a single refresh
    /// instead of each hitting the provider.
    pub async fn credential(&self) -> Result<K> {
        if let Some(cred) = self.cached() {
            return Ok(cred);
        }

        let _refresh = self.refresh.lock().await;
        // Another caller may have refreshed while we were waiting.
        if let Some(cred) = self.cached() {
            return Ok(cred);
        }

        debug!("loading signing credential from {:?}", self.loader);
        let cred = self
            .loader
            .provide_credential(&self.ctx)
            .await?
            .ok_or_else(|| {
                Error::credential_invalid("no valid credential found")
                    .with_context(format!("provider: {:?}", self.loader))
            })?;
        *self.credential.lock().expect("lock poisoned") = Some(cred.clone());

        Ok(cred)
    }

    /// Drop the cached credential so the next signing reloads it.
    pub fn invalidate(&self) {
        debug!("invalidating cached signing credential");
        *self.credential.lock().expect("lock poisoned") = None;
    }

    /// Drop the cached credential only if it's still `used`.
    ///
    /// Requests signed with an old credential may learn it expired after a
    /// newer one was already loaded; those must not throw the newer one away.
    pub fn invalidate_if(&self, used: &K)
    where
        K: PartialEq,
    {
        let mut cached = self.credential.lock().expect("lock poisoned");
        if cached.as_ref() == Some(used) {
            debug!("invalidating cached signing credential");
            *cached = None;
        }
    }

    /// Sign the request with the current credential and return the
    /// credential it was signed with.
    pub async fn sign(&self, req: &mut http::request::Parts, payload: &[u8]) -> Result<K> {
        let cred = self.credential().await?;

        self.builder
            .sign_request(&self.ctx, req, payload, Some(&cred))
            .await?;
        Ok(cred)
    }

    fn cached(&self) -> Option<K> {
        self.credential
            .lock()
            .expect("lock poisoned")
            .clone()
            .filter(|cred| cred.is_valid())
    }
}
