use crate::{Context, ProvideCredential, Result};
use async_trait::async_trait;
use std::fmt::{self, Debug};

/// A chain of credential providers that will be tried in order.
///
/// The first provider returning `Some` wins. Errors are logged and the chain
/// moves on, so one broken source (an unreadable profile file, say) never
/// hides a working one further down.
pub struct ProvideCredentialChain<C> {
    providers: Vec<Box<dyn ProvideCredential<Credential = C>>>,
}

impl<C> ProvideCredentialChain<C>
where
    C: Send + Sync + Unpin + 'static,
{
    /// Create a new empty credential provider chain.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Add a credential provider to the chain.
    pub fn push(mut self, provider: impl ProvideCredential<Credential = C> + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Create a credential provider chain from a vector of providers.
    pub fn from_vec(providers: Vec<Box<dyn ProvideCredential<Credential = C>>>) -> Self {
        Self { providers }
    }

    /// Number of providers in the chain.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the chain has no providers.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl<C> Default for ProvideCredentialChain<C>
where
    C: Send + Sync + Unpin + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Debug for ProvideCredentialChain<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvideCredentialChain")
            .field("providers", &self.providers)
            .finish()
    }
}

#[async_trait]
impl<C> ProvideCredential for ProvideCredentialChain<C>
where
    C: Send + Sync + Unpin + 'static,
{
    type Credential = C;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        for provider in &self.providers {
            log::debug!("trying credential provider: {provider:?}");

            match provider.provide_credential(ctx).await {
                Ok(Some(cred)) => {
                    log::debug!("loaded credential from provider: {provider:?}");
                    return Ok(Some(cred));
                }
                Ok(None) => {
                    log::debug!("no credential found in provider: {provider:?}");
                }
                Err(e) => {
                    log::warn!("error loading credential from provider {provider:?}: {e}");
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[derive(Debug)]
    struct Fixed(&'static str);

    #[async_trait]
    impl ProvideCredential for Fixed {
        type Credential = String;

        async fn provide_credential(&self, _: &Context) -> Result<Option<String>> {
            Ok(Some(self.0.to_string()))
        }
    }

    #[derive(Debug)]
    struct Empty;

    #[async_trait]
    impl ProvideCredential for Empty {
        type Credential = String;

        async fn provide_credential(&self, _: &Context) -> Result<Option<String>> {
            Ok(None)
        }
    }

    #[derive(Debug)]
    struct Broken;

    #[async_trait]
    impl ProvideCredential for Broken {
        type Credential = String;

        async fn provide_credential(&self, _: &Context) -> Result<Option<String>> {
            Err(Error::unexpected("provider is broken"))
        }
    }

    #[tokio::test]
    async fn test_chain_returns_first_success() {
        let _ = env_logger::builder().is_test(true).try_init();

        let chain = ProvideCredentialChain::new()
            .push(Broken)
            .push(Empty)
            .push(Fixed("first"))
            .push(Fixed("second"));
        assert_eq!(chain.len(), 4);

        let cred = chain
            .provide_credential(&Context::new())
            .await
            .expect("chain must not fail");
        assert_eq!(cred.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_chain_returns_none_when_all_fail() {
        let chain = ProvideCredentialChain::new().push(Broken).push(Empty);

        let cred = chain
            .provide_credential(&Context::new())
            .await
            .expect("chain must not fail");
        assert!(cred.is_none());
    }

    #[tokio::test]
    async fn test_empty_chain_returns_none() {
        let chain = ProvideCredentialChain::<String>::default();
        assert!(chain.is_empty());

        let cred = chain
            .provide_credential(&Context::new())
            .await
            .expect("chain must not fail");
        assert!(cred.is_none());
    }
}
