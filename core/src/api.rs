use crate::{Context, Result};
use std::fmt::Debug;

/// SigningCredential is the trait used by signer as the signing credential.
pub trait SigningCredential: Clone + Debug + Send + Sync + Unpin + 'static {
    /// Check if the credential is valid.
    fn is_valid(&self) -> bool;
}

impl<T: SigningCredential> SigningCredential for Option<T> {
    fn is_valid(&self) -> bool {
        let Some(cred) = self else {
            return false;
        };

        cred.is_valid()
    }
}

/// ProvideCredential is the trait used by signer to load the credential from
/// the environment.
///
/// Returning `Ok(None)` means this provider has nothing to offer, which lets a
/// [`crate::ProvideCredentialChain`] move on to the next provider.
#[async_trait::async_trait]
pub trait ProvideCredential: Debug + Send + Sync + Unpin + 'static {
    /// Credential returned by this provider.
    type Credential: Send + Sync + Unpin + 'static;

    /// Load signing credential from current env.
    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>>;
}

#[async_trait::async_trait]
impl<T: ProvideCredential + ?Sized> ProvideCredential for Box<T> {
    type Credential = T::Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.as_ref().provide_credential(ctx).await
    }
}

/// SignRequest is the trait used by signer to attach a signature to a request.
#[async_trait::async_trait]
pub trait SignRequest: Debug + Send + Sync + Unpin + 'static {
    /// Credential used by this signer.
    type Credential: Send + Sync + Unpin + 'static;

    /// Sign the request in place.
    ///
    /// ## Payload
    ///
    /// `payload` holds the exact bytes that will be sent as the request body;
    /// bodyless requests pass an empty slice. Implementations hash it as
    /// part of the canonical request.
    ///
    /// ## Credential
    ///
    /// Implementations must leave the request untouched when `credential` is
    /// `None`.
    async fn sign_request(
        &self,
        ctx: &Context,
        req: &mut http::request::Parts,
        payload: &[u8],
        credential: Option<&Self::Credential>,
    ) -> Result<()>;
}
