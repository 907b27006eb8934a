use crate::{Context, Result};
use std::fmt::Debug;

/// SigningCredential is the trait implemented by everything a signer can sign with.
pub trait SigningCredential: Clone + Debug + Send + Sync + Unpin + 'static {
    /// Check if the credential is usable for signing.
    ///
    /// Resolution rejects a credential that fails this check.
    fn is_valid(&self) -> bool;
}

/// ProvideCredential is the trait used to load a credential from one source.
///
/// Returning `Ok(None)` means the source has nothing to offer, which lets a
/// chain move on to the next source. Returning `Err` means the source exists
/// but is broken.
#[async_trait::async_trait]
pub trait ProvideCredential: Debug + Send + Sync + Unpin + 'static {
    /// Credential returned by this provider.
    type Credential: Send + Sync + Unpin + 'static;

    /// Load credential from current context.
    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>>;
}

/// SignRequest is the trait used by signers to authenticate a request.
#[async_trait::async_trait]
pub trait SignRequest: Debug + Send + Sync + Unpin + 'static {
    /// Credential used by this signer.
    type Credential: Send + Sync + Unpin + 'static;

    /// Sign the request in place.
    ///
    /// `body` is the complete payload that will be transmitted. Signers that
    /// bind the payload into the signature must hash exactly these bytes.
    async fn sign_request(
        &self,
        ctx: &Context,
        req: &mut http::request::Parts,
        body: &[u8],
        credential: &Self::Credential,
    ) -> Result<()>;
}
