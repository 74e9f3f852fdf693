//! The identity-provider capability and the credential it hands out.

use std::fmt;
use std::future::Future;

/// An opaque bearer token authorizing reads of the user's subscription data.
///
/// The `Debug` representation never includes the token itself.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for use in an `Authorization` header or for storage.
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&"[redacted]").finish()
    }
}

/// Why obtaining or revoking a credential failed.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The identity provider refused, e.g. the user denied consent or the client is misconfigured.
    #[error("{}", .description.as_deref().unwrap_or(.error.as_str()))]
    Denied {
        error: String,
        description: Option<String>,
    },

    /// Anything else that went wrong along the way.
    #[error("{0:#}")]
    Other(eyre::Report),
}

impl From<eyre::Report> for IdentityError {
    fn from(e: eyre::Report) -> Self {
        Self::Other(e)
    }
}

/// The narrow slice of an identity SDK the session controller needs.
pub trait IdentityProvider {
    /// Runs whatever interactive flow is needed to obtain a fresh credential.
    fn request_token(&self) -> impl Future<Output = Result<Credential, IdentityError>> + Send;

    /// Tells the provider the credential is no longer wanted.
    fn revoke(&self, credential: &Credential)
    -> impl Future<Output = Result<(), IdentityError>> + Send;
}

/// An identity provider for the synthetic data source, which needs no real account.
///
/// It hands out a fixed local credential and treats revocation as a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoIdentity;

impl DemoIdentity {
    const TOKEN: &'static str = "demo";
}

impl IdentityProvider for DemoIdentity {
    async fn request_token(&self) -> Result<Credential, IdentityError> {
        tracing::debug!("issuing demo credential");
        Ok(Credential::new(Self::TOKEN))
    }

    async fn revoke(&self, _credential: &Credential) -> Result<(), IdentityError> {
        Ok(())
    }
}
