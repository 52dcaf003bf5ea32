//! Authentication against the identity provider.
//!
//! The workflow only depends on the [`Authenticator`] trait. The production
//! implementation is [`DeviceCodeAuthenticator`], which runs the OAuth 2.0
//! device authorization grant against Microsoft Entra ID:
//!
//! 1. request a device code for the tenant,
//! 2. show the verification URL and user code,
//! 3. poll the token endpoint until the user finishes, declines, or the wait
//!    budget runs out.

pub mod credential;
pub mod device_code;
pub mod error;

pub use credential::Credential;
pub use device_code::{DeviceCodeAuthenticator, AZURE_CLI_CLIENT_ID};
pub use error::{AuthError, AuthResult};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Exchanges a tenant id for a bearer credential.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Obtain a credential for `tenant_id`.
    ///
    /// May block for as long as the user takes to sign in, bounded by the
    /// implementation's timeout. Returns [`AuthError::Cancelled`] once
    /// `cancel` fires.
    async fn authenticate(
        &self,
        tenant_id: &Uuid,
        cancel: &CancellationToken,
    ) -> AuthResult<Credential>;
}
