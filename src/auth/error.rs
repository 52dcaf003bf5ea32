//! Error types for authentication.

use std::time::Duration;
use thiserror::Error;

/// Result type for authentication operations.
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Errors raised while obtaining a credential from the identity provider.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The tenant endpoints could not be derived from the authority host.
    #[error("invalid identity provider configuration: {0}")]
    Configuration(String),

    /// The provider did not hand out a device code.
    #[error("device code request failed: {0}")]
    DeviceCodeInitiation(String),

    /// The user declined the sign-in.
    #[error("sign-in was declined: {0}")]
    Denied(String),

    /// The device code expired before the user completed sign-in.
    #[error("the device code expired before sign-in completed")]
    Expired,

    /// The local wait budget ran out.
    #[error("timed out after {0:?} waiting for sign-in to complete")]
    TimedOut(Duration),

    /// The caller cancelled the wait.
    #[error("authentication was cancelled")]
    Cancelled,

    /// The token endpoint returned an error other than the polling states.
    #[error("token request failed ({code}): {description}")]
    Token {
        /// OAuth error code
        code: String,
        /// Provider supplied description
        description: String,
    },

    /// Transport failure.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}
