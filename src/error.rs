//! Error types for arm-vm-sample.
//!
//! Each concern owns its error enum ([`ArgumentError`] here,
//! [`AuthError`](crate::auth::AuthError) for the identity provider and
//! [`ProvisionError`](crate::azure::ProvisionError) for Resource Manager).
//! The top-level [`Error`] wraps them so the workflow can report any failure
//! with a single message.

use std::path::PathBuf;
use thiserror::Error;

use crate::auth::AuthError;
use crate::azure::ProvisionError;

/// Result type alias for workflow-level operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad command-line input or settings file. Raised before any remote call.
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// The identity provider refused or failed to issue a credential.
    #[error("could not authenticate: {0}")]
    Auth(#[from] AuthError),

    /// A Resource Manager create, fetch or delete failed.
    #[error(transparent)]
    Provisioning(#[from] ProvisionError),
}

/// Errors raised while resolving the run configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    /// A required identifier was not given on the command line or in the environment.
    #[error("no {name} was provided. Pass --{flag} or set {env_var}")]
    Missing {
        /// Human readable name (e.g. "Subscription ID")
        name: &'static str,
        /// Flag that supplies the value
        flag: &'static str,
        /// Environment variable fallback
        env_var: &'static str,
    },

    /// An identifier did not parse as a UUID.
    #[error("'{raw}' doesn't look like an Azure {name}. A UUID is expected")]
    NotAUuid {
        /// Human readable name (e.g. "Tenant ID")
        name: &'static str,
        /// The rejected input
        raw: String,
    },

    /// An endpoint could not be parsed as an absolute URL.
    #[error("invalid {name} endpoint '{raw}': {message}")]
    InvalidEndpoint {
        /// Which endpoint
        name: &'static str,
        /// The rejected input
        raw: String,
        /// Parser message
        message: String,
    },

    /// The settings file could not be read or parsed.
    #[error("failed to load settings from '{path}': {message}")]
    Settings {
        /// Path to the settings file
        path: PathBuf,
        /// Error message
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_a_uuid_message_names_the_input() {
        let err = ArgumentError::NotAUuid {
            name: "Subscription ID",
            raw: "not-a-guid".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'not-a-guid'"));
        assert!(msg.contains("Subscription ID"));
    }

    #[test]
    fn test_missing_message_names_flag_and_env() {
        let err = ArgumentError::Missing {
            name: "Tenant ID",
            flag: "tenant",
            env_var: "AZURE_TENANT_ID",
        };
        let msg = err.to_string();
        assert!(msg.contains("--tenant"));
        assert!(msg.contains("AZURE_TENANT_ID"));
    }

    #[test]
    fn test_auth_errors_name_the_step() {
        let err: Error = AuthError::Expired.into();
        assert_eq!(
            err.to_string(),
            "could not authenticate: the device code expired before sign-in completed"
        );
    }
}
