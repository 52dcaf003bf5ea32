//! Error types for Resource Manager operations.

use std::time::Duration;
use thiserror::Error;

/// Result type for provisioning operations.
pub type ProvisionResult<T> = std::result::Result<T, ProvisionError>;

/// Errors raised while creating, fetching or deleting resources.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// The bearer credential expired before the call was made.
    #[error("the access token has expired")]
    CredentialExpired,

    /// Resource Manager rejected the request.
    #[error("Resource Manager returned {status} {code}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// ARM error code (e.g. `ResourceGroupNotFound`)
        code: String,
        /// ARM error message
        message: String,
    },

    /// A long-running operation finished in a non-success state.
    #[error("{operation} ended with status {status}: {message}")]
    OperationFailed {
        /// What was being waited on
        operation: String,
        /// Terminal status reported by ARM
        status: String,
        /// Error message reported by ARM
        message: String,
    },

    /// A long-running operation did not finish in time.
    #[error("{operation} did not finish within {after:?}")]
    TimedOut {
        /// What was being waited on
        operation: String,
        /// The configured limit
        after: Duration,
    },

    /// The wait was cancelled.
    #[error("{operation} was cancelled")]
    Cancelled {
        /// What was being waited on
        operation: String,
    },

    /// A response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    InvalidResponse(String),

    /// A step of the workflow failed; wraps the underlying cause.
    #[error("{action}: {source}")]
    Step {
        /// Description of the step (e.g. "could not create network interface 'x'")
        action: String,
        /// Underlying error
        #[source]
        source: Box<ProvisionError>,
    },

    /// Transport failure.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A resource URL could not be built.
    #[error("invalid resource URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ProvisionError {
    /// Wrap this error with a description of the failed step.
    pub fn context(self, action: impl Into<String>) -> Self {
        ProvisionError::Step {
            action: action.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping step context.
    pub fn root_cause(&self) -> &ProvisionError {
        match self {
            ProvisionError::Step { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Whether Resource Manager accepted the request but the wait for its
    /// outcome was cut short. The resource may exist.
    pub fn is_interrupted_wait(&self) -> bool {
        matches!(
            self.root_cause(),
            ProvisionError::TimedOut { .. } | ProvisionError::Cancelled { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_keeps_root_cause() {
        let err = ProvisionError::Api {
            status: 404,
            code: "NotFound".to_string(),
            message: "gone".to_string(),
        }
        .context("could not fetch network interface 'nic'");

        assert_eq!(
            err.to_string(),
            "could not fetch network interface 'nic': Resource Manager returned 404 NotFound: gone"
        );
        assert!(matches!(err.root_cause(), ProvisionError::Api { .. }));
        assert!(!err.is_interrupted_wait());
    }

    #[test]
    fn test_interrupted_wait_looks_through_context() {
        let err = ProvisionError::Cancelled {
            operation: "resource group creation".to_string(),
        }
        .context("could not create resource group 'rg'");
        assert!(err.is_interrupted_wait());
        assert!(!ProvisionError::CredentialExpired.is_interrupted_wait());
    }
}
