//! Bearer credential issued by the identity provider.

use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Longest lifetime accepted from a token response (one day).
const MAX_LIFETIME_SECS: u64 = 86_400;

/// An access token plus its expiry.
///
/// Obtained once per run and shared read-only with every Resource Manager
/// call. The token itself never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access_token: String,
    expires_on: DateTime<Utc>,
}

impl Credential {
    /// Create a credential expiring at `expires_on`.
    pub fn new(access_token: impl Into<String>, expires_on: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_on,
        }
    }

    /// Create a credential that expires `lifetime_secs` from now.
    pub fn expiring_in(access_token: impl Into<String>, lifetime_secs: u64) -> Self {
        let secs = i64::try_from(lifetime_secs.min(MAX_LIFETIME_SECS)).unwrap_or_default();
        Self::new(access_token, Utc::now() + Duration::seconds(secs))
    }

    /// Raw token value.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Value for the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// When the token stops being accepted.
    pub fn expires_on(&self) -> DateTime<Utc> {
        self.expires_on
    }

    /// Whether the token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_on
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}
