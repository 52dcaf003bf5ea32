//! Device code flow (RFC 8628) against Microsoft Entra ID.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use super::credential::Credential;
use super::error::{AuthError, AuthResult};
use super::Authenticator;
use crate::deadline::deadline_after;
use crate::report::Reporter;

/// Client id of the Azure CLI, a well-known public client.
pub const AZURE_CLI_CLIENT_ID: &str = "04b07795-8ddb-461a-bbee-02f9e1bf7b46";

const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Poll interval when the provider does not specify one.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Default upper bound on the sign-in wait.
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 900;

/// Device authorization response.
#[derive(Debug, Clone, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    expires_in: u64,
    #[serde(default)]
    interval: Option<u64>,
    #[serde(default)]
    message: Option<String>,
}

impl DeviceCodeResponse {
    /// Instructions for the user. Entra ID sends a localized message; other
    /// providers only send the URL and code.
    fn prompt(&self) -> String {
        match &self.message {
            Some(message) if !message.is_empty() => message.clone(),
            _ => format!(
                "To sign in, use a web browser to open the page {} and enter the code {} to authenticate.",
                self.verification_uri, self.user_code
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: String,
    #[serde(default)]
    error_description: String,
}

/// Result of one token poll.
#[derive(Debug)]
enum PollOutcome {
    Issued(Credential),
    Pending,
    SlowDown,
}

/// Authenticator running the device code flow.
pub struct DeviceCodeAuthenticator {
    client: Client,
    authority_host: Url,
    client_id: String,
    scope: String,
    timeout: Duration,
    poll_interval: Option<Duration>,
    slow_down_step: Duration,
    reporter: Arc<dyn Reporter>,
}

impl DeviceCodeAuthenticator {
    /// Create an authenticator for tokens scoped to `resource_manager`.
    ///
    /// The sign-in prompt is shown through `reporter`.
    pub fn new(authority_host: Url, resource_manager: &Url, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            client: Client::new(),
            authority_host,
            client_id: AZURE_CLI_CLIENT_ID.to_string(),
            scope: format!("{}.default", resource_manager),
            timeout: Duration::from_secs(DEFAULT_AUTH_TIMEOUT_SECS),
            poll_interval: None,
            slow_down_step: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            reporter,
        }
    }

    /// Use a preconfigured HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Bound the sign-in wait. The provider's code lifetime still applies.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Poll at a fixed interval instead of the provider's. Also used as the
    /// back-off step on `slow_down`.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self.slow_down_step = interval;
        self
    }

    /// Scope requested for the token.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    fn tenant_endpoint(&self, tenant_id: &Uuid, leaf: &str) -> AuthResult<Url> {
        self.authority_host
            .join(&format!("{}/oauth2/v2.0/{}", tenant_id, leaf))
            .map_err(|e| {
                AuthError::Configuration(format!(
                    "cannot derive {} endpoint from '{}': {}",
                    leaf, self.authority_host, e
                ))
            })
    }

    async fn request_device_code(&self, endpoint: &Url) -> AuthResult<DeviceCodeResponse> {
        let response = self
            .client
            .post(endpoint.clone())
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("scope", self.scope.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AuthError::DeviceCodeInitiation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<OAuthErrorResponse>().await {
                Ok(body) => format!("{}: {}", body.error, body.error_description),
                Err(_) => format!("HTTP {}", status),
            };
            return Err(AuthError::DeviceCodeInitiation(message));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::DeviceCodeInitiation(format!("malformed response: {}", e)))
    }

    async fn redeem(&self, endpoint: &Url, device_code: &str) -> AuthResult<PollOutcome> {
        let response = self
            .client
            .post(endpoint.clone())
            .form(&[
                ("grant_type", DEVICE_CODE_GRANT),
                ("client_id", self.client_id.as_str()),
                ("device_code", device_code),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let token: TokenResponse = response.json().await?;
            return Ok(PollOutcome::Issued(Credential::expiring_in(
                token.access_token,
                token.expires_in,
            )));
        }

        let body: OAuthErrorResponse = response.json().await.map_err(|_| AuthError::Token {
            code: status.as_u16().to_string(),
            description: "unreadable error response".to_string(),
        })?;

        match body.error.as_str() {
            "authorization_pending" => Ok(PollOutcome::Pending),
            "slow_down" => Ok(PollOutcome::SlowDown),
            "authorization_declined" | "access_denied" => Err(AuthError::Denied(body.error_description)),
            "expired_token" | "code_expired" => Err(AuthError::Expired),
            _ => Err(AuthError::Token {
                code: body.error,
                description: body.error_description,
            }),
        }
    }

    async fn poll_for_token(
        &self,
        endpoint: &Url,
        code: &DeviceCodeResponse,
        cancel: &CancellationToken,
    ) -> AuthResult<Credential> {
        let budget = self.timeout.min(Duration::from_secs(code.expires_in));
        let deadline = deadline_after(budget);
        let mut interval = self.poll_interval.unwrap_or_else(|| {
            Duration::from_secs(code.interval.unwrap_or(DEFAULT_POLL_INTERVAL_SECS))
        });

        loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(AuthError::TimedOut(budget));
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(AuthError::Cancelled),
                _ = tokio::time::sleep(interval.min(deadline - now)) => {}
            }

            match self.redeem(endpoint, &code.device_code).await? {
                PollOutcome::Issued(credential) => {
                    debug!(expires_on = %credential.expires_on(), "Token issued");
                    return Ok(credential);
                }
                PollOutcome::Pending => {}
                PollOutcome::SlowDown => {
                    interval = interval.saturating_add(self.slow_down_step);
                    debug!(interval = ?interval, "Identity provider asked to slow down");
                }
            }
        }
    }
}

#[async_trait]
impl Authenticator for DeviceCodeAuthenticator {
    async fn authenticate(
        &self,
        tenant_id: &Uuid,
        cancel: &CancellationToken,
    ) -> AuthResult<Credential> {
        let device_endpoint = self.tenant_endpoint(tenant_id, "devicecode")?;
        let token_endpoint = self.tenant_endpoint(tenant_id, "token")?;

        self.reporter
            .debug(&format!("DeviceCodeEndpoint: {}", device_endpoint));
        let code = self.request_device_code(&device_endpoint).await?;

        self.reporter.status(&code.prompt());
        self.poll_for_token(&token_endpoint, &code, cancel).await
    }
}
