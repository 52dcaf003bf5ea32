//! Resource Manager HTTP client.
//!
//! Thin wrapper over `reqwest` that adds the bearer header, the
//! `api-version` query parameter, ARM error decoding, and polling of
//! long-running operations.

use reqwest::header::{HeaderMap, AUTHORIZATION, LOCATION, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

use super::error::{ProvisionError, ProvisionResult};
use crate::auth::Credential;
use crate::deadline::deadline_after;

/// Public cloud Resource Manager endpoint.
pub const DEFAULT_RESOURCE_MANAGER: &str = "https://management.azure.com/";

/// Default bound on a single long-running operation.
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 1800;

/// Poll interval when ARM does not send `Retry-After`.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

const ASYNC_OPERATION_HEADER: &str = "azure-asyncoperation";

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct OperationStatus {
    status: String,
    #[serde(default)]
    error: Option<ErrorBody>,
}

/// Where to poll for the outcome of a long-running operation.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PollTarget {
    /// `Azure-AsyncOperation` status resource
    AsyncOperation(Url),
    /// `Location` header of a 202 response
    Location(Url),
}

#[derive(Debug, Clone)]
struct PendingOperation {
    target: PollTarget,
    first_delay: Duration,
}

/// Client for one subscription, authenticated with one credential.
#[derive(Debug, Clone)]
pub struct ArmClient {
    http: Client,
    endpoint: Url,
    subscription_id: Uuid,
    credential: Credential,
    operation_timeout: Duration,
    poll_interval: Duration,
}

impl ArmClient {
    /// Create a client. `endpoint` must end with a slash.
    pub fn new(http: Client, endpoint: Url, subscription_id: Uuid, credential: Credential) -> Self {
        Self {
            http,
            endpoint,
            subscription_id,
            credential,
            operation_timeout: Duration::from_secs(DEFAULT_OPERATION_TIMEOUT_SECS),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }

    /// Bound long-running operations.
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Poll interval used when ARM sends no `Retry-After`.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Build `{endpoint}/subscriptions/{id}/{path}?api-version={api_version}`.
    pub fn subscription_url(&self, path: &str, api_version: &str) -> ProvisionResult<Url> {
        let mut url = self
            .endpoint
            .join(&format!("subscriptions/{}/{}", self.subscription_id, path))?;
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> ProvisionResult<Response> {
        if self.credential.is_expired() {
            return Err(ProvisionError::CredentialExpired);
        }

        let response = request
            .header(AUTHORIZATION, self.credential.authorization_header())
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::api_error(response).await)
        }
    }

    async fn api_error(response: Response) -> ProvisionError {
        let status = response.status().as_u16();
        let body = match response.json::<ErrorEnvelope>().await {
            Ok(envelope) => envelope.error,
            Err(_) => ErrorBody {
                code: StatusCode::from_u16(status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Unknown")
                    .replace(' ', ""),
                message: "no error details in response".to_string(),
            },
        };
        ProvisionError::Api {
            status,
            code: body.code,
            message: body.message,
        }
    }

    /// GET a resource and decode it.
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ProvisionResult<T> {
        debug!(%url, "GET");
        let response = self.send(self.http.get(url)).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ProvisionError::InvalidResponse(e.to_string()))
    }

    /// PUT a resource and wait for the operation to finish.
    ///
    /// Returns the body of the initial response, or `Value::Null` when it was
    /// empty.
    pub async fn put_and_wait<B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
        operation: &str,
        cancel: &CancellationToken,
    ) -> ProvisionResult<Value> {
        debug!(%url, "PUT");
        let response = self.send(self.http.put(url).json(body)).await?;
        let pending = pending_operation(&response, self.poll_interval);

        let bytes = response.bytes().await?;
        let initial = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .map_err(|e| ProvisionError::InvalidResponse(e.to_string()))?
        };

        if let Some(pending) = pending {
            self.wait_for(pending, operation, cancel).await?;
        }

        Ok(initial)
    }

    /// DELETE a resource without waiting for the operation to finish.
    pub async fn delete(&self, url: Url) -> ProvisionResult<StatusCode> {
        debug!(%url, "DELETE");
        let response = self.send(self.http.delete(url)).await?;
        Ok(response.status())
    }

    async fn wait_for(
        &self,
        pending: PendingOperation,
        operation: &str,
        cancel: &CancellationToken,
    ) -> ProvisionResult<()> {
        let deadline = deadline_after(self.operation_timeout);
        let mut delay = pending.first_delay;

        loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(ProvisionError::TimedOut {
                    operation: operation.to_string(),
                    after: self.operation_timeout,
                });
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    return Err(ProvisionError::Cancelled {
                        operation: operation.to_string(),
                    });
                }
                _ = tokio::time::sleep(delay.min(deadline - now)) => {}
            }

            match &pending.target {
                PollTarget::AsyncOperation(url) => {
                    let response = self.send(self.http.get(url.clone())).await?;
                    let retry = retry_after(response.headers());
                    let status: OperationStatus = response.json().await?;

                    debug!(operation, status = %status.status, "Polled operation");
                    match status.status.to_ascii_lowercase().as_str() {
                        "succeeded" => return Ok(()),
                        "failed" | "canceled" | "cancelled" => {
                            let error = status.error.unwrap_or_default();
                            return Err(ProvisionError::OperationFailed {
                                operation: operation.to_string(),
                                status: status.status,
                                message: if error.message.is_empty() {
                                    error.code
                                } else {
                                    error.message
                                },
                            });
                        }
                        _ => {}
                    }
                    delay = retry.unwrap_or(self.poll_interval);
                }
                PollTarget::Location(url) => {
                    let response = self.send(self.http.get(url.clone())).await?;
                    if response.status() != StatusCode::ACCEPTED {
                        return Ok(());
                    }
                    delay = retry_after(response.headers()).unwrap_or(self.poll_interval);
                }
            }
        }
    }
}

/// Decide whether a response describes an operation still in flight.
fn pending_operation(response: &Response, default_delay: Duration) -> Option<PendingOperation> {
    let headers = response.headers();
    let first_delay = retry_after(headers).unwrap_or(Duration::ZERO);

    if let Some(url) = header_url(headers, ASYNC_OPERATION_HEADER) {
        return Some(PendingOperation {
            target: PollTarget::AsyncOperation(url),
            first_delay,
        });
    }

    if response.status() == StatusCode::ACCEPTED {
        return match header_url(headers, LOCATION.as_str()) {
            Some(url) => Some(PendingOperation {
                target: PollTarget::Location(url),
                first_delay: retry_after(headers).unwrap_or(default_delay),
            }),
            None => {
                warn!("202 Accepted without a polling header; not waiting");
                None
            }
        };
    }

    None
}

fn header_url(headers: &HeaderMap, name: &str) -> Option<Url> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Url::parse(v).ok())
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
