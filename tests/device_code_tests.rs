//! Device code flow tests against a local identity provider double.

mod common;

use common::*;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;
use uuid::Uuid;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use arm_vm_sample::auth::{AuthError, Authenticator, DeviceCodeAuthenticator};
use arm_vm_sample::report::{MemoryReporter, Severity};

fn device_code_path() -> String {
    format!("/{}/oauth2/v2.0/devicecode", TENANT_ID)
}

fn token_path() -> String {
    format!("/{}/oauth2/v2.0/token", TENANT_ID)
}

fn authenticator(server: &MockServer, reporter: Arc<MemoryReporter>) -> DeviceCodeAuthenticator {
    DeviceCodeAuthenticator::new(
        Url::parse(&format!("{}/", server.uri())).unwrap(),
        &Url::parse("https://management.azure.com/").unwrap(),
        reporter,
    )
    .with_poll_interval(Duration::from_millis(10))
}

fn tenant() -> Uuid {
    Uuid::parse_str(TENANT_ID).unwrap()
}

async fn mount_device_code(server: &MockServer, expires_in: u64) {
    Mock::given(method("POST"))
        .and(path(device_code_path()))
        .and(body_string_contains(
            "client_id=04b07795-8ddb-461a-bbee-02f9e1bf7b46",
        ))
        .and(body_string_contains(
            "scope=https%3A%2F%2Fmanagement.azure.com%2F.default",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_code_body(5, expires_in)))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_token_error(server: &MockServer, code: &str, times: Option<u64>) {
    let mock = Mock::given(method("POST"))
        .and(path(token_path()))
        .and(body_string_contains("device_code=device-code-123"))
        .respond_with(ResponseTemplate::new(400).set_body_json(oauth_error(code)));
    let mock = match times {
        Some(n) => mock.up_to_n_times(n).expect(n),
        None => mock,
    };
    mock.mount(server).await;
}

#[tokio::test]
async fn test_pending_then_issued() {
    let server = MockServer::start().await;
    mount_device_code(&server, 900).await;
    mount_token_error(&server, "authorization_pending", Some(2)).await;
    Mock::given(method("POST"))
        .and(path(token_path()))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Adevice_code",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(1)
        .mount(&server)
        .await;

    let reporter = Arc::new(MemoryReporter::new());
    let credential = authenticator(&server, reporter.clone())
        .authenticate(&tenant(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(credential.access_token(), "issued-token");
    assert!(!credential.is_expired());

    let statuses = reporter.messages(Severity::Status);
    assert_eq!(statuses.len(), 1);
    assert!(statuses[0].contains("https://microsoft.com/devicelogin"));
    assert!(statuses[0].contains("ABCD-EFGH"));

    let debug = reporter.messages(Severity::Debug);
    assert!(debug[0].starts_with("DeviceCodeEndpoint: "));
    assert!(debug[0].ends_with(&device_code_path()));
}

#[tokio::test]
async fn test_slow_down_keeps_polling() {
    let server = MockServer::start().await;
    mount_device_code(&server, 900).await;
    mount_token_error(&server, "slow_down", Some(1)).await;
    Mock::given(method("POST"))
        .and(path(token_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(1)
        .mount(&server)
        .await;

    let credential = authenticator(&server, Arc::new(MemoryReporter::new()))
        .authenticate(&tenant(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(credential.access_token(), "issued-token");
}

#[tokio::test]
async fn test_declined() {
    let server = MockServer::start().await;
    mount_device_code(&server, 900).await;
    mount_token_error(&server, "authorization_declined", None).await;

    let err = authenticator(&server, Arc::new(MemoryReporter::new()))
        .authenticate(&tenant(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Denied(_)), "got {err:?}");
}

#[tokio::test]
async fn test_expired_code() {
    let server = MockServer::start().await;
    mount_device_code(&server, 900).await;
    mount_token_error(&server, "expired_token", None).await;

    let err = authenticator(&server, Arc::new(MemoryReporter::new()))
        .authenticate(&tenant(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Expired), "got {err:?}");
}

#[tokio::test]
async fn test_other_token_error() {
    let server = MockServer::start().await;
    mount_device_code(&server, 900).await;
    mount_token_error(&server, "invalid_client", None).await;

    let err = authenticator(&server, Arc::new(MemoryReporter::new()))
        .authenticate(&tenant(), &CancellationToken::new())
        .await
        .unwrap_err();
    match err {
        AuthError::Token { code, .. } => assert_eq!(code, "invalid_client"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_local_timeout() {
    let server = MockServer::start().await;
    mount_device_code(&server, 900).await;
    mount_token_error(&server, "authorization_pending", None).await;

    let err = authenticator(&server, Arc::new(MemoryReporter::new()))
        .with_timeout(Duration::from_millis(100))
        .authenticate(&tenant(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(
        matches!(err, AuthError::TimedOut(limit) if limit == Duration::from_millis(100)),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_code_lifetime_bounds_the_wait() {
    let server = MockServer::start().await;
    mount_device_code(&server, 1).await;
    mount_token_error(&server, "authorization_pending", None).await;

    let err = authenticator(&server, Arc::new(MemoryReporter::new()))
        .authenticate(&tenant(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(
        matches!(err, AuthError::TimedOut(limit) if limit == Duration::from_secs(1)),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_cancelled_before_first_poll() {
    let server = MockServer::start().await;
    mount_device_code(&server, 900).await;
    Mock::given(method("POST"))
        .and(path(token_path()))
        .respond_with(ResponseTemplate::new(400).set_body_json(oauth_error("authorization_pending")))
        .expect(0)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = authenticator(&server, Arc::new(MemoryReporter::new()))
        .authenticate(&tenant(), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Cancelled), "got {err:?}");
}

#[tokio::test]
async fn test_device_code_request_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(device_code_path()))
        .respond_with(ResponseTemplate::new(400).set_body_json(oauth_error("invalid_scope")))
        .mount(&server)
        .await;

    let reporter = Arc::new(MemoryReporter::new());
    let err = authenticator(&server, reporter.clone())
        .authenticate(&tenant(), &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        AuthError::DeviceCodeInitiation(message) => assert!(message.contains("invalid_scope")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(reporter.messages(Severity::Status).is_empty());
}

#[tokio::test]
async fn test_unrepresentable_wait_budget_still_polls() {
    let server = MockServer::start().await;
    mount_device_code(&server, u64::MAX).await;
    Mock::given(method("POST"))
        .and(path(token_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
        .expect(1)
        .mount(&server)
        .await;

    let credential = authenticator(&server, Arc::new(MemoryReporter::new()))
        .with_timeout(Duration::from_secs(u64::MAX))
        .authenticate(&tenant(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(credential.access_token(), "issued-token");
}
