//! Shared test utilities for the arm-vm-sample test suite.
//!
//! This module provides:
//! - `mockall` doubles for the authenticator, connector and services
//! - Fixture configuration with the well-known test ids
//! - Canned Resource Manager and identity provider payloads
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use async_trait::async_trait;
use mockall::mock;
use serde_json::{json, Value};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;
use uuid::Uuid;

use arm_vm_sample::auth::{AuthResult, Authenticator, Credential};
use arm_vm_sample::azure::{
    CloudServices, ComputeService, NetworkInterface, NetworkInterfaceSpec, NetworkService,
    ProvisionResult, ResourceGroup, ResourceGroupService, ServiceConnector, VirtualMachine,
    VirtualMachineSpec,
};
use arm_vm_sample::config::ProvisionConfig;

pub const SUBSCRIPTION_ID: &str = "11111111-1111-1111-1111-111111111111";
pub const TENANT_ID: &str = "22222222-2222-2222-2222-222222222222";

mock! {
    pub Authenticator {}

    #[async_trait]
    impl Authenticator for Authenticator {
        async fn authenticate(
            &self,
            tenant_id: &Uuid,
            cancel: &CancellationToken,
        ) -> AuthResult<Credential>;
    }
}

mock! {
    pub Connector {}

    impl ServiceConnector for Connector {
        fn connect(&self, subscription_id: &Uuid, credential: &Credential) -> CloudServices;
    }
}

mock! {
    pub Groups {}

    #[async_trait]
    impl ResourceGroupService for Groups {
        async fn create_or_update(
            &self,
            name: &str,
            location: &str,
            cancel: &CancellationToken,
        ) -> ProvisionResult<ResourceGroup>;
        async fn delete(&self, name: &str) -> ProvisionResult<()>;
    }
}

mock! {
    pub Network {}

    #[async_trait]
    impl NetworkService for Network {
        async fn create_or_update_interface(
            &self,
            resource_group: &str,
            spec: &NetworkInterfaceSpec,
            cancel: &CancellationToken,
        ) -> ProvisionResult<NetworkInterface>;
        async fn get_interface(&self, resource_group: &str, name: &str) -> ProvisionResult<NetworkInterface>;
    }
}

mock! {
    pub Compute {}

    #[async_trait]
    impl ComputeService for Compute {
        async fn create_or_update_vm(
            &self,
            resource_group: &str,
            spec: &VirtualMachineSpec,
            cancel: &CancellationToken,
        ) -> ProvisionResult<()>;
        async fn get_vm(&self, resource_group: &str, name: &str) -> ProvisionResult<VirtualMachine>;
    }
}

/// Resolved configuration using the well-known test ids.
pub fn test_config() -> ProvisionConfig {
    ProvisionConfig {
        subscription_id: Uuid::parse_str(SUBSCRIPTION_ID).unwrap(),
        tenant_id: Uuid::parse_str(TENANT_ID).unwrap(),
        location: "westus2".to_string(),
        authority_host: Url::parse("https://login.microsoftonline.com/").unwrap(),
        resource_manager: Url::parse("https://management.azure.com/").unwrap(),
        auth_timeout: Duration::from_secs(900),
        operation_timeout: Duration::from_secs(60),
        debug: true,
    }
}

/// A credential valid for an hour.
pub fn fresh_credential() -> Credential {
    Credential::expiring_in("test-token", 3600)
}

/// Echo a resource group back the way Resource Manager does.
pub fn group_named(name: &str, location: &str) -> ResourceGroup {
    ResourceGroup {
        name: name.to_string(),
        location: location.to_string(),
        id: format!("/subscriptions/{}/resourceGroups/{}", SUBSCRIPTION_ID, name),
    }
}

pub fn interface_named(resource_group: &str, name: &str) -> NetworkInterface {
    NetworkInterface {
        name: name.to_string(),
        resource_group: resource_group.to_string(),
        id: format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/networkInterfaces/{}",
            SUBSCRIPTION_ID, resource_group, name
        ),
        provisioning_state: Some("Succeeded".to_string()),
    }
}

pub fn vm_named(resource_group: &str, name: &str) -> VirtualMachine {
    VirtualMachine {
        name: name.to_string(),
        resource_group: resource_group.to_string(),
        id: format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Compute/virtualMachines/{}",
            SUBSCRIPTION_ID, resource_group, name
        ),
        vm_size: Some("Basic_A0".to_string()),
        computer_name: Some(name.to_string()),
        admin_username: Some("admin".to_string()),
        network_interface_ids: vec![],
        provisioning_state: Some("Succeeded".to_string()),
        power_state: Some("running".to_string()),
    }
}

/// ARM error envelope.
pub fn arm_error(code: &str, message: &str) -> Value {
    json!({ "error": { "code": code, "message": message } })
}

/// Device authorization response.
pub fn device_code_body(interval: u64, expires_in: u64) -> Value {
    json!({
        "device_code": "device-code-123",
        "user_code": "ABCD-EFGH",
        "verification_uri": "https://microsoft.com/devicelogin",
        "expires_in": expires_in,
        "interval": interval,
        "message": "To sign in, use a web browser to open the page https://microsoft.com/devicelogin and enter the code ABCD-EFGH to authenticate."
    })
}

/// Successful token response.
pub fn token_body() -> Value {
    json!({
        "token_type": "Bearer",
        "access_token": "issued-token",
        "expires_in": 3599,
        "scope": "https://management.azure.com/.default"
    })
}

/// OAuth error response from the token endpoint.
pub fn oauth_error(code: &str) -> Value {
    json!({ "error": code, "error_description": format!("{} (test)", code) })
}
