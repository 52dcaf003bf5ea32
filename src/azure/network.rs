//! Network interface operations.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::client::ArmClient;
use super::error::{ProvisionError, ProvisionResult};
use super::models::{NetworkInterface, NetworkInterfaceSpec};
use super::NetworkService;

/// API version for `Microsoft.Network/networkInterfaces`.
pub const NETWORK_API_VERSION: &str = "2023-09-01";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InterfaceProperties {
    #[serde(default)]
    provisioning_state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InterfaceBody {
    #[serde(default)]
    id: String,
    name: String,
    #[serde(default)]
    properties: Option<InterfaceProperties>,
}

impl InterfaceBody {
    fn into_interface(self, resource_group: &str) -> NetworkInterface {
        NetworkInterface {
            name: self.name,
            resource_group: resource_group.to_string(),
            id: self.id,
            provisioning_state: self.properties.and_then(|p| p.provisioning_state),
        }
    }
}

/// Request body for a create-or-update call.
fn interface_body(spec: &NetworkInterfaceSpec) -> Value {
    let ip_configurations: Vec<Value> = spec
        .ip_configurations
        .iter()
        .map(|config| json!({ "name": config.name, "properties": {} }))
        .collect();

    json!({
        "location": spec.location,
        "properties": { "ipConfigurations": ip_configurations },
    })
}

/// [`NetworkService`] backed by Resource Manager.
#[derive(Debug, Clone)]
pub struct ArmNetworkInterfaces {
    client: Arc<ArmClient>,
}

impl ArmNetworkInterfaces {
    pub fn new(client: Arc<ArmClient>) -> Self {
        Self { client }
    }

    fn interface_url(&self, resource_group: &str, name: &str) -> ProvisionResult<url::Url> {
        self.client.subscription_url(
            &format!(
                "resourceGroups/{}/providers/Microsoft.Network/networkInterfaces/{}",
                resource_group, name
            ),
            NETWORK_API_VERSION,
        )
    }
}

#[async_trait]
impl NetworkService for ArmNetworkInterfaces {
    async fn create_or_update_interface(
        &self,
        resource_group: &str,
        spec: &NetworkInterfaceSpec,
        cancel: &CancellationToken,
    ) -> ProvisionResult<NetworkInterface> {
        let url = self.interface_url(resource_group, &spec.name)?;
        let body = self
            .client
            .put_and_wait(url, &interface_body(spec), "network interface creation", cancel)
            .await?;

        if body.is_null() {
            return self.get_interface(resource_group, &spec.name).await;
        }
        let body: InterfaceBody = serde_json::from_value(body)
            .map_err(|e| ProvisionError::InvalidResponse(e.to_string()))?;
        Ok(body.into_interface(resource_group))
    }

    async fn get_interface(
        &self,
        resource_group: &str,
        name: &str,
    ) -> ProvisionResult<NetworkInterface> {
        let url = self.interface_url(resource_group, name)?;
        let body: InterfaceBody = self.client.get_json(url).await?;
        Ok(body.into_interface(resource_group))
    }
}
