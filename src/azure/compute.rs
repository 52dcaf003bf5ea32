//! Virtual machine operations.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::client::ArmClient;
use super::error::ProvisionResult;
use super::models::{VirtualMachine, VirtualMachineSpec};
use super::ComputeService;

/// API version for `Microsoft.Compute/virtualMachines`.
pub const COMPUTE_API_VERSION: &str = "2023-09-01";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardwareProfile {
    #[serde(default)]
    vm_size: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OsProfileBody {
    #[serde(default)]
    computer_name: Option<String>,
    #[serde(default)]
    admin_username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NetworkInterfaceReference {
    id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetworkProfile {
    #[serde(default)]
    network_interfaces: Vec<NetworkInterfaceReference>,
}

#[derive(Debug, Deserialize)]
struct InstanceViewStatus {
    #[serde(default)]
    code: String,
}

#[derive(Debug, Default, Deserialize)]
struct InstanceView {
    #[serde(default)]
    statuses: Vec<InstanceViewStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VmProperties {
    #[serde(default)]
    hardware_profile: HardwareProfile,
    #[serde(default)]
    os_profile: OsProfileBody,
    #[serde(default)]
    network_profile: NetworkProfile,
    #[serde(default)]
    provisioning_state: Option<String>,
    #[serde(default)]
    instance_view: Option<InstanceView>,
}

#[derive(Debug, Deserialize)]
struct VmBody {
    #[serde(default)]
    id: String,
    name: String,
    #[serde(default)]
    properties: VmProperties,
}

impl VmBody {
    fn into_vm(self, resource_group: &str) -> VirtualMachine {
        let props = self.properties;
        let power_state = props.instance_view.as_ref().and_then(|view| {
            view.statuses
                .iter()
                .find_map(|status| status.code.strip_prefix("PowerState/"))
                .map(str::to_string)
        });

        VirtualMachine {
            name: self.name,
            resource_group: resource_group.to_string(),
            id: self.id,
            vm_size: props.hardware_profile.vm_size,
            computer_name: props.os_profile.computer_name,
            admin_username: props.os_profile.admin_username,
            network_interface_ids: props
                .network_profile
                .network_interfaces
                .into_iter()
                .map(|nic| nic.id)
                .collect(),
            provisioning_state: props.provisioning_state,
            power_state,
        }
    }
}

/// Request body for a create-or-update call.
fn vm_body(spec: &VirtualMachineSpec) -> Value {
    let network_interfaces: Vec<Value> = spec
        .network_interface_ids
        .iter()
        .map(|id| json!({ "id": id }))
        .collect();

    json!({
        "location": spec.location,
        "properties": {
            "hardwareProfile": { "vmSize": spec.vm_size },
            "storageProfile": {
                "imageReference": {
                    "publisher": spec.image.publisher,
                    "offer": spec.image.offer,
                    "sku": spec.image.sku,
                    "version": spec.image.version,
                }
            },
            "osProfile": {
                "computerName": spec.os_profile.computer_name,
                "adminUsername": spec.os_profile.admin_username,
                "adminPassword": spec.os_profile.admin_password,
                "linuxConfiguration": {
                    "disablePasswordAuthentication": spec.os_profile.disable_password_authentication,
                },
            },
            "networkProfile": { "networkInterfaces": network_interfaces },
        }
    })
}

/// [`ComputeService`] backed by Resource Manager.
#[derive(Debug, Clone)]
pub struct ArmVirtualMachines {
    client: Arc<ArmClient>,
}

impl ArmVirtualMachines {
    pub fn new(client: Arc<ArmClient>) -> Self {
        Self { client }
    }

    fn vm_url(&self, resource_group: &str, name: &str) -> ProvisionResult<url::Url> {
        self.client.subscription_url(
            &format!(
                "resourceGroups/{}/providers/Microsoft.Compute/virtualMachines/{}",
                resource_group, name
            ),
            COMPUTE_API_VERSION,
        )
    }
}

#[async_trait]
impl ComputeService for ArmVirtualMachines {
    async fn create_or_update_vm(
        &self,
        resource_group: &str,
        spec: &VirtualMachineSpec,
        cancel: &CancellationToken,
    ) -> ProvisionResult<()> {
        let url = self.vm_url(resource_group, &spec.name)?;
        self.client
            .put_and_wait(url, &vm_body(spec), "virtual machine creation", cancel)
            .await?;
        Ok(())
    }

    async fn get_vm(&self, resource_group: &str, name: &str) -> ProvisionResult<VirtualMachine> {
        let mut url = self.vm_url(resource_group, name)?;
        url.query_pairs_mut().append_pair("$expand", "instanceView");
        let body: VmBody = self.client.get_json(url).await?;
        Ok(body.into_vm(resource_group))
    }
}
