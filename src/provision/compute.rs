//! Virtual machine provisioning.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::network::NetworkProvisioner;
use super::{unique_name, VIRTUAL_MACHINE_PREFIX};
use crate::azure::{
    ComputeService, ImageReference, OsProfile, ProvisionResult, ResourceGroup, VirtualMachine,
    VirtualMachineSpec,
};
use crate::report::Reporter;

/// Fixed shape of the sample VM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmProfile {
    pub vm_size: String,
    pub admin_username: String,
    pub admin_password: String,
    pub image: ImageReference,
}

impl Default for VmProfile {
    fn default() -> Self {
        Self {
            vm_size: "Basic_A0".to_string(),
            admin_username: "admin".to_string(),
            admin_password: "azureRocksWithGo".to_string(),
            image: ImageReference::default(),
        }
    }
}

impl VmProfile {
    /// Build the request for a VM called `name` attached to `nic_id`.
    pub fn to_spec(&self, name: &str, location: &str, nic_id: &str) -> VirtualMachineSpec {
        VirtualMachineSpec {
            name: name.to_string(),
            location: location.to_string(),
            vm_size: self.vm_size.clone(),
            os_profile: OsProfile {
                computer_name: name.to_string(),
                admin_username: self.admin_username.clone(),
                admin_password: self.admin_password.clone(),
                disable_password_authentication: false,
            },
            image: self.image.clone(),
            network_interface_ids: vec![nic_id.to_string()],
        }
    }
}

/// Creates the VM, along with the network interface it needs.
pub struct ComputeProvisioner {
    service: Arc<dyn ComputeService>,
    network: NetworkProvisioner,
    profile: VmProfile,
    reporter: Arc<dyn Reporter>,
}

impl ComputeProvisioner {
    pub fn new(
        service: Arc<dyn ComputeService>,
        network: NetworkProvisioner,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            service,
            network,
            profile: VmProfile::default(),
            reporter,
        }
    }

    /// Create a network interface, then a VM on it, then fetch the VM with
    /// its instance view. A network failure stops before the VM is requested.
    pub async fn create(
        &self,
        group: &ResourceGroup,
        cancel: &CancellationToken,
    ) -> ProvisionResult<VirtualMachine> {
        let nic = self.network.create(group, cancel).await?;

        let name = unique_name(VIRTUAL_MACHINE_PREFIX);
        let spec = self.profile.to_spec(&name, &group.location, &nic.id);
        self.reporter
            .debug(&format!("Creating Virtual Machine: {} ({})", name, spec.vm_size));

        self.service
            .create_or_update_vm(&group.name, &spec, cancel)
            .await
            .map_err(|e| e.context(format!("could not create virtual machine '{}'", name)))?;

        let vm = self
            .service
            .get_vm(&group.name, &name)
            .await
            .map_err(|e| e.context(format!("could not fetch virtual machine '{}'", name)))?;

        self.reporter
            .status(&format!("Created Virtual Machine: {}", vm.name));
        Ok(vm)
    }
}
