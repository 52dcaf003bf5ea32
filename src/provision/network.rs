//! Network interface provisioning.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::{unique_name, NETWORK_INTERFACE_PREFIX};
use crate::azure::{
    IpConfigurationSpec, NetworkInterface, NetworkInterfaceSpec, NetworkService, ProvisionResult,
    ResourceGroup,
};
use crate::report::Reporter;

/// Name of the single IP configuration slot.
pub const IP_CONFIGURATION_NAME: &str = "ipconfig1";

/// Creates the network interface the VM attaches to.
pub struct NetworkProvisioner {
    service: Arc<dyn NetworkService>,
    reporter: Arc<dyn Reporter>,
}

impl NetworkProvisioner {
    pub fn new(service: Arc<dyn NetworkService>, reporter: Arc<dyn Reporter>) -> Self {
        Self { service, reporter }
    }

    /// Create an interface in `group` and fetch it back by name.
    pub async fn create(
        &self,
        group: &ResourceGroup,
        cancel: &CancellationToken,
    ) -> ProvisionResult<NetworkInterface> {
        let spec = NetworkInterfaceSpec {
            name: unique_name(NETWORK_INTERFACE_PREFIX),
            location: group.location.clone(),
            ip_configurations: vec![IpConfigurationSpec {
                name: IP_CONFIGURATION_NAME.to_string(),
            }],
        };

        self.service
            .create_or_update_interface(&group.name, &spec, cancel)
            .await
            .map_err(|e| e.context(format!("could not create network interface '{}'", spec.name)))?;

        let nic = self
            .service
            .get_interface(&group.name, &spec.name)
            .await
            .map_err(|e| e.context(format!("could not fetch network interface '{}'", spec.name)))?;

        self.reporter
            .debug(&format!("Created Network Interface: {}", nic.name));
        Ok(nic)
    }
}
