//! Resource types exchanged with the provisioning services.

use std::fmt;

/// A resource group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceGroup {
    /// Group name
    pub name: String,
    /// Azure region
    pub location: String,
    /// Provider-assigned resource id
    pub id: String,
}

/// Requested shape of a network interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInterfaceSpec {
    /// Interface name
    pub name: String,
    /// Azure region
    pub location: String,
    /// IP configuration slots. Empty properties let the provider pick defaults.
    pub ip_configurations: Vec<IpConfigurationSpec>,
}

/// One IP configuration slot on a network interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpConfigurationSpec {
    /// Slot name
    pub name: String,
}

/// A network interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInterface {
    /// Interface name
    pub name: String,
    /// Owning resource group
    pub resource_group: String,
    /// Provider-assigned resource id
    pub id: String,
    /// Provisioning state, when reported
    pub provisioning_state: Option<String>,
}

/// Marketplace image the VM boots from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub publisher: String,
    pub offer: String,
    pub sku: String,
    pub version: String,
}

impl Default for ImageReference {
    fn default() -> Self {
        Self {
            publisher: "Canonical".to_string(),
            offer: "0001-com-ubuntu-server-jammy".to_string(),
            sku: "22_04-lts".to_string(),
            version: "latest".to_string(),
        }
    }
}

/// Linux OS profile of a VM.
#[derive(Clone, PartialEq, Eq)]
pub struct OsProfile {
    /// Hostname inside the VM
    pub computer_name: String,
    /// Administrator account
    pub admin_username: String,
    /// Administrator password
    pub admin_password: String,
    /// Whether password sign-in is disabled
    pub disable_password_authentication: bool,
}

impl fmt::Debug for OsProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OsProfile")
            .field("computer_name", &self.computer_name)
            .field("admin_username", &self.admin_username)
            .field("admin_password", &"<redacted>")
            .field(
                "disable_password_authentication",
                &self.disable_password_authentication,
            )
            .finish()
    }
}

/// Requested shape of a virtual machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualMachineSpec {
    /// VM name
    pub name: String,
    /// Azure region
    pub location: String,
    /// Size class (e.g. `Basic_A0`)
    pub vm_size: String,
    /// OS profile
    pub os_profile: OsProfile,
    /// Boot image
    pub image: ImageReference,
    /// Attached network interface ids
    pub network_interface_ids: Vec<String>,
}

/// A virtual machine as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualMachine {
    /// VM name
    pub name: String,
    /// Owning resource group
    pub resource_group: String,
    /// Provider-assigned resource id
    pub id: String,
    /// Size class
    pub vm_size: Option<String>,
    /// Hostname inside the VM
    pub computer_name: Option<String>,
    /// Administrator account
    pub admin_username: Option<String>,
    /// Attached network interface ids
    pub network_interface_ids: Vec<String>,
    /// Provisioning state (e.g. `Succeeded`)
    pub provisioning_state: Option<String>,
    /// Power state from the instance view (e.g. `running`)
    pub power_state: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_profile_debug_hides_password() {
        let profile = OsProfile {
            computer_name: "vm".to_string(),
            admin_username: "admin".to_string(),
            admin_password: "hunter2".to_string(),
            disable_password_authentication: false,
        };
        let rendered = format!("{:?}", profile);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("admin"));
    }
}
