//! Step-level provisioners.
//!
//! Each provisioner generates a unique name for the resource it owns, calls
//! the matching service and reports progress. Ordering between steps is
//! enforced by types: the network and compute provisioners need a
//! [`ResourceGroup`](crate::azure::ResourceGroup), which only a
//! [`ResourceGroupLease`] hands out.

pub mod compute;
pub mod network;
pub mod resource_group;

pub use compute::{ComputeProvisioner, VmProfile};
pub use network::NetworkProvisioner;
pub use resource_group::{ResourceGroupLease, ResourceGroupProvisioner};

use uuid::Uuid;

/// Prefix of generated resource group names.
pub const RESOURCE_GROUP_PREFIX: &str = "sample-rg";
/// Prefix of generated network interface names.
pub const NETWORK_INTERFACE_PREFIX: &str = "sample-nic";
/// Prefix of generated virtual machine names.
pub const VIRTUAL_MACHINE_PREFIX: &str = "sample-vm";

/// `prefix` followed by a fresh v4 UUID as 32 lowercase hex digits.
pub fn unique_name(prefix: &str) -> String {
    format!("{}{}", prefix, Uuid::new_v4().simple())
}
