//! CLI module for arm-vm-sample
//!
//! Flags map one-to-one onto [`ConfigOverrides`]. Values left unset fall
//! back to the settings file and then to the built-in defaults.

use arm_vm_sample::config::ConfigOverrides;
use clap::Parser;
use std::path::PathBuf;

/// Provision a resource group, network interface and virtual machine in
/// Azure, then delete the resource group again.
#[derive(Parser, Debug, Clone)]
#[command(name = "arm-vm-sample")]
#[command(version)]
#[command(about = "Provision a throwaway Azure VM through Resource Manager", long_about = None)]
pub struct Cli {
    /// The subscription that will be targeted
    #[arg(long, env = "AZURE_SUBSCRIPTION_ID", value_name = "UUID")]
    pub subscription: Option<String>,

    /// The tenant that hosts the subscription
    #[arg(long, env = "AZURE_TENANT_ID", value_name = "UUID")]
    pub tenant: Option<String>,

    /// Include debug information in the output
    #[arg(long)]
    pub debug: bool,

    /// Azure region for every resource [default: westus2]
    #[arg(long, env = "AZURE_LOCATION")]
    pub location: Option<String>,

    /// Path to a TOML settings file
    #[arg(short = 'c', long, env = "ARM_VM_SAMPLE_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Identity provider base URL [default: https://login.microsoftonline.com/]
    #[arg(long, env = "AZURE_AUTHORITY_HOST", value_name = "URL")]
    pub authority_host: Option<String>,

    /// Resource Manager base URL [default: https://management.azure.com/]
    #[arg(long, env = "AZURE_RESOURCE_MANAGER_ENDPOINT", value_name = "URL")]
    pub resource_manager: Option<String>,

    /// Seconds to wait for device code sign-in [default: 900]
    #[arg(long, value_name = "SECS")]
    pub auth_timeout: Option<u64>,
}

impl Cli {
    /// Values to merge over the settings file.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            subscription: self.subscription.clone(),
            tenant: self.tenant.clone(),
            location: self.location.clone(),
            authority_host: self.authority_host.clone(),
            resource_manager: self.resource_manager.clone(),
            auth_timeout_secs: self.auth_timeout,
            debug: self.debug,
        }
    }
}
