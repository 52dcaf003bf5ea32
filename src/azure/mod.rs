//! Azure Resource Manager services.
//!
//! The provisioners only see the three service traits below. [`ArmConnector`]
//! produces the production implementations, all sharing one [`ArmClient`]
//! (and so one HTTP connection pool and one credential).

pub mod client;
pub mod compute;
pub mod error;
pub mod models;
pub mod network;
pub mod resource_groups;

pub use client::{ArmClient, DEFAULT_OPERATION_TIMEOUT_SECS, DEFAULT_RESOURCE_MANAGER};
pub use compute::ArmVirtualMachines;
pub use error::{ProvisionError, ProvisionResult};
pub use models::{
    ImageReference, IpConfigurationSpec, NetworkInterface, NetworkInterfaceSpec, OsProfile,
    ResourceGroup, VirtualMachine, VirtualMachineSpec,
};
pub use network::ArmNetworkInterfaces;
pub use resource_groups::ArmResourceGroups;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;
use uuid::Uuid;

use crate::auth::Credential;

/// Create and delete resource groups.
#[async_trait]
pub trait ResourceGroupService: Send + Sync {
    /// Create the group, or update it if it already exists.
    async fn create_or_update(
        &self,
        name: &str,
        location: &str,
        cancel: &CancellationToken,
    ) -> ProvisionResult<ResourceGroup>;

    /// Start deleting the group and everything in it.
    async fn delete(&self, name: &str) -> ProvisionResult<()>;
}

/// Create and fetch network interfaces.
#[async_trait]
pub trait NetworkService: Send + Sync {
    async fn create_or_update_interface(
        &self,
        resource_group: &str,
        spec: &NetworkInterfaceSpec,
        cancel: &CancellationToken,
    ) -> ProvisionResult<NetworkInterface>;

    async fn get_interface(&self, resource_group: &str, name: &str)
        -> ProvisionResult<NetworkInterface>;
}

/// Create and fetch virtual machines.
#[async_trait]
pub trait ComputeService: Send + Sync {
    /// Create the VM and wait until Resource Manager reports the outcome.
    async fn create_or_update_vm(
        &self,
        resource_group: &str,
        spec: &VirtualMachineSpec,
        cancel: &CancellationToken,
    ) -> ProvisionResult<()>;

    /// Fetch the VM including its instance view.
    async fn get_vm(&self, resource_group: &str, name: &str) -> ProvisionResult<VirtualMachine>;
}

/// The services one run works with.
#[derive(Clone)]
pub struct CloudServices {
    pub groups: Arc<dyn ResourceGroupService>,
    pub network: Arc<dyn NetworkService>,
    pub compute: Arc<dyn ComputeService>,
}

/// Builds [`CloudServices`] for a subscription once a credential exists.
pub trait ServiceConnector: Send + Sync {
    fn connect(&self, subscription_id: &Uuid, credential: &Credential) -> CloudServices;
}

/// Connector for the real Resource Manager endpoint.
#[derive(Debug, Clone)]
pub struct ArmConnector {
    http: reqwest::Client,
    endpoint: Url,
    operation_timeout: Duration,
    poll_interval: Option<Duration>,
}

impl ArmConnector {
    /// Connect to `endpoint`, which must end with a slash.
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            operation_timeout: Duration::from_secs(DEFAULT_OPERATION_TIMEOUT_SECS),
            poll_interval: None,
        }
    }

    pub fn with_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }
}

impl ServiceConnector for ArmConnector {
    fn connect(&self, subscription_id: &Uuid, credential: &Credential) -> CloudServices {
        let mut client = ArmClient::new(
            self.http.clone(),
            self.endpoint.clone(),
            *subscription_id,
            credential.clone(),
        )
        .with_operation_timeout(self.operation_timeout);
        if let Some(interval) = self.poll_interval {
            client = client.with_poll_interval(interval);
        }

        let client = Arc::new(client);
        CloudServices {
            groups: Arc::new(ArmResourceGroups::new(Arc::clone(&client))),
            network: Arc::new(ArmNetworkInterfaces::new(Arc::clone(&client))),
            compute: Arc::new(ArmVirtualMachines::new(client)),
        }
    }
}
