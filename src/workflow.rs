//! The end-to-end provisioning run.
//!
//! ```text
//! authenticate -> connect -> create resource group -> create NIC -> create VM
//!                                    |                                   |
//!                                    +--------- release (delete) <-------+
//! ```
//!
//! Once the resource group exists its lease is released on every exit path,
//! exactly once.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::auth::Authenticator;
use crate::azure::{ServiceConnector, VirtualMachine};
use crate::config::ProvisionConfig;
use crate::error::Result;
use crate::provision::{ComputeProvisioner, NetworkProvisioner, ResourceGroupProvisioner};
use crate::report::Reporter;

/// Process exit status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
}

impl ExitStatus {
    /// Numeric exit code.
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
        }
    }
}

/// Coordinates authentication and the three provisioning steps.
pub struct ProvisioningWorkflow {
    config: ProvisionConfig,
    authenticator: Arc<dyn Authenticator>,
    connector: Arc<dyn ServiceConnector>,
    reporter: Arc<dyn Reporter>,
}

impl ProvisioningWorkflow {
    pub fn new(
        config: ProvisionConfig,
        authenticator: Arc<dyn Authenticator>,
        connector: Arc<dyn ServiceConnector>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            config,
            authenticator,
            connector,
            reporter,
        }
    }

    /// Run the workflow, reporting the outcome.
    pub async fn run(&self, cancel: &CancellationToken) -> ExitStatus {
        match self.provision(cancel).await {
            Ok(vm) => {
                self.reporter.status(&vm.name);
                ExitStatus::Success
            }
            Err(e) => {
                self.reporter.error(&e.to_string());
                ExitStatus::Failure
            }
        }
    }

    /// Run the workflow and return the created VM.
    ///
    /// The resource group is deleted before this returns, whether or not the
    /// VM was created.
    pub async fn provision(&self, cancel: &CancellationToken) -> Result<VirtualMachine> {
        self.reporter
            .debug(&format!("Using Subscription ID: {}", self.config.subscription_id));
        self.reporter
            .debug(&format!("Using Tenant ID: {}", self.config.tenant_id));

        let credential = self
            .authenticator
            .authenticate(&self.config.tenant_id, cancel)
            .await?;

        let services = self
            .connector
            .connect(&self.config.subscription_id, &credential);

        let lease = ResourceGroupProvisioner::new(
            Arc::clone(&services.groups),
            self.config.location.clone(),
            Arc::clone(&self.reporter),
        )
        .create(cancel)
        .await?;

        let compute = ComputeProvisioner::new(
            Arc::clone(&services.compute),
            NetworkProvisioner::new(Arc::clone(&services.network), Arc::clone(&self.reporter)),
            Arc::clone(&self.reporter),
        );
        let outcome = compute.create(lease.group(), cancel).await;

        lease.release().await;
        Ok(outcome?)
    }
}
