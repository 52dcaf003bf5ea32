//! Resource group provisioning and cleanup.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::{unique_name, RESOURCE_GROUP_PREFIX};
use crate::azure::{ProvisionResult, ResourceGroup, ResourceGroupService};
use crate::report::Reporter;

/// Creates the resource group every other resource lives in.
pub struct ResourceGroupProvisioner {
    service: Arc<dyn ResourceGroupService>,
    location: String,
    reporter: Arc<dyn Reporter>,
}

impl ResourceGroupProvisioner {
    pub fn new(
        service: Arc<dyn ResourceGroupService>,
        location: impl Into<String>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            service,
            location: location.into(),
            reporter,
        }
    }

    /// Create a uniquely named group.
    ///
    /// The returned lease must be released once the caller is done with the
    /// group. If the wait for creation is cut short the group may exist
    /// anyway, so its deletion is requested before the error is returned.
    pub async fn create(&self, cancel: &CancellationToken) -> ProvisionResult<ResourceGroupLease> {
        let name = unique_name(RESOURCE_GROUP_PREFIX);
        let group = match self
            .service
            .create_or_update(&name, &self.location, cancel)
            .await
        {
            Ok(group) => group,
            Err(e) => {
                if e.is_interrupted_wait() {
                    delete_group(self.service.as_ref(), self.reporter.as_ref(), &name).await;
                }
                return Err(e.context(format!("could not create resource group '{}'", name)));
            }
        };

        self.reporter
            .status(&format!("Created Resource Group: {}", group.name));

        Ok(ResourceGroupLease {
            group,
            service: Arc::clone(&self.service),
            reporter: Arc::clone(&self.reporter),
            released: false,
        })
    }
}

/// A created resource group that still has to be deleted.
pub struct ResourceGroupLease {
    group: ResourceGroup,
    service: Arc<dyn ResourceGroupService>,
    reporter: Arc<dyn Reporter>,
    released: bool,
}

impl ResourceGroupLease {
    /// The leased group.
    pub fn group(&self) -> &ResourceGroup {
        &self.group
    }

    /// Delete the group. Failures are reported as warnings and never returned.
    pub async fn release(mut self) {
        self.released = true;
        delete_group(self.service.as_ref(), self.reporter.as_ref(), &self.group.name).await;
    }
}

impl Drop for ResourceGroupLease {
    fn drop(&mut self) {
        if !self.released {
            self.reporter.warn(&format!(
                "Resource group {} was never released and may still exist",
                self.group.name
            ));
        }
    }
}

async fn delete_group(service: &dyn ResourceGroupService, reporter: &dyn Reporter, name: &str) {
    reporter.debug(&format!("Deleting resource group: {}", name));
    match service.delete(name).await {
        Ok(()) => reporter.status(&format!("Requested deletion of resource group: {}", name)),
        Err(e) => reporter.warn(&format!(
            "Could not delete resource group {}, remove it manually: {}",
            name, e
        )),
    }
}

impl std::fmt::Debug for ResourceGroupLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceGroupLease")
            .field("group", &self.group)
            .field("released", &self.released)
            .finish()
    }
}
