//! Resource group operations.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::client::ArmClient;
use super::error::{ProvisionError, ProvisionResult};
use super::models::ResourceGroup;
use super::ResourceGroupService;

/// API version for `Microsoft.Resources/resourceGroups`.
pub const RESOURCE_GROUPS_API_VERSION: &str = "2021-04-01";

#[derive(Debug, Deserialize)]
struct ResourceGroupBody {
    #[serde(default)]
    id: String,
    name: String,
    location: String,
}

impl From<ResourceGroupBody> for ResourceGroup {
    fn from(body: ResourceGroupBody) -> Self {
        ResourceGroup {
            name: body.name,
            location: body.location,
            id: body.id,
        }
    }
}

/// [`ResourceGroupService`] backed by Resource Manager.
#[derive(Debug, Clone)]
pub struct ArmResourceGroups {
    client: Arc<ArmClient>,
}

impl ArmResourceGroups {
    pub fn new(client: Arc<ArmClient>) -> Self {
        Self { client }
    }

    fn group_url(&self, name: &str) -> ProvisionResult<url::Url> {
        self.client
            .subscription_url(&format!("resourcegroups/{}", name), RESOURCE_GROUPS_API_VERSION)
    }
}

#[async_trait]
impl ResourceGroupService for ArmResourceGroups {
    async fn create_or_update(
        &self,
        name: &str,
        location: &str,
        cancel: &CancellationToken,
    ) -> ProvisionResult<ResourceGroup> {
        let url = self.group_url(name)?;
        let body = self
            .client
            .put_and_wait(
                url.clone(),
                &json!({ "location": location }),
                "resource group creation",
                cancel,
            )
            .await?;

        let body: ResourceGroupBody = if body.is_null() {
            self.client.get_json(url).await?
        } else {
            serde_json::from_value(body)
                .map_err(|e| ProvisionError::InvalidResponse(e.to_string()))?
        };
        Ok(body.into())
    }

    async fn delete(&self, name: &str) -> ProvisionResult<()> {
        let url = self.group_url(name)?;
        self.client.delete(url).await?;
        Ok(())
    }
}
