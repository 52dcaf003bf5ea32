//! # arm-vm-sample
//!
//! Provision a throwaway virtual machine through Azure Resource Manager.
//!
//! A run signs in with the OAuth 2.0 device code flow, creates a uniquely
//! named resource group, a network interface and a VM inside it, and then
//! deletes the resource group again.
//!
//! ## Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────┐
//!                 │   ProvisioningWorkflow   │
//!                 └────────────┬─────────────┘
//!          ┌───────────────────┼────────────────────┐
//!          ▼                   ▼                    ▼
//! ┌─────────────────┐ ┌──────────────────┐ ┌─────────────────┐
//! │  Authenticator  │ │ ServiceConnector │ │    Reporter     │
//! │  (device code)  │ │  (ARM services)  │ │ (tagged output) │
//! └─────────────────┘ └────────┬─────────┘ └─────────────────┘
//!                              ▼
//!          ResourceGroup ──► NetworkInterface ──► VirtualMachine
//! ```
//!
//! Every collaborator sits behind a trait so the workflow can be exercised
//! without network access:
//!
//! ```rust,ignore
//! use arm_vm_sample::prelude::*;
//!
//! let workflow = ProvisioningWorkflow::new(config, authenticator, connector, reporter);
//! let status = workflow.run(&CancellationToken::new()).await;
//! std::process::exit(status.code());
//! ```

/// Commonly used types.
pub mod prelude {
    pub use crate::auth::{Authenticator, Credential, DeviceCodeAuthenticator};
    pub use crate::azure::{
        ArmConnector, CloudServices, ComputeService, NetworkService, ResourceGroupService,
        ServiceConnector,
    };
    pub use crate::config::{ConfigOverrides, ProvisionConfig, Settings};
    pub use crate::error::{ArgumentError, Error, Result};
    pub use crate::report::{MemoryReporter, Reporter, TracingReporter};
    pub use crate::workflow::{ExitStatus, ProvisioningWorkflow};
    pub use tokio_util::sync::CancellationToken;
}

pub mod auth;
pub mod azure;
pub mod config;
mod deadline;
pub mod error;
pub mod provision;
pub mod report;
pub mod telemetry;
pub mod workflow;

pub use error::{Error, Result};
