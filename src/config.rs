//! Configuration for arm-vm-sample
//!
//! A run is configured from three sources, highest precedence first:
//! - Command-line flags and their environment variable fallbacks
//! - An optional TOML settings file (`--config` / `ARM_VM_SAMPLE_CONFIG`)
//! - Built-in defaults
//!
//! Everything is resolved once into a [`ProvisionConfig`] before any remote
//! call is made.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use crate::auth::device_code::DEFAULT_AUTH_TIMEOUT_SECS;
use crate::azure::{DEFAULT_OPERATION_TIMEOUT_SECS, DEFAULT_RESOURCE_MANAGER};
use crate::error::ArgumentError;
use crate::telemetry::LogFormat;

/// Region used when none is configured.
pub const DEFAULT_LOCATION: &str = "westus2";

/// Public cloud identity provider.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com/";

/// Contents of the settings file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Cloud endpoints and placement
    pub cloud: CloudSettings,

    /// Wait limits
    pub timeouts: TimeoutSettings,

    /// Output settings
    pub logging: LoggingSettings,
}

/// `[cloud]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CloudSettings {
    /// Azure region for every resource
    pub location: Option<String>,

    /// Identity provider base URL
    pub authority_host: Option<String>,

    /// Resource Manager base URL
    pub resource_manager: Option<String>,
}

/// `[timeouts]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimeoutSettings {
    /// Upper bound on the device code sign-in wait, in seconds
    pub auth_secs: Option<u64>,

    /// Upper bound on each long-running Resource Manager operation, in seconds
    pub operation_secs: Option<u64>,
}

/// `[logging]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// `tagged` (default) or `json`
    pub format: Option<LogFormat>,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ArgumentError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ArgumentError::Settings {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ArgumentError::Settings {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load settings when a path is given, otherwise use defaults.
    pub fn load(path: Option<&PathBuf>) -> Result<Self, ArgumentError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Log format, defaulting to severity tags.
    pub fn log_format(&self) -> LogFormat {
        self.logging.format.unwrap_or_default()
    }
}

/// Values supplied on the command line or through the environment.
///
/// `None` means "not given", letting the settings file or the default apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub subscription: Option<String>,
    pub tenant: Option<String>,
    pub location: Option<String>,
    pub authority_host: Option<String>,
    pub resource_manager: Option<String>,
    pub auth_timeout_secs: Option<u64>,
    pub debug: bool,
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionConfig {
    pub subscription_id: Uuid,
    pub tenant_id: Uuid,
    pub location: String,
    pub authority_host: Url,
    pub resource_manager: Url,
    pub auth_timeout: Duration,
    pub operation_timeout: Duration,
    pub debug: bool,
}

impl ProvisionConfig {
    /// Merge `overrides` over `settings` and validate the result.
    ///
    /// Every problem is collected so they can all be reported at once.
    pub fn resolve(
        overrides: &ConfigOverrides,
        settings: &Settings,
    ) -> Result<Self, Vec<ArgumentError>> {
        let mut errors = Vec::new();

        let subscription_id = require_uuid(
            overrides.subscription.as_deref(),
            "Subscription ID",
            "subscription",
            "AZURE_SUBSCRIPTION_ID",
            &mut errors,
        );
        let tenant_id = require_uuid(
            overrides.tenant.as_deref(),
            "Tenant ID",
            "tenant",
            "AZURE_TENANT_ID",
            &mut errors,
        );

        let authority_host = endpoint(
            "authority host",
            overrides
                .authority_host
                .as_deref()
                .or(settings.cloud.authority_host.as_deref())
                .unwrap_or(DEFAULT_AUTHORITY_HOST),
            &mut errors,
        );
        let resource_manager = endpoint(
            "resource manager",
            overrides
                .resource_manager
                .as_deref()
                .or(settings.cloud.resource_manager.as_deref())
                .unwrap_or(DEFAULT_RESOURCE_MANAGER),
            &mut errors,
        );

        let location = overrides
            .location
            .clone()
            .or_else(|| settings.cloud.location.clone())
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

        let auth_secs = overrides
            .auth_timeout_secs
            .or(settings.timeouts.auth_secs)
            .unwrap_or(DEFAULT_AUTH_TIMEOUT_SECS);
        let operation_secs = settings
            .timeouts
            .operation_secs
            .unwrap_or(DEFAULT_OPERATION_TIMEOUT_SECS);

        match (subscription_id, tenant_id, authority_host, resource_manager) {
            (Some(subscription_id), Some(tenant_id), Some(authority_host), Some(resource_manager))
                if errors.is_empty() =>
            {
                Ok(Self {
                    subscription_id,
                    tenant_id,
                    location,
                    authority_host,
                    resource_manager,
                    auth_timeout: Duration::from_secs(auth_secs),
                    operation_timeout: Duration::from_secs(operation_secs),
                    debug: overrides.debug,
                })
            }
            _ => Err(errors),
        }
    }
}

fn require_uuid(
    raw: Option<&str>,
    name: &'static str,
    flag: &'static str,
    env_var: &'static str,
    errors: &mut Vec<ArgumentError>,
) -> Option<Uuid> {
    let raw = match raw.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => {
            errors.push(ArgumentError::Missing {
                name,
                flag,
                env_var,
            });
            return None;
        }
    };

    match Uuid::parse_str(raw) {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push(ArgumentError::NotAUuid {
                name,
                raw: raw.to_string(),
            });
            None
        }
    }
}

/// Parse an absolute http(s) URL. A trailing slash is added so relative
/// paths join under it.
fn endpoint(name: &'static str, raw: &str, errors: &mut Vec<ArgumentError>) -> Option<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };

    let invalid = |message: String| ArgumentError::InvalidEndpoint {
        name,
        raw: raw.to_string(),
        message,
    };

    match Url::parse(&normalized) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        Ok(url) => {
            errors.push(invalid(format!("unsupported scheme '{}'", url.scheme())));
            None
        }
        Err(e) => {
            errors.push(invalid(e.to_string()));
            None
        }
    }
}
