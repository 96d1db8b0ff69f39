//! Configuration types for doddns
//!
//! This module defines all configuration structures used throughout the workspace.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default "what is my IP" services, tried in order
pub const DEFAULT_IP_SERVICES: &[&str] = &[
    "https://ifconfig.co/",
    "https://ifconfig.me/",
    "https://ifconfig.io/",
];

/// Lowest TTL DigitalOcean accepts for a record
pub const MIN_RECORD_TTL: u32 = 30;

/// Main doddns configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Fully-qualified hostname to keep pointed at this machine
    pub hostname: String,

    /// IP lookup configuration
    #[serde(default)]
    pub ip_lookup: IpLookupConfig,

    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DdnsConfig {
    /// Create a new configuration with default lookup and engine settings
    pub fn new(hostname: impl Into<String>, provider: ProviderConfig) -> Self {
        Self {
            hostname: hostname.into(),
            ip_lookup: IpLookupConfig::default(),
            provider,
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        crate::resolver::normalize_hostname(&self.hostname)?;

        self.provider.validate()?;
        self.ip_lookup.validate()?;
        self.engine.validate()?;

        Ok(())
    }
}

/// IP lookup configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpLookupConfig {
    /// Services returning the caller's IP as a plain-text body, tried in order
    #[serde(default = "default_services")]
    pub services: Vec<String>,

    /// Per-request timeout (in seconds)
    #[serde(default = "default_lookup_timeout_secs")]
    pub timeout_secs: u64,
}

impl IpLookupConfig {
    /// Validate the IP lookup configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.services.is_empty() {
            return Err(crate::Error::config(
                "At least one IP lookup service is required",
            ));
        }

        for service in &self.services {
            let url = url::Url::parse(service).map_err(|e| {
                crate::Error::config(format!("Invalid IP lookup service URL '{}': {}", service, e))
            })?;

            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(crate::Error::config(format!(
                    "IP lookup service URL must use HTTP or HTTPS scheme. Got: {}",
                    service
                )));
            }
        }

        if self.timeout_secs == 0 {
            return Err(crate::Error::config("IP lookup timeout must be > 0"));
        }

        Ok(())
    }

    /// Per-request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for IpLookupConfig {
    fn default() -> Self {
        Self {
            services: default_services(),
            timeout_secs: default_lookup_timeout_secs(),
        }
    }
}

/// DNS provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// DigitalOcean provider
    #[serde(rename = "digitalocean")]
    DigitalOcean {
        /// DigitalOcean personal access token
        api_token: String,
        /// API endpoint override (defaults to the public v2 API)
        #[serde(default)]
        api_base: Option<String>,
    },
}

impl ProviderConfig {
    /// Create a DigitalOcean provider configuration for the public API
    pub fn digitalocean(api_token: impl Into<String>) -> Self {
        ProviderConfig::DigitalOcean {
            api_token: api_token.into(),
            api_base: None,
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::DigitalOcean { api_token, api_base } => {
                if api_token.trim().is_empty() {
                    return Err(crate::Error::config(
                        "DigitalOcean API token cannot be empty",
                    ));
                }
                if let Some(base) = api_base {
                    url::Url::parse(base).map_err(|e| {
                        crate::Error::config(format!("Invalid API base URL '{}': {}", base, e))
                    })?;
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::DigitalOcean { .. } => "digitalocean",
        }
    }
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::DigitalOcean { api_base, .. } => f
                .debug_struct("DigitalOcean")
                .field("api_token", &"<REDACTED>")
                .field("api_base", api_base)
                .finish(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Interval between IP checks (in seconds)
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,

    /// TTL to publish on the managed records
    #[serde(default = "default_ttl")]
    pub ttl: u32,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.check_interval_secs == 0 {
            return Err(crate::Error::config("Check interval must be > 0"));
        }

        if self.ttl < MIN_RECORD_TTL {
            return Err(crate::Error::config(format!(
                "Record TTL must be at least {} seconds. Got: {}",
                MIN_RECORD_TTL, self.ttl
            )));
        }

        Ok(())
    }

    /// Check interval as a [`Duration`]
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval_secs(),
            ttl: default_ttl(),
        }
    }
}

fn default_services() -> Vec<String> {
    DEFAULT_IP_SERVICES.iter().map(|s| s.to_string()).collect()
}

fn default_lookup_timeout_secs() -> u64 {
    10
}

fn default_check_interval_secs() -> u64 {
    60
}

fn default_ttl() -> u32 {
    300
}
