// # HTTP IP Source
//
// This crate provides the HTTP-based IP source for doddns.
//
// ## Behavior
//
// Each lookup walks an ordered list of "what is my IP" services
// (e.g., ifconfig.co, ifconfig.me) that answer a plain GET with the caller's
// address as the response body. A service that cannot be reached or answers
// with a non-success status is logged and skipped; when every service has
// been skipped the lookup fails.
//
// A service that does answer 2xx is trusted: if its body cannot be read or is
// not an IP address, the lookup fails at once and later services are not
// asked.
//
// No caching happens here: every call to `current()` issues fresh requests.

use doddns_core::config::IpLookupConfig;
use doddns_core::traits::IpSource;
use doddns_core::{Error, Result};

use std::net::IpAddr;
use std::time::Duration;

use tracing::{debug, warn};

/// Default per-request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based IP source with ordered fallback
pub struct HttpIpSource {
    /// Service URLs, tried in order
    services: Vec<String>,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source with the default timeout
    ///
    /// # Parameters
    ///
    /// - `services`: URLs to fetch the IP from, in order of preference
    pub fn new(services: Vec<String>) -> Result<Self> {
        Self::with_timeout(services, DEFAULT_TIMEOUT)
    }

    /// Create a new HTTP IP source with a custom per-request timeout
    pub fn with_timeout(services: Vec<String>, timeout: Duration) -> Result<Self> {
        if services.is_empty() {
            return Err(Error::config("At least one IP lookup service is required"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { services, client })
    }

    /// Create an HTTP IP source from configuration
    pub fn from_config(config: &IpLookupConfig) -> Result<Self> {
        Self::with_timeout(config.services.clone(), config.timeout())
    }

    /// The configured service URLs
    pub fn services(&self) -> &[String] {
        &self.services
    }

    /// Send the lookup request, keeping only 2xx answers
    async fn request(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::http(format!("HTTP error: {}", response.status())));
        }

        Ok(response)
    }
}

/// Parse a lookup service response body into an address
///
/// IPv4-mapped IPv6 answers (`::ffff:a.b.c.d`) come back as plain IPv4.
fn parse_ip(body: &str) -> Result<IpAddr> {
    let ip_text = body.trim();

    let ip: IpAddr = ip_text
        .parse()
        .map_err(|_| Error::invalid_input(format!("Invalid IP address: {:?}", ip_text)))?;

    Ok(match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(ip),
        IpAddr::V4(_) => ip,
    })
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<IpAddr> {
        for url in &self.services {
            let response = match self.request(url).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Failed to get IP from {}: {}", url, e);
                    continue;
                }
            };

            let body = response.text().await.map_err(|e| {
                Error::ip_lookup(format!("Failed to read response from {}: {}", url, e))
            })?;

            let ip = parse_ip(&body)?;
            debug!("Got IP {} from {}", ip, url);
            return Ok(ip);
        }

        Err(Error::ip_lookup(format!(
            "Could not obtain public IP address from any of {} known service(s)",
            self.services.len()
        )))
    }
}
