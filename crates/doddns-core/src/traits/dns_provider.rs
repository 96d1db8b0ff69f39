// # DNS Provider Trait
//
// Defines the capability interface the engine needs from a DNS provider.
//
// ## Implementations
//
// - DigitalOcean: `doddns-provider-digitalocean` crate
//
// ## Usage
//
// ```rust,ignore
// use doddns_core::traits::{DnsProvider, RecordRequest, RecordType};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     if provider.get_domain("example.com").await?.is_some() {
//         let records = provider
//             .list_records("example.com", RecordType::A, "home.example.com")
//             .await?;
//         println!("{} A record(s)", records.len());
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::fmt;
use std::net::IpAddr;

/// Address record type managed by doddns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// IPv6 address record
    Aaaa,
}

impl RecordType {
    /// The record type that publishes the given address
    pub fn for_ip(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => RecordType::A,
            IpAddr::V6(_) => RecordType::Aaaa,
        }
    }

    /// Wire name of the record type
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A domain (zone) registered with the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    /// The domain name (e.g., "example.com")
    pub name: String,
}

/// An A or AAAA record as published by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsRecord {
    /// The record ID (provider-specific)
    pub id: String,
    /// A or AAAA
    pub record_type: RecordType,
    /// The record name, relative to its domain (empty for the apex)
    pub name: String,
    /// The published IP address
    pub ip: IpAddr,
    /// Time-to-live for the record
    pub ttl: u32,
}

impl DnsRecord {
    /// Whether the record already publishes `ip` with `ttl`
    pub fn matches(&self, ip: IpAddr, ttl: u32) -> bool {
        self.ip == ip && self.ttl == ttl
    }
}

/// Desired contents of a record, used for both create and edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRequest {
    /// A or AAAA
    pub record_type: RecordType,
    /// The record name, relative to its domain (empty for the apex)
    pub name: String,
    /// The IP address to publish
    pub ip: IpAddr,
    /// Time-to-live for the record
    pub ttl: u32,
}

impl RecordRequest {
    /// Build a request whose type follows the address family of `ip`
    pub fn new(name: impl Into<String>, ip: IpAddr, ttl: u32) -> Self {
        Self {
            record_type: RecordType::for_ip(&ip),
            name: name.into(),
            ip,
            ttl,
        }
    }
}

/// Result of reconciling one record against an observed IP
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateResult {
    /// Record was edited in place
    Updated {
        /// The previous IP address
        previous_ip: IpAddr,
        /// The new IP address
        new_ip: IpAddr,
    },
    /// Record already had the correct IP and TTL (no provider call)
    Unchanged {
        /// The current IP address
        current_ip: IpAddr,
    },
    /// Record was created (didn't exist before)
    Created {
        /// The created IP address
        new_ip: IpAddr,
    },
}

/// Trait for DNS provider implementations
///
/// The four operations are the whole surface the engine relies on. Each call
/// maps to a single provider API request; implementations do not retry,
/// cache, or decide whether an update is needed. That policy belongs to
/// [`crate::DdnsEngine`].
///
/// # Security
///
/// Implementations must never log their API credentials.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Look up a domain by name
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Domain))`: the provider manages this domain
    /// - `Ok(None)`: the provider reports the domain does not exist
    /// - `Err(Error)`: any other failure
    async fn get_domain(&self, name: &str) -> Result<Option<Domain>, crate::Error>;

    /// List records of one type for a fully-qualified name within a domain
    ///
    /// # Parameters
    ///
    /// - `domain`: the domain the records live in (e.g., "example.com")
    /// - `record_type`: A or AAAA
    /// - `fqdn`: fully-qualified record name (e.g., "home.example.com")
    async fn list_records(
        &self,
        domain: &str,
        record_type: RecordType,
        fqdn: &str,
    ) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Create a record in `domain`
    async fn create_record(
        &self,
        domain: &str,
        request: &RecordRequest,
    ) -> Result<DnsRecord, crate::Error>;

    /// Edit the record identified by `record_id` in `domain`
    async fn update_record(
        &self,
        domain: &str,
        record_id: &str,
        request: &RecordRequest,
    ) -> Result<DnsRecord, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
