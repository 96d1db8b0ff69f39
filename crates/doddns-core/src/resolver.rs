//! Hostname → (record name, domain) resolution
//!
//! A hostname such as `a.b.c.d` is split into the longest suffix the DNS
//! provider knows as a domain and the remaining prefix, which becomes the
//! record name inside that domain. Registration is strictly suffix-based, so
//! a greedy walk from the full name towards the TLD is enough.

use crate::error::{Error, Result};
use crate::traits::DnsProvider;
use std::fmt;
use tracing::debug;

/// Maximum hostname length (RFC 1035)
const MAX_HOSTNAME_LEN: usize = 253;

/// Maximum label length (RFC 1035)
const MAX_LABEL_LEN: usize = 63;

/// A hostname split into its record name and registered domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHostname {
    /// Record name relative to `domain` (empty for the zone apex)
    pub record_name: String,
    /// The registered domain
    pub domain: String,
}

impl ResolvedHostname {
    /// The fully-qualified name of the record
    pub fn fqdn(&self) -> String {
        if self.record_name.is_empty() {
            self.domain.clone()
        } else {
            format!("{}.{}", self.record_name, self.domain)
        }
    }

    /// Whether the hostname is the domain itself
    pub fn is_apex(&self) -> bool {
        self.record_name.is_empty()
    }
}

impl fmt::Display for ResolvedHostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] in domain [{}]", self.record_name, self.domain)
    }
}

/// Validate a hostname and bring it into canonical form
///
/// Accepts one trailing dot and lowercases the name. Labels must be 1-63
/// characters of ASCII alphanumerics and hyphens, without a leading or
/// trailing hyphen.
pub fn normalize_hostname(hostname: &str) -> Result<String> {
    let trimmed = hostname.trim();
    let name = trimmed.strip_suffix('.').unwrap_or(trimmed);

    if name.is_empty() {
        return Err(Error::config("Hostname cannot be empty"));
    }

    if name.len() > MAX_HOSTNAME_LEN {
        return Err(Error::config(format!(
            "Hostname too long: {} chars (max {}). Got: {}",
            name.len(),
            MAX_HOSTNAME_LEN,
            name
        )));
    }

    for label in name.split('.') {
        if label.is_empty() {
            return Err(Error::config(format!("Hostname has empty label: '{}'", name)));
        }

        if label.len() > MAX_LABEL_LEN {
            return Err(Error::config(format!(
                "Hostname label too long: {} chars (max {}). Label: '{}'",
                label.len(),
                MAX_LABEL_LEN,
                label
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(Error::config(format!(
                "Hostname label contains invalid characters. Label: '{}'. \
                Valid: alphanumeric and hyphen only.",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(Error::config(format!(
                "Hostname label cannot start or end with hyphen. Label: '{}'",
                label
            )));
        }
    }

    Ok(name.to_ascii_lowercase())
}

/// Find the registered domain for `hostname`
///
/// Tries the full hostname first, then drops the leftmost label on every
/// miss, moving it onto the record name. Only a "does not exist" answer from
/// the provider continues the walk; any other provider error is returned
/// as-is.
///
/// # Returns
///
/// - `Ok(ResolvedHostname)`: the longest registered suffix and its prefix
/// - `Err(Error::NotFound)`: no suffix of the hostname is registered
pub async fn resolve_hostname(
    provider: &dyn DnsProvider,
    hostname: &str,
) -> Result<ResolvedHostname> {
    let hostname = normalize_hostname(hostname)?;
    let labels: Vec<&str> = hostname.split('.').collect();

    for split in 0..labels.len() {
        let candidate = labels[split..].join(".");
        debug!("Checking whether [{}] is a registered domain", candidate);

        if let Some(domain) = provider.get_domain(&candidate).await? {
            return Ok(ResolvedHostname {
                record_name: labels[..split].join("."),
                domain: domain.name,
            });
        }
    }

    Err(Error::not_found(format!(
        "domain for requested hostname [{}] was not found",
        hostname
    )))
}
