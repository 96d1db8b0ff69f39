//! Test doubles and common utilities for engine contract tests
//!
//! These stand-ins implement the core traits in memory and record every
//! provider call so tests can assert exactly what the engine asked for.

#![allow(dead_code)]

use doddns_core::config::{DdnsConfig, EngineConfig, ProviderConfig};
use doddns_core::error::{Error, Result};
use doddns_core::traits::{DnsProvider, DnsRecord, Domain, IpSource, RecordRequest, RecordType};
use std::collections::{HashSet, VecDeque};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An IpSource that plays back a fixed script of lookups
///
/// `None` entries fail the lookup. Once the script runs out, the last entry
/// is repeated.
pub struct ScriptedIpSource {
    script: Mutex<VecDeque<Option<IpAddr>>>,
    last: Mutex<Option<IpAddr>>,
    call_count: Arc<AtomicUsize>,
    /// Error returned by failing entries
    failure: fn() -> Error,
}

impl ScriptedIpSource {
    pub fn new(script: Vec<Option<IpAddr>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            call_count: Arc::new(AtomicUsize::new(0)),
            failure: || Error::ip_lookup("all lookup services failed"),
        }
    }

    /// A source that always answers with `ip`
    pub fn fixed(ip: IpAddr) -> Self {
        Self::new(vec![Some(ip)])
    }

    /// A source whose every lookup fails
    pub fn failing() -> Self {
        Self::new(vec![None])
    }

    /// A source whose service answers with something that is not an address
    pub fn unparseable() -> Self {
        Self {
            failure: || Error::invalid_input("Invalid IP address: \"<html>captive portal</html>\""),
            ..Self::failing()
        }
    }

    /// Shared handle to the number of lookups performed
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.call_count)
    }
}

#[async_trait::async_trait]
impl IpSource for ScriptedIpSource {
    async fn current(&self) -> Result<IpAddr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let next = self.script.lock().unwrap().pop_front();
        let answer = match next {
            Some(answer) => {
                *self.last.lock().unwrap() = answer;
                answer
            }
            None => *self.last.lock().unwrap(),
        };

        answer.ok_or_else(self.failure)
    }
}

/// A call made against [`MockDnsProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    GetDomain(String),
    ListRecords {
        domain: String,
        record_type: RecordType,
        fqdn: String,
    },
    Create {
        domain: String,
        request: RecordRequest,
    },
    Update {
        domain: String,
        record_id: String,
        request: RecordRequest,
    },
}

impl ProviderCall {
    /// Whether the call changes provider state
    pub fn is_write(&self) -> bool {
        matches!(self, ProviderCall::Create { .. } | ProviderCall::Update { .. })
    }
}

/// An in-memory DnsProvider that records every call
pub struct MockDnsProvider {
    /// Domains the provider knows about
    domains: Arc<Mutex<HashSet<String>>>,
    /// Records as (domain, fqdn, record)
    records: Arc<Mutex<Vec<(String, String, DnsRecord)>>>,
    /// Every call in order
    calls: Arc<Mutex<Vec<ProviderCall>>>,
    /// Next id handed out by create_record
    next_id: Arc<AtomicUsize>,
    /// When set, get_domain fails for this name with a non-"not found" error
    failing_domain: Option<String>,
}

impl MockDnsProvider {
    pub fn new(domains: &[&str]) -> Self {
        Self {
            domains: Arc::new(Mutex::new(domains.iter().map(|d| d.to_string()).collect())),
            records: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicUsize::new(1000)),
            failing_domain: None,
        }
    }

    /// Make get_domain fail with a provider error for `name`
    pub fn with_failing_domain(mut self, name: &str) -> Self {
        self.failing_domain = Some(name.to_string());
        self
    }

    /// Seed an existing record
    pub fn with_record(
        self,
        domain: &str,
        record_name: &str,
        id: &str,
        ip: IpAddr,
        ttl: u32,
    ) -> Self {
        let fqdn = if record_name.is_empty() {
            domain.to_string()
        } else {
            format!("{}.{}", record_name, domain)
        };

        self.records.lock().unwrap().push((
            domain.to_string(),
            fqdn,
            DnsRecord {
                id: id.to_string(),
                record_type: RecordType::for_ip(&ip),
                name: record_name.to_string(),
                ip,
                ttl,
            },
        ));
        self
    }

    /// Create a new MockDnsProvider that shares state with an existing one
    pub fn sharing_state_with(other: &Self) -> Self {
        Self {
            domains: Arc::clone(&other.domains),
            records: Arc::clone(&other.records),
            calls: Arc::clone(&other.calls),
            next_id: Arc::clone(&other.next_id),
            failing_domain: other.failing_domain.clone(),
        }
    }

    /// Every call made so far
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Only the create/update calls made so far
    pub fn writes(&self) -> Vec<ProviderCall> {
        self.calls().into_iter().filter(ProviderCall::is_write).collect()
    }

    /// Names passed to get_domain, in order
    pub fn domain_lookups(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ProviderCall::GetDomain(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    /// Current records of one type
    pub fn records_of(&self, record_type: RecordType) -> Vec<DnsRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, _, r)| r.record_type == record_type)
            .map(|(_, _, r)| r.clone())
            .collect()
    }

    fn record(&self, call: ProviderCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn get_domain(&self, name: &str) -> Result<Option<Domain>> {
        self.record(ProviderCall::GetDomain(name.to_string()));

        if self.failing_domain.as_deref() == Some(name) {
            return Err(Error::provider("mock", "Unauthorized"));
        }

        Ok(self
            .domains
            .lock()
            .unwrap()
            .get(name)
            .map(|d| Domain { name: d.clone() }))
    }

    async fn list_records(
        &self,
        domain: &str,
        record_type: RecordType,
        fqdn: &str,
    ) -> Result<Vec<DnsRecord>> {
        self.record(ProviderCall::ListRecords {
            domain: domain.to_string(),
            record_type,
            fqdn: fqdn.to_string(),
        });

        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|(d, f, r)| d == domain && f == fqdn && r.record_type == record_type)
            .map(|(_, _, r)| r.clone())
            .collect())
    }

    async fn create_record(&self, domain: &str, request: &RecordRequest) -> Result<DnsRecord> {
        self.record(ProviderCall::Create {
            domain: domain.to_string(),
            request: request.clone(),
        });

        let fqdn = if request.name.is_empty() {
            domain.to_string()
        } else {
            format!("{}.{}", request.name, domain)
        };

        let record = DnsRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst).to_string(),
            record_type: request.record_type,
            name: request.name.clone(),
            ip: request.ip,
            ttl: request.ttl,
        };

        self.records
            .lock()
            .unwrap()
            .push((domain.to_string(), fqdn, record.clone()));
        Ok(record)
    }

    async fn update_record(
        &self,
        domain: &str,
        record_id: &str,
        request: &RecordRequest,
    ) -> Result<DnsRecord> {
        self.record(ProviderCall::Update {
            domain: domain.to_string(),
            record_id: record_id.to_string(),
            request: request.clone(),
        });

        let mut records = self.records.lock().unwrap();
        let (_, _, record) = records
            .iter_mut()
            .find(|(d, _, r)| d == domain && r.id == record_id)
            .ok_or_else(|| Error::not_found(format!("record {} not found", record_id)))?;

        record.ip = request.ip;
        record.ttl = request.ttl;
        Ok(record.clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config(hostname: &str) -> DdnsConfig {
    DdnsConfig {
        engine: EngineConfig {
            check_interval_secs: 60,
            ttl: 300,
        },
        ..DdnsConfig::new(hostname, ProviderConfig::digitalocean("test-token"))
    }
}

pub fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
    IpAddr::from([a, b, c, d])
}

pub fn v6(s: &str) -> IpAddr {
    s.parse().unwrap()
}
