//! Core traits for doddns
//!
//! This module defines the abstract interfaces the engine is written against.
//!
//! - [`IpSource`]: Discover the current public IP
//! - [`DnsProvider`]: Read and write A/AAAA records via a provider API

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::IpSource;
pub use dns_provider::{DnsProvider, DnsRecord, Domain, RecordRequest, RecordType, UpdateResult};
