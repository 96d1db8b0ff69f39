// # doddns-core
//
// Core library for the doddns dynamic DNS updater.
//
// ## Architecture Overview
//
// - **IpSource**: Trait for discovering the current public IP
// - **DnsProvider**: Capability trait for reading and writing A/AAAA records
// - **resolver**: Splits a hostname into record name and registered domain
// - **DdnsEngine**: Poll → compare → create/edit loop
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic knows nothing about HTTP or any
//    particular provider API
// 2. **Library-First**: The daemon is a thin wrapper; everything can be
//    embedded or tested against stand-in implementations
// 3. **Fail Fast**: Apart from the IP lookup fallback, every error stops
//    the engine

pub mod traits;
pub mod engine;
pub mod resolver;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{IpSource, DnsProvider};
pub use engine::{DdnsEngine, RecordState};
pub use resolver::{ResolvedHostname, resolve_hostname};
pub use config::{DdnsConfig, EngineConfig, IpLookupConfig, ProviderConfig};
pub use error::{Error, Result};
