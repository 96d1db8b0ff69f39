// # IP Source Trait
//
// Defines the interface for discovering the caller's current public IP.
//
// ## Implementations
//
// - HTTP lookup services with ordered fallback: `doddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use doddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//     let ip = source.current().await?;
//     println!("public IP: {}", ip);
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for IP source implementations
///
/// The engine calls [`IpSource::current`] once per poll cycle. A source may
/// try several backends internally, but it must return either an address or
/// an error for the whole lookup; it never caches between calls.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current public IP address
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: The current IP address
    /// - `Err(Error)`: If no backend could determine the current IP
    async fn current(&self) -> Result<IpAddr, crate::Error>;
}
