//! Core doddns engine
//!
//! The DdnsEngine is responsible for:
//! - Resolving the configured hostname to a record name and domain
//! - Loading the existing A/AAAA records for that hostname
//! - Polling the public IP on a fixed interval
//! - Creating or editing the matching record when the IP or TTL drifts
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐                ┌──────────────┐
//! │  IpSource   │── current() ──▶│  DdnsEngine  │
//! └─────────────┘                └──────────────┘
//!                                        │
//!                      ┌─────────────────┼─────────────────┐
//!                      │                 │                 │
//!                      ▼                 ▼                 ▼
//!              ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//!              │   resolver   │  │ RecordState  │  │ DnsProvider  │
//!              │  (startup)   │  │ (per cycle)  │  │ (create/edit)│
//!              └──────────────┘  └──────────────┘  └──────────────┘
//! ```
//!
//! ## Cycle
//!
//! 1. Ask the IP source for the current public IP
//! 2. Pick the A or AAAA slot of [`RecordState`] by address family
//! 3. Empty slot → create; IP or TTL differs → edit by id; otherwise nothing
//! 4. Store the provider's answer back into the slot
//!
//! Every error is fatal: the engine stops and returns it.

use crate::config::DdnsConfig;
use crate::error::{Error, Result};
use crate::resolver::{self, ResolvedHostname};
use crate::traits::{DnsProvider, DnsRecord, IpSource, RecordRequest, RecordType, UpdateResult};
use std::future::Future;
use std::net::IpAddr;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Last known A and AAAA records for the managed hostname
///
/// Owned by the run loop and handed to every cycle; there is no other copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordState {
    /// The hostname's A record, if one exists
    pub a: Option<DnsRecord>,
    /// The hostname's AAAA record, if one exists
    pub aaaa: Option<DnsRecord>,
}

impl RecordState {
    /// The record held for `record_type`
    pub fn get(&self, record_type: RecordType) -> Option<&DnsRecord> {
        match record_type {
            RecordType::A => self.a.as_ref(),
            RecordType::Aaaa => self.aaaa.as_ref(),
        }
    }

    /// Replace the record held for its type
    pub fn set(&mut self, record: DnsRecord) {
        match record.record_type {
            RecordType::A => self.a = Some(record),
            RecordType::Aaaa => self.aaaa = Some(record),
        }
    }
}

/// Core doddns engine
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Start with [`DdnsEngine::run()`]
/// 3. Engine runs until a shutdown signal or the first error
///
/// ## Threading
///
/// All work happens sequentially on the calling task. The shutdown signal is
/// only observed while waiting for the next tick, so a cycle is never
/// interrupted halfway through a provider call.
pub struct DdnsEngine {
    /// IP source for public IP discovery
    ip_source: Box<dyn IpSource>,

    /// DNS provider for reading and writing records
    provider: Box<dyn DnsProvider>,

    /// Configured hostname
    hostname: String,

    /// TTL to publish
    ttl: u32,

    /// Time between IP checks
    check_interval: Duration,
}

impl DdnsEngine {
    /// Create a new doddns engine
    ///
    /// # Parameters
    ///
    /// - `ip_source`: IP source implementation
    /// - `provider`: DNS provider implementation
    /// - `config`: doddns configuration (validated here)
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        config: &DdnsConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            ip_source,
            provider,
            hostname: resolver::normalize_hostname(&config.hostname)?,
            ttl: config.engine.ttl,
            check_interval: config.engine.check_interval(),
        })
    }

    /// Run the engine until SIGINT/SIGTERM
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Clean shutdown
    /// - `Err(Error)`: Fatal error
    pub async fn run(&self) -> Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Run the engine until `shutdown_rx` fires or its sender is dropped
    ///
    /// Used by tests and embedders that manage shutdown themselves.
    pub async fn run_with_shutdown(&self, shutdown_rx: oneshot::Receiver<()>) -> Result<()> {
        self.run_until(async {
            let _ = shutdown_rx.await;
        })
        .await
    }

    async fn run_until(&self, shutdown: impl Future<Output = ()>) -> Result<()> {
        info!(
            "Resolving hostname [{}] with provider {}",
            self.hostname,
            self.provider.provider_name()
        );
        let host = self.resolve().await?;
        info!("Found domain [{}], hostname [{}]", host.domain, host.record_name);

        let mut state = self.load_state(&host).await?;

        let mut ticker = tokio::time::interval(self.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.poll_once(&host, &mut state).await?;
                }

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        info!("Engine stopped");
        Ok(())
    }

    /// Resolve the configured hostname against the provider
    pub async fn resolve(&self) -> Result<ResolvedHostname> {
        resolver::resolve_hostname(self.provider.as_ref(), &self.hostname).await
    }

    /// Load the existing A and AAAA records for `host`
    ///
    /// # Returns
    ///
    /// - `Err(Error::AmbiguousRecords)`: more than one record of a type exists
    pub async fn load_state(&self, host: &ResolvedHostname) -> Result<RecordState> {
        Ok(RecordState {
            a: self.find_single_record(host, RecordType::A).await?,
            aaaa: self.find_single_record(host, RecordType::Aaaa).await?,
        })
    }

    async fn find_single_record(
        &self,
        host: &ResolvedHostname,
        record_type: RecordType,
    ) -> Result<Option<DnsRecord>> {
        let fqdn = host.fqdn();
        let mut records = self
            .provider
            .list_records(&host.domain, record_type, &fqdn)
            .await?;

        match records.len() {
            0 => {
                info!("Found 0 {} records for hostname {}", record_type, host);
                Ok(None)
            }
            1 => {
                let record = records.remove(0);
                info!(
                    "Found 1 {} record for hostname {} pointing to [{}]",
                    record_type, host, record.ip
                );
                Ok(Some(record))
            }
            count => Err(Error::ambiguous_records(record_type.as_str(), fqdn, count)),
        }
    }

    /// Run one detection + reconciliation cycle
    pub async fn poll_once(
        &self,
        host: &ResolvedHostname,
        state: &mut RecordState,
    ) -> Result<UpdateResult> {
        let ip = self.ip_source.current().await?;
        debug!("Current public IP: {}", ip);

        self.reconcile(host, state, ip).await
    }

    /// Bring the record for `ip`'s address family in line with `ip` and the
    /// configured TTL
    ///
    /// An existing record is always edited through its own id; a record is
    /// only created when `state` holds none of that type.
    pub async fn reconcile(
        &self,
        host: &ResolvedHostname,
        state: &mut RecordState,
        ip: IpAddr,
    ) -> Result<UpdateResult> {
        let request = RecordRequest::new(host.record_name.clone(), ip, self.ttl);
        let record_type = request.record_type;

        let result = match state.get(record_type).cloned() {
            None => {
                let created = self.provider.create_record(&host.domain, &request).await?;
                info!(
                    "Created new {} record [{}] pointing to [{}] with TTL {}",
                    record_type,
                    host.fqdn(),
                    ip,
                    self.ttl
                );
                state.set(created);
                UpdateResult::Created { new_ip: ip }
            }
            Some(existing) if existing.matches(ip, self.ttl) => {
                debug!("{} record [{}] already points to [{}]", record_type, host.fqdn(), ip);
                UpdateResult::Unchanged { current_ip: ip }
            }
            Some(existing) => {
                let updated = self
                    .provider
                    .update_record(&host.domain, &existing.id, &request)
                    .await?;
                info!(
                    "Updated {} record [{}] pointing to [{}] with TTL {} (was [{}], TTL {})",
                    record_type,
                    host.fqdn(),
                    ip,
                    self.ttl,
                    existing.ip,
                    existing.ttl
                );
                state.set(updated);
                UpdateResult::Updated {
                    previous_ip: existing.ip,
                    new_ip: ip,
                }
            }
        };

        Ok(result)
    }
}

/// Wait for SIGINT or SIGTERM
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => info!("Received SIGTERM"),
                _ = sigint.recv() => info!("Received SIGINT"),
            }
        }
        _ => {
            tracing::warn!("Failed to install signal handlers, falling back to CTRL-C");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

/// Wait for CTRL-C
#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
