//! A-record resolution with a per-query time budget.
//!
//! [`HostResolver`] is what the pipeline talks to: it never fails, a host
//! that cannot be resolved for any reason comes back as an empty list.
//! The actual wire lookup sits behind the [`DnsLookup`] trait so the
//! pipeline can be driven by fakes in tests.

use crate::error::SubenumError;
use crate::types::EnumConfig;
use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::TokioAsyncResolver;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// One A-record query against some DNS backend.
#[async_trait]
pub trait DnsLookup: Send + Sync {
    /// Look up the IPv4 addresses of `host`, in answer order.
    async fn lookup_ipv4(&self, host: &str) -> Result<Vec<Ipv4Addr>, SubenumError>;
}

#[async_trait]
impl<L: DnsLookup + ?Sized> DnsLookup for Arc<L> {
    async fn lookup_ipv4(&self, host: &str) -> Result<Vec<Ipv4Addr>, SubenumError> {
        (**self).lookup_ipv4(host).await
    }
}

/// DNS settings fixed for the lifetime of a resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverSettings {
    /// Total budget for one query, connection and round-trip included
    pub timeout: Duration,
    /// Nameservers to query; empty means the system configuration
    pub nameservers: Vec<SocketAddr>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            nameservers: Vec::new(),
        }
    }
}

impl From<&EnumConfig> for ResolverSettings {
    fn from(config: &EnumConfig) -> Self {
        Self {
            timeout: config.dns_timeout,
            nameservers: config.nameservers.clone(),
        }
    }
}

/// [`DnsLookup`] backed by hickory's tokio resolver.
#[derive(Clone)]
pub struct HickoryLookup {
    resolver: TokioAsyncResolver,
}

impl HickoryLookup {
    /// Build a resolver from explicit settings.
    ///
    /// Each query is attempted once. Without custom nameservers the system
    /// configuration (`/etc/resolv.conf` or platform equivalent) is used,
    /// falling back to hickory's defaults if it cannot be read.
    pub fn new(settings: &ResolverSettings) -> Self {
        let (config, mut opts) = if settings.nameservers.is_empty() {
            match hickory_resolver::system_conf::read_system_conf() {
                Ok(system) => system,
                Err(e) => {
                    warn!(error = %e, "could not read system resolver config, using defaults");
                    (ResolverConfig::default(), ResolverOpts::default())
                }
            }
        } else {
            (nameserver_config(&settings.nameservers), ResolverOpts::default())
        };

        opts.timeout = settings.timeout;
        opts.attempts = 1;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

/// UDP plus TCP for each address, so truncated answers can be retried.
fn nameserver_config(nameservers: &[SocketAddr]) -> ResolverConfig {
    let mut config = ResolverConfig::new();
    for addr in nameservers {
        config.add_name_server(NameServerConfig::new(*addr, Protocol::Udp));
        config.add_name_server(NameServerConfig::new(*addr, Protocol::Tcp));
    }
    config
}

#[async_trait]
impl DnsLookup for HickoryLookup {
    async fn lookup_ipv4(&self, host: &str) -> Result<Vec<Ipv4Addr>, SubenumError> {
        // Absolute name, so resolv.conf search domains are never appended
        let query = if host.ends_with('.') {
            host.to_string()
        } else {
            format!("{}.", host)
        };

        let answer = self
            .resolver
            .ipv4_lookup(query.as_str())
            .await
            .map_err(|e| lookup_error(host, e))?;

        Ok(answer.iter().map(|a| a.0).collect())
    }
}

fn lookup_error(host: &str, err: ResolveError) -> SubenumError {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { .. } => SubenumError::dns(host, "no record found"),
        ResolveErrorKind::Timeout => SubenumError::dns(host, "query timed out"),
        _ => SubenumError::dns(host, err.to_string()),
    }
}

/// Resolves hostnames to dotted-decimal IPv4 strings, never failing.
pub struct HostResolver<L> {
    lookup: L,
    timeout: Duration,
}

impl<L: DnsLookup> HostResolver<L> {
    pub fn new(lookup: L, timeout: Duration) -> Self {
        Self { lookup, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Look up `host`, reporting why it failed.
    ///
    /// The whole lookup is bounded by the resolver timeout, independent of
    /// whatever the backend does internally.
    pub async fn try_resolve(&self, host: &str) -> Result<Vec<Ipv4Addr>, SubenumError> {
        match tokio::time::timeout(self.timeout, self.lookup.lookup_ipv4(host)).await {
            Ok(result) => result,
            Err(_) => Err(SubenumError::timeout(
                format!("A lookup for {}", host),
                self.timeout,
            )),
        }
    }

    /// Look up `host`; any failure yields an empty list.
    pub async fn resolve(&self, host: &str) -> Vec<String> {
        match self.try_resolve(host).await {
            Ok(ips) => ips.iter().map(ToString::to_string).collect(),
            Err(e) if e.is_no_record() => {
                trace!(host, "no A record");
                Vec::new()
            }
            Err(e) => {
                debug!(host, error = %e, "lookup failed");
                Vec::new()
            }
        }
    }
}
