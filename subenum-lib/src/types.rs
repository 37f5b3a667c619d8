//! Core data types for subdomain enumeration.
//!
//! This module defines the run configuration, the resolution mapping that
//! gets persisted, and the summary returned by a completed run.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Default number of concurrent DNS queries.
pub const DEFAULT_THREADS: usize = 20;

/// Upper bound on concurrent DNS queries.
pub const MAX_THREADS: usize = 1000;

/// Mapping from hostname to the IPv4 addresses it resolved to.
///
/// Order of addresses is the order the DNS answer carried them. A host that
/// did not resolve has no entry; an entry never holds an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, Vec<String>>",
    into = "BTreeMap<String, Vec<String>>"
)]
pub struct ResolutionMap {
    entries: BTreeMap<String, Vec<String>>,
}

impl ResolutionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the addresses for `host`.
    ///
    /// Returns `false` and stores nothing when `ips` is empty.
    pub fn insert<H: Into<String>>(&mut self, host: H, ips: Vec<String>) -> bool {
        if ips.is_empty() {
            return false;
        }
        self.entries.insert(host.into(), ips);
        true
    }

    pub fn get(&self, host: &str) -> Option<&[String]> {
        self.entries.get(host).map(Vec::as_slice)
    }

    pub fn contains(&self, host: &str) -> bool {
        self.entries.contains_key(host)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries sorted by hostname.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.entries.iter()
    }

    /// Resolved hostnames, sorted.
    pub fn hosts(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

impl From<BTreeMap<String, Vec<String>>> for ResolutionMap {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        map.into_iter().collect()
    }
}

impl From<HashMap<String, Vec<String>>> for ResolutionMap {
    fn from(map: HashMap<String, Vec<String>>) -> Self {
        map.into_iter().collect()
    }
}

impl From<ResolutionMap> for BTreeMap<String, Vec<String>> {
    fn from(map: ResolutionMap) -> Self {
        map.entries
    }
}

impl FromIterator<(String, Vec<String>)> for ResolutionMap {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        let mut map = ResolutionMap::new();
        for (host, ips) in iter {
            map.insert(host, ips);
        }
        map
    }
}

/// Configuration options for an enumeration run.
///
/// Built by the CLI from defaults, config files, environment variables and
/// arguments. The DNS settings in here are handed to the resolver at
/// construction time and never change while a run is in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumConfig {
    /// Maximum number of concurrent DNS queries, shared by the brute-force
    /// and bulk resolution stages.
    /// Default: 20, Range: 1-1000
    pub threads: usize,

    /// Total budget for one A-record query, connection included.
    /// Default: 5 seconds
    pub dns_timeout: Duration,

    /// Timeout for the crt.sh request.
    /// Default: 30 seconds
    pub http_timeout: Duration,

    /// Nameservers to query. Empty means the system resolver configuration.
    pub nameservers: Vec<SocketAddr>,

    /// Wordlist for the brute-force stage. `None` skips the stage.
    pub wordlist: Option<PathBuf>,

    /// Where the sorted candidate list is written.
    /// Default: subdomains.txt
    pub output: PathBuf,

    /// Where the hostname -> addresses JSON is written.
    /// Default: resolved.json
    pub resolved_output: PathBuf,
}

impl Default for EnumConfig {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            dns_timeout: Duration::from_secs(5),
            http_timeout: Duration::from_secs(30),
            nameservers: Vec::new(),
            wordlist: None,
            output: PathBuf::from("subdomains.txt"),
            resolved_output: PathBuf::from("resolved.json"),
        }
    }
}

impl EnumConfig {
    /// Set the concurrency bound, clamped to 1..=1000.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.clamp(1, MAX_THREADS);
        self
    }

    pub fn with_dns_timeout(mut self, timeout: Duration) -> Self {
        self.dns_timeout = timeout;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn with_nameservers(mut self, nameservers: Vec<SocketAddr>) -> Self {
        self.nameservers = nameservers;
        self
    }

    pub fn with_wordlist<P: Into<PathBuf>>(mut self, wordlist: Option<P>) -> Self {
        self.wordlist = wordlist.map(Into::into);
        self
    }

    pub fn with_output<P: Into<PathBuf>>(mut self, output: P) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_resolved_output<P: Into<PathBuf>>(mut self, resolved_output: P) -> Self {
        self.resolved_output = resolved_output.into();
        self
    }
}

/// Time spent in each stage of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageTimings {
    pub passive: Duration,
    /// `None` when the brute-force stage was skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brute_force: Option<Duration>,
    pub resolution: Duration,
}

/// Outcome of a completed enumeration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enumeration {
    /// Target domain, normalized
    pub domain: String,

    /// Names found by the passive source, sorted
    pub passive: Vec<String>,

    /// Brute-force candidates that resolved, sorted
    pub brute_found: Vec<String>,

    /// Union of passive and brute-force names, sorted
    pub candidates: Vec<String>,

    /// Candidates that resolved to at least one A record
    pub resolved: ResolutionMap,

    pub timings: StageTimings,
}
