//! Enumeration pipeline.
//!
//! A run goes through four stages, strictly in order:
//!
//! 1. **Passive**: ask the passive source for known names. A failing source
//!    yields an empty set.
//! 2. **Brute force**: only with a wordlist that yields at least one word.
//!    Builds `{word}.{domain}` candidates and keeps those that resolve.
//! 3. **Resolution**: merges both sets and resolves every candidate.
//! 4. **Persistence**: writes the candidate list and the resolution map.
//!    Failing to write is the one error that ends a run.
//!
//! Both DNS stages share one concurrency bound and never overlap.

use crate::candidates::{build_candidates, merge, normalize_hostname};
use crate::concurrent::ConcurrentProcessor;
use crate::error::SubenumError;
use crate::output::{save_candidates, save_resolved};
use crate::protocols::{CrtShClient, PassiveSource};
use crate::resolver::{DnsLookup, HickoryLookup, HostResolver, ResolverSettings};
use crate::types::{EnumConfig, Enumeration, ResolutionMap, StageTimings};
use crate::utils::{normalize_domain, validate_domain};
use crate::wordlist;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Passive,
    BruteForce,
    Resolution,
    Persistence,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Passive => write!(f, "passive discovery"),
            Stage::BruteForce => write!(f, "brute force"),
            Stage::Resolution => write!(f, "resolution"),
            Stage::Persistence => write!(f, "persistence"),
        }
    }
}

/// Receives progress events from a run. Every method defaults to a no-op.
pub trait Progress: Sync {
    /// A stage is starting. `items` is the number of work items where
    /// known up front (candidates to probe or resolve), else 0.
    fn stage_started(&self, _stage: Stage, _items: usize) {}

    /// The passive source answered (or failed, with `found == 0`).
    fn passive_finished(&self, _source: &str, _found: usize, _error: Option<&SubenumError>) {}

    /// The configured wordlist could not be used; brute force is skipped.
    fn wordlist_skipped(&self, _path: &Path, _reason: &str) {}

    /// A brute-force candidate resolved.
    fn brute_force_hit(&self, _host: &str) {}

    fn brute_force_finished(&self, _found: usize) {}

    /// Passive and brute-force names were merged into `total` candidates.
    fn candidates_merged(&self, _total: usize) {}

    /// A candidate resolved during the bulk stage. Called in completion order.
    fn host_resolved(&self, _host: &str, _ips: &[String]) {}

    fn resolution_finished(&self, _resolved: usize, _candidates: usize) {}

    /// A result file was written.
    fn saved(&self, _path: &Path) {}
}

/// A [`Progress`] that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {}

/// Runs the discovery pipeline for a target domain.
pub struct Enumerator<P, L> {
    config: EnumConfig,
    source: P,
    resolver: HostResolver<L>,
    processor: ConcurrentProcessor,
}

impl Enumerator<CrtShClient, HickoryLookup> {
    /// Enumerator using crt.sh and the real DNS.
    pub fn from_config(config: EnumConfig) -> Result<Self, SubenumError> {
        let source = CrtShClient::with_timeout(config.http_timeout)?;
        let lookup = HickoryLookup::new(&ResolverSettings::from(&config));
        Ok(Self::new(config, source, lookup))
    }
}

impl<P: PassiveSource, L: DnsLookup> Enumerator<P, L> {
    /// Enumerator over an arbitrary passive source and DNS backend.
    pub fn new(config: EnumConfig, source: P, lookup: L) -> Self {
        let resolver = HostResolver::new(lookup, config.dns_timeout);
        let processor = ConcurrentProcessor::new(config.threads);
        Self {
            config,
            source,
            resolver,
            processor,
        }
    }

    pub fn config(&self) -> &EnumConfig {
        &self.config
    }

    /// Run all four stages for `domain`.
    ///
    /// # Errors
    ///
    /// Returns `SubenumError` if:
    /// - The domain is not a valid target
    /// - A result file cannot be written
    ///
    /// Passive-source, wordlist and DNS failures degrade the run instead.
    pub async fn run(
        &self,
        domain: &str,
        progress: &dyn Progress,
    ) -> Result<Enumeration, SubenumError> {
        let domain = normalize_domain(domain);
        validate_domain(&domain)?;
        let mut timings = StageTimings::default();

        let started = Instant::now();
        let passive = self.passive_stage(&domain, progress).await;
        timings.passive = started.elapsed();

        let brute_found = match self.load_words(progress) {
            Some(words) => {
                let started = Instant::now();
                let found = self.brute_force(&domain, &words, progress).await;
                timings.brute_force = Some(started.elapsed());
                found
            }
            None => BTreeSet::new(),
        };

        let candidates = merge(&passive, &brute_found);
        progress.candidates_merged(candidates.len());
        info!(total = candidates.len(), "merged candidate set");

        let started = Instant::now();
        let resolved = self.resolve_all(&candidates, progress).await;
        timings.resolution = started.elapsed();

        self.persist(&candidates, &resolved, progress)?;

        Ok(Enumeration {
            domain,
            passive: passive.into_iter().collect(),
            brute_found: brute_found.into_iter().collect(),
            candidates,
            resolved,
            timings,
        })
    }

    /// Query the passive source, degrading any failure to an empty set.
    ///
    /// Names are re-checked against `domain` whatever the source claims.
    pub async fn passive_stage(&self, domain: &str, progress: &dyn Progress) -> BTreeSet<String> {
        progress.stage_started(Stage::Passive, 0);

        match self.source.fetch(domain).await {
            Ok(names) => {
                let names: BTreeSet<String> = names
                    .iter()
                    .filter_map(|name| normalize_hostname(domain, name))
                    .collect();
                info!(source = self.source.name(), found = names.len(), "passive discovery done");
                progress.passive_finished(self.source.name(), names.len(), None);
                names
            }
            Err(e) => {
                warn!(source = self.source.name(), error = %e, "passive source failed, continuing without it");
                progress.passive_finished(self.source.name(), 0, Some(&e));
                BTreeSet::new()
            }
        }
    }

    fn load_words(&self, progress: &dyn Progress) -> Option<Vec<String>> {
        let path = self.config.wordlist.as_ref()?;

        match wordlist::load(path) {
            Ok(words) if words.is_empty() => {
                warn!(path = %path.display(), "wordlist has no usable words");
                progress.wordlist_skipped(path, "no usable words");
                None
            }
            Ok(words) => {
                debug!(path = %path.display(), words = words.len(), "wordlist loaded");
                Some(words)
            }
            Err(e) => {
                warn!(error = %e, "skipping brute force");
                progress.wordlist_skipped(path, &e.to_string());
                None
            }
        }
    }

    /// Probe `{word}.{domain}` for every word and keep the names that resolve.
    pub async fn brute_force(
        &self,
        domain: &str,
        words: &[String],
        progress: &dyn Progress,
    ) -> BTreeSet<String> {
        let candidates = build_candidates(domain, words);
        progress.stage_started(Stage::BruteForce, candidates.len());
        info!(candidates = candidates.len(), threads = self.processor.max_concurrency(), "starting brute force");

        let resolver = &self.resolver;
        let hits = self
            .processor
            .run_with(
                candidates,
                |host: String| async move {
                    let ips = resolver.resolve(&host).await;
                    (!ips.is_empty()).then_some(())
                },
                |host, hit| {
                    if hit.is_some() {
                        progress.brute_force_hit(host);
                    }
                },
            )
            .await;

        let found: BTreeSet<String> = hits.into_keys().collect();
        info!(found = found.len(), "brute force done");
        progress.brute_force_finished(found.len());
        found
    }

    /// Resolve every candidate; only hosts with at least one A record are kept.
    pub async fn resolve_all(&self, candidates: &[String], progress: &dyn Progress) -> ResolutionMap {
        progress.stage_started(Stage::Resolution, candidates.len());

        let resolver = &self.resolver;
        let outcomes = self
            .processor
            .run_with(
                candidates.iter().cloned(),
                |host: String| async move {
                    let ips = resolver.resolve(&host).await;
                    (!ips.is_empty()).then_some(ips)
                },
                |host, ips| {
                    if let Some(ips) = ips {
                        progress.host_resolved(host, ips);
                    }
                },
            )
            .await;

        let resolved = ResolutionMap::from(outcomes);
        info!(resolved = resolved.len(), candidates = candidates.len(), "resolution done");
        progress.resolution_finished(resolved.len(), candidates.len());
        resolved
    }

    /// Write the candidate list and the resolution map.
    pub fn persist(
        &self,
        candidates: &[String],
        resolved: &ResolutionMap,
        progress: &dyn Progress,
    ) -> Result<(), SubenumError> {
        progress.stage_started(Stage::Persistence, 0);

        save_candidates(&self.config.output, candidates)?;
        progress.saved(&self.config.output);

        save_resolved(&self.config.resolved_output, resolved)?;
        progress.saved(&self.config.resolved_output);

        Ok(())
    }
}
