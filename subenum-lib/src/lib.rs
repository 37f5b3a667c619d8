//! # Subenum Library
//!
//! Subdomain discovery for a target domain: certificate-transparency lookup
//! via crt.sh, optional wordlist brute force, and A-record resolution of
//! every candidate with bounded concurrency.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use subenum_lib::{EnumConfig, Enumerator, NoProgress};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EnumConfig::default().with_threads(50);
//!     let enumerator = Enumerator::from_config(config)?;
//!     let run = enumerator.run("example.com", &NoProgress).await?;
//!
//!     for (host, ips) in run.resolved.iter() {
//!         println!("{} -> {}", host, ips.join(", "));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Building blocks
//!
//! - [`ConcurrentProcessor`]: bounded fan-out of async work, completion-order collection
//! - [`HostResolver`]: A lookups with a hard per-query timeout, failures as empty results
//! - [`candidates`]: wordlist candidates, CT-name normalization, sorted merge
//! - [`PassiveSource`] / [`CrtShClient`]: certificate-transparency lookup
//! - [`output`]: result files

pub use concurrent::ConcurrentProcessor;
pub use config::{
    load_env_config, parse_nameserver, parse_timeout, ConfigManager, DefaultsConfig, EnvConfig,
    FileConfig, OutputConfig,
};
pub use error::SubenumError;
pub use pipeline::{Enumerator, NoProgress, Progress, Stage};
pub use protocols::{CertEntry, CrtShClient, PassiveSource, CRTSH_URL};
pub use resolver::{DnsLookup, HickoryLookup, HostResolver, ResolverSettings};
pub use types::{EnumConfig, Enumeration, ResolutionMap, StageTimings, DEFAULT_THREADS, MAX_THREADS};
pub use utils::{normalize_domain, validate_domain};

// Public modules
pub mod candidates;
pub mod output;
pub mod protocols;
pub mod wordlist;

// Internal modules - their public items are re-exported above
mod concurrent;
mod config;
mod error;
mod pipeline;
mod resolver;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, SubenumError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
