//! Passive discovery sources.
//!
//! A passive source answers "which names under this domain are publicly
//! known?" without touching the target's DNS.

use crate::error::SubenumError;
use async_trait::async_trait;

/// crt.sh certificate-transparency lookup
pub mod crtsh;

pub use crtsh::{extract_hostnames, parse_response, CertEntry, CrtShClient, CRTSH_URL};

/// A source of hostnames for a domain.
#[async_trait]
pub trait PassiveSource: Send + Sync {
    /// Short name used in status and log lines.
    fn name(&self) -> &str;

    /// Sorted, deduplicated hostnames under `domain`.
    async fn fetch(&self, domain: &str) -> Result<Vec<String>, SubenumError>;
}
