//! crt.sh certificate-transparency source.
//!
//! crt.sh indexes the public CT logs. Querying `%.{domain}` returns every
//! logged certificate whose names fall under the domain, as a JSON array of
//! objects. Each object's `name_value` holds one or more newline-separated
//! DNS names, wildcards included.

use crate::candidates::normalize_hostname;
use crate::error::SubenumError;
use crate::protocols::PassiveSource;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::debug;

/// Default crt.sh endpoint
pub const CRTSH_URL: &str = "https://crt.sh/";

const SERVICE_NAME: &str = "crt.sh";

/// Longest body excerpt kept in a parse error
const CONTENT_EXCERPT: usize = 200;

/// One row of the crt.sh JSON output. Only the names are of interest.
#[derive(Debug, Clone, Deserialize)]
pub struct CertEntry {
    #[serde(default)]
    pub name_value: String,
}

/// HTTP client for crt.sh.
#[derive(Clone)]
pub struct CrtShClient {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl CrtShClient {
    /// Create a client with the default 30 second timeout.
    pub fn new() -> Result<Self, SubenumError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, SubenumError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("subenum/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                SubenumError::network_with_source(
                    "Failed to create crt.sh HTTP client",
                    e.to_string(),
                )
            })?;

        Ok(Self {
            http_client,
            base_url: CRTSH_URL.to_string(),
            timeout,
        })
    }

    /// Point the client at another crt.sh-compatible endpoint.
    pub fn with_base_url<U: Into<String>>(mut self, base_url: U) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch_body(&self, domain: &str) -> Result<String, SubenumError> {
        let pattern = format!("%.{}", domain);
        debug!(url = %self.base_url, q = %pattern, "querying crt.sh");

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[("q", pattern.as_str()), ("output", "json")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubenumError::http_status(SERVICE_NAME, status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl PassiveSource for CrtShClient {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    async fn fetch(&self, domain: &str) -> Result<Vec<String>, SubenumError> {
        let body = self.fetch_body(domain).await?;
        parse_response(domain, &body)
    }
}

/// Parse a crt.sh JSON body into sorted hostnames under `domain`.
pub fn parse_response(domain: &str, body: &str) -> Result<Vec<String>, SubenumError> {
    let entries: Vec<CertEntry> =
        serde_json::from_str(body).map_err(|e| SubenumError::ParseError {
            message: format!("crt.sh returned invalid JSON: {}", e),
            content: Some(body.chars().take(CONTENT_EXCERPT).collect()),
        })?;

    Ok(extract_hostnames(domain, &entries))
}

/// Collect the distinct hostnames under `domain` from crt.sh entries, sorted.
pub fn extract_hostnames(domain: &str, entries: &[CertEntry]) -> Vec<String> {
    let names: BTreeSet<String> = entries
        .iter()
        .flat_map(|entry| entry.name_value.lines())
        .filter_map(|raw| normalize_hostname(domain, raw))
        .collect();

    names.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name_value: &str) -> CertEntry {
        CertEntry {
            name_value: name_value.to_string(),
        }
    }

    #[test]
    fn test_extract_filters_and_strips_wildcards() {
        let entries = vec![
            entry("www.example.com"),
            entry("*.api.example.com"),
            entry("other.com"),
        ];

        assert_eq!(
            extract_hostnames("example.com", &entries),
            vec!["api.example.com".to_string(), "www.example.com".to_string()]
        );
    }

    #[test]
    fn test_extract_splits_multiline_name_values() {
        let entries = vec![
            entry("example.com\n*.example.com\nmail.example.com"),
            entry("MAIL.example.com\r\n\n"),
        ];

        assert_eq!(
            extract_hostnames("example.com", &entries),
            vec!["example.com".to_string(), "mail.example.com".to_string()]
        );
    }

    #[test]
    fn test_every_extracted_name_is_under_the_domain() {
        let entries = vec![
            entry("a.example.com\n*.b.example.com\nexample.com.attacker.net"),
            entry("fooexample.com\n*.*.c.example.com\nd.*.example.com"),
        ];

        let names = extract_hostnames("example.com", &entries);
        assert!(!names.is_empty());
        for name in &names {
            assert!(!name.contains('*'), "{} still has a wildcard", name);
            assert!(
                name == "example.com" || name.ends_with(".example.com"),
                "{} is outside the domain",
                name
            );
        }
    }

    #[test]
    fn test_parse_response() {
        let body = r#"[
            {"issuer_name": "C=US, O=Let's Encrypt", "name_value": "www.example.com\nexample.com"},
            {"name_value": "*.dev.example.com"},
            {"id": 12345}
        ]"#;

        let names = parse_response("example.com", body).unwrap();
        assert_eq!(
            names,
            vec![
                "dev.example.com".to_string(),
                "example.com".to_string(),
                "www.example.com".to_string()
            ]
        );
    }

    #[test]
    fn test_parse_empty_array() {
        assert!(parse_response("example.com", "[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_html_error_page() {
        let err = parse_response("example.com", "<html>502 Bad Gateway</html>").unwrap_err();
        match err {
            SubenumError::ParseError { content, .. } => {
                assert_eq!(content.as_deref(), Some("<html>502 Bad Gateway</html>"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_unreachable_endpoint_is_a_network_error() {
        let client = CrtShClient::with_timeout(Duration::from_secs(2))
            .unwrap()
            .with_base_url("http://127.0.0.1:1/");

        let err = tokio_test::block_on(client.fetch("example.com")).unwrap_err();
        assert!(matches!(err, SubenumError::NetworkError { .. }));
        assert!(!err.is_fatal());
    }
}
