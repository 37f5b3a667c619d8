//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and `SE_*`
//! environment variables, and merging them with proper precedence rules.
//! Turning the merged values into an [`EnumConfig`](crate::EnumConfig) is
//! left to the caller, which also knows about command-line arguments.

use crate::error::SubenumError;
use crate::types::MAX_THREADS;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

const CONFIG_FILE_NAMES: [&str; 2] = ["subenum.toml", ".subenum.toml"];

/// Configuration loaded from TOML files.
///
/// ```toml
/// [defaults]
/// threads = 50
/// timeout = "3s"
/// http_timeout = "1m"
/// nameservers = ["1.1.1.1", "9.9.9.9:53"]
/// wordlist = "/usr/share/wordlists/subdomains-top1k.txt"
///
/// [output]
/// candidates = "subdomains.txt"
/// resolved = "resolved.json"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Result file locations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DefaultsConfig {
    /// Concurrent DNS queries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,

    /// Per-query DNS timeout (as string, e.g., "5s", "2m")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// crt.sh request timeout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_timeout: Option<String>,

    /// Nameservers as `IP` or `IP:PORT`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nameservers: Option<Vec<String>>,

    /// Wordlist used when none is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wordlist: Option<String>,
}

/// Output file configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    /// Candidate list path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates: Option<String>,

    /// Resolution JSON path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    local_dir: Option<PathBuf>,
    home_dir: Option<PathBuf>,
    xdg_config_dir: Option<PathBuf>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    /// Manager searching the current directory, `$HOME` and the XDG config dir.
    pub fn new() -> Self {
        let home_dir = env::var_os("HOME").map(PathBuf::from);
        let xdg_config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| home_dir.as_ref().map(|home| home.join(".config")));

        Self {
            local_dir: Some(PathBuf::from(".")),
            home_dir,
            xdg_config_dir,
        }
    }

    /// Manager searching explicit directories only.
    pub fn with_dirs(
        local_dir: Option<PathBuf>,
        home_dir: Option<PathBuf>,
        xdg_config_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            local_dir,
            home_dir,
            xdg_config_dir,
        }
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// The file is missing or unreadable, is not valid TOML, or holds
    /// out-of-range values.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, SubenumError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SubenumError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            SubenumError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            SubenumError::config(format!(
                "Failed to parse TOML configuration '{}': {}",
                path.display(),
                e
            ))
        })?;

        validate_config(&config)?;
        debug!(path = %path.display(), "loaded config file");

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config (lowest), then `~/.subenum.toml`, then the local
    /// directory (highest). Files that fail to load are skipped with a
    /// warning.
    pub fn discover_and_load(&self) -> Result<FileConfig, SubenumError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    merged_config = merge_configs(merged_config, config);
                    loaded_files.push(path);
                }
                Err(e) => warn!(error = %e, "ignoring config file"),
            }
        }

        if loaded_files.len() > 1 {
            for path in &loaded_files {
                info!(path = %path.display(), "merged config file");
            }
        }

        Ok(merged_config)
    }

    fn get_local_config_path(&self) -> Option<PathBuf> {
        let dir = self.local_dir.as_ref()?;
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
    }

    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = self.home_dir.as_ref()?;
        [".subenum.toml", "subenum.toml"]
            .iter()
            .map(|name| home.join(name))
            .find(|path| path.exists())
    }

    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let path = self.xdg_config_dir.as_ref()?.join("subenum").join("config.toml");
        if path.exists() {
            Some(path)
        } else {
            None
        }
    }
}

/// Merge two configurations; values from `higher` win field by field.
fn merge_configs(lower: FileConfig, higher: FileConfig) -> FileConfig {
    FileConfig {
        defaults: match (lower.defaults, higher.defaults) {
            (Some(lower_defaults), Some(higher_defaults)) => Some(DefaultsConfig {
                threads: higher_defaults.threads.or(lower_defaults.threads),
                timeout: higher_defaults.timeout.or(lower_defaults.timeout),
                http_timeout: higher_defaults.http_timeout.or(lower_defaults.http_timeout),
                nameservers: higher_defaults.nameservers.or(lower_defaults.nameservers),
                wordlist: higher_defaults.wordlist.or(lower_defaults.wordlist),
            }),
            (lower_defaults, higher_defaults) => higher_defaults.or(lower_defaults),
        },
        output: match (lower.output, higher.output) {
            (Some(lower_output), Some(higher_output)) => Some(OutputConfig {
                candidates: higher_output.candidates.or(lower_output.candidates),
                resolved: higher_output.resolved.or(lower_output.resolved),
            }),
            (lower_output, higher_output) => higher_output.or(lower_output),
        },
    }
}

/// Validate a configuration for common issues.
fn validate_config(config: &FileConfig) -> Result<(), SubenumError> {
    let Some(defaults) = &config.defaults else {
        return Ok(());
    };

    if let Some(threads) = defaults.threads {
        if threads == 0 || threads > MAX_THREADS {
            return Err(SubenumError::config(format!(
                "threads must be between 1 and {}",
                MAX_THREADS
            )));
        }
    }

    for (key, value) in [("timeout", &defaults.timeout), ("http_timeout", &defaults.http_timeout)] {
        if let Some(timeout_str) = value {
            if parse_timeout(timeout_str).is_none() {
                return Err(SubenumError::config(format!(
                    "Invalid {} '{}'. Use format like '5s', '30s', '2m'",
                    key, timeout_str
                )));
            }
        }
    }

    if let Some(nameservers) = &defaults.nameservers {
        for ns in nameservers {
            if parse_nameserver(ns).is_none() {
                return Err(SubenumError::config(format!(
                    "Invalid nameserver '{}'. Use an IP address, optionally with :PORT",
                    ns
                )));
            }
        }
    }

    Ok(())
}

/// Environment variable configuration that mirrors CLI options.
///
/// Read from `SE_THREADS`, `SE_TIMEOUT`, `SE_HTTP_TIMEOUT`,
/// `SE_NAMESERVERS` (comma-separated), `SE_WORDLIST` and `SE_CONFIG`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub threads: Option<usize>,
    pub timeout: Option<Duration>,
    pub http_timeout: Option<Duration>,
    pub nameservers: Option<Vec<SocketAddr>>,
    pub wordlist: Option<String>,
    pub config: Option<String>,
}

impl EnvConfig {
    /// Build from an arbitrary variable lookup. Invalid values are ignored
    /// with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut env_config = EnvConfig::default();

        if let Some(val) = lookup("SE_THREADS") {
            match val.trim().parse::<usize>() {
                Ok(threads) if threads > 0 && threads <= MAX_THREADS => {
                    env_config.threads = Some(threads);
                    info!("using SE_THREADS={}", threads);
                }
                _ => warn!("invalid SE_THREADS='{}', must be 1-{}", val, MAX_THREADS),
            }
        }

        if let Some(val) = lookup("SE_TIMEOUT") {
            match parse_timeout(&val) {
                Some(timeout) => {
                    env_config.timeout = Some(timeout);
                    info!("using SE_TIMEOUT={}", val);
                }
                None => warn!("invalid SE_TIMEOUT='{}', use format like '5s', '2m'", val),
            }
        }

        if let Some(val) = lookup("SE_HTTP_TIMEOUT") {
            match parse_timeout(&val) {
                Some(timeout) => {
                    env_config.http_timeout = Some(timeout);
                    info!("using SE_HTTP_TIMEOUT={}", val);
                }
                None => warn!("invalid SE_HTTP_TIMEOUT='{}', use format like '30s', '1m'", val),
            }
        }

        if let Some(val) = lookup("SE_NAMESERVERS") {
            let parsed: Option<Vec<SocketAddr>> = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(parse_nameserver)
                .collect();
            match parsed {
                Some(nameservers) if !nameservers.is_empty() => {
                    env_config.nameservers = Some(nameservers);
                    info!("using SE_NAMESERVERS={}", val);
                }
                _ => warn!("invalid SE_NAMESERVERS='{}', use comma-separated IP[:PORT]", val),
            }
        }

        if let Some(val) = lookup("SE_WORDLIST") {
            if !val.trim().is_empty() {
                info!("using SE_WORDLIST={}", val);
                env_config.wordlist = Some(val);
            }
        }

        if let Some(val) = lookup("SE_CONFIG") {
            if !val.trim().is_empty() {
                env_config.config = Some(val);
            }
        }

        env_config
    }
}

/// Load configuration from the process environment.
pub fn load_env_config() -> EnvConfig {
    EnvConfig::from_lookup(|key| env::var(key).ok())
}

/// Parse a timeout string like "5s", "30s", "2m", "500ms". A bare number
/// means seconds. Zero is rejected.
pub fn parse_timeout(timeout_str: &str) -> Option<Duration> {
    let timeout_str = timeout_str.trim().to_lowercase();

    let duration = if let Some(ms) = timeout_str.strip_suffix("ms") {
        ms.trim().parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = timeout_str.strip_suffix('s') {
        secs.trim().parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = timeout_str.strip_suffix('m') {
        mins.trim()
            .parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        timeout_str.parse::<u64>().ok().map(Duration::from_secs)
    }?;

    if duration.is_zero() {
        None
    } else {
        Some(duration)
    }
}

/// Parse a nameserver given as `IP`, `IP:PORT` or `[IPv6]:PORT`.
/// Port 53 is assumed when none is given.
pub fn parse_nameserver(value: &str) -> Option<SocketAddr> {
    let value = value.trim();
    if let Ok(addr) = value.parse::<SocketAddr>() {
        return Some(addr);
    }
    value
        .parse::<IpAddr>()
        .ok()
        .map(|ip| SocketAddr::new(ip, 53))
}
