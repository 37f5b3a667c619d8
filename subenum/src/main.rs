//! Subenum CLI Application
//!
//! Command-line front end for subenum-lib: discovers subdomains through
//! certificate transparency and an optional wordlist, then resolves every
//! candidate to IPv4 addresses.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::time::Instant;
use subenum_lib::{
    load_env_config, normalize_domain, parse_nameserver, parse_timeout, validate_domain,
    ConfigManager, EnumConfig, Enumerator, EnvConfig, FileConfig, MAX_THREADS,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for subenum
#[derive(Parser, Debug)]
#[command(name = "subenum")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Subdomain enumeration via crt.sh and wordlist brute force")]
#[command(
    long_about = "Discover subdomains of a target domain.\n\nQueries certificate transparency logs (crt.sh), optionally brute-forces a wordlist, then resolves every candidate to A records with bounded concurrency."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Target domain (e.g. example.com)
    #[arg(value_name = "DOMAIN", help_heading = "Target")]
    pub domain: String,

    /// Wordlist for brute force (one word per line)
    #[arg(
        short = 'w',
        long = "wordlist",
        value_name = "FILE",
        help_heading = "Target"
    )]
    pub wordlist: Option<PathBuf>,

    /// Concurrent DNS queries (default: 20, max: 1000)
    #[arg(
        short = 't',
        long = "threads",
        value_name = "N",
        help_heading = "Performance"
    )]
    pub threads: Option<usize>,

    /// Per-query DNS timeout, e.g. "5s", "800ms" (default: 5s)
    #[arg(long = "timeout", value_name = "DURATION", help_heading = "Performance")]
    pub timeout: Option<String>,

    /// crt.sh request timeout (default: 30s)
    #[arg(
        long = "http-timeout",
        value_name = "DURATION",
        help_heading = "Performance"
    )]
    pub http_timeout: Option<String>,

    /// Nameserver to query instead of the system resolvers (repeatable)
    #[arg(
        short = 'r',
        long = "resolver",
        value_name = "IP[:PORT]",
        action = clap::ArgAction::Append,
        help_heading = "Performance"
    )]
    pub resolvers: Vec<String>,

    /// Candidate list output path (default: subdomains.txt)
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        help_heading = "Output"
    )]
    pub output: Option<PathBuf>,

    /// Resolution map output path (default: resolved.json)
    #[arg(long = "save-resolved", value_name = "PATH", help_heading = "Output")]
    pub save_resolved: Option<PathBuf>,

    /// Do not print the banner
    #[arg(long = "no-banner", help_heading = "Output")]
    pub no_banner: bool,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show detailed debug information
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args);

    // Validate arguments
    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    if let Err(e) = run_enumeration(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Install the tracing subscriber. `RUST_LOG` wins over the flags.
fn init_logging(args: &Args) {
    let level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,subenum={0},subenum_lib={0}", level))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(args.debug)
        .try_init();
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    let domain = normalize_domain(&args.domain);
    validate_domain(&domain).map_err(|e| e.to_string())?;

    if let Some(threads) = args.threads {
        if threads == 0 || threads > MAX_THREADS {
            return Err(format!("Threads must be between 1 and {}", MAX_THREADS));
        }
    }

    for (flag, value) in [("--timeout", &args.timeout), ("--http-timeout", &args.http_timeout)] {
        if let Some(value) = value {
            if parse_timeout(value).is_none() {
                return Err(format!(
                    "Invalid {} '{}'. Use format like '5s', '500ms', '2m'",
                    flag, value
                ));
            }
        }
    }

    for resolver in &args.resolvers {
        if parse_nameserver(resolver).is_none() {
            return Err(format!(
                "Invalid --resolver '{}'. Use an IP address, optionally with :PORT",
                resolver
            ));
        }
    }

    Ok(())
}

/// Main enumeration logic
async fn run_enumeration(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&args)?;
    let domain = normalize_domain(&args.domain);

    if !args.no_banner {
        ui::print_header(&domain, &config);
    }

    let progress = ui::StatusPrinter::new(config.threads, args.verbose || args.debug);
    let enumerator = Enumerator::from_config(config)?;

    let start_time = Instant::now();
    let run = enumerator.run(&domain, &progress).await?;

    ui::print_summary(&run, start_time.elapsed());
    Ok(())
}

/// Build EnumConfig from CLI arguments with config file integration.
///
/// Precedence order (highest to lowest):
/// 1. CLI arguments (explicit user input)
/// 2. Environment variables (SE_*)
/// 3. Local config file (./subenum.toml or ./.subenum.toml)
/// 4. Global config file (~/.subenum.toml)
/// 5. XDG config file (~/.config/subenum/config.toml)
/// 6. Built-in defaults
fn build_config(args: &Args) -> Result<EnumConfig, Box<dyn std::error::Error>> {
    let env_config = load_env_config();
    let config_manager = ConfigManager::new();

    // Step 1: explicit config file, else discovery
    let explicit_path = args.config.as_ref().or(env_config.config.as_ref());
    let file_config = match explicit_path {
        Some(path) => {
            info!(path = %path, "using explicit config file");
            config_manager
                .load_file(path)
                .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?
        }
        None => config_manager.discover_and_load().unwrap_or_else(|e| {
            warn!(error = %e, "config discovery failed, using defaults");
            FileConfig::default()
        }),
    };

    let config = merge_file_config_into_enum_config(EnumConfig::default(), file_config);

    // Step 2: environment variables (SE_*)
    let config = apply_environment_config(config, &env_config);

    // Step 3: CLI arguments (highest precedence)
    Ok(apply_cli_args_to_config(config, args))
}

/// Merge FileConfig into EnumConfig. Values were validated when loading.
fn merge_file_config_into_enum_config(mut config: EnumConfig, file_config: FileConfig) -> EnumConfig {
    if let Some(defaults) = file_config.defaults {
        if let Some(threads) = defaults.threads {
            config = config.with_threads(threads);
        }
        if let Some(timeout) = defaults.timeout.as_deref().and_then(parse_timeout) {
            config = config.with_dns_timeout(timeout);
        }
        if let Some(timeout) = defaults.http_timeout.as_deref().and_then(parse_timeout) {
            config = config.with_http_timeout(timeout);
        }
        if let Some(nameservers) = defaults.nameservers {
            config = config.with_nameservers(
                nameservers
                    .iter()
                    .filter_map(|ns| parse_nameserver(ns))
                    .collect(),
            );
        }
        if let Some(wordlist) = defaults.wordlist {
            config = config.with_wordlist(Some(wordlist));
        }
    }

    if let Some(output) = file_config.output {
        if let Some(candidates) = output.candidates {
            config = config.with_output(candidates);
        }
        if let Some(resolved) = output.resolved {
            config = config.with_resolved_output(resolved);
        }
    }

    config
}

/// Apply SE_* environment values; they were validated when read.
fn apply_environment_config(mut config: EnumConfig, env_config: &EnvConfig) -> EnumConfig {
    if let Some(threads) = env_config.threads {
        config = config.with_threads(threads);
    }
    if let Some(timeout) = env_config.timeout {
        config = config.with_dns_timeout(timeout);
    }
    if let Some(timeout) = env_config.http_timeout {
        config = config.with_http_timeout(timeout);
    }
    if let Some(nameservers) = &env_config.nameservers {
        config = config.with_nameservers(nameservers.clone());
    }
    if let Some(wordlist) = &env_config.wordlist {
        config = config.with_wordlist(Some(wordlist));
    }
    config
}

/// Apply CLI arguments to config (highest precedence).
///
/// Only flags the user actually passed override earlier layers.
fn apply_cli_args_to_config(mut config: EnumConfig, args: &Args) -> EnumConfig {
    if let Some(threads) = args.threads {
        config = config.with_threads(threads);
    }
    if let Some(timeout) = args.timeout.as_deref().and_then(parse_timeout) {
        config = config.with_dns_timeout(timeout);
    }
    if let Some(timeout) = args.http_timeout.as_deref().and_then(parse_timeout) {
        config = config.with_http_timeout(timeout);
    }
    if !args.resolvers.is_empty() {
        config = config.with_nameservers(
            args.resolvers
                .iter()
                .filter_map(|ns| parse_nameserver(ns))
                .collect(),
        );
    }
    if args.wordlist.is_some() {
        config = config.with_wordlist(args.wordlist.clone());
    }
    if let Some(output) = &args.output {
        config = config.with_output(output);
    }
    if let Some(resolved) = &args.save_resolved {
        config = config.with_resolved_output(resolved);
    }
    config
}
