//! Terminal output for the subenum CLI.
//!
//! Status lines go to stdout with a `[+]`/`[*]`/`[-]` marker; colors are
//! dropped automatically when stdout is not a terminal.

use console::{pad_str, style, Alignment};
use std::path::Path;
use std::time::Duration;
use subenum_lib::{EnumConfig, Enumeration, Progress, Stage, SubenumError};

// ── Markers ──────────────────────────────────────────────────────────────────

fn ok_marker() -> String {
    style("[+]").green().bold().to_string()
}

fn info_marker() -> String {
    style("[*]").cyan().bold().to_string()
}

fn warn_marker() -> String {
    style("[-]").yellow().bold().to_string()
}

// ── Header ───────────────────────────────────────────────────────────────────

/// Print the banner and run parameters.
pub fn print_header(domain: &str, config: &EnumConfig) {
    println!(
        "{} {} {}",
        style("subenum").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!("target: {}", domain)).dim(),
    );

    let mut meta_parts: Vec<String> = vec![
        format!("Threads: {}", config.threads),
        format!("DNS timeout: {}", format_duration(config.dns_timeout)),
    ];
    match &config.wordlist {
        Some(path) => meta_parts.push(format!("Wordlist: {}", path.display())),
        None => meta_parts.push("Wordlist: none".to_string()),
    }
    if !config.nameservers.is_empty() {
        let servers: Vec<String> = config.nameservers.iter().map(|ns| ns.to_string()).collect();
        meta_parts.push(format!("Resolvers: {}", servers.join(", ")));
    }

    println!("{}", style(meta_parts.join(" | ")).dim());
    println!();
}

// ── Progress ─────────────────────────────────────────────────────────────────

/// Prints pipeline progress as status lines.
pub struct StatusPrinter {
    threads: usize,
    show_hits: bool,
}

impl StatusPrinter {
    pub fn new(threads: usize, show_hits: bool) -> Self {
        Self { threads, show_hits }
    }
}

impl Progress for StatusPrinter {
    fn stage_started(&self, stage: Stage, items: usize) {
        match stage {
            Stage::Passive => println!("{} Querying crt.sh...", info_marker()),
            Stage::BruteForce => println!(
                "{} Brute-forcing {} candidates with {} threads",
                info_marker(),
                items,
                self.threads
            ),
            Stage::Resolution => println!("{} Resolving {} candidates...", info_marker(), items),
            Stage::Persistence => {}
        }
    }

    fn passive_finished(&self, source: &str, found: usize, error: Option<&SubenumError>) {
        match error {
            Some(e) => println!("{} {} lookup failed: {}", warn_marker(), source, e),
            None => println!("{} {} returned {} unique names", ok_marker(), source, found),
        }
    }

    fn wordlist_skipped(&self, path: &Path, reason: &str) {
        println!(
            "{} Skipping brute force ({}): {}",
            warn_marker(),
            path.display(),
            reason
        );
    }

    fn brute_force_hit(&self, host: &str) {
        if self.show_hits {
            println!("    {} {}", style("hit").green().dim(), host);
        }
    }

    fn brute_force_finished(&self, found: usize) {
        println!(
            "{} Brute-force discovered {} resolving names",
            ok_marker(),
            found
        );
    }

    fn candidates_merged(&self, total: usize) {
        println!("{} Total candidate subdomains: {}", info_marker(), total);
    }

    fn host_resolved(&self, host: &str, ips: &[String]) {
        println!("    {}", format_resolved_line(host, ips));
    }

    fn resolution_finished(&self, resolved: usize, _candidates: usize) {
        println!("{} {} hosts resolved to A records", ok_marker(), resolved);
    }

    fn saved(&self, path: &Path) {
        println!("{} Saved {}", ok_marker(), path.display());
    }
}

/// `[+] host -> ip, ip`
pub fn format_resolved_line(host: &str, ips: &[String]) -> String {
    format!("{} {} -> {}", ok_marker(), host, ips.join(", "))
}

// ── Summary ──────────────────────────────────────────────────────────────────

/// Print the closing summary and the final `[+] Done.` line.
pub fn print_summary(run: &Enumeration, duration: Duration) {
    println!();
    println!(
        "  {}",
        style("────────────────────────────────────────────────────").dim()
    );
    println!(
        "  {} {} in {:.1}s  {}  {}  {}  {}",
        style(run.candidates.len()).bold(),
        if run.candidates.len() == 1 {
            "candidate"
        } else {
            "candidates"
        },
        duration.as_secs_f64(),
        style("|").dim(),
        style(format!("{} resolved", run.resolved.len())).green(),
        style("|").dim(),
        style(format!(
            "{} unresolved",
            run.candidates.len().saturating_sub(run.resolved.len())
        ))
        .yellow(),
    );

    let timings = &run.timings;
    let mut stages = vec![
        stage_timing("crt.sh", timings.passive),
        stage_timing("resolution", timings.resolution),
    ];
    if let Some(brute) = timings.brute_force {
        stages.insert(1, stage_timing("brute force", brute));
    }
    println!("  {}", style(stages.join("  ")).dim());
    println!();
    println!("{} Done.", ok_marker());
}

fn stage_timing(label: &str, duration: Duration) -> String {
    format!(
        "{}{}",
        pad_str(&format!("{}:", label), 13, Alignment::Left, None),
        format_duration(duration)
    )
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Compact human duration: `850ms`, `4.2s`, `2m05s`.
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        format!("{:.1}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m{:02}s", secs / 60, secs % 60)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
