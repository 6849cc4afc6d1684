//! src/cli.rs
//!
//! The command-line surface: a thin wrapper whose flag names constrain the option names
//! above. `Cli` is `clap`'s derive struct; `resolve_options` merges a loaded config file
//! with CLI overrides into the `RawOptions` the validator (C6) consumes — the file is just
//! another source of the same option shape, never a separate code path.

use std::path::PathBuf;

use clap::Parser;
use regex::Regex;

use crate::config::RawOptions;
use crate::error::WaitOnError;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "wait-on",
    author,
    version,
    about = "Block until files, ports, sockets, and HTTP(S) endpoints become available"
)]
pub struct Cli {
    /// Resources to wait on: bare paths, or tcp:/socket:/http(s)(-get): URIs.
    /// When given, these override the `resources` list from `--config`.
    pub resources: Vec<String>,

    /// Load options from a JSON or TOML file; exposes the same option shape as the flags
    /// below. Positional resources on the command line override the file's `resources`.
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Delay before the first probe of every resource.
    #[arg(short = 'd', long, value_parser = parse_duration_ms, value_name = "DURATION")]
    pub delay: Option<u64>,

    /// Per-HTTP-request timeout.
    #[arg(long = "httpTimeout", value_parser = parse_duration_ms, value_name = "DURATION")]
    pub http_timeout: Option<u64>,

    /// Poll period for every resource.
    #[arg(short = 'i', long, value_parser = parse_duration_ms, value_name = "DURATION")]
    pub interval: Option<u64>,

    /// Enable progress logging ("waiting for N resources: ...").
    #[arg(short = 'l', long)]
    pub log: bool,

    /// Invert the success predicate: succeed once resources become unavailable.
    #[arg(short = 'r', long)]
    pub reverse: bool,

    /// Max in-flight probes per resource (must be >= 1).
    #[arg(short = 's', long, value_name = "N")]
    pub simultaneous: Option<u64>,

    /// Per-TCP-connect timeout.
    #[arg(long = "tcpTimeout", value_parser = parse_duration_ms, value_name = "DURATION")]
    pub tcp_timeout: Option<u64>,

    /// Global deadline; resources still pending when it elapses cause a timeout error.
    #[arg(short = 't', long, value_parser = parse_duration_ms, value_name = "DURATION")]
    pub timeout: Option<u64>,

    /// Enable debug-level logging of individual probe outcomes. Implies `--log`.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// File-size stability window; normalized to `max(window, interval)`.
    #[arg(short = 'w', long, value_parser = parse_duration_ms, value_name = "DURATION")]
    pub window: Option<u64>,
}

/// Parses the duration grammar `^([\d.]+)(|ms|s|m|h)$`, case-insensitive,
/// floored to an integer millisecond count.
pub fn parse_duration_ms(raw: &str) -> Result<u64, String> {
    let re = Regex::new(r"(?i)^([0-9]*\.?[0-9]+)(ms|s|m|h)?$").unwrap();
    let trimmed = raw.trim();
    let caps = re
        .captures(trimmed)
        .ok_or_else(|| format!("invalid duration: {raw:?}"))?;

    let value: f64 = caps[1]
        .parse()
        .map_err(|_| format!("invalid duration: {raw:?}"))?;

    let unit = caps
        .get(2)
        .map(|m| m.as_str().to_ascii_lowercase())
        .unwrap_or_default();

    let multiplier = match unit.as_str() {
        "" | "ms" => 1.0,
        "s" => 1_000.0,
        "m" => 60_000.0,
        "h" => 3_600_000.0,
        _ => unreachable!("regex only admits ms|s|m|h"),
    };

    Ok((value * multiplier).floor() as u64)
}

/// Merges a loaded config file (if `--config` was given) with CLI overrides into a single
/// `RawOptions`, ready for `config::validate`. CLI flags always win over the file; a
/// non-empty positional `resources` list always wins over the file's.
pub fn resolve_options(cli: Cli) -> Result<RawOptions, WaitOnError> {
    let mut raw = match &cli.config {
        Some(path) => crate::config_file::load(path)?,
        None => RawOptions::default(),
    };

    if !cli.resources.is_empty() {
        raw.resources = Some(cli.resources);
    }
    if cli.delay.is_some() {
        raw.delay = cli.delay;
    }
    if cli.http_timeout.is_some() {
        raw.http_timeout = cli.http_timeout;
    }
    if cli.interval.is_some() {
        raw.interval = cli.interval;
    }
    if cli.log {
        raw.log = Some(true);
    }
    if cli.reverse {
        raw.reverse = Some(true);
    }
    if cli.simultaneous.is_some() {
        raw.simultaneous = cli.simultaneous;
    }
    if cli.tcp_timeout.is_some() {
        raw.tcp_timeout = cli.tcp_timeout;
    }
    if cli.timeout.is_some() {
        raw.timeout = cli.timeout;
    }
    if cli.verbose {
        raw.verbose = Some(true);
    }
    if cli.window.is_some() {
        raw.window = cli.window;
    }

    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_number_is_milliseconds() {
        assert_eq!(parse_duration_ms("250").unwrap(), 250);
    }

    #[test]
    fn explicit_ms_suffix() {
        assert_eq!(parse_duration_ms("250ms").unwrap(), 250);
    }

    #[test]
    fn seconds_suffix() {
        assert_eq!(parse_duration_ms("2s").unwrap(), 2_000);
    }

    #[test]
    fn minutes_suffix_case_insensitive() {
        assert_eq!(parse_duration_ms("1M").unwrap(), 60_000);
    }

    #[test]
    fn hours_suffix() {
        assert_eq!(parse_duration_ms("1h").unwrap(), 3_600_000);
    }

    #[test]
    fn fractional_values_are_floored() {
        assert_eq!(parse_duration_ms("1.5s").unwrap(), 1_500);
        assert_eq!(parse_duration_ms("0.0001s").unwrap(), 0);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_duration_ms("banana").is_err());
        assert!(parse_duration_ms("10x").is_err());
    }

    #[test]
    fn cli_resources_override_config_file_resources() {
        let mut cli = Cli::parse_from(["wait-on", "tcp:localhost:3000"]);
        cli.resources = vec!["tcp:localhost:3000".to_string()];
        let raw = resolve_options(cli).unwrap();
        assert_eq!(raw.resources, Some(vec!["tcp:localhost:3000".to_string()]));
    }

    #[test]
    fn verbose_flag_is_carried_through_to_raw_options() {
        let cli = Cli::parse_from(["wait-on", "-v", "tcp:localhost:3000"]);
        let raw = resolve_options(cli).unwrap();
        assert_eq!(raw.verbose, Some(true));
    }
}
