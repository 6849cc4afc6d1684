//! src/config.rs
//!
//! The options object and its validator (C6). `RawOptions` is the wire/file/CLI shape —
//! every field optional, deserializable straight out of a JSON or TOML config file. `Options`
//! is the normalized, defaulted, and validated shape every other component in this crate
//! consumes; it is built exactly once per run by `validate()`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::error::WaitOnError;

/// Basic-auth credentials for the HTTP(S) probe.
#[derive(Debug, Clone, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: Option<String>,
}

/// The un-validated, fully-optional options shape. This is what a config file deserializes
/// into and what CLI flags get merged onto (see `cli::resolve_options`). Field names follow
/// the CLI flag table (camelCase, matching the original option names).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOptions {
    pub resources: Option<Vec<String>>,
    pub delay: Option<u64>,
    pub interval: Option<u64>,
    pub window: Option<u64>,
    pub timeout: Option<u64>,
    pub http_timeout: Option<u64>,
    pub tcp_timeout: Option<u64>,
    pub simultaneous: Option<u64>,
    pub reverse: Option<bool>,
    pub log: Option<bool>,
    pub verbose: Option<bool>,
    pub follow_redirect: Option<bool>,
    pub strict_ssl: Option<bool>,
    pub ca: Option<PathBuf>,
    pub cert: Option<PathBuf>,
    pub key: Option<PathBuf>,
    pub passphrase: Option<String>,
    pub proxy: Option<String>,
    pub auth: Option<BasicAuth>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

/// The normalized, validated options every component operates on. Read-only after
/// construction: the options object is read-only after validation.
#[derive(Clone)]
pub struct Options {
    pub resources: Vec<String>,
    pub delay: Duration,
    pub interval: Duration,
    pub window: Duration,
    pub timeout: Option<Duration>,
    pub http_timeout: Option<Duration>,
    pub tcp_timeout: Duration,
    /// `None` means unbounded (spec default: `simultaneous` ≥ 1, default ∞).
    pub simultaneous: Option<usize>,
    pub reverse: bool,
    pub log: bool,
    pub verbose: bool,
    pub follow_redirect: bool,
    pub strict_ssl: bool,
    pub ca: Option<PathBuf>,
    pub cert: Option<PathBuf>,
    pub key: Option<PathBuf>,
    pub proxy: Option<String>,
    pub auth: Option<BasicAuth>,
    pub headers: HashMap<String, String>,
    pub validate_status: Arc<dyn Fn(u16) -> bool + Send + Sync>,
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("resources", &self.resources)
            .field("delay", &self.delay)
            .field("interval", &self.interval)
            .field("window", &self.window)
            .field("timeout", &self.timeout)
            .field("http_timeout", &self.http_timeout)
            .field("tcp_timeout", &self.tcp_timeout)
            .field("simultaneous", &self.simultaneous)
            .field("reverse", &self.reverse)
            .field("log", &self.log)
            .field("verbose", &self.verbose)
            .field("follow_redirect", &self.follow_redirect)
            .field("strict_ssl", &self.strict_ssl)
            .finish_non_exhaustive()
    }
}

/// The default `validateStatus` predicate: pass only a 2xx status, regardless of
/// `followRedirect` — the follow-redirect knob only changes whether a 3xx is ever handed to
/// this predicate in the first place (see `probe::http`).
fn default_validate_status() -> Arc<dyn Fn(u16) -> bool + Send + Sync> {
    Arc::new(|status: u16| (200..300).contains(&status))
}

/// Validates and defaults a `RawOptions` into a usable `Options` (C6).
///
/// Rejects: missing/empty `resources`, `simultaneous < 1`, a `passphrase` (the http client
/// has no way to honor it — see below). Non-integer or negative numeric fields are rejected
/// earlier, at config-file deserialization time, since every duration field is typed as
/// `u64` there (see `error::WaitOnError::from<serde_json::Error>` / `from<toml::de::Error>`).
pub fn validate(raw: RawOptions) -> Result<Options, WaitOnError> {
    let resources = raw.resources.unwrap_or_default();
    if resources.is_empty() {
        return Err(WaitOnError::ConfigInvalid(
            "resources is required and must list at least one resource".to_string(),
        ));
    }

    let delay = Duration::from_millis(raw.delay.unwrap_or(0));
    let interval = Duration::from_millis(raw.interval.unwrap_or(250));
    let window = Duration::from_millis(raw.window.unwrap_or(750)).max(interval);
    let timeout = raw.timeout.map(Duration::from_millis);
    let http_timeout = raw.http_timeout.map(Duration::from_millis);
    let tcp_timeout = Duration::from_millis(raw.tcp_timeout.unwrap_or(300));

    let simultaneous = match raw.simultaneous {
        None => None,
        Some(0) => {
            return Err(WaitOnError::ConfigInvalid(
                "simultaneous must be >= 1".to_string(),
            ));
        }
        Some(n) => Some(n as usize),
    };

    let verbose = raw.verbose.unwrap_or(false);
    let log = raw.log.unwrap_or(false) || verbose;

    if raw.passphrase.is_some() {
        return Err(WaitOnError::ConfigInvalid(
            "passphrase is not supported: the rustls-backed http client cannot decrypt an \
             encrypted client key, so cert/key must be unencrypted PEM"
                .to_string(),
        ));
    }

    Ok(Options {
        resources,
        delay,
        interval,
        window,
        timeout,
        http_timeout,
        tcp_timeout,
        simultaneous,
        reverse: raw.reverse.unwrap_or(false),
        log,
        verbose,
        follow_redirect: raw.follow_redirect.unwrap_or(true),
        strict_ssl: raw.strict_ssl.unwrap_or(false),
        ca: raw.ca,
        cert: raw.cert,
        key: raw.key,
        proxy: raw.proxy,
        auth: raw.auth,
        headers: raw.headers,
        validate_status: default_validate_status(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_with_resource() -> RawOptions {
        RawOptions {
            resources: Some(vec!["http://localhost:3000".to_string()]),
            ..Default::default()
        }
    }

    #[test]
    fn rejects_empty_resources() {
        let err = validate(RawOptions::default()).unwrap_err();
        match err {
            WaitOnError::ConfigInvalid(msg) => {
                assert!(msg.contains("resources"));
                assert!(msg.contains("required"));
            }
            _ => panic!("expected ConfigInvalid"),
        }
    }

    #[test]
    fn defaults_match_spec() {
        let opts = validate(raw_with_resource()).unwrap();
        assert_eq!(opts.delay, Duration::from_millis(0));
        assert_eq!(opts.interval, Duration::from_millis(250));
        assert_eq!(opts.window, Duration::from_millis(750));
        assert_eq!(opts.tcp_timeout, Duration::from_millis(300));
        assert!(opts.timeout.is_none());
        assert!(opts.simultaneous.is_none());
        assert!(opts.follow_redirect);
        assert!(!opts.strict_ssl);
    }

    #[test]
    fn window_is_normalized_to_at_least_interval() {
        let mut raw = raw_with_resource();
        raw.window = Some(100);
        raw.interval = Some(500);
        let opts = validate(raw).unwrap();
        assert_eq!(opts.window, Duration::from_millis(500));
    }

    #[test]
    fn verbose_implies_log() {
        let mut raw = raw_with_resource();
        raw.verbose = Some(true);
        let opts = validate(raw).unwrap();
        assert!(opts.log);
        assert!(opts.verbose);
    }

    #[test]
    fn simultaneous_zero_is_rejected() {
        let mut raw = raw_with_resource();
        raw.simultaneous = Some(0);
        assert!(validate(raw).is_err());
    }

    #[test]
    fn passphrase_is_rejected_rather_than_silently_dropped() {
        let mut raw = raw_with_resource();
        raw.passphrase = Some("secret".to_string());
        match validate(raw).unwrap_err() {
            WaitOnError::ConfigInvalid(msg) => assert!(msg.contains("passphrase")),
            _ => panic!("expected ConfigInvalid"),
        }
    }

    #[test]
    fn default_validate_status_accepts_only_2xx() {
        let opts = validate(raw_with_resource()).unwrap();
        assert!((opts.validate_status)(200));
        assert!((opts.validate_status)(299));
        assert!(!(opts.validate_status)(301));
        assert!(!(opts.validate_status)(404));
    }
}
