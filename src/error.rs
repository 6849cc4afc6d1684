//! src/error.rs
//!
//! Central error type for wait-on.
//!
//! Why have our own error enum instead of `anyhow`?
//! - It keeps public function signatures simple: `Result<T, WaitOnError>`.
//! - It lets us print friendly messages (`Display`) while still keeping debug info (`Debug`).
//! - It allows the `?` operator to convert common error types into `WaitOnError` via `From`.
//!
//! Only three kinds ever reach a caller: `ConfigInvalid`, `Timeout`, and `Fatal`. Probe-level
//! failures (connection refused, DNS failure, non-2xx status, ENOENT) are not error variants
//! at all — they are swallowed inside the poller as "not yet available" and never constructed
//! here.

use std::{error::Error, fmt};

/// Top-level error type for the application.
///
/// Each variant corresponds to one of the three user-visible error kinds this crate ever
/// raises. Everything that crosses a library boundary (I/O, HTTP client construction,
/// config-file parsing, a panicked poller task) is folded into one of these at the point
/// where it's caught, rather than kept as its own variant.
#[derive(Debug)]
pub enum WaitOnError {
    /// Validation of the options object failed before any resource was probed.
    ConfigInvalid(String),

    /// The global deadline elapsed before every resource became available.
    /// Message always begins with "Timed out waiting for".
    Timeout(String),

    /// An unexpected runtime failure: a poller task panicked, a handle could not be
    /// cancelled, or an external dependency (HTTP client construction, TLS material)
    /// failed in a way that isn't a plain "not yet available" signal.
    Fatal(String),
}

impl fmt::Display for WaitOnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitOnError::ConfigInvalid(msg) => write!(f, "invalid options: {}", msg),
            WaitOnError::Timeout(msg) => write!(f, "{}", msg),
            WaitOnError::Fatal(msg) => write!(f, "{}", msg),
        }
    }
}

impl Error for WaitOnError {}

impl From<std::io::Error> for WaitOnError {
    fn from(e: std::io::Error) -> Self {
        WaitOnError::Fatal(format!("io error: {}", e))
    }
}

impl From<reqwest::Error> for WaitOnError {
    fn from(e: reqwest::Error) -> Self {
        WaitOnError::Fatal(format!("http client error: {}", e))
    }
}

impl From<tokio::task::JoinError> for WaitOnError {
    fn from(e: tokio::task::JoinError) -> Self {
        WaitOnError::Fatal(format!("task join error: {}", e))
    }
}

impl From<serde_json::Error> for WaitOnError {
    fn from(e: serde_json::Error) -> Self {
        WaitOnError::ConfigInvalid(format!("malformed json config: {}", e))
    }
}

impl From<toml::de::Error> for WaitOnError {
    fn from(e: toml::de::Error) -> Self {
        WaitOnError::ConfigInvalid(format!("malformed toml config: {}", e))
    }
}
