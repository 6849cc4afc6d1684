//! src/resource.rs
//!
//! Classifies a raw resource string (a CLI positional or a config-file list entry) into a
//! `Resource`: a `ResourceKind` tag plus its kind-specific `Payload`. This is the only place
//! resource strings are parsed; every other module works off the typed result.
//!
//! Parsing is regex-driven per the scheme grammar:
//!   file:<path>                          (or a bare path with no scheme at all)
//!   http(s)://...                        HEAD probe
//!   http(s)-get://...                    GET probe
//!   tcp:[host:]port
//!   socket:<path>
//!   http(s)[-get]://unix:<sockPath>:<urlPath>

use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;

/// The kind of availability check a resource requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    File,
    HttpHead,
    HttpGet,
    Tcp,
    Socket,
    HttpUnixHead,
    HttpUnixGet,
}

/// Kind-specific data extracted from the raw resource string.
#[derive(Debug, Clone)]
pub enum Payload {
    File {
        path: PathBuf,
    },
    Http {
        url: String,
    },
    /// `port` is `None` when the `tcp:` payload doesn't match the `[host:]port` grammar.
    /// A malformed TCP URI is not a config error — it reports unavailable on
    /// every probe, which is what lets `reverse` mode wait on an intentionally-bogus host.
    Tcp {
        host: String,
        port: Option<u16>,
    },
    Socket {
        path: PathBuf,
    },
    HttpUnix {
        socket_path: PathBuf,
        url_path: String,
    },
}

/// An immutable, fully-classified resource. Constructed once per input string and shared
/// (via `Arc`) across the poller, aggregator, and deadline tasks for its lifetime.
#[derive(Debug, Clone)]
pub struct Resource {
    pub raw: String,
    pub kind: ResourceKind,
    pub payload: Payload,
}

fn prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(https?-get|https?|tcp|socket|file):(.+)$").unwrap())
}

fn unix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^//unix:([^:]+):(.+)$").unwrap())
}

fn tcp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:([^:]*):)?(\d+)$").unwrap())
}

impl Resource {
    pub fn parse(raw: &str) -> Resource {
        let raw_owned = raw.to_string();

        let Some(caps) = prefix_re().captures(raw) else {
            // No recognized scheme prefix: treat the whole string as a file path.
            return Resource {
                raw: raw_owned,
                kind: ResourceKind::File,
                payload: Payload::File {
                    path: PathBuf::from(raw),
                },
            };
        };

        let scheme = caps[1].to_ascii_lowercase();
        let rest = &caps[2];

        match scheme.as_str() {
            "file" => Resource {
                raw: raw_owned,
                kind: ResourceKind::File,
                payload: Payload::File {
                    path: PathBuf::from(rest),
                },
            },
            "tcp" => {
                let (host, port) = match tcp_re().captures(rest) {
                    Some(c) => {
                        let host = c
                            .get(1)
                            .map(|m| m.as_str())
                            .filter(|s| !s.is_empty())
                            .unwrap_or("localhost")
                            .to_string();
                        let port = c.get(2).and_then(|m| m.as_str().parse::<u16>().ok());
                        (host, port)
                    }
                    None => (rest.to_string(), None),
                };
                Resource {
                    raw: raw_owned,
                    kind: ResourceKind::Tcp,
                    payload: Payload::Tcp { host, port },
                }
            }
            "socket" => Resource {
                raw: raw_owned,
                kind: ResourceKind::Socket,
                payload: Payload::Socket {
                    path: PathBuf::from(rest),
                },
            },
            _ => {
                // http, https, http-get, https-get
                let is_get = scheme.ends_with("-get");
                let base_scheme = if scheme.starts_with("https") {
                    "https"
                } else {
                    "http"
                };

                if let Some(c) = unix_re().captures(rest) {
                    let socket_path = PathBuf::from(&c[1]);
                    let url_path = c[2].to_string();
                    let kind = if is_get {
                        ResourceKind::HttpUnixGet
                    } else {
                        ResourceKind::HttpUnixHead
                    };
                    Resource {
                        raw: raw_owned,
                        kind,
                        payload: Payload::HttpUnix {
                            socket_path,
                            url_path,
                        },
                    }
                } else {
                    let url = format!("{}:{}", base_scheme, rest);
                    let kind = if is_get {
                        ResourceKind::HttpGet
                    } else {
                        ResourceKind::HttpHead
                    };
                    Resource {
                        raw: raw_owned,
                        kind,
                        payload: Payload::Http { url },
                    }
                }
            }
        }
    }
}
