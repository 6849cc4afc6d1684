//! Probes (C2): four pluggable availability checks, one per resource kind. Probes are
//! stateless — all per-resource state (the file-stability window) lives in `poller`, never
//! here. Dispatch is a plain match over the tagged `ResourceKind`: resource kind is modeled
//! as a tagged variant with a per-variant probe function, not virtual dispatch or duck
//! typing.

pub mod file;
pub mod http;
pub mod socket;
pub mod tcp;

use reqwest::{Client, Method};

use crate::config::Options;
use crate::resource::{Payload, Resource, ResourceKind};

/// The raw result of one probe invocation, before the reverse-mode / stability predicate is
/// applied by the poller.
#[derive(Debug, Clone, Copy)]
pub enum ProbeOutcome {
    /// File probe result: byte size, or `-1` if the stat failed.
    FileSize(i64),
    /// Every other probe kind: a plain availability bool.
    Available(bool),
}

pub async fn dispatch(resource: &Resource, opts: &Options, client: &Client) -> ProbeOutcome {
    match &resource.payload {
        Payload::File { path } => ProbeOutcome::FileSize(file::stat_size(path).await),

        Payload::Tcp {
            host,
            port: Some(port),
        } => ProbeOutcome::Available(tcp::connect(host, *port, opts.tcp_timeout).await),
        Payload::Tcp { port: None, .. } => ProbeOutcome::Available(false),

        Payload::Socket { path } => ProbeOutcome::Available(socket::connect(path).await),

        Payload::Http { url } => {
            let method = if resource.kind == ResourceKind::HttpGet {
                Method::GET
            } else {
                Method::HEAD
            };
            ProbeOutcome::Available(http::probe(client, url, method, opts).await)
        }

        Payload::HttpUnix {
            socket_path,
            url_path,
        } => {
            let method = if resource.kind == ResourceKind::HttpUnixGet {
                Method::GET
            } else {
                Method::HEAD
            };
            ProbeOutcome::Available(http::probe_unix(socket_path, url_path, method, opts).await)
        }
    }
}
