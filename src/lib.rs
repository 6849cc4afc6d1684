//! src/lib.rs
//!
//! wait-on: block until a set of heterogeneous resources (files, HTTP(S) endpoints, TCP
//! ports, Unix domain sockets) all become available, or fail once a global deadline elapses.
//!
//! This library is the core concurrent availability engine (C1–C7); `src/main.rs` is a thin
//! CLI wrapper around `run`.

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod config_file;
pub mod deadline;
pub mod error;
pub mod poller;
pub mod probe;
pub mod resource;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use config::{Options, RawOptions};
pub use error::WaitOnError;
pub use resource::Resource;

use aggregator::Aggregator;

/// The orchestrator (C7): validates `raw`, wires C1–C5 together, and reports the outcome
/// exactly once. This is the single public programmatic entry point.
pub async fn run(raw: RawOptions) -> Result<(), WaitOnError> {
    let opts = config::validate(raw)?;

    if opts.reverse {
        info!("reverse mode enabled");
    }

    let resources: Vec<Resource> = opts.resources.iter().map(|r| Resource::parse(r)).collect();
    let resources = Arc::new(resources);

    let client = probe::http::build_client(&opts)?;
    let opts = Arc::new(opts);

    let cancel = CancellationToken::new();
    let aggregator = Aggregator::new(resources.clone());
    let pending = aggregator.pending_handle();

    let (done_tx, done_rx) = mpsc::unbounded_channel::<usize>();

    let mut poller_handles = Vec::with_capacity(resources.len());
    for (idx, resource) in resources.iter().cloned().enumerate() {
        let handle = tokio::spawn(poller::run(
            idx,
            Arc::new(resource),
            opts.clone(),
            client.clone(),
            done_tx.clone(),
            cancel.clone(),
        ));
        poller_handles.push(handle);
    }
    // Drop our own sender so the aggregator's channel can only close once every poller's
    // clone has also been dropped (i.e. every poller task has exited).
    drop(done_tx);

    let agg_fut = aggregator.run(done_rx, opts.log);
    let deadline_fut = deadline::run(opts.timeout, pending, resources.clone(), cancel.clone());

    tokio::pin!(agg_fut);
    tokio::pin!(deadline_fut);

    let outcome = tokio::select! {
        _ = &mut agg_fut => None,
        timeout_err = &mut deadline_fut => timeout_err,
    };

    // Whichever side won, the other is now moot: cancel every poller and any in-flight
    // probe. Cancellation is cooperative — we don't await the poller tasks
    // winding down, since an in-flight syscall is allowed to return naturally and simply
    // has its result discarded.
    cancel.cancel();
    for handle in poller_handles {
        handle.abort();
    }

    match outcome {
        None => Ok(()),
        Some(err) => Err(err),
    }
}

/// Thin callback adapter over `run`, for callers that prefer a callback to an `async fn`.
/// `run` itself is the future/promise-equivalent; this is the callback side of that same
/// boundary. Must be called from within a Tokio runtime.
pub fn run_with_callback<F>(raw: RawOptions, callback: F)
where
    F: FnOnce(Option<WaitOnError>) + Send + 'static,
{
    tokio::spawn(async move {
        match run(raw).await {
            Ok(()) => callback(None),
            Err(e) => callback(Some(e)),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn raw(resources: Vec<&str>) -> RawOptions {
        RawOptions {
            resources: Some(resources.into_iter().map(String::from).collect()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn empty_resources_fails_synchronously_before_any_io() {
        let err = run(RawOptions::default()).await.unwrap_err();
        match err {
            WaitOnError::ConfigInvalid(_) => {}
            _ => panic!("expected ConfigInvalid"),
        }
    }

    #[tokio::test]
    async fn succeeds_once_a_tcp_port_opens() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            loop {
                if listener.accept().await.is_err() {
                    break;
                }
            }
        });

        let mut r = raw(vec![]);
        r.resources = Some(vec![format!("tcp:localhost:{port}")]);
        r.interval = Some(20);
        r.timeout = Some(2_000);

        run(r).await.expect("resource should become available");
    }

    #[tokio::test]
    async fn times_out_when_nothing_becomes_available() {
        let mut r = raw(vec!["tcp:localhost:1"]);
        r.interval = Some(20);
        r.timeout = Some(150);
        r.tcp_timeout = Some(50);

        let err = run(r).await.unwrap_err();
        match err {
            WaitOnError::Timeout(msg) => {
                assert!(msg.starts_with("Timed out waiting for"));
                assert!(msg.contains("tcp:localhost:1"));
            }
            _ => panic!("expected Timeout"),
        }
    }

    #[tokio::test]
    async fn file_becomes_available_once_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ready");

        let spawn_path = path.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            let mut f = std::fs::File::create(&spawn_path).unwrap();
            f.write_all(b"data1").unwrap();
            f.flush().unwrap();
        });

        let mut r = raw(vec![]);
        r.resources = Some(vec![path.to_string_lossy().into_owned()]);
        r.window = Some(0);
        r.interval = Some(20);

        run(r).await.expect("file should eventually stabilize");
    }

    #[tokio::test]
    async fn reverse_mode_succeeds_when_unreachable() {
        let mut r = raw(vec!["tcp:256.0.0.1:1234"]);
        r.reverse = Some(true);
        r.timeout = Some(1_000);
        r.tcp_timeout = Some(200);
        r.interval = Some(20);

        run(r).await.expect("reverse mode should treat unreachable as success");
    }
}
