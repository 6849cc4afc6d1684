//! src/poller.rs
//!
//! The per-resource state machine (C3). One `run` future is spawned per resource, driving
//! its own probe cadence independently of every other resource.
//!
//! Concurrency shape: probes are dispatched on a `tokio::time::interval` tick and run as
//! spawned tasks reporting back over an `mpsc` channel, rather than being awaited inline —
//! that's what lets a slow probe `k` still be in flight when the tick for probe `k+1` fires.
//! A `Semaphore` bounds how many of a single resource's probes may be outstanding at once
//! (`simultaneous`); when the bound is hit, the tick is dropped rather than queued.
//!
//! The file-stability window is the one piece of state that must never be touched from more
//! than one place: `FileStability` is owned outright by this task's loop and only ever
//! mutated by the thread processing probe results in receive order.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::Options;
use crate::probe::{self, ProbeOutcome};
use crate::resource::Resource;

/// `{size, firstSeenAt}`, owned by the file poller alone.
struct FileStability {
    last_size: i64,
    first_seen_at: Instant,
}

impl FileStability {
    fn new() -> Self {
        Self {
            last_size: -1,
            first_seen_at: Instant::now(),
        }
    }

    /// Applies one probe's observed size. Returns `true` once the file has held a constant,
    /// non-negative size for at least `window`.
    fn observe(&mut self, size: i64, window: Duration) -> bool {
        if size == -1 {
            self.last_size = -1;
            self.first_seen_at = Instant::now();
            return false;
        }
        if self.last_size == -1 || size != self.last_size {
            self.last_size = size;
            self.first_seen_at = Instant::now();
            return false;
        }
        self.first_seen_at.elapsed() >= window
    }
}

/// Applies the success predicate for one probe outcome, including the
/// reverse-mode inversion. `file_state` is only ever passed to `FileSize` outcomes — a
/// resource's kind never changes mid-run, so every outcome for a given poller is always the
/// same variant.
fn evaluate(outcome: ProbeOutcome, reverse: bool, file_state: &mut FileStability, window: Duration) -> bool {
    match outcome {
        ProbeOutcome::FileSize(size) => {
            if reverse {
                size == -1
            } else {
                file_state.observe(size, window)
            }
        }
        ProbeOutcome::Available(available) => {
            if reverse {
                !available
            } else {
                available
            }
        }
    }
}

/// Drives one resource to completion: delay, then repeated probes at `interval` until the
/// success predicate latches, at which point `idx` is sent on `done_tx` exactly once and the
/// task returns. Returns early (sending nothing) if `cancel` fires first.
pub async fn run(
    idx: usize,
    resource: Arc<Resource>,
    opts: Arc<Options>,
    client: reqwest::Client,
    done_tx: mpsc::UnboundedSender<usize>,
    cancel: CancellationToken,
) {
    if !opts.delay.is_zero() {
        tokio::select! {
            _ = tokio::time::sleep(opts.delay) => {}
            _ = cancel.cancelled() => return,
        }
    }

    let permits = opts.simultaneous.unwrap_or(Semaphore::MAX_PERMITS);
    let semaphore = Arc::new(Semaphore::new(permits));

    let (result_tx, mut result_rx) = mpsc::unbounded_channel::<ProbeOutcome>();
    let mut ticker = tokio::time::interval_at(
        tokio::time::Instant::now(),
        opts.interval.max(Duration::from_millis(1)),
    );

    let mut file_state = FileStability::new();

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => return,

            _ = ticker.tick() => {
                match semaphore.clone().try_acquire_owned() {
                    Ok(permit) => {
                        let resource = resource.clone();
                        let opts = opts.clone();
                        let client = client.clone();
                        let result_tx = result_tx.clone();
                        let probe_cancel = cancel.clone();
                        tokio::spawn(async move {
                            let _permit = permit;
                            tokio::select! {
                                outcome = probe::dispatch(&resource, &opts, &client) => {
                                    let _ = result_tx.send(outcome);
                                }
                                _ = probe_cancel.cancelled() => {
                                    // In-flight syscall is left to return naturally; its
                                    // result is simply never sent.
                                }
                            }
                        });
                    }
                    Err(_) => {
                        debug!(resource = %resource.raw, "poller: dropped tick, simultaneous limit reached");
                    }
                }
            }

            Some(outcome) = result_rx.recv() => {
                if evaluate(outcome, opts.reverse, &mut file_state, opts.window) {
                    let _ = done_tx.send(idx);
                    return;
                }
            }
        }
    }
}
