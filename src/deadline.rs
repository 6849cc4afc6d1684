//! src/deadline.rs
//!
//! The global timer and cancellation source (C5). Races a single `timeout` against external
//! cancellation (fired once the aggregator reports all-done): whichever happens first wins,
//! and the orchestrator cancels the loser's side before delivering its outcome.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::aggregator::PendingFlags;
use crate::error::WaitOnError;
use crate::resource::Resource;

/// Waits for `timeout` to elapse or `cancel` to fire, whichever comes first.
///
/// - `timeout` is `None`: this resolves only when `cancel` fires (there is no deadline), and
///   always returns `None` — a run with no timeout can never time out.
/// - `timeout` fires first: returns `Some(WaitOnError::Timeout(..))` naming every resource
///   still pending at that instant (read from `pending`).
/// - `cancel` fires first (the aggregator completed): returns `None`.
pub async fn run(
    timeout: Option<Duration>,
    pending: PendingFlags,
    resources: Arc<Vec<Resource>>,
    cancel: CancellationToken,
) -> Option<WaitOnError> {
    let Some(timeout) = timeout else {
        cancel.cancelled().await;
        return None;
    };

    tokio::select! {
        _ = tokio::time::sleep(timeout) => {
            let pending = pending.lock().expect("pending flags lock poisoned");
            let names: Vec<&str> = resources
                .iter()
                .zip(pending.iter())
                .filter(|(_, done)| **done)
                .map(|(resource, _)| resource.raw.as_str())
                .collect();
            Some(WaitOnError::Timeout(format!(
                "Timed out waiting for: {}",
                names.join(", ")
            )))
        }
        _ = cancel.cancelled() => None,
    }
}
