//! src/aggregator.rs
//!
//! Combines every poller's single "done" event into one overall completion signal (C4).
//! Each poller owns one slot of a shared pending-flags vector; `Aggregator::run` drains the
//! completion channel until every slot has flipped to done, logging the still-pending subset
//! on each change when `log` is enabled.
//!
//! The pending-flags handle is also shared with the deadline task (C5), which reads it once
//! — on timeout — to report which resources never completed.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::info;

use crate::resource::Resource;

pub type PendingFlags = Arc<Mutex<Vec<bool>>>;

pub struct Aggregator {
    pending: PendingFlags,
    resources: Arc<Vec<Resource>>,
}

impl Aggregator {
    pub fn new(resources: Arc<Vec<Resource>>) -> Self {
        let pending = Arc::new(Mutex::new(vec![true; resources.len()]));
        Self { pending, resources }
    }

    /// A clone of the shared pending-flags handle, for the deadline task to read.
    pub fn pending_handle(&self) -> PendingFlags {
        self.pending.clone()
    }

    fn pending_names(&self) -> Vec<&str> {
        let pending = self.pending.lock().expect("pending flags lock poisoned");
        self.resources
            .iter()
            .zip(pending.iter())
            .filter(|(_, done)| **done)
            .map(|(resource, _)| resource.raw.as_str())
            .collect()
    }

    /// Marks `idx` done if it wasn't already (monotonic latch: once true, stays true).
    /// Returns the remaining pending count after the update.
    fn mark_done(&self, idx: usize) -> (bool, usize) {
        let mut pending = self.pending.lock().expect("pending flags lock poisoned");
        let was_pending = pending[idx];
        if was_pending {
            pending[idx] = false;
        }
        let remaining = pending.iter().filter(|done| **done).count();
        (was_pending, remaining)
    }

    fn remaining(&self) -> usize {
        self.pending
            .lock()
            .expect("pending flags lock poisoned")
            .iter()
            .filter(|done| **done)
            .count()
    }

    /// Drains `done_rx` until every resource is marked done, or the channel closes (every
    /// sender dropped without finishing — only happens once the run has already been
    /// cancelled from elsewhere).
    pub async fn run(&self, mut done_rx: mpsc::UnboundedReceiver<usize>, log: bool) {
        if self.remaining() == 0 {
            return;
        }

        while let Some(idx) = done_rx.recv().await {
            let (newly_done, remaining) = self.mark_done(idx);
            if newly_done && log {
                if remaining == 0 {
                    info!("all resources are available");
                } else {
                    let waiting = self.pending_names();
                    info!("waiting for {} resources: {}", waiting.len(), waiting.join(", "));
                }
            }
            if remaining == 0 {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Resource;

    fn resources(n: usize) -> Arc<Vec<Resource>> {
        Arc::new(
            (0..n)
                .map(|i| Resource::parse(&format!("tcp:localhost:{}", 3000 + i)))
                .collect(),
        )
    }

    #[tokio::test]
    async fn completes_once_every_resource_reports_done() {
        let resources = resources(3);
        let aggregator = Aggregator::new(resources);
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send(0).unwrap();
        tx.send(1).unwrap();
        tx.send(2).unwrap();
        drop(tx);

        aggregator.run(rx, false).await;
        assert_eq!(aggregator.remaining(), 0);
    }

    #[tokio::test]
    async fn duplicate_done_events_do_not_retract() {
        let resources = resources(2);
        let aggregator = Aggregator::new(resources);
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send(0).unwrap();
        tx.send(0).unwrap();
        tx.send(1).unwrap();
        drop(tx);

        aggregator.run(rx, false).await;
        assert_eq!(aggregator.remaining(), 0);
    }

    #[tokio::test]
    async fn closing_channel_early_leaves_pending_resources_pending() {
        let resources = resources(2);
        let aggregator = Aggregator::new(resources);
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(0).unwrap();
        drop(tx);

        aggregator.run(rx, false).await;
        assert_eq!(aggregator.remaining(), 1);
    }
}
