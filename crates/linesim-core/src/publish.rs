//! Bounded hand-off of graph snapshots to a consumer on another thread.
//!
//! The simulation side never blocks: a full queue drops the new snapshot and
//! a vanished consumer is logged once. The consumer side polls.

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError, bounded};
use tracing::{debug, warn};

use crate::query::GraphSnapshot;

/// What happened to a snapshot offered to the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Delivered,
    /// The queue was full; the snapshot was discarded.
    Dropped,
    /// The consumer is gone; the snapshot was discarded.
    Disconnected,
}

/// Create a snapshot channel holding at most `capacity` pending snapshots.
///
/// A capacity of zero is raised to one so a waiting consumer can still
/// receive.
pub fn snapshot_channel(capacity: usize) -> (SnapshotPublisher, SnapshotFeed) {
    let (tx, rx) = bounded(capacity.max(1));
    (
        SnapshotPublisher {
            tx,
            published: 0,
            dropped: 0,
            backlogged: false,
            disconnected: false,
        },
        SnapshotFeed { rx },
    )
}

// ---------------------------------------------------------------------------
// Publisher
// ---------------------------------------------------------------------------

/// Simulation side of the snapshot channel.
#[derive(Debug)]
pub struct SnapshotPublisher {
    tx: Sender<GraphSnapshot>,
    published: u64,
    dropped: u64,
    /// Set by the first drop on a full queue, cleared by the next delivery.
    backlogged: bool,
    disconnected: bool,
}

impl SnapshotPublisher {
    /// Offer a snapshot without blocking.
    pub fn offer(&mut self, snapshot: GraphSnapshot) -> PublishOutcome {
        match self.tx.try_send(snapshot) {
            Ok(()) => {
                self.published += 1;
                if self.backlogged {
                    self.backlogged = false;
                    debug!(dropped = self.dropped, "snapshot consumer caught up");
                }
                PublishOutcome::Delivered
            }
            Err(TrySendError::Full(snapshot)) => {
                self.dropped += 1;
                if self.backlogged {
                    debug!(tick = snapshot.tick, dropped = self.dropped, "snapshot dropped");
                } else {
                    self.backlogged = true;
                    warn!(
                        tick = snapshot.tick,
                        dropped = self.dropped,
                        "snapshot queue full, dropping snapshots until the consumer catches up"
                    );
                }
                PublishOutcome::Dropped
            }
            Err(TrySendError::Disconnected(snapshot)) => {
                self.dropped += 1;
                if !self.disconnected {
                    self.disconnected = true;
                    warn!(tick = snapshot.tick, "snapshot consumer disconnected");
                }
                PublishOutcome::Disconnected
            }
        }
    }

    /// Snapshots accepted by the queue.
    pub fn published(&self) -> u64 {
        self.published
    }

    /// Snapshots discarded because the queue was full or the consumer gone.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Whether the last offer found the queue full.
    pub fn is_backlogged(&self) -> bool {
        self.backlogged
    }
}

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

/// Consumer side of the snapshot channel.
#[derive(Debug, Clone)]
pub struct SnapshotFeed {
    rx: Receiver<GraphSnapshot>,
}

impl SnapshotFeed {
    /// Next pending snapshot, or why there is none.
    pub fn poll(&self) -> FeedPoll {
        match self.rx.try_recv() {
            Ok(snapshot) => FeedPoll::Snapshot(snapshot),
            Err(TryRecvError::Empty) => FeedPoll::Empty,
            Err(TryRecvError::Disconnected) => FeedPoll::Closed,
        }
    }

    /// Next pending snapshot, if any.
    pub fn try_recv(&self) -> Option<GraphSnapshot> {
        self.rx.try_recv().ok()
    }

    /// Drain the queue and keep only the newest snapshot.
    pub fn latest(&self) -> Option<GraphSnapshot> {
        let mut newest = None;
        while let Some(snapshot) = self.try_recv() {
            newest = Some(snapshot);
        }
        newest
    }

    /// Number of snapshots waiting.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Blocking receive. Returns `None` once the publisher is gone and the
    /// queue is drained.
    pub fn recv(&self) -> Option<GraphSnapshot> {
        self.rx.recv().ok()
    }
}

/// Result of polling a [`SnapshotFeed`].
#[derive(Debug, Clone, PartialEq)]
pub enum FeedPoll {
    Snapshot(GraphSnapshot),
    /// Nothing queued yet; poll again later.
    Empty,
    /// The publisher is gone and every snapshot has been consumed.
    Closed,
}
