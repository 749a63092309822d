//! The simulation thread.
//!
//! [`spawn`] moves an assembled [`Engine`] onto its own thread, attaches a
//! snapshot publisher and steps until the tick limit is reached or the
//! handle asks it to stop. The engine is never shared: the viewer only sees
//! the snapshots that come out of the feed.

use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use linesim_core::engine::Engine;
use linesim_core::fixed::Ticks;
use linesim_core::publish::{SnapshotFeed, snapshot_channel};
use linesim_core::query::GraphSnapshot;
use tracing::{debug, info};

use crate::error::HostError;

// ===========================================================================
// Options and summary
// ===========================================================================

/// How a run is paced and bounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Stop once the engine reaches this tick. `None` runs until stopped.
    pub ticks: Option<Ticks>,
    /// Wall-clock pause after each step.
    pub tick_interval: Duration,
    /// Snapshots buffered for the viewer before new ones are dropped.
    pub queue_capacity: usize,
}

impl RunOptions {
    /// Run `ticks` steps as fast as possible.
    pub fn bounded(ticks: Ticks) -> Self {
        Self {
            ticks: Some(ticks),
            ..Self::default()
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            ticks: None,
            tick_interval: Duration::ZERO,
            queue_capacity: 64,
        }
    }
}

/// What the simulation thread hands back when it finishes.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub ticks: Ticks,
    pub published: u64,
    pub dropped: u64,
    pub state_hash: u64,
    /// Every level after the last step.
    pub final_state: GraphSnapshot,
}

// ===========================================================================
// Handle
// ===========================================================================

/// Owner-side handle of a running simulation.
///
/// Dropping the handle also stops the thread.
#[derive(Debug)]
pub struct SimHandle {
    stop: Sender<()>,
    thread: JoinHandle<RunSummary>,
}

impl SimHandle {
    /// Ask the simulation to stop after the step in progress.
    pub fn stop(&self) {
        let _ = self.stop.try_send(());
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the simulation thread and collect its summary.
    pub fn join(self) -> Result<RunSummary, HostError> {
        self.thread.join().map_err(|_| HostError::SimThreadPanicked)
    }
}

/// Start stepping `engine` on a new thread.
pub fn spawn(
    mut engine: Engine,
    options: RunOptions,
) -> Result<(SimHandle, SnapshotFeed), HostError> {
    let (publisher, feed) = snapshot_channel(options.queue_capacity);
    engine.set_publisher(publisher);

    let (stop, stop_rx) = crossbeam_channel::bounded(1);
    let thread = std::thread::Builder::new()
        .name("linesim-sim".to_owned())
        .spawn(move || run(engine, &options, &stop_rx))?;

    Ok((SimHandle { stop, thread }, feed))
}

// ===========================================================================
// Loop
// ===========================================================================

fn run(mut engine: Engine, options: &RunOptions, stop: &Receiver<()>) -> RunSummary {
    info!(
        limit = ?options.ticks,
        interval_ms = options.tick_interval.as_millis() as u64,
        queue = options.queue_capacity,
        "simulation started"
    );

    loop {
        if options.ticks.is_some_and(|limit| engine.current_tick() >= limit) {
            break;
        }
        // A disconnected handle counts as a stop request.
        if !matches!(stop.try_recv(), Err(TryRecvError::Empty)) {
            debug!(tick = engine.current_tick(), "stop requested");
            break;
        }

        engine.step();

        if !options.tick_interval.is_zero()
            && !matches!(
                stop.recv_timeout(options.tick_interval),
                Err(RecvTimeoutError::Timeout)
            )
        {
            debug!(tick = engine.current_tick(), "stop requested");
            break;
        }
    }

    let (published, dropped) = engine
        .publisher()
        .map_or((0, 0), |p| (p.published(), p.dropped()));
    let state_hash = engine.state_hash();
    let ticks = engine.current_tick();
    let graph = engine.shutdown();

    RunSummary {
        ticks,
        published,
        dropped,
        state_hash,
        final_state: GraphSnapshot::capture(&graph, ticks),
    }
}
