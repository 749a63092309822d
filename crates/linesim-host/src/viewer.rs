//! Prints snapshots taken off the feed.
//!
//! Stands in for a graphical front end: it only ever reads owned
//! [`GraphSnapshot`]s and never touches the engine.

use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

use linesim_core::fixed::{Ticks, fixed64_to_f64};
use linesim_core::id::NodeId;
use linesim_core::publish::{FeedPoll, SnapshotFeed};
use linesim_core::query::GraphSnapshot;

use crate::error::HostError;

/// How each shown snapshot is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewFormat {
    /// A block of aligned `name  level / capacity` lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// Writes every `every`-th tick of a snapshot stream to `out`.
pub struct Viewer<W: Write> {
    out: W,
    format: ViewFormat,
    every: Ticks,
    latest_only: bool,
    next_due: Ticks,
    shown: u64,
}

impl<W: Write> Viewer<W> {
    /// With `latest_only`, a backlog on the feed is skipped and only its
    /// newest snapshot is considered.
    pub fn new(out: W, format: ViewFormat, every: Ticks, latest_only: bool) -> Self {
        Self {
            out,
            format,
            every: every.max(1),
            latest_only,
            next_due: 0,
            shown: 0,
        }
    }

    /// Snapshots written so far.
    pub fn shown(&self) -> u64 {
        self.shown
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write `snapshot` if it is due. Returns whether it was written.
    pub fn show(&mut self, snapshot: &GraphSnapshot) -> Result<bool, HostError> {
        if snapshot.tick < self.next_due {
            return Ok(false);
        }
        match self.format {
            ViewFormat::Text => write!(self.out, "{}", render_text(snapshot))?,
            ViewFormat::Json => {
                serde_json::to_writer(&mut self.out, snapshot)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        self.next_due = snapshot.tick + self.every;
        self.shown += 1;
        Ok(true)
    }

    /// Drain `feed` until the simulation closes it, sleeping `idle` whenever
    /// nothing is queued. Returns the number of snapshots written.
    pub fn follow(&mut self, feed: &SnapshotFeed, idle: Duration) -> Result<u64, HostError> {
        loop {
            match feed.poll() {
                FeedPoll::Snapshot(snapshot) => {
                    let snapshot = if self.latest_only {
                        feed.latest().unwrap_or(snapshot)
                    } else {
                        snapshot
                    };
                    self.show(&snapshot)?;
                }
                FeedPoll::Empty => std::thread::sleep(idle),
                FeedPoll::Closed => return Ok(self.shown),
            }
        }
    }
}

/// Human-readable dump of one snapshot, nodes first, then edges.
pub fn render_text(snapshot: &GraphSnapshot) -> String {
    let names: HashMap<NodeId, &str> = snapshot
        .nodes
        .iter()
        .map(|n| (n.id, n.name.as_str()))
        .collect();
    let name_of = |id: NodeId| names.get(&id).copied().unwrap_or("?");

    let mut rows: Vec<(String, f64, f64)> =
        Vec::with_capacity(snapshot.nodes.len() + snapshot.edges.len());
    for node in &snapshot.nodes {
        rows.push((
            node.name.clone(),
            fixed64_to_f64(node.current),
            fixed64_to_f64(node.capacity),
        ));
    }
    for edge in &snapshot.edges {
        rows.push((
            format!("{} ({} -> {})", edge.name, name_of(edge.from), name_of(edge.to)),
            fixed64_to_f64(edge.current),
            fixed64_to_f64(edge.capacity),
        ));
    }

    let width = rows.iter().map(|(label, ..)| label.len()).max().unwrap_or(0);
    let mut text = format!("tick {}\n", snapshot.tick);
    for (label, current, capacity) in rows {
        text.push_str(&format!("  {label:<width$}  {current:>12.2} / {capacity:<12.2}\n"));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use linesim_core::publish::snapshot_channel;
    use linesim_core::test_utils::*;

    fn line_snapshot(tick: Ticks) -> GraphSnapshot {
        let (engine, _) = mine_to_consumer();
        let mut snap = engine.snapshot();
        snap.tick = tick;
        snap
    }

    #[test]
    fn text_lists_nodes_then_edges_with_endpoints() {
        let (mut engine, _) = mine_to_consumer();
        engine.advance(3);
        let text = render_text(&engine.snapshot());

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "tick 3");
        assert_eq!(lines.len(), 1 + 3 + 2);
        assert!(lines[1].trim_start().starts_with("mine "));
        assert!(lines[4].contains("feed (mine -> plant)"));
        assert!(lines[4].contains("30.00 / 50.00"));
    }

    #[test]
    fn only_every_nth_tick_is_shown() {
        let mut viewer = Viewer::new(Vec::new(), ViewFormat::Text, 10, false);
        let shown: Vec<bool> = [1, 5, 11, 12, 21, 40]
            .into_iter()
            .map(|t| viewer.show(&line_snapshot(t)).unwrap())
            .collect();
        assert_eq!(shown, [true, false, true, false, true, true]);
        assert_eq!(viewer.shown(), 4);
    }

    #[test]
    fn json_lines_decode_back() {
        let mut viewer = Viewer::new(Vec::new(), ViewFormat::Json, 1, false);
        viewer.show(&line_snapshot(1)).unwrap();
        viewer.show(&line_snapshot(2)).unwrap();

        let out = String::from_utf8(viewer.into_inner()).unwrap();
        let decoded: Vec<GraphSnapshot> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(decoded, vec![line_snapshot(1), line_snapshot(2)]);
    }

    #[test]
    fn follow_returns_once_feed_closes() {
        let (mut publisher, feed) = snapshot_channel(8);
        for tick in 1..=4 {
            publisher.offer(line_snapshot(tick));
        }
        drop(publisher);

        let mut viewer = Viewer::new(Vec::new(), ViewFormat::Json, 1, false);
        assert_eq!(viewer.follow(&feed, Duration::from_millis(1)).unwrap(), 4);
    }

    #[test]
    fn latest_only_skips_backlog() {
        let (mut publisher, feed) = snapshot_channel(8);
        for tick in 1..=4 {
            publisher.offer(line_snapshot(tick));
        }
        drop(publisher);

        let mut viewer = Viewer::new(Vec::new(), ViewFormat::Json, 1, true);
        assert_eq!(viewer.follow(&feed, Duration::from_millis(1)).unwrap(), 1);
        let out = String::from_utf8(viewer.into_inner()).unwrap();
        let shown: GraphSnapshot = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(shown.tick, 4);
    }
}
