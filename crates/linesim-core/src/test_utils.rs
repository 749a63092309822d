//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::behavior::BehaviorNode;
use crate::builder::*;
use crate::distribution::YieldGenerator;
use crate::engine::Engine;
use crate::fixed::Fixed64;
use crate::graph::{FlowGraph, NodeLayout};
use crate::id::*;
use crate::leaf::{Leaf, Scripted};
use crate::reservoir::Comparison;
use crate::status::Status;

// ===========================================================================
// Fixed-point helper
// ===========================================================================

pub fn fx(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

// ===========================================================================
// Scripted leaves
// ===========================================================================

pub const S: Status = Status::Success;
pub const F: Status = Status::Failure;
pub const R: Status = Status::Running;

/// A leaf that replays `script`, repeating its last entry.
pub fn scripted(script: &[Status]) -> BehaviorNode {
    Leaf::Scripted(Scripted {
        script: script.to_vec(),
        ticks: 0,
    })
    .into()
}

/// How often the scripted leaf at `path` (child indices from `tree`) was
/// ticked.
///
/// # Panics
///
/// If `path` does not lead to a scripted leaf.
pub fn script_ticks(tree: &BehaviorNode, path: &[usize]) -> usize {
    let mut node = tree;
    for &index in path {
        node = node
            .child(index)
            .unwrap_or_else(|| panic!("no child {index} on path {path:?}"));
    }
    match node.as_leaf() {
        Some(Leaf::Scripted(s)) => s.ticks,
        other => panic!("expected a scripted leaf at {path:?}, found {other:?}"),
    }
}

// ===========================================================================
// Small lines
// ===========================================================================

/// Handles of the line built by [`mine_to_consumer`].
#[derive(Debug, Clone, Copy)]
pub struct MineLine {
    pub mine: NodeId,
    pub plant: NodeId,
    pub sink: NodeId,
    /// mine -> plant
    pub feed: EdgeId,
    /// plant -> sink
    pub out: EdgeId,
}

/// A mine feeding a consuming plant that forwards to a sink.
///
/// - mine (cap 100) produces a constant 10 per tick and ships in batches of
///   10 onto `feed` (cap 50).
/// - plant (cap 50) waits for `feed >= 50`, then runs a 5-tick consume of 10
///   per tick into itself, holding output until 50 has built up.
///
/// The plant is ticked before the mine.
pub fn mine_to_consumer() -> (Engine, MineLine) {
    let mut graph = FlowGraph::new();
    let mine = graph.add_node("mine", fx(100.0), NodeLayout::default());
    let plant = graph.add_node("plant", fx(50.0), NodeLayout::default());
    let sink = graph.add_node("sink", fx(1000.0), NodeLayout::default());
    let feed = graph
        .connect("feed", fx(50.0), mine, plant)
        .expect("fresh nodes");
    let out = graph
        .connect("out", fx(1000.0), plant, sink)
        .expect("fresh nodes");

    let mut engine = Engine::new(graph);
    engine
        .set_behavior(
            mine,
            crate::builder::mine(mine, feed, YieldGenerator::constant(fx(10.0)), 1, fx(10.0)),
        )
        .expect("mine tree is valid");
    engine
        .set_behavior(
            plant,
            sequence(vec![
                threshold(feed.into(), fx(50.0), Comparison::AtLeast),
                space_available(plant.into(), fx(10.0)),
                consume(feed, plant, out, fx(50.0), fx(10.0), fx(10.0), fx(50.0)),
            ]),
        )
        .expect("plant tree is valid");
    engine
        .set_tick_order(vec![plant, mine, sink])
        .expect("every node listed once");

    (
        engine,
        MineLine {
            mine,
            plant,
            sink,
            feed,
            out,
        },
    )
}

/// A mine feeding `stages` consuming stations in series, ending at a dock
/// that ships 100 at a time. Ticked upstream first.
///
/// Every station runs the usual consumer shape: finish a partial batch if
/// one is waiting, otherwise wait for 20 on the incoming edge and produce 20
/// in steps of 2.
pub fn chain(stages: usize, seed: u64) -> Engine {
    let mut graph = FlowGraph::new();
    let mine = graph.add_node("mine", fx(1000.0), NodeLayout::default());
    let mut stations = Vec::with_capacity(stages);
    for i in 0..stages {
        stations.push(graph.add_node(format!("station {i}"), fx(200.0), NodeLayout::default()));
    }
    let dock = graph.add_node("dock", fx(0.0), NodeLayout::default());

    let mut edges = Vec::with_capacity(stages + 1);
    let mut prev = mine;
    for &next in stations.iter().chain(std::iter::once(&dock)) {
        let name = format!("edge {}", edges.len());
        edges.push(graph.connect(name, fx(500.0), prev, next).expect("fresh nodes"));
        prev = next;
    }

    let mut engine = Engine::new(graph);
    let ore = YieldGenerator::triangular(crate::distribution::Triangular::ORE_YIELD, seed);
    engine
        .set_behavior(mine, crate::builder::mine(mine, edges[0], ore, 10, fx(5.0)))
        .expect("mine tree is valid");

    for (i, &station) in stations.iter().enumerate() {
        let (inc, out) = (edges[i], edges[i + 1]);
        let tree = sequence_with_memory(vec![
            space_available(out.into(), fx(20.0)),
            selector_with_memory(vec![
                threshold_guard(
                    station.into(),
                    fx(20.0),
                    Comparison::AtLeast,
                    raw_transfer(station.into(), out.into(), fx(20.0)),
                ),
                sequence_with_memory(vec![
                    threshold(inc.into(), fx(20.0), Comparison::AtLeast),
                    repeater(sequence(vec![
                        space_available(station.into(), fx(2.0)),
                        consume(inc, station, out, fx(20.0), fx(2.0), fx(2.0), fx(20.0)),
                    ])),
                ]),
            ]),
        ]);
        engine.set_behavior(station, tree).expect("station tree is valid");
    }

    let last = edges[stages];
    engine
        .set_behavior(
            dock,
            sequence(vec![
                threshold(last.into(), fx(100.0), Comparison::AtLeast),
                boat_departure(dock, last, fx(100.0)),
            ]),
        )
        .expect("dock tree is valid");
    engine.use_upstream_tick_order();
    engine
}
