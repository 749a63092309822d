//! Linesim Core -- behavior-tree driven simulation of bulk production lines.
//!
//! A production line is a [`graph::FlowGraph`] of capacity-bounded
//! [`reservoir::Reservoir`]s: every station (node) holds stock and every
//! buffer between two stations (edge) holds stock in transit. Each
//! productive node owns a behavior tree that decides, once per step, what to
//! move where.
//!
//! # Step pipeline
//!
//! Each call to [`engine::Engine::step`] advances the simulation by one tick:
//!
//! 1. **Tick** -- every node's root is ticked once, in an explicit order.
//! 2. **Bookkeeping** -- increment the tick counter and compute the state hash.
//! 3. **Publish** -- offer a [`query::GraphSnapshot`] to the bounded
//!    snapshot channel, dropping it if the consumer is behind.
//!
//! # Assembly
//!
//! ```rust,ignore
//! let mut graph = FlowGraph::new();
//! let a = graph.add_node("a", fx(100.0), NodeLayout::default());
//! let b = graph.add_node("b", fx(50.0), NodeLayout::default());
//! let e = graph.connect("a-b", fx(50.0), a, b)?;
//!
//! let mut engine = Engine::new(graph);
//! engine.set_behavior(a, mine(a, e, YieldGenerator::constant(fx(10.0)), 1, fx(10.0)))?;
//! engine.step();
//! ```
//!
//! # Key Types
//!
//! - [`engine::Engine`] -- Owns the graph and trees; runs the step pipeline.
//! - [`graph::FlowGraph`] -- Arena-backed directed graph of reservoirs.
//! - [`behavior::BehaviorNode`] -- Closed set of composite, decorator and
//!   leaf nodes, ticked to a [`status::Status`].
//! - [`leaf::Leaf`] -- Conditions and material-moving actions.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic math.
//! - [`publish`] -- Bounded, non-blocking snapshot hand-off.

pub mod behavior;
pub mod builder;
pub mod composite;
pub mod decorator;
pub mod distribution;
pub mod engine;
pub mod fixed;
pub mod graph;
pub mod id;
pub mod leaf;
pub mod publish;
pub mod query;
pub mod reservoir;
pub mod rng;
pub mod sim;
pub mod status;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
