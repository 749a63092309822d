//! The simulation engine: owns the flow graph and every node's behavior tree
//! and runs the per-step pipeline.
//!
//! # Architecture
//!
//! The `Engine` owns:
//! - A [`FlowGraph`] (nodes = stations, edges = bounded buffers)
//! - One optional [`BehaviorNode`] root per node (SoA, keyed by `NodeId`)
//! - An explicit tick order
//! - A [`SimState`] (tick counter)
//! - An optional [`SnapshotPublisher`]
//!
//! Trees live beside the graph rather than inside it, so ticking a root can
//! borrow the graph mutably without aliasing the tree.
//!
//! # Step pipeline
//!
//! Each `step()` runs:
//! 1. **Tick** -- every node with a tree is ticked once, in tick order
//! 2. **Bookkeeping** -- update tick counter, compute state hash
//! 3. **Publish** -- offer a snapshot to the publisher, never blocking
//!
//! # Lifecycle
//!
//! Assemble a graph, attach trees with [`Engine::set_behavior`], then call
//! [`Engine::step`] repeatedly and finally [`Engine::shutdown`].

use crate::behavior::BehaviorNode;
use crate::fixed::Ticks;
use crate::graph::{FlowGraph, GraphError};
use crate::id::NodeId;
use crate::publish::SnapshotPublisher;
use crate::query::GraphSnapshot;
use crate::sim::{SimState, StateHash, StepResult};
use crate::status::Status;
use slotmap::SecondaryMap;
use tracing::{debug, info, trace};

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The core simulation engine.
#[derive(Debug)]
pub struct Engine {
    /// The flow graph (nodes and edges).
    graph: FlowGraph,

    /// Behavior tree root of each productive node.
    behaviors: SecondaryMap<NodeId, BehaviorNode>,

    /// Order in which nodes are ticked within a step. Every node exactly once.
    tick_order: Vec<NodeId>,

    /// Simulation state (tick counter).
    pub sim_state: SimState,

    /// The most recently computed state hash.
    last_state_hash: u64,

    /// Where snapshots go after each step, if anywhere.
    publisher: Option<SnapshotPublisher>,
}

impl Engine {
    /// Wrap an assembled graph. Nodes are ticked in insertion order until
    /// [`set_tick_order`](Self::set_tick_order) says otherwise.
    pub fn new(graph: FlowGraph) -> Self {
        let tick_order = graph.node_ids().to_vec();
        let mut engine = Self {
            graph,
            behaviors: SecondaryMap::new(),
            tick_order,
            sim_state: SimState::new(),
            last_state_hash: 0,
            publisher: None,
        };
        engine.last_state_hash = engine.compute_state_hash();
        engine
    }

    // -----------------------------------------------------------------------
    // Assembly
    // -----------------------------------------------------------------------

    /// Attach `tree` as the root of `node`, replacing any previous tree.
    ///
    /// The tree is validated against the graph first; an invalid tree is
    /// rejected and the node keeps what it had.
    pub fn set_behavior(&mut self, node: NodeId, tree: BehaviorNode) -> Result<(), GraphError> {
        if !self.graph.contains_node(node) {
            return Err(GraphError::NodeNotFound(node));
        }
        tree.validate(&self.graph)?;
        debug!(
            node = self.node_name(node),
            root = tree.kind_name(),
            size = tree.len(),
            "behavior attached"
        );
        self.behaviors.insert(node, tree);
        Ok(())
    }

    /// Replace the tick order. `order` must list every node exactly once.
    pub fn set_tick_order(&mut self, order: Vec<NodeId>) -> Result<(), GraphError> {
        let mut seen: SecondaryMap<NodeId, ()> = SecondaryMap::new();
        for &node in &order {
            if !self.graph.contains_node(node) {
                return Err(GraphError::NodeNotFound(node));
            }
            if seen.insert(node, ()).is_some() {
                return Err(GraphError::InvalidTickOrder {
                    detail: format!("node `{}` listed twice", self.node_name(node)),
                });
            }
        }
        if order.len() != self.graph.node_count() {
            return Err(GraphError::InvalidTickOrder {
                detail: format!(
                    "{} of {} nodes listed",
                    order.len(),
                    self.graph.node_count()
                ),
            });
        }
        self.tick_order = order;
        Ok(())
    }

    /// Tick producers before their consumers, so material written to an
    /// edge is visible downstream within the same step.
    pub fn use_upstream_tick_order(&mut self) {
        self.tick_order = self.graph.upstream_order();
    }

    /// Route a snapshot to `publisher` after every step.
    pub fn set_publisher(&mut self, publisher: SnapshotPublisher) {
        self.publisher = Some(publisher);
    }

    // -----------------------------------------------------------------------
    // Stepping
    // -----------------------------------------------------------------------

    /// Run one simulation step.
    pub fn step(&mut self) -> StepResult {
        let mut outcomes = Vec::with_capacity(self.behaviors.len());

        // Phase 1: Tick -- every root once, in order.
        for &node in &self.tick_order {
            let Some(tree) = self.behaviors.get_mut(node) else {
                continue;
            };
            let status = tree.tick(&mut self.graph);
            trace!(
                tick = self.sim_state.tick,
                node = self.graph.get_node(node).map(|d| d.reservoir.name()),
                ?status,
                "node ticked"
            );
            outcomes.push((node, status));
        }

        // Phase 2: Bookkeeping.
        self.sim_state.tick += 1;
        self.last_state_hash = self.compute_state_hash();

        // Phase 3: Publish.
        let tick = self.sim_state.tick;
        let published = match self.publisher.as_mut() {
            Some(publisher) => Some(publisher.offer(GraphSnapshot::capture(&self.graph, tick))),
            None => None,
        };

        let result = StepResult {
            tick,
            outcomes,
            published,
        };
        debug!(
            tick,
            running = result.count(Status::Running),
            succeeded = result.count(Status::Success),
            failed = result.count(Status::Failure),
            "step complete"
        );
        result
    }

    /// Run `steps` steps and return the last step's result.
    pub fn advance(&mut self, steps: Ticks) -> Option<StepResult> {
        let mut last = None;
        for _ in 0..steps {
            last = Some(self.step());
        }
        last
    }

    /// Tick one node's root directly, outside the step pipeline. The tick
    /// counter, hash and publisher are left alone.
    pub fn tick_node(&mut self, node: NodeId) -> Option<Status> {
        let tree = self.behaviors.get_mut(node)?;
        Some(tree.tick(&mut self.graph))
    }

    /// Stop the simulation and hand back the final graph. Dropping the
    /// publisher closes the consumer's feed.
    pub fn shutdown(self) -> FlowGraph {
        let (published, dropped) = self
            .publisher
            .as_ref()
            .map(|p| (p.published(), p.dropped()))
            .unwrap_or_default();
        info!(
            tick = self.sim_state.tick,
            state_hash = self.last_state_hash,
            published,
            dropped,
            "engine shut down"
        );
        self.graph
    }

    // -----------------------------------------------------------------------
    // State hash
    // -----------------------------------------------------------------------

    /// Get the most recently computed state hash.
    pub fn state_hash(&self) -> u64 {
        self.last_state_hash
    }

    /// Hash of the tick counter and every reservoir level, in insertion
    /// order.
    fn compute_state_hash(&self) -> u64 {
        let mut hasher = StateHash::new();
        hasher.write_u64(self.sim_state.tick);
        for (_, node) in self.graph.nodes() {
            hasher.write_fixed64(node.reservoir.current());
        }
        for (_, edge) in self.graph.edges() {
            hasher.write_fixed64(edge.reservoir.current());
        }
        hasher.finish()
    }

    // -----------------------------------------------------------------------
    // Query API (read-only)
    // -----------------------------------------------------------------------

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn behavior(&self, node: NodeId) -> Option<&BehaviorNode> {
        self.behaviors.get(node)
    }

    pub fn tick_order(&self) -> &[NodeId] {
        &self.tick_order
    }

    /// Number of completed steps.
    pub fn current_tick(&self) -> Ticks {
        self.sim_state.tick
    }

    pub fn publisher(&self) -> Option<&SnapshotPublisher> {
        self.publisher.as_ref()
    }

    /// Owned copy of every level, stamped with the current tick.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::capture(&self.graph, self.sim_state.tick)
    }

    fn node_name(&self, node: NodeId) -> &str {
        self.graph
            .get_node(node)
            .map(|d| d.reservoir.name())
            .unwrap_or("?")
    }
}
