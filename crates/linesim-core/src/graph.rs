use crate::fixed::Fixed64;
use crate::id::*;
use crate::reservoir::Reservoir;
use serde::{Deserialize, Serialize};
use slotmap::{SecondaryMap, SlotMap};
use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while assembling the flow graph or its trees.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),
    #[error("edge not found: {0:?}")]
    EdgeNotFound(EdgeId),
    #[error("behavior tree references a reservoir that is not in the graph: {0:?}")]
    DanglingReservoir(ReservoirId),
    #[error("{kind} composite has no children")]
    EmptyComposite { kind: &'static str },
    #[error("{kind} decorator has no child")]
    MissingDecoratorChild { kind: &'static str },
    #[error("invalid tick order: {detail}")]
    InvalidTickOrder { detail: String },
    #[error("multi-consume needs one step per incoming edge ({edges} edges, {steps} steps)")]
    StepCountMismatch { edges: usize, steps: usize },
}

// ---------------------------------------------------------------------------
// Core data structures
// ---------------------------------------------------------------------------

/// Where a node is drawn, as percentages of the canvas. Rendering only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeLayout {
    pub position: (f32, f32),
    pub size: (f32, f32),
}

impl NodeLayout {
    pub fn new(position: (f32, f32), size: (f32, f32)) -> Self {
        Self { position, size }
    }
}

/// Adjacency lists for a single node, tracking incoming and outgoing edges.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct NodeAdjacency {
    /// Edges whose destination is this node.
    inputs: Vec<EdgeId>,
    /// Edges whose source is this node.
    outputs: Vec<EdgeId>,
}

/// Per-node data stored in the flow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeData {
    pub reservoir: Reservoir,
    pub layout: NodeLayout,
}

/// Per-edge data stored in the flow graph. Endpoints never change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeData {
    pub reservoir: Reservoir,
    from: NodeId,
    to: NodeId,
}

impl EdgeData {
    /// Source node.
    pub fn from(&self) -> NodeId {
        self.from
    }

    /// Destination node.
    pub fn to(&self) -> NodeId {
        self.to
    }
}

// ---------------------------------------------------------------------------
// FlowGraph
// ---------------------------------------------------------------------------

/// The flow graph: stations (nodes) joined by bounded buffers (edges).
///
/// Nodes and edges live in `SlotMap` arenas and refer to each other by key,
/// so there are no reference cycles. The graph is append-only: nothing is
/// removed once assembled. Insertion order is recorded so the engine can
/// tick nodes in a stable, explicit order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowGraph {
    nodes: SlotMap<NodeId, NodeData>,
    edges: SlotMap<EdgeId, EdgeData>,
    adjacency: SecondaryMap<NodeId, NodeAdjacency>,
    node_order: Vec<NodeId>,
    edge_order: Vec<EdgeId>,
}

impl Default for FlowGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowGraph {
    /// Create a new, empty flow graph.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            edges: SlotMap::with_key(),
            adjacency: SecondaryMap::new(),
            node_order: Vec::new(),
            edge_order: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Assembly
    // -----------------------------------------------------------------------

    /// Add an empty node with the given capacity.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        capacity: Fixed64,
        layout: NodeLayout,
    ) -> NodeId {
        let node_id = self.nodes.insert(NodeData {
            reservoir: Reservoir::new(name, capacity),
            layout,
        });
        self.adjacency.insert(node_id, NodeAdjacency::default());
        self.node_order.push(node_id);
        node_id
    }

    /// Connect two existing nodes with an empty edge buffer.
    pub fn connect(
        &mut self,
        name: impl Into<String>,
        capacity: Fixed64,
        from: NodeId,
        to: NodeId,
    ) -> Result<EdgeId, GraphError> {
        if !self.nodes.contains_key(from) {
            return Err(GraphError::NodeNotFound(from));
        }
        if !self.nodes.contains_key(to) {
            return Err(GraphError::NodeNotFound(to));
        }

        let edge_id = self.edges.insert(EdgeData {
            reservoir: Reservoir::new(name, capacity),
            from,
            to,
        });

        if let Some(adj) = self.adjacency.get_mut(from) {
            adj.outputs.push(edge_id);
        }
        if let Some(adj) = self.adjacency.get_mut(to) {
            adj.inputs.push(edge_id);
        }
        self.edge_order.push(edge_id);
        Ok(edge_id)
    }

    // -----------------------------------------------------------------------
    // Reservoir access
    // -----------------------------------------------------------------------

    /// Look up the reservoir behind a handle.
    pub fn reservoir(&self, id: ReservoirId) -> Option<&Reservoir> {
        match id {
            ReservoirId::Node(n) => self.nodes.get(n).map(|d| &d.reservoir),
            ReservoirId::Edge(e) => self.edges.get(e).map(|d| &d.reservoir),
        }
    }

    /// Mutable lookup. Mutation still only goes through `increase`/`decrease`.
    pub fn reservoir_mut(&mut self, id: ReservoirId) -> Option<&mut Reservoir> {
        match id {
            ReservoirId::Node(n) => self.nodes.get_mut(n).map(|d| &mut d.reservoir),
            ReservoirId::Edge(e) => self.edges.get_mut(e).map(|d| &mut d.reservoir),
        }
    }

    pub fn contains_reservoir(&self, id: ReservoirId) -> bool {
        match id {
            ReservoirId::Node(n) => self.nodes.contains_key(n),
            ReservoirId::Edge(e) => self.edges.contains_key(e),
        }
    }

    /// Current level of a reservoir, or `None` for an unknown handle.
    pub fn level(&self, id: impl Into<ReservoirId>) -> Option<Fixed64> {
        self.reservoir(id.into()).map(Reservoir::current)
    }

    /// `increase` on the reservoir behind `id`. Unknown handles fail.
    #[must_use = "a rejected increase leaves the reservoir unchanged"]
    pub fn increase(&mut self, id: ReservoirId, amount: Fixed64) -> bool {
        self.reservoir_mut(id).is_some_and(|r| r.increase(amount))
    }

    /// `decrease` on the reservoir behind `id`. Unknown handles fail.
    #[must_use = "a rejected decrease leaves the reservoir unchanged"]
    pub fn decrease(&mut self, id: ReservoirId, amount: Fixed64) -> bool {
        self.reservoir_mut(id).is_some_and(|r| r.decrease(amount))
    }

    /// Push `amount` into `to`, and only if it was accepted take it out of
    /// `from`. Returns whether `to` accepted the amount.
    ///
    /// The result of the source decrement is not consulted: callers guard
    /// the source level themselves before pushing.
    pub fn push(&mut self, from: ReservoirId, to: ReservoirId, amount: Fixed64) -> bool {
        if !self.increase(to, amount) {
            return false;
        }
        let _ = self.decrease(from, amount);
        true
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Get the node data for a given node ID.
    pub fn get_node(&self, node: NodeId) -> Option<&NodeData> {
        self.nodes.get(node)
    }

    /// Get the edge data for a given edge ID.
    pub fn get_edge(&self, edge: EdgeId) -> Option<&EdgeData> {
        self.edges.get(edge)
    }

    /// Get the edges coming into a node, in connection order.
    pub fn get_inputs(&self, node: NodeId) -> &[EdgeId] {
        self.adjacency
            .get(node)
            .map(|adj| adj.inputs.as_slice())
            .unwrap_or(&[])
    }

    /// Get the edges going out of a node, in connection order.
    pub fn get_outputs(&self, node: NodeId) -> &[EdgeId] {
        self.adjacency
            .get(node)
            .map(|adj| adj.outputs.as_slice())
            .unwrap_or(&[])
    }

    /// Total number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns true if the node exists in the graph.
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    /// Returns true if the edge exists in the graph.
    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        self.edges.contains_key(edge)
    }

    /// Node IDs in insertion order.
    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_order
    }

    /// Edge IDs in insertion order.
    pub fn edge_ids(&self) -> &[EdgeId] {
        &self.edge_order
    }

    /// Iterate over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &NodeData)> {
        self.node_order
            .iter()
            .filter_map(|&id| self.nodes.get(id).map(|d| (id, d)))
    }

    /// Iterate over all edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &EdgeData)> {
        self.edge_order
            .iter()
            .filter_map(|&id| self.edges.get(id).map(|d| (id, d)))
    }

    /// Find a node by reservoir name. First match in insertion order.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.nodes()
            .find(|(_, d)| d.reservoir.name() == name)
            .map(|(id, _)| id)
    }

    /// Find an edge by reservoir name. First match in insertion order.
    pub fn find_edge(&self, name: &str) -> Option<EdgeId> {
        self.edges()
            .find(|(_, d)| d.reservoir.name() == name)
            .map(|(id, _)| id)
    }

    // -----------------------------------------------------------------------
    // Upstream-first ordering (Kahn's algorithm)
    // -----------------------------------------------------------------------

    /// Returns an upstream-first node order even when cycles exist.
    ///
    /// Runs Kahn's algorithm seeded in insertion order. Nodes left over
    /// because they sit on a cycle are appended in insertion order. Ticking
    /// in this order makes every edge written by a producer visible to its
    /// consumer within the same step.
    pub fn upstream_order(&self) -> Vec<NodeId> {
        let node_count = self.nodes.len();

        let mut in_degree: SecondaryMap<NodeId, usize> = SecondaryMap::new();
        for &nid in &self.node_order {
            in_degree.insert(nid, 0);
        }
        for (_, edge) in &self.edges {
            if let Some(deg) = in_degree.get_mut(edge.to) {
                *deg += 1;
            }
        }

        let mut queue: VecDeque<NodeId> = self
            .node_order
            .iter()
            .copied()
            .filter(|&nid| in_degree.get(nid).copied() == Some(0))
            .collect();

        let mut order: Vec<NodeId> = Vec::with_capacity(node_count);
        let mut placed: SecondaryMap<NodeId, ()> = SecondaryMap::new();

        while let Some(node) = queue.pop_front() {
            order.push(node);
            placed.insert(node, ());

            for &eid in self.get_outputs(node) {
                let Some(dest) = self.edges.get(eid).map(|e| e.to) else {
                    continue;
                };
                if let Some(deg) = in_degree.get_mut(dest) {
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(dest);
                    }
                }
            }
        }

        if order.len() < node_count {
            order.extend(
                self.node_order
                    .iter()
                    .copied()
                    .filter(|nid| !placed.contains_key(*nid)),
            );
        }

        order
    }
}
