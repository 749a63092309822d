//! Read-only snapshots of the flow graph.
//!
//! All types are owned copies with no references into engine storage, so a
//! snapshot can cross the publish channel to another thread.

use crate::fixed::{Fixed64, Ticks};
use crate::graph::{FlowGraph, NodeLayout};
use crate::id::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Node snapshot
// ---------------------------------------------------------------------------

/// A read-only view of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub name: String,
    pub current: Fixed64,
    pub capacity: Fixed64,
    pub layout: NodeLayout,
}

// ---------------------------------------------------------------------------
// Edge snapshot
// ---------------------------------------------------------------------------

/// A read-only view of one edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub id: EdgeId,
    pub name: String,
    pub current: Fixed64,
    pub capacity: Fixed64,
    /// Source node.
    pub from: NodeId,
    /// Destination node.
    pub to: NodeId,
}

// ---------------------------------------------------------------------------
// Graph snapshot
// ---------------------------------------------------------------------------

/// Every node and edge level after a completed step, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub tick: Ticks,
    pub nodes: Vec<NodeSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
}

impl GraphSnapshot {
    pub fn capture(graph: &FlowGraph, tick: Ticks) -> Self {
        let nodes = graph
            .nodes()
            .map(|(id, data)| NodeSnapshot {
                id,
                name: data.reservoir.name().to_owned(),
                current: data.reservoir.current(),
                capacity: data.reservoir.capacity(),
                layout: data.layout,
            })
            .collect();
        let edges = graph
            .edges()
            .map(|(id, data)| EdgeSnapshot {
                id,
                name: data.reservoir.name().to_owned(),
                current: data.reservoir.current(),
                capacity: data.reservoir.capacity(),
                from: data.from(),
                to: data.to(),
            })
            .collect();
        Self { tick, nodes, edges }
    }

    pub fn node(&self, name: &str) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn edge(&self, name: &str) -> Option<&EdgeSnapshot> {
        self.edges.iter().find(|e| e.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_fixed64 as fx;

    #[test]
    fn capture_copies_levels_and_layout() {
        let mut graph = FlowGraph::new();
        let a = graph.add_node("a", fx(10.0), NodeLayout::new((20.0, 20.0), (20.0, 15.0)));
        let b = graph.add_node("b", fx(10.0), NodeLayout::default());
        let e = graph.connect("a-b", fx(5.0), a, b).unwrap();
        assert!(graph.increase(e.into(), fx(3.0)));

        let snap = GraphSnapshot::capture(&graph, 7);
        assert_eq!(snap.tick, 7);
        assert_eq!(snap.nodes.len(), 2);
        assert_eq!(snap.node("a").unwrap().layout.position, (20.0, 20.0));
        let edge = snap.edge("a-b").unwrap();
        assert_eq!(edge.current, fx(3.0));
        assert_eq!((edge.from, edge.to), (a, b));

        // Later mutation does not leak into the snapshot.
        assert!(graph.increase(e.into(), fx(1.0)));
        assert_eq!(snap.edge("a-b").unwrap().current, fx(3.0));
    }
}
