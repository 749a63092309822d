use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a node (station) in the flow graph.
    pub struct NodeId;

    /// Identifies an edge (buffer between two stations) in the flow graph.
    pub struct EdgeId;
}

/// Handle to any reservoir in the flow graph.
///
/// Leaves store these instead of references: the graph owns the reservoirs
/// and a leaf only looks them up while it is being ticked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservoirId {
    Node(NodeId),
    Edge(EdgeId),
}

impl From<NodeId> for ReservoirId {
    fn from(id: NodeId) -> Self {
        ReservoirId::Node(id)
    }
}

impl From<EdgeId> for ReservoirId {
    fn from(id: EdgeId) -> Self {
        ReservoirId::Edge(id)
    }
}
