//! Behavior tree nodes.
//!
//! A tree is a closed set of variants: [`Composite`] nodes order several
//! children, [`Decorator`] nodes wrap exactly one child, and [`Leaf`] nodes
//! read or move material in the [`FlowGraph`]. Dispatch is a `match` on the
//! variant, no trait objects.
//!
//! Trees are built once, validated against the graph when attached to a node
//! (see [`BehaviorNode::validate`]), and never restructured afterwards. Only
//! per-node runtime state changes while ticking: resume indices, delay
//! counters and leaf progress.

use crate::composite::Composite;
use crate::decorator::{Decorator, DecoratorKind};
use crate::graph::{FlowGraph, GraphError};
use crate::leaf::Leaf;
use crate::status::Status;

/// A node in a behavior tree.
#[derive(Debug, Clone)]
pub enum BehaviorNode {
    Composite(Composite),
    Decorator(Decorator),
    Leaf(Leaf),
}

impl BehaviorNode {
    /// Evaluate this node once against the graph.
    ///
    /// Always returns promptly; `Running` asks to be ticked again later.
    pub fn tick(&mut self, graph: &mut FlowGraph) -> Status {
        match self {
            BehaviorNode::Composite(c) => c.tick(graph),
            BehaviorNode::Decorator(d) => d.tick(graph),
            BehaviorNode::Leaf(l) => l.tick(graph),
        }
    }

    /// Append a child during assembly.
    ///
    /// Composites accept any number of children. A decorator keeps its first
    /// child and silently ignores the rest. Leaves ignore children.
    pub fn add_child(&mut self, child: BehaviorNode) {
        match self {
            BehaviorNode::Composite(c) => c.push(child),
            BehaviorNode::Decorator(d) => d.set_child(child),
            BehaviorNode::Leaf(_) => {}
        }
    }

    /// Builder-style [`add_child`](Self::add_child).
    pub fn with_child(mut self, child: BehaviorNode) -> Self {
        self.add_child(child);
        self
    }

    /// Children in tick order. A decorator has at most one; a leaf none.
    pub fn children(&self) -> &[BehaviorNode] {
        match self {
            BehaviorNode::Composite(c) => c.children(),
            BehaviorNode::Decorator(d) => d.child().map(std::slice::from_ref).unwrap_or(&[]),
            BehaviorNode::Leaf(_) => &[],
        }
    }

    pub fn child(&self, index: usize) -> Option<&BehaviorNode> {
        self.children().get(index)
    }

    /// Index a memory composite resumes from. Zero for everything else.
    pub fn resume_index(&self) -> usize {
        match self {
            BehaviorNode::Composite(c) => c.resume_index(),
            _ => 0,
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            BehaviorNode::Leaf(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_decorator(&self) -> Option<&Decorator> {
        match self {
            BehaviorNode::Decorator(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&Composite> {
        match self {
            BehaviorNode::Composite(c) => Some(c),
            _ => None,
        }
    }

    /// Short label for logs and error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            BehaviorNode::Composite(c) => c.kind().name(),
            BehaviorNode::Decorator(d) => d.kind().name(),
            BehaviorNode::Leaf(l) => l.name(),
        }
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn len(&self) -> usize {
        1 + self.children().iter().map(BehaviorNode::len).sum::<usize>()
    }

    /// A tree always contains at least its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check the assembly contract for the whole subtree: every composite
    /// has children, every decorator has its child, and every reservoir a
    /// leaf or guard refers to exists in `graph`.
    pub fn validate(&self, graph: &FlowGraph) -> Result<(), GraphError> {
        match self {
            BehaviorNode::Composite(c) => {
                if c.children().is_empty() {
                    return Err(GraphError::EmptyComposite {
                        kind: c.kind().name(),
                    });
                }
            }
            BehaviorNode::Decorator(d) => {
                if d.child().is_none() {
                    return Err(GraphError::MissingDecoratorChild {
                        kind: d.kind().name(),
                    });
                }
                if let DecoratorKind::ThresholdGuard { target, .. } = d.kind()
                    && !graph.contains_reservoir(*target)
                {
                    return Err(GraphError::DanglingReservoir(*target));
                }
            }
            BehaviorNode::Leaf(l) => {
                if let Some(missing) = l
                    .reservoirs()
                    .into_iter()
                    .find(|r| !graph.contains_reservoir(*r))
                {
                    return Err(GraphError::DanglingReservoir(missing));
                }
            }
        }
        self.children().iter().try_for_each(|c| c.validate(graph))
    }
}

impl From<Composite> for BehaviorNode {
    fn from(c: Composite) -> Self {
        BehaviorNode::Composite(c)
    }
}

impl From<Decorator> for BehaviorNode {
    fn from(d: Decorator) -> Self {
        BehaviorNode::Decorator(d)
    }
}

impl From<Leaf> for BehaviorNode {
    fn from(l: Leaf) -> Self {
        BehaviorNode::Leaf(l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::*;
    use crate::fixed::f64_to_fixed64 as fx;
    use crate::graph::NodeLayout;
    use crate::id::ReservoirId;
    use crate::reservoir::Comparison;

    fn one_node_graph() -> (FlowGraph, ReservoirId) {
        let mut graph = FlowGraph::new();
        let n = graph.add_node("n", fx(10.0), NodeLayout::default());
        (graph, ReservoirId::Node(n))
    }

    #[test]
    fn decorator_keeps_first_child_only() {
        let (graph, r) = one_node_graph();
        let mut rep = BehaviorNode::from(Decorator::new(DecoratorKind::Repeater));
        rep.add_child(threshold(r, fx(0.0), Comparison::AtLeast));
        rep.add_child(space_available(r, fx(1.0)));
        assert_eq!(rep.children().len(), 1);
        assert_eq!(rep.child(0).unwrap().kind_name(), "threshold-condition");
        assert!(rep.validate(&graph).is_ok());
    }

    #[test]
    fn leaf_ignores_children() {
        let (_, r) = one_node_graph();
        let leaf = space_available(r, fx(1.0)).with_child(space_available(r, fx(2.0)));
        assert!(leaf.children().is_empty());
        assert_eq!(leaf.len(), 1);
    }

    #[test]
    fn validate_rejects_empty_composite() {
        let (graph, _) = one_node_graph();
        let tree = sequence(vec![]);
        assert!(matches!(
            tree.validate(&graph),
            Err(GraphError::EmptyComposite { kind: "sequence" })
        ));
    }

    #[test]
    fn validate_rejects_childless_decorator_deep_in_tree() {
        let (graph, r) = one_node_graph();
        let tree = selector(vec![
            space_available(r, fx(1.0)),
            Decorator::new(DecoratorKind::Repeater).into(),
        ]);
        assert!(matches!(
            tree.validate(&graph),
            Err(GraphError::MissingDecoratorChild { kind: "repeater" })
        ));
    }

    #[test]
    fn validate_rejects_foreign_reservoir() {
        let (graph, _) = one_node_graph();
        let (_, foreign) = {
            let mut g = FlowGraph::new();
            g.add_node("a", fx(1.0), NodeLayout::default());
            let b = g.add_node("b", fx(1.0), NodeLayout::default());
            (g, ReservoirId::Node(b))
        };
        let tree = sequence(vec![threshold(foreign, fx(1.0), Comparison::AtLeast)]);
        assert!(matches!(
            tree.validate(&graph),
            Err(GraphError::DanglingReservoir(r)) if r == foreign
        ));
    }

    #[test]
    fn len_counts_whole_subtree() {
        let (_, r) = one_node_graph();
        let tree = sequence(vec![
            space_available(r, fx(1.0)),
            repeater(selector(vec![
                space_available(r, fx(1.0)),
                space_available(r, fx(2.0)),
            ])),
        ]);
        assert_eq!(tree.len(), 6);
    }
}
