//! Shorthand constructors for assembling behavior trees.
//!
//! ```rust,ignore
//! let tree = sequence(vec![
//!     threshold(edge.into(), fx(50.0), Comparison::AtLeast),
//!     space_available(node.into(), fx(10.0)),
//!     consume(edge, node, out, fx(50.0), fx(10.0), fx(10.0), fx(50.0)),
//! ]);
//! ```

use crate::behavior::BehaviorNode;
use crate::composite::{Composite, CompositeKind};
use crate::decorator::{Decorator, DecoratorKind};
use crate::distribution::YieldGenerator;
use crate::fixed::{Fixed64, Ticks};
use crate::graph::GraphError;
use crate::id::{EdgeId, NodeId, ReservoirId};
use crate::leaf::*;
use crate::reservoir::Comparison;

// ---------------------------------------------------------------------------
// Composites
// ---------------------------------------------------------------------------

pub fn sequence(children: Vec<BehaviorNode>) -> BehaviorNode {
    Composite::new(CompositeKind::Sequence, children).into()
}

pub fn sequence_with_memory(children: Vec<BehaviorNode>) -> BehaviorNode {
    Composite::new(CompositeKind::SequenceWithMemory, children).into()
}

pub fn selector(children: Vec<BehaviorNode>) -> BehaviorNode {
    Composite::new(CompositeKind::Selector, children).into()
}

pub fn selector_with_memory(children: Vec<BehaviorNode>) -> BehaviorNode {
    Composite::new(CompositeKind::SelectorWithMemory, children).into()
}

// ---------------------------------------------------------------------------
// Decorators
// ---------------------------------------------------------------------------

pub fn delay(ticks: Ticks, child: BehaviorNode) -> BehaviorNode {
    Decorator::wrap(DecoratorKind::delay(ticks), child).into()
}

pub fn repeater(child: BehaviorNode) -> BehaviorNode {
    Decorator::wrap(DecoratorKind::Repeater, child).into()
}

pub fn threshold_guard(
    target: ReservoirId,
    threshold: Fixed64,
    comparison: Comparison,
    child: BehaviorNode,
) -> BehaviorNode {
    Decorator::wrap(
        DecoratorKind::ThresholdGuard {
            target,
            threshold,
            comparison,
        },
        child,
    )
    .into()
}

// ---------------------------------------------------------------------------
// Leaves
// ---------------------------------------------------------------------------

pub fn threshold(target: ReservoirId, threshold: Fixed64, comparison: Comparison) -> BehaviorNode {
    Leaf::ThresholdCondition(ThresholdCondition {
        target,
        threshold,
        comparison,
    })
    .into()
}

pub fn space_available(target: ReservoirId, min_space: Fixed64) -> BehaviorNode {
    Leaf::SpaceAvailable(SpaceAvailable { target, min_space }).into()
}

pub fn raw_transfer(from: ReservoirId, to: ReservoirId, amount: Fixed64) -> BehaviorNode {
    Leaf::RawTransfer(RawTransfer { from, to, amount }).into()
}

pub fn mine(
    node: NodeId,
    out_edge: EdgeId,
    generator: YieldGenerator,
    ticks_per_period: Ticks,
    min_batch: Fixed64,
) -> BehaviorNode {
    Leaf::Mine(Mine::new(node, out_edge, generator, ticks_per_period, min_batch)).into()
}

pub fn train_delivery(
    node: NodeId,
    out_edge: EdgeId,
    wagons: u32,
    wagon_capacity: Fixed64,
) -> BehaviorNode {
    Leaf::TrainDelivery(TrainDelivery {
        node,
        out_edge,
        wagons,
        wagon_capacity,
    })
    .into()
}

pub fn boat_departure(node: NodeId, inc_edge: EdgeId, boat_size: Fixed64) -> BehaviorNode {
    Leaf::BoatDeparture(BoatDeparture {
        node,
        inc_edge,
        boat_size,
    })
    .into()
}

/// A production run fed by one incoming edge.
pub fn consume(
    inc_edge: EdgeId,
    node: NodeId,
    out_edge: EdgeId,
    total_target: Fixed64,
    in_step: Fixed64,
    node_step: Fixed64,
    min_flush: Fixed64,
) -> BehaviorNode {
    Leaf::Consume(Consume {
        inc_edge,
        in_step,
        run: ProductionRun::new(node, out_edge, total_target, node_step, min_flush),
    })
    .into()
}

/// A production run fed by several incoming edges, one step per edge.
pub fn multi_consume(
    inc_edges: &[EdgeId],
    in_steps: &[Fixed64],
    run: ProductionRun,
) -> Result<BehaviorNode, GraphError> {
    Ok(Leaf::MultiConsume(MultiConsume::from_parallel(inc_edges, in_steps, run)?).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_fixed64 as fx;
    use crate::graph::{FlowGraph, NodeLayout};

    #[test]
    fn consume_places_target_before_steps() {
        let mut graph = FlowGraph::new();
        let a = graph.add_node("a", fx(100.0), NodeLayout::default());
        let b = graph.add_node("b", fx(100.0), NodeLayout::default());
        let c = graph.add_node("c", fx(100.0), NodeLayout::default());
        let inc = graph.connect("inc", fx(100.0), a, b).unwrap();
        let out = graph.connect("out", fx(100.0), b, c).unwrap();

        let tree = consume(inc, b, out, fx(60.0), fx(3.0), fx(2.0), fx(10.0));
        let Some(Leaf::Consume(leaf)) = tree.as_leaf() else {
            panic!("expected a consume leaf");
        };
        assert_eq!(leaf.in_step, fx(3.0));
        assert_eq!(leaf.run.total_target, fx(60.0));
        assert_eq!(leaf.run.node_step, fx(2.0));
        assert_eq!(leaf.run.min_flush, fx(10.0));
        assert_eq!(leaf.remaining(), fx(60.0));
    }
}
