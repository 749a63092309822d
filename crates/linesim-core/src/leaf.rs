//! Leaf tasks that read and move material in the flow graph.
//!
//! Conditions ([`ThresholdCondition`], [`SpaceAvailable`]) never mutate.
//! Actions move material only through `Reservoir::increase`/`decrease`,
//! so a rejected move leaves both sides as they were.
//!
//! Every leaf holds graph handles fixed at construction. An unknown handle
//! behaves like an empty, zero-capacity reservoir: conditions fail and
//! transfers are rejected. Trees are validated before they are attached to
//! an engine, so this only matters for trees ticked by hand.

use crate::distribution::YieldGenerator;
use crate::fixed::{Fixed64, Ticks, per_tick};
use crate::graph::{FlowGraph, GraphError};
use crate::id::{EdgeId, NodeId, ReservoirId};
use crate::reservoir::Comparison;
use crate::status::Status;

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

/// Succeeds while a reservoir's level compares true against a threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdCondition {
    pub target: ReservoirId,
    pub threshold: Fixed64,
    pub comparison: Comparison,
}

impl ThresholdCondition {
    pub fn tick(&self, graph: &FlowGraph) -> Status {
        let holds = graph
            .reservoir(self.target)
            .is_some_and(|r| self.comparison.holds(r.current(), self.threshold));
        Status::from_outcome(holds)
    }
}

/// Succeeds while `capacity - current >= min_space`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceAvailable {
    pub target: ReservoirId,
    pub min_space: Fixed64,
}

impl SpaceAvailable {
    pub fn tick(&self, graph: &FlowGraph) -> Status {
        let room = graph
            .reservoir(self.target)
            .is_some_and(|r| r.free_space() >= self.min_space);
        Status::from_outcome(room)
    }
}

// ---------------------------------------------------------------------------
// One-shot actions
// ---------------------------------------------------------------------------

/// Moves `amount` from one reservoir to another if the destination takes it.
///
/// The source is decremented only after the destination accepted the full
/// amount. The source level is not checked; put a guard in front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransfer {
    pub from: ReservoirId,
    pub to: ReservoirId,
    pub amount: Fixed64,
}

impl RawTransfer {
    pub fn tick(&self, graph: &mut FlowGraph) -> Status {
        Status::from_outcome(graph.push(self.from, self.to, self.amount))
    }
}

/// A train arriving with `wagons * wagon_capacity` units for `out_edge`.
///
/// Usually wrapped in a delay to model the time between two trains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainDelivery {
    pub node: NodeId,
    pub out_edge: EdgeId,
    pub wagons: u32,
    pub wagon_capacity: Fixed64,
}

impl TrainDelivery {
    /// Total carried by one train, saturating at `Fixed64::MAX`.
    pub fn load(&self) -> Fixed64 {
        self.wagon_capacity
            .saturating_mul(Fixed64::saturating_from_num(self.wagons))
    }

    pub fn tick(&self, graph: &mut FlowGraph) -> Status {
        Status::from_outcome(graph.increase(self.out_edge.into(), self.load()))
    }
}

/// A boat leaving with `boat_size` units taken from `inc_edge`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoatDeparture {
    pub node: NodeId,
    pub inc_edge: EdgeId,
    pub boat_size: Fixed64,
}

impl BoatDeparture {
    pub fn tick(&self, graph: &mut FlowGraph) -> Status {
        Status::from_outcome(graph.decrease(self.inc_edge.into(), self.boat_size))
    }
}

// ---------------------------------------------------------------------------
// Mine
// ---------------------------------------------------------------------------

/// Extracts ore into `node`, spreading each period's sampled yield evenly
/// over `ticks_per_period` ticks, and ships it to `out_edge` in batches of
/// exactly `min_batch`.
///
/// Keeps returning `Running` while the node can absorb production and
/// `Failure` once it is full.
#[derive(Debug, Clone)]
pub struct Mine {
    pub node: NodeId,
    pub out_edge: EdgeId,
    pub min_batch: Fixed64,
    generator: YieldGenerator,
    ticks_per_period: Ticks,
    period_left: Ticks,
    tick_amount: Fixed64,
}

impl Mine {
    /// Samples the first period's yield immediately. A zero-length period
    /// is treated as one tick.
    pub fn new(
        node: NodeId,
        out_edge: EdgeId,
        mut generator: YieldGenerator,
        ticks_per_period: Ticks,
        min_batch: Fixed64,
    ) -> Self {
        let ticks_per_period = ticks_per_period.max(1);
        let tick_amount = per_tick(generator.sample(), ticks_per_period);
        Self {
            node,
            out_edge,
            min_batch,
            generator,
            ticks_per_period,
            period_left: ticks_per_period,
            tick_amount,
        }
    }

    /// Amount produced per tick in the current period.
    pub fn tick_amount(&self) -> Fixed64 {
        self.tick_amount
    }

    pub fn ticks_per_period(&self) -> Ticks {
        self.ticks_per_period
    }

    pub fn tick(&mut self, graph: &mut FlowGraph) -> Status {
        if self.period_left == 0 {
            self.period_left = self.ticks_per_period;
            self.tick_amount = per_tick(self.generator.sample(), self.ticks_per_period);
        }

        let node = ReservoirId::Node(self.node);
        let produced = graph.increase(node, self.tick_amount);

        if graph.level(node).is_some_and(|level| level >= self.min_batch) {
            graph.push(node, self.out_edge.into(), self.min_batch);
        }

        self.period_left -= 1;
        if produced {
            Status::Running
        } else {
            Status::Failure
        }
    }
}

// ---------------------------------------------------------------------------
// Production runs
// ---------------------------------------------------------------------------

/// Bookkeeping shared by [`Consume`] and [`MultiConsume`]: fill the node by
/// `node_step` per tick, forward to `out_edge` once `min_flush` has built
/// up, and finish after `total_target` has been produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionRun {
    pub node: NodeId,
    pub out_edge: EdgeId,
    pub total_target: Fixed64,
    pub node_step: Fixed64,
    pub min_flush: Fixed64,
    remaining: Fixed64,
}

impl ProductionRun {
    pub fn new(
        node: NodeId,
        out_edge: EdgeId,
        total_target: Fixed64,
        node_step: Fixed64,
        min_flush: Fixed64,
    ) -> Self {
        Self {
            node,
            out_edge,
            total_target,
            node_step,
            min_flush,
            remaining: total_target,
        }
    }

    /// Production still owed before the current run completes.
    pub fn remaining(&self) -> Fixed64 {
        self.remaining
    }

    fn advance(&mut self, graph: &mut FlowGraph) -> Status {
        let node = ReservoirId::Node(self.node);
        let out = ReservoirId::Edge(self.out_edge);

        let _ = graph.increase(node, self.node_step);
        self.remaining -= self.node_step;

        if graph.level(node).is_some_and(|level| level >= self.min_flush) {
            graph.push(node, out, self.node_step);
        }

        if self.remaining >= self.node_step {
            return Status::Running;
        }

        self.remaining = self.total_target;
        if let Some(leftover) = graph.level(node)
            && leftover <= self.min_flush
        {
            graph.push(node, out, leftover);
        }
        Status::Success
    }
}

/// A multi-tick run drawing from one incoming edge.
///
/// Each tick drains `in_step` from `inc_edge` whether or not the edge holds
/// that much; a short edge is simply left as is. Guard the incoming level
/// in front of this leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consume {
    pub inc_edge: EdgeId,
    pub in_step: Fixed64,
    pub run: ProductionRun,
}

impl Consume {
    pub fn remaining(&self) -> Fixed64 {
        self.run.remaining()
    }

    pub fn tick(&mut self, graph: &mut FlowGraph) -> Status {
        let _ = graph.decrease(self.inc_edge.into(), self.in_step);
        self.run.advance(graph)
    }
}

/// [`Consume`] drawing from several incoming edges, each with its own step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiConsume {
    pub inputs: Vec<(EdgeId, Fixed64)>,
    pub run: ProductionRun,
}

impl MultiConsume {
    /// Pair `edges` with `steps` position by position.
    pub fn from_parallel(
        edges: &[EdgeId],
        steps: &[Fixed64],
        run: ProductionRun,
    ) -> Result<Self, GraphError> {
        if edges.len() != steps.len() {
            return Err(GraphError::StepCountMismatch {
                edges: edges.len(),
                steps: steps.len(),
            });
        }
        Ok(Self {
            inputs: edges.iter().copied().zip(steps.iter().copied()).collect(),
            run,
        })
    }

    pub fn remaining(&self) -> Fixed64 {
        self.run.remaining()
    }

    pub fn tick(&mut self, graph: &mut FlowGraph) -> Status {
        for &(edge, step) in &self.inputs {
            let _ = graph.decrease(edge.into(), step);
        }
        self.run.advance(graph)
    }
}

// ---------------------------------------------------------------------------
// Scripted stub
// ---------------------------------------------------------------------------

/// Replays a fixed list of results, repeating the last one, and counts how
/// often it was ticked. Stands in for real leaves in tests.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scripted {
    pub script: Vec<Status>,
    pub ticks: usize,
}

#[cfg(any(test, feature = "test-utils"))]
impl Scripted {
    pub fn tick(&mut self) -> Status {
        let status = match self.script.len() {
            0 => Status::Failure,
            len => self.script[self.ticks.min(len - 1)],
        };
        self.ticks += 1;
        status
    }
}

// ---------------------------------------------------------------------------
// Leaf
// ---------------------------------------------------------------------------

/// Every kind of leaf task. Dispatches via enum match.
#[derive(Debug, Clone)]
pub enum Leaf {
    ThresholdCondition(ThresholdCondition),
    SpaceAvailable(SpaceAvailable),
    RawTransfer(RawTransfer),
    Mine(Mine),
    TrainDelivery(TrainDelivery),
    BoatDeparture(BoatDeparture),
    Consume(Consume),
    MultiConsume(MultiConsume),
    #[cfg(any(test, feature = "test-utils"))]
    Scripted(Scripted),
}

impl Leaf {
    pub fn tick(&mut self, graph: &mut FlowGraph) -> Status {
        match self {
            Leaf::ThresholdCondition(l) => l.tick(graph),
            Leaf::SpaceAvailable(l) => l.tick(graph),
            Leaf::RawTransfer(l) => l.tick(graph),
            Leaf::Mine(l) => l.tick(graph),
            Leaf::TrainDelivery(l) => l.tick(graph),
            Leaf::BoatDeparture(l) => l.tick(graph),
            Leaf::Consume(l) => l.tick(graph),
            Leaf::MultiConsume(l) => l.tick(graph),
            #[cfg(any(test, feature = "test-utils"))]
            Leaf::Scripted(l) => l.tick(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Leaf::ThresholdCondition(_) => "threshold-condition",
            Leaf::SpaceAvailable(_) => "space-available",
            Leaf::RawTransfer(_) => "raw-transfer",
            Leaf::Mine(_) => "mine",
            Leaf::TrainDelivery(_) => "train-delivery",
            Leaf::BoatDeparture(_) => "boat-departure",
            Leaf::Consume(_) => "consume",
            Leaf::MultiConsume(_) => "multi-consume",
            #[cfg(any(test, feature = "test-utils"))]
            Leaf::Scripted(_) => "scripted",
        }
    }

    /// Every reservoir this leaf reads or writes.
    pub fn reservoirs(&self) -> Vec<ReservoirId> {
        match self {
            Leaf::ThresholdCondition(l) => vec![l.target],
            Leaf::SpaceAvailable(l) => vec![l.target],
            Leaf::RawTransfer(l) => vec![l.from, l.to],
            Leaf::Mine(l) => vec![l.node.into(), l.out_edge.into()],
            Leaf::TrainDelivery(l) => vec![l.node.into(), l.out_edge.into()],
            Leaf::BoatDeparture(l) => vec![l.node.into(), l.inc_edge.into()],
            Leaf::Consume(l) => vec![
                l.inc_edge.into(),
                l.run.node.into(),
                l.run.out_edge.into(),
            ],
            Leaf::MultiConsume(l) => l
                .inputs
                .iter()
                .map(|&(edge, _)| edge.into())
                .chain([l.run.node.into(), l.run.out_edge.into()])
                .collect(),
            #[cfg(any(test, feature = "test-utils"))]
            Leaf::Scripted(_) => Vec::new(),
        }
    }

    /// Remaining production of a consume run. `None` for other leaves.
    pub fn remaining(&self) -> Option<Fixed64> {
        match self {
            Leaf::Consume(l) => Some(l.remaining()),
            Leaf::MultiConsume(l) => Some(l.remaining()),
            _ => None,
        }
    }
}
