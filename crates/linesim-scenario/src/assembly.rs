//! Builds the reference ore line from a [`ScenarioConfig`].
//!
//! ```text
//!   train --Train--> receipt --receipt--> preparation --tank--> treatment --pit 2--> shipment --boat--> boat
//!                                                                  ^
//!   mining ---------------------------pit 1------------------------+
//! ```
//!
//! The train and the boat are zero-capacity endpoints: the train delivers a
//! full load onto its edge every refresh period and the boat leaves as soon
//! as its edge holds a full boat.

use linesim_core::behavior::BehaviorNode;
use linesim_core::builder::*;
use linesim_core::distribution::{Triangular, YieldGenerator};
use linesim_core::engine::Engine;
use linesim_core::fixed::{Fixed64, f64_to_fixed64, per_tick};
use linesim_core::graph::{FlowGraph, NodeLayout};
use linesim_core::id::{EdgeId, NodeId};
use linesim_core::leaf::ProductionRun;
use linesim_core::reservoir::Comparison;
use tracing::{debug, info};

use crate::config::ScenarioConfig;
use crate::loader::ScenarioError;

/// Station footprint used by the diagram.
const STATION_SIZE: (f32, f32) = (20.0, 15.0);

/// Handles into an assembled reference line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceLine {
    pub train: NodeId,
    pub receipt: NodeId,
    pub mining: NodeId,
    pub preparation: NodeId,
    pub treatment: NodeId,
    pub shipment: NodeId,
    pub boat: NodeId,

    /// train -> receipt
    pub rail: EdgeId,
    /// receipt -> preparation
    pub receipt_out: EdgeId,
    /// mining -> treatment
    pub pit_1: EdgeId,
    /// preparation -> treatment
    pub tank: EdgeId,
    /// treatment -> shipment
    pub pit_2: EdgeId,
    /// shipment -> boat
    pub boat_edge: EdgeId,
}

/// Assemble the line and return only the engine.
pub fn build(config: &ScenarioConfig) -> Result<Engine, ScenarioError> {
    assemble(config).map(|(engine, _)| engine)
}

/// Validate `config`, build the graph, attach every station's tree and pick
/// the tick order.
pub fn assemble(config: &ScenarioConfig) -> Result<(Engine, ReferenceLine), ScenarioError> {
    config.validate()?;

    let (graph, line) = build_graph(config)?;
    let mut engine = Engine::new(graph);

    engine.set_behavior(line.train, train_tree(config, &line))?;
    engine.set_behavior(line.receipt, receipt_tree(config, &line))?;
    engine.set_behavior(line.mining, mining_tree(config, &line)?)?;
    engine.set_behavior(line.preparation, preparation_tree(config, &line))?;
    engine.set_behavior(line.treatment, treatment_tree(config, &line)?)?;
    engine.set_behavior(line.shipment, shipment_tree(config, &line))?;
    engine.set_behavior(line.boat, boat_tree(config, &line))?;

    if config.simulation.upstream_first {
        engine.use_upstream_tick_order();
    }

    info!(
        nodes = engine.graph().node_count(),
        edges = engine.graph().edge_count(),
        seed = config.simulation.seed,
        tick_minutes = config.simulation.tick_minutes,
        upstream_first = config.simulation.upstream_first,
        "reference line assembled"
    );
    Ok((engine, line))
}

// ===========================================================================
// Graph
// ===========================================================================

fn build_graph(config: &ScenarioConfig) -> Result<(FlowGraph, ReferenceLine), ScenarioError> {
    let mut graph = FlowGraph::new();
    let station = |x, y| NodeLayout::new((x, y), STATION_SIZE);
    let endpoint = |x, y| NodeLayout::new((x, y), (0.0, 0.0));

    let train = graph.add_node("train", Fixed64::ZERO, endpoint(0.0, 20.0));
    let receipt = graph.add_node("receipt", q(config.receipt.capacity), station(20.0, 20.0));
    let mining = graph.add_node("mining", q(config.mine.capacity), station(20.0, 80.0));
    let preparation = graph.add_node(
        "preparation",
        q(config.preparation.capacity),
        station(50.0, 20.0),
    );
    let treatment = graph.add_node("treatment", q(config.treatment.capacity), station(50.0, 50.0));
    let shipment = graph.add_node("shipment", q(config.shipment.capacity), station(80.0, 50.0));
    let boat = graph.add_node("boat", Fixed64::ZERO, endpoint(100.0, 50.0));

    let rail = graph.connect("Train", q(config.train.edge_capacity), train, receipt)?;
    let receipt_out = graph.connect(
        "receipt",
        q(config.receipt.out_edge_capacity),
        receipt,
        preparation,
    )?;
    let pit_1 = graph.connect("pit 1", q(config.mine.pit_capacity), mining, treatment)?;
    let tank = graph.connect(
        "tank",
        q(config.preparation.tank_capacity),
        preparation,
        treatment,
    )?;
    let pit_2 = graph.connect("pit 2", q(config.treatment.pit_capacity), treatment, shipment)?;
    let boat_edge = graph.connect("boat", q(config.boat.capacity), shipment, boat)?;

    Ok((
        graph,
        ReferenceLine {
            train,
            receipt,
            mining,
            preparation,
            treatment,
            shipment,
            boat,
            rail,
            receipt_out,
            pit_1,
            tank,
            pit_2,
            boat_edge,
        },
    ))
}

fn q(v: f64) -> Fixed64 {
    f64_to_fixed64(v)
}

// ===========================================================================
// Station trees
// ===========================================================================

/// The shape shared by receipt, preparation and shipment.
///
/// Never starts unless `out` has room for a whole batch. A node already
/// holding a batch forwards it directly; otherwise it waits for a batch on
/// `inc` and works through it `step` per tick.
fn batch_consumer(
    node: NodeId,
    inc: EdgeId,
    out: EdgeId,
    batch: Fixed64,
    step: Fixed64,
    min_update: Fixed64,
) -> BehaviorNode {
    sequence_with_memory(vec![
        space_available(out.into(), batch),
        selector_with_memory(vec![
            threshold_guard(
                node.into(),
                batch,
                Comparison::AtLeast,
                raw_transfer(node.into(), out.into(), batch),
            ),
            sequence_with_memory(vec![
                threshold(inc.into(), batch, Comparison::AtLeast),
                repeater(sequence(vec![
                    space_available(node.into(), step),
                    consume(inc, node, out, batch, step, step, min_update),
                ])),
            ]),
        ]),
    ])
}

fn train_tree(config: &ScenarioConfig, line: &ReferenceLine) -> BehaviorNode {
    let period = config.ticks(config.train.refresh_minutes);
    debug!(period, load = config.train.load(), "train");
    delay(
        period,
        train_delivery(
            line.train,
            line.rail,
            config.train.wagons,
            q(config.train.wagon_capacity),
        ),
    )
}

fn receipt_tree(config: &ScenarioConfig, line: &ReferenceLine) -> BehaviorNode {
    let batch = q(config.train.load());
    let step = per_tick(batch, config.ticks(config.receipt.unloading_minutes));
    debug!(%batch, %step, "receipt");
    batch_consumer(
        line.receipt,
        line.rail,
        line.receipt_out,
        batch,
        step,
        q(config.receipt.min_update),
    )
}

fn mining_tree(
    config: &ScenarioConfig,
    line: &ReferenceLine,
) -> Result<BehaviorNode, ScenarioError> {
    let mine_config = &config.mine;
    let generator = match mine_config.constant_yield {
        Some(amount) => YieldGenerator::constant(q(amount)),
        None => {
            let dist = Triangular::new(
                mine_config.yield_min,
                mine_config.yield_max,
                mine_config.yield_mode,
            )
            .map_err(|e| ScenarioError::InvalidParameter {
                field: "mine.yield_mode",
                detail: e.to_string(),
            })?;
            YieldGenerator::triangular(dist, config.simulation.seed)
        }
    };
    let period = config.ticks(mine_config.refresh_minutes);
    debug!(period, ?generator, "mining");
    Ok(mine(
        line.mining,
        line.pit_1,
        generator,
        period,
        q(mine_config.min_update),
    ))
}

fn preparation_tree(config: &ScenarioConfig, line: &ReferenceLine) -> BehaviorNode {
    let prep = &config.preparation;
    let batch = q(prep.batch);
    let step = per_tick(batch, config.ticks(prep.preparation_minutes));
    debug!(%batch, %step, "preparation");
    batch_consumer(
        line.preparation,
        line.receipt_out,
        line.tank,
        batch,
        step,
        q(prep.min_update),
    )
}

/// Treatment draws from the tank and pit 1 at once and produces a batch of
/// `min_pit` into pit 2.
fn treatment_tree(
    config: &ScenarioConfig,
    line: &ReferenceLine,
) -> Result<BehaviorNode, ScenarioError> {
    let treatment = &config.treatment;
    let batch = q(treatment.min_pit);
    let pit_step = q(config.per_tick_from_hourly(treatment.speed_per_hour));
    let tank_step = q(config.per_tick_from_hourly(treatment.min_tank));
    debug!(%batch, %pit_step, %tank_step, "treatment");

    let run = ProductionRun::new(
        line.treatment,
        line.pit_2,
        batch,
        pit_step,
        q(treatment.min_update),
    );
    let draw = multi_consume(&[line.tank, line.pit_1], &[tank_step, pit_step], run)?;

    Ok(sequence_with_memory(vec![
        space_available(line.pit_2.into(), batch),
        selector_with_memory(vec![
            threshold_guard(
                line.treatment.into(),
                batch,
                Comparison::AtLeast,
                raw_transfer(line.treatment.into(), line.pit_2.into(), batch),
            ),
            sequence_with_memory(vec![
                threshold(line.tank.into(), q(treatment.min_tank), Comparison::AtLeast),
                threshold(line.pit_1.into(), batch, Comparison::AtLeast),
                repeater(sequence(vec![
                    space_available(line.treatment.into(), pit_step),
                    draw,
                ])),
            ]),
        ]),
    ]))
}

fn shipment_tree(config: &ScenarioConfig, line: &ReferenceLine) -> BehaviorNode {
    let batch = q(config.boat.capacity);
    let step = q(config.per_tick_from_hourly(config.shipment.speed_per_hour));
    debug!(%batch, %step, "shipment");
    batch_consumer(
        line.shipment,
        line.pit_2,
        line.boat_edge,
        batch,
        step,
        q(config.shipment.min_update),
    )
}

/// The boat only leaves full.
fn boat_tree(config: &ScenarioConfig, line: &ReferenceLine) -> BehaviorNode {
    let size = q(config.boat.capacity);
    sequence(vec![
        threshold(line.boat_edge.into(), size, Comparison::AtLeast),
        boat_departure(line.boat, line.boat_edge, size),
    ])
}
