//! Scenario parameters for the ore production line.
//!
//! Every field has a default, so a scenario file only lists what it changes.
//! Durations are in minutes and speeds in tonnes per hour; both are turned
//! into per-tick amounts using `simulation.tick_minutes`. Quantities are in
//! tonnes.

use serde::{Deserialize, Serialize};

use crate::loader::ScenarioError;

// ===========================================================================
// Top level
// ===========================================================================

/// All parameters of one production line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub simulation: SimulationConfig,
    pub train: TrainConfig,
    pub receipt: ReceiptConfig,
    pub mine: MineConfig,
    pub preparation: PreparationConfig,
    pub treatment: TreatmentConfig,
    pub shipment: ShipmentConfig,
    pub boat: BoatConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed of the mine's yield generator.
    pub seed: u64,
    /// Simulated minutes per tick.
    pub tick_minutes: f64,
    /// Tick producers before consumers instead of in station order.
    pub upstream_first: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            tick_minutes: 1.0,
            upstream_first: false,
        }
    }
}

// ===========================================================================
// Stations
// ===========================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub wagons: u32,
    pub wagon_capacity: f64,
    /// Time between two trains.
    pub refresh_minutes: f64,
    /// Capacity of the rail buffer into receipt.
    pub edge_capacity: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            wagons: 12,
            wagon_capacity: 30_000.0,
            refresh_minutes: 1_440.0,
            edge_capacity: 720_000.0,
        }
    }
}

impl TrainConfig {
    /// One train's load.
    pub fn load(&self) -> f64 {
        f64::from(self.wagons) * self.wagon_capacity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptConfig {
    pub capacity: f64,
    /// Time to unload a whole train.
    pub unloading_minutes: f64,
    /// Stock that must build up before receipt forwards to preparation.
    pub min_update: f64,
    /// Capacity of the buffer into preparation.
    pub out_edge_capacity: f64,
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        Self {
            capacity: 500_000.0,
            unloading_minutes: 30.0,
            min_update: 10_000.0,
            out_edge_capacity: 500_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MineConfig {
    pub capacity: f64,
    /// Length of one extraction period; a new yield is drawn each period.
    pub refresh_minutes: f64,
    /// Batch size shipped to pit 1.
    pub min_update: f64,
    /// Capacity of pit 1.
    pub pit_capacity: f64,
    pub yield_min: f64,
    pub yield_max: f64,
    pub yield_mode: f64,
    /// Draw the same yield every period instead of sampling.
    pub constant_yield: Option<f64>,
}

impl Default for MineConfig {
    fn default() -> Self {
        Self {
            capacity: 1_000.0,
            refresh_minutes: 1_440.0,
            min_update: 1.0,
            pit_capacity: 100.0,
            yield_min: 10.0,
            yield_max: 60.0,
            yield_mode: 20.0,
            constant_yield: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreparationConfig {
    pub capacity: f64,
    /// Time to prepare one batch.
    pub preparation_minutes: f64,
    /// Size of one prepared batch.
    pub batch: f64,
    pub min_update: f64,
    /// Capacity of the tank feeding treatment.
    pub tank_capacity: f64,
}

impl Default for PreparationConfig {
    fn default() -> Self {
        Self {
            capacity: 500_000.0,
            preparation_minutes: 30.0,
            batch: 10_000.0,
            min_update: 10_000.0,
            tank_capacity: 500_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreatmentConfig {
    pub capacity: f64,
    /// Ore treated per hour.
    pub speed_per_hour: f64,
    /// Tank level needed to start, also the hourly tank draw.
    pub min_tank: f64,
    /// Pit 1 level needed to start, also the size of one treated batch.
    pub min_pit: f64,
    pub min_update: f64,
    /// Capacity of pit 2.
    pub pit_capacity: f64,
}

impl Default for TreatmentConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000.0,
            speed_per_hour: 60.0,
            min_tank: 60_000.0,
            min_pit: 50.0,
            min_update: 1.0,
            pit_capacity: 2_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipmentConfig {
    pub capacity: f64,
    /// Loading speed onto the boat.
    pub speed_per_hour: f64,
    pub min_update: f64,
}

impl Default for ShipmentConfig {
    fn default() -> Self {
        Self {
            capacity: 10_000.0,
            speed_per_hour: 100.0,
            min_update: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoatConfig {
    pub capacity: f64,
}

impl Default for BoatConfig {
    fn default() -> Self {
        Self { capacity: 2_000.0 }
    }
}

// ===========================================================================
// Derived quantities
// ===========================================================================

impl ScenarioConfig {
    /// Whole ticks in `minutes`, never less than one.
    pub fn ticks(&self, minutes: f64) -> u64 {
        ((minutes / self.simulation.tick_minutes).round() as u64).max(1)
    }

    /// Amount moved per tick at `per_hour` tonnes per hour.
    pub fn per_tick_from_hourly(&self, per_hour: f64) -> f64 {
        per_hour * self.simulation.tick_minutes / 60.0
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Reject parameters that would make assembly meaningless: durations,
    /// capacities, batch sizes and speeds must be positive and finite.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let positive = [
            ("simulation.tick_minutes", self.simulation.tick_minutes),
            ("train.wagon_capacity", self.train.wagon_capacity),
            ("train.refresh_minutes", self.train.refresh_minutes),
            ("train.edge_capacity", self.train.edge_capacity),
            ("receipt.capacity", self.receipt.capacity),
            ("receipt.unloading_minutes", self.receipt.unloading_minutes),
            ("receipt.min_update", self.receipt.min_update),
            ("receipt.out_edge_capacity", self.receipt.out_edge_capacity),
            ("mine.capacity", self.mine.capacity),
            ("mine.refresh_minutes", self.mine.refresh_minutes),
            ("mine.min_update", self.mine.min_update),
            ("mine.pit_capacity", self.mine.pit_capacity),
            ("preparation.capacity", self.preparation.capacity),
            ("preparation.preparation_minutes", self.preparation.preparation_minutes),
            ("preparation.batch", self.preparation.batch),
            ("preparation.min_update", self.preparation.min_update),
            ("preparation.tank_capacity", self.preparation.tank_capacity),
            ("treatment.capacity", self.treatment.capacity),
            ("treatment.speed_per_hour", self.treatment.speed_per_hour),
            ("treatment.min_tank", self.treatment.min_tank),
            ("treatment.min_pit", self.treatment.min_pit),
            ("treatment.min_update", self.treatment.min_update),
            ("treatment.pit_capacity", self.treatment.pit_capacity),
            ("shipment.capacity", self.shipment.capacity),
            ("shipment.speed_per_hour", self.shipment.speed_per_hour),
            ("shipment.min_update", self.shipment.min_update),
            ("boat.capacity", self.boat.capacity),
        ];
        for (field, value) in positive {
            check_range(field, value, f64::MIN_POSITIVE)?;
        }
        check_range("train.wagons", f64::from(self.train.wagons), 1.0)?;
        check_range("train.load", self.train.load(), 0.0)?;
        check_range("mine.yield_max", self.mine.yield_max, 0.0)?;
        check_range("mine.yield_min", self.mine.yield_min, 0.0)?;

        // Hourly rates become per-tick amounts during assembly; long ticks
        // scale them up.
        let hourly = [
            ("treatment.speed_per_hour", self.treatment.speed_per_hour),
            ("treatment.min_tank", self.treatment.min_tank),
            ("shipment.speed_per_hour", self.shipment.speed_per_hour),
        ];
        for (field, per_hour) in hourly {
            let per_tick = self.per_tick_from_hourly(per_hour);
            if !(per_tick.is_finite() && per_tick <= MAX_QUANTITY) {
                return Err(ScenarioError::InvalidParameter {
                    field,
                    detail: format!(
                        "{per_tick} per tick at {} minutes per tick exceeds {MAX_QUANTITY}",
                        self.simulation.tick_minutes
                    ),
                });
            }
        }

        if let Some(amount) = self.mine.constant_yield {
            check_range("mine.constant_yield", amount, 0.0)?;
        }

        Ok(())
    }
}

/// Largest quantity a scenario may use; reservoir arithmetic is Q32.32.
pub const MAX_QUANTITY: f64 = 1.0e9;

fn check_range(field: &'static str, value: f64, min: f64) -> Result<(), ScenarioError> {
    if value.is_finite() && value >= min && value <= MAX_QUANTITY {
        return Ok(());
    }
    Err(ScenarioError::InvalidParameter {
        field,
        detail: format!("must be within [{min}, {MAX_QUANTITY}], got {value}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_line() {
        let config = ScenarioConfig::default();
        assert_eq!(config.train.load(), 360_000.0);
        assert_eq!(config.ticks(config.train.refresh_minutes), 1_440);
        assert_eq!(config.ticks(config.receipt.unloading_minutes), 30);
        let shipment_step = config.per_tick_from_hourly(config.shipment.speed_per_hour);
        assert!((shipment_step - 100.0 / 60.0).abs() < 1e-12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn coarser_ticks_scale_durations_and_speeds() {
        let mut config = ScenarioConfig::default();
        config.simulation.tick_minutes = 10.0;
        assert_eq!(config.ticks(1_440.0), 144);
        assert_eq!(config.ticks(3.0), 1, "never below one tick");
        assert_eq!(config.per_tick_from_hourly(60.0), 10.0);
    }

    #[test]
    fn validate_names_offending_field() {
        let mut config = ScenarioConfig::default();
        config.preparation.batch = 0.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::InvalidParameter { field: "preparation.batch", .. }
        ));

        let mut config = ScenarioConfig::default();
        config.simulation.tick_minutes = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = ScenarioConfig::default();
        config.train.wagons = 0;
        assert!(config.validate().is_err());

        let mut config = ScenarioConfig::default();
        config.mine.constant_yield = Some(-1.0);
        assert!(config.validate().is_err());

        let mut config = ScenarioConfig::default();
        config.train.wagons = 3_000_000_000;
        config.train.wagon_capacity = 1.0e-6;
        assert!(matches!(
            config.validate(),
            Err(ScenarioError::InvalidParameter { field: "train.wagons", .. })
        ));

        let mut config = ScenarioConfig::default();
        config.train.wagon_capacity = 5.0e8;
        assert!(matches!(
            config.validate(),
            Err(ScenarioError::InvalidParameter { field: "train.load", .. })
        ));
    }

    #[test]
    fn validate_checks_per_tick_rates() {
        let mut config = ScenarioConfig::default();
        config.simulation.tick_minutes = 1_440.0;
        config.treatment.min_tank = 1.0e8;
        assert!(matches!(
            config.validate(),
            Err(ScenarioError::InvalidParameter { field: "treatment.min_tank", .. })
        ));

        // The same rate is fine at one-minute ticks.
        config.simulation.tick_minutes = 1.0;
        assert!(config.validate().is_ok());
    }
}
