//! Yield distributions for mines.

use crate::fixed::{Fixed64, f64_to_fixed64};
use crate::rng::SimRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DistributionError {
    #[error("triangular distribution needs min <= mode <= max (min={min}, mode={mode}, max={max})")]
    InvalidTriangular { min: f64, mode: f64, max: f64 },
}

/// Triangular distribution over `[min, max]` peaking at `mode`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangular {
    min: f64,
    max: f64,
    mode: f64,
}

impl Triangular {
    /// Daily ore extraction of the reference mine.
    pub const ORE_YIELD: Triangular = Triangular {
        min: 10.0,
        max: 60.0,
        mode: 20.0,
    };

    pub fn new(min: f64, max: f64, mode: f64) -> Result<Self, DistributionError> {
        let finite = min.is_finite() && max.is_finite() && mode.is_finite();
        if !finite || !(min <= mode && mode <= max) {
            return Err(DistributionError::InvalidTriangular { min, mode, max });
        }
        Ok(Self { min, max, mode })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn mode(&self) -> f64 {
        self.mode
    }

    /// Inverse CDF at `u` in `[0, 1)`.
    pub fn quantile(&self, u: f64) -> f64 {
        let Self { min, max, mode } = *self;
        let span = max - min;
        if span <= 0.0 {
            return min;
        }
        let split = (mode - min) / span;
        if u < split {
            min + (u * span * (mode - min)).sqrt()
        } else {
            max - ((1.0 - u) * span * (max - mode)).sqrt()
        }
    }

    pub fn sample(&self, rng: &mut SimRng) -> Fixed64 {
        f64_to_fixed64(self.quantile(rng.next_f64()))
    }
}

/// Where a mine's per-period yield comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum YieldGenerator {
    /// Seeded triangular draws.
    Triangular { dist: Triangular, rng: SimRng },
    /// The same yield every period. Used by tests and fixed scenarios.
    Constant(Fixed64),
}

impl YieldGenerator {
    pub fn triangular(dist: Triangular, seed: u64) -> Self {
        YieldGenerator::Triangular {
            dist,
            rng: SimRng::new(seed),
        }
    }

    pub fn constant(amount: Fixed64) -> Self {
        YieldGenerator::Constant(amount)
    }

    /// Yield for the next period.
    pub fn sample(&mut self) -> Fixed64 {
        match self {
            YieldGenerator::Triangular { dist, rng } => dist.sample(rng),
            YieldGenerator::Constant(amount) => *amount,
        }
    }
}
