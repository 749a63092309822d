//! Simulation state and per-step result types.

use crate::fixed::{Fixed64, Ticks};
use crate::id::NodeId;
use crate::publish::PublishOutcome;
use crate::status::Status;

// ---------------------------------------------------------------------------
// Simulation state
// ---------------------------------------------------------------------------

/// Mutable simulation state tracked by the engine.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SimState {
    /// Number of completed steps. Incremented once at the end of each step.
    pub tick: Ticks,
}

impl SimState {
    /// Create a new simulation state starting at tick 0.
    pub fn new() -> Self {
        Self { tick: 0 }
    }
}

// ---------------------------------------------------------------------------
// Step result
// ---------------------------------------------------------------------------

/// Result of one `Engine::step()` call.
#[derive(Debug, Clone, Default)]
pub struct StepResult {
    /// Tick counter after the step.
    pub tick: Ticks,

    /// Root status of every node with a tree, in tick order.
    pub outcomes: Vec<(NodeId, Status)>,

    /// What happened to this step's snapshot. `None` without a publisher.
    pub published: Option<PublishOutcome>,
}

impl StepResult {
    /// Root status of `node` during this step, if it was ticked.
    pub fn outcome(&self, node: NodeId) -> Option<Status> {
        self.outcomes
            .iter()
            .find(|(id, _)| *id == node)
            .map(|&(_, status)| status)
    }

    /// Number of roots that returned `status`.
    pub fn count(&self, status: Status) -> usize {
        self.outcomes.iter().filter(|(_, s)| *s == status).count()
    }
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// A simple deterministic hash of simulation state for desync detection.
///
/// Uses FNV-1a (64-bit) for speed and simplicity. Not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    /// Start a new hash.
    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    /// Feed bytes into the hash.
    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    /// Feed a u64 into the hash.
    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    /// Feed a Fixed64 into the hash.
    pub fn write_fixed64(&mut self, v: Fixed64) {
        self.write(&v.to_bits().to_le_bytes());
    }

    /// Finalize and return the hash value.
    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_state_starts_at_zero() {
        assert_eq!(SimState::new().tick, 0);
    }

    #[test]
    fn state_hash_deterministic() {
        let mut h1 = StateHash::new();
        h1.write_u64(42);
        h1.write_fixed64(Fixed64::from_num(7));

        let mut h2 = StateHash::new();
        h2.write_u64(42);
        h2.write_fixed64(Fixed64::from_num(7));

        assert_eq!(h1.finish(), h2.finish());
    }

    #[test]
    fn state_hash_differs_for_different_inputs() {
        let mut h1 = StateHash::new();
        h1.write_u64(1);

        let mut h2 = StateHash::new();
        h2.write_u64(2);

        assert_ne!(h1.finish(), h2.finish());
    }

    #[test]
    fn state_hash_order_matters() {
        let mut h1 = StateHash::new();
        h1.write_fixed64(Fixed64::from_num(1));
        h1.write_fixed64(Fixed64::from_num(2));

        let mut h2 = StateHash::new();
        h2.write_fixed64(Fixed64::from_num(2));
        h2.write_fixed64(Fixed64::from_num(1));

        assert_ne!(h1.finish(), h2.finish());
    }

    #[test]
    fn step_result_lookup() {
        use slotmap::SlotMap;
        let mut keys: SlotMap<NodeId, ()> = SlotMap::with_key();
        let a = keys.insert(());
        let b = keys.insert(());
        let result = StepResult {
            tick: 1,
            outcomes: vec![(a, Status::Running), (b, Status::Failure)],
            published: None,
        };
        assert_eq!(result.outcome(b), Some(Status::Failure));
        assert_eq!(result.count(Status::Running), 1);
    }
}
