//! Bounded stock of material held by a node or sitting on an edge.
//!
//! A [`Reservoir`] keeps `0 <= current <= capacity` for its whole lifetime.
//! The level only moves through [`Reservoir::increase`] and
//! [`Reservoir::decrease`], each of which either applies the full amount or
//! leaves the reservoir untouched.

use crate::fixed::{Fixed64, checked_add_64};
use serde::{Deserialize, Serialize};

/// A named, capacity-bounded stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservoir {
    name: String,
    current: Fixed64,
    capacity: Fixed64,
}

impl Reservoir {
    /// Create an empty reservoir. A negative capacity is clamped to zero.
    pub fn new(name: impl Into<String>, capacity: Fixed64) -> Self {
        Self {
            name: name.into(),
            current: Fixed64::ZERO,
            capacity: capacity.max(Fixed64::ZERO),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current(&self) -> Fixed64 {
        self.current
    }

    pub fn capacity(&self) -> Fixed64 {
        self.capacity
    }

    /// Room left before the reservoir is full.
    pub fn free_space(&self) -> Fixed64 {
        self.capacity - self.current
    }

    /// Fill level as a 0..1 fraction. A zero-capacity reservoir reports 0.
    pub fn fill_ratio(&self) -> Fixed64 {
        if self.capacity == Fixed64::ZERO {
            return Fixed64::ZERO;
        }
        self.current / self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.current == Fixed64::ZERO
    }

    /// Add `amount` if it fits entirely. Returns whether the level changed.
    ///
    /// Negative amounts are rejected: they would let a caller drain the
    /// reservoir below zero through the back door.
    #[must_use = "a rejected increase leaves the reservoir unchanged"]
    pub fn increase(&mut self, amount: Fixed64) -> bool {
        if amount < Fixed64::ZERO {
            return false;
        }
        match checked_add_64(self.current, amount) {
            Some(next) if next <= self.capacity => {
                self.current = next;
                true
            }
            _ => false,
        }
    }

    /// Remove `amount` if the reservoir holds at least that much.
    #[must_use = "a rejected decrease leaves the reservoir unchanged"]
    pub fn decrease(&mut self, amount: Fixed64) -> bool {
        if amount < Fixed64::ZERO || amount > self.current {
            return false;
        }
        self.current -= amount;
        true
    }
}

/// Direction of a threshold comparison against a reservoir level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    /// `current <= threshold`
    AtMost,
    /// `current >= threshold`
    AtLeast,
}

impl Comparison {
    #[inline]
    pub fn holds(self, current: Fixed64, threshold: Fixed64) -> bool {
        match self {
            Comparison::AtMost => current <= threshold,
            Comparison::AtLeast => current >= threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_fixed64 as fx;

    #[test]
    fn new_reservoir_is_empty() {
        let r = Reservoir::new("pit", fx(100.0));
        assert!(r.is_empty());
        assert_eq!(r.free_space(), fx(100.0));
        assert_eq!(r.name(), "pit");
    }

    #[test]
    fn negative_capacity_clamped() {
        let r = Reservoir::new("bad", fx(-5.0));
        assert_eq!(r.capacity(), Fixed64::ZERO);
    }

    #[test]
    fn increase_up_to_capacity() {
        let mut r = Reservoir::new("tank", fx(100.0));
        assert!(r.increase(fx(60.0)));
        assert!(r.increase(fx(40.0)));
        assert!(r.is_full());
        assert_eq!(r.current(), fx(100.0));
    }

    #[test]
    fn increase_past_capacity_is_noop() {
        let mut r = Reservoir::new("tank", fx(100.0));
        assert!(r.increase(fx(90.0)));
        assert!(!r.increase(fx(20.0)));
        assert_eq!(r.current(), fx(90.0));
    }

    #[test]
    fn decrease_below_zero_is_noop() {
        let mut r = Reservoir::new("tank", fx(100.0));
        assert!(r.increase(fx(10.0)));
        assert!(!r.decrease(fx(10.5)));
        assert_eq!(r.current(), fx(10.0));
        assert!(r.decrease(fx(10.0)));
        assert!(r.is_empty());
    }

    #[test]
    fn negative_amounts_rejected() {
        let mut r = Reservoir::new("tank", fx(100.0));
        assert!(r.increase(fx(50.0)));
        assert!(!r.increase(fx(-80.0)));
        assert!(!r.decrease(fx(-80.0)));
        assert_eq!(r.current(), fx(50.0));
    }

    #[test]
    fn overflow_rejected() {
        let mut r = Reservoir::new("huge", Fixed64::MAX);
        assert!(r.increase(Fixed64::MAX));
        assert!(!r.increase(fx(1.0)));
        assert_eq!(r.current(), Fixed64::MAX);
    }

    #[test]
    fn fill_ratio_zero_capacity() {
        let r = Reservoir::new("dock", Fixed64::ZERO);
        assert_eq!(r.fill_ratio(), Fixed64::ZERO);
    }

    #[test]
    fn comparison_modes() {
        assert!(Comparison::AtLeast.holds(fx(10.0), fx(10.0)));
        assert!(!Comparison::AtLeast.holds(fx(9.0), fx(10.0)));
        assert!(Comparison::AtMost.holds(fx(10.0), fx(10.0)));
        assert!(!Comparison::AtMost.holds(fx(11.0), fx(10.0)));
    }
}
