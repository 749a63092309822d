//! Status returned by behavior tree nodes.

use serde::{Deserialize, Serialize};

/// The result of ticking a behavior tree node.
///
/// This is the only way a node reports back to its parent. `Failure` is an
/// ordinary outcome ("not now"), never a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// The node finished and its goal was met.
    Success,

    /// The node finished without meeting its goal: a condition did not hold
    /// or a transfer was rejected for lack of space or stock.
    Failure,

    /// The node has not finished yet and wants to be ticked again next step.
    Running,
}

impl Status {
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    #[inline]
    pub fn is_failure(self) -> bool {
        matches!(self, Status::Failure)
    }

    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, Status::Running)
    }

    /// `Success` or `Failure`.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !self.is_running()
    }

    /// Map a primitive boolean outcome onto a terminal status.
    #[inline]
    pub fn from_outcome(ok: bool) -> Self {
        if ok { Status::Success } else { Status::Failure }
    }
}
