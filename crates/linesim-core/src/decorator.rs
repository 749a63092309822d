//! Decorator behavior nodes.
//!
//! Decorators wrap a single child and change when it is ticked or what its
//! parent sees: [`DecoratorKind::Delay`] (wait N ticks first),
//! [`DecoratorKind::Repeater`] (retry until success) and
//! [`DecoratorKind::ThresholdGuard`] (tick only while a reservoir level
//! condition holds).

use crate::behavior::BehaviorNode;
use crate::fixed::{Fixed64, Ticks};
use crate::graph::FlowGraph;
use crate::id::ReservoirId;
use crate::reservoir::Comparison;
use crate::status::Status;

/// Which decorator this is, with its local state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoratorKind {
    /// Returns `Running` for `ticks` calls without touching the child, then
    /// ticks the child every call until it returns a terminal result. The
    /// countdown restarts after each terminal result.
    Delay { ticks: Ticks, remaining: Ticks },

    /// Forwards `Success`; turns `Failure` and `Running` into `Running`, so
    /// the child is retried on every tick until it succeeds.
    Repeater,

    /// Ticks the child only while `target`'s level compares true against
    /// `threshold`; otherwise fails without ticking it.
    ThresholdGuard {
        target: ReservoirId,
        threshold: Fixed64,
        comparison: Comparison,
    },
}

impl DecoratorKind {
    pub fn delay(ticks: Ticks) -> Self {
        DecoratorKind::Delay {
            ticks,
            remaining: ticks,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DecoratorKind::Delay { .. } => "delay",
            DecoratorKind::Repeater => "repeater",
            DecoratorKind::ThresholdGuard { .. } => "threshold-guard",
        }
    }
}

/// A node with exactly one child.
#[derive(Debug, Clone)]
pub struct Decorator {
    kind: DecoratorKind,
    child: Option<Box<BehaviorNode>>,
}

impl Decorator {
    /// A decorator without its child yet. Attach one with
    /// [`BehaviorNode::add_child`] before the tree is validated.
    pub fn new(kind: DecoratorKind) -> Self {
        Self { kind, child: None }
    }

    pub fn wrap(kind: DecoratorKind, child: BehaviorNode) -> Self {
        Self {
            kind,
            child: Some(Box::new(child)),
        }
    }

    pub fn kind(&self) -> &DecoratorKind {
        &self.kind
    }

    pub fn child(&self) -> Option<&BehaviorNode> {
        self.child.as_deref()
    }

    /// Ticks left before a delay ticks its child. `None` for other kinds.
    pub fn delay_remaining(&self) -> Option<Ticks> {
        match self.kind {
            DecoratorKind::Delay { remaining, .. } => Some(remaining),
            _ => None,
        }
    }

    /// Only the first child sticks.
    pub(crate) fn set_child(&mut self, child: BehaviorNode) {
        if self.child.is_none() {
            self.child = Some(Box::new(child));
        }
    }

    pub fn tick(&mut self, graph: &mut FlowGraph) -> Status {
        let Some(child) = self.child.as_deref_mut() else {
            debug_assert!(false, "{} decorator ticked without a child", self.kind.name());
            return Status::Failure;
        };

        match &mut self.kind {
            DecoratorKind::Delay { ticks, remaining } => {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Status::Running;
                }
                let status = child.tick(graph);
                if status.is_terminal() {
                    *remaining = *ticks;
                }
                status
            }
            DecoratorKind::Repeater => match child.tick(graph) {
                Status::Success => Status::Success,
                Status::Failure | Status::Running => Status::Running,
            },
            DecoratorKind::ThresholdGuard {
                target,
                threshold,
                comparison,
            } => {
                let open = graph
                    .reservoir(*target)
                    .is_some_and(|r| comparison.holds(r.current(), *threshold));
                if open {
                    child.tick(graph)
                } else {
                    Status::Failure
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::*;
    use crate::fixed::f64_to_fixed64 as fx;
    use crate::graph::NodeLayout;
    use crate::test_utils::*;

    #[test]
    fn delay_counts_down_before_ticking_child() {
        let mut graph = FlowGraph::new();
        let mut tree = delay(3, scripted(&[S]));

        for _ in 0..3 {
            assert_eq!(tree.tick(&mut graph), Status::Running);
            assert_eq!(script_ticks(&tree, &[0]), 0);
        }
        assert_eq!(tree.as_decorator().unwrap().delay_remaining(), Some(0));

        assert_eq!(tree.tick(&mut graph), Status::Success);
        assert_eq!(script_ticks(&tree, &[0]), 1);
        assert_eq!(tree.as_decorator().unwrap().delay_remaining(), Some(3));
    }

    #[test]
    fn delay_keeps_ticking_running_child() {
        let mut graph = FlowGraph::new();
        let mut tree = delay(1, scripted(&[R, R, F]));

        assert_eq!(tree.tick(&mut graph), Status::Running); // countdown
        assert_eq!(tree.tick(&mut graph), Status::Running); // child R
        assert_eq!(tree.as_decorator().unwrap().delay_remaining(), Some(0));
        assert_eq!(tree.tick(&mut graph), Status::Running); // child R
        assert_eq!(tree.tick(&mut graph), Status::Failure); // child F
        assert_eq!(script_ticks(&tree, &[0]), 3);
        assert_eq!(tree.as_decorator().unwrap().delay_remaining(), Some(1));
    }

    #[test]
    fn zero_delay_ticks_child_immediately() {
        let mut graph = FlowGraph::new();
        let mut tree = delay(0, scripted(&[S]));
        assert_eq!(tree.tick(&mut graph), Status::Success);
        assert_eq!(script_ticks(&tree, &[0]), 1);
    }

    #[test]
    fn repeater_retries_until_success() {
        let mut graph = FlowGraph::new();
        let mut tree = repeater(scripted(&[F, F, S]));
        assert_eq!(tree.tick(&mut graph), Status::Running);
        assert_eq!(tree.tick(&mut graph), Status::Running);
        assert_eq!(tree.tick(&mut graph), Status::Success);
        assert_eq!(script_ticks(&tree, &[0]), 3);
    }

    #[test]
    fn repeater_maps_running_to_running() {
        let mut graph = FlowGraph::new();
        let mut tree = repeater(scripted(&[R]));
        assert_eq!(tree.tick(&mut graph), Status::Running);
    }

    #[test]
    fn threshold_guard_gates_child() {
        let mut graph = FlowGraph::new();
        let n = graph.add_node("n", fx(100.0), NodeLayout::default());
        let mut tree = threshold_guard(n.into(), fx(50.0), Comparison::AtLeast, scripted(&[S]));

        assert_eq!(tree.tick(&mut graph), Status::Failure);
        assert_eq!(script_ticks(&tree, &[0]), 0);

        assert!(graph.increase(n.into(), fx(50.0)));
        assert_eq!(tree.tick(&mut graph), Status::Success);
        assert_eq!(script_ticks(&tree, &[0]), 1);
    }

    #[test]
    fn threshold_guard_at_most_forwards_child_result() {
        let mut graph = FlowGraph::new();
        let n = graph.add_node("n", fx(100.0), NodeLayout::default());
        let mut tree = threshold_guard(n.into(), fx(10.0), Comparison::AtMost, scripted(&[R]));
        assert_eq!(tree.tick(&mut graph), Status::Running);

        assert!(graph.increase(n.into(), fx(11.0)));
        assert_eq!(tree.tick(&mut graph), Status::Failure);
        assert_eq!(script_ticks(&tree, &[0]), 1);
    }
}
