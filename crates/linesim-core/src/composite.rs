//! Composite behavior nodes.
//!
//! Composites control the order in which several children are ticked:
//! sequences (AND) and selectors (OR), each with a variant that remembers
//! which child was running.

use crate::behavior::BehaviorNode;
use crate::graph::FlowGraph;
use crate::status::Status;

/// Which composite this is.
///
/// # Semantics
///
/// Children are ticked left to right.
/// - A sequence stops on the first `Failure`, a selector on the first
///   `Success`; either returns that result.
/// - Any child returning `Running` stops the pass and the composite returns
///   `Running`.
/// - A sequence that gets through every child returns `Success`; a selector
///   that does returns `Failure`.
///
/// The plain variants restart from the first child on every tick. The
/// `WithMemory` variants restart from the child that last returned
/// `Running`, so guards in front of a long-running action are not
/// re-evaluated while it is in progress. The resume index is reset to 0 on
/// any terminal result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    Sequence,
    SequenceWithMemory,
    Selector,
    SelectorWithMemory,
}

impl CompositeKind {
    pub fn name(self) -> &'static str {
        match self {
            CompositeKind::Sequence => "sequence",
            CompositeKind::SequenceWithMemory => "sequence-with-memory",
            CompositeKind::Selector => "selector",
            CompositeKind::SelectorWithMemory => "selector-with-memory",
        }
    }

    #[inline]
    pub fn has_memory(self) -> bool {
        matches!(
            self,
            CompositeKind::SequenceWithMemory | CompositeKind::SelectorWithMemory
        )
    }

    /// The child result that ends the pass early.
    #[inline]
    fn short_circuit_on(self) -> Status {
        match self {
            CompositeKind::Sequence | CompositeKind::SequenceWithMemory => Status::Failure,
            CompositeKind::Selector | CompositeKind::SelectorWithMemory => Status::Success,
        }
    }

    /// The result when every child was ticked without short-circuiting.
    #[inline]
    fn exhausted(self) -> Status {
        match self {
            CompositeKind::Sequence | CompositeKind::SequenceWithMemory => Status::Success,
            CompositeKind::Selector | CompositeKind::SelectorWithMemory => Status::Failure,
        }
    }
}

/// A node with an ordered list of children.
#[derive(Debug, Clone)]
pub struct Composite {
    kind: CompositeKind,
    children: Vec<BehaviorNode>,
    /// Child to start from on the next tick. Only moves for memory variants.
    resume: usize,
}

impl Composite {
    pub fn new(kind: CompositeKind, children: Vec<BehaviorNode>) -> Self {
        Self {
            kind,
            children,
            resume: 0,
        }
    }

    pub fn kind(&self) -> CompositeKind {
        self.kind
    }

    pub fn children(&self) -> &[BehaviorNode] {
        &self.children
    }

    pub fn resume_index(&self) -> usize {
        self.resume
    }

    pub(crate) fn push(&mut self, child: BehaviorNode) {
        self.children.push(child);
    }

    pub fn tick(&mut self, graph: &mut FlowGraph) -> Status {
        let memory = self.kind.has_memory();
        let stop_on = self.kind.short_circuit_on();
        let start = if memory {
            self.resume.min(self.children.len())
        } else {
            0
        };

        for (index, child) in self.children.iter_mut().enumerate().skip(start) {
            match child.tick(graph) {
                Status::Running => {
                    if memory {
                        self.resume = index;
                    }
                    return Status::Running;
                }
                status if status == stop_on => {
                    self.resume = 0;
                    return status;
                }
                _ => continue,
            }
        }

        self.resume = 0;
        self.kind.exhausted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::*;
    use crate::test_utils::*;

    fn run(tree: &mut BehaviorNode) -> Status {
        let mut graph = FlowGraph::new();
        tree.tick(&mut graph)
    }

    #[test]
    fn kind_names_and_memory() {
        assert_eq!(sequence(vec![scripted(&[S])]).kind_name(), "sequence");
        assert_eq!(
            selector_with_memory(vec![scripted(&[S])]).kind_name(),
            "selector-with-memory"
        );
        assert!(CompositeKind::SequenceWithMemory.has_memory());
        assert!(!CompositeKind::Selector.has_memory());
    }

    #[test]
    fn sequence_all_success() {
        let mut tree = sequence(vec![scripted(&[S]), scripted(&[S])]);
        assert_eq!(run(&mut tree), Status::Success);
        assert_eq!(script_ticks(&tree, &[0]), 1);
        assert_eq!(script_ticks(&tree, &[1]), 1);
    }

    #[test]
    fn sequence_short_circuits_on_failure() {
        let mut tree = sequence(vec![
            scripted(&[S]),
            scripted(&[S]),
            scripted(&[F]),
            scripted(&[S]),
        ]);
        assert_eq!(run(&mut tree), Status::Failure);
        let ticked: usize = (0..4).map(|i| script_ticks(&tree, &[i])).sum();
        assert_eq!(ticked, 3);
        assert_eq!(script_ticks(&tree, &[3]), 0);
    }

    #[test]
    fn sequence_running_does_not_remember() {
        let mut tree = sequence(vec![scripted(&[S]), scripted(&[R, S]), scripted(&[S])]);
        assert_eq!(run(&mut tree), Status::Running);
        assert_eq!(tree.resume_index(), 0);
        assert_eq!(run(&mut tree), Status::Success);
        // The first child was ticked again on the second pass.
        assert_eq!(script_ticks(&tree, &[0]), 2);
    }

    #[test]
    fn selector_short_circuits_on_success() {
        let mut tree = selector(vec![
            scripted(&[F]),
            scripted(&[F]),
            scripted(&[S]),
            scripted(&[F]),
        ]);
        assert_eq!(run(&mut tree), Status::Success);
        let ticked: usize = (0..4).map(|i| script_ticks(&tree, &[i])).sum();
        assert_eq!(ticked, 3);
        assert_eq!(script_ticks(&tree, &[3]), 0);
    }

    #[test]
    fn selector_fails_when_all_fail() {
        let mut tree = selector(vec![scripted(&[F]), scripted(&[F])]);
        assert_eq!(run(&mut tree), Status::Failure);
    }

    #[test]
    fn selector_running_does_not_remember() {
        let mut tree = selector(vec![scripted(&[F]), scripted(&[R, S])]);
        assert_eq!(run(&mut tree), Status::Running);
        assert_eq!(tree.resume_index(), 0);
        assert_eq!(run(&mut tree), Status::Success);
        assert_eq!(script_ticks(&tree, &[0]), 2);
    }

    #[test]
    fn sequence_with_memory_resumes_at_running_child() {
        let mut tree = sequence_with_memory(vec![
            scripted(&[S]),
            scripted(&[R, S]),
            scripted(&[S]),
        ]);

        assert_eq!(run(&mut tree), Status::Running);
        assert_eq!(tree.resume_index(), 1);
        assert_eq!(script_ticks(&tree, &[0]), 1);
        assert_eq!(script_ticks(&tree, &[1]), 1);
        assert_eq!(script_ticks(&tree, &[2]), 0);

        assert_eq!(run(&mut tree), Status::Success);
        assert_eq!(script_ticks(&tree, &[0]), 1, "guard must not be re-ticked");
        assert_eq!(script_ticks(&tree, &[1]), 2);
        assert_eq!(script_ticks(&tree, &[2]), 1);
        assert_eq!(tree.resume_index(), 0);
    }

    #[test]
    fn sequence_with_memory_resets_on_failure() {
        let mut tree = sequence_with_memory(vec![scripted(&[S]), scripted(&[R, F])]);
        assert_eq!(run(&mut tree), Status::Running);
        assert_eq!(tree.resume_index(), 1);
        assert_eq!(run(&mut tree), Status::Failure);
        assert_eq!(tree.resume_index(), 0);
        // Next pass starts from the beginning again.
        run(&mut tree);
        assert_eq!(script_ticks(&tree, &[0]), 2);
    }

    #[test]
    fn selector_with_memory_resumes_and_resets() {
        let mut tree = selector_with_memory(vec![
            scripted(&[F]),
            scripted(&[R, R, F]),
            scripted(&[S]),
        ]);
        assert_eq!(run(&mut tree), Status::Running);
        assert_eq!(tree.resume_index(), 1);
        assert_eq!(run(&mut tree), Status::Running);
        assert_eq!(run(&mut tree), Status::Success);
        assert_eq!(tree.resume_index(), 0);
        assert_eq!(script_ticks(&tree, &[0]), 1);
        assert_eq!(script_ticks(&tree, &[1]), 3);
        assert_eq!(script_ticks(&tree, &[2]), 1);
    }

    #[test]
    fn memory_moves_to_later_running_child() {
        let mut tree = sequence_with_memory(vec![
            scripted(&[R, S]),
            scripted(&[R, S]),
        ]);
        assert_eq!(run(&mut tree), Status::Running);
        assert_eq!(tree.resume_index(), 0);
        assert_eq!(run(&mut tree), Status::Running);
        assert_eq!(tree.resume_index(), 1);
        assert_eq!(run(&mut tree), Status::Success);
        assert_eq!(tree.resume_index(), 0);
    }
}
