//! Circular dependency detection.
//!
//! Edges run from predecessor to successor: an item listing `{id: p}` among
//! its predecessors contributes the edge `p -> item`. Proposing that
//! `predecessor` precede `successor` adds `predecessor -> successor`; the
//! addition closes a loop exactly when a depth-first search from the new
//! edge's source meets a node still on its recursion stack.

use std::collections::{HashMap, HashSet};

use crate::models::{ItemId, PlanItem};

/// Directed predecessor graph of one project.
#[derive(Debug, Clone, Default)]
pub struct CycleDetector {
    edges: HashMap<ItemId, Vec<ItemId>>,
}

impl CycleDetector {
    /// Builds the graph from every item's predecessor list. Deleted items
    /// contribute no edges.
    pub fn new<'a>(items: impl IntoIterator<Item = &'a PlanItem>) -> Self {
        let mut detector = Self::default();
        for item in items.into_iter().filter(|item| !item.is_deleted) {
            for predecessor in &item.predecessors {
                detector.add_edge(item.id, predecessor.id);
            }
        }
        detector
    }

    /// Records that `predecessor` precedes `successor`.
    pub fn add_edge(&mut self, successor: ItemId, predecessor: ItemId) {
        let targets = self.edges.entry(predecessor).or_default();
        if !targets.contains(&successor) {
            targets.push(successor);
        }
    }

    /// Removes a previously recorded edge, if present.
    pub fn remove_edge(&mut self, successor: ItemId, predecessor: ItemId) {
        if let Some(targets) = self.edges.get_mut(&predecessor) {
            targets.retain(|target| *target != successor);
        }
    }

    fn targets(&self, node: ItemId) -> &[ItemId] {
        self.edges.get(&node).map_or(&[][..], Vec::as_slice)
    }

    /// Whether `predecessor` already precedes `successor` directly.
    pub fn has_edge(&self, successor: ItemId, predecessor: ItemId) -> bool {
        self.edges
            .get(&predecessor)
            .map_or(false, |targets| targets.contains(&successor))
    }

    /// Whether making `predecessor` a predecessor of `successor` would create
    /// a circular dependency. Self-loops always do. The graph is left as is.
    pub fn would_create_cycle(&self, successor: ItemId, predecessor: ItemId) -> bool {
        if successor == predecessor {
            return true;
        }

        // The proposed edge is explored before the source's existing edges.
        let mut source_targets = vec![successor];
        source_targets.extend(self.targets(predecessor).iter().copied());

        let mut visited: HashSet<ItemId> = HashSet::from([predecessor]);
        let mut on_stack: HashSet<ItemId> = HashSet::from([predecessor]);
        let mut frames: Vec<(ItemId, usize)> = vec![(predecessor, 0)];

        while let Some(frame) = frames.last_mut() {
            let (node, next) = *frame;
            let targets: &[ItemId] = if node == predecessor {
                &source_targets
            } else {
                self.targets(node)
            };
            if next == targets.len() {
                on_stack.remove(&node);
                frames.pop();
                continue;
            }
            frame.1 += 1;

            let target = targets[next];
            if on_stack.contains(&target) {
                return true;
            }
            if visited.insert(target) {
                on_stack.insert(target);
                frames.push((target, 0));
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemType, Predecessor};

    fn task(name: &str) -> PlanItem {
        PlanItem::new(1, ItemType::Task, name)
    }

    fn depends(item: &mut PlanItem, on: &PlanItem) {
        item.predecessors.push(Predecessor::finish_to_start(on.id));
    }

    #[test]
    fn test_closing_a_chain_is_a_cycle() {
        // A depends on B, B depends on C.
        let mut a = task("A");
        let mut b = task("B");
        let c = task("C");
        depends(&mut a, &b);
        depends(&mut b, &c);
        let detector = CycleDetector::new([&a, &b, &c]);

        // Making A a predecessor of C closes C -> B -> A -> C.
        assert!(detector.would_create_cycle(c.id, a.id));
        // Making C a predecessor of A is merely redundant.
        assert!(!detector.would_create_cycle(a.id, c.id));
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let a = task("A");
        let detector = CycleDetector::new([&a]);
        assert!(detector.would_create_cycle(a.id, a.id));
    }

    #[test]
    fn test_direct_reverse_edge_is_a_cycle() {
        let a = task("A");
        let mut b = task("B");
        depends(&mut b, &a);
        let detector = CycleDetector::new([&a, &b]);
        assert!(detector.would_create_cycle(a.id, b.id));
        assert!(detector.has_edge(b.id, a.id));
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let a = task("A");
        let mut b = task("B");
        let mut c = task("C");
        let mut d = task("D");
        depends(&mut b, &a);
        depends(&mut c, &a);
        depends(&mut d, &b);
        let detector = CycleDetector::new([&a, &b, &c, &d]);
        assert!(!detector.would_create_cycle(d.id, c.id));
        assert!(!detector.would_create_cycle(d.id, a.id));
        assert!(detector.would_create_cycle(a.id, d.id));
    }

    #[test]
    fn test_query_does_not_mutate_graph() {
        let a = task("A");
        let b = task("B");
        let detector = CycleDetector::new([&a, &b]);
        assert!(!detector.would_create_cycle(b.id, a.id));
        assert!(!detector.has_edge(b.id, a.id));
        // The reverse is still fine because the first query added nothing.
        assert!(!detector.would_create_cycle(a.id, b.id));
    }

    #[test]
    fn test_added_edges_are_seen_by_later_queries() {
        let a = task("A");
        let b = task("B");
        let mut detector = CycleDetector::new([&a, &b]);
        detector.add_edge(b.id, a.id);
        assert!(detector.would_create_cycle(a.id, b.id));
        detector.remove_edge(b.id, a.id);
        assert!(!detector.would_create_cycle(a.id, b.id));
    }

    #[test]
    fn test_deleted_items_contribute_no_edges() {
        let a = task("A");
        let mut b = task("B");
        depends(&mut b, &a);
        b.is_deleted = true;
        let detector = CycleDetector::new([&a, &b]);
        assert!(!detector.would_create_cycle(a.id, b.id));
    }
}
