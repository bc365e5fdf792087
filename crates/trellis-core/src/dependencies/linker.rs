//! Bulk dependency linking over a selection of items.
//!
//! [`plan_links`] works on a snapshot and decides every edge up front; the
//! planner then writes the resulting [`PredecessorChange`]s one item at a
//! time. Edges that already exist or would close a loop are skipped and
//! reported instead of failing the batch.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::CycleDetector;
use crate::{
    error::{PlanningError, Result},
    models::{ItemId, PlanItem, Predecessor},
    tree::TreeIndex,
};

/// How a selection gets linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStrategy {
    /// Every item depends on the one before it
    Chain,
    /// The last item depends on every other item
    FanIn,
    /// Every item but the first depends on the first
    FanOut,
    /// Drop dependencies between selected items
    UnlinkSelected,
    /// Drop every dependency of the selected items
    ClearPredecessors,
}

impl LinkStrategy {
    fn creates_links(&self) -> bool {
        matches!(
            self,
            LinkStrategy::Chain | LinkStrategy::FanIn | LinkStrategy::FanOut
        )
    }
}

/// Predecessor list of one item before and after a linking operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredecessorChange {
    pub id: ItemId,
    pub previous: Vec<Predecessor>,
    pub new: Vec<Predecessor>,
}

/// A candidate edge that was not added because it would close a loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLink {
    pub successor: ItemId,
    pub predecessor: ItemId,
}

/// Everything a linking operation intends to write.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkPlan {
    pub strategy: LinkStrategy,
    pub changes: Vec<PredecessorChange>,
    pub linked: usize,
    pub already_linked: usize,
    pub cycles: Vec<SkippedLink>,
    pub removed: usize,
}

/// Outcome of a linking operation after persistence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LinkSummary {
    pub linked: usize,
    pub already_linked: usize,
    pub cycles: Vec<SkippedLink>,
    pub removed: usize,
    pub items_changed: usize,
    pub failures: Vec<(ItemId, String)>,
}

impl LinkSummary {
    /// Human readable summary of the operation.
    pub fn message(&self) -> String {
        let mut parts = Vec::new();
        if self.linked > 0 {
            parts.push(format!(
                "Linked {} {}",
                self.linked,
                if self.linked == 1 { "dependency" } else { "dependencies" }
            ));
        }
        if self.removed > 0 {
            parts.push(format!(
                "Removed {} {} from {} {}",
                self.removed,
                if self.removed == 1 { "dependency" } else { "dependencies" },
                self.items_changed,
                if self.items_changed == 1 { "item" } else { "items" }
            ));
        }
        if self.already_linked > 0 {
            if parts.is_empty() && self.cycles.is_empty() && self.failures.is_empty() {
                return format!("No new links created: {} already linked", self.already_linked);
            }
            parts.push(format!("{} already linked", self.already_linked));
        }
        if !self.cycles.is_empty() {
            parts.push(format!(
                "{} skipped (would create a circular dependency)",
                self.cycles.len()
            ));
        }
        if !self.failures.is_empty() {
            parts.push(format!("{} failed to save", self.failures.len()));
        }
        if parts.is_empty() {
            return "Nothing to change".to_string();
        }
        parts.join(", ")
    }
}

/// Computes the predecessor changes `strategy` makes to `selection`.
///
/// The selection is ordered by position in the tree (depth first, siblings by
/// `sort_order`). Accepted edges are added to the working graph so later
/// candidates in the same batch see them.
pub fn plan_links(
    items: &[PlanItem],
    strategy: LinkStrategy,
    selection: &[ItemId],
) -> Result<LinkPlan> {
    let tree = TreeIndex::new(items);
    let ordered = order_selection(&tree, selection)?;

    if strategy.creates_links() && ordered.len() < 2 {
        return Err(PlanningError::validation("Select at least two items to link."));
    }
    if ordered.is_empty() {
        return Err(PlanningError::validation("Nothing selected."));
    }

    let mut plan = LinkPlan {
        strategy,
        changes: Vec::new(),
        linked: 0,
        already_linked: 0,
        cycles: Vec::new(),
        removed: 0,
    };
    let mut working: HashMap<ItemId, Vec<Predecessor>> = HashMap::new();

    match strategy {
        LinkStrategy::Chain | LinkStrategy::FanIn | LinkStrategy::FanOut => {
            let mut detector = CycleDetector::new(items);
            for (successor, predecessor) in candidate_edges(strategy, &ordered) {
                if detector.has_edge(successor.id, predecessor.id) {
                    plan.already_linked += 1;
                } else if detector.would_create_cycle(successor.id, predecessor.id) {
                    plan.cycles.push(SkippedLink {
                        successor: successor.id,
                        predecessor: predecessor.id,
                    });
                } else {
                    detector.add_edge(successor.id, predecessor.id);
                    working
                        .entry(successor.id)
                        .or_insert_with(|| successor.predecessors.clone())
                        .push(Predecessor::finish_to_start(predecessor.id));
                    plan.linked += 1;
                }
            }
        }
        LinkStrategy::UnlinkSelected => {
            let selected: HashSet<ItemId> = ordered.iter().map(|item| item.id).collect();
            for item in &ordered {
                let kept: Vec<Predecessor> = item
                    .predecessors
                    .iter()
                    .filter(|p| !selected.contains(&p.id))
                    .copied()
                    .collect();
                if kept.len() != item.predecessors.len() {
                    plan.removed += item.predecessors.len() - kept.len();
                    working.insert(item.id, kept);
                }
            }
        }
        LinkStrategy::ClearPredecessors => {
            for item in ordered.iter().filter(|item| !item.predecessors.is_empty()) {
                plan.removed += item.predecessors.len();
                working.insert(item.id, Vec::new());
            }
        }
    }

    plan.changes = ordered
        .iter()
        .filter_map(|item| {
            working.remove(&item.id).map(|new| PredecessorChange {
                id: item.id,
                previous: item.predecessors.clone(),
                new,
            })
        })
        .collect();

    Ok(plan)
}

fn order_selection<'a>(tree: &TreeIndex<'a>, selection: &[ItemId]) -> Result<Vec<&'a PlanItem>> {
    let positions = tree.tree_positions();
    let mut seen = HashSet::new();
    let mut ordered = Vec::new();
    for &id in selection {
        let item = tree.get(id).ok_or(PlanningError::ItemNotFound { id })?;
        if seen.insert(id) {
            ordered.push(item);
        }
    }
    ordered.sort_by_key(|item| {
        (
            positions.get(&item.id).copied().unwrap_or(usize::MAX),
            item.sort_order,
        )
    });
    Ok(ordered)
}

/// `(successor, predecessor)` pairs for the linking strategies.
fn candidate_edges<'a>(
    strategy: LinkStrategy,
    ordered: &[&'a PlanItem],
) -> Vec<(&'a PlanItem, &'a PlanItem)> {
    match strategy {
        LinkStrategy::Chain => ordered.windows(2).map(|w| (w[1], w[0])).collect(),
        LinkStrategy::FanIn => {
            let Some((last, rest)) = ordered.split_last() else {
                return Vec::new();
            };
            rest.iter().map(|item| (*last, *item)).collect()
        }
        LinkStrategy::FanOut => {
            let Some((first, rest)) = ordered.split_first() else {
                return Vec::new();
            };
            rest.iter().map(|item| (*item, *first)).collect()
        }
        LinkStrategy::UnlinkSelected | LinkStrategy::ClearPredecessors => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemType;

    fn siblings(names: &[&str]) -> Vec<PlanItem> {
        let deliverable = PlanItem::new(1, ItemType::Deliverable, "Parent");
        let mut items: Vec<PlanItem> = names
            .iter()
            .enumerate()
            .map(|(i, name)| PlanItem {
                parent_id: Some(deliverable.id),
                indent_level: 1,
                sort_order: (i as i64 + 1) * 10,
                ..PlanItem::new(1, ItemType::Task, *name)
            })
            .collect();
        items.insert(0, deliverable);
        items
    }

    fn id_of(items: &[PlanItem], name: &str) -> ItemId {
        items.iter().find(|i| i.name == name).unwrap().id
    }

    fn apply(items: &mut [PlanItem], plan: &LinkPlan) {
        for change in &plan.changes {
            let item = items.iter_mut().find(|i| i.id == change.id).unwrap();
            item.predecessors = change.new.clone();
        }
    }

    #[test]
    fn test_chain_links_sequentially_and_is_idempotent() {
        let mut items = siblings(&["X", "Y", "Z"]);
        let (x, y, z) = (id_of(&items, "X"), id_of(&items, "Y"), id_of(&items, "Z"));

        // Selection order does not matter, sort order does.
        let plan = plan_links(&items, LinkStrategy::Chain, &[z, x, y]).unwrap();
        assert_eq!(plan.linked, 2);
        assert_eq!(plan.changes.len(), 2);
        apply(&mut items, &plan);

        let y_item = items.iter().find(|i| i.id == y).unwrap();
        assert_eq!(y_item.predecessors, vec![Predecessor::finish_to_start(x)]);
        let z_item = items.iter().find(|i| i.id == z).unwrap();
        assert_eq!(z_item.predecessors, vec![Predecessor::finish_to_start(y)]);

        let again = plan_links(&items, LinkStrategy::Chain, &[x, y, z]).unwrap();
        assert_eq!(again.linked, 0);
        assert_eq!(again.already_linked, 2);
        assert!(again.changes.is_empty());

        let summary = LinkSummary {
            already_linked: again.already_linked,
            ..Default::default()
        };
        assert!(summary.message().contains("already linked"));
    }

    #[test]
    fn test_fan_in_and_fan_out() {
        let items = siblings(&["A", "B", "C", "D"]);
        let ids: Vec<ItemId> = ["A", "B", "C", "D"].iter().map(|n| id_of(&items, n)).collect();

        let fan_in = plan_links(&items, LinkStrategy::FanIn, &ids).unwrap();
        assert_eq!(fan_in.linked, 3);
        assert_eq!(fan_in.changes.len(), 1);
        assert_eq!(fan_in.changes[0].id, ids[3]);
        let preds: Vec<ItemId> = fan_in.changes[0].new.iter().map(|p| p.id).collect();
        assert_eq!(preds, ids[..3].to_vec());

        let fan_out = plan_links(&items, LinkStrategy::FanOut, &ids).unwrap();
        assert_eq!(fan_out.linked, 3);
        assert_eq!(fan_out.changes.len(), 3);
        for change in &fan_out.changes {
            assert_eq!(change.new, vec![Predecessor::finish_to_start(ids[0])]);
        }
    }

    #[test]
    fn test_cycles_are_skipped_not_fatal() {
        let mut items = siblings(&["A", "B", "C"]);
        let (a, b, c) = (id_of(&items, "A"), id_of(&items, "B"), id_of(&items, "C"));
        // A already depends on C.
        items
            .iter_mut()
            .find(|i| i.id == a)
            .unwrap()
            .predecessors
            .push(Predecessor::finish_to_start(c));

        let plan = plan_links(&items, LinkStrategy::Chain, &[a, b, c]).unwrap();
        // B <- A is fine; C <- B would close A -> B -> C -> A.
        assert_eq!(plan.linked, 1);
        assert_eq!(
            plan.cycles,
            vec![SkippedLink {
                successor: c,
                predecessor: b
            }]
        );
    }

    #[test]
    fn test_unlink_selected_keeps_external_dependencies() {
        let mut items = siblings(&["A", "B", "C", "Outside"]);
        let (a, b, c) = (id_of(&items, "A"), id_of(&items, "B"), id_of(&items, "C"));
        let outsider = id_of(&items, "Outside");
        {
            let b_item = items.iter_mut().find(|i| i.id == b).unwrap();
            b_item.predecessors = vec![
                Predecessor::finish_to_start(a),
                Predecessor::finish_to_start(outsider),
            ];
        }
        items
            .iter_mut()
            .find(|i| i.id == c)
            .unwrap()
            .predecessors
            .push(Predecessor::finish_to_start(b));

        let plan = plan_links(&items, LinkStrategy::UnlinkSelected, &[a, b]).unwrap();
        assert_eq!(plan.removed, 1);
        assert_eq!(plan.changes.len(), 1);
        assert_eq!(plan.changes[0].new, vec![Predecessor::finish_to_start(outsider)]);
    }

    #[test]
    fn test_clear_predecessors() {
        let mut items = siblings(&["A", "B"]);
        let (a, b) = (id_of(&items, "A"), id_of(&items, "B"));
        items
            .iter_mut()
            .find(|i| i.id == b)
            .unwrap()
            .predecessors
            .push(Predecessor::finish_to_start(a));

        let plan = plan_links(&items, LinkStrategy::ClearPredecessors, &[a, b]).unwrap();
        assert_eq!(plan.removed, 1);
        assert_eq!(plan.changes.len(), 1);
        assert!(plan.changes[0].new.is_empty());
        assert_eq!(plan.changes[0].previous.len(), 1);
    }

    #[test]
    fn test_selection_validation() {
        let items = siblings(&["A", "B"]);
        let a = id_of(&items, "A");

        let err = plan_links(&items, LinkStrategy::Chain, &[a]).unwrap_err();
        assert_eq!(err.to_string(), "Select at least two items to link.");

        let err = plan_links(&items, LinkStrategy::ClearPredecessors, &[]).unwrap_err();
        assert_eq!(err.to_string(), "Nothing selected.");

        let missing = uuid::Uuid::new_v4();
        assert!(matches!(
            plan_links(&items, LinkStrategy::Chain, &[a, missing]),
            Err(PlanningError::ItemNotFound { .. })
        ));
    }

    #[test]
    fn test_summary_messages() {
        let summary = LinkSummary {
            linked: 2,
            already_linked: 1,
            ..Default::default()
        };
        assert_eq!(summary.message(), "Linked 2 dependencies, 1 already linked");
        assert_eq!(LinkSummary::default().message(), "Nothing to change");
    }
}
