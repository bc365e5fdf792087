//! Dotted outline numbering shared by the stores.

use std::collections::HashMap;

use crate::{
    models::{ItemId, PlanItem},
    tree::TreeIndex,
};

/// Numbers every reachable, non-deleted item `1`, `1.1`, `1.1.1`... in tree
/// order. Orphans get no number.
pub fn compute_wbs(items: &[PlanItem]) -> HashMap<ItemId, String> {
    let tree = TreeIndex::new(items);
    let mut numbers = HashMap::with_capacity(tree.len());
    let mut stack: Vec<(&PlanItem, String)> = tree
        .roots()
        .into_iter()
        .enumerate()
        .rev()
        .map(|(i, item)| (item, (i + 1).to_string()))
        .collect();

    while let Some((item, number)) = stack.pop() {
        for (i, child) in tree.children(Some(item.id)).into_iter().enumerate().rev() {
            stack.push((child, format!("{number}.{}", i + 1)));
        }
        numbers.insert(item.id, number);
    }
    numbers
}
