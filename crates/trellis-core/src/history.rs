//! Bounded undo/redo history of invertible planning actions.
//!
//! [`History`] only does the stack bookkeeping: [`History::pop_undo`] and
//! [`History::pop_redo`] hand back the entry and the caller performs the
//! inverse (or forward) effect against the store. If that fails the caller
//! puts the entry back with [`History::requeue_undo`] /
//! [`History::requeue_redo`] so the user can retry.
//!
//! Every change of the derived [`HistoryState`] is published on a
//! `tokio::sync::watch` channel obtained from [`History::subscribe`]. A watch
//! channel keeps only the newest value, so a receiver that reads after
//! several changes (a failed undo pops and requeues, for instance) sees the
//! final state once rather than each step.

use std::collections::VecDeque;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::{
    dependencies::PredecessorChange,
    models::{ItemId, ItemPatch, Placement, PlacementChange},
};

/// Default number of entries kept on the undo stack.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Re-parenting of one item by promote or demote, with every other item the
/// gesture touched (cascaded descendants and resequenced siblings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reparent {
    pub id: ItemId,
    pub previous: Placement,
    pub new: Placement,
    pub affected: Vec<PlacementChange>,
}

impl Reparent {
    /// All placement changes of the gesture, the re-parented item first.
    pub fn changes(&self) -> Vec<PlacementChange> {
        let mut changes = vec![PlacementChange {
            id: self.id,
            before: self.previous,
            after: self.new,
        }];
        changes.extend(self.affected.iter().copied());
        changes
    }
}

/// A user action with enough data to invert it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryAction {
    Create {
        id: ItemId,
    },
    Update {
        id: ItemId,
        previous: ItemPatch,
        new: ItemPatch,
    },
    Delete {
        ids: Vec<ItemId>,
    },
    BatchDelete {
        ids: Vec<ItemId>,
    },
    Paste {
        created_ids: Vec<ItemId>,
        cut_ids: Vec<ItemId>,
    },
    Promote(Reparent),
    Demote(Reparent),
    Move {
        item_ids: Vec<ItemId>,
        changes: Vec<PlacementChange>,
        new_parent_id: Option<ItemId>,
        new_sort_order: Option<i64>,
    },
    Link {
        changes: Vec<PredecessorChange>,
    },
    Import {
        created_ids: Vec<ItemId>,
    },
}

impl HistoryAction {
    /// Machine name of the action.
    pub fn type_name(&self) -> &'static str {
        match self {
            HistoryAction::Create { .. } => "create",
            HistoryAction::Update { .. } => "update",
            HistoryAction::Delete { .. } => "delete",
            HistoryAction::BatchDelete { .. } => "batch_delete",
            HistoryAction::Paste { .. } => "paste",
            HistoryAction::Promote(_) => "promote",
            HistoryAction::Demote(_) => "demote",
            HistoryAction::Move { .. } => "move",
            HistoryAction::Link { .. } => "link",
            HistoryAction::Import { .. } => "import",
        }
    }

    /// User-facing label of the action.
    pub fn label(&self) -> &'static str {
        label_for(self.type_name())
    }
}

/// Label for an action type, falling back to the type name itself.
pub fn label_for(type_name: &str) -> &str {
    match type_name {
        "create" => "Create",
        "update" => "Edit",
        "delete" => "Delete",
        "paste" => "Paste",
        "promote" => "Promote",
        "demote" => "Demote",
        "move" => "Move",
        "batch_delete" => "Delete Items",
        "link" => "Link",
        "import" => "Import",
        other => other,
    }
}

/// An action recorded on the history stacks. Never modified once pushed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub action: HistoryAction,
    pub timestamp: Timestamp,
}

/// Snapshot of what undo and redo would do next.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HistoryState {
    pub can_undo: bool,
    pub can_redo: bool,
    pub undo_label: Option<String>,
    pub redo_label: Option<String>,
}

/// Linear undo/redo stacks with a bounded undo side.
#[derive(Debug)]
pub struct History {
    undo: VecDeque<HistoryEntry>,
    redo: Vec<HistoryEntry>,
    capacity: usize,
    state: watch::Sender<HistoryState>,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Creates a history keeping at most `capacity` undo entries (at least 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let (state, _) = watch::channel(HistoryState::default());
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            capacity: capacity.max(1),
            state,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records a new action. Clears the redo stack and evicts the oldest
    /// undo entry beyond capacity.
    pub fn push(&mut self, action: HistoryAction) {
        log::debug!("History push: {}", action.type_name());
        self.undo.push_back(HistoryEntry {
            action,
            timestamp: Timestamp::now(),
        });
        self.evict();
        self.redo.clear();
        self.publish();
    }

    /// Moves the newest undo entry to the redo stack and returns it.
    pub fn pop_undo(&mut self) -> Option<HistoryEntry> {
        let entry = self.undo.pop_back()?;
        self.redo.push(entry.clone());
        self.publish();
        Some(entry)
    }

    /// Moves the newest redo entry to the undo stack and returns it.
    pub fn pop_redo(&mut self) -> Option<HistoryEntry> {
        let entry = self.redo.pop()?;
        self.undo.push_back(entry.clone());
        self.evict();
        self.publish();
        Some(entry)
    }

    /// Reverts a [`History::pop_undo`] whose inverse could not be applied.
    pub fn requeue_undo(&mut self, entry: HistoryEntry) {
        if self.redo.last() == Some(&entry) {
            self.redo.pop();
        }
        self.undo.push_back(entry);
        self.evict();
        self.publish();
    }

    /// Reverts a [`History::pop_redo`] whose effect could not be applied.
    pub fn requeue_redo(&mut self, entry: HistoryEntry) {
        if self.undo.back() == Some(&entry) {
            self.undo.pop_back();
        }
        self.redo.push(entry);
        self.publish();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.undo.back().map(|entry| entry.action.label())
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.redo.last().map(|entry| entry.action.label())
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Undo entries, oldest first.
    pub fn undo_entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.undo.iter()
    }

    pub fn state(&self) -> HistoryState {
        HistoryState {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            undo_label: self.undo_label().map(String::from),
            redo_label: self.redo_label().map(String::from),
        }
    }

    /// Receiver of the current state. Changes between two reads coalesce
    /// into the latest one.
    pub fn subscribe(&self) -> watch::Receiver<HistoryState> {
        self.state.subscribe()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.publish();
    }

    fn evict(&mut self) {
        while self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
    }

    fn publish(&self) {
        self.state.send_replace(self.state());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn create() -> HistoryAction {
        HistoryAction::Create { id: Uuid::new_v4() }
    }

    #[test]
    fn test_subscribers_see_latest_state() {
        let mut history = History::new();
        let mut receiver = history.subscribe();

        history.push(create());
        let entry = history.pop_undo().unwrap();
        history.requeue_undo(entry);

        assert!(receiver.has_changed().unwrap());
        let state = receiver.borrow_and_update().clone();
        assert!(state.can_undo);
        assert!(!state.can_redo);
        assert!(!receiver.has_changed().unwrap());
    }

    #[test]
    fn test_push_pop_moves_between_stacks() {
        let mut history = History::new();
        assert!(history.pop_undo().is_none());
        assert!(history.pop_redo().is_none());

        let action = create();
        history.push(action.clone());
        assert!(history.can_undo());
        assert!(!history.can_redo());

        let entry = history.pop_undo().unwrap();
        assert_eq!(entry.action, action);
        assert!(!history.can_undo());
        assert!(history.can_redo());

        let redone = history.pop_redo().unwrap();
        assert_eq!(redone, entry);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = History::new();
        history.push(create());
        history.push(create());
        history.pop_undo();
        assert_eq!(history.redo_len(), 1);

        history.push(create());
        assert_eq!(history.redo_len(), 0);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = History::new();
        let first = create();
        history.push(first.clone());
        for _ in 0..50 {
            history.push(create());
        }
        assert_eq!(history.undo_len(), 50);
        assert!(history.undo_entries().all(|entry| entry.action != first));
    }

    #[test]
    fn test_labels() {
        let mut history = History::new();
        history.push(HistoryAction::BatchDelete { ids: vec![] });
        assert_eq!(history.undo_label(), Some("Delete Items"));
        history.push(HistoryAction::Update {
            id: Uuid::new_v4(),
            previous: ItemPatch::default(),
            new: ItemPatch::default(),
        });
        assert_eq!(history.undo_label(), Some("Edit"));
        history.pop_undo();
        assert_eq!(history.redo_label(), Some("Edit"));
        assert_eq!(history.undo_label(), Some("Delete Items"));

        assert_eq!(label_for("paste"), "Paste");
        assert_eq!(label_for("reorder"), "reorder");
    }

    #[test]
    fn test_requeue_restores_original_stack() {
        let mut history = History::new();
        history.push(create());
        let entry = history.pop_undo().unwrap();
        history.requeue_undo(entry.clone());
        assert_eq!(history.undo_len(), 1);
        assert_eq!(history.redo_len(), 0);

        let entry = history.pop_undo().unwrap();
        let again = history.pop_redo().unwrap();
        assert_eq!(entry, again);
        history.requeue_redo(again);
        assert_eq!(history.undo_len(), 0);
        assert_eq!(history.redo_len(), 1);
    }

    #[test]
    fn test_subscriber_tracks_pushes_and_pops() {
        let mut history = History::new();
        let mut receiver = history.subscribe();
        assert_eq!(*receiver.borrow(), HistoryState::default());

        history.push(HistoryAction::Paste {
            created_ids: vec![],
            cut_ids: vec![],
        });
        assert!(receiver.has_changed().unwrap());
        let state = receiver.borrow_and_update().clone();
        assert_eq!(
            state,
            HistoryState {
                can_undo: true,
                can_redo: false,
                undo_label: Some("Paste".into()),
                redo_label: None,
            }
        );

        history.pop_undo();
        let state = receiver.borrow_and_update().clone();
        assert!(!state.can_undo);
        assert_eq!(state.redo_label.as_deref(), Some("Paste"));
    }
}
