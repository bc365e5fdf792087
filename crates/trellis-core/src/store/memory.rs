//! In-memory plan store.
//!
//! Items live in a `tokio::sync::RwLock<HashMap>`. Item writes can be made to
//! fail on demand with [`MemoryStore::set_fail_writes`],
//! [`MemoryStore::fail_writes_after`] or [`MemoryStore::fail_one_write_after`],
//! which is how the planner's reconcile and rollback paths are exercised.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::RwLock;

use super::{wbs, PlanStore};
use crate::{
    error::{PlanningError, Result},
    models::{ItemId, ItemPatch, NewPlanItem, PlanItem},
    mutator::SORT_ORDER_STEP,
};

const UNLIMITED: usize = usize::MAX;

/// Plan store backed by a hash map.
#[derive(Debug)]
pub struct MemoryStore {
    items: RwLock<HashMap<ItemId, PlanItem>>,
    /// Item writes still allowed to succeed; `UNLIMITED` disables injection
    writes_left: AtomicUsize,
    /// Writes to let through before a single failing one; `UNLIMITED` when off
    fail_once_in: AtomicUsize,
    writes: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            writes_left: AtomicUsize::new(UNLIMITED),
            fail_once_in: AtomicUsize::new(UNLIMITED),
            writes: AtomicUsize::new(0),
        }
    }

    /// Creates a store preloaded with `items`, stored as given.
    pub fn with_items(items: impl IntoIterator<Item = PlanItem>) -> Self {
        let mut store = Self::new();
        *store.items.get_mut() = items.into_iter().map(|item| (item.id, item)).collect();
        store
    }

    /// Makes every item write fail (`true`) or succeed (`false`).
    pub fn set_fail_writes(&self, fail: bool) {
        let left = if fail { 0 } else { UNLIMITED };
        self.writes_left.store(left, Ordering::SeqCst);
    }

    /// Lets the next `n` item writes succeed and fails every one after.
    pub fn fail_writes_after(&self, n: usize) {
        self.writes_left.store(n, Ordering::SeqCst);
    }

    /// Lets the next `n` item writes succeed, fails the one after and then
    /// lets writes through again.
    pub fn fail_one_write_after(&self, n: usize) {
        self.fail_once_in.store(n, Ordering::SeqCst);
    }

    /// Number of successful item writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Snapshot of one item, including soft-deleted ones.
    pub async fn get(&self, id: ItemId) -> Option<PlanItem> {
        self.items.read().await.get(&id).cloned()
    }

    fn begin_write(&self, what: &str) -> Result<()> {
        let mut failed_once = false;
        // Ok means the countdown was running and has been advanced.
        let _ = self
            .fail_once_in
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                failed_once = left == 0;
                match left {
                    UNLIMITED => None,
                    0 => Some(UNLIMITED),
                    n => Some(n - 1),
                }
            });
        if failed_once {
            return Err(PlanningError::Persistence {
                message: format!("Failed to {what}: store unavailable"),
            });
        }

        let allowed = self
            .writes_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                0 => None,
                UNLIMITED => Some(UNLIMITED),
                n => Some(n - 1),
            })
            .is_ok();
        if !allowed {
            return Err(PlanningError::Persistence {
                message: format!("Failed to {what}: store unavailable"),
            });
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn next_sort_order(items: &HashMap<ItemId, PlanItem>, item: &NewPlanItem) -> i64 {
    items
        .values()
        .filter(|other| {
            other.project_id == item.project_id
                && other.parent_id == item.parent_id
                && !other.is_deleted
        })
        .map(|other| other.sort_order)
        .max()
        .map_or(SORT_ORDER_STEP, |max| max + SORT_ORDER_STEP)
}

fn set_deleted(items: &mut HashMap<ItemId, PlanItem>, ids: &[ItemId], deleted: bool) -> Result<()> {
    if let Some(&id) = ids.iter().find(|id| !items.contains_key(id)) {
        return Err(PlanningError::ItemNotFound { id });
    }
    let now = Timestamp::now();
    for id in ids {
        if let Some(item) = items.get_mut(id) {
            item.is_deleted = deleted;
            item.updated_at = Some(now);
        }
    }
    Ok(())
}

#[async_trait]
impl PlanStore for MemoryStore {
    async fn fetch_all(&self, project_id: u64) -> Result<Vec<PlanItem>> {
        let items = self.items.read().await;
        let mut found: Vec<PlanItem> = items
            .values()
            .filter(|item| item.project_id == project_id && !item.is_deleted)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn create_item(&self, item: NewPlanItem) -> Result<PlanItem> {
        let mut items = self.items.write().await;
        if let Some(parent_id) = item.parent_id {
            if items.get(&parent_id).map_or(true, |parent| parent.is_deleted) {
                return Err(PlanningError::ItemNotFound { id: parent_id });
            }
        }
        self.begin_write("create item")?;

        let sort_order = item
            .sort_order
            .unwrap_or_else(|| next_sort_order(&items, &item));
        let created = item.into_item(sort_order, Timestamp::now());
        items.insert(created.id, created.clone());
        Ok(created)
    }

    async fn create_batch(&self, project_id: u64, batch: Vec<PlanItem>) -> Result<Vec<PlanItem>> {
        let mut items = self.items.write().await;
        self.begin_write("create items")?;

        let now = Timestamp::now();
        let created: Vec<PlanItem> = batch
            .into_iter()
            .map(|mut item| {
                item.project_id = project_id;
                item.is_deleted = false;
                item.created_at = Some(now);
                item.updated_at = Some(now);
                item
            })
            .collect();
        for item in &created {
            items.insert(item.id, item.clone());
        }
        Ok(created)
    }

    async fn update_item(&self, id: ItemId, patch: ItemPatch) -> Result<PlanItem> {
        let mut items = self.items.write().await;
        let item = items
            .get_mut(&id)
            .filter(|item| !item.is_deleted)
            .ok_or(PlanningError::ItemNotFound { id })?;
        self.begin_write("update item")?;

        item.apply_patch(&patch);
        item.updated_at = Some(Timestamp::now());
        Ok(item.clone())
    }

    async fn soft_delete_batch(&self, ids: &[ItemId]) -> Result<()> {
        let mut items = self.items.write().await;
        self.begin_write("delete items")?;
        set_deleted(&mut items, ids, true)
    }

    async fn recalculate_wbs(&self, project_id: u64) -> Result<()> {
        let mut items = self.items.write().await;
        let project: Vec<PlanItem> = items
            .values()
            .filter(|item| item.project_id == project_id)
            .cloned()
            .collect();
        let numbers = wbs::compute_wbs(&project);
        for item in items.values_mut().filter(|item| item.project_id == project_id) {
            item.wbs = numbers.get(&item.id).cloned();
        }
        Ok(())
    }

    async fn restore(&self, ids: &[ItemId]) -> Result<()> {
        let mut items = self.items.write().await;
        self.begin_write("restore items")?;
        set_deleted(&mut items, ids, false)
    }
}
