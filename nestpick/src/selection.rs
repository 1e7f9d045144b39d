//! Shared selection set.
//!
//! One selection set exists per picker session. Every node in the tree
//! holds a clone, and all clones share the same underlying set, so a toggle
//! anywhere is immediately visible everywhere. Mutation happens inside a
//! lock-protected critical section; reads take a snapshot and never hold
//! the lock across awaits.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::model::PickerKey;

/// ID-based selection state shared across the whole tree.
///
/// Cheap to clone; clones refer to the same set.
#[derive(Debug)]
pub struct SharedSelection<Id> {
    inner: Arc<Mutex<HashSet<Id>>>,
}

impl<Id: PickerKey> SharedSelection<Id> {
    /// Create a new empty selection.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Create a selection pre-populated with the given ids.
    pub fn with_selected(ids: impl IntoIterator<Item = Id>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ids.into_iter().collect())),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<Id>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Check if an id is selected.
    pub fn contains(&self, id: &Id) -> bool {
        self.lock().contains(id)
    }

    /// Number of selected ids.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Flip membership of an id. Returns whether the id is selected
    /// afterwards.
    pub fn toggle(&self, id: &Id) -> bool {
        let mut set = self.lock();
        if set.remove(id) {
            false
        } else {
            set.insert(id.clone());
            true
        }
    }

    /// Union the given ids into the selection.
    pub fn insert_all(&self, ids: impl IntoIterator<Item = Id>) {
        let mut set = self.lock();
        set.extend(ids);
    }

    /// Subtract the given ids from the selection.
    pub fn remove_all<'a>(&self, ids: impl IntoIterator<Item = &'a Id>)
    where
        Id: 'a,
    {
        let mut set = self.lock();
        for id in ids {
            set.remove(id);
        }
    }

    /// Remove everything from the selection.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Snapshot of the current selection.
    ///
    /// The snapshot is decoupled from the live set; concurrent mutations do
    /// not affect it.
    pub fn snapshot(&self) -> HashSet<Id> {
        self.lock().clone()
    }

    /// Count how many of the given ids are currently selected.
    pub fn count_selected<'a>(&self, ids: impl IntoIterator<Item = &'a Id>) -> usize
    where
        Id: 'a,
    {
        let set = self.lock();
        ids.into_iter().filter(|id| set.contains(id)).count()
    }
}

impl<Id: PickerKey> Default for SharedSelection<Id> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Id> Clone for SharedSelection<Id> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
