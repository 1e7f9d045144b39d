//! Selected-descendants counter.
//!
//! Present on a node when child counts are enabled and the node has an
//! item. The count is always recomputed in full against the current
//! descendant-id set and the current shared selection; there is no
//! incremental bookkeeping, so concurrent selection changes from sibling
//! subtrees can never leave the count permanently wrong — the next
//! recompute reads fresh state.

use crate::model::{PickerItem, PickerKey};
use crate::selection::SharedSelection;

/// Counter state for one node.
#[derive(Debug, Clone)]
pub struct ChildCountState<Id> {
    /// The item whose descendants are counted.
    pub item: PickerItem<Id>,
    /// Number of currently selected descendants, as of the last recompute.
    pub selected_children_count: usize,
    selection: SharedSelection<Id>,
}

/// Intents dispatched to a node's counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountAction<Id> {
    /// Re-derive the count: fetch the descendant-id set, then count.
    Recompute,
    /// Descendant ids arrived; intersect with the shared selection.
    CountLoaded(Vec<Id>),
}

/// What the counter asks of its owning node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountEvent<Id> {
    /// The descendant-id set of this item should be fetched. Cancellable:
    /// a newer recompute supersedes an outstanding fetch.
    FetchDescendants {
        /// Item to enumerate descendants for.
        parent: Id,
    },
}

impl<Id: PickerKey> ChildCountState<Id> {
    /// Create a counter for the given item, starting at zero.
    pub fn new(item: PickerItem<Id>, selection: SharedSelection<Id>) -> Self {
        Self {
            item,
            selected_children_count: 0,
            selection,
        }
    }

    /// Presentation text for the count: `"N included"`, or empty when
    /// nothing is selected below this item.
    pub fn display_text(&self) -> String {
        if self.selected_children_count > 0 {
            format!("{} included", self.selected_children_count)
        } else {
            String::new()
        }
    }

    /// Reduce one counter action.
    pub fn reduce(&mut self, action: CountAction<Id>) -> Vec<CountEvent<Id>> {
        match action {
            CountAction::Recompute => {
                // Leaf items cannot have selected descendants.
                if !self.item.has_children {
                    return Vec::new();
                }
                vec![CountEvent::FetchDescendants {
                    parent: self.item.id.clone(),
                }]
            }
            CountAction::CountLoaded(descendant_ids) => {
                let count = self.selection.count_selected(descendant_ids.iter());
                log::debug!(
                    "counted {count} selected of {} descendants for {:?}",
                    descendant_ids.len(),
                    self.item.id
                );
                self.selected_children_count = count;
                Vec::new()
            }
        }
    }
}

impl<Id: PickerKey> PartialEq for ChildCountState<Id> {
    fn eq(&self, other: &Self) -> bool {
        self.item == other.item && self.selected_children_count == other.selected_children_count
    }
}

impl<Id: PickerKey> Eq for ChildCountState<Id> {}
