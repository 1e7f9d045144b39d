//! Item model and identifier bounds.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Bound alias for picker item identifiers.
///
/// The identifier type is generic; anything comparable, orderable, and
/// hashable that can cross task boundaries qualifies (`String`, `u64`,
/// `Uuid`, ...). Implemented automatically via the blanket impl.
pub trait PickerKey:
    Clone + Eq + Ord + Hash + fmt::Debug + Send + Sync + 'static
{
}

impl<T> PickerKey for T where T: Clone + Eq + Ord + Hash + fmt::Debug + Send + Sync + 'static {}

/// An item as supplied by the repository.
///
/// Immutable value; equality by all fields. `has_children` is a hint from
/// the data source and gates descendant-count recomputation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerItem<Id> {
    /// Unique, stable identifier.
    pub id: Id,
    /// Human-readable name, also the default node title.
    pub display_name: String,
    /// Whether the item has children that can be fetched.
    pub has_children: bool,
}

impl<Id> PickerItem<Id> {
    /// Creates a new item.
    pub fn new(id: Id, display_name: impl Into<String>, has_children: bool) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            has_children,
        }
    }
}
