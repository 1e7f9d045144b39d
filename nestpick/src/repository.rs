//! Repository capability.
//!
//! The picker does not fetch anything itself; it is handed an
//! implementation of [`NestedItemsRepository`] at store creation.

use async_trait::async_trait;

use crate::error::RepositoryError;
use crate::model::{PickerItem, PickerKey};

/// Data-access capability for a nested item universe.
///
/// All three operations are invoked off the reducer loop; results rejoin it
/// as follow-up actions. The picker imposes no timeout — an operation that
/// never resolves leaves the requesting node loading indefinitely.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use nestpick::prelude::*;
///
/// struct CategoryApi { /* ... */ }
///
/// #[async_trait]
/// impl NestedItemsRepository<String> for CategoryApi {
///     async fn children_of(&self, parent: &String)
///         -> Result<Vec<PickerItem<String>>, RepositoryError> { /* ... */ }
///     async fn descendant_ids_of(&self, parent: &String) -> Vec<String> { /* ... */ }
///     async fn search(&self, query: &str)
///         -> Result<Vec<PickerItem<String>>, RepositoryError> { /* ... */ }
/// }
/// ```
#[async_trait]
pub trait NestedItemsRepository<Id: PickerKey>: Send + Sync {
    /// Direct children of the given parent (first descendant level only),
    /// in display order.
    async fn children_of(&self, parent: &Id) -> Result<Vec<PickerItem<Id>>, RepositoryError>;

    /// Ids of all transitive descendants of the given parent, flattened.
    ///
    /// No order is guaranteed. Infallible by contract: implementations that
    /// can fail should degrade to an empty list.
    async fn descendant_ids_of(&self, parent: &Id) -> Vec<Id>;

    /// Search the entire item universe (not just one subtree) by display
    /// name.
    async fn search(&self, query: &str) -> Result<Vec<PickerItem<Id>>, RepositoryError>;
}
