//! Selection-state management for nested item pickers.
//!
//! A picker is a tree of nodes, one per item, where each node can lazily
//! fetch its children, search across the item universe, and toggle its own
//! membership in a selection set shared by the whole tree. The crate owns
//! the state machinery only; rendering and data access stay outside
//! (data access is injected through [`repository::NestedItemsRepository`]).
//!
//! State mutation is serialized through a single reducer loop per
//! [`store::PickerStore`]; async repository work runs on spawned tasks and
//! rejoins the loop by dispatching follow-up actions.

pub mod count;
pub mod debounce;
pub mod effect;
pub mod error;
pub mod memory;
pub mod model;
pub mod node;
pub mod repository;
pub mod search;
pub mod selection;
pub mod store;

pub mod prelude {
    pub use crate::count::{ChildCountState, CountAction};
    pub use crate::debounce::SearchDebouncer;
    pub use crate::effect::{Effect, NodePath, at_path};
    pub use crate::error::RepositoryError;
    pub use crate::memory::InMemoryRepository;
    pub use crate::model::{PickerItem, PickerKey};
    pub use crate::node::{EmptyReason, NodeAction, NodeConfig, NodeState};
    pub use crate::repository::NestedItemsRepository;
    pub use crate::search::{SearchAction, SearchState};
    pub use crate::selection::SharedSelection;
    pub use crate::store::{PickerHandle, PickerStore};
}
