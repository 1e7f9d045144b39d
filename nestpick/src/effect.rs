//! Declarative effects emitted by the node reducer.
//!
//! Reducers never perform async work; they describe it. The store
//! interprets each effect against the repository and feeds the outcome back
//! in as a follow-up action addressed to the emitting node.

use crate::model::PickerKey;
use crate::node::NodeAction;

/// Address of a node in the tree: the ids along the way from the root
/// (exclusive) to the node (inclusive). The root itself is the empty path.
///
/// Paths replace parent back-references; nothing in the tree points upward.
pub type NodePath<Id> = Vec<Id>;

/// An async side effect requested by a node, addressed by its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect<Id> {
    /// Fetch first-level children of `parent`; rejoins as
    /// [`NodeAction::SetItems`].
    LoadChildren {
        /// Requesting node.
        path: NodePath<Id>,
        /// Parent id to fetch children for.
        parent: Id,
    },
    /// Fetch the full descendant-id set of `parent` and add it to (or
    /// remove it from) the shared selection; rejoins as
    /// [`NodeAction::AddSelected`] / [`NodeAction::RemoveSelected`].
    LoadDescendants {
        /// Requesting node.
        path: NodePath<Id>,
        /// Parent id to enumerate descendants for.
        parent: Id,
        /// `true` to select the descendants, `false` to deselect.
        select: bool,
    },
    /// Fetch the descendant-id set for a counter recompute; rejoins as
    /// [`CountAction::CountLoaded`](crate::count::CountAction::CountLoaded).
    /// Cancellable: a newer recompute for the same node supersedes this one.
    CountDescendants {
        /// Requesting node.
        path: NodePath<Id>,
        /// Item id the counter belongs to.
        parent: Id,
    },
    /// Issue a search request; rejoins as
    /// [`SearchAction::ResultsLoaded`](crate::search::SearchAction::ResultsLoaded).
    /// Cancellable: at most one in-flight search per node, latest query wins.
    StartSearch {
        /// Requesting node.
        path: NodePath<Id>,
        /// Query to search for.
        query: String,
    },
    /// Cancel any in-flight search request for this node.
    CancelSearch {
        /// Requesting node.
        path: NodePath<Id>,
    },
}

/// Wrap an action in [`NodeAction::Nested`] layers so that dispatching it
/// at the root routes it to the node at `path`.
pub fn at_path<Id: PickerKey>(path: NodePath<Id>, action: NodeAction<Id>) -> NodeAction<Id> {
    path.into_iter()
        .rev()
        .fold(action, |action, id| NodeAction::Nested(id, Box::new(action)))
}
