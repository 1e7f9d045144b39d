//! The recursive node state machine.
//!
//! One [`NodeState`] exists per tree position. A node owns its children
//! outright; there are no parent back-references, so "address a node"
//! always means a [`NodePath`] walked down from the root. Actions for
//! descendants are wrapped in [`NodeAction::Nested`] layers and unwrapped
//! one level per node; on the way back out each ancestor checks whether a
//! selection toggle happened anywhere below it and recomputes its own
//! counter if so.
//!
//! The reducer is pure apart from the shared selection set: all async work
//! is returned as [`Effect`] descriptions for the store to interpret.

use std::collections::HashSet;

use crate::count::{ChildCountState, CountAction, CountEvent};
use crate::effect::Effect;
use crate::error::RepositoryError;
use crate::model::{PickerItem, PickerKey};
use crate::search::{self, SearchAction, SearchEvent, SearchState};
use crate::selection::SharedSelection;

/// Why a node currently shows no children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// The children fetch succeeded but returned nothing.
    NoChildrenFound,
    /// The search succeeded but matched nothing.
    SearchResultEmpty,
    /// The children fetch failed.
    LoadFailed,
    /// The search failed.
    SearchFailed,
}

/// Per-node configuration, fixed at construction and inherited by children
/// built from fetched items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeConfig {
    /// Whether toggling this node also selects/deselects its descendants.
    pub include_children: bool,
    /// Whether nodes carry a selected-descendants counter.
    pub show_child_count: bool,
    /// Whether nodes expose a search bar.
    pub show_search_bar: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            include_children: false,
            show_child_count: false,
            show_search_bar: true,
        }
    }
}

/// Intents dispatchable to a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeAction<Id> {
    /// The node became visible for the first time; fetch children unless
    /// already populated.
    FirstAppear,
    /// Flip this node's membership in the shared selection set.
    ToggleSelection,
    /// Union ids into the shared selection (descendants of this node).
    AddSelected(Vec<Id>),
    /// Subtract ids from the shared selection (descendants of this node).
    RemoveSelected(Vec<Id>),
    /// A children fetch resolved.
    SetItems(Result<Vec<PickerItem<Id>>, RepositoryError>),
    /// Set the include-children flag, propagating to materialized children.
    SetIncludeChildren(bool),
    /// Action for this node's search subsystem.
    Search(SearchAction<Id>),
    /// Action for this node's counter.
    Count(CountAction<Id>),
    /// Action routed to the child with the given id.
    Nested(Id, Box<NodeAction<Id>>),
}

impl<Id> NodeAction<Id> {
    /// Whether this action is, or transitively wraps, a selection toggle.
    ///
    /// Ancestors use this to recompute their counters exactly once per
    /// toggle anywhere in their subtree.
    pub fn contains_toggle_selection(&self) -> bool {
        match self {
            NodeAction::ToggleSelection => true,
            NodeAction::Nested(_, inner) => inner.contains_toggle_selection(),
            _ => false,
        }
    }
}

/// State for one position in the picker tree.
#[derive(Debug, Clone)]
pub struct NodeState<Id> {
    /// Stable identifier, set at construction.
    pub id: Id,
    /// The item this node represents; `None` for a synthetic root.
    pub item: Option<PickerItem<Id>>,
    /// Display title.
    pub title: String,
    /// Materialized children, in display order, keyed unique by id.
    pub children: Vec<NodeState<Id>>,
    /// Whether toggling also selects/deselects descendants.
    pub include_children: bool,
    /// Whether this subtree carries selected-descendant counters.
    pub show_child_count: bool,
    /// Whether this subtree exposes search bars.
    pub show_search_bar: bool,
    /// Counter, present iff counts are enabled and an item is present.
    pub counter: Option<ChildCountState<Id>>,
    /// Search subsystem, created on first appear when enabled.
    pub search: Option<SearchState<Id>>,
    /// Why the node shows no children, if it does.
    pub empty_reason: Option<EmptyReason>,
    /// Whether a fetch or search for this node is in flight.
    pub is_loading: bool,
    selection: SharedSelection<Id>,
}

impl<Id: PickerKey> NodeState<Id> {
    /// Create a node for a repository item. The title defaults to the
    /// item's display name.
    pub fn node(item: PickerItem<Id>, config: NodeConfig, selection: SharedSelection<Id>) -> Self {
        let counter = config
            .show_child_count
            .then(|| ChildCountState::new(item.clone(), selection.clone()));
        Self {
            id: item.id.clone(),
            title: item.display_name.clone(),
            item: Some(item),
            children: Vec::new(),
            include_children: config.include_children,
            show_child_count: config.show_child_count,
            show_search_bar: config.show_search_bar,
            counter,
            search: None,
            empty_reason: None,
            is_loading: false,
            selection,
        }
    }

    /// Create a synthetic root with no item. Children are fetched on
    /// [`NodeAction::FirstAppear`] using this id as the parent.
    pub fn root(
        id: Id,
        title: impl Into<String>,
        config: NodeConfig,
        selection: SharedSelection<Id>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            item: None,
            children: Vec::new(),
            include_children: config.include_children,
            show_child_count: config.show_child_count,
            show_search_bar: config.show_search_bar,
            counter: None,
            search: None,
            empty_reason: None,
            is_loading: false,
            selection,
        }
    }

    /// Create a synthetic root pre-populated with items. A populated root
    /// skips the fetch on [`NodeAction::FirstAppear`].
    pub fn root_with_items(
        id: Id,
        title: impl Into<String>,
        initial_items: Vec<PickerItem<Id>>,
        config: NodeConfig,
        selection: SharedSelection<Id>,
    ) -> Self {
        let mut root = Self::root(id, title, config, selection);
        root.children = root.build_children(initial_items);
        root
    }

    /// Whether this node's id is in the shared selection.
    pub fn is_selected(&self) -> bool {
        self.selection.contains(&self.id)
    }

    /// The shared selection set this tree operates on.
    pub fn selection(&self) -> &SharedSelection<Id> {
        &self.selection
    }

    /// Child with the given id, if materialized.
    pub fn child(&self, id: &Id) -> Option<&NodeState<Id>> {
        self.children.iter().find(|c| &c.id == id)
    }

    /// Descendant at the given path, if materialized. An empty path is the
    /// node itself.
    pub fn node_at(&self, path: &[Id]) -> Option<&NodeState<Id>> {
        match path.split_first() {
            None => Some(self),
            Some((id, rest)) => self.child(id)?.node_at(rest),
        }
    }

    /// Reduce an action dispatched to this node (the root of this subtree),
    /// returning the effects to run.
    pub fn reduce(&mut self, action: NodeAction<Id>) -> Vec<Effect<Id>> {
        let mut path = Vec::new();
        self.reduce_at(&mut path, action)
    }

    fn reduce_at(&mut self, path: &mut Vec<Id>, action: NodeAction<Id>) -> Vec<Effect<Id>> {
        match action {
            NodeAction::Nested(id, inner) => {
                let toggled_below = inner.contains_toggle_selection();
                let mut effects = match self.children.iter_mut().find(|c| c.id == id) {
                    Some(child) => {
                        path.push(id);
                        let effects = child.reduce_at(path, *inner);
                        path.pop();
                        effects
                    }
                    None => {
                        // Stale route: the child set was replaced while the
                        // action was queued.
                        log::debug!("dropping action for unknown child {id:?}");
                        return Vec::new();
                    }
                };
                if toggled_below && self.include_children {
                    effects.extend(self.recompute_counter(path));
                }
                effects
            }

            NodeAction::FirstAppear => {
                // Already populated, e.g. a root constructed with items.
                if !self.children.is_empty() {
                    return Vec::new();
                }
                if self.show_search_bar && self.search.is_none() {
                    self.search = Some(SearchState::new());
                }
                self.is_loading = true;
                vec![Effect::LoadChildren {
                    path: path.clone(),
                    parent: self.id.clone(),
                }]
            }

            NodeAction::SetItems(Ok(items)) => {
                self.is_loading = false;
                if items.is_empty() {
                    self.empty_reason = Some(EmptyReason::NoChildrenFound);
                    self.children.clear();
                    return Vec::new();
                }
                self.empty_reason = None;
                self.children = self.build_children(items);
                Vec::new()
            }

            NodeAction::SetItems(Err(err)) => {
                log::warn!("children fetch for {:?} failed: {err}", self.id);
                self.is_loading = false;
                self.children.clear();
                self.empty_reason = Some(EmptyReason::LoadFailed);
                Vec::new()
            }

            NodeAction::SetIncludeChildren(enabled) => {
                if self.include_children == enabled {
                    return Vec::new();
                }
                self.include_children = enabled;
                // Fan-out to materialized children only; children fetched
                // later inherit the then-current flag at construction.
                self.propagate_include_children(enabled);
                Vec::new()
            }

            NodeAction::ToggleSelection => {
                let now_selected = self.selection.toggle(&self.id);
                log::debug!(
                    "toggled {:?}, selected = {now_selected}, include_children = {}",
                    self.id,
                    self.include_children
                );
                if self.include_children {
                    vec![Effect::LoadDescendants {
                        path: path.clone(),
                        parent: self.id.clone(),
                        select: now_selected,
                    }]
                } else {
                    Vec::new()
                }
            }

            NodeAction::AddSelected(ids) => {
                self.selection.insert_all(ids);
                if self.show_child_count {
                    self.recompute_counter(path)
                } else {
                    Vec::new()
                }
            }

            NodeAction::RemoveSelected(ids) => {
                self.selection.remove_all(ids.iter());
                if self.show_child_count {
                    self.recompute_counter(path)
                } else {
                    Vec::new()
                }
            }

            NodeAction::Search(action) => {
                let events = match self.search.as_mut() {
                    Some(search) => search::reduce(search, action),
                    None => {
                        log::debug!("search action for node {:?} without search bar", self.id);
                        return Vec::new();
                    }
                };
                self.apply_search_events(path, events)
            }

            NodeAction::Count(action) => {
                let Some(counter) = self.counter.as_mut() else {
                    return Vec::new();
                };
                counter
                    .reduce(action)
                    .into_iter()
                    .map(|CountEvent::FetchDescendants { parent }| Effect::CountDescendants {
                        path: path.clone(),
                        parent,
                    })
                    .collect()
            }
        }
    }

    fn apply_search_events(
        &mut self,
        path: &[Id],
        events: Vec<SearchEvent<Id>>,
    ) -> Vec<Effect<Id>> {
        let mut effects = Vec::new();
        for event in events {
            match event {
                SearchEvent::Started { query } => {
                    self.is_loading = true;
                    effects.push(Effect::StartSearch {
                        path: path.to_vec(),
                        query,
                    });
                }
                SearchEvent::Cancel => {
                    effects.push(Effect::CancelSearch {
                        path: path.to_vec(),
                    });
                }
                SearchEvent::Cleared => {
                    // Guard: only restore when the query really is empty.
                    if self.search.as_ref().is_none_or(|s| s.query.is_empty()) {
                        self.children.clear();
                        self.empty_reason = None;
                        self.is_loading = true;
                        effects.push(Effect::LoadChildren {
                            path: path.to_vec(),
                            parent: self.id.clone(),
                        });
                    }
                }
                SearchEvent::Failed => {
                    self.empty_reason = Some(EmptyReason::SearchFailed);
                    self.children.clear();
                }
                SearchEvent::Finished => {
                    self.is_loading = false;
                }
                SearchEvent::Results(items) => {
                    if items.is_empty() {
                        self.empty_reason = Some(EmptyReason::SearchResultEmpty);
                        self.children.clear();
                    } else {
                        self.empty_reason = None;
                        self.children = self.build_children(items);
                    }
                }
            }
        }
        effects
    }

    /// Recompute this node's own counter, if it has one.
    fn recompute_counter(&mut self, path: &[Id]) -> Vec<Effect<Id>> {
        let Some(counter) = self.counter.as_mut() else {
            return Vec::new();
        };
        counter
            .reduce(CountAction::Recompute)
            .into_iter()
            .map(|CountEvent::FetchDescendants { parent }| Effect::CountDescendants {
                path: path.to_vec(),
                parent,
            })
            .collect()
    }

    fn propagate_include_children(&mut self, enabled: bool) {
        for child in &mut self.children {
            if child.include_children != enabled {
                child.include_children = enabled;
                child.propagate_include_children(enabled);
            }
        }
    }

    /// Build fresh child nodes from item data, inheriting this node's
    /// configuration and selection. Children are always reconstructed, never
    /// diffed against the previous set.
    fn build_children(&self, items: Vec<PickerItem<Id>>) -> Vec<NodeState<Id>> {
        let config = NodeConfig {
            include_children: self.include_children,
            show_child_count: self.show_child_count,
            show_search_bar: self.show_search_bar,
        };
        let mut seen = HashSet::with_capacity(items.len());
        let mut children = Vec::with_capacity(items.len());
        for item in items {
            if !seen.insert(item.id.clone()) {
                log::warn!("dropping duplicate child id {:?}", item.id);
                continue;
            }
            children.push(NodeState::node(item, config, self.selection.clone()));
        }
        children
    }
}
