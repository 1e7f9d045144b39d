//! Integration tests for the picker store: loading, selection, counters,
//! and include-children propagation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use nestpick::prelude::*;

// Universe:
//   root
//   ├── 1 "Food" (has children: 11 "Fruits" { 111, 112 }, 12 "Grains")
//   └── 2 "Books" (leaf)
fn universe() -> InMemoryRepository<u32> {
    InMemoryRepository::new()
        .with_children(
            0,
            [
                PickerItem::new(1, "Food", true),
                PickerItem::new(2, "Books", false),
            ],
        )
        .with_children(
            1,
            [
                PickerItem::new(11, "Fruits", true),
                PickerItem::new(12, "Grains", false),
            ],
        )
        .with_children(
            11,
            [
                PickerItem::new(111, "Apples", false),
                PickerItem::new(112, "Bananas", false),
            ],
        )
}

fn spawn_picker(config: NodeConfig) -> PickerHandle<u32> {
    let root = NodeState::root(0, "Categories", config, SharedSelection::new());
    PickerStore::spawn(root, Arc::new(universe()))
}

// =============================================================================
// Loading
// =============================================================================

#[tokio::test]
async fn test_first_appear_populates_children() {
    let picker = spawn_picker(NodeConfig::default());
    picker.first_appear(vec![]);
    picker.settle().await;

    let state = picker.state();
    let ids: Vec<u32> = state.children.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(state.empty_reason, None);
    assert!(!state.is_loading);
    assert_eq!(state.child(&1).unwrap().title, "Food");
}

#[tokio::test]
async fn test_first_appear_skips_fetch_when_already_populated() {
    struct PanickyRepo;

    #[async_trait]
    impl NestedItemsRepository<u32> for PanickyRepo {
        async fn children_of(&self, _: &u32) -> Result<Vec<PickerItem<u32>>, RepositoryError> {
            panic!("populated root must not fetch");
        }
        async fn descendant_ids_of(&self, _: &u32) -> Vec<u32> {
            Vec::new()
        }
        async fn search(&self, _: &str) -> Result<Vec<PickerItem<u32>>, RepositoryError> {
            Ok(Vec::new())
        }
    }

    let root = NodeState::root_with_items(
        0,
        "Categories",
        vec![PickerItem::new(1, "Food", true)],
        NodeConfig::default(),
        SharedSelection::new(),
    );
    let picker = PickerStore::spawn(root, Arc::new(PanickyRepo));
    picker.first_appear(vec![]);
    picker.settle().await;

    let state = picker.state();
    assert_eq!(state.children.len(), 1);
    assert_eq!(state.empty_reason, None);
}

#[tokio::test]
async fn test_empty_fetch_reports_no_children_found() {
    let picker = spawn_picker(NodeConfig::default());
    picker.first_appear(vec![]);
    picker.settle().await;

    // Books is a leaf in the repository: fetching it yields nothing.
    picker.first_appear(vec![2]);
    picker.settle().await;

    let state = picker.state();
    let books = state.node_at(&[2]).unwrap();
    assert_eq!(books.empty_reason, Some(EmptyReason::NoChildrenFound));
    assert!(books.children.is_empty());
    assert!(!books.is_loading);
}

#[tokio::test]
async fn test_failed_fetch_reports_load_error() {
    struct FailingRepo;

    #[async_trait]
    impl NestedItemsRepository<u32> for FailingRepo {
        async fn children_of(&self, _: &u32) -> Result<Vec<PickerItem<u32>>, RepositoryError> {
            Err(RepositoryError::new("offline"))
        }
        async fn descendant_ids_of(&self, _: &u32) -> Vec<u32> {
            Vec::new()
        }
        async fn search(&self, _: &str) -> Result<Vec<PickerItem<u32>>, RepositoryError> {
            Err(RepositoryError::new("offline"))
        }
    }

    let root = NodeState::root(0, "Categories", NodeConfig::default(), SharedSelection::new());
    let picker = PickerStore::spawn(root, Arc::new(FailingRepo));
    picker.first_appear(vec![]);
    picker.settle().await;

    let state = picker.state();
    assert_eq!(state.empty_reason, Some(EmptyReason::LoadFailed));
    assert!(state.children.is_empty());
    assert!(!state.is_loading);
}

// =============================================================================
// Selection
// =============================================================================

#[tokio::test]
async fn test_toggle_without_include_children_flips_only_own_id() {
    let picker = spawn_picker(NodeConfig::default());
    picker.first_appear(vec![]);
    picker.settle().await;

    picker.toggle_selection(vec![1]);
    picker.settle().await;
    assert_eq!(picker.selection().snapshot(), [1].into());

    picker.toggle_selection(vec![1]);
    picker.settle().await;
    assert!(picker.selection().is_empty());
}

#[tokio::test]
async fn test_toggle_with_include_children_selects_descendants() {
    let config = NodeConfig {
        include_children: true,
        show_child_count: true,
        show_search_bar: false,
    };
    let picker = spawn_picker(config);
    picker.first_appear(vec![]);
    picker.settle().await;

    picker.toggle_selection(vec![1]);
    picker.settle().await;

    // Food plus every transitive descendant.
    assert_eq!(
        picker.selection().snapshot(),
        [1, 11, 12, 111, 112].into()
    );
    let state = picker.state();
    let food = state.node_at(&[1]).unwrap();
    assert_eq!(food.counter.as_ref().unwrap().selected_children_count, 4);
    assert_eq!(food.counter.as_ref().unwrap().display_text(), "4 included");
}

#[tokio::test]
async fn test_toggle_back_removes_descendants() {
    let config = NodeConfig {
        include_children: true,
        show_child_count: true,
        show_search_bar: false,
    };
    let picker = spawn_picker(config);
    picker.first_appear(vec![]);
    picker.settle().await;

    picker.toggle_selection(vec![1]);
    picker.settle().await;
    picker.toggle_selection(vec![1]);
    picker.settle().await;

    assert!(picker.selection().is_empty());
    let state = picker.state();
    let counter = state.node_at(&[1]).unwrap().counter.clone().unwrap();
    assert_eq!(counter.selected_children_count, 0);
    assert_eq!(counter.display_text(), "");
}

#[tokio::test]
async fn test_descendant_toggle_bubbles_to_ancestor_counters() {
    let config = NodeConfig {
        include_children: true,
        show_child_count: true,
        show_search_bar: false,
    };
    let picker = spawn_picker(config);
    picker.first_appear(vec![]);
    picker.settle().await;
    picker.first_appear(vec![1]);
    picker.settle().await;
    picker.first_appear(vec![1, 11]);
    picker.settle().await;

    // Toggling a fruit recomputes both Fruits' and Food's counters.
    picker.toggle_selection(vec![1, 11, 111]);
    picker.settle().await;

    let state = picker.state();
    let food = state.node_at(&[1]).unwrap();
    let fruits = state.node_at(&[1, 11]).unwrap();
    assert_eq!(food.counter.as_ref().unwrap().selected_children_count, 1);
    assert_eq!(fruits.counter.as_ref().unwrap().selected_children_count, 1);
}

#[tokio::test]
async fn test_is_selected_reflects_shared_set() {
    let picker = spawn_picker(NodeConfig::default());
    picker.first_appear(vec![]);
    picker.settle().await;

    picker.toggle_selection(vec![2]);
    picker.settle().await;

    let state = picker.state();
    assert!(state.node_at(&[2]).unwrap().is_selected());
    assert!(!state.node_at(&[1]).unwrap().is_selected());
}

// =============================================================================
// Include-children propagation
// =============================================================================

#[tokio::test]
async fn test_set_include_children_propagates_to_materialized_children() {
    let picker = spawn_picker(NodeConfig::default());
    picker.first_appear(vec![]);
    picker.settle().await;
    picker.first_appear(vec![1]);
    picker.settle().await;

    picker.set_include_children(vec![], true);
    picker.settle().await;

    let state = picker.state();
    assert!(state.include_children);
    assert!(state.node_at(&[1]).unwrap().include_children);
    assert!(state.node_at(&[1, 11]).unwrap().include_children);
    assert!(state.node_at(&[2]).unwrap().include_children);
}

#[tokio::test]
async fn test_children_fetched_later_inherit_current_flag() {
    let picker = spawn_picker(NodeConfig::default());
    picker.first_appear(vec![]);
    picker.settle().await;

    picker.set_include_children(vec![], true);
    picker.settle().await;

    // Fruits materializes after the flag changed; it inherits from Food.
    picker.first_appear(vec![1]);
    picker.settle().await;

    let state = picker.state();
    assert!(state.node_at(&[1, 11]).unwrap().include_children);
}

#[tokio::test]
async fn test_set_include_children_same_value_does_not_propagate() {
    // Reducer-level check for the idempotence guard: when the parent's
    // flag is unchanged, children are not touched.
    let selection = SharedSelection::new();
    let mut root = NodeState::root_with_items(
        0,
        "Categories",
        vec![PickerItem::new(1, "Food", true)],
        NodeConfig::default(),
        selection,
    );
    let effects = root.reduce(NodeAction::SetIncludeChildren(true));
    assert!(effects.is_empty());
    assert!(root.node_at(&[1]).unwrap().include_children);

    // Divergent child state stays divergent on a same-value dispatch.
    root.children[0].include_children = false;
    root.reduce(NodeAction::SetIncludeChildren(true));
    assert!(!root.node_at(&[1]).unwrap().include_children);
}

// =============================================================================
// Counter plumbing
// =============================================================================

#[tokio::test]
async fn test_add_and_remove_selected_recompute_counter() {
    let config = NodeConfig {
        include_children: false,
        show_child_count: true,
        show_search_bar: false,
    };
    let picker = spawn_picker(config);
    picker.first_appear(vec![]);
    picker.settle().await;

    picker.send_at(vec![1], NodeAction::AddSelected(vec![11, 111]));
    picker.settle().await;
    let state = picker.state();
    let counter = state.node_at(&[1]).unwrap().counter.clone().unwrap();
    assert_eq!(counter.selected_children_count, 2);

    picker.send_at(vec![1], NodeAction::RemoveSelected(vec![111]));
    picker.settle().await;
    let state = picker.state();
    let counter = state.node_at(&[1]).unwrap().counter.clone().unwrap();
    assert_eq!(counter.selected_children_count, 1);
}

#[tokio::test]
async fn test_leaf_counter_never_fetches() {
    struct DescendantCounter {
        inner: InMemoryRepository<u32>,
        descendant_calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl NestedItemsRepository<u32> for DescendantCounter {
        async fn children_of(&self, parent: &u32) -> Result<Vec<PickerItem<u32>>, RepositoryError> {
            self.inner.children_of(parent).await
        }
        async fn descendant_ids_of(&self, parent: &u32) -> Vec<u32> {
            self.descendant_calls.fetch_add(1, Ordering::SeqCst);
            self.inner.descendant_ids_of(parent).await
        }
        async fn search(&self, query: &str) -> Result<Vec<PickerItem<u32>>, RepositoryError> {
            self.inner.search(query).await
        }
    }

    let descendant_calls = Arc::new(AtomicUsize::new(0));
    let repo = DescendantCounter {
        inner: universe(),
        descendant_calls: Arc::clone(&descendant_calls),
    };
    let config = NodeConfig {
        include_children: false,
        show_child_count: true,
        show_search_bar: false,
    };
    let root = NodeState::root(0, "Categories", config, SharedSelection::new());
    let picker = PickerStore::spawn(root, Arc::new(repo));
    picker.first_appear(vec![]);
    picker.settle().await;

    // Books has no children; its counter recompute must not hit the
    // repository.
    picker.send_at(vec![2], NodeAction::AddSelected(vec![1]));
    picker.settle().await;
    assert_eq!(descendant_calls.load(Ordering::SeqCst), 0);
}

// =============================================================================
// Routing
// =============================================================================

#[tokio::test]
async fn test_actions_for_vanished_children_are_dropped() {
    let picker = spawn_picker(NodeConfig::default());
    picker.first_appear(vec![]);
    picker.settle().await;

    // Route to a child id that was never materialized.
    picker.toggle_selection(vec![99]);
    picker.settle().await;

    assert!(picker.selection().is_empty());
}
