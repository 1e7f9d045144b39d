//! Category picker demo on an in-memory item universe.
//!
//! Drives the store the way a UI would: appear, drill into a category,
//! toggle selections with include-children enabled, then search and clear.
//! Run with `cargo run -p nestpick --example category_picker`.

use std::sync::Arc;
use std::time::Duration;

use nestpick::prelude::*;
use simplelog::{Config, LevelFilter, SimpleLogger};

const ROOT: &str = "root";

fn fixture() -> InMemoryRepository<String> {
    let item = |id: &str, name: &str, has_children| PickerItem::new(id.to_string(), name, has_children);
    InMemoryRepository::new()
        .with_children(
            ROOT.to_string(),
            [
                item("1", "Food", true),
                item("2", "Technology", true),
                item("3", "Sports", true),
                item("4", "Books", false),
            ],
        )
        .with_children(
            "1".to_string(),
            [
                item("11", "Fruits", true),
                item("12", "Vegetables", true),
                item("13", "Grains", false),
                item("14", "Proteins", false),
            ],
        )
        .with_children(
            "11".to_string(),
            [
                item("111", "Apples", false),
                item("112", "Bananas", false),
                item("113", "Oranges", false),
            ],
        )
        .with_children(
            "12".to_string(),
            [
                item("121", "Leafy Greens", false),
                item("122", "Root Vegetables", false),
            ],
        )
        .with_children(
            "2".to_string(),
            [
                item("21", "Computers", true),
                item("22", "Phones", true),
                item("23", "Wearables", false),
            ],
        )
        .with_children(
            "21".to_string(),
            [
                item("211", "Laptops", false),
                item("212", "Desktops", false),
            ],
        )
        .with_children(
            "22".to_string(),
            [item("221", "Smartphones", false)],
        )
        .with_children(
            "3".to_string(),
            [
                item("31", "Team Sports", false),
                item("32", "Individual Sports", false),
            ],
        )
        .with_latency(Duration::from_millis(50))
}

fn print_tree(node: &NodeState<String>, depth: usize) {
    let marker = if node.is_selected() { "[x]" } else { "[ ]" };
    let count = node
        .counter
        .as_ref()
        .map(|c| c.display_text())
        .unwrap_or_default();
    println!("{:indent$}{marker} {} {count}", "", node.title, indent = depth * 2);
    for child in &node.children {
        print_tree(child, depth + 1);
    }
}

#[tokio::main]
async fn main() {
    SimpleLogger::init(LevelFilter::Debug, Config::default()).expect("failed to init logger");

    let repository = Arc::new(fixture());
    let selection = SharedSelection::new();
    let config = NodeConfig {
        include_children: true,
        show_child_count: true,
        show_search_bar: true,
    };
    let root = NodeState::root(ROOT.to_string(), "Categories", config, selection);
    let picker = PickerStore::spawn(root, repository);

    // Appear: root fetches its top-level categories.
    picker.first_appear(vec![]);
    picker.settle().await;

    // Drill into Food, then select it with all its descendants.
    picker.first_appear(vec!["1".into()]);
    picker.settle().await;
    picker.toggle_selection(vec!["1".into()]);
    picker.settle().await;

    println!("\nAfter selecting Food (with children):");
    print_tree(&picker.state(), 0);
    println!("selected ids: {}", picker.selection().len());

    // Deselect one fruit; Food's counter recomputes via bubbling.
    picker.first_appear(vec!["1".into(), "11".into()]);
    picker.settle().await;
    picker.toggle_selection(vec!["1".into(), "11".into(), "112".into()]);
    picker.settle().await;

    println!("\nAfter deselecting Bananas:");
    print_tree(&picker.state(), 0);

    // Search at the root, then clear to restore the original children.
    let mut debouncer = SearchDebouncer::new(picker.clone(), vec![]);
    debouncer.input("sports");
    tokio::time::sleep(Duration::from_millis(400)).await;
    picker.settle().await;

    println!("\nSearch results for \"sports\":");
    print_tree(&picker.state(), 0);

    debouncer.input("");
    picker.settle().await;

    println!("\nAfter clearing the search:");
    print_tree(&picker.state(), 0);
}
