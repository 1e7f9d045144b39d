//! Map-backed in-memory repository, for demos and tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::RepositoryError;
use crate::model::{PickerItem, PickerKey};
use crate::repository::NestedItemsRepository;

/// An in-memory item universe keyed by parent id.
///
/// Parents with no entry have no children. Search matches display names
/// case-insensitively across all items. Optional artificial latency makes
/// loading states visible in demos.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository<Id> {
    children: HashMap<Id, Vec<PickerItem<Id>>>,
    latency: Option<Duration>,
}

impl<Id: PickerKey> InMemoryRepository<Id> {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self {
            children: HashMap::new(),
            latency: None,
        }
    }

    /// Register the children of a parent id.
    pub fn with_children(
        mut self,
        parent: Id,
        items: impl IntoIterator<Item = PickerItem<Id>>,
    ) -> Self {
        self.children.insert(parent, items.into_iter().collect());
        self
    }

    /// Delay every operation by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn collect_descendants(&self, parent: &Id, out: &mut Vec<Id>) {
        let Some(children) = self.children.get(parent) else {
            return;
        };
        for child in children {
            out.push(child.id.clone());
            if child.has_children {
                self.collect_descendants(&child.id, out);
            }
        }
    }
}

#[async_trait]
impl<Id: PickerKey> NestedItemsRepository<Id> for InMemoryRepository<Id> {
    async fn children_of(&self, parent: &Id) -> Result<Vec<PickerItem<Id>>, RepositoryError> {
        self.simulate_latency().await;
        Ok(self.children.get(parent).cloned().unwrap_or_default())
    }

    async fn descendant_ids_of(&self, parent: &Id) -> Vec<Id> {
        self.simulate_latency().await;
        let mut ids = Vec::new();
        self.collect_descendants(parent, &mut ids);
        ids
    }

    async fn search(&self, query: &str) -> Result<Vec<PickerItem<Id>>, RepositoryError> {
        self.simulate_latency().await;
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let needle = query.to_lowercase();
        let mut results: Vec<PickerItem<Id>> = self
            .children
            .values()
            .flatten()
            .filter(|item| item.display_name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        // Children maps are unordered; keep results deterministic.
        results.sort_by(|a, b| a.id.cmp(&b.id));
        results.dedup_by(|a, b| a.id == b.id);
        Ok(results)
    }
}
