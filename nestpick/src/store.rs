//! The picker store: a serialized reducer loop plus effect interpreter.
//!
//! All state mutation for a tree happens on one spawned task that drains an
//! action channel in submission order. Effects emitted by the reducer run
//! on their own tasks and rejoin the loop by sending follow-up actions into
//! the same channel; that re-entry is the only suspension point in the
//! model.
//!
//! Search and counter fetches are identified by a per-node logical slot;
//! interpreting a new request for a slot cancels the outstanding one, so a
//! superseded response can never arrive after its successor's.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::mpsc::{UnboundedSender, WeakUnboundedSender, unbounded_channel};
use tokio::sync::{Notify, watch};
use tokio_util::sync::CancellationToken;

use crate::count::CountAction;
use crate::effect::{Effect, NodePath, at_path};
use crate::model::PickerKey;
use crate::node::{NodeAction, NodeState};
use crate::repository::NestedItemsRepository;
use crate::search::SearchAction;
use crate::selection::SharedSelection;

// =============================================================================
// Quiescence tracking
// =============================================================================

/// Counters for outstanding work, shared between handle, loop, and effect
/// tasks. The store is idle when both are zero.
#[derive(Debug, Default)]
struct Gauges {
    /// Actions sent but not yet reduced.
    pending: AtomicUsize,
    /// Effect tasks spawned but not yet finished.
    in_flight: AtomicUsize,
    notify: Notify,
}

impl Gauges {
    fn idle(&self) -> bool {
        self.pending.load(Ordering::SeqCst) == 0 && self.in_flight.load(Ordering::SeqCst) == 0
    }
}

// =============================================================================
// PickerStore
// =============================================================================

/// Cancellation slots per node. One logical request of each kind may be in
/// flight per node at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
    Search,
    Count,
}

/// Factory for picker reducer loops.
pub struct PickerStore;

impl PickerStore {
    /// Spawn the reducer loop for `root` and return a handle to it.
    ///
    /// The loop runs until every [`PickerHandle`] clone is dropped and all
    /// in-flight effects have drained.
    pub fn spawn<Id, R>(root: NodeState<Id>, repository: Arc<R>) -> PickerHandle<Id>
    where
        Id: PickerKey,
        R: NestedItemsRepository<Id> + 'static,
    {
        let repository: Arc<dyn NestedItemsRepository<Id>> = repository;
        let (tx, mut rx) = unbounded_channel::<NodeAction<Id>>();
        let (state_tx, state_rx) = watch::channel(root.clone());
        let gauges = Arc::new(Gauges::default());
        let selection = root.selection().clone();

        let handle = PickerHandle {
            tx: tx.clone(),
            state_rx,
            gauges: Arc::clone(&gauges),
            selection,
        };

        // The loop must not keep its own channel alive: it only upgrades
        // the weak sender while spawning an effect, so dropping every
        // handle shuts the loop down once effects drain.
        let weak_tx = tx.downgrade();
        drop(tx);

        let loop_gauges = gauges;
        tokio::spawn(async move {
            let mut state = root;
            let mut slots: HashMap<(NodePath<Id>, Slot), CancellationToken> = HashMap::new();
            while let Some(action) = rx.recv().await {
                log::debug!("reducing action: {action:?}");
                let effects = state.reduce(action);
                for effect in effects {
                    run_effect(
                        effect,
                        &repository,
                        &weak_tx,
                        &loop_gauges,
                        &mut slots,
                    );
                }
                loop_gauges.pending.fetch_sub(1, Ordering::SeqCst);
                let _ = state_tx.send(state.clone());
                loop_gauges.notify.notify_waiters();
            }
            log::debug!("picker loop for {:?} shut down", state.id);
        });

        handle
    }
}

/// Interpret one effect. Spawns a task for async work; synchronous effects
/// (cancellation) are handled inline on the loop.
fn run_effect<Id: PickerKey>(
    effect: Effect<Id>,
    repository: &Arc<dyn NestedItemsRepository<Id>>,
    weak_tx: &WeakUnboundedSender<NodeAction<Id>>,
    gauges: &Arc<Gauges>,
    slots: &mut HashMap<(NodePath<Id>, Slot), CancellationToken>,
) {
    if let Effect::CancelSearch { path } = &effect {
        if let Some(token) = slots.remove(&(path.clone(), Slot::Search)) {
            token.cancel();
        }
        return;
    }

    // Every other effect hits the repository on its own task.
    let Some(tx) = weak_tx.upgrade() else {
        // All handles gone; nobody can observe the outcome.
        return;
    };
    let sender = EffectSender {
        tx,
        gauges: Arc::clone(gauges),
    };
    gauges.in_flight.fetch_add(1, Ordering::SeqCst);
    let repository = Arc::clone(repository);

    match effect {
        Effect::LoadChildren { path, parent } => {
            tokio::spawn(async move {
                let result = repository.children_of(&parent).await;
                sender.send(at_path(path, NodeAction::SetItems(result)));
                sender.finish();
            });
        }
        Effect::LoadDescendants {
            path,
            parent,
            select,
        } => {
            tokio::spawn(async move {
                let ids = repository.descendant_ids_of(&parent).await;
                let action = if select {
                    NodeAction::AddSelected(ids)
                } else {
                    NodeAction::RemoveSelected(ids)
                };
                sender.send(at_path(path, action));
                sender.finish();
            });
        }
        Effect::CountDescendants { path, parent } => {
            let token = supersede(slots, (path.clone(), Slot::Count));
            tokio::spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => {}
                    ids = repository.descendant_ids_of(&parent) => {
                        sender.send(at_path(
                            path,
                            NodeAction::Count(CountAction::CountLoaded(ids)),
                        ));
                    }
                }
                sender.finish();
            });
        }
        Effect::StartSearch { path, query } => {
            let token = supersede(slots, (path.clone(), Slot::Search));
            tokio::spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => {}
                    result = repository.search(&query) => {
                        sender.send(at_path(
                            path,
                            NodeAction::Search(SearchAction::ResultsLoaded { query, result }),
                        ));
                    }
                }
                sender.finish();
            });
        }
        Effect::CancelSearch { .. } => unreachable!("handled above"),
    }
}

/// Install a fresh cancellation token for a slot, cancelling whatever was
/// there before.
fn supersede<Id: PickerKey>(
    slots: &mut HashMap<(NodePath<Id>, Slot), CancellationToken>,
    key: (NodePath<Id>, Slot),
) -> CancellationToken {
    let token = CancellationToken::new();
    if let Some(previous) = slots.insert(key, token.clone()) {
        previous.cancel();
    }
    token
}

/// Sender used by effect tasks to rejoin the reducer loop.
struct EffectSender<Id> {
    tx: UnboundedSender<NodeAction<Id>>,
    gauges: Arc<Gauges>,
}

impl<Id: PickerKey> EffectSender<Id> {
    fn send(&self, action: NodeAction<Id>) {
        self.gauges.pending.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(action).is_err() {
            self.gauges.pending.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Mark the effect as done. Called after any follow-up has been
    /// enqueued, so quiescence can never be observed between the two.
    fn finish(&self) {
        self.gauges.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.gauges.notify.notify_waiters();
    }
}

// =============================================================================
// PickerHandle
// =============================================================================

/// Handle to a running picker store.
///
/// Cheap to clone. Dropping the last clone shuts the store down once
/// in-flight effects drain.
pub struct PickerHandle<Id> {
    tx: UnboundedSender<NodeAction<Id>>,
    state_rx: watch::Receiver<NodeState<Id>>,
    gauges: Arc<Gauges>,
    selection: SharedSelection<Id>,
}

impl<Id: PickerKey> PickerHandle<Id> {
    /// Dispatch an action to the root node.
    pub fn send(&self, action: NodeAction<Id>) {
        self.gauges.pending.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(action).is_err() {
            self.gauges.pending.fetch_sub(1, Ordering::SeqCst);
            log::warn!("picker store has shut down; action dropped");
        }
    }

    /// Dispatch an action to the node at `path`.
    pub fn send_at(&self, path: NodePath<Id>, action: NodeAction<Id>) {
        self.send(at_path(path, action));
    }

    /// Snapshot of the current tree state.
    pub fn state(&self) -> NodeState<Id> {
        self.state_rx.borrow().clone()
    }

    /// Subscribe to state snapshots, one per reduced action.
    pub fn subscribe(&self) -> watch::Receiver<NodeState<Id>> {
        self.state_rx.clone()
    }

    /// The shared selection set of this picker session.
    pub fn selection(&self) -> &SharedSelection<Id> {
        &self.selection
    }

    /// Wait until the store is quiescent: no queued actions and no
    /// in-flight effects.
    ///
    /// Note this never returns while a repository call hangs; the store
    /// imposes no timeout on the capability.
    pub async fn settle(&self) {
        loop {
            let notified = self.gauges.notify.notified();
            if self.gauges.idle() {
                return;
            }
            notified.await;
        }
    }

    // Dispatch sugar for the common intents.

    /// Notify the node at `path` that it appeared for the first time.
    pub fn first_appear(&self, path: NodePath<Id>) {
        self.send_at(path, NodeAction::FirstAppear);
    }

    /// Toggle selection of the node at `path`.
    pub fn toggle_selection(&self, path: NodePath<Id>) {
        self.send_at(path, NodeAction::ToggleSelection);
    }

    /// Set the include-children flag on the subtree at `path`.
    pub fn set_include_children(&self, path: NodePath<Id>, enabled: bool) {
        self.send_at(path, NodeAction::SetIncludeChildren(enabled));
    }

    /// Report a search-query edit on the node at `path`.
    pub fn query_changed(&self, path: NodePath<Id>, query: impl Into<String>) {
        self.send_at(path, NodeAction::Search(SearchAction::QueryChanged(query.into())));
    }

    /// Report that the search query at `path` has been stable for the
    /// debounce interval.
    pub fn query_debounced(&self, path: NodePath<Id>) {
        self.send_at(path, NodeAction::Search(SearchAction::QueryDebounced));
    }

    /// Clear the search query on the node at `path`.
    pub fn clear_query(&self, path: NodePath<Id>) {
        self.send_at(path, NodeAction::Search(SearchAction::ClearQuery));
    }
}

impl<Id> Clone for PickerHandle<Id> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            state_rx: self.state_rx.clone(),
            gauges: Arc::clone(&self.gauges),
            selection: self.selection.clone(),
        }
    }
}
