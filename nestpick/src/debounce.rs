//! Caller-side search debounce.
//!
//! The search reducer owns no timer, so it stays testable with synchronous
//! dispatch; whoever feeds it keystrokes is responsible
//! for signalling the quiet period. [`SearchDebouncer`] is that caller-side
//! piece: it forwards every edit immediately and schedules the debounced
//! signal on a timer task, restarting the timer on each new edit.

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::effect::NodePath;
use crate::model::PickerKey;
use crate::store::PickerHandle;

/// Default quiet period, matching the reference picker UI.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Debounces search input for one node.
pub struct SearchDebouncer<Id> {
    handle: PickerHandle<Id>,
    path: NodePath<Id>,
    quiet_period: Duration,
    timer: Option<JoinHandle<()>>,
}

impl<Id: PickerKey> SearchDebouncer<Id> {
    /// Create a debouncer for the node at `path` with the default quiet
    /// period.
    pub fn new(handle: PickerHandle<Id>, path: NodePath<Id>) -> Self {
        Self::with_quiet_period(handle, path, DEFAULT_DEBOUNCE)
    }

    /// Create a debouncer with a custom quiet period.
    pub fn with_quiet_period(
        handle: PickerHandle<Id>,
        path: NodePath<Id>,
        quiet_period: Duration,
    ) -> Self {
        Self {
            handle,
            path,
            quiet_period,
            timer: None,
        }
    }

    /// Feed one edit of the query text.
    ///
    /// The edit is dispatched immediately; the debounced signal follows
    /// after the quiet period unless another edit arrives first.
    pub fn input(&mut self, query: impl Into<String>) {
        let query = query.into();
        self.handle.query_changed(self.path.clone(), query);

        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        let handle = self.handle.clone();
        let path = self.path.clone();
        let quiet_period = self.quiet_period;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            handle.query_debounced(path);
        }));
    }

    /// Clear the query, dropping any scheduled debounce signal.
    pub fn clear(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.handle.clear_query(self.path.clone());
    }
}

impl<Id> Drop for SearchDebouncer<Id> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
