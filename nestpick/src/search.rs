//! Per-node search state machine.
//!
//! Purely reactive: the reducer owns no timer. The caller observes a quiet
//! period after the last [`SearchAction::QueryChanged`] and then dispatches
//! [`SearchAction::QueryDebounced`] (see [`crate::debounce::SearchDebouncer`]).
//! The owning node translates the returned [`SearchEvent`]s into effects
//! and child replacement.

use crate::error::RepositoryError;
use crate::model::{PickerItem, PickerKey};

/// Search state for one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState<Id> {
    /// Current query text.
    pub query: String,
    /// Results of the last applied search.
    pub results: Vec<PickerItem<Id>>,
    /// Whether a search request is in flight.
    pub is_loading: bool,
}

impl<Id> SearchState<Id> {
    /// Empty search state.
    pub fn new() -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            is_loading: false,
        }
    }
}

/// Intents dispatched to the search subsystem.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchAction<Id> {
    /// The query text changed (one per keystroke; no search is issued yet).
    QueryChanged(String),
    /// The caller observed a quiet period; issue the search now.
    QueryDebounced,
    /// A search request resolved. Carries the originating query so stale
    /// responses for a superseded query are dropped.
    ResultsLoaded {
        /// Query the request was issued for.
        query: String,
        /// Outcome of the request.
        result: Result<Vec<PickerItem<Id>>, RepositoryError>,
    },
    /// Explicit clear (e.g. a clear button).
    ClearQuery,
}

/// What the search reducer asks of its owning node.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent<Id> {
    /// A search request should be started for this query. The node mirrors
    /// this into its own loading flag.
    Started {
        /// Query to search for.
        query: String,
    },
    /// Any in-flight search request should be cancelled.
    Cancel,
    /// The query became empty; the node should restore its original
    /// children.
    Cleared,
    /// The search request failed.
    Failed,
    /// The search request finished (successfully or not); loading is over.
    Finished,
    /// Applied results, ready for the node to materialize as children.
    Results(Vec<PickerItem<Id>>),
}

/// Reduce one search action, mutating `state` and returning the events the
/// owning node must react to, in order.
pub fn reduce<Id: PickerKey>(
    state: &mut SearchState<Id>,
    action: SearchAction<Id>,
) -> Vec<SearchEvent<Id>> {
    match action {
        SearchAction::QueryChanged(query) => {
            if query == state.query {
                return Vec::new();
            }
            state.query = query;
            if state.query.is_empty() {
                state.results.clear();
                state.is_loading = false;
                vec![SearchEvent::Cancel, SearchEvent::Cleared]
            } else {
                Vec::new()
            }
        }
        SearchAction::QueryDebounced => {
            if state.query.is_empty() {
                state.results.clear();
                return vec![SearchEvent::Cancel];
            }
            state.is_loading = true;
            vec![SearchEvent::Started {
                query: state.query.clone(),
            }]
        }
        SearchAction::ResultsLoaded { query, result } => {
            // A response for a query that is no longer current must not
            // clobber state; this also covers "query cleared mid-flight".
            if state.query.is_empty() || state.query != query {
                log::debug!("dropping stale search response for {query:?}");
                return Vec::new();
            }
            state.is_loading = false;
            match result {
                Ok(items) => {
                    state.results = items.clone();
                    vec![SearchEvent::Finished, SearchEvent::Results(items)]
                }
                Err(err) => {
                    log::debug!("search for {query:?} failed: {err}");
                    state.results.clear();
                    vec![SearchEvent::Failed, SearchEvent::Finished]
                }
            }
        }
        SearchAction::ClearQuery => {
            if state.query.is_empty() {
                return Vec::new();
            }
            state.query.clear();
            state.results.clear();
            state.is_loading = false;
            vec![SearchEvent::Cancel, SearchEvent::Cleared]
        }
    }
}
