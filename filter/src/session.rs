use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::time::Duration;

use codestream_async_utils::Debouncer;
use tokio::sync::watch;
use tracing::debug;

use crate::compiler::CompiledQuery;
use crate::compiler::compile;
use crate::config::FilterConfig;
use crate::model::Directory;
use crate::model::WorkItem;
use crate::partition::PartitionedResults;
use crate::partition::evaluate;
use crate::saved::SavedFilter;

/// Everything a search is evaluated against. Callers pre-sort `items` (most recent first in the
/// panel); result buckets keep that order.
#[derive(Debug, Clone, Default)]
pub struct SearchSnapshot {
    pub items: Vec<WorkItem>,
    pub directory: Directory,
    pub current_user_id: String,
    pub current_username: String,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub query: String,
    pub compiled: CompiledQuery,
    pub results: PartitionedResults<WorkItem>,
}

type OutcomeSlot = Option<Arc<SearchOutcome>>;

struct SessionState {
    snapshot: RwLock<Arc<SearchSnapshot>>,
    requested: Mutex<String>,
    outcomes: watch::Sender<OutcomeSlot>,
}

impl SessionState {
    fn run(&self, query: String) {
        let snapshot = Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner));
        let compiled = compile(&query, &snapshot.current_username);
        let results = evaluate(
            &snapshot.items,
            &compiled,
            &snapshot.directory,
            &snapshot.current_user_id,
        )
        .cloned();
        debug!(query = %query, total = results.total(), "publishing search results");
        self.outcomes.send_replace(Some(Arc::new(SearchOutcome {
            query,
            compiled,
            results,
        })));
    }
}

/// A live search box: query edits are debounced and only the latest one is evaluated; results
/// are published to subscribers.
pub struct SearchSession {
    state: Arc<SessionState>,
    debouncer: Debouncer<String>,
    outcomes: watch::Receiver<OutcomeSlot>,
}

impl SearchSession {
    /// Must be called from within a tokio runtime.
    pub fn spawn(snapshot: SearchSnapshot, debounce: Duration) -> Self {
        let (tx, outcomes) = watch::channel(None);
        let state = Arc::new(SessionState {
            snapshot: RwLock::new(Arc::new(snapshot)),
            requested: Mutex::new(String::new()),
            outcomes: tx,
        });
        let worker = Arc::clone(&state);
        let debouncer = Debouncer::spawn(debounce, move |query: String| worker.run(query));
        Self {
            state,
            debouncer,
            outcomes,
        }
    }

    pub fn from_config(snapshot: SearchSnapshot, config: &FilterConfig) -> Self {
        Self::spawn(snapshot, config.debounce())
    }

    /// Records a query edit. Returns `false` after [`SearchSession::shutdown`].
    pub fn set_query(&self, query: impl Into<String>) -> bool {
        let query = query.into();
        *self
            .state
            .requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = query.clone();
        self.debouncer.push(query)
    }

    pub fn apply_saved(&self, filter: &SavedFilter) -> bool {
        self.set_query(filter.q.as_str())
    }

    /// Swaps in fresh items or lookups and re-runs the current query.
    pub fn replace_snapshot(&self, snapshot: SearchSnapshot) -> bool {
        *self
            .state
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
        let query = self
            .state
            .requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        self.debouncer.push(query)
    }

    pub fn query(&self) -> String {
        self.state
            .requested
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<OutcomeSlot> {
        self.outcomes.clone()
    }

    pub fn latest(&self) -> OutcomeSlot {
        self.outcomes.borrow().clone()
    }

    pub fn shutdown(&self) {
        self.debouncer.shutdown();
    }
}
