//! Search interaction state machine.
//!
//! [`SearchController`] owns the single [`SearchState`] value. Readers take
//! snapshots with [`SearchController::state`] or follow changes through
//! [`SearchController::subscribe`]; only the controller writes.
//!
//! # Overlapping submissions
//!
//! The latest submission wins. Each call to `submit` takes the next sequence
//! number while holding the state channel's write lock, and a fetch result is
//! applied only if its number is still the latest one. A slow response for an
//! earlier name can therefore never overwrite the state of a newer search,
//! including a newer empty-input rejection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::client::PokemonApi;
use crate::error::ErrorKind;
use crate::models::PokemonRecord;

/// Exactly one of the four stages of a search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Loading,
    Success(PokemonRecord),
    Failure { kind: ErrorKind, message: String },
}

impl SearchState {
    pub fn failure(kind: ErrorKind) -> Self {
        SearchState::Failure {
            kind,
            message: kind.message().to_string(),
        }
    }

    /// `true` once a lookup has resolved, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SearchState::Success(_) | SearchState::Failure { .. })
    }

    pub fn record(&self) -> Option<&PokemonRecord> {
        match self {
            SearchState::Success(record) => Some(record),
            _ => None,
        }
    }
}

/// Trim and lower-case a user-supplied name into the API lookup key.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

struct Shared {
    state: watch::Sender<SearchState>,
    // Only read or written inside the `state` lock.
    latest: AtomicU64,
}

impl Shared {
    /// Start a new submission and return its sequence number.
    fn begin(&self, next: SearchState) -> u64 {
        let mut seq = 0;
        self.state.send_modify(|current| {
            seq = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
            *current = next;
        });
        seq
    }

    /// Apply a fetch result if no newer submission has started since `seq`.
    fn complete(&self, seq: u64, next: SearchState) -> bool {
        self.state.send_if_modified(|current| {
            if self.latest.load(Ordering::Acquire) != seq {
                return false;
            }
            *current = next;
            true
        })
    }
}

pub struct SearchController<C> {
    client: Arc<C>,
    shared: Arc<Shared>,
}

impl<C> SearchController<C>
where
    C: PokemonApi + 'static,
{
    pub fn new(client: C) -> Self {
        Self::from_arc(Arc::new(client))
    }

    pub fn from_arc(client: Arc<C>) -> Self {
        let (state, _) = watch::channel(SearchState::Idle);
        Self {
            client,
            shared: Arc::new(Shared {
                state,
                latest: AtomicU64::new(0),
            }),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SearchState {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.shared.state.subscribe()
    }

    /// Sequence number of the most recent submission (0 before the first).
    pub fn latest_sequence(&self) -> u64 {
        let _guard = self.shared.state.borrow();
        self.shared.latest.load(Ordering::Acquire)
    }

    /// Submit a name typed by the user.
    ///
    /// Blank input moves straight to the `EmptyInput` failure and returns
    /// `None` without calling the client. Anything else moves to `Loading`
    /// before returning, and the returned handle resolves once the spawned
    /// lookup has finished (whether or not its result was still current).
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(&self, name: &str) -> Option<JoinHandle<()>> {
        let key = normalize_name(name);
        if key.is_empty() {
            let seq = self
                .shared
                .begin(SearchState::failure(ErrorKind::EmptyInput));
            tracing::debug!(seq, "empty lookup name rejected");
            return None;
        }

        let seq = self.shared.begin(SearchState::Loading);
        tracing::info!(seq, name = %key, "lookup started");

        let client = Arc::clone(&self.client);
        let shared = Arc::clone(&self.shared);
        Some(tokio::spawn(async move {
            let next = match client.fetch(&key).await {
                Ok(record) => SearchState::Success(record),
                Err(err) => {
                    tracing::warn!(seq, name = %key, error = %err, "lookup failed");
                    SearchState::failure(err.kind())
                }
            };
            if shared.complete(seq, next) {
                tracing::debug!(seq, name = %key, "lookup resolved");
            } else {
                tracing::debug!(seq, name = %key, "stale lookup result discarded");
            }
        }))
    }
}
