//! The persona discovery deck.
//!
//! Feeds the selection surface one persona card at a time from the
//! cursor-paginated catalog, keeping a lookahead buffer topped up and
//! joining per-persona enrichment (portrait, description) in as it lands.
//!
//! All deck state lives behind one async mutex; suspension points (the
//! actual fetches) never hold the lock, so mutations are serialized without
//! blocking consumption on slow network calls.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use cameo_core::persona::{Enrichment, PersonaCatalog, PersonaSummary};
use tokio::sync::Mutex;

/// Minimum number of unconsumed personas the deck keeps buffered while
/// more pages exist. A tunable default, not a contract.
pub const DEFAULT_LOOKAHEAD: usize = 3;

/// Pagination position of the deck.
#[derive(Debug, Default)]
struct PaginationState {
    /// Continuation token for the next page. `None` before the first fetch.
    cursor: Option<String>,
    /// Latched once the backend omits the continuation token.
    exhausted: bool,
    /// True while a page fetch is outstanding. Re-entrant replenishment
    /// calls observe this and back off instead of double-fetching.
    in_flight: bool,
}

#[derive(Default)]
struct DeckState {
    /// Personas in backend arrival order. Append-only; consumption moves
    /// `current_index` instead of removing items.
    buffer: Vec<PersonaSummary>,
    /// Index of the next unconsumed persona. Non-decreasing, never past
    /// `buffer.len()`.
    current_index: usize,
    pagination: PaginationState,
    /// Enrichment entries keyed by persona id. Grows for the lifetime of
    /// the deck, never evicted.
    enrichment: HashMap<String, Enrichment>,
    /// Ids with enrichment fetches outstanding.
    pending: HashSet<String>,
    /// Set by `close()`; stale completions check this and discard.
    closed: bool,
}

/// The discovery deck: lookahead buffer plus enrichment joiner over a
/// persona catalog.
///
/// Cheap to clone; clones share state. One deck instance owns one
/// selection lifetime — `close()` it when the user picks a persona and
/// build a fresh one if browsing restarts.
#[derive(Clone)]
pub struct DiscoveryDeck {
    catalog: Arc<dyn PersonaCatalog>,
    lookahead: usize,
    state: Arc<Mutex<DeckState>>,
}

impl DiscoveryDeck {
    /// Creates a deck over the given catalog with the default lookahead.
    pub fn new(catalog: Arc<dyn PersonaCatalog>) -> Self {
        Self {
            catalog,
            lookahead: DEFAULT_LOOKAHEAD,
            state: Arc::new(Mutex::new(DeckState::default())),
        }
    }

    /// Overrides the lookahead depth. Values below 1 are clamped to 1.
    pub fn with_lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead.max(1);
        self
    }

    /// Tops the buffer up to the lookahead depth if pages remain.
    ///
    /// At most one page fetch runs at a time: a call that observes an
    /// outstanding fetch is a no-op, as is a call finding the buffer
    /// already deep enough or the feed exhausted. On fetch failure the
    /// deck state is left unchanged (cursor included) so the next trigger
    /// retries the same gap.
    pub async fn ensure_lookahead(&self) {
        let (cursor, gap) = {
            let mut state = self.state.lock().await;
            if state.closed || state.pagination.exhausted || state.pagination.in_flight {
                return;
            }
            let remaining = state.buffer.len() - state.current_index;
            if remaining >= self.lookahead {
                return;
            }
            state.pagination.in_flight = true;
            (
                state.pagination.cursor.clone(),
                (self.lookahead - remaining) as u32,
            )
        };

        let result = self.catalog.fetch_page(cursor.as_deref(), gap).await;

        let appended_ids = {
            let mut state = self.state.lock().await;
            state.pagination.in_flight = false;
            if state.closed {
                return;
            }
            match result {
                Ok(page) => {
                    if page.next_cursor.is_none() {
                        state.pagination.exhausted = true;
                        tracing::debug!("Persona feed exhausted");
                    } else {
                        state.pagination.cursor = page.next_cursor;
                    }
                    let ids: Vec<String> = page.items.iter().map(|p| p.id.clone()).collect();
                    state.buffer.extend(page.items);
                    ids
                }
                Err(err) => {
                    // Degrade: the buffer may run dry, the next consumption
                    // re-attempts with the same cursor.
                    tracing::warn!("Persona page fetch failed: {}", err);
                    return;
                }
            }
        };

        for id in &appended_ids {
            self.enrich(id).await;
        }
    }

    /// Starts image and description fetches for one persona.
    ///
    /// Idempotent: an id already pending or already enriched is a no-op.
    /// The membership check and the pending insert happen under a single
    /// lock acquisition, so concurrent calls for the same id dispatch
    /// exactly one pair of fetches. Each fetch that fails records its
    /// field as unavailable rather than failing the entry.
    pub async fn enrich(&self, id: &str) {
        {
            let mut state = self.state.lock().await;
            if state.closed || state.pending.contains(id) || state.enrichment.contains_key(id) {
                return;
            }
            state.pending.insert(id.to_string());
        }

        let deck = self.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            let (image, description) = tokio::join!(
                deck.catalog.fetch_image(&id),
                deck.catalog.fetch_description(&id),
            );

            let entry = Enrichment {
                image: match image {
                    Ok(image) => Some(image),
                    Err(err) => {
                        tracing::debug!("Portrait unavailable for persona {}: {}", id, err);
                        None
                    }
                },
                description: match description {
                    Ok(description) => Some(description),
                    Err(err) => {
                        tracing::debug!("Description unavailable for persona {}: {}", id, err);
                        None
                    }
                },
            };

            let mut state = deck.state.lock().await;
            state.pending.remove(&id);
            if state.closed {
                // The selection lifetime ended while the fetches were in
                // flight; nobody is listening for this entry.
                return;
            }
            state.enrichment.insert(id, entry);
        });
    }

    /// The persona under the cursor, if any.
    ///
    /// `None` with [`is_exhausted`](Self::is_exhausted) false means the
    /// buffer is still filling (or the last fetch failed); `None` with it
    /// true means the feed is drained.
    pub async fn current(&self) -> Option<PersonaSummary> {
        let state = self.state.lock().await;
        state.buffer.get(state.current_index).cloned()
    }

    /// The persona after the current one, for pre-rendering the next card.
    pub async fn peek_next(&self) -> Option<PersonaSummary> {
        let state = self.state.lock().await;
        state.buffer.get(state.current_index + 1).cloned()
    }

    /// Consumes the current persona and triggers replenishment.
    ///
    /// The replenishment runs fire-and-forget so the caller's transition is
    /// never blocked on the network. Advancing an empty deck consumes
    /// nothing but still re-attempts replenishment — that is the retry path
    /// after a failed fetch.
    pub async fn advance(&self) {
        {
            let mut state = self.state.lock().await;
            if state.closed {
                return;
            }
            if state.current_index < state.buffer.len() {
                state.current_index += 1;
            }
        }

        let deck = self.clone();
        tokio::spawn(async move {
            deck.ensure_lookahead().await;
        });
    }

    /// Enrichment entry for a persona, once both its fetches have settled.
    pub async fn enrichment_of(&self, id: &str) -> Option<Enrichment> {
        let state = self.state.lock().await;
        state.enrichment.get(id).cloned()
    }

    /// True once the backend has signalled the end of the feed.
    pub async fn is_exhausted(&self) -> bool {
        let state = self.state.lock().await;
        state.pagination.exhausted
    }

    /// Ends this deck's selection lifetime.
    ///
    /// In-flight fetches are not cancelled; their completions observe the
    /// closed flag and discard their results. Reads stay valid.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        state.closed = true;
    }
}
