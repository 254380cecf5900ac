//! Incremental search pagination over the TTL cache.
//!
//! `start_search` always hits the network for offset 0 so a fresh submit
//! reflects current remote state; `load_more` serves repeat pages from the
//! session cache when fresh. Responses are cached under the composite
//! `(query identity, offset)` key either way. A generation counter makes a
//! superseded query's late response cache-only: it is stored for reuse but
//! never spliced into the list the UI is looking at.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::{EngineError, ResultList};
use crate::cache::{CacheStore, search_page_key};
use crate::clients::EstateApi;
use crate::constants;
use crate::domain::events::EngineEvent;
use crate::models::{SearchPage, SearchQuery};

#[derive(Default)]
struct SearchState {
    query: Option<SearchQuery>,
    identity: String,
    generation: u64,
    offset: u32,
    total: u32,
    in_flight: bool,
}

pub struct SearchController {
    api: Arc<dyn EstateApi>,
    cache: Arc<CacheStore>,
    events: broadcast::Sender<EngineEvent>,
    page_size: u32,
    results: ResultList,
    state: Mutex<SearchState>,
}

impl SearchController {
    pub fn new(
        api: Arc<dyn EstateApi>,
        cache: Arc<CacheStore>,
        events: broadcast::Sender<EngineEvent>,
        page_size: u32,
        results: ResultList,
    ) -> Self {
        Self {
            api,
            cache,
            events,
            page_size,
            results,
            state: Mutex::new(SearchState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Shared handle to the active result list (the favorites controller
    /// flips annotations on the same list).
    #[must_use]
    pub fn results(&self) -> ResultList {
        self.results.clone()
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.state().total
    }

    #[must_use]
    pub fn offset(&self) -> u32 {
        self.state().offset
    }

    /// True once every remote result for the current query has been loaded.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        let state = self.state();
        state.query.is_some() && state.offset >= state.total
    }

    fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }

    /// Reset accumulated state and fetch the first page, bypassing cache
    /// reads. The response is cached under `(identity, 0)` for later reuse.
    pub async fn start_search(&self, query: SearchQuery) -> Result<(), EngineError> {
        let identity = query.cache_identity();
        let generation = {
            let mut state = self.state();
            state.generation += 1;
            state.query = Some(query.clone());
            state.identity = identity.clone();
            state.offset = 0;
            state.total = 0;
            state.in_flight = true;
            state.generation
        };
        self.results.clear();
        self.emit(EngineEvent::SearchStarted);
        info!("Searching listings ({identity})");

        let outcome = self.api.search(&query, 0, self.page_size).await;
        self.settle(generation, &identity, 0, outcome, true)
    }

    /// Fetch or splice the next page. A no-op while a fetch is in flight or
    /// once the list is exhausted; a cached fresh page is spliced without a
    /// network call.
    pub async fn load_more(&self) -> Result<bool, EngineError> {
        let (query, identity, generation, offset) = {
            let mut state = self.state();
            if state.in_flight || state.offset >= state.total {
                return Ok(false);
            }
            let Some(query) = state.query.clone() else {
                return Ok(false);
            };

            let key = search_page_key(&state.identity, state.offset);
            if let Some(page) = self.cache.get::<SearchPage>(&key) {
                debug!("Serving page at offset {} from cache", state.offset);
                Self::splice(&mut state, &self.results, &page);
                let event = EngineEvent::PageLoaded {
                    appended: page.results.len(),
                    loaded: self.results.len(),
                    total: state.total,
                };
                drop(state);
                self.emit(event);
                return Ok(true);
            }

            state.in_flight = true;
            (
                query,
                state.identity.clone(),
                state.generation,
                state.offset,
            )
        };

        let outcome = self.api.search(&query, offset, self.page_size).await;
        self.settle(generation, &identity, offset, outcome, false)?;
        Ok(true)
    }

    /// Register the current query for saved-search notifications.
    pub async fn register_saved_search(&self) -> Result<bool, EngineError> {
        let Some(query) = self.state().query.clone() else {
            return Ok(false);
        };
        match self.api.save_search(&query).await {
            Ok(()) => {
                self.emit(EngineEvent::SavedSearchRegistered);
                Ok(true)
            }
            Err(e) => {
                self.emit(EngineEvent::Notice {
                    message: "Could not save this search".to_string(),
                });
                Err(e.into())
            }
        }
    }

    fn splice(state: &mut SearchState, results: &ResultList, page: &SearchPage) {
        state.total = page.total;
        state.offset += page.results.len() as u32;
        results.append(page.results.clone());
    }

    /// Reconcile a settled fetch. Successful responses are always cached;
    /// they are spliced only when the generation still matches. A failure
    /// leaves results and offset untouched so the next call retries.
    fn settle(
        &self,
        generation: u64,
        identity: &str,
        offset: u32,
        outcome: Result<SearchPage, crate::clients::EstateError>,
        replace: bool,
    ) -> Result<(), EngineError> {
        match outcome {
            Ok(page) => {
                self.cache.set(
                    &search_page_key(identity, offset),
                    &page,
                    constants::cache::LIST_TTL,
                );

                let mut state = self.state();
                if state.generation != generation {
                    debug!("Discarding response for a superseded query");
                    return Ok(());
                }
                state.in_flight = false;
                if replace {
                    self.results.clear();
                }
                Self::splice(&mut state, &self.results, &page);
                let event = EngineEvent::PageLoaded {
                    appended: page.results.len(),
                    loaded: self.results.len(),
                    total: state.total,
                };
                drop(state);
                self.emit(event);
                Ok(())
            }
            Err(e) => {
                let mut state = self.state();
                if state.generation == generation {
                    state.in_flight = false;
                }
                drop(state);
                self.emit(EngineEvent::Notice {
                    message: "Could not load results, try again".to_string(),
                });
                Err(e.into())
            }
        }
    }
}
