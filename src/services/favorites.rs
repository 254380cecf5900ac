//! Optimistic favorite mutations with rollback.
//!
//! A toggle applies to both materialized views (the active result list and
//! the favorites list) before the network call, guarded by an at-most-one
//! pending mutation per listing. Success invalidates every cached list
//! page, since any of them may carry a now-stale annotation; failure
//! restores both views exactly as snapshotted.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::{EngineError, ResultList};
use crate::cache::{CacheStore, FAVORITES_KEY, is_list_key};
use crate::clients::EstateApi;
use crate::constants;
use crate::domain::PropertyId;
use crate::domain::events::EngineEvent;
use crate::models::PropertyListing;

pub struct FavoritesController {
    api: Arc<dyn EstateApi>,
    cache: Arc<CacheStore>,
    events: broadcast::Sender<EngineEvent>,
    results: ResultList,
    favorites: Mutex<Vec<PropertyListing>>,
    pending: Mutex<HashSet<PropertyId>>,
}

impl FavoritesController {
    pub fn new(
        api: Arc<dyn EstateApi>,
        cache: Arc<CacheStore>,
        events: broadcast::Sender<EngineEvent>,
        results: ResultList,
    ) -> Self {
        Self {
            api,
            cache,
            events,
            results,
            favorites: Mutex::new(Vec::new()),
            pending: Mutex::new(HashSet::new()),
        }
    }

    fn favorites_view(&self) -> MutexGuard<'_, Vec<PropertyListing>> {
        self.favorites.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pending_set(&self) -> MutexGuard<'_, HashSet<PropertyId>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }

    /// Snapshot of the favorites-list view.
    #[must_use]
    pub fn favorites(&self) -> Vec<PropertyListing> {
        self.favorites_view().clone()
    }

    /// Membership in the favorites-list view.
    #[must_use]
    pub fn is_favorite(&self, id: PropertyId) -> bool {
        self.favorites_view().iter().any(|l| l.id == id)
    }

    /// Load the favorites list, served from the session cache when fresh.
    pub async fn load(&self) -> Result<Vec<PropertyListing>, EngineError> {
        if let Some(list) = self.cache.get::<Vec<PropertyListing>>(FAVORITES_KEY) {
            debug!("Serving favorites from cache");
            *self.favorites_view() = list.clone();
            return Ok(list);
        }

        let list = self.api.favorites().await?;
        self.cache
            .set(FAVORITES_KEY, &list, constants::cache::LIST_TTL);
        *self.favorites_view() = list.clone();
        Ok(list)
    }

    /// Toggle a listing's favorite state optimistically.
    ///
    /// Rejected without any state change while a toggle for the same
    /// listing is still in flight. On transport failure both views are
    /// restored to their snapshots and the error is surfaced as a notice.
    pub async fn toggle_favorite(
        &self,
        id: PropertyId,
        desired: bool,
    ) -> Result<(), EngineError> {
        if !self.pending_set().insert(id) {
            debug!("Rejecting toggle for {id}: already pending");
            return Err(EngineError::TogglePending(id));
        }

        // Snapshots taken before the optimistic write; restored verbatim on
        // failure.
        let favorites_snapshot = self.favorites_view().clone();
        let flag_snapshot = self.results.set_favorite(id, desired);

        {
            let mut favorites = self.favorites_view();
            if desired {
                if !favorites.iter().any(|l| l.id == id)
                    && let Some(mut listing) = self.results.find(id)
                {
                    listing.is_favorite = true;
                    favorites.push(listing);
                }
            } else {
                favorites.retain(|l| l.id != id);
            }
        }

        let outcome = if desired {
            self.api.add_favorite(id).await
        } else {
            self.api.remove_favorite(id).await
        };

        match outcome {
            Ok(()) => {
                // Any cached page may reference this listing; targeted
                // patching would cost a cache-wide scan anyway, so drop all
                // list-shaped entries and let the TTL bound staleness.
                let dropped = self.cache.invalidate(is_list_key);
                debug!("Favorite commit invalidated {dropped} cached list entries");
                self.pending_set().remove(&id);
                info!("Favorite {} -> {desired}", id);
                self.emit(EngineEvent::FavoriteCommitted { id, favorite: desired });
                Ok(())
            }
            Err(e) => {
                *self.favorites_view() = favorites_snapshot;
                if let Some(previous) = flag_snapshot {
                    self.results.set_favorite(id, previous);
                }
                self.pending_set().remove(&id);
                self.emit(EngineEvent::FavoriteRolledBack { id });
                self.emit(EngineEvent::Notice {
                    message: "Could not update favorites, try again".to_string(),
                });
                Err(e.into())
            }
        }
    }
}
