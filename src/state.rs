//! Engine wiring: one session cache, one event bus, and the controllers,
//! all sharing a single remote API handle.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::cache::CacheStore;
use crate::clients::EstateApi;
use crate::config::Config;
use crate::domain::events::EngineEvent;
use crate::services::{
    DraftStore, FavoritesController, MapViewService, OfferController, ResultList, SearchController,
};

const EVENT_BUS_CAPACITY: usize = 64;

/// The interaction engine. The UI calls the controllers' operations and
/// subscribes to the event bus; nothing here renders or navigates.
pub struct Engine {
    cache: Arc<CacheStore>,
    events: broadcast::Sender<EngineEvent>,
    drafts: Arc<DraftStore>,
    search: SearchController,
    favorites: FavoritesController,
    offer: OfferController,
    map_view: MapViewService,
}

impl Engine {
    #[must_use]
    pub fn new(config: &Config, api: Arc<dyn EstateApi>) -> Self {
        // Session scope: survives screen navigation, dies with the engine.
        let cache = Arc::new(CacheStore::new());
        let (events, _) = broadcast::channel(EVENT_BUS_CAPACITY);

        let drafts = Arc::new(match &config.general.drafts_path {
            Some(path) => DraftStore::open(PathBuf::from(path)),
            None => DraftStore::in_memory(),
        });

        let results = ResultList::default();
        let search = SearchController::new(
            Arc::clone(&api),
            Arc::clone(&cache),
            events.clone(),
            config.search.page_size,
            results.clone(),
        );
        let favorites = FavoritesController::new(
            Arc::clone(&api),
            Arc::clone(&cache),
            events.clone(),
            results,
        );
        let offer = OfferController::new(Arc::clone(&api), events.clone(), Arc::clone(&drafts));
        let map_view = MapViewService::new(api, Arc::clone(&cache));

        Self {
            cache,
            events,
            drafts,
            search,
            favorites,
            offer,
            map_view,
        }
    }

    /// Subscribe to engine events (state changes, progress, notices).
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn search(&self) -> &SearchController {
        &self.search
    }

    #[must_use]
    pub fn favorites(&self) -> &FavoritesController {
        &self.favorites
    }

    #[must_use]
    pub fn offer(&self) -> &OfferController {
        &self.offer
    }

    #[must_use]
    pub fn map_view(&self) -> &MapViewService {
        &self.map_view
    }

    #[must_use]
    pub fn drafts(&self) -> &DraftStore {
        &self.drafts
    }

    /// The session-scoped cache shared by all controllers.
    #[must_use]
    pub fn session_cache(&self) -> &CacheStore {
        &self.cache
    }

    /// A fresh page-scoped cache for one UI context; the caller drops it on
    /// teardown. Same contract as the session cache, shorter life.
    #[must_use]
    pub fn page_cache() -> Arc<CacheStore> {
        Arc::new(CacheStore::new())
    }
}
