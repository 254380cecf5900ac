//! Auxiliary map-oriented listing lookup, cached like any other
//! non-paginated list resource.

use std::sync::Arc;
use tracing::debug;

use super::EngineError;
use crate::cache::{CacheStore, MAP_PINS_KEY};
use crate::clients::EstateApi;
use crate::constants;
use crate::models::MapPin;

pub struct MapViewService {
    api: Arc<dyn EstateApi>,
    cache: Arc<CacheStore>,
}

impl MapViewService {
    pub fn new(api: Arc<dyn EstateApi>, cache: Arc<CacheStore>) -> Self {
        Self { api, cache }
    }

    pub async fn pins(&self) -> Result<Vec<MapPin>, EngineError> {
        if let Some(pins) = self.cache.get::<Vec<MapPin>>(MAP_PINS_KEY) {
            debug!("Serving map pins from cache");
            return Ok(pins);
        }

        let pins = self.api.map_pins().await?;
        self.cache
            .set(MAP_PINS_KEY, &pins, constants::cache::LIST_TTL);
        Ok(pins)
    }
}
