//! Interaction controllers: pagination, optimistic favorites, uploads,
//! drafts, and the auxiliary map lookup.

pub mod drafts;
pub mod favorites;
pub mod map_view;
pub mod offer;
pub mod search;

pub use drafts::{DraftStore, OFFER_FORM, SEARCH_FORM};
pub use favorites::FavoritesController;
pub use map_view::MapViewService;
pub use offer::{AddOutcome, OfferController, Rejection};
pub use search::SearchController;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

use crate::clients::EstateError;
use crate::domain::PropertyId;
use crate::models::PropertyListing;

/// Failure taxonomy of the engine. Every variant leaves the engine in a
/// consistent, previously valid state.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Local, field-addressable failures; the submit never reached the
    /// network. The map replaces any previous error map atomically.
    #[error("validation failed on {n} field(s)", n = .errors.len())]
    Validation { errors: BTreeMap<&'static str, String> },

    /// Network failure or non-success response; recovered by rollback
    /// (mutations) or by leaving state unchanged for retry.
    #[error("transport error: {0}")]
    Transport(#[from] EstateError),

    /// Upload constraint violation; the offending batch was not admitted.
    #[error("asset rejected: {0}")]
    RejectedAsset(String),

    /// A mutation for this entity is already in flight.
    #[error("favorite toggle for {0} is already in flight")]
    TogglePending(PropertyId),
}

/// Shared, UI-facing view of the active result list.
///
/// The pagination controller owns page splicing; the favorites controller
/// flips `is_favorite` annotations on the same list. Cloning shares the
/// underlying list.
#[derive(Clone, Default)]
pub struct ResultList(Arc<Mutex<Vec<PropertyListing>>>);

impl ResultList {
    fn items(&self) -> MutexGuard<'_, Vec<PropertyListing>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<PropertyListing> {
        self.items().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    #[must_use]
    pub fn find(&self, id: PropertyId) -> Option<PropertyListing> {
        self.items().iter().find(|l| l.id == id).cloned()
    }

    /// Current `is_favorite` annotation, if the listing is on the list.
    #[must_use]
    pub fn favorite_flag(&self, id: PropertyId) -> Option<bool> {
        self.items().iter().find(|l| l.id == id).map(|l| l.is_favorite)
    }

    pub(crate) fn replace(&self, listings: Vec<PropertyListing>) {
        *self.items() = listings;
    }

    pub(crate) fn append(&self, listings: Vec<PropertyListing>) {
        self.items().extend(listings);
    }

    pub(crate) fn clear(&self) {
        self.items().clear();
    }

    /// Sets the annotation and returns the previous value, or `None` if the
    /// listing is not on the list.
    pub(crate) fn set_favorite(&self, id: PropertyId, value: bool) -> Option<bool> {
        self.items().iter_mut().find(|l| l.id == id).map(|l| {
            let previous = l.is_favorite;
            l.is_favorite = value;
            previous
        })
    }
}
