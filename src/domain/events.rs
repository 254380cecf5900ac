//! Engine events for UI subscribers.
//!
//! The engine never calls back into the UI; instead every state change that
//! a screen might care about is broadcast as one of these events.

use serde::Serialize;

use super::PropertyId;

/// Events emitted on the engine's broadcast bus.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum EngineEvent {
    SearchStarted,
    PageLoaded {
        appended: usize,
        loaded: usize,
        total: u32,
    },

    FavoriteCommitted {
        id: PropertyId,
        favorite: bool,
    },
    FavoriteRolledBack {
        id: PropertyId,
    },

    UploadProgress {
        percent: u8,
    },
    OfferSubmitted,

    SavedSearchRegistered,

    /// Transient, auto-dismissing message (validation and transport recoveries).
    Notice {
        message: String,
    },
    Error {
        message: String,
    },
}
