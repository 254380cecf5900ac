//! Wire models for listings, search pages, and map pins.

use serde::{Deserialize, Serialize};

use crate::domain::PropertyId;

/// A single property listing as the service returns it.
///
/// `is_favorite` is the only field the engine ever mutates locally; every
/// other field is display data owned by the remote side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyListing {
    pub id: PropertyId,

    pub title: String,

    pub price_usd: Option<f64>,

    pub rooms: Option<u32>,

    pub area_sqm: Option<f64>,

    pub address: Option<String>,

    pub description: Option<String>,

    #[serde(default)]
    pub photos: Vec<String>,

    pub similarity_score: Option<f64>,

    /// Link back to the original announcement.
    #[serde(rename = "telegram_link")]
    pub source_link: String,

    pub is_favorite: bool,
}

/// One page of search results: the items at some offset plus the remote
/// total for the whole query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub results: Vec<PropertyListing>,

    pub total: u32,
}

/// Minimal listing projection for plotting a pin on the map screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPin {
    pub id: PropertyId,

    pub latitude: f64,

    pub longitude: f64,

    pub price_usd: Option<f64>,

    pub title: String,
}
