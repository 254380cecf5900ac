//! The structured search request and its cache identity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Buy,
    Rent,
}

impl TransactionKind {
    /// Wire value the remote service filters on. A buyer searches listings
    /// that are up for sale, so `Buy` maps to the seller-side `"sell"`.
    #[must_use]
    pub const fn wire_value(&self) -> &'static str {
        match self {
            Self::Buy => "sell",
            Self::Rent => "rent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Apartment,
    House,
    Commercial,
}

impl PropertyType {
    #[must_use]
    pub const fn wire_value(&self) -> &'static str {
        match self {
            Self::Apartment => "apartment",
            Self::House => "house",
            Self::Commercial => "commercial",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_value())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomCount {
    One,
    Two,
    Three,
    Four,
    FivePlus,
}

impl RoomCount {
    /// The exact room count the service filters by; `FivePlus` is sent as 5.
    #[must_use]
    pub const fn wire_value(&self) -> u32 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
            Self::FivePlus => 5,
        }
    }
}

/// A structured search request. Immutable once submitted; two queries with
/// equal [`cache_identity`](Self::cache_identity) hit the same cached pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub transaction_kind: Option<TransactionKind>,

    /// `BTreeSet` keeps the set ordered so the cache identity is canonical.
    pub property_types: BTreeSet<PropertyType>,

    pub rooms: Option<RoomCount>,

    pub district: Option<String>,

    pub budget_min: Option<f64>,

    pub budget_max: Option<f64>,

    pub free_text: Option<String>,
}

impl SearchQuery {
    /// Canonical serialization of the query, used as the cache-key stem.
    ///
    /// Built by hand rather than through serde so the format is deterministic
    /// and infallible: fixed field order, sorted property types, absent
    /// optionals rendered as empty segments.
    #[must_use]
    pub fn cache_identity(&self) -> String {
        let kinds: Vec<&str> = self
            .property_types
            .iter()
            .map(PropertyType::wire_value)
            .collect();

        format!(
            "tk={};pt={};rooms={};district={};min={};max={};text={}",
            self.transaction_kind.map_or("", |k| k.wire_value()),
            kinds.join(","),
            self.rooms.map_or(0, |r| r.wire_value()),
            self.district.as_deref().unwrap_or(""),
            self.budget_min.map(|v| v.to_string()).unwrap_or_default(),
            self.budget_max.map(|v| v.to_string()).unwrap_or_default(),
            self.free_text.as_deref().unwrap_or(""),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> SearchQuery {
        SearchQuery {
            transaction_kind: Some(TransactionKind::Buy),
            property_types: [PropertyType::House, PropertyType::Apartment]
                .into_iter()
                .collect(),
            rooms: Some(RoomCount::Two),
            district: Some("Center".to_string()),
            budget_min: Some(50_000.0),
            budget_max: Some(120_000.0),
            free_text: None,
        }
    }

    #[test]
    fn identity_is_canonical_regardless_of_insertion_order() {
        let mut reordered = query();
        reordered.property_types = [PropertyType::Apartment, PropertyType::House]
            .into_iter()
            .collect();
        assert_eq!(query().cache_identity(), reordered.cache_identity());
    }

    #[test]
    fn identity_distinguishes_filters() {
        let mut other = query();
        other.budget_max = Some(130_000.0);
        assert_ne!(query().cache_identity(), other.cache_identity());
    }

    #[test]
    fn buy_maps_to_sell_on_the_wire() {
        assert_eq!(TransactionKind::Buy.wire_value(), "sell");
        assert_eq!(TransactionKind::Rent.wire_value(), "rent");
    }

    #[test]
    fn five_plus_rooms_is_sent_as_five() {
        assert_eq!(RoomCount::FivePlus.wire_value(), 5);
    }
}
