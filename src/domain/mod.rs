//! Domain types for the listing engine with strong typing.
//!
//! This module provides type-safe wrappers and domain primitives for the
//! interaction engine. It follows the Newtype pattern to prevent ID mixing.

pub mod events;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a property listing.
///
/// The remote service keys listings by UUID; this newtype wrapper prevents
/// mixing listing IDs with other identifiers floating around the engine.
///
/// # Examples
///
/// ```rust
/// use domik::domain::PropertyId;
///
/// let id: PropertyId = "7f8a6e1c-4b2d-4f3a-9c1e-2d5b8a7c6e4f".parse().unwrap();
/// assert_eq!(id.to_string(), "7f8a6e1c-4b2d-4f3a-9c1e-2d5b8a7c6e4f");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(Uuid);

impl PropertyId {
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for PropertyId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<PropertyId> for Uuid {
    fn from(id: PropertyId) -> Self {
        id.0
    }
}

impl FromStr for PropertyId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_id_roundtrip() {
        let raw = "7f8a6e1c-4b2d-4f3a-9c1e-2d5b8a7c6e4f";
        let id: PropertyId = raw.parse().unwrap();
        assert_eq!(id.to_string(), raw);
        assert_eq!(PropertyId::from(id.value()), id);
    }

    #[test]
    fn property_id_serde_is_transparent() {
        let id = PropertyId::new(Uuid::new_v4());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
