//! The offer form's scalar fields and its media assets.

use serde::{Deserialize, Serialize};

use super::query::{PropertyType, TransactionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Photo,
    Video,
}

/// A file the UI hands over for validation. Not yet admitted to the queue.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub file_name: String,

    pub mime_type: String,

    pub data: Vec<u8>,
}

impl CandidateFile {
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }
}

/// A validated media asset queued for submission.
///
/// Only candidates that pass the type and size rules become assets, so
/// everything in the queue is submission-ready by construction.
#[derive(Debug, Clone)]
pub struct UploadAsset {
    pub kind: AssetKind,

    pub file_name: String,

    pub mime_type: String,

    pub data: Vec<u8>,
}

impl UploadAsset {
    #[must_use]
    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Scalar fields of the offer form. Binary assets are tracked separately
/// and are never part of a persisted draft.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OfferFields {
    pub transaction_kind: Option<TransactionKind>,

    pub property_type: Option<PropertyType>,

    pub address: String,

    pub name: String,

    pub phone: String,

    pub area: Option<String>,

    pub floors: Option<String>,

    pub rooms: Option<String>,

    pub price: Option<String>,

    pub description: Option<String>,
}
