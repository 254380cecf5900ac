pub mod listing;
pub mod offer;
pub mod query;

pub use listing::{MapPin, PropertyListing, SearchPage};
pub use offer::{AssetKind, CandidateFile, OfferFields, UploadAsset};
pub use query::{PropertyType, RoomCount, SearchQuery, TransactionKind};
