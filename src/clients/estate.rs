//! The remote service contract and its HTTP implementation.
//!
//! Controllers talk to [`EstateApi`] only; the reqwest-backed
//! [`HttpEstateClient`] is the production implementation and tests swap in
//! a scripted mock. Every request carries the opaque identity header the
//! hosting shell supplies.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::constants::upload::PROGRESS_CHUNK_BYTES;
use crate::domain::PropertyId;
use crate::models::{
    MapPin, OfferFields, PropertyListing, PropertyType, SearchPage, SearchQuery, TransactionKind,
    UploadAsset,
};

/// Header carrying the opaque user identity issued by the hosting shell.
pub const IDENTITY_HEADER: &str = "X-User-Identity";

/// Transfer-progress callback: `(bytes_sent, bytes_total)` over the binary
/// parts of a submission.
pub type Progress = Arc<dyn Fn(u64, u64) + Send + Sync>;

#[derive(Debug, Error)]
pub enum EstateError {
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
}

/// Request/response contract with the remote real-estate service.
///
/// Object-safe so the engine can hold `Arc<dyn EstateApi>` and tests can
/// inject a scripted implementation.
#[async_trait]
pub trait EstateApi: Send + Sync {
    /// Fetch one result page for a query at a zero-based offset.
    async fn search(
        &self,
        query: &SearchQuery,
        offset: u32,
        limit: u32,
    ) -> Result<SearchPage, EstateError>;

    async fn favorites(&self) -> Result<Vec<PropertyListing>, EstateError>;

    async fn add_favorite(&self, id: PropertyId) -> Result<(), EstateError>;

    async fn remove_favorite(&self, id: PropertyId) -> Result<(), EstateError>;

    /// Submit the offer form and its assets as a single multipart request,
    /// reporting transfer progress over the binary parts.
    async fn submit_offer(
        &self,
        fields: &OfferFields,
        photos: &[UploadAsset],
        video: Option<&UploadAsset>,
        progress: Progress,
    ) -> Result<(), EstateError>;

    async fn map_pins(&self) -> Result<Vec<MapPin>, EstateError>;

    /// Register the query for later listing notifications.
    async fn save_search(&self, query: &SearchQuery) -> Result<(), EstateError>;
}

#[derive(Serialize)]
struct WireSearchRequest<'a> {
    transaction_type: Option<&'static str>,
    property_types: Vec<&'static str>,
    rooms: Option<u32>,
    district: Option<&'a str>,
    budget_min: Option<f64>,
    budget_max: Option<f64>,
    query_text: Option<&'a str>,
    offset: u32,
    limit: u32,
}

impl<'a> WireSearchRequest<'a> {
    fn new(query: &'a SearchQuery, offset: u32, limit: u32) -> Self {
        Self {
            transaction_type: query.transaction_kind.map(|k| k.wire_value()),
            property_types: query
                .property_types
                .iter()
                .map(PropertyType::wire_value)
                .collect(),
            rooms: query.rooms.map(|r| r.wire_value()),
            district: query.district.as_deref(),
            budget_min: query.budget_min,
            budget_max: query.budget_max,
            query_text: query.free_text.as_deref(),
            offset,
            limit,
        }
    }
}

#[derive(Serialize)]
struct WireFavoriteCreate {
    property_id: PropertyId,
}

#[derive(Serialize)]
struct WireSavedSearch<'a> {
    criteria: &'a SearchQuery,
}

#[derive(Clone)]
pub struct HttpEstateClient {
    client: Client,
    base_url: Url,
    identity_token: String,
}

impl HttpEstateClient {
    pub fn new(
        base_url: &str,
        identity_token: &str,
        timeout: Duration,
    ) -> Result<Self, EstateError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("domik/0.1")
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            identity_token: identity_token.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, EstateError> {
        Ok(self.base_url.join(path)?)
    }

    async fn ensure_success(response: Response) -> Result<Response, EstateError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let mut message = response.text().await.unwrap_or_default();
        message.truncate(200);
        debug!("Request rejected with {status}: {message}");
        Err(EstateError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

/// Wraps an asset's bytes in a chunked stream that advances the shared byte
/// counter and reports progress as each chunk is handed to the transport.
fn progress_part(
    asset: &UploadAsset,
    sent: Arc<AtomicU64>,
    total: u64,
    progress: Progress,
) -> Result<Part, EstateError> {
    let length = asset.size_bytes();
    let chunks: Vec<Vec<u8>> = asset
        .data
        .chunks(PROGRESS_CHUNK_BYTES)
        .map(<[u8]>::to_vec)
        .collect();

    let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
        let sent_now = sent.fetch_add(chunk.len() as u64, Ordering::Relaxed) + chunk.len() as u64;
        progress(sent_now, total);
        Ok::<Vec<u8>, std::io::Error>(chunk)
    }));

    let part = Part::stream_with_length(Body::wrap_stream(stream), length)
        .file_name(asset.file_name.clone())
        .mime_str(&asset.mime_type)?;
    Ok(part)
}

fn text_part(form: Form, name: &'static str, value: Option<String>) -> Form {
    match value {
        Some(value) => form.text(name, value),
        None => form,
    }
}

#[async_trait]
impl EstateApi for HttpEstateClient {
    async fn search(
        &self,
        query: &SearchQuery,
        offset: u32,
        limit: u32,
    ) -> Result<SearchPage, EstateError> {
        let response = self
            .client
            .post(self.endpoint("api/search")?)
            .header(IDENTITY_HEADER, &self.identity_token)
            .json(&WireSearchRequest::new(query, offset, limit))
            .send()
            .await?;

        Ok(Self::ensure_success(response).await?.json().await?)
    }

    async fn favorites(&self) -> Result<Vec<PropertyListing>, EstateError> {
        let response = self
            .client
            .get(self.endpoint("api/favorites/")?)
            .header(IDENTITY_HEADER, &self.identity_token)
            .send()
            .await?;

        Ok(Self::ensure_success(response).await?.json().await?)
    }

    async fn add_favorite(&self, id: PropertyId) -> Result<(), EstateError> {
        let response = self
            .client
            .post(self.endpoint("api/favorites/")?)
            .header(IDENTITY_HEADER, &self.identity_token)
            .json(&WireFavoriteCreate { property_id: id })
            .send()
            .await?;

        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn remove_favorite(&self, id: PropertyId) -> Result<(), EstateError> {
        let response = self
            .client
            .delete(self.endpoint(&format!("api/favorites/{id}"))?)
            .header(IDENTITY_HEADER, &self.identity_token)
            .send()
            .await?;

        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn submit_offer(
        &self,
        fields: &OfferFields,
        photos: &[UploadAsset],
        video: Option<&UploadAsset>,
        progress: Progress,
    ) -> Result<(), EstateError> {
        let total: u64 = photos
            .iter()
            .map(UploadAsset::size_bytes)
            .chain(video.map(UploadAsset::size_bytes))
            .sum();
        let sent = Arc::new(AtomicU64::new(0));

        let mut form = Form::new()
            .text(
                "transactionType",
                fields
                    .transaction_kind
                    .map_or("", |k| k.wire_value())
                    .to_string(),
            )
            .text(
                "propertyType",
                fields
                    .property_type
                    .map_or("", |t| t.wire_value())
                    .to_string(),
            )
            .text("address", fields.address.clone())
            .text("name", fields.name.clone())
            .text("phone", fields.phone.clone());

        form = text_part(form, "area", fields.area.clone());
        form = text_part(form, "floors", fields.floors.clone());
        form = text_part(form, "rooms", fields.rooms.clone());
        form = text_part(form, "price", fields.price.clone());
        form = text_part(form, "description", fields.description.clone());

        for photo in photos {
            form = form.part(
                "photos",
                progress_part(photo, Arc::clone(&sent), total, Arc::clone(&progress))?,
            );
        }
        if let Some(video) = video {
            form = form.part(
                "video",
                progress_part(video, Arc::clone(&sent), total, Arc::clone(&progress))?,
            );
        }

        let response = self
            .client
            .post(self.endpoint("api/offers/")?)
            .header(IDENTITY_HEADER, &self.identity_token)
            .multipart(form)
            .send()
            .await?;

        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn map_pins(&self) -> Result<Vec<MapPin>, EstateError> {
        let response = self
            .client
            .get(self.endpoint("api/map/properties")?)
            .header(IDENTITY_HEADER, &self.identity_token)
            .send()
            .await?;

        Ok(Self::ensure_success(response).await?.json().await?)
    }

    async fn save_search(&self, query: &SearchQuery) -> Result<(), EstateError> {
        let response = self
            .client
            .post(self.endpoint("api/searches/")?)
            .header(IDENTITY_HEADER, &self.identity_token)
            .json(&WireSavedSearch { criteria: query })
            .send()
            .await?;

        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetKind;

    #[test]
    fn wire_request_maps_enums_to_service_values() {
        let mut query = SearchQuery::default();
        query.transaction_kind = Some(TransactionKind::Buy);
        query.property_types.insert(PropertyType::Apartment);
        query.rooms = Some(crate::models::RoomCount::FivePlus);

        let wire = WireSearchRequest::new(&query, 20, 10);
        assert_eq!(wire.transaction_type, Some("sell"));
        assert_eq!(wire.property_types, vec!["apartment"]);
        assert_eq!(wire.rooms, Some(5));
        assert_eq!(wire.offset, 20);
        assert_eq!(wire.limit, 10);
    }

    #[test]
    fn progress_part_reports_monotone_byte_counts() {
        let asset = UploadAsset {
            kind: AssetKind::Photo,
            file_name: "a.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            data: vec![0u8; PROGRESS_CHUNK_BYTES * 2 + 10],
        };
        let total = asset.size_bytes();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress: Progress = Arc::new(move |sent, _| {
            sink.lock().unwrap().push(sent);
        });

        let part = progress_part(&asset, Arc::new(AtomicU64::new(0)), total, progress);
        assert!(part.is_ok());
        // The stream is lazy; chunks only count once polled by a transport.
        assert!(seen.lock().unwrap().is_empty());
    }
}
