//! Media queue and offer submission.
//!
//! Candidate files pass type and size checks before they are admitted;
//! a photo batch whose valid part would push the queue past the cap is
//! rejected whole, and a new valid video replaces the single slot while an
//! invalid one leaves the slot alone. Submission packs the scalar fields
//! and every queued asset into one multipart request and reports transfer
//! progress as a monotone percentage of bytes sent.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::EngineError;
use super::drafts::{DraftStore, OFFER_FORM};
use crate::clients::{EstateApi, Progress};
use crate::constants::limits;
use crate::domain::events::EngineEvent;
use crate::models::{AssetKind, CandidateFile, OfferFields, UploadAsset};
use crate::validate::validate_offer;

/// Why a candidate file was not admitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub file_name: String,
    pub reason: String,
}

/// Result of an [`OfferController::add_files`] call.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AddOutcome {
    /// Number of files admitted to the queue.
    pub added: usize,

    /// Per-file type/size rejections.
    pub rejected: Vec<Rejection>,

    /// Set when the whole batch was refused because the valid part would
    /// exceed the photo cap; nothing was admitted in that case.
    pub batch_rejected: Option<String>,
}

#[derive(Default)]
struct AssetQueue {
    photos: Vec<UploadAsset>,
    video: Option<UploadAsset>,
}

pub struct OfferController {
    api: Arc<dyn EstateApi>,
    events: broadcast::Sender<EngineEvent>,
    drafts: Arc<DraftStore>,
    queue: Mutex<AssetQueue>,
}

impl OfferController {
    pub fn new(
        api: Arc<dyn EstateApi>,
        events: broadcast::Sender<EngineEvent>,
        drafts: Arc<DraftStore>,
    ) -> Self {
        Self {
            api,
            events,
            drafts,
            queue: Mutex::new(AssetQueue::default()),
        }
    }

    fn queue(&self) -> MutexGuard<'_, AssetQueue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }

    #[must_use]
    pub fn photo_count(&self) -> usize {
        self.queue().photos.len()
    }

    #[must_use]
    pub fn has_video(&self) -> bool {
        self.queue().video.is_some()
    }

    /// File names currently queued, photos in order then the video slot.
    #[must_use]
    pub fn asset_names(&self) -> Vec<String> {
        let queue = self.queue();
        queue
            .photos
            .iter()
            .chain(queue.video.as_ref())
            .map(|a| a.file_name.clone())
            .collect()
    }

    fn check_candidate(kind: AssetKind, file: &CandidateFile) -> Option<String> {
        let (mimes, max_bytes, label) = match kind {
            AssetKind::Photo => (limits::PHOTO_MIME_TYPES, limits::MAX_PHOTO_BYTES, "photo"),
            AssetKind::Video => (limits::VIDEO_MIME_TYPES, limits::MAX_VIDEO_BYTES, "video"),
        };
        if !mimes.contains(&file.mime_type.as_str()) {
            return Some(format!("unsupported {label} type: {}", file.mime_type));
        }
        if file.size_bytes() > max_bytes {
            return Some(format!(
                "{label} exceeds the {} MB limit",
                max_bytes / (1024 * 1024)
            ));
        }
        None
    }

    /// Validate candidates and admit the survivors.
    ///
    /// Photos are checked type-first then size; only files passing both
    /// count toward the cap, and a batch whose valid part would exceed it
    /// is refused whole. A valid video replaces the existing slot.
    pub fn add_files(&self, kind: AssetKind, files: Vec<CandidateFile>) -> AddOutcome {
        let mut outcome = AddOutcome::default();
        let mut valid = Vec::new();

        for file in files {
            match Self::check_candidate(kind, &file) {
                Some(reason) => {
                    debug!("Rejecting {}: {reason}", file.file_name);
                    outcome.rejected.push(Rejection {
                        file_name: file.file_name,
                        reason,
                    });
                }
                None => valid.push(file),
            }
        }

        for rejection in &outcome.rejected {
            self.emit(EngineEvent::Notice {
                message: format!("{}: {}", rejection.file_name, rejection.reason),
            });
        }

        match kind {
            AssetKind::Photo => {
                let mut queue = self.queue();
                if queue.photos.len() + valid.len() > limits::MAX_PHOTOS {
                    let message = format!(
                        "Adding {} photos would exceed the limit of {}",
                        valid.len(),
                        limits::MAX_PHOTOS
                    );
                    drop(queue);
                    self.emit(EngineEvent::Notice {
                        message: message.clone(),
                    });
                    outcome.batch_rejected = Some(message);
                    return outcome;
                }
                outcome.added = valid.len();
                queue.photos.extend(valid.into_iter().map(|f| UploadAsset {
                    kind: AssetKind::Photo,
                    file_name: f.file_name,
                    mime_type: f.mime_type,
                    data: f.data,
                }));
            }
            AssetKind::Video => {
                // Single slot: the last valid candidate wins, an invalid
                // one never touches the existing slot.
                if let Some(file) = valid.pop() {
                    outcome.added = 1;
                    self.queue().video = Some(UploadAsset {
                        kind: AssetKind::Video,
                        file_name: file.file_name,
                        mime_type: file.mime_type,
                        data: file.data,
                    });
                }
            }
        }

        outcome
    }

    /// Remove one queued asset; returns false if the index/slot was empty.
    pub fn remove_asset(&self, kind: AssetKind, index: usize) -> bool {
        let mut queue = self.queue();
        match kind {
            AssetKind::Photo => {
                if index < queue.photos.len() {
                    queue.photos.remove(index);
                    true
                } else {
                    false
                }
            }
            AssetKind::Video => queue.video.take().is_some(),
        }
    }

    /// Validate the form and submit it with all queued assets as one
    /// multipart request.
    ///
    /// A validation failure never reaches the network; a transport failure
    /// leaves the form and the queue intact for retry. Success clears the
    /// queue and the persisted draft.
    pub async fn submit(&self, fields: &OfferFields) -> Result<(), EngineError> {
        let errors = validate_offer(fields);
        if !errors.is_empty() {
            return Err(EngineError::Validation { errors });
        }

        let (photos, video) = {
            let queue = self.queue();
            (queue.photos.clone(), queue.video.clone())
        };

        let events = self.events.clone();
        let progress: Progress = Arc::new(move |sent, total| {
            let percent = if total == 0 {
                100
            } else {
                (sent.saturating_mul(100) / total).min(100) as u8
            };
            let _ = events.send(EngineEvent::UploadProgress { percent });
        });

        info!(
            "Submitting offer with {} photo(s), video: {}",
            photos.len(),
            video.is_some()
        );

        match self
            .api
            .submit_offer(fields, &photos, video.as_ref(), progress)
            .await
        {
            Ok(()) => {
                {
                    let mut queue = self.queue();
                    queue.photos.clear();
                    queue.video = None;
                }
                self.drafts.clear(OFFER_FORM);
                self.emit(EngineEvent::UploadProgress { percent: 100 });
                self.emit(EngineEvent::OfferSubmitted);
                Ok(())
            }
            Err(e) => {
                self.emit(EngineEvent::Notice {
                    message: "Could not submit the offer, try again".to_string(),
                });
                Err(e.into())
            }
        }
    }
}
