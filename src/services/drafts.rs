//! Best-effort per-session form drafts.
//!
//! Last-entered form values are kept under a fixed name per form and
//! restored verbatim on the next load. This is a convenience, not a
//! durability contract: an unreadable or corrupt store degrades to empty
//! defaults and must never block form use. Binary asset fields are never
//! persisted; a restored offer draft always starts with an empty queue.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

pub const SEARCH_FORM: &str = "search_form";
pub const OFFER_FORM: &str = "offer_form";

pub struct DraftStore {
    path: Option<PathBuf>,
    entries: Mutex<HashMap<String, serde_json::Value>>,
}

impl DraftStore {
    /// Session-only store with no file backing.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// File-backed store. A missing file starts empty; an unreadable or
    /// corrupt one is logged and treated as empty.
    #[must_use]
    pub fn open(path: PathBuf) -> Self {
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Draft store at {} is corrupt, starting empty: {e}", path.display());
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!("Could not read draft store at {}: {e}", path.display());
                HashMap::new()
            }
        };

        Self {
            path: Some(path),
            entries: Mutex::new(entries),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, serde_json::Value>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Restore the draft saved under `form`, or `None` when absent or no
    /// longer deserializable.
    #[must_use]
    pub fn restore<T: DeserializeOwned>(&self, form: &str) -> Option<T> {
        let value = self.entries().get(form)?.clone();
        match serde_json::from_value(value) {
            Ok(draft) => Some(draft),
            Err(e) => {
                debug!("Dropping stale draft '{form}': {e}");
                None
            }
        }
    }

    /// Save the draft; persistence failures are logged, never surfaced.
    pub fn save<T: Serialize>(&self, form: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(json) => {
                self.entries().insert(form.to_string(), json);
                self.persist();
            }
            Err(e) => debug!("Refusing to save draft '{form}': {e}"),
        }
    }

    pub fn clear(&self, form: &str) {
        self.entries().remove(form);
        self.persist();
    }

    fn persist(&self) {
        let Some(path) = &self.path else { return };
        let snapshot = self.entries().clone();
        let content = match serde_json::to_string(&snapshot) {
            Ok(content) => content,
            Err(e) => {
                warn!("Could not serialize draft store: {e}");
                return;
            }
        };
        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("Could not create draft directory: {e}");
            return;
        }
        if let Err(e) = std::fs::write(path, content) {
            warn!("Could not persist drafts to {}: {e}", path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::SearchForm;

    #[test]
    fn roundtrip_in_memory() {
        let store = DraftStore::in_memory();
        let form = SearchForm {
            name: "Ivan".to_string(),
            phone: "+380631234567".to_string(),
            ..SearchForm::default()
        };
        store.save(SEARCH_FORM, &form);
        assert_eq!(store.restore::<SearchForm>(SEARCH_FORM), Some(form));

        store.clear(SEARCH_FORM);
        assert_eq!(store.restore::<SearchForm>(SEARCH_FORM), None);
    }

    #[test]
    fn corrupt_file_degrades_to_empty() {
        let path = std::env::temp_dir().join(format!("domik-drafts-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, "{not json").unwrap();

        let store = DraftStore::open(path.clone());
        assert_eq!(store.restore::<SearchForm>(SEARCH_FORM), None);

        // The store still works after degrading.
        store.save(SEARCH_FORM, &SearchForm::default());
        assert!(store.restore::<SearchForm>(SEARCH_FORM).is_some());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn file_backed_roundtrip() {
        let path = std::env::temp_dir().join(format!("domik-drafts-{}.json", uuid::Uuid::new_v4()));
        {
            let store = DraftStore::open(path.clone());
            let form = SearchForm {
                name: "Olha".to_string(),
                ..SearchForm::default()
            };
            store.save(SEARCH_FORM, &form);
        }

        let reopened = DraftStore::open(path.clone());
        let restored: SearchForm = reopened.restore(SEARCH_FORM).unwrap();
        assert_eq!(restored.name, "Olha");
        let _ = std::fs::remove_file(path);
    }
}
