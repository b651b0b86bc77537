use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use rand::Rng;

use super::page::{DashboardHandle, DashboardPage, DashboardSettings};
use crate::api::{AgreementApi, SnapshotSource};

struct Entry {
    handle: DashboardHandle,
    last_seen: Instant,
}

/// Dashboard pages keyed by a per-session id.
#[derive(Clone)]
pub struct DashboardRegistry {
    api: Arc<dyn AgreementApi>,
    snapshot: Option<Arc<dyn SnapshotSource>>,
    settings: DashboardSettings,
    max_pages: usize,
    pages: Arc<Mutex<HashMap<String, Entry>>>,
}

impl DashboardRegistry {
    pub fn new(
        api: Arc<dyn AgreementApi>,
        snapshot: Option<Arc<dyn SnapshotSource>>,
        settings: DashboardSettings,
        max_pages: usize,
    ) -> Self {
        Self {
            api,
            snapshot,
            settings,
            max_pages: max_pages.max(1),
            pages: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn api(&self) -> Arc<dyn AgreementApi> {
        self.api.clone()
    }

    /// Random 16-byte hex key for a new session.
    pub fn new_key() -> String {
        let bytes: [u8; 16] = rand::rng().random();
        hex::encode(bytes)
    }

    /// Page for `key`, created (without reading) when missing.
    /// Evicts the least recently used page when full.
    pub fn get_or_create(&self, key: &str) -> DashboardHandle {
        let mut pages = self.pages.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();

        if let Some(entry) = pages.get_mut(key) {
            entry.last_seen = now;
            return entry.handle.clone();
        }

        if pages.len() >= self.max_pages {
            let oldest = pages
                .iter()
                .min_by_key(|(_, e)| e.last_seen)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                log::info!("Evicting idle dashboard session {}", &oldest[..oldest.len().min(8)]);
                pages.remove(&oldest);
            }
        }

        let handle = DashboardHandle::new(DashboardPage::new(
            self.api.clone(),
            self.snapshot.clone(),
            self.settings.clone(),
        ));
        pages.insert(key.to_string(), Entry { handle: handle.clone(), last_seen: now });
        handle
    }

    pub fn len(&self) -> usize {
        self.pages.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
