use crate::overpass::OverpassClient;
use crate::search::GeoSearch;
use std::sync::{Mutex, MutexGuard};

/// One pipeline behind one lock: Overpass lookups are never issued in parallel.
pub struct AppState {
    pub search: Mutex<GeoSearch<OverpassClient>>,
}

impl AppState {
    pub fn new(search: GeoSearch<OverpassClient>) -> Self {
        Self {
            search: Mutex::new(search),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, GeoSearch<OverpassClient>> {
        self.search.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
