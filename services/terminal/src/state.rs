//! Application state shared across request handlers.

use std::sync::Arc;

use crate::db::Database;
use crate::placement::PlacementService;

/// Shared application state.
///
/// This is passed to all request handlers via Axum's state extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    db: Database,
    placement: PlacementService,
}

impl AppState {
    pub fn new(db: Database, placement: PlacementService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { db, placement }),
        }
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub fn placement(&self) -> &PlacementService {
        &self.inner.placement
    }
}
