use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::EventSettings;
use crate::db::EventRepository;

/// Shared by every handler; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub repo: EventRepository,
    pub settings: Arc<EventSettings>,
}

impl AppState {
    pub fn new(pool: SqlitePool, settings: EventSettings) -> Self {
        let settings = Arc::new(settings);
        Self {
            repo: EventRepository::new(pool, Arc::clone(&settings)),
            settings,
        }
    }
}
