use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cinemax_metadata::MetadataError;
use cinemax_metadata::genres::GenreCatalog;
use cinemax_metadata::provider::CatalogProvider;
use cinemax_metadata::search::{Debouncer, SEARCH_DEBOUNCE};
use sqlx::SqlitePool;
use tokio::sync::OnceCell;

use crate::favorites::FavoritesStore;

/// Suggest sessions kept before the least recently used one is dropped.
const MAX_SUGGEST_SESSIONS: usize = 1024;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub provider: Arc<dyn CatalogProvider>,
    pub favorites: FavoritesStore,
    /// Configured content language, e.g. `pt-BR`.
    pub language: String,
    genres: Arc<OnceCell<GenreCatalog>>,
    suggest: Arc<SuggestSessions>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        provider: Arc<dyn CatalogProvider>,
        favorites: FavoritesStore,
        language: impl Into<String>,
    ) -> Self {
        Self {
            db,
            provider,
            favorites,
            language: language.into(),
            genres: Arc::new(OnceCell::new()),
            suggest: Arc::new(SuggestSessions::new(SEARCH_DEBOUNCE)),
        }
    }

    /// Override the type-ahead delay. Tests use zero.
    pub fn with_suggest_delay(mut self, delay: Duration) -> Self {
        self.suggest = Arc::new(SuggestSessions::new(delay));
        self
    }

    /// Genre lists, fetched on first use. A failed fetch is retried next call.
    pub async fn genres(&self) -> Result<&GenreCatalog, MetadataError> {
        self.genres
            .get_or_try_init(|| GenreCatalog::load(self.provider.as_ref()))
            .await
    }

    /// Debouncer for one type-ahead session. Requests without a session get
    /// their own and are never superseded.
    pub fn debouncer(&self, session: Option<&str>) -> Debouncer {
        match session {
            Some(session) => self.suggest.get(session),
            None => Debouncer::new(self.suggest.delay),
        }
    }
}

struct SuggestSessions {
    delay: Duration,
    capacity: usize,
    sessions: Mutex<SessionTable>,
}

#[derive(Default)]
struct SessionTable {
    tick: u64,
    entries: HashMap<String, (Debouncer, u64)>,
}

impl SuggestSessions {
    fn new(delay: Duration) -> Self {
        Self::with_capacity(delay, MAX_SUGGEST_SESSIONS)
    }

    fn with_capacity(delay: Duration, capacity: usize) -> Self {
        Self {
            delay,
            capacity,
            sessions: Mutex::new(SessionTable::default()),
        }
    }

    fn get(&self, session: &str) -> Debouncer {
        let mut table = match self.sessions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        table.tick += 1;
        let tick = table.tick;

        if !table.entries.contains_key(session) && table.entries.len() >= self.capacity {
            let oldest = table
                .entries
                .iter()
                .min_by_key(|(_, (_, used))| *used)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                table.entries.remove(&oldest);
            }
        }

        let entry = table
            .entries
            .entry(session.to_string())
            .or_insert_with(|| (Debouncer::new(self.delay), tick));
        entry.1 = tick;
        entry.0.clone()
    }
}
