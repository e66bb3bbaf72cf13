//! Favorites held in memory and written through to SQLite.

use std::collections::HashSet;
use std::sync::Arc;

use cinemax_core::favorites::{Favorite, Favorites, Toggled};
use cinemax_core::types::{MediaKind, MediaSummary};
use cinemax_db::repo::favorites as repo;
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Shared favorites list.
///
/// Reads never touch the database. Mutations update memory first and then
/// persist while still holding the write lock, so stored order always
/// matches memory. Persist failures are logged and the in-memory change
/// stands.
#[derive(Clone)]
pub struct FavoritesStore {
    pool: SqlitePool,
    inner: Arc<RwLock<Favorites>>,
}

impl FavoritesStore {
    /// Read the stored list once. An unreadable table leaves the store empty.
    pub async fn load(pool: SqlitePool) -> Self {
        let favorites = match repo::list(&pool).await {
            Ok(entries) => Favorites::from_entries(entries),
            Err(e) => {
                warn!(error = %e, "failed to load favorites, starting empty");
                Favorites::new()
            }
        };
        info!(count = favorites.len(), "favorites loaded");

        Self {
            pool,
            inner: Arc::new(RwLock::new(favorites)),
        }
    }

    pub async fn list(&self) -> Vec<Favorite> {
        self.inner.read().await.as_slice().to_vec()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn contains(&self, kind: MediaKind, id: u64) -> bool {
        self.inner.read().await.contains(kind, id)
    }

    /// Snapshot of every stored key, for badging list responses.
    pub async fn keys(&self) -> HashSet<(MediaKind, u64)> {
        self.inner.read().await.iter().map(Favorite::key).collect()
    }

    /// Returns the stored entry and whether it was newly added.
    pub async fn add(&self, item: MediaSummary) -> (Favorite, bool) {
        let mut favorites = self.inner.write().await;
        if let Some(existing) = favorites.get(item.media_type, item.id) {
            return (existing.clone(), false);
        }

        let favorite = Favorite::new(item, now_ts());
        favorites.add(favorite.clone());
        self.persist_insert(&favorite).await;
        (favorite, true)
    }

    pub async fn remove(&self, kind: MediaKind, id: u64) -> Option<Favorite> {
        let mut favorites = self.inner.write().await;
        let removed = favorites.remove(kind, id)?;
        self.persist_delete(kind, id).await;
        Some(removed)
    }

    pub async fn toggle(&self, item: MediaSummary) -> Toggled {
        let mut favorites = self.inner.write().await;
        let toggled = favorites.toggle(item, now_ts());
        match &toggled {
            Toggled::Added(favorite) => self.persist_insert(favorite).await,
            Toggled::Removed(favorite) => {
                let (kind, id) = favorite.key();
                self.persist_delete(kind, id).await;
            }
        }
        toggled
    }

    async fn persist_insert(&self, favorite: &Favorite) {
        if let Err(e) = repo::insert(&self.pool, favorite).await {
            let (kind, id) = favorite.key();
            warn!(%kind, id, error = %e, "failed to persist favorite");
        }
    }

    async fn persist_delete(&self, kind: MediaKind, id: u64) {
        if let Err(e) = repo::delete(&self.pool, kind, id).await {
            warn!(%kind, id, error = %e, "failed to delete persisted favorite");
        }
    }
}

fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn pool() -> SqlitePool {
        let pool = cinemax_db::connect(":memory:").await.unwrap();
        cinemax_db::migrate::run(&pool).await.unwrap();
        pool
    }

    fn item(kind: MediaKind, id: u64) -> MediaSummary {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "media_type": kind,
            "title": format!("{kind} {id}"),
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn reload_preserves_content_and_order() {
        let pool = pool().await;
        let store = FavoritesStore::load(pool.clone()).await;
        store.add(item(MediaKind::Tv, 3)).await;
        store.add(item(MediaKind::Movie, 1)).await;
        store.add(item(MediaKind::Movie, 2)).await;
        store.toggle(item(MediaKind::Movie, 1)).await;

        let reloaded = FavoritesStore::load(pool).await;
        assert_eq!(reloaded.list().await, store.list().await);
        let keys: Vec<_> = reloaded.list().await.iter().map(Favorite::key).collect();
        assert_eq!(keys, vec![(MediaKind::Tv, 3), (MediaKind::Movie, 2)]);
    }

    #[tokio::test]
    async fn adding_twice_keeps_one_entry() {
        let store = FavoritesStore::load(pool().await).await;
        let (_, added) = store.add(item(MediaKind::Movie, 9)).await;
        assert!(added);
        let (_, added) = store.add(item(MediaKind::Movie, 9)).await;
        assert!(!added);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn persist_failures_leave_memory_updated() {
        let pool = pool().await;
        let store = FavoritesStore::load(pool.clone()).await;
        pool.close().await;

        assert!(store.toggle(item(MediaKind::Movie, 5)).await.is_favorite());
        assert!(store.contains(MediaKind::Movie, 5).await);
        assert!(store.remove(MediaKind::Movie, 5).await.is_some());
        assert!(!store.contains(MediaKind::Movie, 5).await);
    }

    #[tokio::test]
    async fn unreadable_table_starts_empty() {
        let pool = cinemax_db::connect(":memory:").await.unwrap();
        let store = FavoritesStore::load(pool).await;
        assert_eq!(store.len().await, 0);
    }
}
