use cinemax_core::favorites::Favorite;
use cinemax_core::types::{MediaKind, MediaSummary};
use sqlx::SqlitePool;
use tracing::warn;

use crate::DbError;

/// All stored favorites in insertion order.
///
/// Rows whose payload no longer decodes are skipped with a warning rather than
/// failing the whole load.
pub async fn list(pool: &SqlitePool) -> Result<Vec<Favorite>, DbError> {
    let rows: Vec<(String, i64, String, i64)> = sqlx::query_as(
        "SELECT media_type, tmdb_id, payload, added_ts FROM favorite ORDER BY seq",
    )
    .fetch_all(pool)
    .await?;

    let mut favorites = Vec::with_capacity(rows.len());
    for (media_type, tmdb_id, payload, added_ts) in rows {
        match decode_row(&media_type, tmdb_id, &payload) {
            Ok(item) => favorites.push(Favorite::new(item, added_ts)),
            Err(e) => warn!(media_type = %media_type, tmdb_id, error = %e, "skipping unreadable favorite"),
        }
    }
    Ok(favorites)
}

fn decode_row(media_type: &str, tmdb_id: i64, payload: &str) -> Result<MediaSummary, DbError> {
    let mut item: MediaSummary = serde_json::from_str(payload)?;
    // Key columns are authoritative over whatever the payload claims.
    if let Some(kind) = MediaKind::parse(media_type) {
        item.media_type = kind;
    }
    item.id = tmdb_id as u64;
    Ok(item)
}

/// Store a favorite at the end of the list.
///
/// A row left behind for the same key (say, by a failed delete) is replaced,
/// so stored order and timestamp follow the latest write. Returns `false` when
/// such a row existed.
pub async fn insert(pool: &SqlitePool, favorite: &Favorite) -> Result<bool, DbError> {
    let payload = serde_json::to_string(&favorite.item)?;
    let mut tx = pool.begin().await?;

    let stale = sqlx::query("DELETE FROM favorite WHERE media_type = ? AND tmdb_id = ?")
        .bind(favorite.item.media_type.as_str())
        .bind(favorite.item.id as i64)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO favorite (media_type, tmdb_id, payload, added_ts) VALUES (?, ?, ?, ?)",
    )
    .bind(favorite.item.media_type.as_str())
    .bind(favorite.item.id as i64)
    .bind(payload)
    .bind(favorite.added_ts)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(stale.rows_affected() == 0)
}

/// Delete a favorite. Returns `false` when nothing matched.
pub async fn delete(pool: &SqlitePool, kind: MediaKind, id: u64) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM favorite WHERE media_type = ? AND tmdb_id = ?")
        .bind(kind.as_str())
        .bind(id as i64)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count(pool: &SqlitePool) -> Result<i64, DbError> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM favorite")
        .fetch_one(pool)
        .await?;
    Ok(n)
}
