//! List items as the front-end renders them: summary plus badge data.

use std::collections::HashSet;

use cinemax_core::format::format_rating;
use cinemax_core::types::{MediaKind, MediaSummary};
use cinemax_metadata::genres::GenreCatalog;
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Card {
    #[serde(flatten)]
    pub item: MediaSummary,
    /// One decimal place, e.g. `"7.4"`.
    pub rating: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre_label: Option<String>,
    pub is_favorite: bool,
}

/// What a handler needs to decorate many cards without re-reading shared state.
pub struct CardContext<'a> {
    favorites: HashSet<(MediaKind, u64)>,
    genres: Option<&'a GenreCatalog>,
}

impl<'a> CardContext<'a> {
    /// Genre lists that cannot be fetched only cost the labels.
    pub async fn load(state: &'a AppState) -> Self {
        let favorites = state.favorites.keys().await;
        let genres = match state.genres().await {
            Ok(genres) => Some(genres),
            Err(e) => {
                warn!(error = %e, "genre lists unavailable, omitting labels");
                None
            }
        };
        Self { favorites, genres }
    }

    pub fn is_favorite(&self, kind: MediaKind, id: u64) -> bool {
        self.favorites.contains(&(kind, id))
    }

    pub fn card(&self, item: MediaSummary) -> Card {
        Card {
            rating: format_rating(item.vote_average),
            genre_label: self
                .genres
                .map(|g| g.label(&item.genre_ids, item.media_type)),
            is_favorite: self.is_favorite(item.media_type, item.id),
            item,
        }
    }

    pub fn cards(&self, items: impl IntoIterator<Item = MediaSummary>) -> Vec<Card> {
        items.into_iter().map(|item| self.card(item)).collect()
    }
}
