//! Landing page: hero title and three rows, each loaded independently.

use axum::Json;
use axum::extract::State;
use cinemax_core::types::{Listing, MediaDetails, MediaKind, MediaSummary, TimeWindow};
use cinemax_metadata::MetadataError;
use cinemax_metadata::trailer::trailer_key;
use futures::future::join_all;
use serde::Serialize;
use tracing::warn;

use crate::cards::{Card, CardContext};
use crate::state::AppState;

const ROW_LEN: usize = 12;
const NEW_RELEASES_LEN: usize = 8;

#[derive(Serialize)]
pub struct HomeResponse {
    pub hero: Option<Hero>,
    pub popular_movies: Vec<Card>,
    pub popular_shows: Vec<Card>,
    pub new_releases: Vec<Release>,
}

#[derive(Serialize)]
pub struct Hero {
    #[serde(flatten)]
    pub details: MediaDetails,
    pub trailer_key: Option<String>,
    pub is_favorite: bool,
}

/// Upcoming movie with its details when those could be fetched.
#[derive(Serialize)]
pub struct Release {
    #[serde(flatten)]
    pub card: Card,
    pub details: Option<MediaDetails>,
}

pub async fn home(State(state): State<AppState>) -> Json<HomeResponse> {
    let (hero, popular_movies, popular_shows, upcoming) = tokio::join!(
        load_hero(&state),
        load_row(&state, MediaKind::Movie, Listing::Popular, ROW_LEN),
        load_row(&state, MediaKind::Tv, Listing::Popular, ROW_LEN),
        load_row(&state, MediaKind::Movie, Listing::Upcoming, NEW_RELEASES_LEN),
    );

    let hero = hero.unwrap_or_else(|e| {
        warn!(error = %e, "hero unavailable");
        None
    });

    let provider = state.provider.as_ref();
    let new_releases = join_all(upcoming.into_iter().map(|movie| async move {
        match provider.details(MediaKind::Movie, movie.id).await {
            Ok(details) => (movie, Some(details)),
            Err(e) => {
                warn!(id = movie.id, error = %e, "release details unavailable");
                (movie, None)
            }
        }
    }))
    .await;

    let ctx = CardContext::load(&state).await;
    let hero = hero.map(|(details, trailer_key)| Hero {
        is_favorite: ctx.is_favorite(details.summary.media_type, details.summary.id),
        details,
        trailer_key,
    });

    Json(HomeResponse {
        hero,
        popular_movies: ctx.cards(popular_movies),
        popular_shows: ctx.cards(popular_shows),
        new_releases: new_releases
            .into_iter()
            .map(|(movie, details)| Release {
                card: ctx.card(movie),
                details,
            })
            .collect(),
    })
}

/// First trending movie of the week with details and trailer.
async fn load_hero(
    state: &AppState,
) -> Result<Option<(MediaDetails, Option<String>)>, MetadataError> {
    let trending = state
        .provider
        .trending(MediaKind::Movie, TimeWindow::Week)
        .await?;
    let Some(movie) = trending.into_iter().next() else {
        return Ok(None);
    };

    let (details, videos) = tokio::try_join!(
        state.provider.details(MediaKind::Movie, movie.id),
        state.provider.videos(MediaKind::Movie, movie.id),
    )?;
    Ok(Some((details, trailer_key(&videos, &state.language))))
}

/// Leading items of a listing; failures leave the row empty.
async fn load_row(
    state: &AppState,
    kind: MediaKind,
    listing: Listing,
    len: usize,
) -> Vec<MediaSummary> {
    match state.provider.listing(kind, listing, 1).await {
        Ok(page) => page.results.into_iter().take(len).collect(),
        Err(e) => {
            warn!(%kind, %listing, error = %e, "home row unavailable");
            Vec::new()
        }
    }
}
