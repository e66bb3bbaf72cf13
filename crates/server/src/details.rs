//! Everything the details overlay shows for one title.

use axum::Json;
use axum::extract::{Path, State};
use cinemax_core::types::{CastMember, MediaDetails, MediaKind};
use cinemax_metadata::trailer::trailer_key;
use serde::Serialize;

use crate::error::AppError;
use crate::routes::parse_kind;
use crate::state::AppState;

const CAST_LIMIT: usize = 15;

#[derive(Debug, Serialize)]
pub struct TitleResponse {
    #[serde(flatten)]
    pub details: MediaDetails,
    pub cast: Vec<CastMember>,
    pub director: Option<String>,
    pub trailer_key: Option<String>,
    pub is_favorite: bool,
}

pub async fn title(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, u64)>,
) -> Result<Json<TitleResponse>, AppError> {
    let kind = parse_kind(&kind)?;
    let (details, videos, credits) = tokio::try_join!(
        state.provider.details(kind, id),
        state.provider.videos(kind, id),
        state.provider.credits(kind, id),
    )?;

    // Shows have no director credit; their first creator stands in.
    let director = match kind {
        MediaKind::Movie => credits.director().map(|c| c.name.clone()),
        MediaKind::Tv => details.created_by.first().map(|c| c.name.clone()),
    };

    let mut cast = credits.cast;
    cast.truncate(CAST_LIMIT);

    Ok(Json(TitleResponse {
        trailer_key: trailer_key(&videos, &state.language),
        is_favorite: state.favorites.contains(kind, id).await,
        director,
        cast,
        details,
    }))
}
