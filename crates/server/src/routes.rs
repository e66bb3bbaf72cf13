use axum::extract::{Path, Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use cinemax_core::error::ApiError;
use cinemax_core::favorites::Favorite;
use cinemax_core::format::{format_rating, year_from_date};
use cinemax_core::pagination::{
    ITEMS_PER_PAGE, MAX_PAGER_PAGES, PagerEntry, page_window, paginate,
};
use cinemax_core::types::{Genre, Listing, MediaKind, MediaSummary, TimeWindow};
use cinemax_metadata::discover::{
    DEFAULT_MAX_PAGES, DiscoverFilters, SortKey, discover_by_genre, fetch_catalog,
};
use cinemax_metadata::images::{ImageSize, poster_url};
use cinemax_metadata::search::quick_search;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::cards::{Card, CardContext};
use crate::error::AppError;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/home", get(crate::home::home))
        .route("/trending/{kind}", get(trending))
        .route("/lists/{kind}/{listing}", get(listing))
        .route("/genres/{kind}", get(genres))
        .route("/genres/{kind}/{genre_id}", get(genre_titles))
        .route("/catalog/{kind}", get(catalog))
        .route("/search", get(search))
        .route("/search/suggest", get(suggest))
        .route("/titles/{kind}/{id}", get(crate::details::title))
        .route("/favorites", get(list_favorites).post(add_favorite))
        .route("/favorites/toggle", post(toggle_favorite))
        .route(
            "/favorites/{kind}/{id}",
            get(favorite_status).delete(remove_favorite),
        )
}

/// CORS for the browser front-end. `None` allows any origin.
pub fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => layer.allow_origin(origin),
        Some(Err(e)) => {
            warn!(error = %e, "invalid CORS origin, allowing any");
            layer.allow_origin(Any)
        }
        None => layer.allow_origin(Any),
    }
}

pub(crate) fn parse_kind(s: &str) -> Result<MediaKind, ApiError> {
    MediaKind::parse(s).ok_or_else(|| ApiError::BadRequest(format!("unknown media type: {s}")))
}

#[derive(Deserialize)]
struct PageQuery {
    page: Option<u32>,
}

fn upstream_page(page: Option<u32>) -> u32 {
    page.unwrap_or(1).clamp(1, MAX_PAGER_PAGES)
}

#[derive(Serialize)]
struct PageResponse {
    page: u32,
    results: Vec<Card>,
    total_pages: u32,
    total_results: u64,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    favorites: i64,
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    let favorites = cinemax_db::repo::favorites::count(&state.db)
        .await
        .map_err(|e| ApiError::Internal(format!("database check failed: {e}")))?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        favorites,
    }))
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct TrendingQuery {
    window: Option<String>,
}

async fn trending(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<TrendingQuery>,
) -> Result<Json<Vec<Card>>, AppError> {
    let kind = parse_kind(&kind)?;
    let window = match query.window.as_deref() {
        None | Some("") => TimeWindow::default(),
        Some(w) => TimeWindow::parse(w)
            .ok_or_else(|| ApiError::BadRequest(format!("unknown time window: {w}")))?,
    };

    let items = state.provider.trending(kind, window).await?;
    let ctx = CardContext::load(&state).await;
    Ok(Json(ctx.cards(items)))
}

async fn listing(
    State(state): State<AppState>,
    Path((kind, listing)): Path<(String, String)>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse>, AppError> {
    let kind = parse_kind(&kind)?;
    let listing = Listing::parse(&listing)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown listing: {listing}")))?;

    let page = state
        .provider
        .listing(kind, listing, upstream_page(query.page))
        .await?;
    let ctx = CardContext::load(&state).await;
    Ok(Json(PageResponse {
        page: page.page,
        results: ctx.cards(page.results),
        total_pages: page.total_pages,
        total_results: page.total_results,
    }))
}

// ---------------------------------------------------------------------------
// Genres
// ---------------------------------------------------------------------------

async fn genres(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<Genre>>, AppError> {
    let kind = parse_kind(&kind)?;
    let catalog = state.genres().await?;
    Ok(Json(catalog.for_kind(kind).to_vec()))
}

async fn genre_titles(
    State(state): State<AppState>,
    Path((kind, genre_id)): Path<(String, u64)>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse>, AppError> {
    let kind = parse_kind(&kind)?;
    let page = discover_by_genre(
        state.provider.as_ref(),
        kind,
        genre_id,
        upstream_page(query.page),
    )
    .await?;

    let ctx = CardContext::load(&state).await;
    Ok(Json(PageResponse {
        page: page.page,
        results: ctx.cards(page.results),
        total_pages: page.total_pages,
        total_results: page.total_results,
    }))
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Release years the catalog filter accepts.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1800..=9999;

/// Raw filter inputs. Empty strings mean "not set", the way form fields arrive.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub genres: Option<String>,
    pub sort_by: Option<String>,
    pub year_from: Option<String>,
    pub year_to: Option<String>,
    pub rating_min: Option<String>,
    pub page: Option<u32>,
}

fn set(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_field<T: std::str::FromStr>(
    name: &str,
    value: &Option<String>,
) -> Result<Option<T>, ApiError> {
    set(value)
        .map(|v| {
            v.parse()
                .map_err(|_| ApiError::BadRequest(format!("invalid {name}: {v}")))
        })
        .transpose()
}

impl CatalogQuery {
    pub fn filters(&self) -> Result<DiscoverFilters, ApiError> {
        let genres = match set(&self.genres) {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(|g| {
                    g.parse()
                        .map_err(|_| ApiError::BadRequest(format!("invalid genre id: {g}")))
                })
                .collect::<Result<Vec<u64>, _>>()?,
            None => Vec::new(),
        };

        let sort_by = match set(&self.sort_by) {
            Some(s) => SortKey::parse(s)
                .ok_or_else(|| ApiError::BadRequest(format!("unknown sort order: {s}")))?,
            None => SortKey::default(),
        };

        let year_from: Option<i32> = parse_field("year_from", &self.year_from)?;
        let year_to: Option<i32> = parse_field("year_to", &self.year_to)?;
        for (name, year) in [("year_from", year_from), ("year_to", year_to)] {
            if let Some(year) = year.filter(|y| !YEAR_RANGE.contains(y)) {
                return Err(ApiError::BadRequest(format!(
                    "{name} must be between {} and {}, got {year}",
                    YEAR_RANGE.start(),
                    YEAR_RANGE.end()
                )));
            }
        }
        if let (Some(from), Some(to)) = (year_from, year_to) {
            if from > to {
                return Err(ApiError::BadRequest(format!(
                    "year_from {from} is after year_to {to}"
                )));
            }
        }

        let rating_min: f64 = parse_field("rating_min", &self.rating_min)?.unwrap_or(0.0);
        if !(0.0..=10.0).contains(&rating_min) {
            return Err(ApiError::BadRequest(format!(
                "rating_min must be between 0 and 10, got {rating_min}"
            )));
        }

        Ok(DiscoverFilters {
            genres,
            sort_by,
            year_from,
            year_to,
            rating_min,
        })
    }
}

#[derive(Serialize)]
struct CatalogResponse {
    items: Vec<Card>,
    page: u32,
    total_pages: u32,
    total_results: u64,
    pager: Vec<PagerEntry>,
    /// Items on this page.
    showing: usize,
    /// Items gathered across all fetched upstream pages.
    of: usize,
    partial: bool,
    filters: DiscoverFilters,
}

async fn catalog(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogResponse>, AppError> {
    let kind = parse_kind(&kind)?;
    let filters = query.filters()?;

    let results =
        fetch_catalog(state.provider.as_ref(), kind, &filters, DEFAULT_MAX_PAGES).await?;
    let paged = paginate(&results.items, query.page.unwrap_or(1), ITEMS_PER_PAGE);

    let ctx = CardContext::load(&state).await;
    Ok(Json(CatalogResponse {
        showing: paged.items.len(),
        of: paged.total_items,
        pager: page_window(paged.page, paged.total_pages),
        items: ctx.cards(paged.items),
        page: paged.page,
        total_pages: paged.total_pages,
        total_results: results.total_results,
        partial: results.partial,
        filters,
    }))
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
    kind: Option<String>,
    page: Option<u32>,
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<PageResponse>, AppError> {
    let q = query.q.trim();
    let page = upstream_page(query.page);
    if q.is_empty() {
        return Ok(Json(PageResponse {
            page,
            results: Vec::new(),
            total_pages: 0,
            total_results: 0,
        }));
    }

    let results = match query.kind.as_deref() {
        None | Some("") | Some("multi") => state.provider.search_multi(q, page).await?,
        Some(kind) => state.provider.search(parse_kind(kind)?, q, page).await?,
    };

    let ctx = CardContext::load(&state).await;
    Ok(Json(PageResponse {
        page: results.page,
        results: ctx.cards(results.results),
        total_pages: results.total_pages,
        total_results: results.total_results,
    }))
}

#[derive(Deserialize)]
struct SuggestQuery {
    #[serde(default)]
    q: String,
    /// Type-ahead box identity; calls in one session supersede each other.
    session: Option<String>,
}

#[derive(Serialize)]
struct SuggestResponse {
    /// A newer request in the same session replaced this one.
    superseded: bool,
    results: Vec<Card>,
}

async fn suggest(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Result<Json<SuggestResponse>, AppError> {
    let debouncer = state.debouncer(query.session.as_deref().filter(|s| !s.is_empty()));
    let outcome = debouncer
        .run(|| quick_search(state.provider.as_ref(), &query.q))
        .await;

    let Some(results) = outcome else {
        return Ok(Json(SuggestResponse {
            superseded: true,
            results: Vec::new(),
        }));
    };

    let ctx = CardContext::load(&state).await;
    Ok(Json(SuggestResponse {
        superseded: false,
        results: ctx.cards(results?),
    }))
}

// ---------------------------------------------------------------------------
// Favorites
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct FavoriteEntry {
    #[serde(flatten)]
    favorite: Favorite,
    rating: String,
}

#[derive(Serialize)]
struct FavoritesResponse {
    count: usize,
    items: Vec<FavoriteEntry>,
}

#[derive(Serialize)]
struct FavoriteStatus {
    favorite: bool,
}

/// Fill derived fields a client may have left out.
fn normalize(mut item: MediaSummary) -> MediaSummary {
    if item.year.is_none() {
        item.year = item.release_date.as_deref().and_then(year_from_date);
    }
    if item.poster_url.is_none() {
        item.poster_url = Some(poster_url(item.poster_path.as_deref(), ImageSize::W500));
    }
    item
}

async fn list_favorites(State(state): State<AppState>) -> Json<FavoritesResponse> {
    let items: Vec<FavoriteEntry> = state
        .favorites
        .list()
        .await
        .into_iter()
        .map(|favorite| FavoriteEntry {
            rating: format_rating(favorite.item.vote_average),
            favorite,
        })
        .collect();

    Json(FavoritesResponse {
        count: items.len(),
        items,
    })
}

async fn add_favorite(
    State(state): State<AppState>,
    Json(item): Json<MediaSummary>,
) -> (StatusCode, Json<Favorite>) {
    let (favorite, added) = state.favorites.add(normalize(item)).await;
    let status = if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (status, Json(favorite))
}

async fn toggle_favorite(
    State(state): State<AppState>,
    Json(item): Json<MediaSummary>,
) -> Json<FavoriteStatus> {
    let toggled = state.favorites.toggle(normalize(item)).await;
    Json(FavoriteStatus {
        favorite: toggled.is_favorite(),
    })
}

async fn favorite_status(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, u64)>,
) -> Result<Json<FavoriteStatus>, AppError> {
    let kind = parse_kind(&kind)?;
    Ok(Json(FavoriteStatus {
        favorite: state.favorites.contains(kind, id).await,
    }))
}

async fn remove_favorite(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, u64)>,
) -> Result<StatusCode, AppError> {
    let kind = parse_kind(&kind)?;
    state
        .favorites
        .remove(kind, id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("{kind} {id} is not a favorite")))?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> CatalogQuery {
        let mut q = CatalogQuery::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "genres" => q.genres = v,
                "sort_by" => q.sort_by = v,
                "year_from" => q.year_from = v,
                "year_to" => q.year_to = v,
                "rating_min" => q.rating_min = v,
                _ => unreachable!(),
            }
        }
        q
    }

    #[test]
    fn empty_fields_mean_no_filters() {
        let filters = query(&[("genres", ""), ("year_from", " "), ("rating_min", "")])
            .filters()
            .unwrap();
        assert!(!filters.has_filters());
    }

    #[test]
    fn filters_parse_from_form_values() {
        let filters = query(&[
            ("genres", "28, 12"),
            ("sort_by", "vote_average.desc"),
            ("year_from", "1990"),
            ("year_to", "1999"),
            ("rating_min", "7.5"),
        ])
        .filters()
        .unwrap();
        assert_eq!(filters.genres, vec![28, 12]);
        assert_eq!(filters.sort_by, SortKey::RatingDesc);
        assert_eq!(filters.year_from, Some(1990));
        assert_eq!(filters.year_to, Some(1999));
        assert_eq!(filters.rating_min, 7.5);
    }

    #[test]
    fn inverted_year_range_is_rejected() {
        let err = query(&[("year_from", "2010"), ("year_to", "2000")])
            .filters()
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(query(&[("genres", "action")]).filters().is_err());
        assert!(query(&[("sort_by", "revenue.desc")]).filters().is_err());
        assert!(query(&[("rating_min", "11")]).filters().is_err());
        assert!(query(&[("year_to", "soon")]).filters().is_err());
        assert!(query(&[("year_from", "-5")]).filters().is_err());
        assert!(query(&[("year_to", "99999")]).filters().is_err());
    }

    #[test]
    fn normalize_fills_year_and_poster() {
        let item: MediaSummary = serde_json::from_value(serde_json::json!({
            "id": 1,
            "media_type": "movie",
            "release_date": "1999-03-31",
            "poster_path": "/x.jpg",
        }))
        .unwrap();
        let item = normalize(item);
        assert_eq!(item.year, Some(1999));
        assert_eq!(
            item.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/x.jpg")
        );
    }
}
