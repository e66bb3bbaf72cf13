//! Catalog discovery: user filters to upstream query parameters, and bulk
//! retrieval of several upstream pages for client-side paging.

use cinemax_core::types::{Listing, MediaKind, MediaSummary, Page};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::MetadataError;
use crate::provider::CatalogProvider;

/// Upstream pages fetched per catalog load.
pub const DEFAULT_MAX_PAGES: u32 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    #[serde(rename = "popularity.desc")]
    PopularityDesc,
    #[serde(rename = "popularity.asc")]
    PopularityAsc,
    #[serde(rename = "vote_average.desc")]
    RatingDesc,
    #[serde(rename = "vote_average.asc")]
    RatingAsc,
    #[serde(rename = "release_date.desc")]
    ReleaseDesc,
    #[serde(rename = "release_date.asc")]
    ReleaseAsc,
    #[serde(rename = "title.asc")]
    TitleAsc,
    #[serde(rename = "title.desc")]
    TitleDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 8] = [
        Self::PopularityDesc,
        Self::PopularityAsc,
        Self::RatingDesc,
        Self::RatingAsc,
        Self::ReleaseDesc,
        Self::ReleaseAsc,
        Self::TitleAsc,
        Self::TitleDesc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PopularityDesc => "popularity.desc",
            Self::PopularityAsc => "popularity.asc",
            Self::RatingDesc => "vote_average.desc",
            Self::RatingAsc => "vote_average.asc",
            Self::ReleaseDesc => "release_date.desc",
            Self::ReleaseAsc => "release_date.asc",
            Self::TitleAsc => "title.asc",
            Self::TitleDesc => "title.desc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    /// Upstream spelling. Shows sort on `first_air_date` and `name` instead.
    pub fn wire(self, kind: MediaKind) -> &'static str {
        match (kind, self) {
            (MediaKind::Tv, Self::ReleaseDesc) => "first_air_date.desc",
            (MediaKind::Tv, Self::ReleaseAsc) => "first_air_date.asc",
            (MediaKind::Tv, Self::TitleAsc) => "name.asc",
            (MediaKind::Tv, Self::TitleDesc) => "name.desc",
            (MediaKind::Movie, Self::ReleaseDesc) => "primary_release_date.desc",
            (MediaKind::Movie, Self::ReleaseAsc) => "primary_release_date.asc",
            (_, key) => key.as_str(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoverFilters {
    #[serde(default)]
    pub genres: Vec<u64>,
    #[serde(default)]
    pub sort_by: SortKey,
    #[serde(default)]
    pub year_from: Option<i32>,
    #[serde(default)]
    pub year_to: Option<i32>,
    #[serde(default)]
    pub rating_min: f64,
}

impl DiscoverFilters {
    /// Whether anything differs from the unfiltered popular listing.
    pub fn has_filters(&self) -> bool {
        !self.genres.is_empty()
            || self.year_from.is_some()
            || self.year_to.is_some()
            || self.rating_min > 0.0
            || self.sort_by != SortKey::default()
    }

    pub fn to_query(&self, kind: MediaKind) -> Vec<(String, String)> {
        let date_key = match kind {
            MediaKind::Movie => "primary_release_date",
            MediaKind::Tv => "first_air_date",
        };

        let mut params = vec![("sort_by".to_string(), self.sort_by.wire(kind).to_string())];

        if !self.genres.is_empty() {
            let ids: Vec<String> = self.genres.iter().map(u64::to_string).collect();
            params.push(("with_genres".to_string(), ids.join(",")));
        }
        if let Some(from) = self.year_from {
            params.push((format!("{date_key}.gte"), format!("{from:04}-01-01")));
        }
        if let Some(to) = self.year_to {
            params.push((format!("{date_key}.lte"), format!("{to:04}-12-31")));
        }
        if self.rating_min > 0.0 {
            params.push(("vote_average.gte".to_string(), self.rating_min.to_string()));
        }

        params
    }
}

/// Everything gathered for one catalog load, in upstream order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogResults {
    pub items: Vec<MediaSummary>,
    pub total_results: u64,
    /// A page failed mid-way and the remaining pages were not fetched.
    pub partial: bool,
}

/// Load up to `max_pages` upstream pages for the catalog grid.
///
/// Unfiltered loads fetch the popular listing concurrently and fail as a
/// whole. Filtered loads walk discovery pages in order, stop at the last
/// upstream page, and keep what they have if a page fails.
pub async fn fetch_catalog(
    provider: &dyn CatalogProvider,
    kind: MediaKind,
    filters: &DiscoverFilters,
    max_pages: u32,
) -> Result<CatalogResults, MetadataError> {
    if !filters.has_filters() {
        return fetch_popular(provider, kind, max_pages).await;
    }

    let params = filters.to_query(kind);
    let mut items = Vec::new();
    let mut total_results = 0;
    let mut partial = false;

    for page in 1..=max_pages {
        match provider.discover(kind, &params, page).await {
            Ok(data) => {
                total_results = data.total_results;
                let last = page >= data.total_pages;
                items.extend(data.results);
                if last {
                    break;
                }
            }
            Err(e) => {
                warn!(%kind, page, error = %e, "discover page failed, keeping earlier pages");
                partial = true;
                break;
            }
        }
    }

    debug!(%kind, items = items.len(), total_results, "catalog loaded");
    Ok(CatalogResults {
        items,
        total_results,
        partial,
    })
}

async fn fetch_popular(
    provider: &dyn CatalogProvider,
    kind: MediaKind,
    max_pages: u32,
) -> Result<CatalogResults, MetadataError> {
    let pages = try_join_all(
        (1..=max_pages).map(|page| provider.listing(kind, Listing::Popular, page)),
    )
    .await?;

    let total_results = pages.first().map(|p| p.total_results).unwrap_or(0);
    let items = pages.into_iter().flat_map(|p| p.results).collect();
    Ok(CatalogResults {
        items,
        total_results,
        partial: false,
    })
}

/// One discovery page for a single genre, most popular first.
pub async fn discover_by_genre(
    provider: &dyn CatalogProvider,
    kind: MediaKind,
    genre_id: u64,
    page: u32,
) -> Result<Page<MediaSummary>, MetadataError> {
    let filters = DiscoverFilters {
        genres: vec![genre_id],
        ..Default::default()
    };
    provider.discover(kind, &filters.to_query(kind), page).await
}
