use cinemax_core::types::{
    Credits, Genre, Listing, MediaDetails, MediaKind, MediaSummary, Page, TimeWindow, Video,
};

use crate::MetadataError;

/// Read-only view of an upstream media catalog.
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Trending items for a time window (first upstream page).
    async fn trending(
        &self,
        kind: MediaKind,
        window: TimeWindow,
    ) -> Result<Vec<MediaSummary>, MetadataError>;

    /// A curated listing such as popular or top rated.
    async fn listing(
        &self,
        kind: MediaKind,
        listing: Listing,
        page: u32,
    ) -> Result<Page<MediaSummary>, MetadataError>;

    async fn search(
        &self,
        kind: MediaKind,
        query: &str,
        page: u32,
    ) -> Result<Page<MediaSummary>, MetadataError>;

    /// Search movies and shows at once. People are not returned.
    async fn search_multi(&self, query: &str, page: u32)
    -> Result<Page<MediaSummary>, MetadataError>;

    /// Discovery with raw query parameters, see [`crate::discover::DiscoverFilters::to_query`].
    async fn discover(
        &self,
        kind: MediaKind,
        params: &[(String, String)],
        page: u32,
    ) -> Result<Page<MediaSummary>, MetadataError>;

    async fn details(&self, kind: MediaKind, id: u64) -> Result<MediaDetails, MetadataError>;

    async fn credits(&self, kind: MediaKind, id: u64) -> Result<Credits, MetadataError>;

    async fn videos(&self, kind: MediaKind, id: u64) -> Result<Vec<Video>, MetadataError>;

    async fn genres(&self, kind: MediaKind) -> Result<Vec<Genre>, MetadataError>;
}
