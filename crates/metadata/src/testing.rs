//! In-memory provider for unit tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use cinemax_core::format::format_runtime;
use cinemax_core::types::{
    Credits, Genre, Listing, MediaDetails, MediaKind, MediaSummary, Page, TimeWindow, Video,
};

use crate::MetadataError;
use crate::provider::CatalogProvider;

pub fn summary(kind: MediaKind, id: u64) -> MediaSummary {
    MediaSummary {
        id,
        media_type: kind,
        title: format!("{kind} #{id}"),
        original_title: String::new(),
        overview: String::new(),
        poster_path: None,
        backdrop_path: None,
        release_date: Some("2020-01-01".into()),
        vote_average: 7.0,
        vote_count: 100,
        genre_ids: vec![18],
        popularity: 10.0,
        original_language: "en".into(),
        year: Some(2020),
        poster_url: None,
    }
}

pub struct StubProvider {
    kind: MediaKind,
    total_pages: u32,
    per_page: u64,
    fail_page: Option<u32>,
    pub videos: Vec<Video>,
    discover_calls: AtomicUsize,
    search_calls: AtomicUsize,
    last_params: Mutex<Vec<(String, String)>>,
}

impl StubProvider {
    pub fn with_pages(kind: MediaKind, total_pages: u32, per_page: u64) -> Self {
        Self {
            kind,
            total_pages,
            per_page,
            fail_page: None,
            videos: Vec::new(),
            discover_calls: AtomicUsize::new(0),
            search_calls: AtomicUsize::new(0),
            last_params: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, page: u32) -> Self {
        self.fail_page = Some(page);
        self
    }

    pub fn discover_calls(&self) -> usize {
        self.discover_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn last_discover_params(&self) -> Vec<(String, String)> {
        self.last_params.lock().unwrap().clone()
    }

    fn page(&self, page: u32) -> Result<Page<MediaSummary>, MetadataError> {
        if self.fail_page == Some(page) {
            return Err(MetadataError::Provider(format!("page {page} unavailable")));
        }
        if page > self.total_pages {
            return Ok(Page::empty(page));
        }
        let first = u64::from(page - 1) * self.per_page + 1;
        Ok(Page {
            page,
            results: (first..first + self.per_page)
                .map(|id| summary(self.kind, id))
                .collect(),
            total_pages: self.total_pages,
            total_results: u64::from(self.total_pages) * self.per_page,
        })
    }
}

#[async_trait::async_trait]
impl CatalogProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn trending(
        &self,
        _kind: MediaKind,
        _window: TimeWindow,
    ) -> Result<Vec<MediaSummary>, MetadataError> {
        Ok(self.page(1)?.results)
    }

    async fn listing(
        &self,
        _kind: MediaKind,
        _listing: Listing,
        page: u32,
    ) -> Result<Page<MediaSummary>, MetadataError> {
        self.page(page)
    }

    async fn search(
        &self,
        _kind: MediaKind,
        _query: &str,
        page: u32,
    ) -> Result<Page<MediaSummary>, MetadataError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.page(page)
    }

    async fn search_multi(
        &self,
        _query: &str,
        page: u32,
    ) -> Result<Page<MediaSummary>, MetadataError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.page(page)
    }

    async fn discover(
        &self,
        _kind: MediaKind,
        params: &[(String, String)],
        page: u32,
    ) -> Result<Page<MediaSummary>, MetadataError> {
        self.discover_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_params.lock().unwrap() = params.to_vec();
        self.page(page)
    }

    async fn details(&self, kind: MediaKind, id: u64) -> Result<MediaDetails, MetadataError> {
        Ok(MediaDetails {
            summary: summary(kind, id),
            genres: Vec::new(),
            runtime_minutes: Some(100),
            runtime_label: format_runtime(Some(100)),
            status: None,
            tagline: None,
            homepage: None,
            imdb_id: None,
            production_companies: Vec::new(),
            number_of_seasons: None,
            number_of_episodes: None,
            created_by: Vec::new(),
            backdrop_url: None,
        })
    }

    async fn credits(&self, _kind: MediaKind, _id: u64) -> Result<Credits, MetadataError> {
        Ok(Credits::default())
    }

    async fn videos(&self, _kind: MediaKind, _id: u64) -> Result<Vec<Video>, MetadataError> {
        Ok(self.videos.clone())
    }

    async fn genres(&self, kind: MediaKind) -> Result<Vec<Genre>, MetadataError> {
        let genres = match kind {
            MediaKind::Movie => vec![(28, "Action"), (35, "Comedy"), (18, "Drama")],
            MediaKind::Tv => vec![(18, "Drama"), (10765, "Sci-Fi & Fantasy")],
        };
        Ok(genres
            .into_iter()
            .map(|(id, name)| Genre {
                id,
                name: name.to_string(),
            })
            .collect())
    }
}
