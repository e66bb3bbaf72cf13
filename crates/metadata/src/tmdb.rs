//! TMDB (The Movie Database) catalog client.
//!
//! Uses TMDB API v3: https://developer.themoviedb.org/docs

use cinemax_core::format::{format_runtime, year_from_date};
use cinemax_core::types::{
    CastMember, Creator, Credits, CrewMember, Genre, Listing, MediaDetails, MediaKind,
    MediaSummary, Page, TimeWindow, Video,
};
use serde_json::Value;
use tracing::debug;

use crate::MetadataError;
use crate::images::{self, ImageSize};
use crate::provider::CatalogProvider;

pub const BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_LANGUAGE: &str = "pt-BR";

pub struct TmdbClient {
    api_key: String,
    language: String,
    base_url: String,
    client: reqwest::Client,
}

impl TmdbClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            language: DEFAULT_LANGUAGE.to_string(),
            base_url: BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    async fn get_json(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, MetadataError> {
        let mut all_params = vec![
            ("api_key", self.api_key.as_str()),
            ("language", self.language.as_str()),
        ];
        all_params.extend_from_slice(params);

        let url = format!("{}{path}", self.base_url);
        debug!(url = %url, "TMDB request");

        let resp = self
            .client
            .get(&url)
            .query(&all_params)
            .send()
            .await
            .map_err(|e| MetadataError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(MetadataError::NotFound);
        }

        if !resp.status().is_success() {
            return Err(MetadataError::Provider(format!(
                "TMDB returned {}",
                resp.status()
            )));
        }

        resp.json()
            .await
            .map_err(|e| MetadataError::Provider(format!("parse JSON: {e}")))
    }

    async fn get_page(
        &self,
        path: &str,
        kind: Option<MediaKind>,
        params: &[(&str, &str)],
    ) -> Result<Page<MediaSummary>, MetadataError> {
        let data = self.get_json(path, params).await?;
        Ok(parse_page(&data, kind))
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbClient {
    fn name(&self) -> &str {
        "tmdb"
    }

    async fn trending(
        &self,
        kind: MediaKind,
        window: TimeWindow,
    ) -> Result<Vec<MediaSummary>, MetadataError> {
        let path = format!("/trending/{kind}/{}", window.as_str());
        Ok(self.get_page(&path, Some(kind), &[]).await?.results)
    }

    async fn listing(
        &self,
        kind: MediaKind,
        listing: Listing,
        page: u32,
    ) -> Result<Page<MediaSummary>, MetadataError> {
        if !listing.supports(kind) {
            return Err(MetadataError::InvalidRequest(format!(
                "listing {listing} is not available for {kind}"
            )));
        }
        let page = page.to_string();
        self.get_page(&format!("/{kind}/{listing}"), Some(kind), &[("page", page.as_str())])
            .await
    }

    async fn search(
        &self,
        kind: MediaKind,
        query: &str,
        page: u32,
    ) -> Result<Page<MediaSummary>, MetadataError> {
        let page = page.to_string();
        self.get_page(
            &format!("/search/{kind}"),
            Some(kind),
            &[("query", query), ("page", page.as_str())],
        )
        .await
    }

    async fn search_multi(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Page<MediaSummary>, MetadataError> {
        let page = page.to_string();
        self.get_page("/search/multi", None, &[("query", query), ("page", page.as_str())])
            .await
    }

    async fn discover(
        &self,
        kind: MediaKind,
        params: &[(String, String)],
        page: u32,
    ) -> Result<Page<MediaSummary>, MetadataError> {
        let page = page.to_string();
        let mut query: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        query.push(("page", page.as_str()));
        self.get_page(&format!("/discover/{kind}"), Some(kind), &query)
            .await
    }

    async fn details(&self, kind: MediaKind, id: u64) -> Result<MediaDetails, MetadataError> {
        let data = self.get_json(&format!("/{kind}/{id}"), &[]).await?;
        Ok(parse_details(&data, kind))
    }

    async fn credits(&self, kind: MediaKind, id: u64) -> Result<Credits, MetadataError> {
        let data = self.get_json(&format!("/{kind}/{id}/credits"), &[]).await?;
        Ok(parse_credits(&data))
    }

    async fn videos(&self, kind: MediaKind, id: u64) -> Result<Vec<Video>, MetadataError> {
        // Preferred language, English and untagged videos, so the trailer
        // picker has something to fall back to.
        let languages = video_languages(&self.language);
        let data = self
            .get_json(
                &format!("/{kind}/{id}/videos"),
                &[("include_video_language", languages.as_str())],
            )
            .await?;
        Ok(parse_videos(&data))
    }

    async fn genres(&self, kind: MediaKind) -> Result<Vec<Genre>, MetadataError> {
        let data = self.get_json(&format!("/genre/{kind}/list"), &[]).await?;
        Ok(parse_genres(&data))
    }
}

fn video_languages(language: &str) -> String {
    let primary = language.split('-').next().unwrap_or(language);
    format!("{primary},en,null")
}

fn str_field(v: &Value, key: &str) -> Option<String> {
    v[key].as_str().map(|s| s.to_string())
}

fn non_empty(v: &Value, key: &str) -> Option<String> {
    v[key]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn parse_page(data: &Value, kind: Option<MediaKind>) -> Page<MediaSummary> {
    let results = data["results"]
        .as_array()
        .map(|rs| rs.iter().filter_map(|r| parse_summary(r, kind)).collect())
        .unwrap_or_default();

    Page {
        page: data["page"].as_u64().unwrap_or(1) as u32,
        results,
        total_pages: data["total_pages"].as_u64().unwrap_or(0) as u32,
        total_results: data["total_results"].as_u64().unwrap_or(0),
    }
}

/// Normalize a movie or show record. Without a known kind the record's own
/// `media_type` decides, and anything that is neither (people) is dropped.
fn parse_summary(r: &Value, kind: Option<MediaKind>) -> Option<MediaSummary> {
    let kind = match kind {
        Some(k) => k,
        None => r["media_type"].as_str().and_then(MediaKind::parse)?,
    };
    let id = r["id"].as_u64()?;

    let (title_key, original_key, date_key) = match kind {
        MediaKind::Movie => ("title", "original_title", "release_date"),
        MediaKind::Tv => ("name", "original_name", "first_air_date"),
    };
    let release_date = non_empty(r, date_key);
    let poster_path = non_empty(r, "poster_path");

    Some(MediaSummary {
        id,
        media_type: kind,
        title: r[title_key].as_str().unwrap_or("Unknown").to_string(),
        original_title: r[original_key].as_str().unwrap_or_default().to_string(),
        overview: r["overview"].as_str().unwrap_or_default().to_string(),
        poster_url: Some(images::poster_url(poster_path.as_deref(), ImageSize::W500)),
        poster_path,
        backdrop_path: non_empty(r, "backdrop_path"),
        year: release_date.as_deref().and_then(year_from_date),
        release_date,
        vote_average: r["vote_average"].as_f64().unwrap_or(0.0),
        vote_count: r["vote_count"].as_u64().unwrap_or(0),
        genre_ids: r["genre_ids"]
            .as_array()
            .map(|ids| ids.iter().filter_map(Value::as_u64).collect())
            .unwrap_or_default(),
        popularity: r["popularity"].as_f64().unwrap_or(0.0),
        original_language: r["original_language"].as_str().unwrap_or_default().to_string(),
    })
}

fn parse_details(data: &Value, kind: MediaKind) -> MediaDetails {
    let mut summary = parse_summary(data, Some(kind)).unwrap_or_else(|| MediaSummary {
        id: 0,
        media_type: kind,
        title: "Unknown".to_string(),
        original_title: String::new(),
        overview: String::new(),
        poster_path: None,
        backdrop_path: None,
        release_date: None,
        vote_average: 0.0,
        vote_count: 0,
        genre_ids: Vec::new(),
        popularity: 0.0,
        original_language: String::new(),
        year: None,
        poster_url: Some(images::poster_url(None, ImageSize::W500)),
    });

    let genres = parse_genres(data);
    // Detail payloads carry full genre objects instead of `genre_ids`.
    if summary.genre_ids.is_empty() {
        summary.genre_ids = genres.iter().map(|g| g.id).collect();
    }

    let runtime_minutes = match kind {
        MediaKind::Movie => data["runtime"].as_u64(),
        MediaKind::Tv => data["episode_run_time"]
            .as_array()
            .and_then(|a| a.first())
            .and_then(Value::as_u64),
    }
    .map(|m| m as u32);

    MediaDetails {
        genres,
        runtime_label: format_runtime(runtime_minutes),
        runtime_minutes,
        status: non_empty(data, "status"),
        tagline: non_empty(data, "tagline"),
        homepage: non_empty(data, "homepage"),
        imdb_id: non_empty(data, "imdb_id"),
        production_companies: data["production_companies"]
            .as_array()
            .map(|cs| {
                cs.iter()
                    .filter_map(|c| c["name"].as_str().map(|s| s.to_string()))
                    .take(4)
                    .collect()
            })
            .unwrap_or_default(),
        number_of_seasons: data["number_of_seasons"].as_u64().map(|n| n as u32),
        number_of_episodes: data["number_of_episodes"].as_u64().map(|n| n as u32),
        created_by: data["created_by"]
            .as_array()
            .map(|cs| {
                cs.iter()
                    .map(|c| Creator {
                        id: c["id"].as_u64().unwrap_or(0),
                        name: c["name"].as_str().unwrap_or_default().to_string(),
                        profile_path: non_empty(c, "profile_path"),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        backdrop_url: Some(images::backdrop_url(
            summary.backdrop_path.as_deref(),
            ImageSize::Original,
        )),
        summary,
    }
}

fn parse_credits(data: &Value) -> Credits {
    let mut cast: Vec<CastMember> = data["cast"]
        .as_array()
        .map(|cs| {
            cs.iter()
                .map(|p| {
                    let profile_path = non_empty(p, "profile_path");
                    CastMember {
                        id: p["id"].as_u64().unwrap_or(0),
                        name: p["name"].as_str().unwrap_or_default().to_string(),
                        character: non_empty(p, "character"),
                        profile_url: Some(images::profile_url(
                            profile_path.as_deref(),
                            ImageSize::W185,
                        )),
                        profile_path,
                        order: p["order"].as_u64().unwrap_or(u64::from(u32::MAX)) as u32,
                    }
                })
                .collect()
        })
        .unwrap_or_default();
    cast.sort_by_key(|c| c.order);

    let crew = data["crew"]
        .as_array()
        .map(|cs| {
            cs.iter()
                .map(|p| CrewMember {
                    id: p["id"].as_u64().unwrap_or(0),
                    name: p["name"].as_str().unwrap_or_default().to_string(),
                    job: p["job"].as_str().unwrap_or_default().to_string(),
                    department: p["department"].as_str().unwrap_or_default().to_string(),
                    profile_path: non_empty(p, "profile_path"),
                })
                .collect()
        })
        .unwrap_or_default();

    Credits { cast, crew }
}

fn parse_videos(data: &Value) -> Vec<Video> {
    data["results"]
        .as_array()
        .map(|vs| {
            vs.iter()
                .filter_map(|v| {
                    Some(Video {
                        key: v["key"].as_str()?.to_string(),
                        name: v["name"].as_str().unwrap_or_default().to_string(),
                        site: v["site"].as_str().unwrap_or_default().to_string(),
                        kind: v["type"].as_str().unwrap_or_default().to_string(),
                        official: v["official"].as_bool().unwrap_or(false),
                        iso_639_1: str_field(v, "iso_639_1"),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_genres(data: &Value) -> Vec<Genre> {
    data["genres"]
        .as_array()
        .map(|gs| {
            gs.iter()
                .filter_map(|g| {
                    Some(Genre {
                        id: g["id"].as_u64()?,
                        name: g["name"].as_str()?.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}
