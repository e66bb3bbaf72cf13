use serde::{Deserialize, Serialize};

/// Which upstream catalog an item belongs to. Ids are only unique within one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "movie" => Some(Self::Movie),
            "tv" => Some(Self::Tv),
            _ => None,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trending time window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    Day,
    #[default]
    Week,
}

impl TimeWindow {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "day" => Some(Self::Day),
            "week" => Some(Self::Week),
            _ => None,
        }
    }
}

/// Curated upstream listings. Some only exist for one media kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Listing {
    Popular,
    TopRated,
    Upcoming,
    NowPlaying,
    OnTheAir,
    AiringToday,
}

impl Listing {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Popular => "popular",
            Self::TopRated => "top_rated",
            Self::Upcoming => "upcoming",
            Self::NowPlaying => "now_playing",
            Self::OnTheAir => "on_the_air",
            Self::AiringToday => "airing_today",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [
            Self::Popular,
            Self::TopRated,
            Self::Upcoming,
            Self::NowPlaying,
            Self::OnTheAir,
            Self::AiringToday,
        ]
        .into_iter()
        .find(|l| l.as_str() == s)
    }

    pub fn supports(self, kind: MediaKind) -> bool {
        match self {
            Self::Popular | Self::TopRated => true,
            Self::Upcoming | Self::NowPlaying => kind == MediaKind::Movie,
            Self::OnTheAir | Self::AiringToday => kind == MediaKind::Tv,
        }
    }
}

impl std::fmt::Display for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Card-level data shared by movies and shows.
///
/// Movies report `title`/`release_date`, shows report `name`/`first_air_date`;
/// both are normalized into the same fields here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSummary {
    pub id: u64,
    pub media_type: MediaKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub poster_url: Option<String>,
}

/// Upstream paging envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub page: u32,
    pub results: Vec<T>,
    pub total_pages: u32,
    pub total_results: u64,
}

impl<T> Page<T> {
    pub fn empty(page: u32) -> Self {
        Self {
            page,
            results: Vec::new(),
            total_pages: 0,
            total_results: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creator {
    pub id: u64,
    pub name: String,
    pub profile_path: Option<String>,
}

/// Full record behind the details overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDetails {
    #[serde(flatten)]
    pub summary: MediaSummary,
    pub genres: Vec<Genre>,
    pub runtime_minutes: Option<u32>,
    pub runtime_label: String,
    pub status: Option<String>,
    pub tagline: Option<String>,
    pub homepage: Option<String>,
    pub imdb_id: Option<String>,
    pub production_companies: Vec<String>,
    pub number_of_seasons: Option<u32>,
    pub number_of_episodes: Option<u32>,
    pub created_by: Vec<Creator>,
    pub backdrop_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
    pub profile_url: Option<String>,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: u64,
    pub name: String,
    pub job: String,
    pub department: String,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credits {
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
}

impl Credits {
    /// First crew member credited as director.
    pub fn director(&self) -> Option<&CrewMember> {
        self.crew.iter().find(|c| c.job == "Director")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub key: String,
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub official: bool,
    pub iso_639_1: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_kind_round_trips_through_str() {
        for kind in [MediaKind::Movie, MediaKind::Tv] {
            assert_eq!(MediaKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(MediaKind::parse("series"), None);
    }

    #[test]
    fn listing_support_depends_on_kind() {
        assert!(Listing::Popular.supports(MediaKind::Tv));
        assert!(Listing::Upcoming.supports(MediaKind::Movie));
        assert!(!Listing::Upcoming.supports(MediaKind::Tv));
        assert!(!Listing::AiringToday.supports(MediaKind::Movie));
    }

    #[test]
    fn listing_and_window_parse_path_segments() {
        assert_eq!(Listing::parse("now_playing"), Some(Listing::NowPlaying));
        assert_eq!(Listing::parse("latest"), None);
        assert_eq!(TimeWindow::parse("day"), Some(TimeWindow::Day));
        assert_eq!(TimeWindow::parse("month"), None);
    }

    #[test]
    fn summary_deserializes_with_missing_optional_fields() {
        let item: MediaSummary =
            serde_json::from_value(serde_json::json!({ "id": 7, "media_type": "tv" })).unwrap();
        assert_eq!(item.media_type, MediaKind::Tv);
        assert!(item.title.is_empty());
        assert!(item.genre_ids.is_empty());
    }
}
