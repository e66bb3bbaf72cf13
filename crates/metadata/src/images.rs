//! Image URL construction from upstream file paths and size tokens.

use serde::{Deserialize, Serialize};

pub const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

const POSTER_PLACEHOLDER: &str = "https://via.placeholder.com/500x750?text=No+Image";
const BACKDROP_PLACEHOLDER: &str = "https://via.placeholder.com/1280x720?text=No+Image";
const PROFILE_PLACEHOLDER: &str = "https://via.placeholder.com/185x278?text=No+Photo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    W45,
    W185,
    W200,
    W300,
    W500,
    W780,
    W1280,
    H632,
    Original,
}

impl ImageSize {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::W45 => "w45",
            Self::W185 => "w185",
            Self::W200 => "w200",
            Self::W300 => "w300",
            Self::W500 => "w500",
            Self::W780 => "w780",
            Self::W1280 => "w1280",
            Self::H632 => "h632",
            Self::Original => "original",
        }
    }
}

pub fn image_url(path: &str, size: ImageSize) -> String {
    format!("{IMAGE_BASE}/{}{path}", size.as_str())
}

fn or_placeholder(path: Option<&str>, size: ImageSize, placeholder: &str) -> String {
    match path {
        Some(p) if !p.is_empty() => image_url(p, size),
        _ => placeholder.to_string(),
    }
}

pub fn poster_url(path: Option<&str>, size: ImageSize) -> String {
    or_placeholder(path, size, POSTER_PLACEHOLDER)
}

pub fn backdrop_url(path: Option<&str>, size: ImageSize) -> String {
    or_placeholder(path, size, BACKDROP_PLACEHOLDER)
}

pub fn profile_url(path: Option<&str>, size: ImageSize) -> String {
    or_placeholder(path, size, PROFILE_PLACEHOLDER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_sized_urls() {
        assert_eq!(
            image_url("/abc.jpg", ImageSize::W500),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
        assert_eq!(
            backdrop_url(Some("/bd.jpg"), ImageSize::Original),
            "https://image.tmdb.org/t/p/original/bd.jpg"
        );
    }

    #[test]
    fn missing_paths_fall_back_to_placeholders() {
        assert!(poster_url(None, ImageSize::W500).contains("500x750"));
        assert!(poster_url(Some(""), ImageSize::W500).contains("500x750"));
        assert!(backdrop_url(None, ImageSize::W1280).contains("1280x720"));
        assert!(profile_url(None, ImageSize::W185).contains("185x278"));
    }

    #[test]
    fn size_tokens_deserialize_from_wire_form() {
        let size: ImageSize = serde_json::from_str("\"h632\"").unwrap();
        assert_eq!(size, ImageSize::H632);
    }
}
