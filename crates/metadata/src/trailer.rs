//! Picks the video to play as a title's trailer.

use cinemax_core::types::Video;

const YOUTUBE: &str = "YouTube";

fn matches_language(video: &Video, language: &str) -> bool {
    let Some(lang) = video.iso_639_1.as_deref() else {
        return false;
    };
    let primary = language.split('-').next().unwrap_or(language);
    lang.eq_ignore_ascii_case(primary) || lang.eq_ignore_ascii_case(language)
}

fn is_official_trailer(video: &Video) -> bool {
    video.site == YOUTUBE && video.kind == "Trailer" && video.official
}

/// Preference order:
/// 1. official YouTube trailer in `language`
/// 2. any YouTube video in `language`
/// 3. official YouTube trailer in English
/// 4. any official YouTube trailer
/// 5. the first video
pub fn pick_trailer<'a>(videos: &'a [Video], language: &str) -> Option<&'a Video> {
    videos
        .iter()
        .find(|v| is_official_trailer(v) && matches_language(v, language))
        .or_else(|| {
            videos
                .iter()
                .find(|v| v.site == YOUTUBE && matches_language(v, language))
        })
        .or_else(|| {
            videos
                .iter()
                .find(|v| is_official_trailer(v) && matches_language(v, "en"))
        })
        .or_else(|| videos.iter().find(|v| is_official_trailer(v)))
        .or_else(|| videos.first())
}

pub fn trailer_key(videos: &[Video], language: &str) -> Option<String> {
    pick_trailer(videos, language).map(|v| v.key.clone())
}
