//! Display helpers shared by list and detail views.

/// Year from an upstream `YYYY-MM-DD` date. Empty or malformed dates yield `None`.
pub fn year_from_date(date: &str) -> Option<i32> {
    date.get(..4).and_then(|y| y.parse().ok())
}

/// Runtime label in the form `2h 28min`, `45min`, or `N/A` when unknown or zero.
pub fn format_runtime(minutes: Option<u32>) -> String {
    match minutes {
        None | Some(0) => "N/A".to_string(),
        Some(m) if m >= 60 => format!("{}h {}min", m / 60, m % 60),
        Some(m) => format!("{m}min"),
    }
}

/// One decimal place, as shown on rating badges.
pub fn format_rating(vote_average: f64) -> String {
    format!("{vote_average:.1}")
}
