//! Runtime configuration read from the environment once at startup.

use cinemax_metadata::tmdb::DEFAULT_LANGUAGE;

pub const DEFAULT_DB_PATH: &str = "cinemax.db";
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Empty when unset; upstream calls will then fail with 401s.
    pub tmdb_api_key: String,
    pub tmdb_base_url: Option<String>,
    pub language: String,
    pub db_path: String,
    pub bind_addr: String,
    pub log_format: LogFormat,
    /// `None` allows any origin.
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            tmdb_api_key: get("TMDB_API_KEY").unwrap_or_default(),
            tmdb_base_url: get("CINEMAX_TMDB_BASE_URL"),
            language: get("CINEMAX_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            db_path: get("CINEMAX_DB").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            bind_addr: get("CINEMAX_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            log_format: match get("CINEMAX_LOG_FORMAT").as_deref() {
                Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
                _ => LogFormat::Text,
            },
            cors_origin: get("CINEMAX_CORS_ORIGIN").filter(|o| o != "*"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = config(&[]);
        assert!(cfg.tmdb_api_key.is_empty());
        assert_eq!(cfg.language, "pt-BR");
        assert_eq!(cfg.db_path, DEFAULT_DB_PATH);
        assert_eq!(cfg.bind_addr, DEFAULT_BIND);
        assert_eq!(cfg.log_format, LogFormat::Text);
        assert_eq!(cfg.cors_origin, None);
    }

    #[test]
    fn values_are_read_from_environment() {
        let cfg = config(&[
            ("TMDB_API_KEY", "k"),
            ("CINEMAX_LANGUAGE", "en-US"),
            ("CINEMAX_LOG_FORMAT", "JSON"),
            ("CINEMAX_CORS_ORIGIN", "http://localhost:3000"),
            ("CINEMAX_TMDB_BASE_URL", "  "),
        ]);
        assert_eq!(cfg.tmdb_api_key, "k");
        assert_eq!(cfg.language, "en-US");
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.cors_origin.as_deref(), Some("http://localhost:3000"));
        assert_eq!(cfg.tmdb_base_url, None);
    }

    #[test]
    fn wildcard_origin_means_any() {
        assert_eq!(config(&[("CINEMAX_CORS_ORIGIN", "*")]).cors_origin, None);
    }
}
