pub mod discover;
pub mod genres;
pub mod images;
pub mod provider;
pub mod search;
pub mod tmdb;
pub mod trailer;

#[cfg(test)]
mod testing;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("provider error: {0}")]
    Provider(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("not found")]
    NotFound,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
