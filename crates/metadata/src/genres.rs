//! Genre id to name lookup for both catalogs.

use cinemax_core::types::{Genre, MediaKind};
use serde::Serialize;

use crate::MetadataError;
use crate::provider::CatalogProvider;

pub const NO_GENRE_LABEL: &str = "No genre";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenreCatalog {
    pub movie: Vec<Genre>,
    pub tv: Vec<Genre>,
}

impl GenreCatalog {
    /// Fetch both genre lists concurrently.
    pub async fn load(provider: &dyn CatalogProvider) -> Result<Self, MetadataError> {
        let (movie, tv) = tokio::try_join!(
            provider.genres(MediaKind::Movie),
            provider.genres(MediaKind::Tv)
        )?;
        Ok(Self { movie, tv })
    }

    pub fn for_kind(&self, kind: MediaKind) -> &[Genre] {
        match kind {
            MediaKind::Movie => &self.movie,
            MediaKind::Tv => &self.tv,
        }
    }

    /// Names for `ids` in order. Ids missing from the list are skipped.
    pub fn names(&self, ids: &[u64], kind: MediaKind) -> Vec<String> {
        let genres = self.for_kind(kind);
        ids.iter()
            .filter_map(|id| genres.iter().find(|g| g.id == *id))
            .map(|g| g.name.clone())
            .collect()
    }

    pub fn label(&self, ids: &[u64], kind: MediaKind) -> String {
        let names = self.names(ids, kind);
        if names.is_empty() {
            NO_GENRE_LABEL.to_string()
        } else {
            names.join(", ")
        }
    }
}
