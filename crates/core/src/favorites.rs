//! Favorites list semantics.
//!
//! The list is ordered by insertion and keyed by `(media_type, id)`; it never
//! holds two entries with the same key. Persistence lives elsewhere, this type
//! only decides what the list looks like after each operation.

use serde::{Deserialize, Serialize};

use crate::types::{MediaKind, MediaSummary};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    #[serde(flatten)]
    pub item: MediaSummary,
    pub added_ts: i64,
}

impl Favorite {
    pub fn new(item: MediaSummary, added_ts: i64) -> Self {
        Self { item, added_ts }
    }

    pub fn key(&self) -> (MediaKind, u64) {
        (self.item.media_type, self.item.id)
    }
}

/// Outcome of [`Favorites::toggle`].
#[derive(Debug, Clone, PartialEq)]
pub enum Toggled {
    Added(Favorite),
    Removed(Favorite),
}

impl Toggled {
    /// Whether the item is a favorite after the toggle.
    pub fn is_favorite(&self) -> bool {
        matches!(self, Self::Added(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Favorites {
    entries: Vec<Favorite>,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from persisted entries. Repeated keys keep the first occurrence.
    pub fn from_entries(entries: impl IntoIterator<Item = Favorite>) -> Self {
        let mut favorites = Self::new();
        for entry in entries {
            favorites.add(entry);
        }
        favorites
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Favorite> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Favorite] {
        &self.entries
    }

    pub fn contains(&self, kind: MediaKind, id: u64) -> bool {
        self.position(kind, id).is_some()
    }

    pub fn get(&self, kind: MediaKind, id: u64) -> Option<&Favorite> {
        self.position(kind, id).map(|i| &self.entries[i])
    }

    /// Append unless the key is already present. Returns `true` if added.
    pub fn add(&mut self, favorite: Favorite) -> bool {
        let (kind, id) = favorite.key();
        if self.contains(kind, id) {
            return false;
        }
        self.entries.push(favorite);
        true
    }

    pub fn remove(&mut self, kind: MediaKind, id: u64) -> Option<Favorite> {
        self.position(kind, id).map(|i| self.entries.remove(i))
    }

    pub fn toggle(&mut self, item: MediaSummary, added_ts: i64) -> Toggled {
        match self.remove(item.media_type, item.id) {
            Some(removed) => Toggled::Removed(removed),
            None => {
                let favorite = Favorite::new(item, added_ts);
                self.entries.push(favorite.clone());
                Toggled::Added(favorite)
            }
        }
    }

    fn position(&self, kind: MediaKind, id: u64) -> Option<usize> {
        self.entries
            .iter()
            .position(|f| f.item.media_type == kind && f.item.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn item(kind: MediaKind, id: u64) -> MediaSummary {
        MediaSummary {
            id,
            media_type: kind,
            title: format!("{kind} {id}"),
            original_title: String::new(),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            vote_average: 7.5,
            vote_count: 10,
            genre_ids: vec![18],
            popularity: 1.0,
            original_language: "en".into(),
            year: None,
            poster_url: None,
        }
    }

    fn keys(favorites: &Favorites) -> Vec<(MediaKind, u64)> {
        favorites.iter().map(Favorite::key).collect()
    }

    #[test]
    fn add_ignores_duplicate_keys() {
        let mut favs = Favorites::new();
        assert!(favs.add(Favorite::new(item(MediaKind::Movie, 1), 0)));
        assert!(!favs.add(Favorite::new(item(MediaKind::Movie, 1), 5)));
        assert_eq!(favs.len(), 1);
        assert_eq!(favs.get(MediaKind::Movie, 1).unwrap().added_ts, 0);
    }

    #[test]
    fn same_id_in_different_catalogs_are_distinct() {
        let mut favs = Favorites::new();
        favs.add(Favorite::new(item(MediaKind::Movie, 42), 0));
        favs.add(Favorite::new(item(MediaKind::Tv, 42), 0));
        assert_eq!(favs.len(), 2);
        favs.remove(MediaKind::Tv, 42);
        assert!(favs.contains(MediaKind::Movie, 42));
        assert!(!favs.contains(MediaKind::Tv, 42));
    }

    #[test]
    fn toggling_twice_restores_original_list() {
        let mut favs = Favorites::new();
        favs.add(Favorite::new(item(MediaKind::Movie, 1), 0));
        favs.add(Favorite::new(item(MediaKind::Tv, 2), 1));
        let before = favs.clone();

        let first = favs.toggle(item(MediaKind::Movie, 3), 2);
        assert!(first.is_favorite());
        let second = favs.toggle(item(MediaKind::Movie, 3), 3);
        assert!(!second.is_favorite());

        assert_eq!(favs, before);
    }

    #[test]
    fn toggle_removes_existing_entry_in_place() {
        let mut favs = Favorites::new();
        for id in 1..=3 {
            favs.add(Favorite::new(item(MediaKind::Movie, id), id as i64));
        }
        let out = favs.toggle(item(MediaKind::Movie, 2), 99);
        assert_eq!(out, Toggled::Removed(Favorite::new(item(MediaKind::Movie, 2), 2)));
        assert_eq!(keys(&favs), vec![(MediaKind::Movie, 1), (MediaKind::Movie, 3)]);
    }

    #[test]
    fn repeated_toggles_never_produce_duplicates() {
        let mut favs = Favorites::new();
        let ids = [1u64, 2, 1, 3, 3, 2, 1, 4, 1, 1, 2];
        for (n, id) in ids.iter().enumerate() {
            let kind = if id % 2 == 0 { MediaKind::Tv } else { MediaKind::Movie };
            favs.toggle(item(kind, *id), n as i64);
            let unique: HashSet<_> = keys(&favs).into_iter().collect();
            assert_eq!(unique.len(), favs.len());
        }
    }

    #[test]
    fn from_entries_keeps_first_occurrence() {
        let favs = Favorites::from_entries([
            Favorite::new(item(MediaKind::Movie, 1), 10),
            Favorite::new(item(MediaKind::Movie, 2), 11),
            Favorite::new(item(MediaKind::Movie, 1), 12),
        ]);
        assert_eq!(favs.len(), 2);
        assert_eq!(favs.get(MediaKind::Movie, 1).unwrap().added_ts, 10);
    }
}
