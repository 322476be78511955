//! Values produced by the extractors.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Label of the synthetic season used when a page has no season structure.
pub const MOVIE_SEASON: &str = "Movie";

/// One movie, series or episode entry. `page_link` is its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub title: String,
    pub poster_url: String,
    pub page_link: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub season_title: String,
}

/// Coarse content type, inferred from link and title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
}

impl MediaItem {
    pub fn new(
        title: impl Into<String>,
        poster_url: impl Into<String>,
        page_link: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            poster_url: poster_url.into(),
            page_link: page_link.into(),
            description: String::new(),
            season_title: String::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_season(mut self, season_title: impl Into<String>) -> Self {
        self.season_title = season_title.into();
        self
    }

    #[must_use]
    pub fn kind(&self) -> MediaKind {
        if self.page_link.contains("/series/") || self.title.to_lowercase().contains("season") {
            MediaKind::Series
        } else {
            MediaKind::Movie
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movie => write!(f, "MOVIE"),
            Self::Series => write!(f, "SERIES"),
        }
    }
}

/// Episodes of one season, in page order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub label: String,
    pub episodes: Vec<MediaItem>,
}

/// Ordered season label → episodes mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeasonMap {
    seasons: Vec<Season>,
}

impl SeasonMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Single synthetic season for a page without season structure.
    #[must_use]
    pub fn single_movie(title: impl Into<String>, page_link: impl Into<String>) -> Self {
        let mut map = Self::new();
        map.insert(
            MOVIE_SEASON,
            vec![MediaItem::new(title, "", page_link).with_season(MOVIE_SEASON)],
        );
        map
    }

    /// Add episodes under `label`, appending if the label already exists.
    ///
    /// Empty episode lists are ignored so no season is ever empty.
    pub fn insert(&mut self, label: impl Into<String>, episodes: Vec<MediaItem>) {
        if episodes.is_empty() {
            return;
        }
        let label = label.into();
        match self.seasons.iter_mut().find(|s| s.label == label) {
            Some(season) => season.episodes.extend(episodes),
            None => self.seasons.push(Season { label, episodes }),
        }
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&[MediaItem]> {
        self.seasons
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.episodes.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Season> {
        self.seasons.iter()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.seasons.iter().map(|s| s.label.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seasons.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seasons.is_empty()
    }

    /// Total episodes across all seasons.
    #[must_use]
    pub fn episode_count(&self) -> usize {
        self.seasons.iter().map(|s| s.episodes.len()).sum()
    }
}

impl<'a> IntoIterator for &'a SeasonMap {
    type Item = &'a Season;
    type IntoIter = std::slice::Iter<'a, Season>;

    fn into_iter(self) -> Self::IntoIter {
        self.seasons.iter()
    }
}

/// Absolute URL believed to host playable media.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerCandidate(String);

impl ServerCandidate {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn host(&self) -> Option<String> {
        crate::fingerprint::host_of(&self.0)
    }
}

impl fmt::Display for ServerCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ServerCandidate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Listing-diff structure keyed by `page_link`.
///
/// Keeps first-insertion order. Re-inserting an item with a known link
/// replaces its value in place rather than adding a second entry.
#[derive(Debug, Clone, Default)]
pub struct MediaCatalog {
    items: Vec<MediaItem>,
    index: HashMap<String, usize>,
}

impl MediaCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item. Returns `true` if its link was not yet known.
    pub fn insert(&mut self, item: MediaItem) -> bool {
        if let Some(&pos) = self.index.get(&item.page_link) {
            self.items[pos] = item;
            return false;
        }
        self.index.insert(item.page_link.clone(), self.items.len());
        self.items.push(item);
        true
    }

    /// Insert every item; returns how many were new.
    pub fn merge(&mut self, items: impl IntoIterator<Item = MediaItem>) -> usize {
        items.into_iter().map(|item| self.insert(item)).filter(|&added| added).count()
    }

    #[must_use]
    pub fn contains(&self, page_link: &str) -> bool {
        self.index.contains_key(page_link)
    }

    #[must_use]
    pub fn get(&self, page_link: &str) -> Option<&MediaItem> {
        self.index.get(page_link).map(|&pos| &self.items[pos])
    }

    #[must_use]
    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_detects_series_by_link_or_title() {
        let series = MediaItem::new("Dark", "", "https://site/series/dark/");
        let season = MediaItem::new("Dark Season 2", "", "https://site/movies/dark/");
        let movie = MediaItem::new("Heat", "", "https://site/movies/heat/");
        assert_eq!(series.kind(), MediaKind::Series);
        assert_eq!(season.kind(), MediaKind::Series);
        assert_eq!(movie.kind(), MediaKind::Movie);
    }

    #[test]
    fn season_map_preserves_order_and_skips_empty() {
        let mut map = SeasonMap::new();
        map.insert("Season 2", vec![MediaItem::new("E1", "", "https://s/2/1")]);
        map.insert("Season 1", vec![MediaItem::new("E1", "", "https://s/1/1")]);
        map.insert("Season 3", vec![]);
        let labels: Vec<_> = map.labels().collect();
        assert_eq!(labels, vec!["Season 2", "Season 1"]);
        assert!(map.get("Season 3").is_none());
    }

    #[test]
    fn season_map_appends_to_existing_label() {
        let mut map = SeasonMap::new();
        map.insert("Episodes", vec![MediaItem::new("E1", "", "https://s/1")]);
        map.insert("Episodes", vec![MediaItem::new("E2", "", "https://s/2")]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.episode_count(), 2);
    }

    #[test]
    fn single_movie_links_to_page() {
        let map = SeasonMap::single_movie("Heat", "https://site/movies/heat/");
        let episodes = map.get(MOVIE_SEASON).unwrap();
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].page_link, "https://site/movies/heat/");
        assert_eq!(episodes[0].season_title, MOVIE_SEASON);
    }

    #[test]
    fn catalog_dedupes_by_page_link() {
        let mut catalog = MediaCatalog::new();
        let item = MediaItem::new("Heat", "https://img/heat.jpg", "https://site/movies/heat/");
        assert!(catalog.insert(item.clone()));
        assert!(!catalog.insert(item));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn catalog_merge_counts_new_items_and_keeps_order() {
        let mut catalog = MediaCatalog::new();
        catalog.insert(MediaItem::new("A", "", "https://s/a"));
        let added = catalog.merge(vec![
            MediaItem::new("B", "", "https://s/b"),
            MediaItem::new("A (updated)", "", "https://s/a"),
        ]);
        assert_eq!(added, 1);
        let titles: Vec<_> = catalog.items().iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["A (updated)", "B"]);
    }

    #[test]
    fn media_item_serializes_camel_case() {
        let item = MediaItem::new("Heat", "p", "l");
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"posterUrl\":\"p\""));
        assert!(json.contains("\"pageLink\":\"l\""));
    }
}
