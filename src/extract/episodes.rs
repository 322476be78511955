//! Series page extraction into season groupings.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use super::{absolute_url, element_text, parse_base, select_first, selector};
use crate::error::{Result, ScrapeError};
use crate::model::{MediaItem, SeasonMap, MOVIE_SEASON};

/// Label used when a season container has no heading.
pub const DEFAULT_SEASON_LABEL: &str = "Episodes";

static SEASON: Lazy<Selector> = Lazy::new(|| selector("div.tvseason, div.se-c"));
static SEASON_LABEL: Lazy<Selector> = Lazy::new(|| selector(".les-title strong"));
static ANY_STRONG: Lazy<Selector> = Lazy::new(|| selector("strong"));
static EPISODE_LIST: Lazy<Selector> = Lazy::new(|| selector(".les-content"));
static LINK: Lazy<Selector> = Lazy::new(|| selector("a"));
static PAGE_TITLE: Lazy<Selector> = Lazy::new(|| selector("h1"));

/// Group the episodes of a series page by season.
///
/// Pages without any season container are treated as a single movie: one
/// synthetic `"Movie"` season whose only item links back to `series_url`.
pub fn extract(html: &str, series_url: &str) -> Result<SeasonMap> {
    let no_episodes = || ScrapeError::NoEpisodes {
        url: series_url.to_string(),
    };
    if series_url.trim().is_empty() {
        return Err(no_episodes());
    }

    let base = parse_base(series_url)?;
    let document = Html::parse_document(html);
    let containers: Vec<ElementRef<'_>> = document.select(&SEASON).collect();

    if containers.is_empty() {
        let title = document
            .select(&PAGE_TITLE)
            .next()
            .map(element_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| MOVIE_SEASON.to_string());
        debug!(title = %title, "No season structure, treating page as a movie");
        return Ok(SeasonMap::single_movie(title, series_url));
    }

    let mut seasons = SeasonMap::new();
    for container in containers {
        let label = season_label(container);
        let episodes = season_episodes(container, &base, &label);
        debug!(season = %label, episodes = episodes.len(), "Parsed season");
        seasons.insert(label, episodes);
    }

    if seasons.is_empty() {
        return Err(no_episodes());
    }
    Ok(seasons)
}

fn season_label(container: ElementRef<'_>) -> String {
    select_first(container, &[&*SEASON_LABEL, &*ANY_STRONG])
        .map(element_text)
        .filter(|label| !label.is_empty())
        .unwrap_or_else(|| DEFAULT_SEASON_LABEL.to_string())
}

fn season_episodes(container: ElementRef<'_>, base: &Url, label: &str) -> Vec<MediaItem> {
    let links: Vec<ElementRef<'_>> = match container.select(&EPISODE_LIST).next() {
        Some(list) => list.select(&LINK).collect(),
        None => container.select(&LINK).collect(),
    };

    links
        .into_iter()
        .filter_map(|link| {
            let url = absolute_url(base, link.value().attr("href").unwrap_or_default())?;
            Some(MediaItem::new(element_text(link), "", url).with_season(label))
        })
        .collect()
}
