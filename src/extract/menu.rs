//! Genre and release-year navigation links from the site header.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::Serialize;

use super::{absolute_url, element_text, parse_base, selector};
use crate::error::Result;

/// Longest link text still considered a menu entry.
const MAX_LABEL_LEN: usize = 20;

static LINK: Lazy<Selector> = Lazy::new(|| selector("a[href]"));

/// A browsable category page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryLink {
    pub name: String,
    pub url: String,
}

/// Categories found in the site navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SiteMenu {
    /// Sorted by name.
    pub genres: Vec<CategoryLink>,
    /// Newest first.
    pub years: Vec<CategoryLink>,
}

/// Collect genre and release-year links from any page of the site.
pub fn extract(html: &str, base_url: &str) -> Result<SiteMenu> {
    let base = parse_base(base_url)?;
    let document = Html::parse_document(html);
    let mut menu = SiteMenu::default();

    for link in document.select(&LINK) {
        let name = element_text(link);
        if name.is_empty() || name.chars().count() > MAX_LABEL_LEN {
            continue;
        }
        let Some(url) = absolute_url(&base, link.value().attr("href").unwrap_or_default()) else {
            continue;
        };
        let entry = CategoryLink { name, url };

        if entry.url.contains("/genre/") {
            push_unique(&mut menu.genres, entry);
        } else if (entry.url.contains("/release-year/") || entry.url.contains("/year/"))
            && entry.name.chars().all(|c| c.is_ascii_digit())
        {
            push_unique(&mut menu.years, entry);
        }
    }

    menu.genres.sort_by(|a, b| a.name.cmp(&b.name));
    menu.years.sort_by(|a, b| b.name.cmp(&a.name));
    Ok(menu)
}

fn push_unique(list: &mut Vec<CategoryLink>, entry: CategoryLink) {
    if !list.contains(&entry) {
        list.push(entry);
    }
}
