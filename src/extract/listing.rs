//! Listing grid extraction (homepage, category and search pages).

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use super::{absolute_url, element_text, first_attr, parse_base, select_first, selector};
use crate::error::{Result, ScrapeError};
use crate::model::MediaItem;

/// Quality badges that sometimes sit where the title should be.
const PLACEHOLDER_TITLES: &[&str] = &["HD", "CAM", "WEB-DL"];

/// One way of locating listing entries on a page.
pub struct ListingStrategy {
    pub name: &'static str,
    container: Selector,
}

/// Strategies in priority order: primary grid, blog layout, search results.
pub static STRATEGIES: Lazy<Vec<ListingStrategy>> = Lazy::new(|| {
    vec![
        ListingStrategy {
            name: "ml-item",
            container: selector("div.ml-item"),
        },
        ListingStrategy {
            name: "article",
            container: selector("article"),
        },
        ListingStrategy {
            name: "result-item",
            container: selector("div.result-item"),
        },
    ]
});

static MASK_LINK: Lazy<Selector> = Lazy::new(|| selector("a.ml-mask"));
static ANY_LINK: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static IMAGE: Lazy<Selector> = Lazy::new(|| selector("img"));
static HEADING: Lazy<Selector> = Lazy::new(|| selector("h2"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| selector("p"));

/// Extract listing entries in document order.
///
/// Uses the first strategy whose container selector matches at least once.
/// Entries without a usable link or an image are skipped; other missing
/// fields become empty strings.
pub fn extract(html: &str, base_url: &str) -> Result<Vec<MediaItem>> {
    let base = parse_base(base_url)?;
    let document = Html::parse_document(html);

    for strategy in STRATEGIES.iter() {
        let containers: Vec<ElementRef<'_>> = document.select(&strategy.container).collect();
        if containers.is_empty() {
            debug!(strategy = strategy.name, "Listing layout not present");
            continue;
        }

        let items: Vec<MediaItem> = containers
            .into_iter()
            .filter_map(|container| parse_item(container, &base))
            .collect();
        debug!(strategy = strategy.name, items = items.len(), "Listing layout matched");
        return Ok(items);
    }

    Err(ScrapeError::ParseFallbackExhausted {
        url: base_url.to_string(),
    })
}

fn parse_item(container: ElementRef<'_>, base: &Url) -> Option<MediaItem> {
    let link = select_first(container, &[&*MASK_LINK, &*ANY_LINK])?;
    let image = container.select(&IMAGE).next()?;

    let title = resolve_title(container, link);
    if is_placeholder_title(&title) {
        return None;
    }

    let page_link = absolute_url(base, link.value().attr("href").unwrap_or_default())?;
    let poster_url = first_attr(image, &["data-original", "src"])
        .map(|src| absolute_url(base, src).unwrap_or_else(|| src.to_string()))
        .unwrap_or_default();
    let description = container
        .select(&PARAGRAPH)
        .next()
        .map(element_text)
        .unwrap_or_default();

    Some(MediaItem::new(title, poster_url, page_link).with_description(description))
}

fn resolve_title(container: ElementRef<'_>, link: ElementRef<'_>) -> String {
    if let Some(title) = first_attr(link, &["oldtitle"]) {
        return title.to_string();
    }
    container
        .select(&HEADING)
        .next()
        .map(element_text)
        .unwrap_or_default()
}

fn is_placeholder_title(title: &str) -> bool {
    title.is_empty()
        || PLACEHOLDER_TITLES
            .iter()
            .any(|placeholder| title.eq_ignore_ascii_case(placeholder))
}
