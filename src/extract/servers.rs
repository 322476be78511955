//! Embed server discovery on episode/movie pages.
//!
//! Discovery runs in two tiers: iframes inside the player tab containers
//! (`div[id^=tab]`), then every iframe on the page if the tabs gave nothing
//! usable. Order is preserved end to end; it becomes the playback trial order.

use futures::future::join_all;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use super::{absolute_url, first_attr, parse_base, selector};
use crate::config::FilterConfig;
use crate::error::{Result, ScrapeError};
use crate::http_client::DocumentSource;
use crate::model::ServerCandidate;

static TAB: Lazy<Selector> = Lazy::new(|| selector("div[id^=tab]"));
static IFRAME: Lazy<Selector> = Lazy::new(|| selector("iframe"));

/// Embed URLs on the page in document order, before redirect resolution.
///
/// Excluded (social) hosts are already dropped; duplicates are not.
pub fn discover_embeds(html: &str, page_url: &str, hosts: &FilterConfig) -> Result<Vec<String>> {
    let base = parse_base(page_url)?;
    let document = Html::parse_document(html);

    let from_tabs: Vec<String> = document
        .select(&TAB)
        .filter_map(|tab| tab.select(&IFRAME).next())
        .filter_map(|iframe| embed_url(iframe, &base, hosts))
        .collect();
    if !from_tabs.is_empty() {
        debug!(count = from_tabs.len(), "Embeds found in player tabs");
        return Ok(from_tabs);
    }

    let from_page: Vec<String> = document
        .select(&IFRAME)
        .filter_map(|iframe| embed_url(iframe, &base, hosts))
        .collect();
    debug!(count = from_page.len(), "Embeds found by page-wide iframe scan");
    Ok(from_page)
}

fn embed_url(iframe: ElementRef<'_>, base: &Url, hosts: &FilterConfig) -> Option<String> {
    let src = first_attr(iframe, &["src", "data-src"])?;
    let url = absolute_url(base, src)?;
    if hosts.is_excluded_embed(&url) {
        debug!(url = %url, "Skipping non-video embed");
        return None;
    }
    Some(url)
}

/// Discover, resolve and deduplicate the playable servers of a page.
///
/// Redirector URLs are replaced by their target. If resolution fails the
/// original URL is kept.
pub async fn extract<S>(
    html: &str,
    page_url: &str,
    source: &S,
    hosts: &FilterConfig,
) -> Result<Vec<ServerCandidate>>
where
    S: DocumentSource + ?Sized,
{
    let mut embeds = discover_embeds(html, page_url, hosts)?;
    dedup_in_order(&mut embeds);

    let resolved = join_all(embeds.into_iter().map(|url| async move {
        if hosts.is_redirector(&url) {
            resolve_or_keep(source, url).await
        } else {
            url
        }
    }))
    .await;

    let mut candidates: Vec<ServerCandidate> = Vec::with_capacity(resolved.len());
    for url in resolved {
        if candidates.iter().any(|c| c.as_str() == url) {
            continue;
        }
        candidates.push(ServerCandidate::new(url));
    }

    if candidates.is_empty() {
        return Err(ScrapeError::NoCandidates {
            url: page_url.to_string(),
        });
    }
    debug!(count = candidates.len(), "Server candidates ready");
    Ok(candidates)
}

async fn resolve_or_keep<S>(source: &S, url: String) -> String
where
    S: DocumentSource + ?Sized,
{
    match source.resolve_redirect(&url).await {
        Ok(resolved) if !resolved.is_empty() => {
            debug!(from = %url, to = %resolved, "Resolved redirector");
            resolved
        }
        Ok(_) => url,
        Err(e) => {
            warn!(url = %url, error = %e, "Redirect resolution failed, keeping original");
            url
        }
    }
}

fn dedup_in_order(urls: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    urls.retain(|url| seen.insert(url.clone()));
}
