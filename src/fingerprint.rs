//! Desktop browser identity and per-request header building.
//!
//! Headers are computed per request from `(url, is_target_domain)` instead of
//! being injected by a shared client, so the scraped site's cookies and referer
//! never leak to third-party hosts.

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE, REFERER, USER_AGENT,
};
use tracing::warn;

use crate::config::SiteConfig;

/// Static desktop browser identity presented on every request.
#[derive(Debug, Clone)]
pub struct BrowserProfile {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
}

impl BrowserProfile {
    /// Profile configured for the scraped site.
    #[must_use]
    pub fn from_site(site: &SiteConfig) -> Self {
        Self {
            user_agent: site.user_agent.clone(),
            accept: site.accept.clone(),
            accept_language: site.accept_language.clone(),
        }
    }

    /// Convert profile to reqwest `HeaderMap`
    pub fn to_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        insert(&mut headers, USER_AGENT, &self.user_agent);
        insert(&mut headers, ACCEPT, &self.accept);
        insert(&mut headers, ACCEPT_LANGUAGE, &self.accept_language);
        headers
    }
}

impl Default for BrowserProfile {
    fn default() -> Self {
        Self::from_site(&SiteConfig::default())
    }
}

/// Host of `url`, lowercased. `None` when the URL does not parse.
#[must_use]
pub fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
}

/// Whether `url` points at the scraped site.
#[must_use]
pub fn is_target_url(site: &SiteConfig, url: &str) -> bool {
    host_of(url).is_some_and(|host| site.is_target_host(&host))
}

/// Build the full header set for one request.
///
/// Identity headers always; `Cookie` and `Referer` only when `url` belongs to
/// the scraped domain. `extra` is applied last and may override anything.
pub fn request_headers(
    profile: &BrowserProfile,
    site: &SiteConfig,
    url: &str,
    extra: &HeaderMap,
) -> HeaderMap {
    let mut headers = profile.to_headers();

    if is_target_url(site, url) {
        let cookie = site.cookie_header();
        if !cookie.is_empty() {
            insert(&mut headers, COOKIE, &cookie);
        }
        insert(&mut headers, REFERER, &site.referer());
    }

    for (name, value) in extra {
        headers.insert(name.clone(), value.clone());
    }
    headers
}

fn insert(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(v) => {
            headers.insert(name, v);
        }
        Err(_) => warn!(header = %name, "Skipping header with invalid characters"),
    }
}
