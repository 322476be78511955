//! Document fetching.
//!
//! Features:
//! - Per-request header building (site credentials only for the site's domain)
//! - Redirects followed hop by hop, each hop filtered and given its own headers
//! - Pre-request ad/tracker refusal via [`ContentFilter`]
//! - Brotli, Zstd, Gzip compression (auto-negotiated)

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{Client, Response};
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::SiteConfig;
use crate::error::{Result, ScrapeError};
use crate::filter::ContentFilter;
use crate::fingerprint::{request_headers, BrowserProfile};

/// Redirect hops followed before giving up.
const MAX_REDIRECTS: usize = 10;

/// HTML body together with the URL it was finally served from.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub html: String,
    pub final_url: String,
}

/// Anything that can hand out HTML pages and resolve redirects.
///
/// [`DocumentFetcher`] is the network implementation; tests substitute an
/// in-memory source.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// GET `url` and return its body and post-redirect URL.
    async fn fetch(&self, url: &str, extra_headers: &HeaderMap) -> Result<FetchedDocument>;

    /// Follow redirects from `url` and return where they end. Body is ignored.
    async fn resolve_redirect(&self, url: &str) -> Result<String>;
}

/// HTTP document fetcher for the scraped site and its embed hosts.
#[derive(Clone)]
pub struct DocumentFetcher {
    client: Client,
    profile: BrowserProfile,
    site: Arc<SiteConfig>,
    filter: Arc<ContentFilter>,
}

impl DocumentFetcher {
    /// Create a fetcher for the configured site.
    pub fn new(site: Arc<SiteConfig>, filter: Arc<ContentFilter>) -> Result<Self> {
        let client = Client::builder()
            // ═══════════════════════════════════════════════════════════════
            // CONNECTION
            // ═══════════════════════════════════════════════════════════════
            // Don't assume HTTP/2 - embed hosts are frequently HTTP/1.1 only
            .http2_adaptive_window(true)
            .pool_max_idle_per_host(10)
            .tcp_nodelay(true)
            .use_rustls_tls()
            // ═══════════════════════════════════════════════════════════════
            // COMPRESSION (auto-negotiated via Accept-Encoding)
            // ═══════════════════════════════════════════════════════════════
            .brotli(true)
            .zstd(true)
            .gzip(true)
            .deflate(true)
            // ═══════════════════════════════════════════════════════════════
            // TIMEOUTS
            // ═══════════════════════════════════════════════════════════════
            .connect_timeout(site.connect_timeout())
            .timeout(site.timeout())
            // ═══════════════════════════════════════════════════════════════
            // REDIRECTS (followed in `send_following`)
            // ═══════════════════════════════════════════════════════════════
            .redirect(reqwest::redirect::Policy::none())
            .referer(false)
            .build()?;

        Ok(Self {
            client,
            profile: BrowserProfile::from_site(&site),
            site,
            filter,
        })
    }

    fn headers_for(&self, url: &str, extra: &HeaderMap) -> HeaderMap {
        request_headers(&self.profile, &self.site, url, extra)
    }

    fn check_allowed(&self, url: &str) -> Result<()> {
        if self.filter.is_blocked(url) {
            debug!(url = %url, "Refusing filtered host");
            return Err(ScrapeError::Blocked {
                url: url.to_string(),
            });
        }
        Ok(())
    }

    /// GET `url`, following up to [`MAX_REDIRECTS`] hops.
    ///
    /// Every hop is checked against the filter and gets headers built for its
    /// own host. `extra` is only sent while the chain stays on the starting
    /// host.
    async fn send_following(&self, url: &str, extra: &HeaderMap) -> Result<Response> {
        let mut current = Url::parse(url).map_err(|_| ScrapeError::InvalidUrl {
            url: url.to_string(),
        })?;
        let origin_host = current.host_str().map(str::to_owned);
        let no_extra = HeaderMap::new();

        for hop in 0..=MAX_REDIRECTS {
            self.check_allowed(current.as_str())?;
            let extra = if current.host_str().map(str::to_owned) == origin_host {
                extra
            } else {
                &no_extra
            };

            let response = self
                .client
                .get(current.clone())
                .headers(self.headers_for(current.as_str(), extra))
                .send()
                .await?;

            if !response.status().is_redirection() {
                return Ok(response);
            }
            let Some(next) = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|location| current.join(location).ok())
            else {
                return Ok(response);
            };
            debug!(hop, status = %response.status(), to = %next, "Following redirect");
            current = next;
        }

        Err(ScrapeError::TooManyRedirects {
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl DocumentSource for DocumentFetcher {
    #[instrument(skip(self, extra_headers), fields(url = %url))]
    async fn fetch(&self, url: &str, extra_headers: &HeaderMap) -> Result<FetchedDocument> {
        debug!("Fetching document");
        let response = self.send_following(url, extra_headers).await?;

        let status = response.status();
        let final_url = response.url().to_string();
        info!(
            status = %status,
            version = ?response.version(),
            final_url = %final_url,
            "Response received"
        );

        if !status.is_success() {
            return Err(ScrapeError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let html = response.text().await?;
        if html.is_empty() {
            return Err(ScrapeError::EmptyBody {
                url: url.to_string(),
            });
        }

        Ok(FetchedDocument { html, final_url })
    }

    #[instrument(skip(self), fields(url = %url))]
    async fn resolve_redirect(&self, url: &str) -> Result<String> {
        let response = self.send_following(url, &HeaderMap::new()).await?;
        let resolved = response.url().to_string();
        debug!(resolved = %resolved, "Redirect resolved");
        Ok(resolved)
    }
}
