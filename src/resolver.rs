//! High-level entry points: fetch a page and run the matching extractor.
//!
//! # Example
//!
//! ```rust,no_run
//! use reelhound::{Config, Resolver};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let resolver = Resolver::new(Config::default())?;
//! let home = resolver.home().await?;
//! if let Some(hero) = &home.hero {
//!     let seasons = resolver.resolve_episodes(&hero.page_link).await?;
//!     println!("{} seasons", seasons.len());
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use futures::future::join_all;
use reqwest::header::HeaderMap;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::error::{Result, ScrapeError};
use crate::extract::{episodes, listing, menu, servers};
use crate::extract::menu::SiteMenu;
use crate::filter::ContentFilter;
use crate::http_client::{DocumentFetcher, DocumentSource, FetchedDocument};
use crate::model::{MediaItem, SeasonMap, ServerCandidate};

/// Homepage split into the featured item and the rest of the grid.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HomePage {
    pub hero: Option<MediaItem>,
    pub items: Vec<MediaItem>,
}

/// Fetches pages of the configured site and extracts structured content.
#[derive(Clone)]
pub struct Resolver {
    source: Arc<dyn DocumentSource>,
    config: Arc<Config>,
    filter: Arc<ContentFilter>,
}

impl Resolver {
    /// Resolver backed by a real HTTP fetcher.
    pub fn new(config: Config) -> Result<Self> {
        let filter = Arc::new(ContentFilter::new(&config.filter));
        let fetcher = DocumentFetcher::new(Arc::new(config.site.clone()), Arc::clone(&filter))?;
        Ok(Self {
            source: Arc::new(fetcher),
            config: Arc::new(config),
            filter,
        })
    }

    /// Resolver over any document source (used by tests and embedders).
    pub fn with_source(source: Arc<dyn DocumentSource>, config: Config) -> Self {
        let filter = Arc::new(ContentFilter::new(&config.filter));
        Self {
            source,
            config: Arc::new(config),
            filter,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn filter(&self) -> &Arc<ContentFilter> {
        &self.filter
    }

    async fn fetch(&self, url: &str) -> Result<FetchedDocument> {
        self.source.fetch(url, &HeaderMap::new()).await
    }

    /// Listing entries of a homepage, category or search page.
    #[instrument(skip(self))]
    pub async fn resolve_listing(&self, url: &str) -> Result<Vec<MediaItem>> {
        let doc = self.fetch(url).await?;
        let items = listing::extract(&doc.html, &doc.final_url)?;
        info!(count = items.len(), "Listing resolved");
        Ok(items)
    }

    /// Homepage with the first entry split off as the hero item.
    pub async fn home(&self) -> Result<HomePage> {
        let mut items = self.resolve_listing(&self.config.site.base_url).await?;
        let hero = if items.is_empty() {
            None
        } else {
            Some(items.remove(0))
        };
        Ok(HomePage { hero, items })
    }

    /// Search the site. A results page with no recognizable grid means no hits.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<MediaItem>> {
        let url = self.config.site.search_url(query);
        match self.resolve_listing(&url).await {
            Err(ScrapeError::ParseFallbackExhausted { .. }) => {
                debug!("Search page had no result grid");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Load several listing pages concurrently. Results keep input order.
    pub async fn resolve_sections(
        &self,
        urls: &[String],
    ) -> Vec<(String, Result<Vec<MediaItem>>)> {
        let results = join_all(urls.iter().map(|url| self.resolve_listing(url))).await;
        urls.iter().cloned().zip(results).collect()
    }

    /// Season → episodes mapping of a series page (or a single movie entry).
    #[instrument(skip(self))]
    pub async fn resolve_episodes(&self, series_url: &str) -> Result<SeasonMap> {
        let doc = self.fetch(series_url).await?;
        // Movie fallback links to the page as requested, not the redirect target
        let seasons = episodes::extract(&doc.html, series_url)?;
        info!(
            seasons = seasons.len(),
            episodes = seasons.episode_count(),
            "Episodes resolved"
        );
        Ok(seasons)
    }

    /// Ordered, deduplicated embed servers of an episode or movie page.
    #[instrument(skip(self))]
    pub async fn resolve_candidates(&self, episode_url: &str) -> Result<Vec<ServerCandidate>> {
        let doc = self.fetch(episode_url).await?;
        let candidates = servers::extract(
            &doc.html,
            &doc.final_url,
            self.source.as_ref(),
            &self.config.filter,
        )
        .await?;
        info!(count = candidates.len(), "Server candidates resolved");
        Ok(candidates)
    }

    /// Genre and release-year categories from the homepage navigation.
    pub async fn menu(&self) -> Result<SiteMenu> {
        let doc = self.fetch(&self.config.site.base_url).await?;
        menu::extract(&doc.html, &doc.final_url)
    }
}
