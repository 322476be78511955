//! Error taxonomy for fetching and extraction.
//!
//! Extraction errors are only surfaced once every fallback strategy has been
//! tried; redirect-resolution failures never reach this type at all.

use thiserror::Error;

/// Errors produced by the fetcher, the extractors and the resolver.
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Transport-level failure (timeout, DNS, TLS, connection reset).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} for {url}")]
    Http { status: u16, url: String },

    /// A successful response carried no body.
    #[error("empty response body from {url}")]
    EmptyBody { url: String },

    /// The request host matched the ad/tracker filter.
    #[error("blocked by content filter: {url}")]
    Blocked { url: String },

    /// The redirect chain exceeded the hop limit.
    #[error("too many redirects from {url}")]
    TooManyRedirects { url: String },

    /// The URL could not be parsed or joined.
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// No playable embed was found on the page.
    #[error("no embed servers found on {url}")]
    NoCandidates { url: String },

    /// Neither season groupings nor a single-movie fallback could be built.
    #[error("no episodes found on {url}")]
    NoEpisodes { url: String },

    /// Every listing selector strategy matched zero elements.
    #[error("no listing layout matched on {url}")]
    ParseFallbackExhausted { url: String },
}

impl ScrapeError {
    /// Whether the page could not be retrieved, as opposed to retrieved but
    /// not understood.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Network(_)
                | Self::Http { .. }
                | Self::EmptyBody { .. }
                | Self::Blocked { .. }
                | Self::TooManyRedirects { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
