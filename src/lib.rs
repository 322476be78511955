//! `reelhound` - Stream resolution and server fallback for a scraped movie site
//!
//! # Features
//!
//! - **Listing extraction**: homepage, category and search grids with layout fallbacks
//! - **Episode grouping**: season → episodes, with a single-movie fallback
//! - **Server discovery**: embed iframes, redirector resolution, deduplication
//! - **Content filtering**: ad/tracker host blocking plus injected countermeasures
//! - **Playback fallback**: walks candidates on an embedded browser until one plays
//!
//! # Example
//!
//! ```rust,no_run
//! use reelhound::{Config, Resolver};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let resolver = Resolver::new(Config::default())?;
//!     let servers = resolver
//!         .resolve_candidates("https://ww93.pencurimovie.bond/episode/some-show-1x01/")
//!         .await?;
//!     for server in &servers {
//!         println!("{server}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod filter;
pub mod fingerprint;
pub mod http_client;
pub mod model;
pub mod playback;
pub mod resolver;

pub use config::{load_config, Config, FilterConfig, PlaybackConfig, SiteConfig};
pub use error::{Result, ScrapeError};
pub use extract::menu::{CategoryLink, SiteMenu};
pub use filter::ContentFilter;
pub use fingerprint::BrowserProfile;
pub use http_client::{DocumentFetcher, DocumentSource, FetchedDocument};
pub use model::{MediaCatalog, MediaItem, MediaKind, Season, SeasonMap, ServerCandidate};
pub use playback::{
    LoadRequest, PlaybackEvent, PlaybackHandle, PlaybackOrchestrator, PlaybackSession,
    PlaybackState, RenderSurface, RequestVerdict, SurfaceContext,
};
pub use resolver::{HomePage, Resolver};

/// Version of reelhound
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
