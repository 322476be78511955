//! Boundary with the embedded browser engine.
//!
//! The orchestrator never holds references into UI objects. Each candidate
//! load hands the surface a [`SurfaceContext`]; the engine reports everything
//! back through it. Contexts are stamped with the [`LoadTicket`] of their
//! load, so reports from a superseded candidate are recognised and dropped,
//! and reports made after the session is torn down go nowhere.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use super::sniff::is_media_url;
use crate::filter::ContentFilter;

/// Identifies one candidate load within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadTicket(pub(crate) u64);

impl fmt::Display for LoadTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Play/pause state reported by the toggle script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Playing,
    Paused,
}

impl PlayState {
    fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "play" => Some(Self::Playing),
            "pause" => Some(Self::Paused),
            _ => None,
        }
    }
}

/// Something the surface observed while a candidate was loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEventKind {
    /// Main document finished loading.
    PageFinished,
    /// The engine could not load the document at all.
    LoadFailed { reason: String },
    /// Injected visual check found a "not found" page.
    ErrorDetected,
    /// The media element fired `playing`.
    VideoStarted,
    PlayPauseToggled(PlayState),
    ResumePromptDetected { timestamp: String },
    /// An allowed resource request that looks like direct media.
    MediaRequested { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceEvent {
    pub ticket: LoadTicket,
    pub kind: SurfaceEventKind,
}

/// Decision for one intercepted resource request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestVerdict {
    /// Let the engine load it.
    Allow,
    /// Answer with an empty successful response instead.
    Block,
}

impl RequestVerdict {
    #[must_use]
    pub fn is_blocked(self) -> bool {
        self == Self::Block
    }
}

/// Per-load callback channel handed to the render surface.
#[derive(Clone)]
pub struct SurfaceContext {
    ticket: LoadTicket,
    current_host: String,
    filter: Arc<ContentFilter>,
    tx: mpsc::UnboundedSender<SurfaceEvent>,
}

impl fmt::Debug for SurfaceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceContext")
            .field("ticket", &self.ticket)
            .field("current_host", &self.current_host)
            .finish_non_exhaustive()
    }
}

impl SurfaceContext {
    pub(crate) fn new(
        ticket: LoadTicket,
        current_host: String,
        filter: Arc<ContentFilter>,
        tx: mpsc::UnboundedSender<SurfaceEvent>,
    ) -> Self {
        Self {
            ticket,
            current_host,
            filter,
            tx,
        }
    }

    #[must_use]
    pub fn ticket(&self) -> LoadTicket {
        self.ticket
    }

    /// Decide whether a resource request may proceed.
    ///
    /// Call for every request the engine is about to make. Allowed requests
    /// that look like media are reported to the orchestrator as a sniffed link.
    pub fn intercept(&self, url: &str) -> RequestVerdict {
        if self.filter.is_blocked(url) {
            trace!(url = %url, "Blocked resource request");
            return RequestVerdict::Block;
        }
        if is_media_url(url) {
            self.emit(SurfaceEventKind::MediaRequested {
                url: url.to_string(),
            });
        }
        RequestVerdict::Allow
    }

    /// Whether a top-level navigation to `url` should be followed.
    #[must_use]
    pub fn should_navigate(&self, url: &str) -> bool {
        self.filter.navigation_allowed(url, &self.current_host)
    }

    pub fn page_finished(&self) {
        self.emit(SurfaceEventKind::PageFinished);
    }

    pub fn load_failed(&self, reason: impl Into<String>) {
        self.emit(SurfaceEventKind::LoadFailed {
            reason: reason.into(),
        });
    }

    /// Forward a call made by an injected script on the bridge object.
    ///
    /// Returns `false` for unknown names or malformed arguments.
    pub fn bridge_call(&self, name: &str, arg: Option<&str>) -> bool {
        match parse_bridge_call(name, arg) {
            Some(kind) => {
                self.emit(kind);
                true
            }
            None => {
                debug!(name = %name, "Ignoring unknown bridge call");
                false
            }
        }
    }

    fn emit(&self, kind: SurfaceEventKind) {
        // Receiver is gone once the session has been torn down
        let _ = self.tx.send(SurfaceEvent {
            ticket: self.ticket,
            kind,
        });
    }
}

/// Map a bridge method name and argument to an event.
#[must_use]
pub fn parse_bridge_call(name: &str, arg: Option<&str>) -> Option<SurfaceEventKind> {
    match name {
        "errorDetected" => Some(SurfaceEventKind::ErrorDetected),
        "videoStarted" => Some(SurfaceEventKind::VideoStarted),
        "playPauseToggled" => arg
            .and_then(PlayState::parse)
            .map(SurfaceEventKind::PlayPauseToggled),
        "resumePromptDetected" => Some(SurfaceEventKind::ResumePromptDetected {
            timestamp: arg.unwrap_or("Unknown").to_string(),
        }),
        _ => None,
    }
}

/// One candidate to load.
#[derive(Debug)]
pub struct LoadRequest {
    pub url: String,
    /// Includes the `Referer` the embed hosts expect.
    pub headers: HeaderMap,
    pub context: SurfaceContext,
}

/// Embedded browser engine driven by the orchestrator.
#[async_trait]
pub trait RenderSurface: Send {
    /// Start loading a candidate. Returning an error counts as a load failure.
    async fn load(&mut self, request: LoadRequest) -> Result<()>;

    /// Evaluate a script in the currently loaded document.
    async fn evaluate_script(&mut self, script: &str) -> Result<()>;

    /// Stop loading and release the engine's resources.
    async fn stop(&mut self);
}
