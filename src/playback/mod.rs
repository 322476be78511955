//! Candidate fallback playback on an embedded browser engine.
//!
//! [`PlaybackOrchestrator::start`] scans an episode page for embed servers and
//! loads them one at a time on a [`RenderSurface`], advancing past candidates
//! that fail to load or show an error page until one starts playing.

mod orchestrator;
pub mod scripts;
mod sniff;
mod state;
mod surface;

pub use orchestrator::{PlaybackEvent, PlaybackHandle, PlaybackOrchestrator};
pub use sniff::is_media_url;
pub use state::{Directive, PlaybackSession, PlaybackState};
pub use surface::{
    parse_bridge_call, LoadRequest, LoadTicket, PlayState, RenderSurface, RequestVerdict,
    SurfaceContext, SurfaceEvent, SurfaceEventKind,
};
