//! Playback session state, free of any I/O.
//!
//! The async driver feeds observations in and executes the returned
//! [`Directive`]. Keeping the transitions here makes the fallback rules
//! testable without a runtime or a browser engine.

use std::fmt;

use super::surface::LoadTicket;
use crate::model::ServerCandidate;

/// Where a session is in its candidate walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Scanning,
    /// Candidate `i` handed to the surface, document not finished yet.
    Loading(usize),
    /// Candidate `i` finished loading; waiting for playback or an error.
    Probing(usize),
    Confirmed(usize),
    Exhausted,
    /// The episode page itself could not be scanned.
    Failed,
}

impl PlaybackState {
    /// No further candidate will be tried.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Exhausted | Self::Failed)
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Scanning => write!(f, "scanning"),
            Self::Loading(i) => write!(f, "loading({i})"),
            Self::Probing(i) => write!(f, "probing({i})"),
            Self::Confirmed(i) => write!(f, "confirmed({i})"),
            Self::Exhausted => write!(f, "exhausted"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// What the driver should do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Hand `url` to the surface under a fresh ticket.
    Load {
        ticket: LoadTicket,
        index: usize,
        url: String,
    },
    /// Inject the probing scripts and arm the deferred checks.
    Probe { ticket: LoadTicket },
    Confirm { index: usize },
    Exhaust,
    /// Observation changed nothing.
    Ignore,
}

/// One playback attempt over an ordered candidate list.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    candidates: Vec<ServerCandidate>,
    cursor: usize,
    state: PlaybackState,
    sniffed_media_url: Option<String>,
    loads_issued: u64,
    current_ticket: Option<LoadTicket>,
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
            cursor: 0,
            state: PlaybackState::Idle,
            sniffed_media_url: None,
            loads_issued: 0,
            current_ticket: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Index of the candidate currently (or last) loaded.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn candidates(&self) -> &[ServerCandidate] {
        &self.candidates
    }

    #[must_use]
    pub fn sniffed_media_url(&self) -> Option<&str> {
        self.sniffed_media_url.as_deref()
    }

    /// Number of candidate loads handed to the surface so far.
    #[must_use]
    pub fn loads_issued(&self) -> u64 {
        self.loads_issued
    }

    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        matches!(self.state, PlaybackState::Confirmed(_))
    }

    /// Ticket of the candidate currently on the surface, if any.
    #[must_use]
    pub fn current_ticket(&self) -> Option<LoadTicket> {
        self.current_ticket
    }

    /// Whether `ticket` belongs to the candidate currently loaded.
    #[must_use]
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.current_ticket == Some(ticket)
    }

    /// Whether a deferred check armed under `ticket` may still run.
    #[must_use]
    pub fn deferred_allowed(&self, ticket: LoadTicket) -> bool {
        self.is_current(ticket) && matches!(self.state, PlaybackState::Probing(_))
    }

    /// A candidate document is on the surface and can take scripts.
    #[must_use]
    pub fn has_document(&self) -> bool {
        matches!(
            self.state,
            PlaybackState::Probing(_) | PlaybackState::Confirmed(_)
        )
    }

    pub fn begin_scan(&mut self) {
        if self.state == PlaybackState::Idle {
            self.state = PlaybackState::Scanning;
        }
    }

    /// Scan finished; an empty list exhausts the session immediately.
    pub fn candidates_ready(&mut self, candidates: Vec<ServerCandidate>) -> Directive {
        if self.state != PlaybackState::Scanning {
            return Directive::Ignore;
        }
        self.candidates = candidates;
        self.cursor = 0;
        if self.candidates.is_empty() {
            self.state = PlaybackState::Exhausted;
            return Directive::Exhaust;
        }
        self.load_cursor()
    }

    pub fn scan_failed(&mut self) {
        if self.state == PlaybackState::Scanning {
            self.state = PlaybackState::Failed;
        }
    }

    /// The current document finished loading.
    ///
    /// A repeated finish while probing re-arms the probe, since in-frame
    /// navigation replaces the injected scripts.
    pub fn page_finished(&mut self, ticket: LoadTicket) -> Directive {
        if !self.is_current(ticket) {
            return Directive::Ignore;
        }
        match self.state {
            PlaybackState::Loading(i) | PlaybackState::Probing(i) => {
                self.state = PlaybackState::Probing(i);
                Directive::Probe { ticket }
            }
            _ => Directive::Ignore,
        }
    }

    /// The current candidate failed to load or showed an error page.
    pub fn fail(&mut self, ticket: LoadTicket) -> Directive {
        if !self.is_current(ticket) {
            return Directive::Ignore;
        }
        match self.state {
            PlaybackState::Loading(_) | PlaybackState::Probing(_) => {
                self.cursor += 1;
                if self.cursor < self.candidates.len() {
                    self.load_cursor()
                } else {
                    self.state = PlaybackState::Exhausted;
                    self.current_ticket = None;
                    Directive::Exhaust
                }
            }
            _ => Directive::Ignore,
        }
    }

    /// The media element started playing; the cursor is frozen from here on.
    pub fn video_started(&mut self, ticket: LoadTicket) -> Directive {
        if !self.is_current(ticket) {
            return Directive::Ignore;
        }
        match self.state {
            PlaybackState::Loading(i) | PlaybackState::Probing(i) => {
                self.state = PlaybackState::Confirmed(i);
                Directive::Confirm { index: i }
            }
            _ => Directive::Ignore,
        }
    }

    /// Keep the first direct media URL seen. Returns `true` if `url` was kept.
    pub fn record_sniffed(&mut self, url: &str) -> bool {
        if self.sniffed_media_url.is_some() {
            return false;
        }
        self.sniffed_media_url = Some(url.to_string());
        true
    }

    fn load_cursor(&mut self) -> Directive {
        self.loads_issued += 1;
        let ticket = LoadTicket(self.loads_issued);
        self.current_ticket = Some(ticket);
        self.state = PlaybackState::Loading(self.cursor);
        Directive::Load {
            ticket,
            index: self.cursor,
            url: self.candidates[self.cursor].as_str().to_string(),
        }
    }
}
