//! Async driver walking a candidate list on a [`RenderSurface`].
//!
//! One spawned task owns the surface and the [`PlaybackSession`]. Surface
//! reports, host commands, cancellation and the two deferred checks all meet
//! in a single `select!` loop, so the cursor only ever moves sequentially.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::{debug, info, instrument, trace, warn};

use super::scripts;
use super::state::{Directive, PlaybackSession};
use super::surface::{
    LoadRequest, LoadTicket, PlayState, RenderSurface, SurfaceContext, SurfaceEvent,
    SurfaceEventKind,
};
use crate::error::ScrapeError;
use crate::filter::ContentFilter;
use crate::fingerprint::host_of;
use crate::resolver::Resolver;

/// Progress reported to the host application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    LoadingCandidate { index: usize, url: String },
    Confirmed { index: usize },
    /// Every candidate failed, or the page had none.
    Exhausted,
    /// The episode page could not be scanned.
    Failed { reason: String },
    MediaSniffed { url: String },
    PlayPause(PlayState),
    ResumePrompt { timestamp: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaybackCommand {
    Seek(i32),
    TogglePlayPause,
    AnswerResume(bool),
}

/// Starts playback sessions for episode pages.
#[derive(Clone)]
pub struct PlaybackOrchestrator {
    resolver: Resolver,
}

impl PlaybackOrchestrator {
    #[must_use]
    pub fn new(resolver: Resolver) -> Self {
        Self { resolver }
    }

    /// Scan `episode_url` and walk its candidates on `surface`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<S>(&self, episode_url: &str, surface: S) -> PlaybackHandle
    where
        S: RenderSurface + 'static,
    {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (surface_tx, surface_rx) = mpsc::unbounded_channel();

        let playback = &self.resolver.config().playback;
        let driver = Driver {
            resolver: self.resolver.clone(),
            filter: Arc::clone(self.resolver.filter()),
            surface,
            session: PlaybackSession::new(),
            events: event_tx,
            surface_tx,
            surface_rx,
            commands: command_rx,
            cancel: cancel_rx,
            autoplay_delay: playback.autoplay_delay(),
            error_check_delay: playback.error_check_delay(),
            autoplay_at: None,
            error_check_at: None,
        };
        let task = tokio::spawn(driver.run(episode_url.to_string()));

        PlaybackHandle {
            events: event_rx,
            commands: command_tx,
            cancel: cancel_tx,
            cancelled: false,
            seek_step: playback.seek_step(),
            task: Some(task),
        }
    }
}

/// Host-side end of a running session. Dropping it cancels the session.
pub struct PlaybackHandle {
    events: mpsc::UnboundedReceiver<PlaybackEvent>,
    commands: mpsc::UnboundedSender<PlaybackCommand>,
    cancel: watch::Sender<bool>,
    cancelled: bool,
    seek_step: i32,
    task: Option<JoinHandle<PlaybackSession>>,
}

impl PlaybackHandle {
    /// Next progress event, or `None` once the session has ended.
    pub async fn next_event(&mut self) -> Option<PlaybackEvent> {
        if self.cancelled {
            return None;
        }
        self.events.recv().await
    }

    /// Stop the session and release the surface. No event is delivered after this.
    pub fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        self.events.close();
        // Task may already have finished
        let _ = self.cancel.send(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Move the playhead by `seconds`, negative to rewind.
    pub fn seek(&self, seconds: i32) {
        self.send(PlaybackCommand::Seek(seconds));
    }

    /// Seek forward by the configured step.
    pub fn skip_forward(&self) {
        self.seek(self.seek_step);
    }

    /// Seek backward by the configured step.
    pub fn skip_backward(&self) {
        self.seek(-self.seek_step);
    }

    pub fn toggle_play_pause(&self) {
        self.send(PlaybackCommand::TogglePlayPause);
    }

    /// Answer the embed's "resume where you left off?" prompt.
    pub fn answer_resume(&self, resume: bool) {
        self.send(PlaybackCommand::AnswerResume(resume));
    }

    /// Wait for the session task and return its final state.
    ///
    /// A confirmed session keeps running until cancelled.
    pub async fn join(mut self) -> Option<PlaybackSession> {
        let task = self.task.take()?;
        match task.await {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(error = %e, "Playback task ended abnormally");
                None
            }
        }
    }

    fn send(&self, command: PlaybackCommand) {
        if self.commands.send(command).is_err() {
            debug!(?command, "Playback session already ended");
        }
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

struct Driver<S> {
    resolver: Resolver,
    filter: Arc<ContentFilter>,
    surface: S,
    session: PlaybackSession,
    events: mpsc::UnboundedSender<PlaybackEvent>,
    surface_tx: mpsc::UnboundedSender<SurfaceEvent>,
    surface_rx: mpsc::UnboundedReceiver<SurfaceEvent>,
    commands: mpsc::UnboundedReceiver<PlaybackCommand>,
    cancel: watch::Receiver<bool>,
    autoplay_delay: Duration,
    error_check_delay: Duration,
    autoplay_at: Option<(LoadTicket, Instant)>,
    error_check_at: Option<(LoadTicket, Instant)>,
}

impl<S: RenderSurface> Driver<S> {
    #[instrument(skip(self))]
    async fn run(mut self, episode_url: String) -> PlaybackSession {
        self.session.begin_scan();

        let scan = tokio::select! {
            () = cancelled(&mut self.cancel) => None,
            result = self.resolver.resolve_candidates(&episode_url) => Some(result),
        };
        let directive = match scan {
            None => return self.shutdown().await,
            Some(Ok(candidates)) => self.session.candidates_ready(candidates),
            Some(Err(ScrapeError::NoCandidates { .. })) => {
                self.session.candidates_ready(Vec::new())
            }
            Some(Err(e)) => {
                warn!(error = %e, transport = e.is_transport(), "Episode scan failed");
                self.session.scan_failed();
                self.emit(PlaybackEvent::Failed {
                    reason: e.to_string(),
                });
                return self.shutdown().await;
            }
        };
        self.apply(directive).await;

        while !self.session.state().is_terminal() {
            tokio::select! {
                () = cancelled(&mut self.cancel) => {
                    debug!("Playback cancelled");
                    break;
                }
                Some(event) = self.surface_rx.recv() => self.on_surface_event(event).await,
                Some(command) = self.commands.recv() => self.on_command(command).await,
                () = deadline(self.autoplay_at), if self.autoplay_at.is_some() => {
                    self.fire_autoplay().await;
                }
                () = deadline(self.error_check_at), if self.error_check_at.is_some() => {
                    self.fire_error_check().await;
                }
            }
        }

        self.shutdown().await
    }

    async fn shutdown(mut self) -> PlaybackSession {
        self.clear_deferred();
        self.surface.stop().await;
        info!(state = %self.session.state(), loads = self.session.loads_issued(), "Playback session ended");
        self.session
    }

    /// Execute a directive, following up on loads the surface rejects outright.
    async fn apply(&mut self, mut directive: Directive) {
        loop {
            directive = match directive {
                Directive::Load { ticket, index, url } => {
                    self.clear_deferred();
                    info!(index, url = %url, "Loading candidate");
                    self.emit(PlaybackEvent::LoadingCandidate {
                        index,
                        url: url.clone(),
                    });
                    let request = self.load_request(ticket, url);
                    match self.surface.load(request).await {
                        Ok(()) => return,
                        Err(e) => {
                            warn!(index, error = %e, "Surface refused candidate");
                            self.session.fail(ticket)
                        }
                    }
                }
                Directive::Probe { ticket } => {
                    self.probe(ticket).await;
                    return;
                }
                Directive::Confirm { index } => {
                    self.clear_deferred();
                    info!(index, "Playback confirmed");
                    self.emit(PlaybackEvent::Confirmed { index });
                    return;
                }
                Directive::Exhaust => {
                    self.clear_deferred();
                    warn!(candidates = self.session.candidates().len(), "No working server found");
                    self.emit(PlaybackEvent::Exhausted);
                    return;
                }
                Directive::Ignore => return,
            };
        }
    }

    fn load_request(&self, ticket: LoadTicket, url: String) -> LoadRequest {
        let mut headers = HeaderMap::new();
        match HeaderValue::from_str(&self.resolver.config().site.referer()) {
            Ok(value) => {
                headers.insert(REFERER, value);
            }
            Err(e) => warn!(error = %e, "Invalid referer, loading without it"),
        }
        let context = SurfaceContext::new(
            ticket,
            host_of(&url).unwrap_or_default(),
            Arc::clone(&self.filter),
            self.surface_tx.clone(),
        );
        LoadRequest {
            url,
            headers,
            context,
        }
    }

    async fn probe(&mut self, ticket: LoadTicket) {
        let injected = [
            self.filter.style_injection_script(),
            self.filter.dom_countermeasures().to_string(),
            scripts::RESUME_DETECTOR.to_string(),
            scripts::PLAYING_LISTENER.to_string(),
        ];
        for script in &injected {
            self.evaluate(script).await;
        }
        let now = Instant::now();
        self.autoplay_at = Some((ticket, now + self.autoplay_delay));
        self.error_check_at = Some((ticket, now + self.error_check_delay));
    }

    async fn fire_autoplay(&mut self) {
        if let Some((ticket, _)) = self.autoplay_at.take() {
            if self.session.deferred_allowed(ticket) {
                debug!(%ticket, "Autoplay nudge");
                self.evaluate(scripts::AUTOPLAY).await;
            }
        }
    }

    async fn fire_error_check(&mut self) {
        if let Some((ticket, _)) = self.error_check_at.take() {
            if self.session.deferred_allowed(ticket) {
                debug!(%ticket, "Visual error check");
                self.evaluate(scripts::ERROR_CHECK).await;
            }
        }
    }

    fn clear_deferred(&mut self) {
        self.autoplay_at = None;
        self.error_check_at = None;
    }

    async fn on_surface_event(&mut self, event: SurfaceEvent) {
        let SurfaceEvent { ticket, kind } = event;
        if !self.session.is_current(ticket) {
            trace!(%ticket, ?kind, "Dropping stale surface event");
            return;
        }
        match kind {
            SurfaceEventKind::PageFinished => {
                let directive = self.session.page_finished(ticket);
                self.apply(directive).await;
            }
            SurfaceEventKind::LoadFailed { reason } => {
                debug!(%ticket, reason = %reason, "Candidate failed to load");
                let directive = self.session.fail(ticket);
                self.apply(directive).await;
            }
            SurfaceEventKind::ErrorDetected => {
                debug!(%ticket, "Candidate shows an error page");
                let directive = self.session.fail(ticket);
                self.apply(directive).await;
            }
            SurfaceEventKind::VideoStarted => {
                let directive = self.session.video_started(ticket);
                self.apply(directive).await;
            }
            SurfaceEventKind::PlayPauseToggled(state) => {
                self.emit(PlaybackEvent::PlayPause(state));
            }
            SurfaceEventKind::ResumePromptDetected { timestamp } => {
                self.emit(PlaybackEvent::ResumePrompt { timestamp });
            }
            SurfaceEventKind::MediaRequested { url } => {
                if self.session.record_sniffed(&url) {
                    info!(url = %url, "Sniffed direct media URL");
                    self.emit(PlaybackEvent::MediaSniffed { url });
                }
            }
        }
    }

    async fn on_command(&mut self, command: PlaybackCommand) {
        if !self.session.has_document() {
            debug!(?command, "No candidate on the surface yet");
            return;
        }
        match command {
            PlaybackCommand::Seek(seconds) => self.evaluate(&scripts::seek(seconds)).await,
            PlaybackCommand::TogglePlayPause => self.evaluate(scripts::TOGGLE_PLAY_PAUSE).await,
            PlaybackCommand::AnswerResume(resume) => {
                self.evaluate(&scripts::answer_resume(resume)).await;
                // The player often sits paused behind the dialog
                if let Some(ticket) = self.session.current_ticket() {
                    if self.session.deferred_allowed(ticket) {
                        self.autoplay_at = Some((ticket, Instant::now() + self.autoplay_delay));
                    }
                }
            }
        }
    }

    async fn evaluate(&mut self, script: &str) {
        if let Err(e) = self.surface.evaluate_script(script).await {
            debug!(error = %e, "Script evaluation failed");
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        // Host may have stopped listening
        let _ = self.events.send(event);
    }
}

/// Resolves once cancellation is requested or the handle is gone.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            return;
        }
    }
}

async fn deadline(at: Option<(LoadTicket, Instant)>) {
    match at {
        Some((_, at)) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::config::Config;
    use crate::error::Result as ScrapeResult;
    use crate::http_client::{DocumentSource, FetchedDocument};
    use crate::playback::{PlaybackState, RequestVerdict};

    const EPISODE: &str = "https://ww93.pencurimovie.bond/episode/show-1x01/";

    struct Pages(HashMap<String, String>);

    #[async_trait]
    impl DocumentSource for Pages {
        async fn fetch(&self, url: &str, _extra: &HeaderMap) -> ScrapeResult<FetchedDocument> {
            self.0
                .get(url)
                .map(|html| FetchedDocument {
                    html: html.clone(),
                    final_url: url.to_string(),
                })
                .ok_or_else(|| ScrapeError::Http {
                    status: 500,
                    url: url.to_string(),
                })
        }

        async fn resolve_redirect(&self, url: &str) -> ScrapeResult<String> {
            Ok(url.to_string())
        }
    }

    fn episode_page(hosts: &[&str]) -> String {
        hosts
            .iter()
            .enumerate()
            .map(|(i, h)| format!(r#"<div id="tab{i}"><iframe src="https://{h}/e/{i}"></iframe></div>"#))
            .collect()
    }

    fn orchestrator(page: Option<String>) -> PlaybackOrchestrator {
        let mut pages = HashMap::new();
        if let Some(html) = page {
            pages.insert(EPISODE.to_string(), html);
        }
        let mut config = Config::default();
        config.playback.autoplay_delay_ms = 5;
        config.playback.error_check_delay_ms = 20;
        PlaybackOrchestrator::new(Resolver::with_source(Arc::new(Pages(pages)), config))
    }

    /// How a fake candidate behaves once loaded.
    #[derive(Clone, Copy)]
    enum Behavior {
        /// Engine reports a load failure.
        Unreachable,
        /// Page loads, then the visual check finds "File not found".
        NotFound,
        /// Page loads and the video starts; also requests a playlist.
        Plays,
        /// Page loads and nothing ever happens.
        Silent,
    }

    #[derive(Default)]
    struct Log {
        loads: Vec<LoadRequest>,
        scripts: Vec<String>,
        stopped: bool,
    }

    struct FakeSurface {
        behaviors: Vec<Behavior>,
        current: Option<(Behavior, SurfaceContext)>,
        log: Arc<Mutex<Log>>,
    }

    impl FakeSurface {
        fn new(behaviors: &[Behavior]) -> (Self, Arc<Mutex<Log>>) {
            let log = Arc::new(Mutex::new(Log::default()));
            let surface = Self {
                behaviors: behaviors.to_vec(),
                current: None,
                log: Arc::clone(&log),
            };
            (surface, log)
        }
    }

    #[async_trait]
    impl RenderSurface for FakeSurface {
        async fn load(&mut self, request: LoadRequest) -> anyhow::Result<()> {
            let mut log = self.log.lock().unwrap();
            let behavior = self.behaviors[log.loads.len()];
            let ctx = request.context.clone();
            log.loads.push(request);
            drop(log);

            match behavior {
                Behavior::Unreachable => ctx.load_failed("connection refused"),
                Behavior::Plays => {
                    assert_eq!(
                        ctx.intercept("https://cdn.example/hls/index.m3u8"),
                        RequestVerdict::Allow
                    );
                    ctx.page_finished();
                }
                Behavior::NotFound | Behavior::Silent => ctx.page_finished(),
            }
            self.current = Some((behavior, ctx));
            Ok(())
        }

        async fn evaluate_script(&mut self, script: &str) -> anyhow::Result<()> {
            self.log.lock().unwrap().scripts.push(script.to_string());
            let Some((behavior, ctx)) = &self.current else {
                return Ok(());
            };
            match behavior {
                Behavior::Plays if script == scripts::PLAYING_LISTENER => {
                    ctx.bridge_call("videoStarted", None);
                }
                Behavior::NotFound if script == scripts::ERROR_CHECK => {
                    ctx.bridge_call("errorDetected", None);
                }
                Behavior::Plays if script == scripts::TOGGLE_PLAY_PAUSE => {
                    ctx.bridge_call("playPauseToggled", Some("pause"));
                }
                _ => {}
            }
            Ok(())
        }

        async fn stop(&mut self) {
            self.log.lock().unwrap().stopped = true;
        }
    }

    async fn collect_until_terminal(handle: &mut PlaybackHandle) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();
        while let Some(event) = handle.next_event().await {
            let done = matches!(
                event,
                PlaybackEvent::Confirmed { .. } | PlaybackEvent::Exhausted | PlaybackEvent::Failed { .. }
            );
            events.push(event);
            if done {
                break;
            }
        }
        events
    }

    #[tokio::test]
    async fn falls_back_until_a_candidate_plays() {
        let page = episode_page(&["a.example", "b.example", "voe.sx"]);
        let (surface, log) =
            FakeSurface::new(&[Behavior::Unreachable, Behavior::NotFound, Behavior::Plays]);
        let mut handle = orchestrator(Some(page)).start(EPISODE, surface);

        let events = collect_until_terminal(&mut handle).await;
        let indexes: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                PlaybackEvent::LoadingCandidate { index, .. } => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(indexes, vec![0, 1, 2]);
        assert!(events.contains(&PlaybackEvent::MediaSniffed {
            url: "https://cdn.example/hls/index.m3u8".to_string()
        }));
        assert_eq!(events.last(), Some(&PlaybackEvent::Confirmed { index: 2 }));

        handle.cancel();
        let session = handle.join().await.unwrap();
        assert_eq!(session.state(), PlaybackState::Confirmed(2));
        assert_eq!(session.cursor(), 2);
        assert_eq!(session.sniffed_media_url(), Some("https://cdn.example/hls/index.m3u8"));

        let log = log.lock().unwrap();
        assert!(log.stopped);
        assert_eq!(log.loads.len(), 3);
        assert_eq!(
            log.loads[0].headers.get(REFERER).unwrap(),
            "https://ww93.pencurimovie.bond/"
        );
    }

    #[tokio::test]
    async fn exhausts_after_every_candidate_fails() {
        let page = episode_page(&["a.example", "b.example"]);
        let (surface, log) = FakeSurface::new(&[Behavior::NotFound, Behavior::Unreachable]);
        let mut handle = orchestrator(Some(page)).start(EPISODE, surface);

        let events = collect_until_terminal(&mut handle).await;
        assert_eq!(events.last(), Some(&PlaybackEvent::Exhausted));
        assert_eq!(handle.next_event().await, None);

        let session = handle.join().await.unwrap();
        assert_eq!(session.state(), PlaybackState::Exhausted);
        assert_eq!(session.loads_issued(), 2);
        assert!(log.lock().unwrap().stopped);
    }

    #[tokio::test]
    async fn page_without_candidates_is_exhausted() {
        let (surface, log) = FakeSurface::new(&[]);
        let mut handle = orchestrator(Some("<p>no player</p>".to_string())).start(EPISODE, surface);

        assert_eq!(handle.next_event().await, Some(PlaybackEvent::Exhausted));
        assert_eq!(handle.next_event().await, None);
        assert!(log.lock().unwrap().loads.is_empty());
    }

    #[tokio::test]
    async fn unreachable_episode_page_fails() {
        let (surface, _log) = FakeSurface::new(&[]);
        let mut handle = orchestrator(None).start(EPISODE, surface);

        match handle.next_event().await {
            Some(PlaybackEvent::Failed { reason }) => assert!(reason.contains("500"), "{reason}"),
            other => panic!("expected failure, got {other:?}"),
        }
        let session = handle.join().await.unwrap();
        assert_eq!(session.state(), PlaybackState::Failed);
    }

    #[tokio::test]
    async fn controls_reach_confirmed_candidate() {
        let page = episode_page(&["voe.sx"]);
        let (surface, log) = FakeSurface::new(&[Behavior::Plays]);
        let mut handle = orchestrator(Some(page)).start(EPISODE, surface);
        collect_until_terminal(&mut handle).await;

        handle.skip_backward();
        handle.answer_resume(true);
        handle.toggle_play_pause();
        assert_eq!(
            handle.next_event().await,
            Some(PlaybackEvent::PlayPause(PlayState::Paused))
        );

        let scripts_run = log.lock().unwrap().scripts.clone();
        assert!(scripts_run.contains(&scripts::seek(-10)));
        assert!(scripts_run.contains(&scripts::answer_resume(true)));
    }

    async fn wait_for_autoplays(log: &Mutex<Log>, count: usize) {
        let reached = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let seen = log
                    .lock()
                    .unwrap()
                    .scripts
                    .iter()
                    .filter(|s| s.as_str() == scripts::AUTOPLAY)
                    .count();
                if seen >= count {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await;
        assert!(reached.is_ok(), "autoplay nudge #{count} never ran");
    }

    #[tokio::test]
    async fn answering_resume_prompt_nudges_autoplay_again() {
        let page = episode_page(&["a.example"]);
        let (surface, log) = FakeSurface::new(&[Behavior::Silent]);
        let mut handle = orchestrator(Some(page)).start(EPISODE, surface);

        assert!(matches!(
            handle.next_event().await,
            Some(PlaybackEvent::LoadingCandidate { index: 0, .. })
        ));
        wait_for_autoplays(&log, 1).await;

        handle.answer_resume(false);
        wait_for_autoplays(&log, 2).await;

        let scripts_run = log.lock().unwrap().scripts.clone();
        let answered = scripts_run
            .iter()
            .position(|s| *s == scripts::answer_resume(false))
            .unwrap();
        let last_nudge = scripts_run
            .iter()
            .rposition(|s| s.as_str() == scripts::AUTOPLAY)
            .unwrap();
        assert!(answered < last_nudge);

        handle.cancel();
        let session = handle.join().await.unwrap();
        assert_eq!(session.state(), PlaybackState::Probing(0));
    }

    #[tokio::test]
    async fn cancel_stops_surface_and_silences_events() {
        let page = episode_page(&["a.example"]);
        let (surface, log) = FakeSurface::new(&[Behavior::Silent]);
        let mut handle = orchestrator(Some(page)).start(EPISODE, surface);

        assert!(matches!(
            handle.next_event().await,
            Some(PlaybackEvent::LoadingCandidate { index: 0, .. })
        ));
        handle.cancel();
        assert_eq!(handle.next_event().await, None);

        let session = handle.join().await.unwrap();
        assert!(matches!(
            session.state(),
            PlaybackState::Loading(0) | PlaybackState::Probing(0)
        ));
        assert!(log.lock().unwrap().stopped);
    }
}
