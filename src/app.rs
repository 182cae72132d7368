//! Application orchestration layer
//!
//! Wires the feed service, the input thread, and the board renderer
//! together. The runtime here is the single owner of `BoardState`; the feed
//! and the input thread only reach it through channels, which keeps snapshot
//! replacement atomic without locking.

use crate::board::renderer::BoardRenderer;
use crate::board::state::BoardState;
use crate::board::ticker::default_announcements;
use crate::error::{BoardError, Result};
use crate::feed::backoff;
use crate::feed::protocol::{FeedCommand, FeedUpdate};
use crate::feed::service::{feed_service_loop, FeedConfig};
use crate::feed::source::SseSource;
use crate::input::{spawn_input_thread, InputAction};
use chrono::Local;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Poll interval for the blocking input thread.
const INPUT_POLL: Duration = Duration::from_millis(50);

/// Countdown/clock refresh cadence.
const REFRESH_PERIOD: Duration = Duration::from_secs(1);

/// One marquee animation step; this, together with the announcement length,
/// governs how often the ticker rotates.
const MARQUEE_STEP: Duration = Duration::from_millis(120);

/// Startup configuration assembled from the command line.
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Initial feed endpoint URL; may be empty (set later with the `e` key).
    pub endpoint: String,
    /// Stream event name carrying allocation updates.
    pub event_name: String,
    /// Upper bound on the reconnection delay.
    pub max_backoff_ms: u64,
    /// Line name shown in the header.
    pub line_name: String,
    /// Platform number shown in the header.
    pub platform: String,
}

/// Application orchestrator - owns the board state and coordinates the feed,
/// input, and render components.
pub struct Application {
    state: BoardState,
    renderer: Box<dyn BoardRenderer>,
    commands: mpsc::UnboundedSender<FeedCommand>,
    /// Taken by `run`; the loop owns the receiver while it is live.
    updates: Option<mpsc::UnboundedReceiver<FeedUpdate>>,
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("state", &self.state)
            .field("renderer", &"<dyn BoardRenderer>")
            .field("commands", &self.commands)
            .field("updates", &self.updates)
            .finish()
    }
}

impl Application {
    /// Create the application and spawn the feed service.
    pub fn new(options: AppOptions, renderer: Box<dyn BoardRenderer>) -> Result<Self> {
        let max_delay = Duration::from_millis(options.max_backoff_ms);
        if max_delay < backoff::INITIAL_DELAY {
            return Err(BoardError::config(format!(
                "max backoff {}ms is below the initial delay {}ms",
                options.max_backoff_ms,
                backoff::INITIAL_DELAY.as_millis()
            )));
        }

        let config = FeedConfig {
            event_name: options.event_name,
            initial_delay: backoff::INITIAL_DELAY,
            max_delay,
        };

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        tokio::spawn(feed_service_loop(
            config,
            Arc::new(SseSource::new()),
            command_rx,
            update_tx,
        ));

        Ok(Self {
            state: BoardState::new(options.endpoint, default_announcements(), 80, 24),
            renderer,
            commands: command_tx,
            updates: Some(update_rx),
        })
    }

    /// Run the application - event loop over input, feed updates, and timers.
    pub async fn run(&mut self) -> Result<()> {
        self.renderer.initialize()?;
        let (width, height) = self.renderer.get_terminal_size()?;
        self.state.resize(width, height);

        // Subscribe immediately. An empty or malformed endpoint fails at the
        // transport layer and rides the retry loop like any other outage.
        self.send_command(FeedCommand::SetEndpoint(self.state.endpoint.clone()))?;

        let mut updates = self
            .updates
            .take()
            .ok_or_else(|| BoardError::other("application is already running"))?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let (input_tx, mut input_rx) = mpsc::unbounded_channel();
        let input_thread = spawn_input_thread(input_tx, Arc::clone(&shutdown), INPUT_POLL);

        let mut refresh = tokio::time::interval(REFRESH_PERIOD);
        let mut marquee = tokio::time::interval(MARQUEE_STEP);

        let mut running = true;
        while running {
            tokio::select! {
                action = input_rx.recv() => match action {
                    Some(action) => running = self.handle_action(action)?,
                    None => running = false,
                },
                update = updates.recv() => match update {
                    Some(update) => self.handle_update(update),
                    None => running = false,
                },
                _ = refresh.tick() => self.state.refresh(Local::now()),
                _ = marquee.tick() => self.state.step_ticker(),
            }

            // Render after handling the event; the marquee tick bounds the
            // repaint rate.
            self.renderer.render(&self.state)?;
        }

        shutdown.store(true, Ordering::SeqCst);
        let _ = self.commands.send(FeedCommand::Shutdown);
        let _ = input_thread.join();
        self.renderer.cleanup()?;
        Ok(())
    }

    /// Apply an input action - returns false if the application should quit.
    fn handle_action(&mut self, action: InputAction) -> Result<bool> {
        match action {
            InputAction::Quit => Ok(false),
            InputAction::StartEndpointEntry => {
                self.state.endpoint_entry = Some(String::new());
                Ok(true)
            }
            InputAction::UpdateEndpointBuffer(buffer) => {
                self.state.endpoint_entry = Some(buffer);
                Ok(true)
            }
            InputAction::CancelEndpointEntry => {
                self.state.endpoint_entry = None;
                Ok(true)
            }
            InputAction::SubmitEndpoint(url) => {
                self.state.endpoint_entry = None;
                self.state.endpoint = url.clone();
                self.send_command(FeedCommand::SetEndpoint(url))?;
                Ok(true)
            }
            InputAction::Resize { width, height } => {
                self.state.resize(width, height);
                Ok(true)
            }
            InputAction::NoAction | InputAction::InvalidInput => Ok(true),
        }
    }

    fn handle_update(&mut self, update: FeedUpdate) {
        match update {
            FeedUpdate::Snapshot(snapshot) => self.state.apply_snapshot(snapshot),
            FeedUpdate::Status(status) => self.state.status = status,
        }
    }

    fn send_command(&self, command: FeedCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| BoardError::other("feed service unavailable"))
    }
}
