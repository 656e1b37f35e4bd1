/// PlayerCore: single-owner event loop around the segment controller.
///
/// Everything that can change playback state (commands, media element
/// signals, the delayed error auto-advance) arrives as a `PlayerEvent` on one
/// mpsc channel.  PlayerCore owns the controller exclusively; handlers run
/// one at a time, so a watcher swap inside an operation is never interleaved
/// with another callback.
///
/// After each event the core compares a fresh `PlayerSnapshot` with the last
/// one and broadcasts `Broadcast::State` only when something changed.
use segment_proto::protocol::{Broadcast, Command, PlayerSnapshot};
use segment_proto::Segment;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::controller::{Direction, PlaybackSettings, SegmentController};
use crate::media::{MediaElement, MediaEvent};
use crate::view::ListView;

// ── PlayerEvent ───────────────────────────────────────────────────────────────

/// All inputs into the PlayerCore loop.
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    /// A user intent.
    Command(Command),
    /// A signal from the media element.
    Media(MediaEvent),
    /// The delay after a playback error has elapsed.
    ErrorAdvanceDue,
    /// Shutdown requested.
    Shutdown,
}

// ── PlayerCore ────────────────────────────────────────────────────────────────

pub struct PlayerCore<M> {
    controller: SegmentController<M, ListView>,
    /// Clone of our own inbox, used to post timer callbacks back in.
    event_tx: mpsc::Sender<PlayerEvent>,
    broadcast_tx: broadcast::Sender<Broadcast>,
    rev: u64,
    last_snapshot: Option<PlayerSnapshot>,
}

impl<M: MediaElement + Send + 'static> PlayerCore<M> {
    pub fn new(
        segments: Vec<Segment>,
        media: M,
        settings: PlaybackSettings,
        event_tx: mpsc::Sender<PlayerEvent>,
        broadcast_tx: broadcast::Sender<Broadcast>,
    ) -> Self {
        let view = ListView::new(&segments);
        Self {
            controller: SegmentController::new(segments, media, view, settings),
            event_tx,
            broadcast_tx,
            rev: 0,
            last_snapshot: None,
        }
    }

    pub fn controller(&self) -> &SegmentController<M, ListView> {
        &self.controller
    }

    /// Run until `Shutdown` or `Command::Quit` arrives.
    /// Returns the controller so callers can inspect the final state.
    pub async fn run(
        mut self,
        mut event_rx: mpsc::Receiver<PlayerEvent>,
    ) -> anyhow::Result<SegmentController<M, ListView>> {
        info!(
            "PlayerCore: starting event loop ({} segments)",
            self.controller.len()
        );
        self.broadcast_state(true);

        while let Some(evt) = event_rx.recv().await {
            match evt {
                PlayerEvent::Shutdown | PlayerEvent::Command(Command::Quit) => {
                    info!("PlayerCore: shutdown requested");
                    break;
                }
                PlayerEvent::Command(cmd) => {
                    info!("PlayerCore: command {:?}", cmd);
                    let force = matches!(cmd, Command::GetState);
                    self.handle_command(cmd);
                    self.after_event(force);
                }
                PlayerEvent::Media(evt) => {
                    self.handle_media_event(evt);
                    self.after_event(false);
                }
                PlayerEvent::ErrorAdvanceDue => {
                    self.controller.fire_error_advance();
                    self.after_event(false);
                }
            }
        }

        Ok(self.controller)
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::TogglePause => self.controller.toggle_play_pause(),
            Command::Next => self.controller.advance(Direction::Next),
            Command::Prev => self.controller.advance(Direction::Prev),
            Command::Shuffle => self.controller.shuffle(),
            Command::Activate { index, target } => {
                if let Err(e) = self.controller.on_segment_activated(index, target) {
                    warn!("PlayerCore: activate failed: {}", e);
                }
            }
            Command::SetHidden { indices } => self.controller.view_mut().set_hidden(&indices),
            Command::ShowAll => self.controller.view_mut().show_all(),
            Command::GetState | Command::Quit => {}
        }
    }

    fn handle_media_event(&mut self, evt: MediaEvent) {
        match evt {
            MediaEvent::TimeUpdate => self.controller.on_time_update(),
            MediaEvent::Playing => debug!("media: playing"),
            MediaEvent::Paused => debug!("media: paused"),
            MediaEvent::Error(kind) => self.controller.on_media_error(kind),
        }
    }

    fn after_event(&mut self, force_broadcast: bool) {
        if let Some(banner) = self.controller.take_new_banner() {
            let _ = self.broadcast_tx.send(Broadcast::Banner {
                index: banner.index,
                message: banner.message.to_string(),
            });
        }
        if let Some(advance) = self.controller.take_scheduled_advance() {
            let tx = self.event_tx.clone();
            let delay = advance.delay;
            let _ = self.broadcast_tx.send(Broadcast::AdvanceScheduled {
                delay_ms: delay.as_millis() as u64,
            });
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(PlayerEvent::ErrorAdvanceDue).await;
            });
        }
        self.broadcast_state(force_broadcast);
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        let c = &self.controller;
        PlayerSnapshot {
            rev: self.rev,
            cursor: c.cursor(),
            current: c.current(),
            order: c.order().to_vec(),
            status: c.status(),
            volume: c.media().volume(),
            position_secs: c.media().current_time(),
            source: c.media().source(),
            countdown: c.countdown().map(str::to_string),
        }
    }

    fn broadcast_state(&mut self, force: bool) {
        let mut snapshot = self.snapshot();
        let unchanged = self
            .last_snapshot
            .as_ref()
            .is_some_and(|last| PlayerSnapshot { rev: last.rev, ..snapshot.clone() } == *last);
        if unchanged && !force {
            return;
        }
        self.rev += 1;
        snapshot.rev = self.rev;
        self.last_snapshot = Some(snapshot.clone());
        let _ = self.broadcast_tx.send(Broadcast::State { data: snapshot });
    }
}
