//! SimulatedMedia: a virtual-clock media element for headless runs.
//!
//! Cloning shares the same element: the controller holds one handle and the
//! clock task holds another.  The clock advances the position while playing
//! and forwards queued element events (`Playing`, `Paused`, `Error`) followed
//! by a `TimeUpdate`, the way a browser fires `timeupdate` a few times per
//! second.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::core::PlayerEvent;
use crate::media::{MediaElement, MediaError, MediaErrorKind, MediaEvent};

#[derive(Debug)]
struct SimState {
    src: Option<String>,
    time: f64,
    volume: f64,
    paused: bool,
    /// Current source failed to load; position never advances.
    load_failed: bool,
    unavailable: HashSet<String>,
    pending: VecDeque<MediaEvent>,
}

#[derive(Debug, Clone)]
pub struct SimulatedMedia {
    inner: Arc<Mutex<SimState>>,
}

impl Default for SimulatedMedia {
    fn default() -> Self {
        Self::new(std::iter::empty::<String>())
    }
}

impl SimulatedMedia {
    /// `unavailable` lists URLs that fail to load once played.
    pub fn new<I, S>(unavailable: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: Arc::new(Mutex::new(SimState {
                src: None,
                time: 0.0,
                volume: 1.0,
                paused: true,
                load_failed: false,
                unavailable: unavailable.into_iter().map(Into::into).collect(),
                pending: VecDeque::new(),
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, SimState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Advance the clock by `dt` seconds and collect the events a real
    /// element would have fired in that span.
    pub fn advance(&self, dt: f64) -> Vec<MediaEvent> {
        let mut state = self.state();
        let mut events: Vec<MediaEvent> = state.pending.drain(..).collect();
        if !state.paused && !state.load_failed && state.src.is_some() {
            state.time += dt;
            events.push(MediaEvent::TimeUpdate);
        }
        events
    }

    /// Drive the element from a tokio interval, forwarding its events into
    /// the player core.  Ends when the core's channel closes.
    pub fn spawn_clock(
        &self,
        tick: Duration,
        event_tx: mpsc::Sender<PlayerEvent>,
    ) -> tokio::task::JoinHandle<()> {
        let media = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                for evt in media.advance(tick.as_secs_f64()) {
                    if event_tx.send(PlayerEvent::Media(evt)).await.is_err() {
                        debug!("sim clock: core gone, stopping");
                        return;
                    }
                }
            }
        })
    }
}

impl MediaElement for SimulatedMedia {
    fn set_source(&mut self, url: &str) -> Result<(), MediaError> {
        if url.trim().is_empty() {
            return Err(MediaError::new(
                MediaErrorKind::SourceNotSupported,
                "empty source URL",
            ));
        }
        let mut state = self.state();
        state.load_failed = state.unavailable.contains(url);
        state.src = Some(url.to_string());
        state.time = 0.0;
        Ok(())
    }

    fn source(&self) -> Option<String> {
        self.state().src.clone()
    }

    fn seek(&mut self, seconds: f64) {
        self.state().time = seconds.max(0.0);
    }

    fn current_time(&self) -> f64 {
        self.state().time
    }

    fn set_volume(&mut self, volume: f64) {
        self.state().volume = volume.clamp(0.0, 1.0);
    }

    fn volume(&self) -> f64 {
        self.state().volume
    }

    fn play(&mut self) {
        let mut state = self.state();
        if state.paused {
            state.paused = false;
            state.pending.push_back(MediaEvent::Playing);
        }
        if state.load_failed {
            info!(
                "sim: source {} unavailable",
                state.src.as_deref().unwrap_or("")
            );
            state
                .pending
                .push_back(MediaEvent::Error(MediaErrorKind::SourceNotSupported));
        }
    }

    fn pause(&mut self) {
        let mut state = self.state();
        if !state.paused {
            state.paused = true;
            state.pending.push_back(MediaEvent::Paused);
        }
    }

    fn is_paused(&self) -> bool {
        self.state().paused
    }
}
