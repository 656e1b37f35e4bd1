//! SegmentController: the playback and ordering state machine.
//!
//! Owns the fixed segment list, the logical→original `order` permutation, the
//! cursor into it, and at most one watcher bound to the media element's
//! position updates.  Every operation runs to completion on the caller's
//! thread, so "detach the old watcher, attach the new one" can never be
//! observed half-done.
//!
//! ```text
//!  order:   [2, 0, 3, 1]      order[cursor] = active original index
//!  cursor:      ^ 1
//! ```

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use segment_proto::config::PlaybackConfig;
use segment_proto::format_clock;
use segment_proto::protocol::{ClickTarget, PlaybackStatus};
use segment_proto::Segment;
use tracing::{debug, info, warn};

use crate::media::{MediaElement, MediaErrorKind};
use crate::view::SegmentView;

/// Watcher, fade and auto-advance timing.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSettings {
    pub fade_window_secs: f64,
    pub fade_floor: f64,
    pub restart_threshold_secs: f64,
    pub error_advance_delay: Duration,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self::from(&PlaybackConfig::default())
    }
}

impl From<&PlaybackConfig> for PlaybackSettings {
    fn from(cfg: &PlaybackConfig) -> Self {
        Self {
            fade_window_secs: cfg.fade_window_secs,
            fade_floor: cfg.fade_floor.clamp(0.0, 1.0),
            restart_threshold_secs: cfg.restart_threshold_secs,
            error_advance_delay: Duration::from_millis(cfg.error_advance_delay_ms),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Prev,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PlayerError {
    #[error("logical position {position} out of range ({len} segments)")]
    PositionOutOfRange { position: usize, len: usize },
    #[error("no segment with original index {0}")]
    UnknownSegment(usize),
}

/// Identity of one attached watcher.  A new id is issued on every attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherId(u64);

#[derive(Debug, Clone, Copy)]
struct Watcher {
    id: WatcherId,
    original: usize,
    end: f64,
}

/// A one-shot auto-advance requested by the error handler.  The host fires
/// it after `delay` by calling `fire_error_advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledAdvance {
    pub delay: Duration,
}

/// An error banner the view has just shown, for hosts that mirror it elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorBanner {
    pub index: usize,
    pub message: &'static str,
}

pub struct SegmentController<M, V> {
    segments: Vec<Segment>,
    order: Vec<usize>,
    cursor: usize,
    watcher: Option<Watcher>,
    next_watcher_id: u64,
    first_play_done: bool,
    countdown: Option<String>,
    last_error: Option<MediaErrorKind>,
    scheduled: Option<ScheduledAdvance>,
    new_banner: Option<ErrorBanner>,
    settings: PlaybackSettings,
    media: M,
    view: V,
}

impl<M: MediaElement, V: SegmentView> SegmentController<M, V> {
    pub fn new(segments: Vec<Segment>, media: M, view: V, settings: PlaybackSettings) -> Self {
        let order = (0..segments.len()).collect();
        Self {
            segments,
            order,
            cursor: 0,
            watcher: None,
            next_watcher_id: 1,
            first_play_done: false,
            countdown: None,
            last_error: None,
            scheduled: None,
            new_banner: None,
            settings,
            media,
            view,
        }
    }

    // ── accessors ────────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Original index under the cursor, once something has been selected.
    pub fn current(&self) -> Option<usize> {
        if self.first_play_done {
            self.order.get(self.cursor).copied()
        } else {
            None
        }
    }

    pub fn active_watcher(&self) -> Option<WatcherId> {
        self.watcher.map(|w| w.id)
    }

    pub fn first_play_done(&self) -> bool {
        self.first_play_done
    }

    pub fn countdown(&self) -> Option<&str> {
        self.countdown.as_deref()
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn status(&self) -> PlaybackStatus {
        if !self.first_play_done {
            PlaybackStatus::Idle
        } else if self.last_error.is_some() {
            PlaybackStatus::Error
        } else if self.media.is_paused() {
            PlaybackStatus::Paused
        } else {
            PlaybackStatus::Playing
        }
    }

    /// Hand the pending error auto-advance (if any) to the host.
    pub fn take_scheduled_advance(&mut self) -> Option<ScheduledAdvance> {
        self.scheduled.take()
    }

    /// Banner shown by the last error, if the host has not collected it yet.
    pub fn take_new_banner(&mut self) -> Option<ErrorBanner> {
        self.new_banner.take()
    }

    fn is_last(&self) -> bool {
        self.cursor + 1 >= self.order.len()
    }

    /// First logical position at or after `from` whose segment is visible.
    fn next_visible_from(&self, from: usize) -> Option<usize> {
        (from..self.order.len()).find(|&pos| self.view.is_visible(self.order[pos]))
    }

    // ── operations ───────────────────────────────────────────────────────────

    /// Make `position` the active segment and start it from its `start`.
    pub fn select_and_play(&mut self, position: usize) -> Result<(), PlayerError> {
        if position >= self.order.len() {
            return Err(PlayerError::PositionOutOfRange {
                position,
                len: self.order.len(),
            });
        }
        self.play_position(position);
        Ok(())
    }

    /// Play/pause button.  The first press while paused starts the first
    /// visible segment; later presses resume in place.
    pub fn toggle_play_pause(&mut self) {
        if !self.media.is_paused() {
            debug!("controller: pause");
            self.media.pause();
            return;
        }

        if self.first_play_done {
            debug!("controller: resume");
            self.media.play();
            return;
        }

        match self.next_visible_from(0) {
            Some(position) => self.play_position(position),
            None => debug!("controller: nothing visible to play"),
        }
    }

    pub fn advance(&mut self, direction: Direction) {
        if self.order.is_empty() {
            return;
        }

        match direction {
            Direction::Next => {
                if self.is_last() {
                    debug!("controller: next at last position, ignoring");
                    return;
                }
                self.play_position(self.cursor + 1);
            }
            Direction::Prev => {
                let start = self.segments[self.order[self.cursor]].start;
                if self.media.current_time() - start > self.settings.restart_threshold_secs {
                    debug!("controller: prev mid-segment, restarting #{}", self.cursor);
                    self.play_position(self.cursor);
                } else if self.cursor > 0 {
                    self.play_position(self.cursor - 1);
                } else {
                    debug!("controller: prev at first position, ignoring");
                }
            }
        }
    }

    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut rand::thread_rng());
    }

    /// Shuffle the currently visible entries in place at the front of the
    /// order; hidden entries follow in their previous relative order.
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let (mut visible, hidden): (Vec<usize>, Vec<usize>) = self
            .order
            .iter()
            .copied()
            .partition(|&original| self.view.is_visible(original));

        if visible.is_empty() {
            debug!("controller: shuffle with nothing visible, ignoring");
            return;
        }

        visible.shuffle(rng);
        visible.extend(hidden);
        self.order = visible;

        info!("controller: shuffled order {:?}", self.order);

        self.detach_watcher();
        self.cursor = 0;
        self.view.clear_current();
        self.view.reorder(&self.order);
        self.play_position(0);
    }

    /// Direct click on a list entry.
    pub fn on_segment_activated(
        &mut self,
        original: usize,
        target: ClickTarget,
    ) -> Result<(), PlayerError> {
        if !target.activates_segment() {
            debug!("controller: click on {:?} of #{}, ignoring", target, original);
            return Ok(());
        }

        let position = self
            .order
            .iter()
            .position(|&i| i == original)
            .ok_or(PlayerError::UnknownSegment(original))?;

        self.view.reveal(original);
        self.play_position(position);
        Ok(())
    }

    /// Watcher tick: countdown, end-of-segment fade, stop and auto-advance.
    pub fn on_time_update(&mut self) {
        let Some(watcher) = self.watcher else {
            return;
        };

        let position = self.media.current_time();

        if position >= watcher.end {
            info!("controller: segment #{} reached its end", watcher.original);
            self.media.pause();
            self.media.set_volume(1.0);
            self.detach_watcher();

            if self.is_last() {
                return;
            }
            if let Some(next) = self.next_visible_from(self.cursor + 1) {
                self.view.reveal(self.order[next]);
                self.play_position(next);
            }
            return;
        }

        let remaining = watcher.end - position;
        let text = format_clock(remaining);
        self.view.show_countdown(watcher.original, &text);
        self.countdown = Some(text);

        let window = self.settings.fade_window_secs;
        if window > 0.0 && remaining <= window {
            let progress = remaining / window;
            let volume = progress + self.settings.fade_floor * (1.0 - progress);
            self.media.set_volume(volume);
        }
    }

    /// Playback failure on the active segment.  Never propagates: the entry
    /// gets a banner and, when still playing, a delayed move to the next one.
    pub fn on_media_error(&mut self, kind: MediaErrorKind) {
        let Some(&original) = self.order.get(self.cursor) else {
            return;
        };
        warn!(
            "controller: playback error {:?} on #{} ({})",
            kind, original, self.segments[original].url
        );

        self.last_error = Some(kind);
        self.countdown = None;
        let static_text = self.segments[original].duration_text();
        self.view.reset_duration(original, &static_text);
        self.view.clear_error(original);
        self.view.show_error(original, kind.banner_message());
        self.new_banner = Some(ErrorBanner {
            index: original,
            message: kind.banner_message(),
        });

        if !self.media.is_paused() && !self.is_last() {
            let delay = self.settings.error_advance_delay;
            debug!("controller: auto-advance in {:?}", delay);
            self.scheduled = Some(ScheduledAdvance { delay });
        }
    }

    /// Delayed auto-advance after an error.  A pause in the meantime
    /// cancels it.
    pub fn fire_error_advance(&mut self) {
        if self.media.is_paused() {
            debug!("controller: paused since error, auto-advance dropped");
            return;
        }
        if self.is_last() {
            return;
        }
        info!("controller: auto-advancing past failed segment");
        self.play_position(self.cursor + 1);
    }

    // ── internals ────────────────────────────────────────────────────────────

    /// `position` must be a valid logical position.
    fn play_position(&mut self, position: usize) {
        self.detach_watcher();

        self.cursor = position;
        self.first_play_done = true;
        let original = self.order[position];
        let (url, start, end) = {
            let seg = &self.segments[original];
            (seg.url.clone(), seg.start, seg.end)
        };

        self.view.mark_current(original);
        info!(
            "controller: playing #{} (pos {}) {:.2}–{:.2}s",
            original, position, start, end
        );

        if let Err(e) = self.media.set_source(&url) {
            warn!("controller: cannot assign source {}: {}", url, e);
            self.on_media_error(e.kind);
            return;
        }

        self.last_error = None;
        self.media.seek(start);
        self.media.set_volume(1.0);
        self.media.play();
        self.attach_watcher(original, end);
    }

    fn attach_watcher(&mut self, original: usize, end: f64) {
        let id = WatcherId(self.next_watcher_id);
        self.next_watcher_id += 1;
        self.watcher = Some(Watcher { id, original, end });
    }

    /// Drop the live watcher and put its entry back to the static readout.
    fn detach_watcher(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            let text = self.segments[watcher.original].duration_text();
            self.view.reset_duration(watcher.original, &text);
            self.countdown = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaError;
    use crate::view::{DurationLabel, ListView};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Default)]
    struct FakeMedia {
        src: Option<String>,
        time: f64,
        volume: f64,
        paused: bool,
        reject: Vec<String>,
        plays: usize,
    }

    impl MediaElement for FakeMedia {
        fn set_source(&mut self, url: &str) -> Result<(), MediaError> {
            if self.reject.iter().any(|r| r == url) {
                return Err(MediaError::new(MediaErrorKind::SourceNotSupported, url));
            }
            self.src = Some(url.to_string());
            Ok(())
        }
        fn source(&self) -> Option<String> {
            self.src.clone()
        }
        fn seek(&mut self, seconds: f64) {
            self.time = seconds;
        }
        fn current_time(&self) -> f64 {
            self.time
        }
        fn set_volume(&mut self, volume: f64) {
            self.volume = volume;
        }
        fn volume(&self) -> f64 {
            self.volume
        }
        fn play(&mut self) {
            self.paused = false;
            self.plays += 1;
        }
        fn pause(&mut self) {
            self.paused = true;
        }
        fn is_paused(&self) -> bool {
            self.paused
        }
    }

    fn seg(i: usize, start: f64, end: f64) -> Segment {
        Segment {
            url: format!("https://example.org/{i}.mp3"),
            start,
            end,
            label: format!("segment {i}"),
            episode: "2024-01-29".into(),
        }
    }

    fn three() -> Vec<Segment> {
        vec![seg(0, 0.0, 5.0), seg(1, 5.0, 9.0), seg(2, 9.0, 20.0)]
    }

    fn controller(segments: Vec<Segment>) -> SegmentController<FakeMedia, ListView> {
        let view = ListView::new(&segments);
        let media = FakeMedia {
            paused: true,
            volume: 1.0,
            ..Default::default()
        };
        SegmentController::new(segments, media, view, PlaybackSettings::default())
    }

    fn tick_at(c: &mut SegmentController<FakeMedia, ListView>, t: f64) {
        c.media_mut().time = t;
        c.on_time_update();
    }

    #[test]
    fn test_first_toggle_plays_first_visible() {
        let mut c = controller(three());
        c.view_mut().set_hidden(&[0]);
        c.toggle_play_pause();

        assert_eq!(c.cursor(), 1);
        assert_eq!(c.current(), Some(1));
        assert_eq!(c.view().current(), Some(1));
        assert_eq!(c.media().source().as_deref(), Some("https://example.org/1.mp3"));
        assert_eq!(c.media().current_time(), 5.0);
        assert!(!c.media().is_paused());
        assert!(c.active_watcher().is_some());
    }

    #[test]
    fn test_first_toggle_with_nothing_visible_is_noop() {
        let mut c = controller(three());
        c.view_mut().set_hidden(&[0, 1, 2]);
        c.toggle_play_pause();

        assert!(!c.first_play_done());
        assert!(c.media().source().is_none());
        assert!(c.active_watcher().is_none());
        assert_eq!(c.status(), PlaybackStatus::Idle);
    }

    #[test]
    fn test_toggle_pauses_and_resumes_in_place() {
        let mut c = controller(three());
        c.toggle_play_pause();
        tick_at(&mut c, 2.0);

        c.toggle_play_pause();
        assert!(c.media().is_paused());
        assert_eq!(c.status(), PlaybackStatus::Paused);

        c.toggle_play_pause();
        assert!(!c.media().is_paused());
        assert_eq!(c.cursor(), 0);
        assert_eq!(c.media().current_time(), 2.0);
        assert_eq!(c.media().plays, 2);
    }

    #[test]
    fn test_next_and_prev_stay_in_bounds() {
        let mut c = controller(three());
        c.toggle_play_pause();

        c.advance(Direction::Prev);
        assert_eq!(c.cursor(), 0);

        for _ in 0..5 {
            c.advance(Direction::Next);
        }
        assert_eq!(c.cursor(), 2);

        for _ in 0..5 {
            c.advance(Direction::Prev);
        }
        assert_eq!(c.cursor(), 0);
    }

    #[test]
    fn test_prev_near_start_moves_back() {
        let mut c = controller(three());
        c.select_and_play(1).unwrap();
        c.media_mut().time = 7.0; // exactly start + 2
        c.advance(Direction::Prev);
        assert_eq!(c.cursor(), 0);
        assert_eq!(c.media().current_time(), 0.0);
    }

    #[test]
    fn test_prev_mid_segment_restarts_current() {
        let mut c = controller(three());
        c.select_and_play(1).unwrap();
        let before = c.active_watcher();
        c.media_mut().time = 7.5;
        c.advance(Direction::Prev);

        assert_eq!(c.cursor(), 1);
        assert_eq!(c.media().current_time(), 5.0);
        assert_ne!(c.active_watcher(), before);
    }

    #[test]
    fn test_select_and_play_out_of_range() {
        let mut c = controller(three());
        assert_eq!(
            c.select_and_play(3),
            Err(PlayerError::PositionOutOfRange {
                position: 3,
                len: 3
            })
        );
        assert!(!c.first_play_done());
    }

    #[test]
    fn test_new_segment_replaces_watcher_and_resets_label() {
        let mut c = controller(three());
        c.select_and_play(0).unwrap();
        tick_at(&mut c, 1.2);
        assert_eq!(
            c.view().duration(0),
            Some(&DurationLabel::Countdown("0:03".to_string()))
        );
        let first = c.active_watcher().unwrap();

        c.advance(Direction::Next);
        let second = c.active_watcher().unwrap();
        assert_ne!(first, second);
        assert_eq!(
            c.view().duration(0),
            Some(&DurationLabel::Static("0:05".to_string()))
        );
        assert_eq!(c.view().current(), Some(1));
    }

    #[test]
    fn test_tick_countdown_and_fade() {
        let mut c = controller(vec![seg(0, 10.0, 13.0), seg(1, 13.0, 20.0)]);
        c.select_and_play(0).unwrap();

        tick_at(&mut c, 11.0);
        assert_eq!(c.countdown(), Some("0:02"));
        assert_eq!(c.media().volume(), 1.0);

        tick_at(&mut c, 12.5);
        assert_eq!(c.countdown(), Some("0:00"));
        let v = c.media().volume();
        assert!(v > 0.3 && v < 1.0, "volume {v}");
        let expected = (0.5 / 0.75) + 0.3 * (1.0 - 0.5 / 0.75);
        assert!((v - expected).abs() < 1e-9);
    }

    #[test]
    fn test_tick_at_end_advances_to_next() {
        let mut c = controller(three());
        c.select_and_play(0).unwrap();
        tick_at(&mut c, 4.9);
        tick_at(&mut c, 5.0);

        assert_eq!(c.cursor(), 1);
        assert_eq!(c.media().source().as_deref(), Some("https://example.org/1.mp3"));
        assert_eq!(c.media().current_time(), 5.0);
        assert_eq!(c.media().volume(), 1.0);
        assert!(!c.media().is_paused());
        assert_eq!(
            c.view().duration(0),
            Some(&DurationLabel::Static("0:05".to_string()))
        );
        assert_eq!(c.view().revealed(), Some(1));
    }

    #[test]
    fn test_tick_at_end_skips_hidden() {
        let mut c = controller(three());
        c.select_and_play(0).unwrap();
        c.view_mut().set_hidden(&[1]);
        tick_at(&mut c, 5.0);
        assert_eq!(c.cursor(), 2);
        assert_eq!(c.media().current_time(), 9.0);
    }

    #[test]
    fn test_tick_at_end_of_last_stops() {
        let mut c = controller(three());
        c.select_and_play(2).unwrap();
        tick_at(&mut c, 20.0);

        assert_eq!(c.cursor(), 2);
        assert!(c.media().is_paused());
        assert!(c.active_watcher().is_none());

        // further ticks are inert once detached
        tick_at(&mut c, 25.0);
        assert_eq!(c.countdown(), None);
    }

    #[test]
    fn test_tick_at_end_with_remaining_hidden_stops() {
        let mut c = controller(three());
        c.select_and_play(1).unwrap();
        c.view_mut().set_hidden(&[2]);
        tick_at(&mut c, 9.0);
        assert_eq!(c.cursor(), 1);
        assert!(c.media().is_paused());
        assert!(c.active_watcher().is_none());
    }

    #[test]
    fn test_shuffle_permutes_visible_and_keeps_hidden_tail() {
        let segments: Vec<Segment> = (0..8).map(|i| seg(i, i as f64, i as f64 + 1.0)).collect();
        let mut c = controller(segments);
        c.view_mut().set_hidden(&[1, 4, 6]);
        let mut rng = StdRng::seed_from_u64(7);
        c.shuffle_with(&mut rng);

        let order = c.order().to_vec();
        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..8).collect::<Vec<_>>());
        assert_eq!(&order[5..], &[1, 4, 6]);

        let mut head = order[..5].to_vec();
        head.sort_unstable();
        assert_eq!(head, vec![0, 2, 3, 5, 7]);

        assert_eq!(c.cursor(), 0);
        assert_eq!(c.view().current(), Some(order[0]));
        assert_eq!(c.view().display_order(), order.as_slice());
        assert_eq!(
            c.media().source(),
            Some(format!("https://example.org/{}.mp3", order[0]))
        );
    }

    #[test]
    fn test_second_shuffle_keeps_hidden_relative_order() {
        let segments: Vec<Segment> = (0..6).map(|i| seg(i, 0.0, 1.0)).collect();
        let mut c = controller(segments);
        let mut rng = StdRng::seed_from_u64(11);
        c.shuffle_with(&mut rng);
        let first = c.order().to_vec();

        let hidden = [first[0], first[3]];
        c.view_mut().set_hidden(&hidden);
        c.shuffle_with(&mut rng);
        assert_eq!(&c.order()[4..], &[first[0], first[3]]);
    }

    #[test]
    fn test_shuffle_with_nothing_visible_is_noop() {
        let mut c = controller(three());
        c.select_and_play(1).unwrap();
        c.view_mut().set_hidden(&[0, 1, 2]);
        let watcher = c.active_watcher();
        c.shuffle();

        assert_eq!(c.order(), &[0, 1, 2]);
        assert_eq!(c.cursor(), 1);
        assert_eq!(c.active_watcher(), watcher);
    }

    #[test]
    fn test_activation_uses_logical_position() {
        let mut c = controller(three());
        let mut rng = StdRng::seed_from_u64(3);
        c.shuffle_with(&mut rng);
        let target = c.order()[2];

        c.on_segment_activated(target, ClickTarget::Segment).unwrap();
        assert_eq!(c.cursor(), 2);
        assert_eq!(c.view().current(), Some(target));
    }

    #[test]
    fn test_activation_ignores_nested_targets() {
        let mut c = controller(three());
        c.on_segment_activated(1, ClickTarget::DebugLink).unwrap();
        c.on_segment_activated(1, ClickTarget::DurationReadout).unwrap();
        assert!(!c.first_play_done());
        assert!(c.media().source().is_none());

        assert_eq!(
            c.on_segment_activated(9, ClickTarget::Segment),
            Err(PlayerError::UnknownSegment(9))
        );
    }

    #[test]
    fn test_error_banner_and_schedule() {
        let mut c = controller(three());
        c.select_and_play(0).unwrap();
        tick_at(&mut c, 1.0);
        c.on_media_error(MediaErrorKind::Network);

        assert_eq!(
            c.view().banner(0),
            Some("A network error occurred while loading the audio.")
        );
        assert_eq!(
            c.view().duration(0),
            Some(&DurationLabel::Static("0:05".to_string()))
        );
        assert_eq!(c.status(), PlaybackStatus::Error);
        assert_eq!(
            c.take_scheduled_advance(),
            Some(ScheduledAdvance {
                delay: Duration::from_secs(3)
            })
        );
        assert_eq!(c.take_scheduled_advance(), None);

        c.fire_error_advance();
        assert_eq!(c.cursor(), 1);
        assert_eq!(c.status(), PlaybackStatus::Playing);
    }

    #[test]
    fn test_error_banner_replaces_stale_one() {
        let mut c = controller(three());
        c.select_and_play(0).unwrap();
        c.on_media_error(MediaErrorKind::Network);
        c.on_media_error(MediaErrorKind::Decode);
        assert_eq!(
            c.view().banner(0),
            Some("Sorry, this audio segment is no longer available.")
        );
    }

    #[test]
    fn test_error_while_paused_or_last_schedules_nothing() {
        let mut c = controller(three());
        c.select_and_play(0).unwrap();
        c.toggle_play_pause();
        c.on_media_error(MediaErrorKind::Network);
        assert_eq!(c.take_scheduled_advance(), None);

        let mut c = controller(three());
        c.select_and_play(2).unwrap();
        c.on_media_error(MediaErrorKind::Network);
        assert_eq!(c.take_scheduled_advance(), None);
    }

    #[test]
    fn test_pause_before_fire_cancels_advance() {
        let mut c = controller(three());
        c.select_and_play(0).unwrap();
        c.on_media_error(MediaErrorKind::SourceNotSupported);
        assert!(c.take_scheduled_advance().is_some());

        c.toggle_play_pause();
        c.fire_error_advance();
        assert_eq!(c.cursor(), 0);
    }

    #[test]
    fn test_rejected_source_routes_to_error_handler() {
        let mut segments = three();
        segments[1].url = "bad://1".into();
        let mut c = controller(segments);
        c.media_mut().reject.push("bad://1".into());

        c.select_and_play(0).unwrap();
        c.advance(Direction::Next);

        assert_eq!(c.cursor(), 1);
        assert_eq!(c.view().current(), Some(1));
        assert!(c.active_watcher().is_none());
        assert_eq!(
            c.view().banner(1),
            Some("This audio segment is no longer available.")
        );
        assert_eq!(
            c.take_new_banner(),
            Some(ErrorBanner {
                index: 1,
                message: "This audio segment is no longer available.",
            })
        );
        assert_eq!(c.take_new_banner(), None);
        // previous segment was still playing, so the error schedules a skip
        assert!(c.take_scheduled_advance().is_some());
        c.fire_error_advance();
        assert_eq!(c.cursor(), 2);
    }

    #[test]
    fn test_fade_floor_from_config() {
        let cfg = PlaybackConfig {
            fade_floor: 0.0,
            ..PlaybackConfig::default()
        };
        let settings = PlaybackSettings::from(&cfg);
        let segments = vec![seg(0, 0.0, 3.0)];
        let view = ListView::new(&segments);
        let mut c = SegmentController::new(segments, FakeMedia::default(), view, settings);
        c.select_and_play(0).unwrap();
        c.media_mut().time = 3.0 - 0.375;
        c.on_time_update();
        assert!((c.media().volume() - 0.5).abs() < 1e-9);
    }
}
