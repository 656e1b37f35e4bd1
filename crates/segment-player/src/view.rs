//! The page seam and an in-memory list projection.
//!
//! `SegmentView` is everything the controller needs from the rendered list:
//! the live visibility flag, the single "current" marker, the per-entry
//! duration readout, inline error banners, and the on-screen order.
//! `ListView` is a plain projection of those calls; it never decides anything.

use std::collections::HashSet;

use segment_proto::Segment;
use tracing::{debug, info};

pub trait SegmentView {
    /// Visibility as decided by the filtering collaborator, read live.
    fn is_visible(&self, original: usize) -> bool;
    /// Mark exactly this entry as current; any previous marker is dropped.
    fn mark_current(&mut self, original: usize);
    fn clear_current(&mut self);
    fn show_countdown(&mut self, original: usize, text: &str);
    /// Restore the static duration readout.
    fn reset_duration(&mut self, original: usize, text: &str);
    fn clear_error(&mut self, original: usize);
    fn show_error(&mut self, original: usize, message: &str);
    /// Re-project the on-screen list from the logical order.
    fn reorder(&mut self, order: &[usize]);
    /// Bring an entry into view.
    fn reveal(&mut self, _original: usize) {}
}

/// What an entry's duration slot currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationLabel {
    Static(String),
    Countdown(String),
}

pub struct ListView {
    labels: Vec<String>,
    durations: Vec<DurationLabel>,
    banners: Vec<Option<String>>,
    hidden: HashSet<usize>,
    current: Option<usize>,
    display_order: Vec<usize>,
    revealed: Option<usize>,
}

impl ListView {
    pub fn new(segments: &[Segment]) -> Self {
        Self {
            labels: segments.iter().map(|s| s.label.clone()).collect(),
            durations: segments
                .iter()
                .map(|s| DurationLabel::Static(s.duration_text()))
                .collect(),
            banners: vec![None; segments.len()],
            hidden: HashSet::new(),
            current: None,
            display_order: (0..segments.len()).collect(),
            revealed: None,
        }
    }

    /// Hide exactly these original indices; everything else becomes visible.
    pub fn set_hidden(&mut self, indices: &[usize]) {
        self.hidden = indices
            .iter()
            .copied()
            .filter(|&i| i < self.labels.len())
            .collect();
        info!(
            "view: {} of {} entries visible",
            self.visible_count(),
            self.labels.len()
        );
    }

    pub fn show_all(&mut self) {
        self.set_hidden(&[]);
    }

    pub fn visible_count(&self) -> usize {
        self.labels.len() - self.hidden.len()
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn duration(&self, original: usize) -> Option<&DurationLabel> {
        self.durations.get(original)
    }

    pub fn banner(&self, original: usize) -> Option<&str> {
        self.banners.get(original)?.as_deref()
    }

    pub fn display_order(&self) -> &[usize] {
        &self.display_order
    }

    pub fn revealed(&self) -> Option<usize> {
        self.revealed
    }
}

impl SegmentView for ListView {
    fn is_visible(&self, original: usize) -> bool {
        original < self.labels.len() && !self.hidden.contains(&original)
    }

    fn mark_current(&mut self, original: usize) {
        if self.current != Some(original) {
            let label = self.labels.get(original).map(String::as_str).unwrap_or("");
            debug!("view: current {:?} → {} {:?}", self.current, original, label);
        }
        self.current = Some(original);
    }

    fn clear_current(&mut self) {
        self.current = None;
    }

    fn show_countdown(&mut self, original: usize, text: &str) {
        if let Some(slot) = self.durations.get_mut(original) {
            *slot = DurationLabel::Countdown(text.to_string());
        }
    }

    fn reset_duration(&mut self, original: usize, text: &str) {
        if let Some(slot) = self.durations.get_mut(original) {
            *slot = DurationLabel::Static(text.to_string());
        }
    }

    fn clear_error(&mut self, original: usize) {
        if let Some(slot) = self.banners.get_mut(original) {
            *slot = None;
        }
    }

    fn show_error(&mut self, original: usize, message: &str) {
        if let Some(slot) = self.banners.get_mut(original) {
            info!("view: banner on #{}: {}", original, message);
            *slot = Some(message.to_string());
        }
    }

    fn reorder(&mut self, order: &[usize]) {
        self.display_order = order.to_vec();
    }

    fn reveal(&mut self, original: usize) {
        self.revealed = Some(original);
    }
}
