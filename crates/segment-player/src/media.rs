//! The media-element seam.
//!
//! The controller never talks to an audio backend directly; it drives
//! anything that looks like an HTML media element: a source URL, a seekable
//! position, a volume, and a paused flag.

use serde::{Deserialize, Serialize};

/// Playback failure classes, mirroring the media element error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaErrorKind {
    Aborted,
    Network,
    Decode,
    SourceNotSupported,
    Unknown,
}

impl MediaErrorKind {
    /// Text of the inline "unavailable" banner.
    pub fn banner_message(self) -> &'static str {
        match self {
            MediaErrorKind::Network => "A network error occurred while loading the audio.",
            MediaErrorKind::SourceNotSupported => "This audio segment is no longer available.",
            _ => "Sorry, this audio segment is no longer available.",
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("media error ({kind:?}): {detail}")]
pub struct MediaError {
    pub kind: MediaErrorKind,
    pub detail: String,
}

impl MediaError {
    pub fn new(kind: MediaErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Signals emitted by a media element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    /// Playback position changed.
    TimeUpdate,
    Playing,
    Paused,
    Error(MediaErrorKind),
}

pub trait MediaElement {
    /// Point the element at a new resource.  Fails only when the URL cannot
    /// be assigned at all; load failures arrive later as `MediaEvent::Error`.
    fn set_source(&mut self, url: &str) -> Result<(), MediaError>;
    fn source(&self) -> Option<String>;
    fn seek(&mut self, seconds: f64);
    fn current_time(&self) -> f64;
    fn set_volume(&mut self, volume: f64);
    fn volume(&self) -> f64;
    fn play(&mut self);
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
}
