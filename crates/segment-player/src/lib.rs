//! Segment player: the playback/ordering state machine for a list of audio
//! clips, the seams it drives (media element, list view), a tokio host loop,
//! and a simulated media element for headless runs.

pub mod controller;
pub mod core;
pub mod media;
pub mod sim;
pub mod view;

pub use controller::{Direction, ErrorBanner, PlaybackSettings, PlayerError, SegmentController};
pub use media::{MediaElement, MediaError, MediaErrorKind, MediaEvent};
pub use view::{ListView, SegmentView};
