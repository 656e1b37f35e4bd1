//! Shared types for the segment player: segment data, episode loading,
//! configuration, platform paths, and the command/broadcast vocabulary.

pub mod config;
pub mod platform;
pub mod protocol;
pub mod segments;

pub use segments::{format_clock, Segment};
