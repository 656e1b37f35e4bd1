use serde::{Deserialize, Serialize};

/// Intents sent into the player (from stdin, tests, or any other front end).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd")]
pub enum Command {
    TogglePause,
    Next,
    Prev,
    Shuffle,
    /// Direct click on a list entry, by original index.
    Activate {
        index: usize,
        #[serde(default)]
        target: ClickTarget,
    },
    /// Hide these original indices (the rest become visible).
    SetHidden { indices: Vec<usize> },
    ShowAll,
    GetState,
    Quit,
}

/// Which part of a list entry received the click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClickTarget {
    /// The entry body.
    #[default]
    Segment,
    /// The external "debug" link nested in the entry.
    DebugLink,
    /// The duration / countdown readout.
    DurationReadout,
}

impl ClickTarget {
    /// Nested interactive elements keep their own behaviour.
    pub fn activates_segment(self) -> bool {
        matches!(self, ClickTarget::Segment)
    }
}

/// Playback status as seen by front ends.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Idle, // nothing selected yet
    Playing,
    Paused,
    Error, // last load failed; may auto-advance
}

/// Full observable player state.  `rev` increases on every broadcast so
/// listeners can detect missed updates.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PlayerSnapshot {
    #[serde(default)]
    pub rev: u64,
    /// Logical position of the active segment.
    pub cursor: usize,
    /// Original index marked as current, if any.
    pub current: Option<usize>,
    pub order: Vec<usize>,
    pub status: PlaybackStatus,
    pub volume: f64,
    pub position_secs: f64,
    pub source: Option<String>,
    /// Live countdown text of the active segment.
    pub countdown: Option<String>,
}

/// Messages broadcast by the player core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "broadcast")]
pub enum Broadcast {
    State { data: PlayerSnapshot },
    /// Inline "unavailable" banner shown on a list entry.
    Banner { index: usize, message: String },
    /// Auto-advance after an error was scheduled.
    AdvanceScheduled { delay_ms: u64 },
}
