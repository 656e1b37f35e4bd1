//! Segment descriptors and the episode loader.
//!
//! An episode lives on disk as two siblings:
//!
//! ```text
//!  2024-01-29.json             {"url": "https://…/ep.mp3", "date": "2024-01-29", "title": "…"}
//!  2024-01-29.segments.jsonl   {"start": 12, "end": 48.5, "text": "…"}   (one per line)
//! ```
//!
//! `start`/`end` are accepted either as JSON numbers or as decimal strings,
//! which is how page markup carries them.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Labels longer than this are cut for display.
pub const LABEL_MAX_CHARS: usize = 200;

/// Word-boundary cuts are only taken this close to the end of the window.
const LABEL_WORD_SLACK: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum SegmentError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}:{line}: malformed JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("{}:{line}: invalid time value {value:?}", path.display())]
    InvalidTime {
        path: PathBuf,
        line: usize,
        value: String,
    },
    #[error("{}:{line}: segment ends at {end} before it starts at {start}", path.display())]
    EmptyRange {
        path: PathBuf,
        line: usize,
        start: f64,
        end: f64,
    },
}

/// An immutable, labeled excerpt of a remote audio resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub url: String,
    pub start: f64,
    pub end: f64,
    pub label: String,
    /// Episode tag (broadcast date when known).
    #[serde(default)]
    pub episode: String,
}

impl Segment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Static (non-counting) duration readout, e.g. `2:05`.
    pub fn duration_text(&self) -> String {
        format_clock(self.duration())
    }
}

/// Episode metadata file (`<name>.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeMeta {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl EpisodeMeta {
    /// Tag attached to every segment of this episode.
    pub fn tag(&self, fallback: &str) -> String {
        if let Some(date) = self.date {
            date.format("%Y-%m-%d").to_string()
        } else if !self.title.trim().is_empty() {
            self.title.trim().to_string()
        } else {
            fallback.to_string()
        }
    }
}

#[derive(Debug, Clone)]
pub struct Episode {
    pub meta: EpisodeMeta,
    pub segments: Vec<Segment>,
}

/// One line of `<name>.segments.jsonl`.
#[derive(Debug, Deserialize)]
struct SegmentLine {
    start: TimeValue,
    end: TimeValue,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TimeValue {
    Number(f64),
    Text(String),
}

impl TimeValue {
    fn seconds(&self) -> Option<f64> {
        match self {
            TimeValue::Number(n) => Some(*n).filter(|n| n.is_finite()),
            TimeValue::Text(s) => parse_seconds(s),
        }
    }

    fn raw(&self) -> String {
        match self {
            TimeValue::Number(n) => n.to_string(),
            TimeValue::Text(s) => s.clone(),
        }
    }
}

/// Parse a decimal seconds string such as `"12"`, `" 48.25 "`.
pub fn parse_seconds(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Format seconds as `M:SS`; both parts are floored.
pub fn format_clock(seconds: f64) -> String {
    let seconds = if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    };
    let minutes = (seconds / 60.0).floor() as u64;
    let rem = (seconds % 60.0).floor() as u64;
    format!("{}:{:02}", minutes, rem)
}

/// Collapse newlines and cut long transcript text for list display.
pub fn truncate_label(text: &str) -> String {
    let full: String = text.replace(['\r', '\n'], " ");
    let chars: Vec<char> = full.chars().collect();
    if chars.len() <= LABEL_MAX_CHARS {
        return full;
    }

    let window = &chars[..LABEL_MAX_CHARS];
    let cut = window
        .iter()
        .rposition(|c| *c == ' ')
        .filter(|&pos| pos > LABEL_MAX_CHARS - LABEL_WORD_SLACK)
        .unwrap_or(LABEL_MAX_CHARS - 3);

    let mut label: String = chars[..cut].iter().collect();
    label.push_str("...");
    label
}

/// Path of the segments file that belongs to an episode metadata file.
pub fn segments_path_for(meta_path: &Path) -> PathBuf {
    meta_path.with_extension("segments.jsonl")
}

pub fn parse_segments_jsonl(
    content: &str,
    url: &str,
    episode: &str,
    origin: &Path,
) -> Result<Vec<Segment>, SegmentError> {
    let mut segments = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record: SegmentLine =
            serde_json::from_str(line).map_err(|source| SegmentError::Json {
                path: origin.to_path_buf(),
                line: line_no,
                source,
            })?;

        let invalid = |value: &TimeValue| SegmentError::InvalidTime {
            path: origin.to_path_buf(),
            line: line_no,
            value: value.raw(),
        };
        let start = record.start.seconds().ok_or_else(|| invalid(&record.start))?;
        let end = record.end.seconds().ok_or_else(|| invalid(&record.end))?;

        if end <= start {
            return Err(SegmentError::EmptyRange {
                path: origin.to_path_buf(),
                line: line_no,
                start,
                end,
            });
        }

        segments.push(Segment {
            url: url.to_string(),
            start,
            end,
            label: truncate_label(&record.text),
            episode: episode.to_string(),
        });
    }

    Ok(segments)
}

/// Load `<name>.json` and its sibling `<name>.segments.jsonl`.
pub fn load_episode(meta_path: &Path) -> Result<Episode, SegmentError> {
    let read = |path: &Path| {
        std::fs::read_to_string(path).map_err(|source| SegmentError::Io {
            path: path.to_path_buf(),
            source,
        })
    };

    let meta_raw = read(meta_path)?;
    let meta: EpisodeMeta =
        serde_json::from_str(&meta_raw).map_err(|source| SegmentError::Json {
            path: meta_path.to_path_buf(),
            line: 1,
            source,
        })?;

    let fallback = meta_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tag = meta.tag(&fallback);

    let seg_path = segments_path_for(meta_path);
    let content = read(&seg_path)?;
    let segments = parse_segments_jsonl(&content, &meta.url, &tag, &seg_path)?;
    debug!(
        "loaded {} segments for episode {} from {}",
        segments.len(),
        tag,
        seg_path.display()
    );

    Ok(Episode { meta, segments })
}

/// Load several episodes; segments are concatenated in argument order so
/// original indices stay stable for the session.
pub fn load_episodes<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Segment>, SegmentError> {
    let mut all = Vec::new();
    for path in paths {
        let episode = load_episode(path.as_ref())?;
        all.extend(episode.segments);
    }
    info!("loaded {} segments from {} episode(s)", all.len(), paths.len());
    Ok(all)
}
