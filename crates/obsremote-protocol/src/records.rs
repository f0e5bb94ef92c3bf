//! Typed payload records carried inside envelopes.
//!
//! These are thin data mappings of the wire objects — no control flow.
//! Field names follow the wire's hyphenated convention via serde renames;
//! everything defaults so a lean payload still parses.

use serde::{Deserialize, Serialize};

/// The kind of a source entry, an integer tag on the wire.
///
/// `#[serde(try_from = "u8", into = "u8")]` keeps the wire format a plain
/// number while the Rust side stays a real enum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum SourceKind {
    /// A capture/input source rendered in the scene.
    #[default]
    Input,
    /// A filter attached to another source.
    Filter,
    /// A scene transition.
    Transition,
    /// A nested scene.
    Scene,
}

impl TryFrom<u8> for SourceKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SourceKind::Input),
            1 => Ok(SourceKind::Filter),
            2 => Ok(SourceKind::Transition),
            3 => Ok(SourceKind::Scene),
            other => Err(format!("unknown source kind {other}")),
        }
    }
}

impl From<SourceKind> for u8 {
    fn from(kind: SourceKind) -> Self {
        kind as u8
    }
}

fn default_visible() -> bool {
    true
}

/// One source within a scene (or one global audio source).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: SourceKind,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub audio: bool,
    #[serde(default)]
    pub volume: f64,
    /// Filters attached to this source, themselves source entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Source>,
}

impl Source {
    /// Creates a named source with default attributes.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SourceKind::Input,
            visible: true,
            audio: false,
            volume: 0.0,
            filters: Vec::new(),
        }
    }
}

/// A scene: a named collection of sources.
///
/// The wire sends flat entry arrays (`sources`, and on some payloads a
/// separate top-level `filters` array); entries tagged as filters are
/// split out into `filters` so callers see the same partition the
/// controller's UI shows.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "SceneWire")]
pub struct Scene {
    pub name: String,
    pub sources: Vec<Source>,
    pub filters: Vec<Source>,
}

#[derive(Deserialize)]
struct SceneWire {
    #[serde(default)]
    name: String,
    #[serde(default)]
    sources: Vec<Source>,
    /// Some scene payloads carry their filters as a separate top-level
    /// array rather than tagged entries in `sources`.
    #[serde(default)]
    filters: Vec<Source>,
}

impl From<SceneWire> for Scene {
    fn from(wire: SceneWire) -> Self {
        let entries =
            wire.filters.into_iter().chain(wire.sources).collect();
        Scene::new(wire.name, entries)
    }
}

impl Scene {
    /// Builds a scene from a flat wire entry list, partitioning inputs
    /// from filters. Transition and nested-scene entries are dropped.
    pub fn new(name: impl Into<String>, entries: Vec<Source>) -> Self {
        let mut sources = Vec::new();
        let mut filters = Vec::new();
        for entry in entries {
            match entry.kind {
                SourceKind::Input => sources.push(entry),
                SourceKind::Filter => filters.push(entry),
                _ => {}
            }
        }
        Self {
            name: name.into(),
            sources,
            filters,
        }
    }
}

/// The audio channel a volume operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioChannel {
    Microphone,
    Desktop,
}

impl AudioChannel {
    /// The wire name of the channel.
    pub fn as_str(self) -> &'static str {
        match self {
            AudioChannel::Microphone => "microphone",
            AudioChannel::Desktop => "desktop",
        }
    }
}

/// Streaming health counters pushed periodically while live.
#[derive(
    Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default,
)]
pub struct StreamStats {
    #[serde(default)]
    pub streaming: bool,
    #[serde(rename = "preview-only", default)]
    pub preview_only: bool,
    #[serde(rename = "bytes-per-sec", default)]
    pub bytes_per_sec: u64,
    /// Congestion indicator in the 0.0–100.0 range.
    #[serde(default)]
    pub strain: f64,
    #[serde(rename = "total-stream-time", default)]
    pub total_stream_time_ms: u64,
    #[serde(rename = "num-total-frames", default)]
    pub total_frames: u64,
    #[serde(rename = "num-dropped-frames", default)]
    pub dropped_frames: u64,
    #[serde(default)]
    pub fps: f64,
}

/// Snapshot returned by the streaming-status query.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default,
)]
pub struct StreamingStatus {
    #[serde(default)]
    pub streaming: bool,
    #[serde(rename = "preview-only", default)]
    pub preview_only: bool,
}

/// Current volume levels and mute states for both mixer channels.
#[derive(
    Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default,
)]
pub struct Volumes {
    #[serde(rename = "mic-volume", default)]
    pub microphone_volume: f64,
    #[serde(rename = "mic-muted", default)]
    pub microphone_muted: bool,
    #[serde(rename = "desktop-volume", default)]
    pub desktop_volume: f64,
    #[serde(rename = "desktop-muted", default)]
    pub desktop_muted: bool,
}
