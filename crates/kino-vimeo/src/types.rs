//! Core types for Kino Vimeo

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// Unique identifier for a tech instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TechId(pub Uuid);

impl TechId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TechId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TechId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Remote playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Player constructed, nothing played yet
    Unstarted,
    /// Reached the end of the video
    Ended,
    Playing,
    Paused,
    /// Stalled waiting for data
    Buffering,
}

impl PlaybackState {
    /// Numeric state code used by the remote player
    pub fn code(&self) -> i8 {
        match self {
            PlaybackState::Unstarted => -1,
            PlaybackState::Ended => 0,
            PlaybackState::Playing => 1,
            PlaybackState::Paused => 2,
            PlaybackState::Buffering => 3,
        }
    }

    /// Check if the transition is one the remote player is expected to make.
    ///
    /// Remote events are applied even when this returns false; the check only
    /// feeds diagnostics.
    pub fn can_transition_to(&self, target: PlaybackState) -> bool {
        use PlaybackState::*;
        if *self == target {
            return true;
        }
        matches!(
            (self, target),
            (Unstarted, Playing) | (Unstarted, Buffering) |
            (Playing, Paused) | (Playing, Buffering) | (Playing, Ended) |
            (Paused, Playing) | (Paused, Buffering) | (Paused, Ended) |
            (Buffering, Playing) | (Buffering, Paused) | (Buffering, Ended)
        )
    }

    /// True while media is advancing or about to
    pub fn is_active(&self) -> bool {
        matches!(self, PlaybackState::Playing | PlaybackState::Buffering)
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Unstarted => write!(f, "unstarted"),
            PlaybackState::Ended => write!(f, "ended"),
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
            PlaybackState::Buffering => write!(f, "buffering"),
        }
    }
}

/// Locally cached mirror of the remote playback state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    /// Volume in [0, 1]
    pub volume: f64,
    pub muted: bool,
    /// Playback position in seconds
    pub current_time: f64,
    /// Rounded duration in seconds, 0 until metadata arrives
    pub duration: f64,
    /// Fraction of the duration downloaded, in [0, 1]
    pub buffered_fraction: f64,
    pub fullscreen: bool,
}

impl PlaybackSnapshot {
    /// Snapshot for a freshly constructed player
    pub fn new(muted: bool) -> Self {
        Self {
            state: PlaybackState::Unstarted,
            volume: if muted { 0.0 } else { 1.0 },
            muted,
            current_time: 0.0,
            duration: 0.0,
            buffered_fraction: 0.0,
            fullscreen: false,
        }
    }

    pub fn paused(&self) -> bool {
        !self.state.is_active()
    }

    pub fn buffered(&self) -> TimeRange {
        TimeRange::new(0.0, self.buffered_fraction * self.duration)
    }
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self::new(false)
    }
}

/// A single buffered time range in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0.0
    }
}

/// Media source as handed over by the host
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Source {
    /// Vimeo video URL or numeric id
    #[serde(default)]
    pub src: String,
    /// MIME type, `video/vimeo` for this tech
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl Source {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            mime_type: Some(crate::VIMEO_MIME_TYPE.to_string()),
        }
    }

    /// A source without a `src` is ignored by the tech
    pub fn is_empty(&self) -> bool {
        self.src.trim().is_empty()
    }

    /// Extract the numeric Vimeo video id, if the source carries one.
    ///
    /// Accepts a bare id (`"76979871"`) or a player/page URL
    /// (`https://vimeo.com/76979871`, `https://player.vimeo.com/video/76979871`).
    pub fn video_id(&self) -> Option<String> {
        let src = self.src.trim();
        if !src.is_empty() && src.chars().all(|c| c.is_ascii_digit()) {
            return Some(src.to_string());
        }

        let url = Url::parse(src).ok()?;
        let host = url.host_str()?;
        if host != "vimeo.com" && !host.ends_with(".vimeo.com") {
            return None;
        }

        url.path_segments()?
            .find(|segment| !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit()))
            .map(str::to_string)
    }
}

/// Notification emitted to the host framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TechEvent {
    Play,
    Pause,
    Waiting,
    Ended,
    Error,
    TimeUpdate,
    Progress,
    DurationChange,
    VolumeChange,
    RateChange,
}

impl TechEvent {
    /// Event name as the host framework knows it
    pub fn as_str(&self) -> &'static str {
        match self {
            TechEvent::Play => "play",
            TechEvent::Pause => "pause",
            TechEvent::Waiting => "waiting",
            TechEvent::Ended => "ended",
            TechEvent::Error => "error",
            TechEvent::TimeUpdate => "timeupdate",
            TechEvent::Progress => "progress",
            TechEvent::DurationChange => "durationchange",
            TechEvent::VolumeChange => "volumechange",
            TechEvent::RateChange => "ratechange",
        }
    }
}

impl std::fmt::Display for TechEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paused_is_derived_from_state() {
        let mut snapshot = PlaybackSnapshot::default();
        for (state, paused) in [
            (PlaybackState::Unstarted, true),
            (PlaybackState::Ended, true),
            (PlaybackState::Playing, false),
            (PlaybackState::Paused, true),
            (PlaybackState::Buffering, false),
        ] {
            snapshot.state = state;
            assert_eq!(snapshot.paused(), paused, "state {}", state);
        }
    }

    #[test]
    fn test_state_transitions() {
        assert!(PlaybackState::Unstarted.can_transition_to(PlaybackState::Playing));
        assert!(PlaybackState::Unstarted.can_transition_to(PlaybackState::Buffering));
        assert!(PlaybackState::Buffering.can_transition_to(PlaybackState::Playing));
        assert!(PlaybackState::Playing.can_transition_to(PlaybackState::Ended));

        assert!(!PlaybackState::Unstarted.can_transition_to(PlaybackState::Ended));
        assert!(!PlaybackState::Ended.can_transition_to(PlaybackState::Playing));
    }

    #[test]
    fn test_state_codes() {
        assert_eq!(PlaybackState::Unstarted.code(), -1);
        assert_eq!(PlaybackState::Ended.code(), 0);
        assert_eq!(PlaybackState::Buffering.code(), 3);
    }

    #[test]
    fn test_initial_snapshot_volume_follows_mute() {
        assert_eq!(PlaybackSnapshot::new(true).volume, 0.0);
        assert_eq!(PlaybackSnapshot::new(false).volume, 1.0);
    }

    #[test]
    fn test_buffered_range_scales_with_duration() {
        let snapshot = PlaybackSnapshot {
            duration: 120.0,
            buffered_fraction: 0.25,
            ..Default::default()
        };
        assert_eq!(snapshot.buffered(), TimeRange::new(0.0, 30.0));
        assert!(PlaybackSnapshot::default().buffered().is_empty());
    }

    #[test]
    fn test_video_id_extraction() {
        assert_eq!(Source::new("76979871").video_id().as_deref(), Some("76979871"));
        assert_eq!(
            Source::new("https://vimeo.com/76979871").video_id().as_deref(),
            Some("76979871")
        );
        assert_eq!(
            Source::new("https://player.vimeo.com/video/76979871?h=abc").video_id().as_deref(),
            Some("76979871")
        );
        assert_eq!(Source::new("https://example.com/76979871").video_id(), None);
        assert_eq!(Source::new("").video_id(), None);
    }

    #[test]
    fn test_source_deserializes_type_field() {
        let source: Source =
            serde_json::from_str(r#"{"src":"https://vimeo.com/1","type":"video/vimeo"}"#).unwrap();
        assert_eq!(source.mime_type.as_deref(), Some("video/vimeo"));
        assert!(!source.is_empty());
    }

    #[test]
    fn test_event_names() {
        assert_eq!(TechEvent::DurationChange.as_str(), "durationchange");
        assert_eq!(TechEvent::VolumeChange.to_string(), "volumechange");
    }
}
