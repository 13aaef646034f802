//! Remote player abstraction
//!
//! The Vimeo player lives outside of Rust (an iframe driven through the
//! client library, or a scripted stand-in in tests and the CLI). Commands
//! resolve asynchronously and state changes arrive as events.

use crate::{config::RemotePlayerConfig, error::RemoteError, Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::rc::Rc;

/// Events the tech subscribes to on the remote player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemoteEventKind {
    PlaybackRateChange,
    VolumeChange,
    TimeUpdate,
    Ended,
    Playing,
    Play,
    BufferStart,
    BufferEnd,
    Error,
    Loaded,
}

impl RemoteEventKind {
    /// Every event the tech listens to, in subscription order
    pub const ALL: [RemoteEventKind; 10] = [
        RemoteEventKind::PlaybackRateChange,
        RemoteEventKind::VolumeChange,
        RemoteEventKind::TimeUpdate,
        RemoteEventKind::Ended,
        RemoteEventKind::Playing,
        RemoteEventKind::Play,
        RemoteEventKind::BufferStart,
        RemoteEventKind::BufferEnd,
        RemoteEventKind::Error,
        RemoteEventKind::Loaded,
    ];

    /// Event name on the Vimeo player API
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteEventKind::PlaybackRateChange => "playbackratechange",
            RemoteEventKind::VolumeChange => "volumechange",
            RemoteEventKind::TimeUpdate => "timeupdate",
            RemoteEventKind::Ended => "ended",
            RemoteEventKind::Playing => "playing",
            RemoteEventKind::Play => "play",
            RemoteEventKind::BufferStart => "bufferstart",
            RemoteEventKind::BufferEnd => "bufferend",
            RemoteEventKind::Error => "error",
            RemoteEventKind::Loaded => "loaded",
        }
    }
}

impl std::fmt::Display for RemoteEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event delivered by the remote player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum RemoteEvent {
    PlaybackRateChange {
        #[serde(rename = "playbackRate", default = "default_rate")]
        playback_rate: f64,
    },
    VolumeChange {
        volume: f64,
    },
    TimeUpdate {
        /// Position in seconds
        seconds: f64,
        /// Duration in seconds
        duration: f64,
        /// Fraction of the video played, reported by Vimeo as `percent`
        percent: f64,
    },
    Ended,
    Playing,
    Play,
    BufferStart,
    BufferEnd,
    Error(RemoteError),
    Loaded,
}

fn default_rate() -> f64 {
    1.0
}

impl RemoteEvent {
    pub fn kind(&self) -> RemoteEventKind {
        match self {
            RemoteEvent::PlaybackRateChange { .. } => RemoteEventKind::PlaybackRateChange,
            RemoteEvent::VolumeChange { .. } => RemoteEventKind::VolumeChange,
            RemoteEvent::TimeUpdate { .. } => RemoteEventKind::TimeUpdate,
            RemoteEvent::Ended => RemoteEventKind::Ended,
            RemoteEvent::Playing => RemoteEventKind::Playing,
            RemoteEvent::Play => RemoteEventKind::Play,
            RemoteEvent::BufferStart => RemoteEventKind::BufferStart,
            RemoteEvent::BufferEnd => RemoteEventKind::BufferEnd,
            RemoteEvent::Error(_) => RemoteEventKind::Error,
            RemoteEvent::Loaded => RemoteEventKind::Loaded,
        }
    }

    /// Build an event from the payload object the Vimeo API passes to a
    /// listener registered for `kind`.
    pub fn from_payload(kind: RemoteEventKind, payload: &Value) -> Result<Self> {
        let number = |key: &str| payload.get(key).and_then(Value::as_f64);
        let missing = |key: &str| Error::InvalidPayload(format!("{kind} payload without '{key}'"));

        let event = match kind {
            RemoteEventKind::PlaybackRateChange => RemoteEvent::PlaybackRateChange {
                playback_rate: number("playbackRate").unwrap_or_else(default_rate),
            },
            RemoteEventKind::VolumeChange => RemoteEvent::VolumeChange {
                volume: number("volume").ok_or_else(|| missing("volume"))?,
            },
            RemoteEventKind::TimeUpdate => RemoteEvent::TimeUpdate {
                seconds: number("seconds").ok_or_else(|| missing("seconds"))?,
                duration: number("duration").unwrap_or(0.0),
                percent: number("percent").unwrap_or(0.0),
            },
            RemoteEventKind::Ended => RemoteEvent::Ended,
            RemoteEventKind::Playing => RemoteEvent::Playing,
            RemoteEventKind::Play => RemoteEvent::Play,
            RemoteEventKind::BufferStart => RemoteEvent::BufferStart,
            RemoteEventKind::BufferEnd => RemoteEvent::BufferEnd,
            RemoteEventKind::Error => RemoteEvent::Error(serde_json::from_value(payload.clone())?),
            RemoteEventKind::Loaded => RemoteEvent::Loaded,
        };

        Ok(event)
    }
}

/// Listener registered on the remote player
pub type EventHandler = Rc<dyn Fn(RemoteEvent)>;

/// A constructed remote player.
///
/// Commands resolve once the remote side has acted on them; implementations
/// must deliver events through the handlers registered with [`on`](Self::on)
/// on the same thread.
#[async_trait(?Send)]
pub trait RemotePlayer {
    /// Register the handler for an event kind, replacing any previous one
    fn on(&self, kind: RemoteEventKind, handler: EventHandler);

    /// Drop the handler for an event kind
    fn off(&self, kind: RemoteEventKind);

    async fn play(&self) -> std::result::Result<(), RemoteError>;

    async fn pause(&self) -> std::result::Result<(), RemoteError>;

    async fn set_volume(&self, volume: f64) -> std::result::Result<(), RemoteError>;

    async fn set_muted(&self, muted: bool) -> std::result::Result<(), RemoteError>;

    async fn set_current_time(&self, seconds: f64) -> std::result::Result<(), RemoteError>;

    /// Replace the video; the player fires `loaded` again once it is in
    async fn load_video(&self, url: &str) -> std::result::Result<(), RemoteError>;

    /// Tear down the player and its iframe
    async fn destroy(&self) -> std::result::Result<(), RemoteError>;
}

/// Constructs remote players once the client library is available
pub trait PlayerFactory {
    /// Mount a player into the element with id `element_id`
    fn create(&self, element_id: &str, config: &RemotePlayerConfig) -> Result<Rc<dyn RemotePlayer>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_time_update_from_payload() {
        let payload = json!({ "seconds": 3.5, "duration": 10.6, "percent": 0.33 });
        let event = RemoteEvent::from_payload(RemoteEventKind::TimeUpdate, &payload).unwrap();
        assert_eq!(
            event,
            RemoteEvent::TimeUpdate { seconds: 3.5, duration: 10.6, percent: 0.33 }
        );
    }

    #[test]
    fn test_volume_payload_requires_volume() {
        let err = RemoteEvent::from_payload(RemoteEventKind::VolumeChange, &json!({})).unwrap_err();
        assert!(err.to_string().contains("volume"));
        assert_eq!(err.error_code(), "INVALID_PAYLOAD");
    }

    #[test]
    fn test_time_update_without_seconds_is_payload_error() {
        let payload = json!({ "duration": 10.6, "percent": 0.33 });
        let err = RemoteEvent::from_payload(RemoteEventKind::TimeUpdate, &payload).unwrap_err();
        assert!(matches!(err, Error::InvalidPayload(_)));
        assert!(err.to_string().contains("seconds"));
    }

    #[test]
    fn test_error_from_payload() {
        let payload = json!({ "name": "NotAllowedError", "method": "play", "message": "blocked" });
        let event = RemoteEvent::from_payload(RemoteEventKind::Error, &payload).unwrap();
        assert_eq!(
            event,
            RemoteEvent::Error(RemoteError::new("NotAllowedError", "play", "blocked"))
        );
    }

    #[test]
    fn test_trace_event_round_trips_kind() {
        let event: RemoteEvent =
            serde_json::from_str(r#"{"event":"playbackratechange","playbackRate":1.5}"#).unwrap();
        assert_eq!(event.kind(), RemoteEventKind::PlaybackRateChange);

        let event: RemoteEvent = serde_json::from_str(r#"{"event":"bufferstart"}"#).unwrap();
        assert_eq!(event.kind().as_str(), "bufferstart");
    }

    #[test]
    fn test_kind_names_match_serde_names() {
        for kind in RemoteEventKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.as_str());
        }
    }
}
