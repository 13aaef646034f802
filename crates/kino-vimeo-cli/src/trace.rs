//! Trace file format
//!
//! ```json
//! {
//!   "options": { "techId": "vjs_tech", "autoplay": true,
//!                "source": { "src": "https://vimeo.com/76979871", "type": "video/vimeo" } },
//!   "platform": "desktop",
//!   "steps": [
//!     { "action": "libraryReady" },
//!     { "action": "remote", "event": { "event": "loaded" } },
//!     { "action": "advance", "ms": 700 }
//!   ]
//! }
//! ```

use kino_vimeo::{Platform, RemoteError, RemoteEvent, TechOptions, TechPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    #[default]
    Desktop,
    Mobile,
}

impl From<PlatformKind> for Platform {
    fn from(kind: PlatformKind) -> Self {
        match kind {
            PlatformKind::Desktop => Platform::desktop(),
            PlatformKind::Mobile => Platform::mobile(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    pub options: TechOptions,
    #[serde(default)]
    pub platform: PlatformKind,
    /// Overrides the autoplay settle delay
    #[serde(default)]
    pub settle_delay_ms: Option<u64>,
    /// Fails the player API load after this long
    #[serde(default)]
    pub load_timeout_ms: Option<u64>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Trace {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let trace: Self = serde_json::from_str(json)?;
        trace.options.validate()?;
        Ok(trace)
    }

    pub fn policy(&self) -> TechPolicy {
        let mut policy = TechPolicy::default();
        if let Some(ms) = self.settle_delay_ms {
            policy.autoplay_settle_delay = Duration::from_millis(ms);
        }
        policy.library_load_timeout = self.load_timeout_ms.map(Duration::from_millis);
        policy
    }
}

/// One step of a replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Step {
    /// The player API script finished loading
    LibraryReady,
    /// The player API script failed to load
    LibraryFailed { message: String },
    /// The remote player emits an event
    Remote { event: RemoteEvent },
    /// The next call of `method` on the remote player is rejected
    Reject { error: RemoteError },
    Play,
    Pause,
    Seek { seconds: f64 },
    Volume { volume: f64 },
    Mute { muted: bool },
    Source { src: String },
    /// Let simulated time pass
    Advance { ms: u64 },
    Dispose,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trace() {
        let trace = Trace::from_json(
            r#"{
                "options": { "techId": "vjs_tech", "autoplay": true },
                "platform": "mobile",
                "settleDelayMs": 100,
                "steps": [
                    { "action": "libraryReady" },
                    { "action": "remote", "event": { "event": "timeupdate", "seconds": 1.5, "duration": 10.2, "percent": 0.15 } },
                    { "action": "reject", "error": { "name": "NotAllowedError", "method": "play" } },
                    { "action": "seek", "seconds": 4 },
                    { "action": "advance", "ms": 700 }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(trace.platform, PlatformKind::Mobile);
        assert_eq!(trace.policy().autoplay_settle_delay, Duration::from_millis(100));
        assert!(trace.policy().library_load_timeout.is_none());
        assert_eq!(trace.steps.len(), 5);
        assert_eq!(
            trace.steps[1],
            Step::Remote {
                event: RemoteEvent::TimeUpdate { seconds: 1.5, duration: 10.2, percent: 0.15 }
            }
        );
        assert_eq!(trace.steps[3], Step::Seek { seconds: 4.0 });
    }

    #[test]
    fn test_trace_requires_tech_id() {
        assert!(Trace::from_json(r#"{ "options": {} }"#).is_err());
    }
}
