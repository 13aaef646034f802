//! Tech configuration
//!
//! Three layers:
//! - [`TechOptions`]: what the host framework passes in
//! - [`RemotePlayerConfig`]: what the Vimeo player constructor receives
//! - [`TechPolicy`]: timing knobs of the reconciler itself

use crate::{types::Source, Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delay between the remote `loaded` event and the first autoplay attempt.
/// The Vimeo player reports `loaded` slightly before it accepts `play()`.
pub const DEFAULT_AUTOPLAY_SETTLE_DELAY: Duration = Duration::from_millis(600);

/// Options handed to the tech by the host framework
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TechOptions {
    /// Poster image URL
    pub poster: Option<String>,
    /// Initial source
    pub source: Option<Source>,
    pub autoplay: Option<bool>,
    pub responsive: Option<bool>,
    /// Picture-in-picture
    pub pip: Option<bool>,
    #[serde(rename = "loop")]
    pub looping: Option<bool>,
    pub muted: Option<bool>,
    /// DOM id of the element the remote player mounts into
    pub tech_id: String,
}

impl TechOptions {
    pub fn new(tech_id: impl Into<String>) -> Self {
        Self {
            tech_id: tech_id.into(),
            ..Default::default()
        }
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = Some(autoplay);
        self
    }

    pub fn with_muted(mut self, muted: bool) -> Self {
        self.muted = Some(muted);
        self
    }

    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = Some(looping);
        self
    }

    /// Parse options from the host's JSON representation
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tech_id.trim().is_empty() {
            return Err(Error::InvalidConfig("techId must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn autoplay_enabled(&self) -> bool {
        self.autoplay.unwrap_or(false)
    }

    pub fn muted_enabled(&self) -> bool {
        self.muted.unwrap_or(false)
    }
}

/// Configuration passed to the Vimeo player constructor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemotePlayerConfig {
    pub controls: bool,
    pub responsive: bool,
    /// Do-not-track
    pub dnt: bool,
    pub autoplay: bool,
    pub muted: bool,
    pub pip: bool,
    #[serde(rename = "loop")]
    pub looping: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Default for RemotePlayerConfig {
    fn default() -> Self {
        Self {
            controls: false,
            responsive: true,
            dnt: false,
            autoplay: false,
            muted: false,
            pip: true,
            looping: false,
            url: None,
        }
    }
}

impl RemotePlayerConfig {
    /// Derive the constructor config from host options.
    ///
    /// Autoplay implies a muted start: browsers refuse unmuted autoplay.
    pub fn from_options(options: &TechOptions) -> Self {
        let mut config = Self {
            looping: options.looping.unwrap_or(false),
            ..Default::default()
        };

        if let Some(autoplay) = options.autoplay {
            config.autoplay = autoplay;
            config.muted = autoplay;
        }
        if let Some(responsive) = options.responsive {
            config.responsive = responsive;
        }
        if let Some(pip) = options.pip {
            config.pip = pip;
        }
        if let Some(source) = &options.source {
            config.url = Some(source.src.clone());
        }

        config
    }
}

/// Reconciler timing policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechPolicy {
    /// Delay before the deferred autoplay attempt after `loaded`
    pub autoplay_settle_delay: Duration,
    /// Fail queued instances if the client library has not loaded in time.
    /// `None` waits forever.
    pub library_load_timeout: Option<Duration>,
}

impl Default for TechPolicy {
    fn default() -> Self {
        Self {
            autoplay_settle_delay: DEFAULT_AUTOPLAY_SETTLE_DELAY,
            library_load_timeout: None,
        }
    }
}

/// Facts about the runtime environment, detected by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    /// iOS and native Android refuse unmuted autoplay
    pub blocks_unmuted_autoplay: bool,
}

impl Platform {
    pub fn desktop() -> Self {
        Self { blocks_unmuted_autoplay: false }
    }

    pub fn mobile() -> Self {
        Self { blocks_unmuted_autoplay: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_config_defaults() {
        let config = RemotePlayerConfig::from_options(&TechOptions::new("vjs_tech"));
        assert!(!config.controls);
        assert!(config.responsive);
        assert!(!config.dnt);
        assert!(!config.autoplay);
        assert!(!config.muted);
        assert!(config.pip);
        assert!(!config.looping);
        assert_eq!(config.url, None);
    }

    #[test]
    fn test_autoplay_forces_muted_start() {
        let options = TechOptions::new("vjs_tech").with_autoplay(true).with_loop(false);
        let config = RemotePlayerConfig::from_options(&options);
        assert!(config.autoplay);
        assert!(config.muted);

        let options = TechOptions::new("vjs_tech").with_autoplay(false);
        assert!(!RemotePlayerConfig::from_options(&options).muted);
    }

    #[test]
    fn test_overrides_and_url() {
        let mut options = TechOptions::new("vjs_tech")
            .with_source(Source::new("https://vimeo.com/76979871"))
            .with_loop(true);
        options.responsive = Some(false);
        options.pip = Some(false);

        let config = RemotePlayerConfig::from_options(&options);
        assert!(!config.responsive);
        assert!(!config.pip);
        assert!(config.looping);
        assert_eq!(config.url.as_deref(), Some("https://vimeo.com/76979871"));
    }

    #[test]
    fn test_remote_config_serializes_loop_key() {
        let json = serde_json::to_value(RemotePlayerConfig::default()).unwrap();
        assert_eq!(json["loop"], false);
        assert!(json.get("url").is_none());
    }

    #[test]
    fn test_options_from_host_json() {
        let options = TechOptions::from_json(
            r#"{
                "techId": "vjs_video_3_Vimeo_api",
                "source": { "src": "https://vimeo.com/76979871", "type": "video/vimeo" },
                "autoplay": true,
                "loop": true,
                "poster": "poster.jpg"
            }"#,
        )
        .unwrap();

        assert_eq!(options.tech_id, "vjs_video_3_Vimeo_api");
        assert_eq!(options.looping, Some(true));
        assert!(options.autoplay_enabled());
        assert!(!options.muted_enabled());
    }

    #[test]
    fn test_empty_tech_id_rejected() {
        let err = TechOptions::from_json(r#"{"autoplay": true}"#).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_default_policy() {
        let policy = TechPolicy::default();
        assert_eq!(policy.autoplay_settle_delay, Duration::from_millis(600));
        assert!(policy.library_load_timeout.is_none());
    }
}
