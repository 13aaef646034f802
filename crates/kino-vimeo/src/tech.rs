//! Vimeo Tech - reconciles the remote player with the host's view of playback
//!
//! Owns:
//! - The playback snapshot the host's accessors read from
//! - The deferred play intent and the muted-autoplay bootstrap
//! - The last remote error
//!
//! Remote events mutate the snapshot and are forwarded to the host as
//! notifications. Commands are fire-and-forget: each one spawns a local task
//! that awaits the remote confirmation, then updates the snapshot unless
//! the tech was disposed in the meantime.

use crate::{
    config::{Platform, RemotePlayerConfig, TechOptions, TechPolicy},
    error::{RemoteError, TechError},
    gate::{LibraryListener, ReadinessGate},
    host::{TechHost, CONTAINER_CLASS, MOBILE_CONTAINER_CLASS},
    remote::{PlayerFactory, RemoteEvent, RemoteEventKind, RemotePlayer},
    runtime::Spawner,
    types::*,
};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::{Rc, Weak};
use tracing::{debug, info, instrument, warn};

/// Collaborators a tech instance talks to
#[derive(Clone)]
pub struct TechEnv {
    pub host: Rc<dyn TechHost>,
    pub factory: Rc<dyn PlayerFactory>,
    pub spawner: Rc<dyn Spawner>,
    /// Defaults to the page-wide gate of the current thread
    pub gate: Rc<ReadinessGate>,
    pub platform: Platform,
    pub policy: TechPolicy,
}

impl TechEnv {
    pub fn new(
        host: Rc<dyn TechHost>,
        factory: Rc<dyn PlayerFactory>,
        spawner: Rc<dyn Spawner>,
    ) -> Self {
        Self {
            host,
            factory,
            spawner,
            gate: ReadinessGate::current(),
            platform: Platform::default(),
            policy: TechPolicy::default(),
        }
    }

    pub fn with_gate(mut self, gate: Rc<ReadinessGate>) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_policy(mut self, policy: TechPolicy) -> Self {
        self.policy = policy;
        self
    }
}

struct TechState {
    options: TechOptions,
    source: Option<Source>,
    player: Option<Rc<dyn RemotePlayer>>,
    /// Source URL the player was built with or last asked to load
    loaded_src: Option<String>,
    snapshot: Option<PlaybackSnapshot>,
    error: Option<RemoteError>,
    /// Play as soon as the player accepts commands
    play_on_ready: bool,
    /// Remote player reported `loaded`
    ready: bool,
    disposed: bool,
}

struct TechInner {
    id: TechId,
    env: TechEnv,
    state: RefCell<TechState>,
}

impl LibraryListener for TechInner {
    fn tech_id(&self) -> TechId {
        self.id
    }

    fn on_library_ready(self: Rc<Self>) {
        VimeoTech { inner: self }.init_remote_player();
    }

    fn on_library_failed(self: Rc<Self>, error: &RemoteError) {
        let tech = VimeoTech { inner: self };
        if !tech.is_disposed() {
            tech.fail(error.clone());
        }
    }
}

/// Playback tech driving a hosted Vimeo player.
///
/// Cloning yields another handle to the same instance.
#[derive(Clone)]
pub struct VimeoTech {
    inner: Rc<TechInner>,
}

impl VimeoTech {
    /// Create a tech instance and register it with the readiness gate.
    ///
    /// The remote player is constructed right away when the client library is
    /// already loaded, otherwise once the gate signals readiness.
    pub fn new(options: TechOptions, env: TechEnv) -> Self {
        let poster = options.poster.clone();
        let source = options.source.clone();

        let tech = Self {
            inner: Rc::new(TechInner {
                id: TechId::new(),
                env,
                state: RefCell::new(TechState {
                    options,
                    source: None,
                    player: None,
                    loaded_src: None,
                    snapshot: None,
                    error: None,
                    play_on_ready: false,
                    ready: false,
                    disposed: false,
                }),
            }),
        };

        info!(tech_id = %tech.inner.id, "Creating Vimeo tech");

        if let Some(poster) = poster {
            tech.inner.env.host.set_poster(&poster);
        }
        if let Some(source) = source {
            tech.set_source(source);
        }

        let host = &tech.inner.env.host;
        host.add_container_class(CONTAINER_CLASS);
        if tech.inner.env.platform.blocks_unmuted_autoplay {
            host.add_container_class(MOBILE_CONTAINER_CLASS);
        }

        let env = &tech.inner.env;
        env.gate.register(&tech.inner);
        if let Some(timeout) = env.policy.library_load_timeout {
            if env.gate.is_queued(tech.inner.id) {
                env.gate.arm_timeout(env.spawner.as_ref(), timeout);
            }
        }
        tech
    }

    // =========================================================================
    // Capabilities
    // =========================================================================

    pub fn is_supported() -> bool {
        true
    }

    pub fn can_play_type(mime_type: &str) -> bool {
        mime_type == crate::VIMEO_MIME_TYPE
    }

    pub fn can_play_source(source: &Source) -> bool {
        source.mime_type.as_deref().is_some_and(Self::can_play_type)
    }

    pub fn supports_full_screen(&self) -> bool {
        true
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    pub fn id(&self) -> TechId {
        self.inner.id
    }

    /// Remote player reported `loaded` and accepts commands
    pub fn is_ready(&self) -> bool {
        self.state().ready
    }

    pub fn is_disposed(&self) -> bool {
        self.state().disposed
    }

    pub fn has_player(&self) -> bool {
        self.state().player.is_some()
    }

    /// Pending play intent
    pub fn play_on_ready(&self) -> bool {
        self.state().play_on_ready
    }

    /// Release the remote player, or leave the readiness queue if it was
    /// never constructed. Safe to call at any point, including twice.
    #[instrument(skip(self), fields(tech_id = %self.inner.id))]
    pub fn dispose(&self) {
        let player = {
            let mut state = self.state_mut();
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.ready = false;
            state.play_on_ready = false;
            state.snapshot = None;
            state.player.take()
        };

        match player {
            Some(player) => {
                for kind in RemoteEventKind::ALL {
                    player.off(kind);
                }
                self.inner.env.spawner.spawn(Box::pin(async move {
                    if let Err(error) = player.pause().await {
                        debug!(error = %error, "Pause before destroy failed");
                    }
                    if let Err(error) = player.destroy().await {
                        warn!(error = %error, "Failed to destroy Vimeo player");
                    }
                }));
            }
            None => {
                self.inner.env.gate.unregister(self.inner.id);
            }
        }

        let host = &self.inner.env.host;
        host.remove_container_class(CONTAINER_CLASS);
        host.remove_container_class(MOBILE_CONTAINER_CLASS);
        host.remove_element();

        info!("Vimeo tech disposed");
    }

    fn init_remote_player(&self) {
        let (element_id, config) = {
            let state = self.state();
            if state.disposed || state.player.is_some() {
                return;
            }
            let mut config = RemotePlayerConfig::from_options(&state.options);
            config.url = state.source.as_ref().map(|source| source.src.clone());
            (state.options.tech_id.clone(), config)
        };

        let player = match self.inner.env.factory.create(&element_id, &config) {
            Ok(player) => player,
            Err(error) => {
                warn!(tech_id = %self.inner.id, error = %error, "Failed to construct Vimeo player");
                self.fail(error.into());
                return;
            }
        };

        {
            let mut state = self.state_mut();
            state.player = Some(player.clone());
            state.loaded_src = config.url.clone();
            state.snapshot = Some(PlaybackSnapshot::new(config.muted));
        }

        for kind in RemoteEventKind::ALL {
            let weak = Rc::downgrade(&self.inner);
            player.on(
                kind,
                Rc::new(move |event| {
                    if let Some(tech) = Self::live(&weak) {
                        tech.handle_event(event);
                    }
                }),
            );
        }

        info!(
            tech_id = %self.inner.id,
            element_id = %element_id,
            autoplay = config.autoplay,
            muted = config.muted,
            "Vimeo player constructed"
        );
    }

    /// Upgrade a weak reference, skipping disposed instances
    fn live(weak: &Weak<TechInner>) -> Option<Self> {
        let tech = Self { inner: weak.upgrade()? };
        if tech.is_disposed() {
            None
        } else {
            Some(tech)
        }
    }

    // =========================================================================
    // Remote events
    // =========================================================================

    fn handle_event(&self, event: RemoteEvent) {
        debug!(tech_id = %self.inner.id, event = %event.kind(), "Remote event");

        match event {
            RemoteEvent::PlaybackRateChange { .. } => self.emit(TechEvent::RateChange),
            RemoteEvent::VolumeChange { volume } => {
                self.update_snapshot(|snapshot| snapshot.volume = volume.clamp(0.0, 1.0));
                self.emit(TechEvent::VolumeChange);
            }
            RemoteEvent::TimeUpdate { seconds, duration, percent } => {
                self.on_time_update(seconds, duration, percent);
            }
            RemoteEvent::Playing | RemoteEvent::Play | RemoteEvent::BufferEnd => {
                self.transition(PlaybackState::Playing, TechEvent::Play);
            }
            RemoteEvent::BufferStart => self.transition(PlaybackState::Buffering, TechEvent::Waiting),
            RemoteEvent::Ended => self.transition(PlaybackState::Ended, TechEvent::Ended),
            RemoteEvent::Error(error) => self.fail(error),
            RemoteEvent::Loaded => self.on_player_loaded(),
        }
    }

    fn on_time_update(&self, seconds: f64, duration: f64, percent: f64) {
        let rounded = round_duration(duration);
        let duration_changed = {
            let mut state = self.state_mut();
            let Some(snapshot) = state.snapshot.as_mut() else {
                return;
            };
            let changed = snapshot.duration != rounded;
            snapshot.current_time = seconds.max(0.0);
            snapshot.duration = rounded;
            snapshot.buffered_fraction = percent.clamp(0.0, 1.0);
            changed
        };

        self.emit(TechEvent::TimeUpdate);
        self.emit(TechEvent::Progress);
        if duration_changed {
            debug!(tech_id = %self.inner.id, duration = rounded, "Duration changed");
            self.emit(TechEvent::DurationChange);
        }
    }

    fn on_player_loaded(&self) {
        let (was_ready, muted) = {
            let state = self.state();
            (state.ready, state.options.muted_enabled())
        };
        if !was_ready && muted {
            self.set_muted(true);
        }

        let play_on_ready = {
            let mut state = self.state_mut();
            state.ready = true;
            state.play_on_ready
        };

        if was_ready {
            debug!(tech_id = %self.inner.id, "Vimeo player reloaded");
        } else {
            info!(tech_id = %self.inner.id, play_on_ready, "Vimeo player ready");
            self.inner.env.host.trigger_ready();
        }

        if play_on_ready {
            let weak = Rc::downgrade(&self.inner);
            let settle = self.inner.env.spawner.sleep(self.inner.env.policy.autoplay_settle_delay);
            self.inner.env.spawner.spawn(Box::pin(async move {
                settle.await;
                if let Some(tech) = Self::live(&weak) {
                    tech.play();
                }
            }));
        }
    }

    /// Record a remote error and surface it as `pause` then `error`
    fn fail(&self, error: RemoteError) {
        warn!(tech_id = %self.inner.id, error = %error, "Remote playback error");
        self.state_mut().error = Some(error);
        self.emit(TechEvent::Pause);
        self.emit(TechEvent::Error);
    }

    fn transition(&self, next: PlaybackState, event: TechEvent) {
        self.update_snapshot(|snapshot| {
            if !snapshot.state.can_transition_to(next) {
                debug!(from = %snapshot.state, to = %next, "Unexpected remote state transition");
            }
            snapshot.state = next;
        });
        self.emit(event);
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Set a new source. Sources without a `src` are ignored.
    #[instrument(skip(self, source), fields(tech_id = %self.inner.id, src = %source.src))]
    pub fn set_source(&self, source: Source) {
        if source.is_empty() {
            debug!("Ignoring empty source");
            return;
        }

        let (play_now, reload) = {
            let mut state = self.state_mut();
            if state.disposed {
                return;
            }
            state.error = None;
            state.source = Some(source.clone());

            let changed = state.loaded_src.as_deref() != Some(source.src.as_str());
            let reload = match state.player.clone() {
                Some(player) if changed => {
                    state.loaded_src = Some(source.src.clone());
                    Some(player)
                }
                _ => None,
            };

            let mut play_now = false;
            if state.options.autoplay_enabled() && !self.inner.env.platform.blocks_unmuted_autoplay {
                if state.ready {
                    play_now = true;
                } else {
                    state.play_on_ready = true;
                }
            }
            (play_now, reload)
        };

        if let Some(player) = reload {
            self.load_video(player, source.src);
        }
        if play_now {
            self.play();
        }
    }

    /// Combined setter and getter: sets the source when `src` is given and
    /// returns the current source URL.
    pub fn src(&self, src: Option<&str>) -> Option<String> {
        if let Some(src) = src {
            self.set_source(Source::new(src));
        }
        self.current_src()
    }

    fn load_video(&self, player: Rc<dyn RemotePlayer>, url: String) {
        let weak = Rc::downgrade(&self.inner);
        self.inner.env.spawner.spawn(Box::pin(async move {
            match player.load_video(&url).await {
                Ok(()) => {
                    if let Some(tech) = Self::live(&weak) {
                        tech.reset_snapshot();
                    }
                }
                Err(error) => warn!(error = %error, url = %url, "Failed to load video"),
            }
        }));
    }

    fn reset_snapshot(&self) {
        let had_duration = {
            let mut state = self.state_mut();
            let Some(snapshot) = state.snapshot.as_mut() else {
                return;
            };
            let had_duration = snapshot.duration != 0.0;
            snapshot.state = PlaybackState::Unstarted;
            snapshot.current_time = 0.0;
            snapshot.duration = 0.0;
            snapshot.buffered_fraction = 0.0;
            had_duration
        };

        if had_duration {
            self.emit(TechEvent::DurationChange);
        }
    }

    /// Start playback, or remember to once the player is ready.
    ///
    /// The first play under autoplay mutes the player before playing.
    #[instrument(skip(self), fields(tech_id = %self.inner.id))]
    pub fn play(&self) {
        let (player, force_mute) = {
            let mut state = self.state_mut();
            if state.disposed || state.source.is_none() {
                return;
            }
            if !state.ready {
                state.play_on_ready = true;
                (None, false)
            } else {
                let force_mute = std::mem::take(&mut state.play_on_ready);
                (state.player.clone(), force_mute)
            }
        };

        let Some(player) = player else {
            debug!("Player not ready, deferring play");
            self.emit(TechEvent::Waiting);
            return;
        };

        let weak = Rc::downgrade(&self.inner);
        self.inner.env.spawner.spawn(Box::pin(async move {
            if force_mute {
                if let Err(error) = player.set_muted(true).await {
                    warn!(error = %error, "Failed to mute before autoplay");
                    return;
                }
                match Self::live(&weak) {
                    Some(tech) => tech.confirm_muted(true),
                    None => return,
                }
            }

            match player.play().await {
                Ok(()) => {
                    if let Some(tech) = Self::live(&weak) {
                        tech.transition(PlaybackState::Playing, TechEvent::Play);
                    }
                }
                Err(error) => warn!(error = %error, "Vimeo play request failed"),
            }
        }));
    }

    /// Pause playback. Dropped when no remote player exists yet.
    #[instrument(skip(self), fields(tech_id = %self.inner.id))]
    pub fn pause(&self) {
        let Some(player) = self.player() else {
            return;
        };

        let weak = Rc::downgrade(&self.inner);
        self.inner.env.spawner.spawn(Box::pin(async move {
            match player.pause().await {
                Ok(()) => {
                    if let Some(tech) = Self::live(&weak) {
                        tech.transition(PlaybackState::Paused, TechEvent::Pause);
                    }
                }
                Err(error) => warn!(error = %error, "Vimeo pause request failed"),
            }
        }));
    }

    /// Seek to `seconds`
    #[instrument(skip(self), fields(tech_id = %self.inner.id))]
    pub fn set_current_time(&self, seconds: f64) {
        let Some(player) = self.player() else {
            return;
        };

        self.inner.env.spawner.spawn(Box::pin(async move {
            if let Err(error) = player.set_current_time(seconds.max(0.0)).await {
                warn!(error = %error, seconds, "Vimeo seek failed");
            }
        }));
    }

    /// Set volume as a fraction in [0, 1]
    #[instrument(skip(self), fields(tech_id = %self.inner.id))]
    pub fn set_volume(&self, volume: f64) {
        let Some(player) = self.player() else {
            return;
        };

        let volume = volume.clamp(0.0, 1.0);
        let weak = Rc::downgrade(&self.inner);
        self.inner.env.spawner.spawn(Box::pin(async move {
            match player.set_volume(volume).await {
                Ok(()) => {
                    if let Some(tech) = Self::live(&weak) {
                        tech.update_snapshot(|snapshot| snapshot.volume = volume);
                        tech.emit(TechEvent::VolumeChange);
                    }
                }
                Err(error) => warn!(error = %error, volume, "Vimeo volume change failed"),
            }
        }));
    }

    #[instrument(skip(self), fields(tech_id = %self.inner.id))]
    pub fn set_muted(&self, muted: bool) {
        let Some(player) = self.player() else {
            return;
        };

        let weak = Rc::downgrade(&self.inner);
        self.inner.env.spawner.spawn(Box::pin(async move {
            match player.set_muted(muted).await {
                Ok(()) => {
                    if let Some(tech) = Self::live(&weak) {
                        tech.confirm_muted(muted);
                    }
                }
                Err(error) => warn!(error = %error, muted, "Vimeo mute change failed"),
            }
        }));
    }

    fn confirm_muted(&self, muted: bool) {
        self.update_snapshot(|snapshot| snapshot.muted = muted);
        self.emit(TechEvent::VolumeChange);
    }

    pub fn autoplay(&self) -> bool {
        self.state().options.autoplay_enabled()
    }

    pub fn set_autoplay(&self, autoplay: bool) {
        self.state_mut().options.autoplay = Some(autoplay);
    }

    pub fn looping(&self) -> bool {
        self.state().options.looping.unwrap_or(false)
    }

    /// Only affects players constructed afterwards
    pub fn set_looping(&self, looping: bool) {
        self.state_mut().options.looping = Some(looping);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Copy of the snapshot, `None` until the remote player exists
    pub fn snapshot(&self) -> Option<PlaybackSnapshot> {
        self.state().snapshot.clone()
    }

    pub fn current_state(&self) -> Option<PlaybackState> {
        self.read_snapshot(|snapshot| snapshot.state)
    }

    /// True unless playing or buffering; true before the player exists
    pub fn paused(&self) -> bool {
        self.read_snapshot(PlaybackSnapshot::paused).unwrap_or(true)
    }

    pub fn ended(&self) -> Option<bool> {
        self.read_snapshot(|snapshot| snapshot.state == PlaybackState::Ended)
    }

    pub fn current_time(&self) -> Option<f64> {
        self.read_snapshot(|snapshot| snapshot.current_time)
    }

    pub fn duration(&self) -> Option<f64> {
        self.read_snapshot(|snapshot| snapshot.duration)
    }

    pub fn volume(&self) -> Option<f64> {
        self.read_snapshot(|snapshot| snapshot.volume)
    }

    pub fn muted(&self) -> Option<bool> {
        self.read_snapshot(|snapshot| snapshot.muted)
    }

    pub fn buffered(&self) -> Option<TimeRange> {
        self.read_snapshot(PlaybackSnapshot::buffered)
    }

    pub fn current_source(&self) -> Option<Source> {
        self.state().source.clone()
    }

    pub fn current_src(&self) -> Option<String> {
        self.state().source.as_ref().map(|source| source.src.clone())
    }

    pub fn last_error(&self) -> Option<RemoteError> {
        self.state().error.clone()
    }

    /// Last error in the host's `{code, message}` shape
    pub fn error(&self) -> Option<TechError> {
        self.state().error.as_ref().map(TechError::from)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn state(&self) -> Ref<'_, TechState> {
        self.inner.state.borrow()
    }

    fn state_mut(&self) -> RefMut<'_, TechState> {
        self.inner.state.borrow_mut()
    }

    fn player(&self) -> Option<Rc<dyn RemotePlayer>> {
        self.state().player.clone()
    }

    fn read_snapshot<T>(&self, read: impl FnOnce(&PlaybackSnapshot) -> T) -> Option<T> {
        self.state().snapshot.as_ref().map(read)
    }

    fn update_snapshot(&self, update: impl FnOnce(&mut PlaybackSnapshot)) {
        if let Some(snapshot) = self.state_mut().snapshot.as_mut() {
            update(snapshot);
        }
    }

    /// Notify the host. Never called while the state is borrowed, so the
    /// host may read accessors from inside `trigger`.
    fn emit(&self, event: TechEvent) {
        self.inner.env.host.trigger(event);
    }
}

/// Durations are tracked in whole seconds
fn round_duration(duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 {
        duration.round()
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_duration() {
        assert_eq!(round_duration(10.2), 10.0);
        assert_eq!(round_duration(10.5), 11.0);
        assert_eq!(round_duration(10.6), 11.0);
        assert_eq!(round_duration(-3.0), 0.0);
        assert_eq!(round_duration(f64::NAN), 0.0);
        assert_eq!(round_duration(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_capability_probes() {
        assert!(VimeoTech::is_supported());
        assert!(VimeoTech::can_play_type("video/vimeo"));
        assert!(!VimeoTech::can_play_type("video/mp4"));
        assert!(VimeoTech::can_play_source(&Source::new("https://vimeo.com/1")));
        assert!(!VimeoTech::can_play_source(&Source {
            src: "https://vimeo.com/1".into(),
            mime_type: None,
        }));
    }
}
