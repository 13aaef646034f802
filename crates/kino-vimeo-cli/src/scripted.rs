//! Scripted stand-ins for the remote player and the host framework

use async_trait::async_trait;
use kino_vimeo::{
    EventHandler, PlayerFactory, RemoteError, RemoteEvent, RemoteEventKind, RemotePlayer,
    RemotePlayerConfig, TechEvent, TechHost,
};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tokio::time::Instant;

/// Something observed during a replay, stamped with simulated time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub at_ms: u64,
    pub text: String,
}

/// Shared replay log
#[derive(Debug, Clone)]
pub struct Log {
    start: Instant,
    entries: Rc<RefCell<Vec<Entry>>>,
}

impl Log {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            entries: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn push(&self, text: impl Into<String>) {
        let at_ms = self.start.elapsed().as_millis() as u64;
        self.entries.borrow_mut().push(Entry { at_ms, text: text.into() });
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.entries.borrow().clone()
    }
}

/// Host that records notifications and element changes
pub struct RecordingHost {
    log: Log,
}

impl RecordingHost {
    pub fn new(log: Log) -> Self {
        Self { log }
    }
}

impl TechHost for RecordingHost {
    fn trigger(&self, event: TechEvent) {
        self.log.push(event.as_str());
    }

    fn trigger_ready(&self) {
        self.log.push("ready");
    }

    fn set_poster(&self, url: &str) {
        self.log.push(format!("poster {url}"));
    }

    fn add_container_class(&self, class: &str) {
        self.log.push(format!("+class {class}"));
    }

    fn remove_container_class(&self, class: &str) {
        self.log.push(format!("-class {class}"));
    }

    fn remove_element(&self) {
        self.log.push("element removed");
    }
}

/// Remote player that confirms every command unless a rejection is queued
pub struct ScriptedPlayer {
    log: Log,
    handlers: RefCell<HashMap<RemoteEventKind, EventHandler>>,
    rejections: RefCell<HashMap<String, RemoteError>>,
}

impl ScriptedPlayer {
    fn new(log: Log) -> Self {
        Self {
            log,
            handlers: RefCell::new(HashMap::new()),
            rejections: RefCell::new(HashMap::new()),
        }
    }

    /// Deliver an event; returns false when nobody listens for it
    pub fn emit(&self, event: RemoteEvent) -> bool {
        let handler = self.handlers.borrow().get(&event.kind()).cloned();
        match handler {
            Some(handler) => {
                handler(event);
                true
            }
            None => false,
        }
    }

    /// Reject the next call of `error.method`
    pub fn reject(&self, error: RemoteError) {
        self.rejections.borrow_mut().insert(error.method.clone(), error);
    }

    fn call(&self, method: &str, text: String) -> Result<(), RemoteError> {
        self.log.push(text);
        match self.rejections.borrow_mut().remove(method) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait(?Send)]
impl RemotePlayer for ScriptedPlayer {
    fn on(&self, kind: RemoteEventKind, handler: EventHandler) {
        self.handlers.borrow_mut().insert(kind, handler);
    }

    fn off(&self, kind: RemoteEventKind) {
        self.handlers.borrow_mut().remove(&kind);
    }

    async fn play(&self) -> Result<(), RemoteError> {
        self.call("play", "> play".to_string())
    }

    async fn pause(&self) -> Result<(), RemoteError> {
        self.call("pause", "> pause".to_string())
    }

    async fn set_volume(&self, volume: f64) -> Result<(), RemoteError> {
        self.call("setVolume", format!("> setVolume {volume}"))
    }

    async fn set_muted(&self, muted: bool) -> Result<(), RemoteError> {
        self.call("setMuted", format!("> setMuted {muted}"))
    }

    async fn set_current_time(&self, seconds: f64) -> Result<(), RemoteError> {
        self.call("setCurrentTime", format!("> setCurrentTime {seconds}"))
    }

    async fn load_video(&self, url: &str) -> Result<(), RemoteError> {
        self.call("loadVideo", format!("> loadVideo {url}"))
    }

    async fn destroy(&self) -> Result<(), RemoteError> {
        self.call("destroy", "> destroy".to_string())
    }
}

/// Factory keeping hold of the player it builds
pub struct ScriptedFactory {
    log: Log,
    player: RefCell<Option<Rc<ScriptedPlayer>>>,
}

impl ScriptedFactory {
    pub fn new(log: Log) -> Self {
        Self {
            log,
            player: RefCell::new(None),
        }
    }

    pub fn player(&self) -> Option<Rc<ScriptedPlayer>> {
        self.player.borrow().clone()
    }
}

impl PlayerFactory for ScriptedFactory {
    fn create(
        &self,
        element_id: &str,
        config: &RemotePlayerConfig,
    ) -> kino_vimeo::Result<Rc<dyn RemotePlayer>> {
        self.log.push(format!(
            "> create #{element_id} {}",
            serde_json::to_string(config)?
        ));
        let player = Rc::new(ScriptedPlayer::new(self.log.clone()));
        *self.player.borrow_mut() = Some(player.clone());
        Ok(player)
    }
}
