//! Recording stand-ins for the host framework and the Vimeo player

#![allow(dead_code)]

use async_trait::async_trait;
use kino_vimeo::{
    EventHandler, PlayerFactory, ReadinessGate, RemoteError, RemoteEvent, RemoteEventKind,
    RemotePlayer, RemotePlayerConfig, TechEnv, TechEvent, TechHost, TechOptions, TokioSpawner,
    VimeoTech,
};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::rc::Rc;

/// Run a test body on a `LocalSet` so the tech can spawn local tasks
pub async fn local<F: Future<Output = ()>>(body: F) {
    tokio::task::LocalSet::new().run_until(body).await;
}

/// Let spawned confirmation tasks run to completion
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[derive(Default)]
pub struct MockHost {
    pub events: RefCell<Vec<TechEvent>>,
    pub ready_count: Cell<u32>,
    pub classes: RefCell<HashSet<String>>,
    pub poster: RefCell<Option<String>>,
    pub element_removed: Cell<bool>,
}

impl MockHost {
    pub fn count(&self, event: TechEvent) -> usize {
        self.events.borrow().iter().filter(|e| **e == event).count()
    }

    pub fn take_events(&self) -> Vec<TechEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.borrow().contains(class)
    }
}

impl TechHost for MockHost {
    fn trigger(&self, event: TechEvent) {
        self.events.borrow_mut().push(event);
    }

    fn trigger_ready(&self) {
        self.ready_count.set(self.ready_count.get() + 1);
    }

    fn set_poster(&self, url: &str) {
        *self.poster.borrow_mut() = Some(url.to_string());
    }

    fn add_container_class(&self, class: &str) {
        self.classes.borrow_mut().insert(class.to_string());
    }

    fn remove_container_class(&self, class: &str) {
        self.classes.borrow_mut().remove(class);
    }

    fn remove_element(&self) {
        self.element_removed.set(true);
    }
}

/// Command received by the mock player
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Play,
    Pause,
    SetVolume(f64),
    SetMuted(bool),
    SetCurrentTime(f64),
    LoadVideo(String),
    Destroy,
}

pub struct MockPlayer {
    pub element_id: String,
    pub config: RemotePlayerConfig,
    pub commands: RefCell<Vec<Command>>,
    handlers: RefCell<HashMap<RemoteEventKind, EventHandler>>,
    failures: RefCell<HashMap<&'static str, RemoteError>>,
}

impl MockPlayer {
    fn new(element_id: &str, config: &RemotePlayerConfig) -> Self {
        Self {
            element_id: element_id.to_string(),
            config: config.clone(),
            commands: RefCell::new(Vec::new()),
            handlers: RefCell::new(HashMap::new()),
            failures: RefCell::new(HashMap::new()),
        }
    }

    /// Deliver an event; returns false when nobody listens
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

    pub fn time_update(&self, seconds: f64, duration: f64, percent: f64) {
        self.emit(RemoteEvent::TimeUpdate { seconds, duration, percent });
    }

    /// Make every later call of `method` fail
    pub fn fail(&self, method: &'static str) {
        self.failures
            .borrow_mut()
            .insert(method, RemoteError::new("MockError", method, "scripted failure"));
    }

    pub fn commands(&self) -> Vec<Command> {
        self.commands.borrow().clone()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    fn record(&self, method: &'static str, command: Command) -> Result<(), RemoteError> {
        self.commands.borrow_mut().push(command);
        match self.failures.borrow().get(method) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait(?Send)]
impl RemotePlayer for MockPlayer {
    fn on(&self, kind: RemoteEventKind, handler: EventHandler) {
        self.handlers.borrow_mut().insert(kind, handler);
    }

    fn off(&self, kind: RemoteEventKind) {
        self.handlers.borrow_mut().remove(&kind);
    }

    async fn play(&self) -> Result<(), RemoteError> {
        self.record("play", Command::Play)
    }

    async fn pause(&self) -> Result<(), RemoteError> {
        self.record("pause", Command::Pause)
    }

    async fn set_volume(&self, volume: f64) -> Result<(), RemoteError> {
        self.record("setVolume", Command::SetVolume(volume))
    }

    async fn set_muted(&self, muted: bool) -> Result<(), RemoteError> {
        self.record("setMuted", Command::SetMuted(muted))
    }

    async fn set_current_time(&self, seconds: f64) -> Result<(), RemoteError> {
        self.record("setCurrentTime", Command::SetCurrentTime(seconds))
    }

    async fn load_video(&self, url: &str) -> Result<(), RemoteError> {
        self.record("loadVideo", Command::LoadVideo(url.to_string()))
    }

    async fn destroy(&self) -> Result<(), RemoteError> {
        self.record("destroy", Command::Destroy)
    }
}

#[derive(Default)]
pub struct MockFactory {
    pub players: RefCell<Vec<Rc<MockPlayer>>>,
    pub fail: Cell<bool>,
}

impl PlayerFactory for MockFactory {
    fn create(
        &self,
        element_id: &str,
        config: &RemotePlayerConfig,
    ) -> kino_vimeo::Result<Rc<dyn RemotePlayer>> {
        if self.fail.get() {
            return Err(kino_vimeo::Error::PlayerConstruction(format!(
                "no element with id {element_id}"
            )));
        }
        let player = Rc::new(MockPlayer::new(element_id, config));
        self.players.borrow_mut().push(player.clone());
        Ok(player as Rc<dyn RemotePlayer>)
    }
}

/// Host, factory and a private gate wired together
pub struct Harness {
    pub host: Rc<MockHost>,
    pub factory: Rc<MockFactory>,
    pub gate: Rc<ReadinessGate>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            host: Rc::new(MockHost::default()),
            factory: Rc::new(MockFactory::default()),
            gate: Rc::new(ReadinessGate::new()),
        }
    }

    /// Harness whose player API has already loaded
    pub fn ready() -> Self {
        let harness = Self::new();
        harness.gate.signal_ready();
        harness
    }

    pub fn env(&self) -> TechEnv {
        TechEnv::new(self.host.clone(), self.factory.clone(), Rc::new(TokioSpawner))
            .with_gate(self.gate.clone())
    }

    pub fn tech(&self, options: TechOptions) -> VimeoTech {
        VimeoTech::new(options, self.env())
    }

    pub fn player(&self, index: usize) -> Rc<MockPlayer> {
        self.factory.players.borrow()[index].clone()
    }

    pub fn created(&self) -> usize {
        self.factory.players.borrow().len()
    }
}

pub fn options() -> TechOptions {
    TechOptions::new("vjs_video_3_Vimeo_api")
        .with_source(kino_vimeo::Source::new("https://vimeo.com/76979871"))
}
