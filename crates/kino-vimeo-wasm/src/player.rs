//! `RemotePlayer` implementation over a live `Vimeo.Player`

use crate::vimeo::VimeoPlayer;
use async_trait::async_trait;
use js_sys::Promise;
use kino_vimeo::{
    EventHandler, PlayerFactory, RemoteError, RemoteEvent, RemoteEventKind, RemotePlayer,
    RemotePlayerConfig,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// A `Vimeo.Player` embedded in the page
pub struct JsRemotePlayer {
    player: VimeoPlayer,
    /// Closures must outlive their registration on the JS side
    listeners: RefCell<HashMap<RemoteEventKind, Closure<dyn FnMut(JsValue)>>>,
}

impl JsRemotePlayer {
    pub fn new(player: VimeoPlayer) -> Self {
        Self {
            player,
            listeners: RefCell::new(HashMap::new()),
        }
    }

    async fn settle(promise: Promise, method: &str) -> Result<(), RemoteError> {
        JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|err| remote_error(method, err))
    }
}

/// Convert a promise rejection into a `RemoteError`
///
/// Vimeo rejects with `Error` objects carrying `name`, `method` and `message`.
fn remote_error(method: &str, value: JsValue) -> RemoteError {
    let mut error = serde_wasm_bindgen::from_value::<RemoteError>(value.clone())
        .unwrap_or_else(|_| {
            let message = value.as_string().unwrap_or_else(|| format!("{value:?}"));
            RemoteError::new("Error", method, message)
        });
    if error.method.is_empty() {
        error.method = method.to_string();
    }
    error
}

#[async_trait(?Send)]
impl RemotePlayer for JsRemotePlayer {
    fn on(&self, kind: RemoteEventKind, handler: EventHandler) {
        let callback = Closure::<dyn FnMut(JsValue)>::new(move |payload: JsValue| {
            let value: serde_json::Value =
                serde_wasm_bindgen::from_value(payload).unwrap_or(serde_json::Value::Null);
            match RemoteEvent::from_payload(kind, &value) {
                Ok(event) => handler(event),
                Err(err) => web_sys::console::warn_1(
                    &format!("[Kino Vimeo] Dropping malformed '{kind}' event: {err}").into(),
                ),
            }
        });

        self.player.on(kind.as_str(), callback.as_ref().unchecked_ref());
        self.listeners.borrow_mut().insert(kind, callback);
    }

    fn off(&self, kind: RemoteEventKind) {
        self.player.off(kind.as_str());
        self.listeners.borrow_mut().remove(&kind);
    }

    async fn play(&self) -> Result<(), RemoteError> {
        Self::settle(self.player.play(), "play").await
    }

    async fn pause(&self) -> Result<(), RemoteError> {
        Self::settle(self.player.pause(), "pause").await
    }

    async fn set_volume(&self, volume: f64) -> Result<(), RemoteError> {
        Self::settle(self.player.set_volume(volume), "setVolume").await
    }

    async fn set_muted(&self, muted: bool) -> Result<(), RemoteError> {
        Self::settle(self.player.set_muted(muted), "setMuted").await
    }

    async fn set_current_time(&self, seconds: f64) -> Result<(), RemoteError> {
        Self::settle(self.player.set_current_time(seconds), "setCurrentTime").await
    }

    async fn load_video(&self, url: &str) -> Result<(), RemoteError> {
        Self::settle(self.player.load_video(url), "loadVideo").await
    }

    async fn destroy(&self) -> Result<(), RemoteError> {
        Self::settle(self.player.destroy(), "destroy").await
    }
}

/// Builds `Vimeo.Player` instances inside the tech element
#[derive(Debug, Default, Clone, Copy)]
pub struct JsPlayerFactory;

impl PlayerFactory for JsPlayerFactory {
    fn create(
        &self,
        element_id: &str,
        config: &RemotePlayerConfig,
    ) -> kino_vimeo::Result<Rc<dyn RemotePlayer>> {
        let options = serde_wasm_bindgen::to_value(config)
            .map_err(|e| kino_vimeo::Error::PlayerConstruction(e.to_string()))?;

        let player = VimeoPlayer::new(element_id, &options).map_err(|e| {
            kino_vimeo::Error::PlayerConstruction(
                e.as_string().unwrap_or_else(|| format!("{e:?}")),
            )
        })?;

        Ok(Rc::new(JsRemotePlayer::new(player)))
    }
}
