//! Bindings to the Vimeo player API (`https://player.vimeo.com/api/player.js`)

use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// `Vimeo.Player`
    #[wasm_bindgen(js_namespace = Vimeo, js_name = Player)]
    pub type VimeoPlayer;

    #[wasm_bindgen(constructor, js_namespace = Vimeo, js_class = "Player", catch)]
    pub fn new(element_id: &str, options: &JsValue) -> Result<VimeoPlayer, JsValue>;

    #[wasm_bindgen(method, js_class = "Player")]
    pub fn on(this: &VimeoPlayer, event: &str, callback: &Function);

    #[wasm_bindgen(method, js_class = "Player")]
    pub fn off(this: &VimeoPlayer, event: &str);

    #[wasm_bindgen(method, js_class = "Player")]
    pub fn play(this: &VimeoPlayer) -> Promise;

    #[wasm_bindgen(method, js_class = "Player")]
    pub fn pause(this: &VimeoPlayer) -> Promise;

    #[wasm_bindgen(method, js_class = "Player", js_name = setVolume)]
    pub fn set_volume(this: &VimeoPlayer, volume: f64) -> Promise;

    #[wasm_bindgen(method, js_class = "Player", js_name = setMuted)]
    pub fn set_muted(this: &VimeoPlayer, muted: bool) -> Promise;

    #[wasm_bindgen(method, js_class = "Player", js_name = setCurrentTime)]
    pub fn set_current_time(this: &VimeoPlayer, seconds: f64) -> Promise;

    #[wasm_bindgen(method, js_class = "Player", js_name = loadVideo)]
    pub fn load_video(this: &VimeoPlayer, url: &str) -> Promise;

    #[wasm_bindgen(method, js_class = "Player")]
    pub fn destroy(this: &VimeoPlayer) -> Promise;
}
