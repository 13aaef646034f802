//! Kino Vimeo WASM - browser bridge for the Vimeo playback tech
//!
//! Wires the reconciler from `kino-vimeo` to the real world:
//! - `Vimeo.Player` bindings implementing the remote player contract
//! - A JS bridge object standing in for the host framework's tech base class
//! - Loading of the Vimeo player API script and the tech stylesheet
//!
//! ## Integration with video.js
//!
//! ```javascript
//! import init, { KinoVimeoTech, createTechElement, loadPlayerApi } from '@kino/vimeo-wasm';
//!
//! await init();
//! loadPlayerApi(10000);
//!
//! class Vimeo extends videojs.getTech('Tech') {
//!   constructor(options, ready) {
//!     super(options, ready);
//!     // The element has no parent until the next tick
//!     this.setTimeout(() => {
//!       this.kino = new KinoVimeoTech(options, this, this.el_, videojs.browser.IS_IOS);
//!     });
//!   }
//!   createEl() { return createTechElement(this.options_.techId); }
//!   play() { this.kino.play(); }
//!   // ...
//! }
//! ```

use wasm_bindgen::prelude::*;

mod host;
mod loader;
mod player;
mod spawner;
mod tech;
mod vimeo;

pub use host::{JsTechHost, TechBridge};
pub use loader::{api_loaded, inject_css, load_player_api, PLAYER_CSS};
pub use player::{JsPlayerFactory, JsRemotePlayer};
pub use spawner::WasmSpawner;
pub use tech::{create_tech_element, KinoVimeoTech};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"[Kino Vimeo WASM] Initialized".into());
}

/// Library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
