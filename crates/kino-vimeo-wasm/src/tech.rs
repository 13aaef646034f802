//! `KinoVimeoTech` - the tech as seen from JavaScript
//!
//! Method names follow the host framework's tech contract so a thin JS
//! subclass can forward to them one to one.

use crate::{
    host::{JsTechHost, TechBridge},
    player::JsPlayerFactory,
    spawner::WasmSpawner,
};
use kino_vimeo::{Platform, Source, TechEnv, TechOptions, VimeoTech};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Fills the wrapper so Vimeo's iframe covers the player box
pub const MOUNT_STYLE: &str = "width: 100%; height: 100%; top: 0; left: 0; position: absolute;";

/// Build the tech element: a wrapper div holding the div Vimeo mounts into
#[wasm_bindgen(js_name = createTechElement)]
pub fn create_tech_element(tech_id: &str) -> Result<web_sys::HtmlElement, JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("No document available"))?;

    let wrapper = document.create_element("div")?;
    wrapper.set_attribute("style", "width: 100%; height: 100%;")?;

    let mount = document.create_element("div")?;
    mount.set_id(tech_id);
    mount.set_attribute("style", MOUNT_STYLE)?;
    mount.set_class_name("vjs-tech");

    wrapper.append_child(&mount)?;
    wrapper.dyn_into::<web_sys::HtmlElement>().map_err(JsValue::from)
}

#[wasm_bindgen]
pub struct KinoVimeoTech {
    tech: VimeoTech,
}

#[wasm_bindgen]
impl KinoVimeoTech {
    /// Create the tech. `element` must already be attached to the player.
    #[wasm_bindgen(constructor)]
    pub fn new(
        options: JsValue,
        bridge: TechBridge,
        element: web_sys::HtmlElement,
        blocks_unmuted_autoplay: bool,
    ) -> Result<KinoVimeoTech, JsValue> {
        let options: TechOptions = serde_wasm_bindgen::from_value(options)?;
        options.validate().map_err(js_error)?;

        let env = TechEnv::new(
            Rc::new(JsTechHost::new(bridge, element)),
            Rc::new(JsPlayerFactory),
            Rc::new(WasmSpawner),
        )
        .with_platform(Platform { blocks_unmuted_autoplay });

        Ok(Self {
            tech: VimeoTech::new(options, env),
        })
    }

    #[wasm_bindgen(js_name = isSupported)]
    pub fn is_supported() -> bool {
        VimeoTech::is_supported()
    }

    /// `"probably"` for `video/vimeo`, empty otherwise
    #[wasm_bindgen(js_name = canPlayType)]
    pub fn can_play_type(mime_type: &str) -> String {
        if VimeoTech::can_play_type(mime_type) {
            "probably".to_string()
        } else {
            String::new()
        }
    }

    #[wasm_bindgen(js_name = canPlaySource)]
    pub fn can_play_source(source: JsValue) -> Result<String, JsValue> {
        let source: Source = serde_wasm_bindgen::from_value(source)?;
        Ok(match source.mime_type.as_deref() {
            Some(mime_type) => Self::can_play_type(mime_type),
            None => String::new(),
        })
    }

    #[wasm_bindgen(js_name = supportsFullScreen)]
    pub fn supports_full_screen(&self) -> bool {
        self.tech.supports_full_screen()
    }

    pub fn dispose(&self) {
        self.tech.dispose();
    }

    // Commands

    pub fn play(&self) {
        self.tech.play();
    }

    pub fn pause(&self) {
        self.tech.pause();
    }

    #[wasm_bindgen(js_name = setCurrentTime)]
    pub fn set_current_time(&self, seconds: f64) {
        self.tech.set_current_time(seconds);
    }

    #[wasm_bindgen(js_name = setVolume)]
    pub fn set_volume(&self, volume: f64) {
        self.tech.set_volume(volume);
    }

    #[wasm_bindgen(js_name = setMuted)]
    pub fn set_muted(&self, muted: bool) {
        self.tech.set_muted(muted);
    }

    #[wasm_bindgen(js_name = setSource)]
    pub fn set_source(&self, source: JsValue) -> Result<(), JsValue> {
        let source: Source = serde_wasm_bindgen::from_value(source)?;
        self.tech.set_source(source);
        Ok(())
    }

    /// Getter without an argument, setter with one
    pub fn src(&self, src: Option<String>) -> Option<String> {
        self.tech.src(src.as_deref())
    }

    #[wasm_bindgen(js_name = currentSrc)]
    pub fn current_src(&self) -> Option<String> {
        self.tech.current_src()
    }

    // Accessors

    pub fn paused(&self) -> bool {
        self.tech.paused()
    }

    pub fn ended(&self) -> Option<bool> {
        self.tech.ended()
    }

    #[wasm_bindgen(js_name = currentTime)]
    pub fn current_time(&self) -> Option<f64> {
        self.tech.current_time()
    }

    pub fn duration(&self) -> Option<f64> {
        self.tech.duration()
    }

    pub fn volume(&self) -> Option<f64> {
        self.tech.volume()
    }

    pub fn muted(&self) -> Option<bool> {
        self.tech.muted()
    }

    /// `[start, end]` in seconds
    pub fn buffered(&self) -> Option<Vec<f64>> {
        self.tech.buffered().map(|range| vec![range.start, range.end])
    }

    /// `{ code, message }` of the last remote error
    pub fn error(&self) -> Result<JsValue, JsValue> {
        match self.tech.error() {
            Some(error) => Ok(serde_wasm_bindgen::to_value(&error)?),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    pub fn autoplay(&self) -> bool {
        self.tech.autoplay()
    }

    #[wasm_bindgen(js_name = setAutoplay)]
    pub fn set_autoplay(&self, autoplay: bool) {
        self.tech.set_autoplay(autoplay);
    }

    #[wasm_bindgen(js_name = "loop")]
    pub fn looping(&self) -> bool {
        self.tech.looping()
    }

    #[wasm_bindgen(js_name = setLoop)]
    pub fn set_looping(&self, looping: bool) {
        self.tech.set_looping(looping);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_is_pinned_to_wrapper_corner() {
        for rule in ["top: 0", "left: 0", "position: absolute", "width: 100%", "height: 100%"] {
            assert!(MOUNT_STYLE.contains(rule), "missing {rule}");
        }
    }
}
