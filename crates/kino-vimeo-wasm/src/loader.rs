//! Page-level setup: the Vimeo API script and the tech stylesheet

use crate::spawner::WasmSpawner;
use kino_vimeo::{ReadinessGate, PLAYER_API_URL};
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Hides the big play button on mobile, where Vimeo draws its own
pub const PLAYER_CSS: &str = ".vjs-vimeo-mobile .vjs-big-play-button { display: none; }";

fn document() -> Result<web_sys::Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("No document available"))
}

/// Append the tech stylesheet to `<head>`
#[wasm_bindgen(js_name = injectCss)]
pub fn inject_css() -> Result<(), JsValue> {
    let document = document()?;
    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("Document has no <head>"))?;

    let style = document.create_element("style")?;
    style.set_attribute("type", "text/css")?;
    style.set_text_content(Some(PLAYER_CSS));
    head.append_child(&style)?;
    Ok(())
}

/// Load the Vimeo player API and open the readiness gate once it runs
///
/// With `timeout_ms` set, queued techs are failed with a `LibraryLoadError`
/// if the script has not loaded in time.
#[wasm_bindgen(js_name = loadPlayerApi)]
pub fn load_player_api(timeout_ms: Option<u32>) -> Result<(), JsValue> {
    let document = document()?;
    let script = document
        .create_element("script")?
        .dyn_into::<web_sys::HtmlScriptElement>()?;
    script.set_src(PLAYER_API_URL);

    let onload = Closure::<dyn FnMut()>::new(|| {
        web_sys::console::log_1(&"[Kino Vimeo] Player API loaded".into());
        ReadinessGate::current().signal_ready();
    });
    script.set_onload(Some(onload.as_ref().unchecked_ref()));
    onload.forget();

    let onerror = Closure::<dyn FnMut()>::new(|| {
        ReadinessGate::current().signal_failed(format!("could not load {PLAYER_API_URL}"));
    });
    script.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onerror.forget();

    // Insert ahead of the first script so it starts loading early
    match document.get_elements_by_tag_name("script").item(0) {
        Some(first) => {
            let parent = first
                .parent_node()
                .ok_or_else(|| JsValue::from_str("Script tag without parent"))?;
            let first: &web_sys::Node = &first;
            parent.insert_before(&script, Some(first))?;
        }
        None => {
            let head = document
                .head()
                .ok_or_else(|| JsValue::from_str("Document has no <head>"))?;
            head.append_child(&script)?;
        }
    }

    if let Some(ms) = timeout_ms {
        ReadinessGate::current().arm_timeout(&WasmSpawner, Duration::from_millis(ms as u64));
    }

    Ok(())
}

/// Open the gate when the page loads the API script itself
#[wasm_bindgen(js_name = apiLoaded)]
pub fn api_loaded() {
    ReadinessGate::current().signal_ready();
}
