//! Host framework bridge
//!
//! The JS side passes its tech object (anything with `trigger`,
//! `triggerReady` and `setPoster`) plus the wrapper element built by
//! `createTechElement`. Container classes go on the wrapper's parent, which
//! is the player element once the tech is attached.

use kino_vimeo::{TechEvent, TechHost};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// JS object receiving tech notifications
    pub type TechBridge;

    #[wasm_bindgen(method)]
    fn trigger(this: &TechBridge, event: &str);

    #[wasm_bindgen(method, js_name = triggerReady)]
    fn trigger_ready(this: &TechBridge);

    #[wasm_bindgen(method, js_name = setPoster)]
    fn set_poster(this: &TechBridge, url: &str);
}

pub struct JsTechHost {
    bridge: TechBridge,
    element: web_sys::HtmlElement,
}

impl JsTechHost {
    pub fn new(bridge: TechBridge, element: web_sys::HtmlElement) -> Self {
        Self { bridge, element }
    }

    fn container(&self) -> Option<web_sys::Element> {
        let parent = self.element.parent_element();
        if parent.is_none() {
            web_sys::console::warn_1(&"[Kino Vimeo] Tech element is not attached".into());
        }
        parent
    }
}

impl TechHost for JsTechHost {
    fn trigger(&self, event: TechEvent) {
        self.bridge.trigger(event.as_str());
    }

    fn trigger_ready(&self) {
        self.bridge.trigger_ready();
    }

    fn set_poster(&self, url: &str) {
        self.bridge.set_poster(url);
    }

    fn add_container_class(&self, class: &str) {
        if let Some(container) = self.container() {
            if let Err(err) = container.class_list().add_1(class) {
                web_sys::console::warn_2(&format!("[Kino Vimeo] Could not update class {class}").into(), &err);
            }
        }
    }

    fn remove_container_class(&self, class: &str) {
        if let Some(container) = self.element.parent_element() {
            if let Err(err) = container.class_list().remove_1(class) {
                web_sys::console::warn_2(&format!("[Kino Vimeo] Could not update class {class}").into(), &err);
            }
        }
    }

    fn remove_element(&self) {
        self.element.remove();
    }
}
