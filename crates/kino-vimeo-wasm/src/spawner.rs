use kino_vimeo::{LocalTask, Spawner};
use std::time::Duration;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

/// Runs tasks on the browser microtask queue, sleeps via `setTimeout`
#[derive(Debug, Default, Clone, Copy)]
pub struct WasmSpawner;

impl Spawner for WasmSpawner {
    fn spawn(&self, task: LocalTask) {
        wasm_bindgen_futures::spawn_local(task);
    }

    fn sleep(&self, duration: Duration) -> LocalTask {
        let millis = duration.as_millis().min(i32::MAX as u128) as i32;
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            let scheduled = web_sys::window().map(|window| {
                window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis)
            });
            // Without a timer the sleep resolves at once rather than hanging
            if !matches!(scheduled, Some(Ok(_))) {
                web_sys::console::warn_1(&"[Kino Vimeo] setTimeout unavailable, not delaying".into());
                let _ = resolve.call0(&JsValue::NULL);
            }
        });

        Box::pin(async move {
            let _ = JsFuture::from(promise).await;
        })
    }
}
