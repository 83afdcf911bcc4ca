//! Scroll-linked page effects: background parallax, ambient canvas particles
//! and on-scroll reveal animations.
//!
//! The effect logic is plain Rust behind small host traits so it can be
//! exercised with `cargo test`; the `wasm` module binds it to the browser.

pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod lifecycle;
pub mod parallax;
pub mod particles;
pub mod reveal;
pub mod surface;

pub use config::EffectsConfig;
pub use error::{ConfigError, EffectError};
pub use lifecycle::{App, Effect, StartReport};

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use std::cell::RefCell;

    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    use crate::config::EffectsConfig;
    use crate::lifecycle::App;

    mod dom;
    mod observer;
    mod render;

    pub use dom::{DomLayerHost, ParallaxEffect};
    pub use observer::{DomRevealHost, RevealEffect};
    pub use render::{CanvasSurface, ParticleEffect, RafScheduler};

    thread_local! {
        static APP: RefCell<Option<App>> = RefCell::new(None);
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Trace).ok();
        let config = EffectsConfig::embedded();
        log::set_max_level(config.log_level().to_level_filter());

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        if document.ready_state() == "loading" {
            let on_ready = Closure::once_into_js(move || boot(config));
            document.add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())?;
        } else {
            boot(config);
        }
        Ok(())
    }

    /// Tears down every running effect. A later page-level `boot` restarts them.
    #[wasm_bindgen]
    pub fn stop_effects() {
        APP.with(|slot| {
            if let Some(app) = slot.borrow_mut().as_mut() {
                app.stop();
            }
        });
    }

    fn boot(config: EffectsConfig) {
        log::info!("syncing visual effects");
        APP.with(|slot| {
            let mut slot = slot.borrow_mut();
            let app = slot.get_or_insert_with(|| build_app(&config));
            if app.start().already_initialized {
                log::debug!("effects already initialized, ignoring second boot");
            }
        });
    }

    fn build_app(config: &EffectsConfig) -> App {
        let seed = config
            .particles
            .seed
            .unwrap_or_else(|| (js_sys::Math::random() * u64::MAX as f64) as u64);

        let mut app = App::new();
        app.register(Box::new(ParallaxEffect::new(&config.parallax.layers)))
            .register(Box::new(ParticleEffect::new(config.particles.clone(), seed)))
            .register(Box::new(RevealEffect::new(config.reveal.clone())))
            .on_ready(start_reactivity);
        app
    }

    /// Starts the page's declarative reactivity library (`window.Alpine`), if
    /// the page loaded it.
    fn start_reactivity() {
        let Some(window) = web_sys::window() else {
            return;
        };
        let alpine = js_sys::Reflect::get(&window, &JsValue::from_str("Alpine"))
            .unwrap_or(JsValue::UNDEFINED);
        if alpine.is_undefined() || alpine.is_null() {
            log::debug!("window.Alpine not present, skipping reactivity start");
            return;
        }
        let start = js_sys::Reflect::get(&alpine, &JsValue::from_str("start"))
            .ok()
            .and_then(|f| f.dyn_into::<js_sys::Function>().ok());
        match start {
            Some(start) => {
                if let Err(e) = start.call0(&alpine) {
                    log::error!("Alpine.start failed: {:?}", e);
                }
            }
            None => log::warn!("window.Alpine has no start()"),
        }
    }
}
