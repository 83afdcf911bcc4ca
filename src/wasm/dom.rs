use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{window, AddEventListenerOptions, Document, HtmlElement, Window};

use crate::config::LayerConfig;
use crate::error::EffectError;
use crate::geometry::{SectionRect, Viewport};
use crate::lifecycle::Effect;
use crate::parallax::{translate3d, LayerHost, ParallaxDriver, ParallaxLayer};

/// Scroll offset and inner size; unreadable values read as 0.
pub(crate) fn read_viewport(window: &Window) -> Viewport {
    let dimension = |v: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
    };
    Viewport {
        scroll_y: window.scroll_y().unwrap_or(0.0),
        width: dimension(window.inner_width()),
        height: dimension(window.inner_height()),
    }
}

struct ResolvedLayer {
    background: HtmlElement,
    section: HtmlElement,
}

/// Parallax backgrounds resolved once against the document. A layer whose
/// element (or parent section) is missing stays `None` and is skipped.
pub struct DomLayerHost {
    window: Window,
    layers: Vec<Option<ResolvedLayer>>,
}

impl DomLayerHost {
    pub fn resolve(window: Window, document: &Document, layers: &[ParallaxLayer]) -> Self {
        let layers = layers
            .iter()
            .map(|layer| {
                let background = document
                    .get_element_by_id(&layer.id)?
                    .dyn_into::<HtmlElement>()
                    .ok()?;
                let section = background.parent_element()?.dyn_into::<HtmlElement>().ok()?;
                Some(ResolvedLayer {
                    background,
                    section,
                })
            })
            .collect();
        Self { window, layers }
    }

    pub fn resolved(&self) -> usize {
        self.layers.iter().flatten().count()
    }
}

impl LayerHost for DomLayerHost {
    fn viewport(&self) -> Viewport {
        read_viewport(&self.window)
    }

    fn section_rect(&self, index: usize) -> Option<SectionRect> {
        let layer = self.layers.get(index)?.as_ref()?;
        let rect = layer.section.get_bounding_client_rect();
        Some(SectionRect {
            top: rect.top(),
            bottom: rect.bottom(),
            height: f64::from(layer.section.offset_height()),
        })
    }

    fn apply_offset(&mut self, index: usize, offset_px: f64) {
        let Some(Some(layer)) = self.layers.get(index) else {
            return;
        };
        if let Err(e) = layer
            .background
            .style()
            .set_property("transform", &translate3d(offset_px))
        {
            log::debug!("parallax transform rejected: {:?}", e);
        }
    }
}

/// Window events that trigger a parallax pass.
const EVENTS: [&str; 2] = ["scroll", "resize"];

fn remove_listeners(window: &Window, listener: &Closure<dyn FnMut()>) {
    for event in EVENTS {
        let _ = window.remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref());
    }
}

struct Shared {
    driver: ParallaxDriver,
    host: DomLayerHost,
    pending_frame: Option<i32>,
}

struct Running {
    window: Window,
    shared: Rc<RefCell<Shared>>,
    // Kept alive for the pending rAF request; never called after `stop`.
    _update: Rc<Closure<dyn FnMut(f64)>>,
    on_event: Closure<dyn FnMut()>,
}

/// Moves background layers at a fraction of scroll speed.
pub struct ParallaxEffect {
    layers: Vec<ParallaxLayer>,
    running: Option<Running>,
}

impl ParallaxEffect {
    pub fn new(layers: &[LayerConfig]) -> Self {
        Self {
            layers: layers.iter().map(ParallaxLayer::from).collect(),
            running: None,
        }
    }
}

impl Effect for ParallaxEffect {
    fn name(&self) -> &'static str {
        "parallax"
    }

    fn start(&mut self) -> Result<(), EffectError> {
        let window = window().ok_or(EffectError::Unsupported("window"))?;
        let document = window
            .document()
            .ok_or(EffectError::Unsupported("document"))?;

        let host = DomLayerHost::resolve(window.clone(), &document, &self.layers);
        if host.resolved() == 0 {
            log::debug!("no parallax layers on this page");
            return Ok(());
        }
        let shared = Rc::new(RefCell::new(Shared {
            driver: ParallaxDriver::new(self.layers.clone()),
            host,
            pending_frame: None,
        }));

        let pass_state = shared.clone();
        let update = Rc::new(Closure::wrap(Box::new(move |_timestamp: f64| {
            let mut state = pass_state.borrow_mut();
            let Shared {
                driver,
                host,
                pending_frame,
            } = &mut *state;
            *pending_frame = None;
            driver.update(host);
        }) as Box<dyn FnMut(f64)>));

        let event_state = shared.clone();
        let event_update = update.clone();
        let event_window = window.clone();
        let on_event = Closure::wrap(Box::new(move || {
            let mut state = event_state.borrow_mut();
            if !state.driver.schedule() {
                return;
            }
            match event_window.request_animation_frame((*event_update).as_ref().unchecked_ref()) {
                Ok(id) => state.pending_frame = Some(id),
                Err(e) => log::error!("parallax frame request failed: {:?}", e),
            }
        }) as Box<dyn FnMut()>);

        let options = AddEventListenerOptions::new();
        options.set_passive(true);
        for event in EVENTS {
            if let Err(e) = window.add_event_listener_with_callback_and_add_event_listener_options(
                event,
                on_event.as_ref().unchecked_ref(),
                &options,
            ) {
                remove_listeners(&window, &on_event);
                return Err(e.into());
            }
        }

        {
            let mut state = shared.borrow_mut();
            let Shared { driver, host, .. } = &mut *state;
            let pass = driver.update(host);
            log::debug!("parallax initial pass: {:?}", pass);
        }

        self.running = Some(Running {
            window,
            shared,
            _update: update,
            on_event,
        });
        Ok(())
    }

    fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        remove_listeners(&running.window, &running.on_event);
        if let Some(id) = running.shared.borrow_mut().pending_frame.take() {
            let _ = running.window.cancel_animation_frame(id);
        };
    }
}
