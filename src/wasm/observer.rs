use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, Document, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, Window,
};

use crate::config::RevealConfig;
use crate::error::EffectError;
use crate::lifecycle::Effect;
use crate::reveal::{RevealAnimator, RevealHost, Visibility};

/// Attribute carrying a target's index back from observer entries.
const INDEX_ATTR: &str = "data-reveal-index";

type EntriesClosure = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

/// Elements matched by the reveal selectors, styled inline.
pub struct DomRevealHost {
    elements: Vec<HtmlElement>,
    class: String,
    observer: Option<IntersectionObserver>,
}

impl DomRevealHost {
    /// Collects every element matching `selectors`, in selector order, and
    /// tags each with its index.
    pub fn collect(document: &Document, selectors: &[String], class: &str) -> Self {
        let mut elements = Vec::new();
        for selector in selectors {
            let list = match document.query_selector_all(selector) {
                Ok(list) => list,
                Err(e) => {
                    log::warn!("bad reveal selector {:?}: {:?}", selector, e);
                    continue;
                }
            };
            for i in 0..list.length() {
                let Some(element) = list.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
                    continue;
                };
                if elements.contains(&element) {
                    continue;
                }
                let _ = element.set_attribute(INDEX_ATTR, &elements.len().to_string());
                elements.push(element);
            }
        }
        Self {
            elements,
            class: class.to_string(),
            observer: None,
        }
    }

    pub fn elements(&self) -> &[HtmlElement] {
        &self.elements
    }

    fn set_opacity(&self, index: usize, value: &str) {
        if let Some(element) = self.elements.get(index) {
            let _ = element.style().set_property("opacity", value);
        }
    }
}

impl RevealHost for DomRevealHost {
    fn set_hidden(&mut self, index: usize) {
        self.set_opacity(index, "0");
    }

    fn set_revealed(&mut self, index: usize, animate: bool) {
        if animate {
            if let Some(element) = self.elements.get(index) {
                let _ = element.class_list().add_1(&self.class);
            }
        }
        self.set_opacity(index, "1");
    }

    fn stop_observing(&mut self, index: usize) {
        if let (Some(observer), Some(element)) = (&self.observer, self.elements.get(index)) {
            observer.unobserve(element);
        }
    }
}

fn observer_available(window: &Window) -> bool {
    js_sys::Reflect::has(window, &JsValue::from_str("IntersectionObserver")).unwrap_or(false)
}

struct Shared {
    animator: RevealAnimator,
    host: DomRevealHost,
}

struct Running {
    shared: Rc<RefCell<Shared>>,
    _on_entries: Option<EntriesClosure>,
}

/// Fades elements in the first time they scroll into view.
pub struct RevealEffect {
    config: RevealConfig,
    running: Option<Running>,
}

impl RevealEffect {
    pub fn new(config: RevealConfig) -> Self {
        Self {
            config,
            running: None,
        }
    }
}

impl Effect for RevealEffect {
    fn name(&self) -> &'static str {
        "reveal"
    }

    fn start(&mut self) -> Result<(), EffectError> {
        let window = window().ok_or(EffectError::Unsupported("window"))?;
        let document = window
            .document()
            .ok_or(EffectError::Unsupported("document"))?;

        let mut host = DomRevealHost::collect(&document, &self.config.selectors, &self.config.class);
        if host.elements().is_empty() {
            log::debug!("no reveal targets on this page");
            return Ok(());
        }
        let mut animator = RevealAnimator::new(self.config.threshold, host.elements().len());

        if !observer_available(&window) {
            log::warn!("IntersectionObserver unavailable, showing reveal targets immediately");
            animator.attach(&mut host, false);
            self.running = Some(Running {
                shared: Rc::new(RefCell::new(Shared { animator, host })),
                _on_entries: None,
            });
            return Ok(());
        }

        let shared = Rc::new(RefCell::new(Shared { animator, host }));
        let entry_state = Rc::downgrade(&shared);
        let on_entries = Closure::wrap(Box::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                let Some(state) = entry_state.upgrade() else {
                    return;
                };
                let mut state = state.borrow_mut();
                let Shared { animator, host } = &mut *state;
                for entry in entries.iter() {
                    let entry: IntersectionObserverEntry = entry.unchecked_into();
                    let Some(index) = entry
                        .target()
                        .get_attribute(INDEX_ATTR)
                        .and_then(|v| v.parse::<usize>().ok())
                    else {
                        continue;
                    };
                    let visibility = Visibility {
                        ratio: entry.intersection_ratio(),
                        intersecting: entry.is_intersecting(),
                    };
                    animator.on_visibility(index, visibility, host);
                }
            },
        ) as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(self.config.threshold));
        init.set_root_margin(&self.config.root_margin);
        let observer =
            IntersectionObserver::new_with_options(on_entries.as_ref().unchecked_ref(), &init)?;

        {
            let mut state = shared.borrow_mut();
            let Shared { animator, host } = &mut *state;
            host.observer = Some(observer.clone());
            animator.attach(host, true);
            for element in host.elements() {
                observer.observe(element);
            }
        }

        self.running = Some(Running {
            shared,
            _on_entries: Some(on_entries),
        });
        Ok(())
    }

    fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        if let Some(observer) = running.shared.borrow_mut().host.observer.take() {
            observer.disconnect();
        };
    }
}
