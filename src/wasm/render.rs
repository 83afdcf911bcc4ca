use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{window, CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, Window};

use super::dom::read_viewport;
use crate::config::ParticleConfig;
use crate::error::EffectError;
use crate::frame::{FrameHandle, FrameScheduler};
use crate::lifecycle::Effect;
use crate::particles::{ParticleField, ParticleLoop};
use crate::surface::{Rgba, Surface};

type FrameClosure = Closure<dyn FnMut(f64)>;
type FrameSlot = Rc<RefCell<Option<FrameClosure>>>;
type CanvasLoop = ParticleLoop<CanvasSurface, RafScheduler>;

/// A `<canvas>` with its 2D context, filling its parent element.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, EffectError> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or(EffectError::Unsupported("2d canvas context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| EffectError::Unsupported("2d canvas context"))?;
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn container_size(&self) -> Option<(u32, u32)> {
        let parent = self.canvas.parent_element()?;
        let parent = parent.dyn_ref::<HtmlElement>()?;
        Some((
            parent.offset_width().max(0) as u32,
            parent.offset_height().max(0) as u32,
        ))
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn clear(&mut self) {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, f64::from(w), f64::from(h));
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgba) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.begin_path();
        if self
            .ctx
            .arc(x, y, radius, 0.0, std::f64::consts::PI * 2.0)
            .is_ok()
        {
            self.ctx.fill();
        }
    }
}

/// `requestAnimationFrame` scheduling through a shared closure slot.
///
/// The slot is filled after construction, once the closure that drives the
/// loop exists; requesting a frame before that is an error.
pub struct RafScheduler {
    window: Window,
    callback: FrameSlot,
}

impl RafScheduler {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            callback: Rc::new(RefCell::new(None)),
        }
    }

    fn slot(&self) -> FrameSlot {
        self.callback.clone()
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) -> Result<FrameHandle, EffectError> {
        let slot = self.callback.borrow();
        let closure = slot
            .as_ref()
            .ok_or(EffectError::Unsupported("frame callback"))?;
        let id = self
            .window
            .request_animation_frame(closure.as_ref().unchecked_ref())?;
        Ok(FrameHandle(id))
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let _ = self.window.cancel_animation_frame(handle.0);
    }
}

struct Running {
    window: Window,
    particle_loop: Rc<RefCell<CanvasLoop>>,
    frame: FrameSlot,
    on_resize: Closure<dyn FnMut()>,
}

/// Ambient particles on the configured canvas. Regenerated on every resize.
pub struct ParticleEffect {
    config: ParticleConfig,
    seed: u64,
    running: Option<Running>,
}

impl ParticleEffect {
    pub fn new(config: ParticleConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            running: None,
        }
    }
}

impl Effect for ParticleEffect {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn start(&mut self) -> Result<(), EffectError> {
        let window = window().ok_or(EffectError::Unsupported("window"))?;
        let document = window
            .document()
            .ok_or(EffectError::Unsupported("document"))?;
        let Some(element) = document.get_element_by_id(&self.config.canvas_id) else {
            log::debug!("no #{} on this page, particles disabled", self.config.canvas_id);
            return Ok(());
        };
        let canvas = element
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| EffectError::Js(format!("#{} is not a canvas", self.config.canvas_id)))?;

        let surface = CanvasSurface::new(canvas)?;
        let scheduler = RafScheduler::new(window.clone());
        let frame = scheduler.slot();
        let field = ParticleField::new(self.config.clone(), self.seed);
        let particle_loop = Rc::new(RefCell::new(ParticleLoop::new(field, surface, scheduler)));

        // Weak handles: the loop owns the scheduler, which owns the closures.
        let weak = Rc::downgrade(&particle_loop);
        *frame.borrow_mut() = Some(Closure::wrap(Box::new(move |_timestamp: f64| {
            if let Some(particle_loop) = weak.upgrade() {
                if let Err(e) = particle_loop.borrow_mut().frame() {
                    log::error!("particle frame failed: {}", e);
                }
            }
        }) as Box<dyn FnMut(f64)>));

        let weak = Rc::downgrade(&particle_loop);
        let resize_window = window.clone();
        let on_resize = Closure::wrap(Box::new(move || {
            let Some(particle_loop) = weak.upgrade() else {
                return;
            };
            let width = read_viewport(&resize_window).width;
            if let Err(e) = particle_loop.borrow_mut().restart(width) {
                log::error!("particle field reinit failed: {}", e);
            };
        }) as Box<dyn FnMut()>);

        particle_loop
            .borrow_mut()
            .restart(read_viewport(&window).width)?;
        if let Err(e) =
            window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
        {
            particle_loop.borrow_mut().stop();
            return Err(e.into());
        }

        self.running = Some(Running {
            window,
            particle_loop,
            frame,
            on_resize,
        });
        Ok(())
    }

    fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        let _ = running
            .window
            .remove_event_listener_with_callback("resize", running.on_resize.as_ref().unchecked_ref());
        running.particle_loop.borrow_mut().stop();
        running.frame.borrow_mut().take();
    }
}
