//! Application lifecycle: starts each effect in isolation, exactly once.

use crate::error::EffectError;

/// An independently started visual effect.
pub trait Effect {
    fn name(&self) -> &'static str;

    /// Wires the effect into the page. Missing optional elements are not an
    /// error; return `Ok` and do nothing.
    fn start(&mut self) -> Result<(), EffectError>;

    /// Detaches listeners and cancels pending frames.
    fn stop(&mut self);
}

/// What happened during [`App::start`].
#[derive(Debug, Default)]
pub struct StartReport {
    pub started: Vec<&'static str>,
    pub failed: Vec<(&'static str, EffectError)>,
    /// `start` had already run; nothing was done.
    pub already_initialized: bool,
}

type ReadyHook = Box<dyn FnOnce()>;

/// Owns the effects and the initialized flag.
pub struct App {
    effects: Vec<Box<dyn Effect>>,
    running: Vec<bool>,
    initialized: bool,
    on_ready: Option<ReadyHook>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            effects: Vec::new(),
            running: Vec::new(),
            initialized: false,
            on_ready: None,
        }
    }

    pub fn register(&mut self, effect: Box<dyn Effect>) -> &mut Self {
        self.effects.push(effect);
        self.running.push(false);
        self
    }

    /// Runs once, after every effect has been started, on the first
    /// [`start`](Self::start).
    pub fn on_ready(&mut self, hook: impl FnOnce() + 'static) -> &mut Self {
        self.on_ready = Some(Box::new(hook));
        self
    }

    /// Starts every registered effect. A failing effect is logged and
    /// skipped; its siblings still start. Calling this twice is a no-op.
    pub fn start(&mut self) -> StartReport {
        if self.initialized {
            return StartReport {
                already_initialized: true,
                ..StartReport::default()
            };
        }
        self.initialized = true;

        let mut report = StartReport::default();
        for (effect, running) in self.effects.iter_mut().zip(self.running.iter_mut()) {
            match effect.start() {
                Ok(()) => {
                    *running = true;
                    report.started.push(effect.name());
                }
                Err(e) => {
                    log::error!("effect {} failed to start: {}", effect.name(), e);
                    report.failed.push((effect.name(), e));
                }
            }
        }
        if let Some(hook) = self.on_ready.take() {
            hook();
        }
        log::info!(
            "effects started: {} ok, {} failed",
            report.started.len(),
            report.failed.len()
        );
        report
    }

    /// Stops started effects in reverse order. A later `start` runs again.
    pub fn stop(&mut self) {
        for (effect, running) in self
            .effects
            .iter_mut()
            .zip(self.running.iter_mut())
            .rev()
        {
            if *running {
                effect.stop();
                *running = false;
            }
        }
        self.initialized = false;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}
