//! Ambient particle field.
//!
//! Particles are plain records stored in a fixed-capacity arena owned by
//! [`ParticleField`]. Reinitialization overwrites the arena in place; the
//! backing storage is allocated once, sized for the larger of the two tiers.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ParticleConfig;
use crate::error::EffectError;
use crate::frame::{FrameHandle, FrameScheduler};
use crate::surface::{Rgba, Surface};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub vx: f64,
    pub vy: f64,
    pub alpha: f64,
}

/// Extent particles wrap within: `[0, width) x [0, height)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn of(surface: &impl Surface) -> Self {
        let (w, h) = surface.size();
        Self {
            width: f64::from(w),
            height: f64::from(h),
        }
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..self.width).contains(&x) && (0.0..self.height).contains(&y)
    }
}

/// Particle count for a viewport: the mobile tier below the breakpoint, the
/// desktop tier at or above it.
pub fn particle_count(viewport_width: f64, config: &ParticleConfig) -> usize {
    if viewport_width < config.mobile_breakpoint {
        config.mobile_count
    } else {
        config.desktop_count
    }
}

/// Moves `p` by its velocity and wraps it back into `bounds` on each axis.
pub fn advance(p: &mut Particle, bounds: Bounds) {
    p.x = wrap(p.x + p.vx, bounds.width);
    p.y = wrap(p.y + p.vy, bounds.height);
}

/// Paints `p` as a filled circle in `color` at the particle's own opacity.
pub fn paint(p: &Particle, surface: &mut impl Surface, color: [u8; 3]) {
    surface.fill_circle(p.x, p.y, p.radius, Rgba::from_rgb(color, p.alpha));
}

fn wrap(v: f64, extent: f64) -> f64 {
    if extent.is_nan() || extent <= 0.0 || !v.is_finite() {
        return 0.0;
    }
    let w = v.rem_euclid(extent);
    // rem_euclid rounds tiny negatives up to `extent` itself
    if w >= extent {
        0.0
    } else {
        w
    }
}

fn sample(rng: &mut StdRng, [lo, hi]: [f64; 2]) -> f64 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

pub struct ParticleField {
    arena: Box<[Particle]>,
    live: usize,
    bounds: Bounds,
    generation: u64,
    rng: StdRng,
    config: ParticleConfig,
}

impl ParticleField {
    pub fn new(config: ParticleConfig, seed: u64) -> Self {
        let capacity = config.capacity();
        Self {
            arena: vec![Particle::default(); capacity].into_boxed_slice(),
            live: 0,
            bounds: Bounds::default(),
            generation: 0,
            rng: StdRng::seed_from_u64(seed),
            config,
        }
    }

    /// Sizes `surface` to its container and regenerates the particle set from
    /// scratch for the given viewport width.
    pub fn initialize(&mut self, surface: &mut impl Surface, viewport_width: f64) {
        if let Some((w, h)) = surface.container_size() {
            surface.resize(w, h);
        }
        self.bounds = Bounds::of(&*surface);
        self.live = particle_count(viewport_width, &self.config).min(self.arena.len());

        let Bounds { width, height } = self.bounds;
        let speed = self.config.speed;
        for slot in &mut self.arena[..self.live] {
            *slot = Particle {
                x: sample(&mut self.rng, [0.0, width]),
                y: sample(&mut self.rng, [0.0, height]),
                radius: sample(&mut self.rng, self.config.radius),
                vx: sample(&mut self.rng, [-speed, speed]),
                vy: sample(&mut self.rng, [-speed, speed]),
                alpha: sample(&mut self.rng, self.config.alpha),
            };
        }
        self.generation += 1;
    }

    /// Clears the surface, then advances and paints every live particle.
    pub fn tick(&mut self, surface: &mut impl Surface) {
        surface.clear();
        let bounds = self.bounds;
        let color = self.config.color;
        for p in &mut self.arena[..self.live] {
            advance(p, bounds);
            paint(p, surface, color);
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.arena[..self.live]
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Number of times the set has been regenerated.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn capacity(&self) -> usize {
        self.arena.len()
    }
}

/// Drives a [`ParticleField`] once per frame through a [`FrameScheduler`].
///
/// At most one frame request is outstanding: [`restart`](Self::restart)
/// cancels the pending request before scheduling a new one, so repeated
/// resizes never stack render loops.
pub struct ParticleLoop<S, F> {
    field: ParticleField,
    surface: S,
    scheduler: F,
    pending: Option<FrameHandle>,
}

impl<S: Surface, F: FrameScheduler> ParticleLoop<S, F> {
    pub fn new(field: ParticleField, surface: S, scheduler: F) -> Self {
        Self {
            field,
            surface,
            scheduler,
            pending: None,
        }
    }

    /// Full reinitialization: cancel, resize, regenerate, render, reschedule.
    pub fn restart(&mut self, viewport_width: f64) -> Result<(), EffectError> {
        self.stop();
        self.field.initialize(&mut self.surface, viewport_width);
        log::debug!(
            "particle field regenerated: {} particles on {:?}",
            self.field.particles().len(),
            self.surface.size()
        );
        self.frame()
    }

    /// One animation frame. Called by the scheduler's callback.
    pub fn frame(&mut self) -> Result<(), EffectError> {
        self.pending = None;
        self.field.tick(&mut self.surface);
        self.pending = Some(self.scheduler.request_frame()?);
        Ok(())
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::testing::FakeScheduler;
    use crate::surface::testing::RecordingSurface;

    fn config() -> ParticleConfig {
        ParticleConfig {
            seed: Some(7),
            ..ParticleConfig::default()
        }
    }

    #[test]
    fn count_follows_breakpoint() {
        let c = config();
        assert_eq!(particle_count(320.0, &c), 25);
        assert_eq!(particle_count(767.9, &c), 25);
        assert_eq!(particle_count(768.0, &c), 50);
        assert_eq!(particle_count(1920.0, &c), 50);
    }

    #[test]
    fn initialize_sizes_surface_to_container() {
        let mut surface = RecordingSurface::in_container(640, 360);
        let mut field = ParticleField::new(config(), 1);
        field.initialize(&mut surface, 1024.0);

        assert_eq!(surface.size(), (640, 360));
        assert_eq!(field.particles().len(), 50);
        let b = field.bounds();
        for p in field.particles() {
            assert!(b.contains(p.x, p.y));
            assert!((0.5..2.0).contains(&p.radius));
            assert!((-0.15..0.15).contains(&p.vx));
            assert!((-0.15..0.15).contains(&p.vy));
            assert!((0.1..0.4).contains(&p.alpha));
        }
    }

    #[test]
    fn unknown_container_keeps_current_size() {
        let mut surface = RecordingSurface {
            width: 100,
            height: 50,
            ..RecordingSurface::default()
        };
        let mut field = ParticleField::new(config(), 1);
        field.initialize(&mut surface, 400.0);
        assert_eq!(surface.size(), (100, 50));
        assert_eq!(field.particles().len(), 25);
    }

    #[test]
    fn particles_stay_in_bounds_over_many_ticks() {
        let mut surface = RecordingSurface::in_container(200, 120);
        let mut field = ParticleField::new(config(), 42);
        field.initialize(&mut surface, 1280.0);
        let b = field.bounds();
        for _ in 0..10_000 {
            field.tick(&mut surface);
            assert!(field.particles().iter().all(|p| b.contains(p.x, p.y)));
        }
        assert_eq!(surface.circles.len(), 50);
    }

    #[test]
    fn advance_wraps_to_opposite_edge() {
        let bounds = Bounds {
            width: 100.0,
            height: 50.0,
        };
        let mut p = Particle {
            x: 99.9,
            y: 0.05,
            vx: 0.2,
            vy: -0.1,
            ..Particle::default()
        };
        advance(&mut p, bounds);
        assert!(p.x < 1.0, "x wrapped to left edge, got {}", p.x);
        assert!(p.y > 49.0, "y wrapped to bottom edge, got {}", p.y);
        assert!(bounds.contains(p.x, p.y));
    }

    #[test]
    fn advance_handles_tiny_negative_and_exact_edge() {
        let bounds = Bounds {
            width: 100.0,
            height: 100.0,
        };
        let mut p = Particle {
            x: 0.0,
            y: 99.0,
            vx: -1e-18,
            vy: 1.0,
            ..Particle::default()
        };
        advance(&mut p, bounds);
        assert!(bounds.contains(p.x, p.y), "({}, {})", p.x, p.y);
        assert_eq!(p.y, 0.0);
    }

    #[test]
    fn zero_sized_surface_pins_particles() {
        let mut surface = RecordingSurface::in_container(0, 0);
        let mut field = ParticleField::new(config(), 3);
        field.initialize(&mut surface, 1000.0);
        field.tick(&mut surface);
        assert!(field.particles().iter().all(|p| p.x == 0.0 && p.y == 0.0));
    }

    #[test]
    fn paint_uses_particle_alpha() {
        let mut surface = RecordingSurface::default();
        let p = Particle {
            x: 3.0,
            y: 4.0,
            radius: 1.5,
            alpha: 0.2,
            ..Particle::default()
        };
        paint(&p, &mut surface, [0, 168, 225]);
        assert_eq!(surface.circles, vec![(3.0, 4.0, 1.5, Rgba::from_rgb([0, 168, 225], 0.2))]);
    }

    #[test]
    fn arena_is_reused_across_reinit() {
        let mut surface = RecordingSurface::in_container(300, 300);
        let mut field = ParticleField::new(config(), 9);
        field.initialize(&mut surface, 1200.0);
        let before = field.particles().as_ptr();
        let first: Vec<Particle> = field.particles().to_vec();

        field.initialize(&mut surface, 500.0);
        assert_eq!(field.particles().as_ptr(), before);
        assert_eq!(field.capacity(), 50);
        assert_eq!(field.particles().len(), 25);
        assert_ne!(field.particles(), &first[..25]);
        assert_eq!(field.generation(), 2);
    }

    #[test]
    fn resize_regenerates_once_and_keeps_one_loop() {
        let field = ParticleField::new(config(), 11);
        let surface = RecordingSurface::in_container(800, 600);
        let mut particle_loop = ParticleLoop::new(field, surface, FakeScheduler::default());

        particle_loop.restart(1024.0).unwrap();
        assert_eq!(particle_loop.field().generation(), 1);
        assert_eq!(particle_loop.scheduler().active.len(), 1);

        for (i, width) in [900.0, 700.0, 1300.0].into_iter().enumerate() {
            particle_loop.restart(width).unwrap();
            assert_eq!(particle_loop.field().generation(), i as u64 + 2);
            assert_eq!(particle_loop.scheduler().active.len(), 1);
        }
        assert_eq!(particle_loop.scheduler().cancelled, 3);
        assert!(particle_loop.is_running());
    }

    #[test]
    fn frame_reschedules_itself() {
        let field = ParticleField::new(config(), 5);
        let surface = RecordingSurface::in_container(100, 100);
        let mut particle_loop = ParticleLoop::new(field, surface, FakeScheduler::default());
        particle_loop.restart(1024.0).unwrap();

        for _ in 0..5 {
            assert!(particle_loop.scheduler.fire().is_some());
            particle_loop.frame().unwrap();
            assert_eq!(particle_loop.scheduler().active.len(), 1);
        }
        assert_eq!(particle_loop.surface().clears, 6);
    }

    #[test]
    fn stop_cancels_pending_frame() {
        let field = ParticleField::new(config(), 5);
        let surface = RecordingSurface::in_container(100, 100);
        let mut particle_loop = ParticleLoop::new(field, surface, FakeScheduler::default());
        particle_loop.restart(1024.0).unwrap();
        particle_loop.stop();
        assert!(!particle_loop.is_running());
        assert!(particle_loop.scheduler().active.is_empty());
    }
}
