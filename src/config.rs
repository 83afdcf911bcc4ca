//! Effect configuration, loaded once at startup from TOML.

use serde::Deserialize;

use crate::error::ConfigError;

/// The configuration shipped with the site, compiled into the module.
const EMBEDDED: &str = include_str!("../static/effects.toml");

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct EffectsConfig {
    pub logging: LoggingConfig,
    pub particles: ParticleConfig,
    pub parallax: ParallaxConfig,
    pub reveal: RevealConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Any `log::Level` name, case-insensitive.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParticleConfig {
    pub canvas_id: String,
    /// Viewports narrower than this (logical px) use `mobile_count`.
    pub mobile_breakpoint: f64,
    pub mobile_count: usize,
    pub desktop_count: usize,
    /// Half-open `[min, max)` range for particle radius.
    pub radius: [f64; 2],
    /// Per-axis velocity is drawn from `[-speed, speed)` px/frame.
    pub speed: f64,
    pub alpha: [f64; 2],
    pub color: [u8; 3],
    /// Fixed RNG seed; the browser entry point seeds from the clock when unset.
    pub seed: Option<u64>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            canvas_id: "particle-canvas".to_string(),
            mobile_breakpoint: 768.0,
            mobile_count: 25,
            desktop_count: 50,
            radius: [0.5, 2.0],
            speed: 0.15,
            alpha: [0.1, 0.4],
            color: [0, 168, 225],
            seed: None,
        }
    }
}

impl ParticleConfig {
    /// Number of particle slots the field needs to cover both tiers.
    pub fn capacity(&self) -> usize {
        self.mobile_count.max(self.desktop_count)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LayerConfig {
    pub id: String,
    pub factor: f64,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParallaxConfig {
    pub layers: Vec<LayerConfig>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RevealConfig {
    pub selectors: Vec<String>,
    /// Minimum visible fraction that triggers the reveal.
    pub threshold: f64,
    /// CSS margin applied to the viewport before intersecting.
    pub root_margin: String,
    /// Animation class added on reveal.
    pub class: String,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            selectors: vec![".reveal-on-scroll".to_string()],
            threshold: 0.1,
            root_margin: "0px 0px -50px 0px".to_string(),
            class: "animate-fade-in-up".to_string(),
        }
    }
}

impl EffectsConfig {
    /// Parses and validates a TOML document. Missing sections take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: EffectsConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// The configuration embedded from `static/effects.toml`.
    ///
    /// Falls back to [`EffectsConfig::default`] if the embedded file is
    /// broken, so a bad edit degrades the effects instead of disabling them.
    pub fn embedded() -> Self {
        match Self::from_toml_str(EMBEDDED) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("embedded effects config rejected, using defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn log_level(&self) -> log::Level {
        self.logging.level.parse().unwrap_or(log::Level::Info)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.particles;
        if !(p.mobile_breakpoint.is_finite() && p.mobile_breakpoint >= 0.0) {
            return Err(invalid("particles.mobile_breakpoint", "must be a finite, non-negative width"));
        }
        if p.capacity() == 0 {
            return Err(invalid("particles", "mobile_count and desktop_count are both zero"));
        }
        check_range("particles.radius", p.radius, 0.0)?;
        check_range("particles.alpha", p.alpha, 0.0)?;
        if p.alpha[1] > 1.0 {
            return Err(invalid("particles.alpha", "upper bound exceeds 1.0"));
        }
        if !(p.speed.is_finite() && p.speed >= 0.0) {
            return Err(invalid("particles.speed", "must be finite and non-negative"));
        }

        for layer in &self.parallax.layers {
            if layer.id.is_empty() {
                return Err(invalid("parallax.layers.id", "must not be empty"));
            }
            if !layer.factor.is_finite() {
                return Err(ConfigError::Invalid {
                    field: "parallax.layers.factor",
                    reason: format!("layer {:?} has non-finite factor", layer.id),
                });
            }
        }

        let t = self.reveal.threshold;
        if !(0.0..=1.0).contains(&t) {
            return Err(ConfigError::Invalid {
                field: "reveal.threshold",
                reason: format!("{} is outside [0, 1]", t),
            });
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

fn check_range(field: &'static str, range: [f64; 2], floor: f64) -> Result<(), ConfigError> {
    let [lo, hi] = range;
    if !(lo.is_finite() && hi.is_finite()) || lo < floor || lo > hi {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("[{}, {}] is not an ordered range above {}", lo, hi, floor),
        });
    }
    Ok(())
}
