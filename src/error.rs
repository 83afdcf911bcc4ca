//! Error types shared by the effect modules.

use thiserror::Error;

/// Problems found while loading or validating [`EffectsConfig`].
///
/// [`EffectsConfig`]: crate::config::EffectsConfig
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document did not parse or did not match the schema.
    #[error("failed to parse effects config: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value parsed but is outside its allowed range.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending key.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Why an effect failed to start.
#[derive(Debug, Error)]
pub enum EffectError {
    /// A host capability the effect cannot work without is missing.
    #[error("{0} is not available in this environment")]
    Unsupported(&'static str),

    /// A browser API call threw.
    #[error("javascript error: {0}")]
    Js(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for EffectError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        EffectError::Js(format!("{:?}", value))
    }
}
