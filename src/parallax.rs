//! Scroll-linked background parallax.
//!
//! Each layer is translated by the distance between the viewport centre and
//! the centre of the layer's section, scaled by the layer's factor. Scroll and
//! resize events only mark a pass as wanted; the pass itself runs once per
//! animation frame.

use crate::config::LayerConfig;
use crate::frame::FrameGate;
use crate::geometry::{SectionRect, Viewport};

#[derive(Clone, Debug, PartialEq)]
pub struct ParallaxLayer {
    /// Element id of the background being moved.
    pub id: String,
    pub factor: f64,
}

impl From<&LayerConfig> for ParallaxLayer {
    fn from(config: &LayerConfig) -> Self {
        Self {
            id: config.id.clone(),
            factor: config.factor,
        }
    }
}

/// Geometry reads and transform writes for the layers, addressed by index.
pub trait LayerHost {
    fn viewport(&self) -> Viewport;

    /// Bounds of the section containing layer `index`, or `None` when the
    /// layer is not on this page.
    fn section_rect(&self, index: usize) -> Option<SectionRect>;

    fn apply_offset(&mut self, index: usize, offset_px: f64);
}

/// Vertical offset for a layer, or `None` if its section is off-screen.
pub fn layer_offset(rect: &SectionRect, viewport: &Viewport, factor: f64) -> Option<f64> {
    if !rect.intersects(viewport) {
        return None;
    }
    Some((viewport.center_y() - rect.center_y(viewport)) * factor)
}

/// CSS transform for a vertical offset.
pub fn translate3d(offset_px: f64) -> String {
    format!("translate3d(0, {}px, 0)", offset_px)
}

/// Outcome of one geometry pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParallaxPass {
    pub applied: usize,
    pub offscreen: usize,
    pub missing: usize,
}

pub struct ParallaxDriver {
    layers: Vec<ParallaxLayer>,
    gate: FrameGate,
}

impl ParallaxDriver {
    pub fn new(layers: Vec<ParallaxLayer>) -> Self {
        Self {
            layers,
            gate: FrameGate::new(),
        }
    }

    pub fn from_config(layers: &[LayerConfig]) -> Self {
        Self::new(layers.iter().map(ParallaxLayer::from).collect())
    }

    pub fn layers(&self) -> &[ParallaxLayer] {
        &self.layers
    }

    /// Registers a scroll or resize event. Returns `true` when the caller
    /// must request an animation frame for [`update`](Self::update).
    pub fn schedule(&mut self) -> bool {
        self.gate.request()
    }

    /// Recomputes every visible layer. Off-screen layers keep their last
    /// transform.
    pub fn update(&mut self, host: &mut impl LayerHost) -> ParallaxPass {
        self.gate.begin_pass();
        let viewport = host.viewport();
        let mut pass = ParallaxPass::default();
        for (index, layer) in self.layers.iter().enumerate() {
            let Some(rect) = host.section_rect(index) else {
                pass.missing += 1;
                continue;
            };
            match layer_offset(&rect, &viewport, layer.factor) {
                Some(offset) => {
                    host.apply_offset(index, offset);
                    pass.applied += 1;
                }
                None => pass.offscreen += 1,
            }
        }
        pass
    }
}
