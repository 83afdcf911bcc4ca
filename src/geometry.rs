//! Read-only geometry inputs from the host page.

/// Window scroll offset and inner size, in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub scroll_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Document-space y of the viewport's vertical centre.
    pub fn center_y(&self) -> f64 {
        self.scroll_y + self.height / 2.0
    }
}

/// A section's bounding box relative to the viewport top, plus its layout
/// height (`offsetHeight`).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SectionRect {
    pub top: f64,
    pub bottom: f64,
    pub height: f64,
}

impl SectionRect {
    pub fn intersects(&self, viewport: &Viewport) -> bool {
        self.top < viewport.height && self.bottom > 0.0
    }

    /// Document-space y of the section's vertical centre.
    pub fn center_y(&self, viewport: &Viewport) -> f64 {
        self.top + viewport.scroll_y + self.height / 2.0
    }
}
