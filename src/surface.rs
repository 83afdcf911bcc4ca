//! The drawing surface the particle field paints on.

/// An RGBA fill colour with `alpha` in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f64,
}

impl Rgba {
    pub fn from_rgb([r, g, b]: [u8; 3], alpha: f64) -> Self {
        Self { r, g, b, alpha }
    }

    /// CSS `rgba()` notation.
    pub fn to_css(&self) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, self.alpha)
    }
}

/// A resizable 2D raster surface. The particle field is its only writer.
pub trait Surface {
    /// Current pixel size.
    fn size(&self) -> (u32, u32);

    /// Size of the element the surface should fill, if it has one.
    fn container_size(&self) -> Option<(u32, u32)>;

    fn resize(&mut self, width: u32, height: u32);

    fn clear(&mut self);

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgba);
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// In-memory surface that counts draw calls.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub width: u32,
        pub height: u32,
        pub container: Option<(u32, u32)>,
        pub clears: usize,
        pub circles: Vec<(f64, f64, f64, Rgba)>,
    }

    impl RecordingSurface {
        pub fn in_container(width: u32, height: u32) -> Self {
            Self {
                container: Some((width, height)),
                ..Self::default()
            }
        }
    }

    impl Surface for RecordingSurface {
        fn size(&self) -> (u32, u32) {
            (self.width, self.height)
        }

        fn container_size(&self) -> Option<(u32, u32)> {
            self.container
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.width = width;
            self.height = height;
        }

        fn clear(&mut self) {
            self.clears += 1;
            self.circles.clear();
        }

        fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgba) {
            self.circles.push((x, y, radius, color));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_notation() {
        let c = Rgba::from_rgb([0, 168, 225], 0.25);
        assert_eq!(c.to_css(), "rgba(0,168,225,0.25)");
    }
}
