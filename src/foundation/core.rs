pub use kurbo::{BezPath, Point, Rect, RoundedRect, Vec2};

/// Logical size of the drawing surface plus its device scale factor.
///
/// Width and height are the container's scrollable size in CSS-like logical pixels; the raster
/// backend multiplies them by `scale` to get device pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SurfaceSize {
    /// Logical width.
    pub width: f64,
    /// Logical height.
    pub height: f64,
    /// Device pixels per logical pixel.
    pub scale: f64,
}

impl SurfaceSize {
    /// Create a size with a scale factor of 1.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scale: 1.0,
        }
    }

    /// Return a copy with a different device scale factor.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Device pixel dimensions, rounded up. Non-finite or negative inputs collapse to zero.
    pub fn device_pixels(self) -> (u32, u32) {
        fn px(v: f64, s: f64) -> u32 {
            let d = (v * s).ceil();
            if d.is_finite() && d > 0.0 {
                d.min(f64::from(u32::MAX)) as u32
            } else {
                0
            }
        }
        let scale = if self.scale.is_finite() && self.scale > 0.0 {
            self.scale
        } else {
            1.0
        };
        (px(self.width, scale), px(self.height, scale))
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Convert a straight `[r, g, b, a]` array (the config representation).
    pub fn from_straight(rgba: [u8; 4]) -> Self {
        let [r, g, b, a] = rgba;
        Self::from_straight_rgba(r, g, b, a)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
