use crate::foundation::error::{SlidecastError, SlidecastResult};

pub use kurbo::{Point, Rect};

/// Output raster size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl Canvas {
    /// Check the canvas can be encoded as yuv420p video.
    pub fn validate(self) -> SlidecastResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SlidecastError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            return Err(SlidecastError::validation(
                "canvas width/height must be even (required for yuv420p output)",
            ));
        }
        if self.width > u32::from(u16::MAX) || self.height > u32::from(u16::MAX) {
            return Err(SlidecastError::validation(
                "canvas width/height must fit in u16",
            ));
        }
        Ok(())
    }

    /// Full canvas rectangle.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }
}

/// Opaque sRGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8(pub [u8; 3]);

impl Rgb8 {
    /// Pure white.
    pub const WHITE: Self = Self([255, 255, 255]);
    /// Pure black.
    pub const BLACK: Self = Self([0, 0, 0]);
    /// Red (`#ff0000`).
    pub const RED: Self = Self([255, 0, 0]);
    /// Blue (`#0000ff`).
    pub const BLUE: Self = Self([0, 0, 255]);
    /// Gold (`#ffd700`).
    pub const GOLD: Self = Self([255, 215, 0]);
    /// Green (`#008000`).
    pub const GREEN: Self = Self([0, 128, 0]);

    /// Red channel.
    pub fn r(self) -> u8 {
        self.0[0]
    }

    /// Green channel.
    pub fn g(self) -> u8 {
        self.0[1]
    }

    /// Blue channel.
    pub fn b(self) -> u8 {
        self.0[2]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
