//! Pure calculation functions for sticker geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use serde::Serialize;

/// A width/height pair in (possibly fractional) pixels.
///
/// Degenerate when either component is `<= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Square size with both edges equal to `edge`.
    pub fn square(edge: f64) -> Self {
        Self::new(edge, edge)
    }

    pub fn area(self) -> f64 {
        self.width * self.height
    }

    pub fn is_degenerate(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Round to whole pixels.
    ///
    /// Returns `None` when either axis rounds to zero; there is no bitmap
    /// to draw into.
    pub fn to_pixels(self) -> Option<(u32, u32)> {
        let w = self.width.round();
        let h = self.height.round();
        if w < 1.0 || h < 1.0 || !w.is_finite() || !h.is_finite() {
            return None;
        }
        Some((w as u32, h as u32))
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width as f64, height as f64)
    }
}

/// An origin plus a size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub size: Size,
}

impl Rect {
    /// Rect anchored at the origin.
    pub fn from_size(size: Size) -> Self {
        Self { x: 0.0, y: 0.0, size }
    }
}

/// Largest rect with `source`'s aspect ratio that fits inside `bounds`,
/// centered within it.
///
/// `source` must have no zero component; the caller guarantees it. With a
/// zero component the result is NaN/infinite rather than an error.
///
/// # Examples
/// ```
/// # use stickerfit::imaging::{Rect, Size, aspect_fit};
/// // 800x400 into a 400 square → 400x200, vertically centered
/// let rect = aspect_fit(Size::new(800.0, 400.0), Rect::from_size(Size::square(400.0)));
/// assert_eq!(rect.size, Size::new(400.0, 200.0));
/// assert_eq!((rect.x, rect.y), (0.0, 100.0));
/// ```
pub fn aspect_fit(source: Size, bounds: Rect) -> Rect {
    let scale_w = bounds.size.width / source.width;
    let scale_h = bounds.size.height / source.height;
    let scale = scale_w.min(scale_h);

    let size = Size::new(source.width * scale, source.height * scale);
    Rect {
        x: (bounds.size.width - size.width) / 2.0,
        y: (bounds.size.height - size.height) / 2.0,
        size,
    }
}

/// Pick the square target for a sticker from an ordered ladder.
///
/// The ladder runs from largest to smallest; the first edge that fits inside
/// the source on both axes wins. When none fits, the source's native size
/// is returned unchanged.
pub fn select_target_dimensions(source: Size, ladder: &[u32]) -> Size {
    ladder
        .iter()
        .map(|&edge| edge as f64)
        .find(|&edge| edge <= source.width && edge <= source.height)
        .map(Size::square)
        .unwrap_or(source)
}

/// Shrink both axes by `factor` of their current length.
pub fn shrink_size(size: Size, factor: f64) -> Size {
    Size::new(
        size.width - size.width * factor,
        size.height - size.height * factor,
    )
}
