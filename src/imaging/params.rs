//! Parameter types for sticker encoding.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality in percent (1–100, default 90). Clamped on construction.
//! - [`Codec`]: Which of the two output codecs a run uses, and the file extension it writes.

use serde::Serialize;
use std::fmt;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Step down by `step` percent. `None` once the quality would reach zero,
    /// or when `step` is zero and nothing would change.
    pub fn lowered(self, step: u32) -> Option<Self> {
        match self.0.checked_sub(step) {
            Some(next) if next > 0 && next < self.0 => Some(Self(next)),
            _ => None,
        }
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Output codec for a sticker file.
///
/// Chosen solely by alpha presence: transparency needs the lossless codec,
/// opaque images go lossy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    /// PNG. Size is reduced by shrinking dimensions.
    Lossless,
    /// JPEG. Size is reduced by lowering quality.
    Lossy,
}

impl Codec {
    pub fn for_alpha(has_alpha: bool) -> Self {
        if has_alpha { Self::Lossless } else { Self::Lossy }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Lossless => "png",
            Self::Lossy => "jpg",
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lossless => write!(f, "lossless (png)"),
            Self::Lossy => write!(f, "lossy (jpg)"),
        }
    }
}
