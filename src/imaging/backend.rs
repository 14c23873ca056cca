//! Image codec trait and shared types.
//!
//! The [`ImageCodec`] trait is the seam between the sticker pipeline and
//! whatever imaging library does the pixel work. It covers exactly what the
//! pipeline needs: measure, introspect the pixel layout, render to a new size,
//! and encode lossless or lossy.
//!
//! The production implementation is
//! [`RustCodec`](super::rust_backend::RustCodec), built on the `image` crate.

use super::calculations::Size;
use super::params::Quality;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot render to {width}x{height}: rounds to zero pixels")]
    DegenerateSize { width: f64, height: f64 },
    #[error("Rendering failed: {0}")]
    RenderFailed(String),
    #[error("Encoding failed: {0}")]
    EncodeFailed(String),
    #[error("Decoding failed: {0}")]
    DecodeFailed(String),
}

/// Where (and whether) a bitmap stores alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// No alpha channel.
    None,
    /// Padding byte before the color components, ignored.
    NoneSkipFirst,
    /// Padding byte after the color components, ignored.
    NoneSkipLast,
    /// Straight alpha, stored first.
    First,
    /// Straight alpha, stored last.
    Last,
    /// Premultiplied alpha, stored first.
    PremultipliedFirst,
    /// Premultiplied alpha, stored last.
    PremultipliedLast,
    /// Alpha with no color components (a mask).
    AlphaOnly,
}

impl PixelLayout {
    pub fn has_alpha(self) -> bool {
        matches!(
            self,
            Self::First
                | Self::Last
                | Self::PremultipliedFirst
                | Self::PremultipliedLast
                | Self::AlphaOnly
        )
    }
}

/// Alpha classification with the fail-open rule: a layout that could not be
/// introspected counts as having alpha, so transparency is never dropped.
pub fn layout_has_alpha(layout: Option<PixelLayout>) -> bool {
    layout.is_none_or(PixelLayout::has_alpha)
}

/// Trait for imaging back-ends.
///
/// Buffers are immutable values: [`render`](Self::render) always returns a
/// new buffer and never touches its input.
pub trait ImageCodec {
    type Buffer;

    /// Pixel dimensions of a buffer.
    fn dimensions(&self, buffer: &Self::Buffer) -> Size;

    /// Pixel layout, or `None` if the format cannot be introspected.
    fn pixel_layout(&self, buffer: &Self::Buffer) -> Option<PixelLayout>;

    /// Draw the whole buffer into a new one of exactly `target` size.
    fn render(&self, buffer: &Self::Buffer, target: Size) -> Result<Self::Buffer, CodecError>;

    fn encode_lossless(&self, buffer: &Self::Buffer) -> Result<Vec<u8>, CodecError>;

    fn encode_lossy(&self, buffer: &Self::Buffer, quality: Quality)
    -> Result<Vec<u8>, CodecError>;

    fn detect_alpha(&self, buffer: &Self::Buffer) -> bool {
        layout_has_alpha(self.pixel_layout(buffer))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Synthetic bitmap: just a size and a layout, no pixels.
    #[derive(Debug, Clone, PartialEq)]
    pub struct MockBuffer {
        pub width: u32,
        pub height: u32,
        pub layout: Option<PixelLayout>,
    }

    impl MockBuffer {
        pub fn opaque(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                layout: Some(PixelLayout::None),
            }
        }

        pub fn transparent(width: u32, height: u32) -> Self {
            Self {
                width,
                height,
                layout: Some(PixelLayout::PremultipliedLast),
            }
        }
    }

    /// Mock codec that records operations and produces deterministic byte
    /// counts: `bytes_per_pixel * area` for lossless, scaled by
    /// `quality / 100` for lossy.
    #[derive(Default)]
    pub struct MockCodec {
        pub bytes_per_pixel: u64,
        pub fail_render: bool,
        pub fail_encode: bool,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Render { width: u32, height: u32 },
        EncodeLossless { width: u32, height: u32 },
        EncodeLossy { quality: u32 },
    }

    impl MockCodec {
        pub fn new(bytes_per_pixel: u64) -> Self {
            Self {
                bytes_per_pixel,
                ..Self::default()
            }
        }

        pub fn failing_render(bytes_per_pixel: u64) -> Self {
            Self {
                fail_render: true,
                ..Self::new(bytes_per_pixel)
            }
        }

        pub fn failing_encode(bytes_per_pixel: u64) -> Self {
            Self {
                fail_encode: true,
                ..Self::new(bytes_per_pixel)
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        fn payload(&self, len: u64) -> Vec<u8> {
            vec![0u8; len as usize]
        }
    }

    impl ImageCodec for MockCodec {
        type Buffer = MockBuffer;

        fn dimensions(&self, buffer: &MockBuffer) -> Size {
            Size::from((buffer.width, buffer.height))
        }

        fn pixel_layout(&self, buffer: &MockBuffer) -> Option<PixelLayout> {
            buffer.layout
        }

        fn render(&self, buffer: &MockBuffer, target: Size) -> Result<MockBuffer, CodecError> {
            if self.fail_render {
                return Err(CodecError::RenderFailed("mock render failure".into()));
            }
            let (width, height) = target.to_pixels().ok_or(CodecError::DegenerateSize {
                width: target.width,
                height: target.height,
            })?;
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Render { width, height });
            Ok(MockBuffer {
                width,
                height,
                layout: buffer.layout,
            })
        }

        fn encode_lossless(&self, buffer: &MockBuffer) -> Result<Vec<u8>, CodecError> {
            if self.fail_encode {
                return Err(CodecError::EncodeFailed("mock encode failure".into()));
            }
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::EncodeLossless {
                    width: buffer.width,
                    height: buffer.height,
                });
            let area = buffer.width as u64 * buffer.height as u64;
            Ok(self.payload(area * self.bytes_per_pixel))
        }

        fn encode_lossy(
            &self,
            buffer: &MockBuffer,
            quality: Quality,
        ) -> Result<Vec<u8>, CodecError> {
            if self.fail_encode {
                return Err(CodecError::EncodeFailed("mock encode failure".into()));
            }
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::EncodeLossy {
                    quality: quality.value(),
                });
            let area = buffer.width as u64 * buffer.height as u64;
            Ok(self.payload(area * self.bytes_per_pixel * quality.value() as u64 / 100))
        }
    }

    #[test]
    fn alpha_layouts_are_detected() {
        for layout in [
            PixelLayout::First,
            PixelLayout::Last,
            PixelLayout::PremultipliedFirst,
            PixelLayout::PremultipliedLast,
            PixelLayout::AlphaOnly,
        ] {
            assert!(layout_has_alpha(Some(layout)), "{layout:?}");
        }
    }

    #[test]
    fn opaque_layouts_are_not_alpha() {
        for layout in [
            PixelLayout::None,
            PixelLayout::NoneSkipFirst,
            PixelLayout::NoneSkipLast,
        ] {
            assert!(!layout_has_alpha(Some(layout)), "{layout:?}");
        }
    }

    #[test]
    fn unknown_layout_fails_open() {
        assert!(layout_has_alpha(None));
    }

    #[test]
    fn detect_alpha_uses_layout() {
        let codec = MockCodec::new(1);
        assert!(codec.detect_alpha(&MockBuffer::transparent(4, 4)));
        assert!(!codec.detect_alpha(&MockBuffer::opaque(4, 4)));
        let unknown = MockBuffer {
            layout: None,
            ..MockBuffer::opaque(4, 4)
        };
        assert!(codec.detect_alpha(&unknown));
    }

    #[test]
    fn mock_records_render() {
        let codec = MockCodec::new(1);
        let out = codec
            .render(&MockBuffer::opaque(800, 600), Size::new(400.0, 300.0))
            .unwrap();
        assert_eq!((out.width, out.height), (400, 300));
        assert_eq!(
            codec.get_operations(),
            vec![RecordedOp::Render {
                width: 400,
                height: 300
            }]
        );
    }

    #[test]
    fn mock_render_rejects_sub_pixel_target() {
        let codec = MockCodec::new(1);
        let result = codec.render(&MockBuffer::opaque(10, 10), Size::new(0.3, 0.3));
        assert!(matches!(result, Err(CodecError::DegenerateSize { .. })));
    }

    #[test]
    fn mock_lossy_size_scales_with_quality() {
        let codec = MockCodec::new(4);
        let buffer = MockBuffer::opaque(10, 10);
        assert_eq!(codec.encode_lossy(&buffer, Quality::new(50)).unwrap().len(), 200);
        assert_eq!(codec.encode_lossless(&buffer).unwrap().len(), 400);
    }
}
