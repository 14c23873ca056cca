//! Image processing on the `image` crate.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` |
//! | **Aspect fit** | [`aspect_fit`] (pure geometry) |
//! | **Render** | Lanczos3 `resize_exact` |
//! | **Encode → PNG / JPEG** | `image` crate encoders, inside the size-constrained loop |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for geometry and dimension selection (unit testable)
//! - **Parameters**: [`Quality`] and [`Codec`]
//! - **Backend**: [`ImageCodec`] trait + [`RustCodec`]
//! - **Operations**: Render-to-fit and the size-constrained encoder loops

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{CodecError, ImageCodec, PixelLayout, layout_has_alpha};
pub use calculations::{Rect, Size, aspect_fit, select_target_dimensions, shrink_size};
pub use operations::{
    EncodeError, EncodeReport, constrained_search, render_to_fit, save_lossless, save_lossy,
    write_and_measure,
};
pub use params::{Codec, Quality};
pub use rust_backend::RustCodec;
