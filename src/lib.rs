//! # stickerfit
//!
//! Turns an arbitrary image into a messaging-platform sticker: a PNG or JPEG
//! that fits a hard byte budget, sits on one of the platform's preferred
//! square sizes, and keeps the source's aspect ratio without cropping or
//! distortion.
//!
//! # Pipeline
//!
//! ```text
//! 1. Select   source size  →  square target   (618 → 408 → 300 px, else native)
//! 2. Render   source       →  fitted buffer   (aspect-fit, not padded)
//! 3. Classify buffer       →  codec           (alpha → PNG, opaque → JPEG)
//! 4. Encode   buffer       →  file ≤ budget   (shrink dimensions / lower quality)
//! 5. Register file + text  →  sticker         (host accepts or rejects)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Geometry, the [`ImageCodec`](imaging::ImageCodec) seam, the `image`-crate codec, and the size-constrained encoder |
//! | [`sticker`] | Builds one sticker end to end; temp-path and registrar collaborators |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Two Codecs, One Loop
//!
//! PNG has no quality knob, so the lossless path gets smaller by rendering
//! smaller. JPEG gets smaller by lowering quality, which is cheaper than
//! re-rendering and looks better than downsizing. Both are the same
//! encode → write → measure → step loop
//! ([`constrained_search`](imaging::constrained_search)) with a different
//! state and step function. Each step strictly shrinks the state and the
//! state space is finite, so every run terminates.
//!
//! ## Never Oversized
//!
//! A run either yields a file at or under the budget, or an error. When the
//! search space runs out the error says so
//! ([`EncodeError::BudgetUnattainable`](imaging::EncodeError::BudgetUnattainable))
//! rather than a generic failure.
//!
//! ## Fail-Open Alpha
//!
//! If a buffer's pixel layout cannot be introspected it is treated as
//! transparent. The worst case is a lossless file that could have been a
//! JPEG; the alternative would silently flatten transparency.

pub mod config;
pub mod imaging;
pub mod output;
pub mod sticker;
