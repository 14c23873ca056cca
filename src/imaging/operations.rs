//! High-level image operations: aspect-preserving render and the
//! size-constrained encoder.
//!
//! Both output codecs share one search loop, [`constrained_search`]: encode,
//! write atomically, measure the file, and either stop (fits the byte budget)
//! or step to a strictly smaller state. What differs is the state and how it
//! shrinks:
//!
//! | Codec | State | Step | Exhausted when |
//! |---|---|---|---|
//! | Lossless (PNG) | current buffer + size | `size -= size * shrink_factor`, re-render | size rounds to zero pixels |
//! | Lossy (JPEG) | quality | `quality -= quality_step` | quality reaches zero |
//!
//! Every attempt fully closes its file before the length is read back.

use super::backend::{CodecError, ImageCodec};
use super::calculations::{Rect, Size, aspect_fit, shrink_size};
use super::params::{Codec, Quality};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
    #[error(
        "no encoding fits in {budget} bytes after {attempts} attempts (smallest was {smallest} bytes)"
    )]
    BudgetUnattainable {
        budget: u64,
        smallest: u64,
        attempts: u32,
    },
}

/// Result type for encode operations.
pub type Result<T> = std::result::Result<T, EncodeError>;

/// Outcome of a successful size-constrained encode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodeReport {
    pub codec: Codec,
    /// Encode → write → measure rounds, including the successful one.
    pub attempts: u32,
    /// Size of the file on disk.
    pub bytes: u64,
    pub width: u32,
    pub height: u32,
    /// Final quality; `None` for the lossless codec.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<Quality>,
}

/// A search that met its budget.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome<S> {
    pub state: S,
    pub bytes: u64,
    pub attempts: u32,
}

/// Iterative constrained search.
///
/// Calls `attempt` on the current state to get a byte count. Stops at the
/// first state whose count is `<= budget`. Otherwise `next` consumes the
/// state and yields a smaller one, or `None` when the space is exhausted.
/// Any error from either closure ends the search.
pub fn constrained_search<S, A, N>(
    initial: S,
    budget: u64,
    mut attempt: A,
    mut next: N,
) -> Result<SearchOutcome<S>>
where
    A: FnMut(&S) -> Result<u64>,
    N: FnMut(S) -> Result<Option<S>>,
{
    let mut state = initial;
    let mut attempts = 0u32;
    let mut smallest = u64::MAX;

    loop {
        let bytes = attempt(&state)?;
        attempts += 1;
        smallest = smallest.min(bytes);

        if bytes <= budget {
            return Ok(SearchOutcome {
                state,
                bytes,
                attempts,
            });
        }

        state = match next(state)? {
            Some(s) => s,
            None => {
                warn!(budget, smallest, attempts, "byte budget unattainable");
                return Err(EncodeError::BudgetUnattainable {
                    budget,
                    smallest,
                    attempts,
                });
            }
        };
    }
}

/// Render `buffer` into the largest size with its own aspect ratio that fits
/// in `bounds`.
pub fn render_to_fit<C: ImageCodec>(
    codec: &C,
    buffer: &C::Buffer,
    bounds: Size,
) -> std::result::Result<C::Buffer, CodecError> {
    let source = codec.dimensions(buffer);
    let fitted = aspect_fit(source, Rect::from_size(bounds));
    codec.render(buffer, fitted.size)
}

/// Write `bytes` to `path` atomically and return the on-disk length.
///
/// The bytes land in a sibling temp file that is persisted over `path`, so a
/// failed attempt never leaves a truncated destination behind.
pub fn write_and_measure(path: &Path, bytes: &[u8]) -> io::Result<u64> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    Ok(std::fs::metadata(path)?.len())
}

/// Lossless search state: the target size and the buffer rendered for it.
/// `rendered` is `None` until the first shrink; the input buffer is used.
struct Shrinking<B> {
    size: Size,
    rendered: Option<B>,
}

fn pixel_area((width, height): (u32, u32)) -> u64 {
    u64::from(width) * u64::from(height)
}

/// Save as lossless PNG, shrinking dimensions until the file fits `budget`.
///
/// Each shrink re-renders the previous buffer, which is dropped once the
/// smaller one exists. Every encoded buffer has strictly fewer pixels than
/// the one before. A `shrink_factor` that does not reduce the size ends the
/// search after the first attempt.
pub fn save_lossless<C: ImageCodec>(
    codec: &C,
    buffer: &C::Buffer,
    path: &Path,
    budget: u64,
    shrink_factor: f64,
) -> Result<EncodeReport> {
    let initial = Shrinking {
        size: codec.dimensions(buffer),
        rendered: None,
    };

    let outcome = constrained_search(
        initial,
        budget,
        |state| {
            let img = state.rendered.as_ref().unwrap_or(buffer);
            let bytes = codec.encode_lossless(img)?;
            let written = write_and_measure(path, &bytes)?;
            debug!(
                codec = "png",
                width = state.size.width,
                height = state.size.height,
                bytes = written,
                "encode attempt"
            );
            Ok(written)
        },
        |state| {
            let img = state.rendered.as_ref().unwrap_or(buffer);
            let current = codec.dimensions(img);
            let Some(current_px) = current.to_pixels().map(pixel_area) else {
                return Ok(None);
            };

            // Keep shrinking until rounding yields fewer pixels than the
            // buffer already has.
            let mut bounds = state.size;
            loop {
                let shrunk = shrink_size(bounds, shrink_factor);
                // False for NaN too
                let smaller = shrunk.area() < bounds.area();
                if !smaller {
                    return Ok(None);
                }
                bounds = shrunk;

                let fitted = aspect_fit(current, Rect::from_size(bounds));
                let Some(px) = fitted.size.to_pixels().map(pixel_area) else {
                    return Ok(None);
                };
                if px < current_px {
                    let rendered = codec.render(img, fitted.size)?;
                    return Ok(Some(Shrinking {
                        size: fitted.size,
                        rendered: Some(rendered),
                    }));
                }
            }
        },
    )?;

    let final_img = outcome.state.rendered.as_ref().unwrap_or(buffer);
    let (width, height) = codec.dimensions(final_img).to_pixels().unwrap_or((0, 0));
    Ok(EncodeReport {
        codec: Codec::Lossless,
        attempts: outcome.attempts,
        bytes: outcome.bytes,
        width,
        height,
        quality: None,
    })
}

/// Save as lossy JPEG, lowering quality until the file fits `budget`.
pub fn save_lossy<C: ImageCodec>(
    codec: &C,
    buffer: &C::Buffer,
    path: &Path,
    budget: u64,
    initial_quality: Quality,
    quality_step: u32,
) -> Result<EncodeReport> {
    let outcome = constrained_search(
        initial_quality,
        budget,
        |&quality| {
            let bytes = codec.encode_lossy(buffer, quality)?;
            let written = write_and_measure(path, &bytes)?;
            debug!(codec = "jpg", quality = quality.value(), bytes = written, "encode attempt");
            Ok(written)
        },
        |quality| Ok(quality.lowered(quality_step)),
    )?;

    let (width, height) = codec.dimensions(buffer).to_pixels().unwrap_or((0, 0));
    Ok(EncodeReport {
        codec: Codec::Lossy,
        attempts: outcome.attempts,
        bytes: outcome.bytes,
        width,
        height,
        quality: Some(outcome.state),
    })
}
