//! Sticker building: turn one source image into one size-bounded sticker file.
//!
//! ## Steps
//!
//! ```text
//! source ─► pick square target from the ladder (618 → 408 → 300, else native)
//!        ─► aspect-fit + render into the fitted size (not padded to a square)
//!        ─► alpha? ── yes ─► PNG, shrink dimensions until it fits
//!                  └─ no ──► JPEG, lower quality until it fits
//!        ─► temp path <uuid>.<png|jpg> ─► register with the asset registrar
//! ```
//!
//! ## Collaborators
//!
//! Two seams stand in for the host platform:
//!
//! - [`TempPathProvider`] hands out a unique, writable path per sticker.
//!   [`TempDirPaths`] is the local implementation.
//! - [`AssetRegistrar`] accepts the finished file and description (the
//!   messaging framework in a real host). [`FileRegistrar`] is the local
//!   implementation.
//!
//! A failed run never returns a candidate, but it may leave a partially
//! written temp file behind. Cleaning the temp directory is the caller's job.

use crate::config::StickerConfig;
use crate::imaging::{
    Codec, CodecError, EncodeError, EncodeReport, ImageCodec, Quality, Size, render_to_fit,
    save_lossless, save_lossy, select_target_dimensions,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum StickerError {
    #[error("Failed to scale image: {0}")]
    Scale(#[source] CodecError),
    #[error("No writable temp path for .{extension} file")]
    Path { extension: &'static str },
    #[error("Failed to save sticker: {0}")]
    Encode(#[from] EncodeError),
    #[error("Sticker rejected: {0}")]
    Finalize(#[from] RegistrationError),
}

/// Why an [`AssetRegistrar`] refused a sticker.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("sticker file {0} is missing or empty")]
    MissingFile(PathBuf),
    #[error("unsupported sticker format: {0}")]
    UnsupportedFormat(String),
    #[error("description is {len} characters; the limit is {max}")]
    DescriptionTooLong { len: usize, max: usize },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Encoding knobs for one sticker run.
#[derive(Debug, Clone, PartialEq)]
pub struct StickerOptions {
    /// Square edge sizes, largest first.
    pub dimensions: Vec<u32>,
    pub max_file_size_bytes: u64,
    /// Fraction of each axis removed per lossless shrink step.
    pub shrink_factor: f64,
    pub initial_quality: Quality,
    /// Percent removed per lossy step.
    pub quality_step: u32,
}

impl StickerOptions {
    pub fn from_config(config: &StickerConfig) -> Self {
        Self {
            dimensions: config.sticker.dimensions.clone(),
            max_file_size_bytes: config.sticker.max_file_size_bytes,
            shrink_factor: config.lossless.shrink_factor,
            initial_quality: Quality::new(config.lossy.initial_quality),
            quality_step: config.lossy.quality_step,
        }
    }
}

impl Default for StickerOptions {
    fn default() -> Self {
        Self::from_config(&StickerConfig::default())
    }
}

/// A finished sticker file, ready to hand to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StickerCandidate {
    pub path: PathBuf,
    pub codec: Codec,
    pub description: String,
    pub report: EncodeReport,
}

impl StickerCandidate {
    pub fn extension(&self) -> &'static str {
        self.codec.extension()
    }
}

/// Source of unique, writable file paths.
pub trait TempPathProvider {
    /// A path ending in `.{extension}` that no other call returns.
    fn temp_file_path(&self, extension: &str) -> Option<PathBuf>;
}

/// `<dir>/<uuid-v4>.<ext>` paths, in the system temp dir by default.
#[derive(Debug, Clone)]
pub struct TempDirPaths {
    dir: PathBuf,
}

impl TempDirPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn system() -> Self {
        Self::new(std::env::temp_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Default for TempDirPaths {
    fn default() -> Self {
        Self::system()
    }
}

impl TempPathProvider for TempDirPaths {
    fn temp_file_path(&self, extension: &str) -> Option<PathBuf> {
        std::fs::create_dir_all(&self.dir).ok()?;
        let name = format!("{}.{}", uuid::Uuid::new_v4(), extension);
        Some(self.dir.join(name))
    }
}

/// Final acceptance of a sticker by whoever consumes it.
pub trait AssetRegistrar {
    fn register(&self, candidate: &StickerCandidate) -> Result<(), RegistrationError>;
}

/// Local registrar: checks the file is on disk in a sticker format and the
/// description is within the platform's length limit.
#[derive(Debug, Clone)]
pub struct FileRegistrar {
    pub description_max_chars: usize,
}

impl FileRegistrar {
    pub fn new(description_max_chars: usize) -> Self {
        Self {
            description_max_chars,
        }
    }
}

impl Default for FileRegistrar {
    fn default() -> Self {
        Self::new(StickerConfig::default().sticker.description_max_chars)
    }
}

impl AssetRegistrar for FileRegistrar {
    fn register(&self, candidate: &StickerCandidate) -> Result<(), RegistrationError> {
        let ext = candidate
            .path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if !matches!(ext.as_str(), "png" | "jpg" | "jpeg") {
            return Err(RegistrationError::UnsupportedFormat(ext));
        }

        let len = match std::fs::metadata(&candidate.path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };
        if len == 0 {
            return Err(RegistrationError::MissingFile(candidate.path.clone()));
        }

        let chars = candidate.description.chars().count();
        if chars > self.description_max_chars {
            return Err(RegistrationError::DescriptionTooLong {
                len: chars,
                max: self.description_max_chars,
            });
        }
        Ok(())
    }
}

/// The square (or native) size a source will be fitted into.
pub fn plan_sticker(source: Size, options: &StickerOptions) -> Size {
    select_target_dimensions(source, &options.dimensions)
}

/// Build a sticker from `source`.
///
/// Writes exactly one file on success. On any failure nothing is returned.
pub fn create_sticker<C: ImageCodec>(
    codec: &C,
    paths: &impl TempPathProvider,
    registrar: &impl AssetRegistrar,
    source: &C::Buffer,
    description: &str,
    options: &StickerOptions,
) -> Result<StickerCandidate, StickerError> {
    let source_size = codec.dimensions(source);
    let target = plan_sticker(source_size, options);
    debug!(
        source_width = source_size.width,
        source_height = source_size.height,
        target_width = target.width,
        target_height = target.height,
        "selected sticker dimensions"
    );

    let rendered = render_to_fit(codec, source, target).map_err(StickerError::Scale)?;

    let codec_choice = Codec::for_alpha(codec.detect_alpha(&rendered));
    let extension = codec_choice.extension();
    let path = paths
        .temp_file_path(extension)
        .ok_or(StickerError::Path { extension })?;

    let budget = options.max_file_size_bytes;
    let report = match codec_choice {
        Codec::Lossless => save_lossless(codec, &rendered, &path, budget, options.shrink_factor)?,
        Codec::Lossy => save_lossy(
            codec,
            &rendered,
            &path,
            budget,
            options.initial_quality,
            options.quality_step,
        )?,
    };

    let candidate = StickerCandidate {
        path,
        codec: codec_choice,
        description: description.to_string(),
        report,
    };
    registrar.register(&candidate)?;

    info!(
        path = %candidate.path.display(),
        codec = %candidate.codec,
        bytes = candidate.report.bytes,
        attempts = candidate.report.attempts,
        "sticker created"
    );
    Ok(candidate)
}
