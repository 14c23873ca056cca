use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use stickerfit::config;
use stickerfit::imaging::{Codec, ImageCodec, Rect, RustCodec, aspect_fit};
use stickerfit::output::{self, StickerPlan};
use stickerfit::sticker::{self, FileRegistrar, StickerOptions, TempDirPaths};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Called once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "stickerfit")]
#[command(about = "Turn an image into a size-bounded messaging sticker")]
#[command(long_about = "\
Turn an image into a size-bounded messaging sticker

The image is scaled (never cropped or stretched) to the largest preferred
square size it covers, then encoded to fit the byte budget:

  transparent → PNG, shrinking dimensions 10% per retry
  opaque      → JPEG, lowering quality from 90 in steps of 5

Defaults (override in config.toml):
  Sizes:  618, 408, 300 px
  Budget: 500 KiB

Run 'stickerfit gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Log every encode attempt to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a sticker file from an image
    Build {
        /// Source image (JPEG, PNG, WebP, TIFF)
        input: PathBuf,
        /// Localized description carried with the sticker
        #[arg(long, short)]
        description: String,
        /// Override the byte budget from config
        #[arg(long)]
        max_bytes: Option<u64>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show target size and codec for an image without encoding
    Plan {
        /// Source image
        input: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Build {
            input,
            description,
            max_bytes,
            json,
        } => {
            let site = config::load_config(&cli.config_dir)?;
            let mut options = StickerOptions::from_config(&site);
            if let Some(bytes) = max_bytes {
                options.max_file_size_bytes = bytes;
            }
            let paths = match &site.output.temp_dir {
                Some(dir) => TempDirPaths::new(dir),
                None => TempDirPaths::system(),
            };
            let registrar = FileRegistrar::new(site.sticker.description_max_chars);

            let codec = RustCodec::new();
            let source = codec.open(&input)?;
            let candidate = sticker::create_sticker(
                &codec,
                &paths,
                &registrar,
                &source,
                &description,
                &options,
            )?;

            if json {
                println!("{}", serde_json::to_string_pretty(&candidate)?);
            } else {
                output::print_sticker(&candidate, options.max_file_size_bytes);
            }
        }
        Command::Plan { input } => {
            let site = config::load_config(&cli.config_dir)?;
            let options = StickerOptions::from_config(&site);
            output::print_plan(&plan(&input, &options)?);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise warnings only, or debug with `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose {
        "stickerfit=debug"
    } else {
        "stickerfit=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Work out target, fitted size and codec for `input`.
///
/// Rendering keeps the pixel layout, so the source's alpha decides the codec.
fn plan(input: &Path, options: &StickerOptions) -> Result<StickerPlan, Box<dyn std::error::Error>> {
    let codec = RustCodec::new();
    let source = codec.open(input)?;
    let size = codec.dimensions(&source);
    let target = sticker::plan_sticker(size, options);
    let fitted = aspect_fit(size, Rect::from_size(target)).size;

    Ok(StickerPlan {
        source: size,
        target,
        fitted,
        codec: Codec::for_alpha(codec.detect_alpha(&source)),
        budget: options.max_file_size_bytes,
    })
}
