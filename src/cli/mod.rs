//! Command-line interface implementation
//!
//! Parses arguments and dispatches to the conversion commands.

mod convert;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::convert::PaletteFormat;

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// ase2next - Convert tiled sprite animations into ZX Spectrum Next assets
#[derive(Parser)]
#[command(name = "ase2next")]
#[command(about = "Convert tiled sprite animations into Next sprite attributes, patterns and paged frame definitions")]
#[command(version)]
pub struct Cli {
    /// Log debug diagnostics and list every file written
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: nearest ase2next.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every conversion command.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Input sprite files (.json, .png) or directories
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output directory; relative artifact paths resolve against it
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Palette index written for transparent pixels
    #[arg(long)]
    pub transparent_index: Option<u8>,
}

/// Frame definition options.
#[derive(Args, Debug, Clone, Default)]
pub struct FrameArgs {
    /// Number of the first memory page
    #[arg(long)]
    pub start_page: Option<u32>,

    /// Directory for page descriptors
    #[arg(long)]
    pub asm_dir: Option<PathBuf>,

    /// Directory for binary payloads
    #[arg(long)]
    pub binary_dir: Option<PathBuf>,

    /// Wrap out-of-range relative tile offsets instead of failing
    #[arg(long)]
    pub no_validate_offsets: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write frame definitions plus any other configured artifacts
    Build {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        frames: FrameArgs,

        /// Also write the sprite pattern bank
        #[arg(long)]
        patterns: bool,

        /// Also write 4-bit tile definitions
        #[arg(long)]
        tiles: bool,

        /// Also write palettes
        #[arg(long)]
        palettes: bool,

        /// Also write sprite slot metadata for these families (comma separated)
        #[arg(long, value_delimiter = ',')]
        slots: Option<Vec<String>>,
    },

    /// Write binary frame payloads and paged descriptors
    Frames {
        #[command(flatten)]
        common: CommonArgs,

        #[command(flatten)]
        frames: FrameArgs,
    },

    /// Write every layer tileset as 8-bit sprite patterns
    Patterns {
        #[command(flatten)]
        common: CommonArgs,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write 8x8 indexed tilesets as 4-bit tile definitions
    Tiles {
        #[command(flatten)]
        common: CommonArgs,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write one palette file per sprite
    Palette {
        #[command(flatten)]
        common: CommonArgs,

        /// Output directory
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Palette byte layout (reduced, rgba)
        #[arg(long)]
        format: Option<PaletteFormat>,
    },

    /// Write sprite slot metadata as C source
    Metadata {
        #[command(flatten)]
        common: CommonArgs,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Families in hardware slot order (comma separated)
        #[arg(long, value_delimiter = ',')]
        slots: Option<Vec<String>>,

        /// Wrap out-of-range relative tile offsets instead of failing
        #[arg(long)]
        no_validate_offsets: bool,
    },

    /// Render the first cel of a sprite as Layer 2 bitmap banks
    Layer2 {
        #[command(flatten)]
        common: CommonArgs,

        /// Bank file prefix; banks are named <prefix><n>
        #[arg(long)]
        prefix: Option<PathBuf>,
    },
}

/// Run the CLI and return the exit code
pub fn run(cli: Cli) -> ExitCode {
    let verbose = cli.verbose;
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Build { common, frames, patterns, tiles, palettes, slots } => {
            convert::run_build(&common, &frames, patterns, tiles, palettes, slots, config, verbose)
        }
        Commands::Frames { common, frames } => convert::run_frames(&common, &frames, config, verbose),
        Commands::Patterns { common, output } => convert::run_patterns(&common, output, config, verbose),
        Commands::Tiles { common, output } => convert::run_tiles(&common, output, config, verbose),
        Commands::Palette { common, dir, format } => convert::run_palette(&common, dir, format, config, verbose),
        Commands::Metadata { common, output, slots, no_validate_offsets } => {
            convert::run_metadata(&common, output, slots, no_validate_offsets, config, verbose)
        }
        Commands::Layer2 { common, prefix } => convert::run_layer2(&common, prefix, config, verbose),
    }
}
