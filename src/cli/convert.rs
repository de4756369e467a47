//! Conversion command implementations (build, frames, patterns, tiles, palette, metadata, layer2)

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use super::{CommonArgs, FrameArgs, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::color::Rgb332;
use crate::config::{load_config, merge_cli_overrides, Ase2NextConfig, CliOverrides};
use crate::convert::{
    write_frame_definitions, write_palettes, write_patterns, write_tile_definitions, FrameOutput, PaletteFormat,
};
use crate::error::ConvertError;
use crate::layer2::write_layer2;
use crate::loader::load_inputs;
use crate::metadata::write_metadata;
use crate::models::Sprite;
use crate::progress::{ConsoleProgress, ProgressEvent, ProgressReporter};

/// Loaded inputs plus the effective configuration.
struct Session {
    config: Ase2NextConfig,
    sprites: Vec<Sprite>,
    reducer: Rgb332,
    progress: ConsoleProgress,
    started: Instant,
}

impl Session {
    /// Load config and inputs, reporting failures as exit codes.
    fn open(common: &CommonArgs, overrides: CliOverrides, config: Option<&Path>, verbose: bool) -> Result<Self, ExitCode> {
        let mut cfg = match load_config(config) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                return Err(ExitCode::from(EXIT_ERROR));
            }
        };
        merge_cli_overrides(
            &mut cfg,
            &CliOverrides {
                out: common.out.clone(),
                transparent_index: common.transparent_index,
                ..overrides
            },
        );

        let sprites = match load_inputs(&common.inputs) {
            Ok(sprites) => sprites,
            Err(e) => {
                eprintln!("Error: {}", e);
                return Err(ExitCode::from(EXIT_ERROR));
            }
        };
        if sprites.is_empty() {
            eprintln!("Error: no input sprites found");
            return Err(ExitCode::from(EXIT_INVALID_ARGS));
        }

        let progress = ConsoleProgress::new()
            .with_colors(std::io::stderr().is_terminal())
            .with_verbose(verbose);
        progress.report(ProgressEvent::ConversionStarted { inputs: sprites.len() });

        Ok(Self {
            reducer: Rgb332::new(cfg.colors.transparent_index),
            config: cfg,
            sprites,
            progress,
            started: Instant::now(),
        })
    }

    fn frame_output(&self) -> FrameOutput {
        let frames = &self.config.frames;
        FrameOutput::new(self.config.output_path(&frames.asm_dir), self.config.output_path(&frames.binary_dir))
            .with_start_page(frames.start_page)
            .with_validate_offsets(frames.validate_offsets)
    }

    /// Report the outcome and map it to an exit code.
    fn finish(self, result: Result<(), ConvertError>) -> ExitCode {
        let duration_ms = self.started.elapsed().as_millis() as u64;
        match result {
            Ok(()) => {
                self.progress.report(ProgressEvent::ConversionCompleted { success: true, duration_ms });
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => {
                tracing::error!(error = %e, "conversion failed");
                self.progress.report(ProgressEvent::Error { message: e.to_string() });
                self.progress.report(ProgressEvent::ConversionCompleted { success: false, duration_ms });
                ExitCode::from(EXIT_ERROR)
            }
        }
    }

    fn frames(&self) -> Result<(), ConvertError> {
        let summary = write_frame_definitions(&self.sprites, &self.frame_output(), &self.reducer, &self.progress)?;
        tracing::info!(frames = summary.frames, pages = ?summary.pages, patterns = summary.patterns, "frame definitions written");
        Ok(())
    }

    fn patterns(&self) -> Result<(), ConvertError> {
        let path = self.config.output_path(&self.config.patterns.output);
        write_patterns(&self.sprites, &path, &self.reducer, &self.progress).map(|_| ())
    }

    fn tiles(&self) -> Result<(), ConvertError> {
        let path = self.config.output_path(&self.config.tiles.output);
        write_tile_definitions(&self.sprites, &path, &self.progress).map(|_| ())
    }

    fn palettes(&self) -> Result<(), ConvertError> {
        let dir = self.config.output_path(&self.config.palette.dir);
        let written = write_palettes(&self.sprites, &dir, self.config.palette.format, &self.reducer, &self.progress)?;
        if written.is_empty() {
            self.progress.report(ProgressEvent::Warning { message: "No input sprite has a palette".to_string() });
        }
        Ok(())
    }

    fn metadata(&self) -> Result<(), ConvertError> {
        let metadata = &self.config.metadata;
        if metadata.slots.is_empty() {
            self.progress.report(ProgressEvent::Warning {
                message: "No sprite slots configured; metadata lists families only".to_string(),
            });
        }
        write_metadata(
            &self.sprites,
            &metadata.slots,
            &self.config.output_path(&metadata.output),
            self.config.frames.validate_offsets,
            &self.reducer,
            &self.progress,
        )
    }

    fn layer2(&self) -> Result<(), ConvertError> {
        if self.sprites.len() > 1 {
            self.progress.report(ProgressEvent::Warning {
                message: format!("Layer 2 output uses the first of {} sprites", self.sprites.len()),
            });
        }
        let prefix = self.config.output_path(&self.config.layer2.prefix);
        // `Session::open` guarantees at least one sprite
        match self.sprites.first() {
            Some(sprite) => write_layer2(sprite, &prefix, &self.reducer, &self.progress).map(|_| ()),
            None => Ok(()),
        }
    }
}

fn frame_overrides(frames: &FrameArgs) -> CliOverrides {
    CliOverrides {
        start_page: frames.start_page,
        asm_dir: frames.asm_dir.clone(),
        binary_dir: frames.binary_dir.clone(),
        validate_offsets: frames.no_validate_offsets.then_some(false),
        ..Default::default()
    }
}

/// Run the build command
pub fn run_build(
    common: &CommonArgs,
    frames: &FrameArgs,
    patterns: bool,
    tiles: bool,
    palettes: bool,
    slots: Option<Vec<String>>,
    config: Option<&Path>,
    verbose: bool,
) -> ExitCode {
    let with_metadata = slots.is_some();
    let overrides = CliOverrides { slots, ..frame_overrides(frames) };
    let session = match Session::open(common, overrides, config, verbose) {
        Ok(session) => session,
        Err(code) => return code,
    };

    let result = (|| -> Result<(), ConvertError> {
        session.frames()?;
        if patterns {
            session.patterns()?;
        }
        if tiles {
            session.tiles()?;
        }
        if palettes {
            session.palettes()?;
        }
        if with_metadata {
            session.metadata()?;
        }
        Ok(())
    })();
    session.finish(result)
}

/// Run the frames command
pub fn run_frames(common: &CommonArgs, frames: &FrameArgs, config: Option<&Path>, verbose: bool) -> ExitCode {
    match Session::open(common, frame_overrides(frames), config, verbose) {
        Ok(session) => {
            let result = session.frames();
            session.finish(result)
        }
        Err(code) => code,
    }
}

/// Run the patterns command
pub fn run_patterns(common: &CommonArgs, output: Option<PathBuf>, config: Option<&Path>, verbose: bool) -> ExitCode {
    let overrides = CliOverrides { patterns_output: output, ..Default::default() };
    match Session::open(common, overrides, config, verbose) {
        Ok(session) => {
            let result = session.patterns();
            session.finish(result)
        }
        Err(code) => code,
    }
}

/// Run the tiles command
pub fn run_tiles(common: &CommonArgs, output: Option<PathBuf>, config: Option<&Path>, verbose: bool) -> ExitCode {
    let overrides = CliOverrides { tiles_output: output, ..Default::default() };
    match Session::open(common, overrides, config, verbose) {
        Ok(session) => {
            let result = session.tiles();
            session.finish(result)
        }
        Err(code) => code,
    }
}

/// Run the palette command
pub fn run_palette(
    common: &CommonArgs,
    dir: Option<PathBuf>,
    format: Option<PaletteFormat>,
    config: Option<&Path>,
    verbose: bool,
) -> ExitCode {
    let overrides = CliOverrides { palette_dir: dir, palette_format: format, ..Default::default() };
    match Session::open(common, overrides, config, verbose) {
        Ok(session) => {
            let result = session.palettes();
            session.finish(result)
        }
        Err(code) => code,
    }
}

/// Run the metadata command
pub fn run_metadata(
    common: &CommonArgs,
    output: Option<PathBuf>,
    slots: Option<Vec<String>>,
    no_validate_offsets: bool,
    config: Option<&Path>,
    verbose: bool,
) -> ExitCode {
    let overrides = CliOverrides {
        metadata_output: output,
        slots,
        validate_offsets: no_validate_offsets.then_some(false),
        ..Default::default()
    };
    match Session::open(common, overrides, config, verbose) {
        Ok(session) => {
            let result = session.metadata();
            session.finish(result)
        }
        Err(code) => code,
    }
}

/// Run the layer2 command
pub fn run_layer2(common: &CommonArgs, prefix: Option<PathBuf>, config: Option<&Path>, verbose: bool) -> ExitCode {
    let overrides = CliOverrides { layer2_prefix: prefix, ..Default::default() };
    match Session::open(common, overrides, config, verbose) {
        Ok(session) => {
            let result = session.layer2();
            session.finish(result)
        }
        Err(code) => code,
    }
}
