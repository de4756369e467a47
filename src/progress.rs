//! Conversion progress reporting.
//!
//! Reporters receive one event per artifact written so the CLI can print a
//! summary while library callers stay silent.
//!
//! # Example
//!
//! ```ignore
//! use ase2next::progress::{ConsoleProgress, ProgressEvent, ProgressReporter};
//!
//! let reporter = ConsoleProgress::new();
//! reporter.report(ProgressEvent::ConversionStarted { inputs: 2 });
//! reporter.report(ProgressEvent::PageWritten { page: 40, frames: 12, bytes: 8004 });
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Class of file produced by a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Frame payload (attributes + patterns)
    FramePayload,
    /// Whole-tileset sprite patterns
    Patterns,
    /// 4-bit tile definitions
    TileDefinitions,
    /// Palette file
    Palette,
    /// Sprite slot metadata source
    Metadata,
    /// Layer 2 bitmap bank
    Layer2Bank,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::FramePayload => write!(f, "frame"),
            ArtifactKind::Patterns => write!(f, "patterns"),
            ArtifactKind::TileDefinitions => write!(f, "tiles"),
            ArtifactKind::Palette => write!(f, "palette"),
            ArtifactKind::Metadata => write!(f, "metadata"),
            ArtifactKind::Layer2Bank => write!(f, "layer2"),
        }
    }
}

/// Events that can be reported during a conversion.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Conversion started
    ConversionStarted {
        /// Number of input sprites
        inputs: usize,
    },
    /// A file was written
    ArtifactWritten {
        kind: ArtifactKind,
        path: PathBuf,
        /// File size in bytes
        bytes: usize,
    },
    /// A page descriptor was written
    PageWritten {
        page: u32,
        /// Frames assigned to the page
        frames: usize,
        /// Page bytes used, overhead included
        bytes: usize,
    },
    /// A warning was generated
    Warning { message: String },
    /// An error occurred
    Error { message: String },
    /// Conversion finished
    ConversionCompleted {
        success: bool,
        /// Total duration in milliseconds
        duration_ms: u64,
    },
}

/// Trait for progress reporters.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event.
    fn report(&self, event: ProgressEvent);

    /// Check if this reporter wants verbose output.
    fn is_verbose(&self) -> bool {
        false
    }
}

/// A progress reporter that discards all events.
#[derive(Debug, Default)]
pub struct NullProgress;

impl NullProgress {
    pub fn new() -> Self {
        Self
    }
}

impl ProgressReporter for NullProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Console progress reporter with optional colors.
pub struct ConsoleProgress {
    use_colors: bool,
    verbose: bool,
    /// Files written so far
    written: AtomicUsize,
    output: Mutex<Box<dyn Write + Send>>,
}

impl std::fmt::Debug for ConsoleProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleProgress")
            .field("use_colors", &self.use_colors)
            .field("verbose", &self.verbose)
            .field("written", &self.written)
            .finish()
    }
}

impl ConsoleProgress {
    /// Create a reporter writing to stderr.
    pub fn new() -> Self {
        Self {
            use_colors: true,
            verbose: false,
            written: AtomicUsize::new(0),
            output: Mutex::new(Box::new(std::io::stderr())),
        }
    }

    /// Create a console progress reporter that writes to a custom output.
    pub fn with_output<W: Write + Send + 'static>(output: W) -> Self {
        Self {
            use_colors: false,
            verbose: false,
            written: AtomicUsize::new(0),
            output: Mutex::new(Box::new(output)),
        }
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Verbose mode lists every payload file, not just pages and summaries.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn color(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("{}{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    fn green(&self, text: &str) -> String {
        self.color(text, "\x1b[32m")
    }

    fn yellow(&self, text: &str) -> String {
        self.color(text, "\x1b[33m")
    }

    fn red(&self, text: &str) -> String {
        self.color(text, "\x1b[31m")
    }

    fn cyan(&self, text: &str) -> String {
        self.color(text, "\x1b[36m")
    }

    fn writeln(&self, line: &str) {
        if let Ok(mut output) = self.output.lock() {
            let _ = writeln!(output, "{}", line);
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ConsoleProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::ConversionStarted { inputs } => {
                self.written.store(0, Ordering::SeqCst);
                self.writeln(&format!(
                    "{} Converting {} sprite{}...",
                    self.cyan("[convert]"),
                    inputs,
                    if inputs == 1 { "" } else { "s" }
                ));
            }
            ProgressEvent::ArtifactWritten { kind, path, bytes } => {
                self.written.fetch_add(1, Ordering::SeqCst);
                if self.verbose || kind != ArtifactKind::FramePayload {
                    self.writeln(&format!(
                        "{} {} {} ({} bytes)",
                        self.cyan("[convert]"),
                        kind,
                        path.display(),
                        bytes
                    ));
                }
            }
            ProgressEvent::PageWritten { page, frames, bytes } => {
                self.written.fetch_add(1, Ordering::SeqCst);
                self.writeln(&format!(
                    "{} page {}: {} frame{}, {}/{} bytes",
                    self.cyan("[convert]"),
                    page,
                    frames,
                    if frames == 1 { "" } else { "s" },
                    bytes,
                    crate::page::PAGE_SIZE
                ));
            }
            ProgressEvent::Warning { message } => {
                self.writeln(&format!("{} {}", self.yellow("[warn]"), message));
            }
            ProgressEvent::Error { message } => {
                self.writeln(&format!("{} {}", self.red("[error]"), message));
            }
            ProgressEvent::ConversionCompleted { success, duration_ms } => {
                let written = self.written.load(Ordering::SeqCst);
                if success {
                    self.writeln(&format!(
                        "{} {} file{} written in {}",
                        self.green("[done]"),
                        written,
                        if written == 1 { "" } else { "s" },
                        format_duration(duration_ms)
                    ));
                } else {
                    self.writeln(&format!(
                        "{} Conversion failed after {}",
                        self.red("[error]"),
                        format_duration(duration_ms)
                    ));
                }
            }
        }
    }

    fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Format a duration in milliseconds for display.
fn format_duration(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        let minutes = ms / 60_000;
        let seconds = (ms % 60_000) / 1000;
        format!("{}m {}s", minutes, seconds)
    }
}
