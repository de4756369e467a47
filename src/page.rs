//! Memory page packing for frame definitions.
//!
//! Frames are assigned greedily in input order: each frame goes to the first
//! page that still has room, otherwise a new page is opened with the next
//! number. Pages are never reordered, so adjacent frames of a skin tend to
//! share a page.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::asm::AsmSource;
use crate::error::ConvertError;
use crate::output::{page_filename, relative_path};

/// Size of one memory page in bytes.
pub const PAGE_SIZE: usize = 8192;

/// Bytes added per frame for `nTiles, nPatterns, offsetX, offsetY`.
pub const FRAMEDEF_OVERHEAD: usize = 4;

/// Descriptor record of one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameDef {
    pub n_tiles: usize,
    pub n_patterns: usize,
    pub offset_x: i32,
    pub offset_y: i32,
    /// Exported linker symbol
    pub symbol: String,
    /// Binary payload file
    pub binary_path: PathBuf,
    /// Payload length in bytes
    pub binary_size: usize,
}

impl FrameDef {
    /// Whether the tile count does not fit its byte (a full 16x16 cel has 256 tiles).
    pub fn tile_count_overflows(&self) -> bool {
        self.n_tiles > u8::MAX as usize
    }

    /// The 4-byte metadata record, each value masked to 8 bits.
    pub fn record(&self) -> [u8; FRAMEDEF_OVERHEAD] {
        if self.tile_count_overflows() {
            warn!(symbol = %self.symbol, tiles = self.n_tiles, "tile count masked to 8 bits");
        }
        [self.n_tiles as u8, self.n_patterns as u8, self.offset_x as u8, self.offset_y as u8]
    }

    /// Bytes this frame occupies in a page.
    pub fn footprint(&self) -> usize {
        self.binary_size + FRAMEDEF_OVERHEAD
    }
}

/// Frames assigned to one memory page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub frames: Vec<FrameDef>,
    capacity: usize,
}

impl Page {
    pub fn new(number: u32) -> Self {
        Self::with_capacity(number, PAGE_SIZE)
    }

    pub fn with_capacity(number: u32, capacity: usize) -> Self {
        Self { number, frames: Vec::new(), capacity }
    }

    /// Bytes used by the frames assigned so far.
    pub fn memory_usage(&self) -> usize {
        self.frames.iter().map(FrameDef::footprint).sum()
    }

    /// Whether a payload of `size` bytes still fits.
    pub fn fits(&self, size: usize) -> bool {
        self.memory_usage() + size + FRAMEDEF_OVERHEAD <= self.capacity
    }

    /// Render the page descriptor.
    ///
    /// Payload references are written relative to `asm_dir`, the directory the
    /// descriptor is written to.
    pub fn to_asm(&self, asm_dir: &Path) -> String {
        let symbols: Vec<String> = self.frames.iter().map(|f| f.symbol.clone()).collect();
        let mut asm = AsmSource::new();
        asm.header(&format!("PAGE_{}", self.number), &symbols);

        for frame in &self.frames {
            asm.label(&frame.symbol)
                .db(&frame.record())
                .incbin(&relative_path(asm_dir, &frame.binary_path));
        }

        asm.into_string()
    }

    /// Descriptor file path inside `asm_dir`.
    pub fn filename(&self, asm_dir: &Path) -> PathBuf {
        page_filename(asm_dir, self.number)
    }
}

/// Greedy first-fit page assignment over a stream of frames.
#[derive(Debug, Clone)]
pub struct PagePacker {
    pages: Vec<Page>,
    next_page: u32,
    capacity: usize,
}

impl PagePacker {
    /// Start packing at page `start_page`.
    pub fn new(start_page: u32) -> Self {
        Self::with_capacity(start_page, PAGE_SIZE)
    }

    pub fn with_capacity(start_page: u32, capacity: usize) -> Self {
        Self { pages: Vec::new(), next_page: start_page, capacity }
    }

    /// Assign a frame to the first page with room, opening one if needed.
    ///
    /// Returns the page number the frame landed in.
    ///
    /// # Errors
    ///
    /// [`ConvertError::FrameTooLarge`] if the frame cannot fit even an empty page.
    pub fn add(&mut self, frame: FrameDef) -> Result<u32, ConvertError> {
        let size = frame.footprint();
        if size > self.capacity {
            return Err(ConvertError::FrameTooLarge { symbol: frame.symbol, size, capacity: self.capacity });
        }

        let index = match self.pages.iter().position(|p| p.fits(frame.binary_size)) {
            Some(index) => index,
            None => {
                self.pages.push(Page::with_capacity(self.next_page, self.capacity));
                self.next_page += 1;
                self.pages.len() - 1
            }
        };

        let page = &mut self.pages[index];
        page.frames.push(frame);
        Ok(page.number)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }
}
