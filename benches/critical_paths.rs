//! Criterion benchmarks for ase2next critical paths
//!
//! Benchmarks the core performance-critical operations:
//! - Encoder: cel to attribute records plus packed patterns
//! - Packer: first-fit page assignment
//! - Layer 2: cel rendering

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::path::PathBuf;

use ase2next::color::Rgb332;
use ase2next::frame::{encode_cel, EncodeOptions};
use ase2next::layer2::render_cel;
use ase2next::models::{Cel, Tile, TileContent, TileRef, Tileset};
use ase2next::page::{FrameDef, PagePacker};

// =============================================================================
// Test Data Generators
// =============================================================================

/// RGBA tileset with `count` distinct 16x16 tiles
fn make_tileset(count: u32) -> Tileset {
    let mut tileset = Tileset::new(16, 16, false);
    for index in 0..count {
        let pixels = (0..256u32).map(|p| [(p + index) as u8, (p * 3) as u8, index as u8, 255]).collect();
        tileset.tiles.push(Tile { tile_index: index, content: TileContent::Rgba(pixels) });
    }
    tileset
}

/// Full `size` x `size` cel cycling through `patterns` tiles
fn make_cel(size: u32, patterns: u32) -> Cel {
    let mut cel = Cel::new(size, size);
    for y in 0..size {
        for x in 0..size {
            let tile = (y * size + x) % patterns;
            cel = cel.with_tile(TileRef::new(x as i32, y as i32, tile).with_flags(x % 2 == 1, y % 2 == 1, false));
        }
    }
    cel
}

fn make_frames(count: usize) -> Vec<FrameDef> {
    (0..count)
        .map(|i| FrameDef {
            n_tiles: 4,
            n_patterns: 4,
            offset_x: -16,
            offset_y: -32,
            symbol: format!("_frame_{}", i),
            binary_path: PathBuf::from(format!("assets/frame_{}.bin", i)),
            binary_size: 300 + (i * 97) % 3000,
        })
        .collect()
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_cel");
    let tileset = make_tileset(64);
    let reducer = Rgb332::default();
    let options = EncodeOptions::new(&reducer);

    for size in [1u32, 4, 8] {
        let cel = make_cel(size, 16);
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::new("grid", size), &cel, |b, cel| {
            b.iter(|| encode_cel(black_box(cel), black_box(&tileset), &options))
        });
    }

    group.finish();
}

fn bench_pack(c: &mut Criterion) {
    let mut group = c.benchmark_group("page_packer");

    for count in [16usize, 256, 1024] {
        let frames = make_frames(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("frames", count), &frames, |b, frames| {
            b.iter(|| {
                let mut packer = PagePacker::new(0);
                for frame in frames {
                    let _ = packer.add(frame.clone());
                }
                black_box(packer.into_pages())
            })
        });
    }

    group.finish();
}

fn bench_layer2(c: &mut Criterion) {
    let tileset = make_tileset(16);
    let reducer = Rgb332::default();
    let cel = make_cel(16, 16);

    c.bench_function("render_cel_16x16", |b| b.iter(|| render_cel(black_box(&cel), black_box(&tileset), &reducer)));
}

criterion_group!(benches, bench_encode, bench_pack, bench_layer2);
criterion_main!(benches);
