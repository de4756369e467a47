//! CLI integration tests for the `ase2next` binary.
//!
//! Runs the built binary against JSON sprites in a temporary directory and
//! checks exit codes plus the files each command writes.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Run ase2next in `dir` and return (stderr, exit code).
fn run(dir: &Path, args: &[&str]) -> (String, Option<i32>) {
    let output = Command::new(env!("CARGO_BIN_EXE_ase2next"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute ase2next");
    (String::from_utf8_lossy(&output.stderr).to_string(), output.status.code())
}

/// Write a sprite with one layer per `(name, cels)` entry.
///
/// Each cel is a list of `(x, y, tile)` placements on a `width` x `height` grid.
fn write_sprite(dir: &Path, file: &str, width: u32, height: u32, layers: &[(&str, Vec<Vec<(i32, i32, u32)>>)]) -> PathBuf {
    let tiles: Vec<serde_json::Value> = (0..4u32)
        .map(|index| serde_json::json!({"tileIndex": index, "content": {"indexed": vec![index; 256]}}))
        .collect();
    let layers: Vec<serde_json::Value> = layers
        .iter()
        .map(|(name, cels)| {
            let cels: Vec<serde_json::Value> = cels
                .iter()
                .map(|placements| {
                    let tilemap: Vec<serde_json::Value> =
                        placements.iter().map(|(x, y, tile)| serde_json::json!({"x": x, "y": y, "tile": tile})).collect();
                    serde_json::json!({"width": width, "height": height, "tilemap": tilemap})
                })
                .collect();
            serde_json::json!({"name": name, "tileset": 0, "cels": cels})
        })
        .collect();
    let sprite = serde_json::json!({
        "width": width * 16,
        "height": height * 16,
        "palette": {"colors": [[0, 0, 0, 255], [255, 0, 0, 255]]},
        "tilesets": [{"width": 16, "height": 16, "indexedColor": true, "tiles": tiles}],
        "layers": layers,
    });

    let path = dir.join(file);
    fs::write(&path, serde_json::to_vec_pretty(&sprite).unwrap()).unwrap();
    path
}

fn tennis(dir: &Path) -> PathBuf {
    write_sprite(
        dir,
        "tennis.json",
        2,
        1,
        &[
            ("player:red", vec![vec![(0, 0, 0), (1, 0, 1)], vec![(0, 0, 1), (1, 0, 1)]]),
            ("ball", vec![vec![(1, 0, 2)]]),
        ],
    )
}

#[test]
fn test_build_writes_all_artifacts() {
    let temp = TempDir::new().unwrap();
    tennis(temp.path());

    let (stderr, code) = run(
        temp.path(),
        &["build", "tennis.json", "--out", "out", "--start-page", "20", "--patterns", "--palettes", "--slots", "player,ball"],
    );
    assert_eq!(code, Some(0), "stderr: {}", stderr);

    let out = temp.path().join("out");
    assert!(out.join("assets/sprites_player_red_00.bin").exists());
    assert!(out.join("assets/sprites_player_red_01.bin").exists());
    assert!(out.join("assets/sprites_ball.bin").exists());

    let page = fs::read_to_string(out.join("asm/sprites_page_20.asm")).unwrap();
    assert!(page.starts_with("\tSECTION PAGE_20\n"));
    assert!(page.contains("_sprites_ball:\n"));

    assert_eq!(fs::read(out.join("sprites.spr")).unwrap().len(), 4 * 256);
    assert_eq!(fs::read(out.join("palettes/tennis.pal")).unwrap().len(), 2);

    let metadata = fs::read_to_string(out.join("sprite_slots.c")).unwrap();
    assert!(metadata.contains("SpriteSlot spriteSlots[] = {\n\t//player\n"));
    assert!(metadata.contains("\t//ball\n"));
}

#[test]
fn test_build_reads_config_file() {
    let temp = TempDir::new().unwrap();
    tennis(temp.path());
    fs::write(
        temp.path().join("ase2next.toml"),
        "[project]\nname = \"tennis\"\nout = \"dist\"\n\n[frames]\nstart_page = 7\nbinary_dir = \"bin\"\n",
    )
    .unwrap();

    let (stderr, code) = run(temp.path(), &["frames", "tennis.json"]);
    assert_eq!(code, Some(0), "stderr: {}", stderr);
    assert!(temp.path().join("dist/asm/sprites_page_07.asm").exists());
    assert!(temp.path().join("dist/bin/sprites_ball.bin").exists());
}

#[test]
fn test_missing_input_fails() {
    let temp = TempDir::new().unwrap();
    let (stderr, code) = run(temp.path(), &["frames", "missing.json", "--out", "out"]);
    assert_ne!(code, Some(0));
    assert!(!stderr.is_empty());
    assert!(!temp.path().join("out").exists());
}

#[test]
fn test_empty_directory_is_invalid_args() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("art")).unwrap();
    let (stderr, code) = run(temp.path(), &["frames", "art", "--out", "out"]);
    assert_eq!(code, Some(2));
    assert!(stderr.contains("no input sprites"));
}

#[test]
fn test_offset_overflow_fails_without_output() {
    let temp = TempDir::new().unwrap();
    write_sprite(temp.path(), "net.json", 12, 1, &[("net", vec![vec![(0, 0, 0), (11, 0, 1)]])]);

    let (stderr, code) = run(temp.path(), &["frames", "net.json", "--out", "out"]);
    assert_eq!(code, Some(1));
    assert!(stderr.contains("Layer 'net' frame 0"), "stderr: {}", stderr);
    assert!(!temp.path().join("out").exists());

    let (stderr, code) = run(temp.path(), &["frames", "net.json", "--out", "out", "--no-validate-offsets"]);
    assert_eq!(code, Some(0), "stderr: {}", stderr);
    assert!(temp.path().join("out/assets/sprites_net.bin").exists());
}

#[test]
fn test_unknown_slot_fails() {
    let temp = TempDir::new().unwrap();
    tennis(temp.path());
    let (stderr, code) = run(temp.path(), &["metadata", "tennis.json", "--out", "out", "--slots", "racket"]);
    assert_eq!(code, Some(1));
    assert!(stderr.contains("Unknown sprite slot 'racket'"), "stderr: {}", stderr);
}

#[test]
fn test_layer2_writes_banks() {
    let temp = TempDir::new().unwrap();
    tennis(temp.path());
    let (stderr, code) = run(temp.path(), &["layer2", "tennis.json", "--out", "out", "--prefix", "court_"]);
    assert_eq!(code, Some(0), "stderr: {}", stderr);
    // 32x16 canvas
    assert_eq!(fs::read(temp.path().join("out/court_0")).unwrap().len(), 32 * 16);
}
