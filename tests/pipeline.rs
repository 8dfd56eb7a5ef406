//! End-to-end scenarios: catalog through scheduling to assembled output

mod common;

use common::{decode_tile_payload, read_ifds, read_u64_array};
use tessera::MosaicError;
use tessera::assemble::assemble;
use tessera::catalog::TileCatalog;
use tessera::io::image::load_source;
use tessera::render::{scheduler::render_rows, strip_path};

struct Fixture {
    _dir: tempfile::TempDir,
    source: std::path::PathBuf,
    tiles: std::path::PathBuf,
    strips: std::path::PathBuf,
    dest: std::path::PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let tiles = dir.path().join("tiles");
    let strips = dir.path().join("strips");
    std::fs::create_dir(&tiles).expect("tiles dir");
    std::fs::create_dir(&strips).expect("strips dir");
    Fixture {
        source: dir.path().join("source.png"),
        dest: dir.path().join("mosaic.tif"),
        tiles,
        strips,
        _dir: dir,
    }
}

#[test]
fn test_black_source_with_black_tile_yields_black_mosaic() {
    let fx = fixture();
    common::write_rgb_png(&fx.source, 2, 2, [0, 0, 0]);
    common::write_rgb_png(&fx.tiles.join("black.png"), 4, 4, [0, 0, 0]);

    let source = load_source(&fx.source).expect("load source");
    let catalog = TileCatalog::build(&fx.tiles, None).expect("catalog build");
    render_rows(&source, &fx.strips, &catalog, &fx.tiles, 4, 2, 42, None).expect("render");

    for row in 0..2 {
        let strip = image::open(strip_path(&fx.strips, row))
            .expect("strip decode")
            .to_rgb8();
        assert_eq!(strip.dimensions(), (8, 4));
        assert!(strip.pixels().all(|p| p.0 == [0, 0, 0]));
    }

    assemble((2, 2), &fx.dest, &fx.strips, 4, None).expect("assemble");

    let bytes = std::fs::read(&fx.dest).expect("read tiff");
    let ifds = read_ifds(&bytes);
    assert_eq!(ifds.len(), 1);
    assert_eq!(ifds[0][&256].value, 8);
    assert_eq!(ifds[0][&257].value, 8);

    // Since target avg equals tile avg, the tile goes in unmodified and a
    // black tile survives lossy compression exactly
    let offsets = read_u64_array(&bytes, &ifds[0][&324]);
    let counts = read_u64_array(&bytes, &ifds[0][&325]);
    let tile = decode_tile_payload(&bytes, offsets[0], counts[0]);
    for y in 0..8 {
        for x in 0..8 {
            let p = tile.get_pixel(x, y).0;
            assert!(p.iter().all(|&c| c <= 2), "expected near-black, got {p:?}");
        }
    }
}

#[test]
fn test_single_worker_renders_five_sequential_batches() {
    let fx = fixture();
    common::write_rgb_png(&fx.source, 3, 5, [90, 90, 90]);
    common::write_rgb_png(&fx.tiles.join("tile.png"), 4, 4, [90, 90, 90]);

    let source = load_source(&fx.source).expect("load source");
    let catalog = TileCatalog::build(&fx.tiles, None).expect("catalog build");
    render_rows(&source, &fx.strips, &catalog, &fx.tiles, 4, 1, 42, None).expect("render");

    for row in 0..5 {
        assert!(strip_path(&fx.strips, row).exists(), "missing strip {row}");
    }

    assemble((5, 3), &fx.dest, &fx.strips, 4, None).expect("assemble");

    let bytes = std::fs::read(&fx.dest).expect("read tiff");
    let ifds = read_ifds(&bytes);
    assert_eq!(ifds[0][&256].value, 12);
    assert_eq!(ifds[0][&257].value, 20, "height must be exactly 5 * tile_size");
}

#[test]
fn test_empty_tile_directory_fails_rendering_not_catalog() {
    let fx = fixture();
    common::write_rgb_png(&fx.source, 2, 2, [0, 0, 0]);

    let source = load_source(&fx.source).expect("load source");
    let catalog = TileCatalog::build(&fx.tiles, None).expect("catalog build must succeed");
    assert!(catalog.is_empty());

    match render_rows(&source, &fx.strips, &catalog, &fx.tiles, 4, 2, 42, None) {
        Err(MosaicError::EmptyCatalog { .. }) => {}
        other => unreachable!("expected EmptyCatalog, got {other:?}"),
    }
}

#[test]
fn test_worker_count_larger_than_row_count_is_fine() {
    let fx = fixture();
    common::write_rgb_png(&fx.source, 2, 2, [10, 10, 10]);
    common::write_rgb_png(&fx.tiles.join("tile.png"), 4, 4, [10, 10, 10]);

    let source = load_source(&fx.source).expect("load source");
    let catalog = TileCatalog::build(&fx.tiles, None).expect("catalog build");
    render_rows(&source, &fx.strips, &catalog, &fx.tiles, 4, 16, 42, None).expect("render");

    assert!(strip_path(&fx.strips, 0).exists());
    assert!(strip_path(&fx.strips, 1).exists());
    assert!(!strip_path(&fx.strips, 2).exists());
}

#[test]
fn test_strips_are_identical_across_worker_counts() {
    let fx = fixture();
    common::write_rgb_png(&fx.source, 4, 3, [60, 70, 80]);
    for (name, color) in [("a.png", [200, 0, 0]), ("b.png", [0, 200, 0])] {
        common::write_rgb_png(&fx.tiles.join(name), 4, 4, color);
    }

    let source = load_source(&fx.source).expect("load source");
    let catalog = TileCatalog::build(&fx.tiles, None).expect("catalog build");

    let serial = fx.strips.join("serial");
    let parallel = fx.strips.join("parallel");
    std::fs::create_dir(&serial).expect("serial dir");
    std::fs::create_dir(&parallel).expect("parallel dir");

    render_rows(&source, &serial, &catalog, &fx.tiles, 4, 1, 7, None).expect("render serial");
    render_rows(&source, &parallel, &catalog, &fx.tiles, 4, 3, 7, None).expect("render parallel");

    for row in 0..3 {
        let a = std::fs::read(strip_path(&serial, row)).expect("read serial strip");
        let b = std::fs::read(strip_path(&parallel, row)).expect("read parallel strip");
        assert_eq!(a, b, "strip {row} differs between worker counts");
    }
}

#[test]
fn test_assemble_fails_on_missing_strip() {
    let fx = fixture();
    match assemble((2, 2), &fx.dest, &fx.strips, 4, None) {
        Err(MosaicError::ImageLoad { path, .. }) => {
            assert!(path.ends_with("0.png"));
        }
        other => unreachable!("expected ImageLoad for missing strip, got {other:?}"),
    }
}

#[test]
fn test_assemble_fails_on_mismatched_strip_geometry() {
    let fx = fixture();
    common::write_rgb_png(&strip_path(&fx.strips, 0), 8, 2, [0, 0, 0]);

    match assemble((1, 2), &fx.dest, &fx.strips, 4, None) {
        Err(MosaicError::StripMismatch { expected, actual, .. }) => {
            assert_eq!(expected, (8, 4));
            assert_eq!(actual, (8, 2));
        }
        other => unreachable!("expected StripMismatch, got {other:?}"),
    }
}
