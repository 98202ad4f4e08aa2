//! Image fixtures shared by the integration tests.

use image::{Rgb, RgbImage};
use std::path::Path;

/// A 64x64 image of 8x8 flat blocks whose intensities come from `seed`.
///
/// Different seeds give unrelated block layouts, so their perceptual
/// fingerprints differ.
pub fn block_image(seed: u64) -> RgbImage {
    let mut state = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
    let mut blocks = [[0u8; 8]; 8];
    for row in blocks.iter_mut() {
        for cell in row.iter_mut() {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            *cell = if (state >> 33) & 1 == 1 { 230 } else { 25 };
        }
    }
    RgbImage::from_fn(64, 64, |x, y| {
        let v = blocks[(y / 8) as usize][(x / 8) as usize];
        Rgb([v, v, v])
    })
}

/// Save `block_image(seed)` at `path`; the format follows the extension.
pub fn save_image(path: &Path, seed: u64) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    block_image(seed).save(path).unwrap();
}

/// Write bytes that no decoder accepts.
pub fn save_garbage(path: &Path) {
    std::fs::write(path, b"definitely not pixels").unwrap();
}

/// Report lines relative to `root`, with forward slashes.
pub fn relative_lines(report: &str, root: &Path) -> Vec<String> {
    let root = root.to_string_lossy().replace('\\', "/");
    report
        .lines()
        .map(|line| {
            let line = line.replace('\\', "/");
            line.strip_prefix(&format!("{root}/"))
                .unwrap_or(&line)
                .to_string()
        })
        .collect()
}
