//! Random colored boxes for the `demo` subcommand.

use blocs_atlas_core::PixelImage;
use rand::Rng;

/// Manifest name shared by every generated box.
pub const BOX_KEY: &str = "box";

/// Large boxes, each included with probability one half.
const OPTIONAL_BOXES: [(u32, u32); 5] = [(400, 80), (80, 400), (250, 250), (100, 250), (250, 100)];

/// `(width, height, min count, max count)` per batch.
const BATCHES: [(u32, u32, u32, u32); 7] = [
    (100, 100, 1, 20),
    (60, 60, 1, 10),
    (50, 50, 1, 30),
    (50, 20, 1, 40),
    (20, 50, 51, 100),
    (10, 10, 301, 500),
    (5, 5, 501, 1000),
];

/// Builds the demo set: a few optional large boxes followed by batches of
/// small ones, each filled with a random hue at full saturation.
pub fn random_boxes<R: Rng>(rng: &mut R) -> anyhow::Result<Vec<PixelImage>> {
    let mut boxes = Vec::new();
    for (w, h) in OPTIONAL_BOXES {
        if rng.gen_bool(0.5) {
            boxes.push(rand_box(rng, w, h)?);
        }
    }
    for (w, h, min, max) in BATCHES {
        let count = rng.gen_range(min..=max);
        for _ in 0..count {
            boxes.push(rand_box(rng, w, h)?);
        }
    }
    Ok(boxes)
}

fn rand_box<R: Rng>(rng: &mut R, w: u32, h: u32) -> anyhow::Result<PixelImage> {
    let color = hsla(rng.r#gen::<f32>(), 1.0, 0.7, 1.0);
    Ok(PixelImage::filled(BOX_KEY, w, h, color)?)
}

/// HSLA (all components in `0..=1`) to RGBA bytes.
pub fn hsla(h: f32, s: f32, l: f32, a: f32) -> [u8; 4] {
    let alpha = (a * 255.0) as u8;
    if s == 0.0 {
        let v = (l * 255.0) as u8;
        return [v, v, v, alpha];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    [
        (hue(p, q, h + 1.0 / 3.0) * 255.0) as u8,
        (hue(p, q, h) * 255.0) as u8,
        (hue(p, q, h - 1.0 / 3.0) * 255.0) as u8,
        alpha,
    ]
}

fn hue(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 0.5 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}
