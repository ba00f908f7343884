use crate::compositing::composite;
use crate::config::AtlasConfig;
use crate::error::{AtlasError, Result};
use crate::model::{Atlas, CHANNELS, PackStats, PackedTexture, PixelImage, Rect, Size, SourceBuffer};
use crate::packer::pack_rects;
use image::RgbaImage;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Output of a packing run: atlas metadata and the composited RGBA buffer.
pub struct PackOutput {
    pub atlas: Atlas,
    /// `size * size * 4` bytes, row-major RGBA8.
    pub rgba: Vec<u8>,
}

impl PackOutput {
    /// Computes packing statistics for this output.
    /// This is a convenience method that delegates to `atlas.stats()`.
    pub fn stats(&self) -> PackStats {
        self.atlas.stats()
    }

    /// Converts the composited buffer into an `image::RgbaImage` for encoding.
    pub fn into_rgba_image(self) -> Result<RgbaImage> {
        let size = self.atlas.size;
        RgbaImage::from_raw(size, size, self.rgba).ok_or_else(|| {
            AtlasError::InvalidConfig(format!("composited buffer does not match a {size}px atlas"))
        })
    }
}

/// Width/height of an item to lay out without pixels.
#[derive(Debug, Clone)]
pub struct LayoutItem {
    pub key: String,
    pub w: u32,
    pub h: u32,
}

/// Packs `inputs` into one square atlas and composites their pixels.
///
/// Notes:
/// - `inputs` are only read; every image must be non-empty RGBA8 with a matching buffer.
/// - The returned textures keep the input order, not the internal tallest-first order.
/// - Any failure aborts the run; no partial atlas is returned.
#[instrument(skip_all, fields(count = inputs.len(), size = cfg.size))]
pub fn pack_images(inputs: &[PixelImage], cfg: &AtlasConfig) -> Result<PackOutput> {
    cfg.validate()?;
    if inputs.is_empty() {
        return Err(AtlasError::Empty);
    }
    warn_unique(cfg);

    let stage = Instant::now();
    let bytes: usize = inputs.iter().map(|i| i.data.len()).sum();
    let mut source = SourceBuffer::with_capacity(bytes);
    let mut textures = Vec::with_capacity(inputs.len());
    for (index, img) in inputs.iter().enumerate() {
        let buffer_index = source.push(img)?;
        textures.push(PackedTexture {
            index,
            key: img.key.clone(),
            rect: Rect::new(0, 0, img.width, img.height),
            buffer_index,
        });
    }
    debug!(bytes, elapsed_ms = elapsed_ms(stage), "buffered source pixels");

    let stage = Instant::now();
    let sizes: Vec<Size> = textures.iter().map(|tex| tex.rect.size()).collect();
    let placed = pack_rects(&sizes, cfg)?;
    for (tex, rect) in textures.iter_mut().zip(placed) {
        tex.rect = rect;
    }
    debug!(elapsed_ms = elapsed_ms(stage), "packed graphics");

    let stage = Instant::now();
    let rgba = composite(cfg.size, &textures, &source, cfg.expand)?;
    debug!(elapsed_ms = elapsed_ms(stage), "generated texture");

    Ok(PackOutput {
        atlas: Atlas {
            size: cfg.size,
            expand: cfg.expand,
            border: cfg.border,
            textures,
        },
        rgba,
    })
}

/// Computes placements only. `buffer_index` values are the offsets `pack_images`
/// would assign, so the result is interchangeable with a full run's atlas.
#[instrument(skip_all, fields(count = items.len(), size = cfg.size))]
pub fn pack_layout(items: &[LayoutItem], cfg: &AtlasConfig) -> Result<Atlas> {
    cfg.validate()?;
    if items.is_empty() {
        return Err(AtlasError::Empty);
    }
    warn_unique(cfg);

    let sizes: Vec<Size> = items.iter().map(|i| Size::new(i.w, i.h)).collect();
    let placed = pack_rects(&sizes, cfg)?;
    let mut buffer_index = 0usize;
    let textures = items
        .iter()
        .zip(placed)
        .enumerate()
        .map(|(index, (item, rect))| {
            let tex = PackedTexture {
                index,
                key: item.key.clone(),
                rect,
                buffer_index,
            };
            buffer_index += (item.w as usize) * (item.h as usize) * CHANNELS;
            tex
        })
        .collect();
    Ok(Atlas {
        size: cfg.size,
        expand: cfg.expand,
        border: cfg.border,
        textures,
    })
}

fn warn_unique(cfg: &AtlasConfig) {
    if cfg.unique {
        warn!("unique is not implemented yet; duplicate images will be packed separately");
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
