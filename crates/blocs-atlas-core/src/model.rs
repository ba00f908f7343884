use crate::error::{AtlasError, Result};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Bytes per pixel. Pixel data is always RGBA8.
pub const CHANNELS: usize = 4;

/// Width/height pair of a rectangle that has not been placed yet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }
    /// Footprint reserved during space search (`w + padding`, `h + padding`).
    pub fn padded(&self, padding: u32) -> Size {
        Size::new(self.w.saturating_add(padding), self.h.saturating_add(padding))
    }
    pub fn area(&self) -> u64 {
        (self.w as u64) * (self.h as u64)
    }
}

/// Axis-aligned rectangle (pixels). `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }
    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }
    pub fn area(&self) -> u64 {
        (self.w as u64) * (self.h as u64)
    }
    /// Inclusive right edge coordinate (`x + w - 1`).
    pub fn right(&self) -> u32 {
        self.x + self.w.saturating_sub(1)
    }
    /// Inclusive bottom edge coordinate (`y + h - 1`).
    pub fn bottom(&self) -> u32 {
        self.y + self.h.saturating_sub(1)
    }
    /// Returns true if `r` is fully inside `self` (inclusive edges).
    pub fn contains(&self, r: &Rect) -> bool {
        r.x >= self.x && r.y >= self.y && r.right() <= self.right() && r.bottom() <= self.bottom()
    }
    /// Returns true if the two rectangles share at least one pixel.
    pub fn intersects(&self, r: &Rect) -> bool {
        let (ax2, ay2) = (self.x as u64 + self.w as u64, self.y as u64 + self.h as u64);
        let (bx2, by2) = (r.x as u64 + r.w as u64, r.y as u64 + r.h as u64);
        !((self.x as u64) >= bx2 || (r.x as u64) >= ax2 || (self.y as u64) >= by2 || (r.y as u64) >= ay2)
    }
    /// Padded footprint of a placed rectangle: the visible rect grown by `expand`
    /// on every side plus `border` to the right and bottom.
    pub fn padded_extent(&self, expand: u32, border: u32) -> Rect {
        let pad = expand * 2 + border;
        Rect::new(
            self.x.saturating_sub(expand),
            self.y.saturating_sub(expand),
            self.w + pad,
            self.h + pad,
        )
    }
}

/// Decoded RGBA8 source image with an identity key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelImage {
    pub key: String,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl PixelImage {
    /// Wraps a raw RGBA8 buffer, rejecting zero dimensions and length mismatches.
    pub fn new(key: impl Into<String>, width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let img = Self {
            key: key.into(),
            width,
            height,
            data,
        };
        img.validate()?;
        Ok(img)
    }

    /// Image filled with a single color.
    pub fn filled(key: impl Into<String>, width: u32, height: u32, rgba: [u8; 4]) -> Result<Self> {
        let len = (width as usize) * (height as usize);
        let data = rgba.repeat(len);
        Self::new(key, width, height, data)
    }

    pub fn from_rgba_image(key: impl Into<String>, rgba: RgbaImage) -> Result<Self> {
        let (w, h) = rgba.dimensions();
        Self::new(key, w, h, rgba.into_raw())
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(AtlasError::InvalidSourceImage {
                key: self.key.clone(),
                reason: format!("zero dimension ({}x{})", self.width, self.height),
            });
        }
        let expected = self.byte_len();
        if self.data.len() != expected {
            return Err(AtlasError::InvalidSourceImage {
                key: self.key.clone(),
                reason: format!(
                    "pixel data holds {} bytes, expected {} for {}x{} RGBA",
                    self.data.len(),
                    expected,
                    self.width,
                    self.height
                ),
            });
        }
        Ok(())
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn byte_len(&self) -> usize {
        (self.width as usize) * (self.height as usize) * CHANNELS
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y as usize) * (self.width as usize) + x as usize) * CHANNELS;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }
}

/// Flat store of every source image's pixels, appended back to back.
#[derive(Debug, Clone, Default)]
pub struct SourceBuffer {
    data: Vec<u8>,
}

impl SourceBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            data: Vec::with_capacity(bytes),
        }
    }

    /// Appends `image` and returns its `buffer_index` (byte offset of its first pixel).
    pub fn push(&mut self, image: &PixelImage) -> Result<usize> {
        image.validate()?;
        let buffer_index = self.data.len();
        self.data.extend_from_slice(&image.data);
        Ok(buffer_index)
    }

    /// Pixel slice of a `w`x`h` image starting at `buffer_index`, if fully in range.
    pub fn slice(&self, buffer_index: usize, size: Size) -> Option<&[u8]> {
        let len = (size.w as usize)
            .checked_mul(size.h as usize)?
            .checked_mul(CHANNELS)?;
        let end = buffer_index.checked_add(len)?;
        self.data.get(buffer_index..end)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// A source image after packing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackedTexture {
    /// Position of the source image in the caller's input list.
    pub index: usize,
    /// Caller-specified identity (e.g. file stem).
    pub key: String,
    /// Visible placement: top-left after the expand offset, original size.
    pub rect: Rect,
    /// Byte offset of this image's pixels in the `SourceBuffer`.
    pub buffer_index: usize,
}

/// Packing result for one square atlas. `textures` are in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Atlas {
    pub size: u32,
    pub expand: u32,
    pub border: u32,
    pub textures: Vec<PackedTexture>,
}

impl Atlas {
    pub fn padding(&self) -> u32 {
        self.expand * 2 + self.border
    }

    /// Builds the serializable manifest (input order, visible coordinates).
    pub fn manifest(&self) -> Manifest {
        Manifest {
            w: self.size,
            h: self.size,
            n: self.textures.len(),
            textures: self
                .textures
                .iter()
                .map(|t| ManifestEntry {
                    n: t.key.clone(),
                    x: t.rect.x,
                    y: t.rect.y,
                    w: t.rect.w,
                    h: t.rect.h,
                })
                .collect(),
        }
    }

    /// Computes packing statistics for this atlas.
    pub fn stats(&self) -> PackStats {
        let padding = self.padding();
        let atlas_area = (self.size as u64) * (self.size as u64);
        let mut used_area = 0u64;
        let mut padded_area = 0u64;
        let mut max_w = 0u32;
        let mut max_h = 0u32;
        for t in &self.textures {
            used_area += t.rect.area();
            padded_area += t.rect.size().padded(padding).area();
            max_w = max_w.max(t.rect.w);
            max_h = max_h.max(t.rect.h);
        }
        let occupancy = if atlas_area > 0 {
            used_area as f64 / atlas_area as f64
        } else {
            0.0
        };
        PackStats {
            num_textures: self.textures.len(),
            atlas_area,
            used_area,
            padded_area,
            occupancy,
            max_texture_width: max_w,
            max_texture_height: max_h,
        }
    }
}

/// One manifest record. Field names match the JSON the atlas tool has always written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestEntry {
    pub n: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Manifest {
    pub w: u32,
    pub h: u32,
    pub n: usize,
    pub textures: Vec<ManifestEntry>,
}

/// Statistics about atlas packing efficiency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PackStats {
    pub num_textures: usize,
    /// `size * size`.
    pub atlas_area: u64,
    /// Sum of visible texture areas.
    pub used_area: u64,
    /// Sum of footprints including expand and border.
    pub padded_area: u64,
    /// used_area / atlas_area (0.0 to 1.0).
    pub occupancy: f64,
    pub max_texture_width: u32,
    pub max_texture_height: u32,
}

impl PackStats {
    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Textures: {}, Occupancy: {:.2}%, Atlas Area: {} px², Used Area: {} px², Padded Area: {} px²",
            self.num_textures,
            self.occupancy * 100.0,
            self.atlas_area,
            self.used_area,
            self.padded_area,
        )
    }

    /// Returns wasted space in pixels.
    pub fn wasted_area(&self) -> u64 {
        self.atlas_area.saturating_sub(self.used_area)
    }

    /// Returns wasted space as a percentage (0.0 to 100.0).
    pub fn waste_percentage(&self) -> f64 {
        if self.atlas_area > 0 {
            (self.wasted_area() as f64 / self.atlas_area as f64) * 100.0
        } else {
            0.0
        }
    }
}
