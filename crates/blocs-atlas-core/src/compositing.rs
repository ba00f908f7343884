use crate::error::{AtlasError, Result};
use crate::model::{CHANNELS, PackedTexture, Rect, SourceBuffer};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Composites every texture into a fresh, fully transparent `size`x`size` RGBA buffer.
///
/// Each texture's pixels are copied to its visible rect, then the outermost ring is
/// replicated `expand` pixels outward (destination coordinates outside the source
/// clamp to the nearest edge pixel). Every placement is checked before anything is
/// written, so an error never leaves a half-composited buffer behind.
pub fn composite(
    size: u32,
    textures: &[PackedTexture],
    source: &SourceBuffer,
    expand: u32,
) -> Result<Vec<u8>> {
    let side = size as usize;
    let mut canvas = vec![0u8; side * side * CHANNELS];
    composite_into(&mut canvas, size, textures, source, expand)?;
    Ok(canvas)
}

/// Like [`composite`] but writes into a caller-provided `size`x`size` RGBA buffer.
/// Pixels not covered by a texture are left untouched.
pub fn composite_into(
    canvas: &mut [u8],
    size: u32,
    textures: &[PackedTexture],
    source: &SourceBuffer,
    expand: u32,
) -> Result<()> {
    let stride = size as usize * CHANNELS;
    if canvas.len() != stride * size as usize {
        return Err(AtlasError::InvalidConfig(format!(
            "destination holds {} bytes, expected {} for a {}px atlas",
            canvas.len(),
            stride * size as usize,
            size
        )));
    }

    let blits = textures
        .iter()
        .enumerate()
        .map(|(i, t)| Blit::new(i, t, source, size, expand))
        .collect::<Result<Vec<_>>>()?;

    #[cfg(feature = "parallel")]
    {
        canvas
            .par_chunks_mut(stride)
            .enumerate()
            .for_each(|(dy, row)| {
                for b in &blits {
                    if b.covers_row(dy as u32) {
                        b.write_row(dy as u32, row);
                    }
                }
            });
    }

    #[cfg(not(feature = "parallel"))]
    {
        for b in &blits {
            let (top, bottom) = b.row_span();
            for dy in top..bottom {
                let start = dy as usize * stride;
                b.write_row(dy, &mut canvas[start..start + stride]);
            }
        }
    }

    Ok(())
}

/// A bounds-checked copy of one texture into the atlas.
struct Blit<'a> {
    src: &'a [u8],
    rect: Rect,
    expand: u32,
}

impl<'a> Blit<'a> {
    fn new(
        index: usize,
        texture: &PackedTexture,
        source: &'a SourceBuffer,
        size: u32,
        expand: u32,
    ) -> Result<Self> {
        let r = texture.rect;
        if r.w == 0 || r.h == 0 {
            return Err(AtlasError::CompositeOutOfBounds {
                index,
                detail: format!("empty rect {}x{}", r.w, r.h),
            });
        }
        let fits = r.x >= expand
            && r.y >= expand
            && r.x as u64 + r.w as u64 + expand as u64 <= size as u64
            && r.y as u64 + r.h as u64 + expand as u64 <= size as u64;
        if !fits {
            return Err(AtlasError::CompositeOutOfBounds {
                index,
                detail: format!(
                    "rect ({}, {}) {}x{} expanded by {} leaves the {}px atlas",
                    r.x, r.y, r.w, r.h, expand, size
                ),
            });
        }
        let src = source
            .slice(texture.buffer_index, r.size())
            .ok_or_else(|| AtlasError::CompositeOutOfBounds {
                index,
                detail: format!(
                    "pixels at offset {} for {}x{} exceed the {} byte source buffer",
                    texture.buffer_index,
                    r.w,
                    r.h,
                    source.len()
                ),
            })?;
        Ok(Self {
            src,
            rect: r,
            expand,
        })
    }

    /// Destination rows `[top, bottom)` touched by this blit.
    fn row_span(&self) -> (u32, u32) {
        (
            self.rect.y - self.expand,
            self.rect.y + self.rect.h + self.expand,
        )
    }

    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    fn covers_row(&self, dy: u32) -> bool {
        let (top, bottom) = self.row_span();
        dy >= top && dy < bottom
    }

    /// Writes destination row `dy` (one full atlas row) for this texture.
    fn write_row(&self, dy: u32, row: &mut [u8]) {
        let Rect { x, y, w, h } = self.rect;
        let e = self.expand as usize;
        let sy = dy.saturating_sub(y).min(h - 1) as usize;
        let src_stride = w as usize * CHANNELS;
        let src_row = &self.src[sy * src_stride..(sy + 1) * src_stride];

        let left = x as usize * CHANNELS;
        row[left..left + src_stride].copy_from_slice(src_row);

        if e > 0 {
            let first = &src_row[..CHANNELS];
            let last = &src_row[src_stride - CHANNELS..];
            let edge = left - e * CHANNELS;
            for px in row[edge..left].chunks_exact_mut(CHANNELS) {
                px.copy_from_slice(first);
            }
            let right = left + src_stride;
            for px in row[right..right + e * CHANNELS].chunks_exact_mut(CHANNELS) {
                px.copy_from_slice(last);
            }
        }
    }
}
