use super::Packer;
use crate::config::{AtlasConfig, UTILIZATION_CEILING};
use crate::error::{AtlasError, Result};
use crate::model::{Rect, Size};
use tracing::{debug, trace};

/// First-fit free-space packer.
///
/// Free spaces are scanned newest to oldest, so freshly split shelves are reused
/// before the remaining canvas. A placement consumes the top-left corner of the
/// first space that fits and either removes, shrinks, or splits that space.
pub struct ShelfPacker {
    size: u32,
    expand: u32,
    padding: u32,
    free: Vec<Rect>,
}

impl ShelfPacker {
    pub fn new(config: &AtlasConfig) -> Self {
        Self {
            size: config.size,
            expand: config.expand,
            padding: config.padding(),
            free: vec![Rect::new(0, 0, config.size, config.size)],
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Current free spaces in list order.
    pub fn free_spaces(&self) -> &[Rect] {
        &self.free
    }

    fn choose(&self, w: u32, h: u32) -> Option<usize> {
        self.free.iter().rposition(|fr| w <= fr.w && h <= fr.h)
    }

    fn place(&mut self, idx: usize, w: u32, h: u32) {
        let fr = self.free[idx];
        if w == fr.w && h == fr.h {
            // perfect fit
            self.free.swap_remove(idx);
        } else if h == fr.h {
            // keep the area to the right
            let space = &mut self.free[idx];
            space.x += w;
            space.w -= w;
        } else if w == fr.w {
            // keep the area below
            let space = &mut self.free[idx];
            space.y += h;
            space.h -= h;
        } else {
            // new shelf to the right, original space keeps everything below
            self.free.push(Rect::new(fr.x + w, fr.y, fr.w - w, h));
            let space = &mut self.free[idx];
            space.y += h;
            space.h -= h;
        }
    }
}

impl Packer for ShelfPacker {
    fn can_pack(&self, size: &Size) -> bool {
        let p = size.padded(self.padding);
        self.choose(p.w, p.h).is_some()
    }

    fn pack(&mut self, size: &Size) -> Option<Rect> {
        let p = size.padded(self.padding);
        let idx = self.choose(p.w, p.h)?;
        let fr = self.free[idx];
        self.place(idx, p.w, p.h);
        trace!(x = fr.x, y = fr.y, w = size.w, h = size.h, free = self.free.len(), "placed");
        Some(Rect::new(fr.x + self.expand, fr.y + self.expand, size.w, size.h))
    }
}

/// Places every rectangle in `sizes` inside a `cfg.size` square.
///
/// Returns visible rectangles indexed like `sizes`. Rectangles are placed tallest
/// first; equal heights keep their input order. Fails without placing anything if
/// a padded rectangle exceeds the atlas or the padded total exceeds
/// [`UTILIZATION_CEILING`] of the atlas area.
pub fn pack_rects(sizes: &[Size], cfg: &AtlasConfig) -> Result<Vec<Rect>> {
    cfg.validate()?;
    if sizes.is_empty() {
        return Err(AtlasError::Empty);
    }

    let padding = cfg.padding();
    let mut area = 0u64;
    let mut max_w = 0u32;
    let mut max_h = 0u32;
    for (i, s) in sizes.iter().enumerate() {
        if s.w == 0 || s.h == 0 {
            return Err(AtlasError::InvalidSourceImage {
                key: format!("#{i}"),
                reason: format!("zero dimension ({}x{})", s.w, s.h),
            });
        }
        let p = s.padded(padding);
        area += p.area();
        max_w = max_w.max(p.w);
        max_h = max_h.max(p.h);
    }

    if max_w > cfg.size || max_h > cfg.size {
        return Err(AtlasError::OversizedRectangle {
            width: max_w,
            height: max_h,
            size: cfg.size,
        });
    }
    let capacity = (cfg.size as f64) * (cfg.size as f64) * UTILIZATION_CEILING;
    if area as f64 > capacity {
        return Err(AtlasError::CapacityExceeded {
            required: area,
            available: capacity as u64,
            size: cfg.size,
            ceiling: UTILIZATION_CEILING,
        });
    }

    // stable: equal heights stay in input order
    let mut order: Vec<usize> = (0..sizes.len()).collect();
    order.sort_by(|&a, &b| sizes[b].h.cmp(&sizes[a].h));

    let mut packer = ShelfPacker::new(cfg);
    let mut placed = vec![Rect::default(); sizes.len()];
    for idx in order {
        let s = &sizes[idx];
        let rect = packer.pack(s).ok_or_else(|| {
            let p = s.padded(padding);
            AtlasError::PackingExhausted {
                index: idx,
                width: p.w,
                height: p.h,
            }
        })?;
        placed[idx] = rect;
    }
    debug!(
        rects = sizes.len(),
        padded_area = area,
        free_spaces = packer.free_spaces().len(),
        "packed rectangles"
    );
    Ok(placed)
}
