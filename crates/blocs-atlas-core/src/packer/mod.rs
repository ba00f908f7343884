use crate::model::{Rect, Size};

pub mod shelf;

pub use shelf::{ShelfPacker, pack_rects};

/// A packer places rectangles into a fixed square atlas.
///
/// Implementations must ensure no overlaps between padded footprints and keep every
/// footprint inside the atlas. `pack` returns the visible rectangle (offset by the
/// expand margin) or `None` if no free space admits it.
pub trait Packer {
    fn can_pack(&self, size: &Size) -> bool;
    fn pack(&mut self, size: &Size) -> Option<Rect>;
}
