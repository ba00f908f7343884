//! Core library for packing images into a single square texture atlas.
//!
//! - Packer: first-fit free-space shelf/guillotine search, tallest first, fixed square bound
//! - Compositor: blits RGBA sources into the atlas with optional edge expansion
//! - Pipeline: `pack_images` takes decoded images and returns the atlas buffer + manifest
//!
//! The crate never touches files or codecs; decoding and encoding belong to the caller.
//!
//! Quick example:
//! ```
//! use blocs_atlas_core::{AtlasConfig, PixelImage, pack_images, to_json};
//! # fn main() -> blocs_atlas_core::Result<()> {
//! let inputs = vec![
//!     PixelImage::filled("red", 32, 16, [255, 0, 0, 255])?,
//!     PixelImage::filled("blue", 8, 48, [0, 0, 255, 255])?,
//! ];
//! let cfg = AtlasConfig::builder().size(256).expand(1).build();
//! let out = pack_images(&inputs, &cfg)?;
//! println!("{}", to_json(&out.atlas.manifest()));
//! # Ok(()) }
//! ```

pub mod compositing;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod packer;
pub mod pipeline;

pub use compositing::*;
pub use config::*;
pub use error::*;
pub use export::*;
pub use model::*;
pub use packer::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `blocs_atlas_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{AtlasConfig, AtlasConfigBuilder, DEFAULT_ATLAS_SIZE};
    pub use crate::error::{AtlasError, Result};
    pub use crate::model::{Atlas, Manifest, PackStats, PackedTexture, PixelImage, Rect, Size};
    pub use crate::packer::{Packer, ShelfPacker, pack_rects};
    pub use crate::pipeline::{LayoutItem, PackOutput, pack_images, pack_layout};
    pub use crate::{composite, to_json, to_json_hash};
}
