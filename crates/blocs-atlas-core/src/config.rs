use serde::{Deserialize, Serialize};

/// Default width and height of the atlas (4K).
pub const DEFAULT_ATLAS_SIZE: u32 = 4096;

/// Fraction of the atlas area that padded rectangles may claim in total.
/// First-fit shelf packing never reaches full utilization on arbitrary sets,
/// so anything above this is rejected before placement starts.
pub const UTILIZATION_CEILING: f64 = 0.85;

/// Largest accepted atlas side; keeps `size * size * 4` addressable.
pub const MAX_ATLAS_SIZE: u32 = 1 << 15;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AtlasConfig {
    /// Atlas width and height in pixels.
    #[serde(default = "default_size")]
    pub size: u32,
    /// Pixels of edge replication around every texture.
    #[serde(default)]
    pub expand: u32,
    /// Empty pixels between neighboring textures.
    #[serde(default)]
    pub border: u32,
    /// Remove duplicate images. Accepted but not implemented; packing ignores it.
    #[serde(default)]
    pub unique: bool,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            expand: 0,
            border: 0,
            unique: false,
        }
    }
}

impl AtlasConfig {
    /// `2 * expand + border`: footprint added to every rectangle during space search.
    pub fn padding(&self) -> u32 {
        self.expand
            .saturating_mul(2)
            .saturating_add(self.border)
    }

    /// Validates the configuration parameters.
    ///
    /// Returns an error if the size is zero or too large, or if the padding
    /// alone leaves no room for a single pixel.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::AtlasError;

        if self.size == 0 {
            return Err(AtlasError::InvalidConfig("size must be positive".into()));
        }
        if self.size > MAX_ATLAS_SIZE {
            return Err(AtlasError::InvalidConfig(format!(
                "size ({}) exceeds the maximum of {}px",
                self.size, MAX_ATLAS_SIZE
            )));
        }
        let padding = self
            .expand
            .checked_mul(2)
            .and_then(|e| e.checked_add(self.border));
        match padding {
            Some(p) if p < self.size => Ok(()),
            _ => Err(AtlasError::InvalidConfig(format!(
                "padding (2 * expand {} + border {}) leaves no usable space in a {}px atlas",
                self.expand, self.border, self.size
            ))),
        }
    }

    /// Create a fluent builder for `AtlasConfig`.
    pub fn builder() -> AtlasConfigBuilder {
        AtlasConfigBuilder::new()
    }
}

fn default_size() -> u32 {
    DEFAULT_ATLAS_SIZE
}

/// Builder for `AtlasConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct AtlasConfigBuilder {
    cfg: AtlasConfig,
}

impl AtlasConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: AtlasConfig::default(),
        }
    }
    pub fn size(mut self, v: u32) -> Self {
        self.cfg.size = v;
        self
    }
    pub fn expand(mut self, v: u32) -> Self {
        self.cfg.expand = v;
        self
    }
    pub fn border(mut self, v: u32) -> Self {
        self.cfg.border = v;
        self
    }
    pub fn unique(mut self, v: bool) -> Self {
        self.cfg.unique = v;
        self
    }
    pub fn build(self) -> AtlasConfig {
        self.cfg
    }
}
